//! Natural-language interpretation engine.
//!
//! Given a short free-form utterance, [`Parser::parse`] returns a
//! [`Match`]: which words carry meaning with respect to a set of
//! user-supplied grammar rules, and an overall confidence in `[0, 1]`.
//!
//! Pipeline: `text -> Lexer::normalize -> Lexer::tokenize -> Token+Options
//! -> parser::nominate -> Interpretations -> optimizer::optimize -> Match`.
//!
//! ## Public API
//! - [`locale::Locale`], [`lang::LanguageProfile`] / [`lang::FrenchProfile`]
//! - [`trigram::Trigram`]
//! - [`spellcheck::SpellBackend`] / [`spellcheck::WordListBackend`]
//! - [`weights::Weights`]
//! - [`lexer::Lexer`], [`lexer::Token`]
//! - [`rules::Rule`], [`rules::RuleInfo`], the illustrative rules
//!   ([`rules::SausageRule`], [`rules::MaximizeMatch`],
//!   [`rules::MaximizeSimilarity`])
//! - [`parser::Interpretation`]
//! - [`optimizer::Minimizer`], [`optimizer::PatternSearchMinimizer`],
//!   [`optimizer::Match`]
//! - [`Parser`], the top-level entry point

pub mod error;
pub mod lang;
pub mod lexer;
pub mod locale;
pub mod optimizer;
pub mod parser;
pub mod rules;
pub mod spellcheck;
pub mod trigram;
pub mod weights;

pub use error::NluError;
pub use lang::LanguageProfile;
pub use lexer::{Lexer, Token};
pub use optimizer::{Match, Minimizer, PatternSearchMinimizer};
pub use parser::Interpretation;
pub use rules::{Rule, RuleInfo};
pub use spellcheck::SpellBackend;
pub use weights::Weights;

/// Ties a [`Lexer`], a rule ensemble and a [`Minimizer`] together behind
/// a single [`Parser::parse`] entry point.
pub struct Parser<L, B> {
    lexer: Lexer<L, B>,
    rules: Vec<RuleInfo>,
    weights: Weights,
    minimizer: Box<dyn Minimizer>,
}

impl<L, B> Parser<L, B>
where
    L: LanguageProfile,
    B: SpellBackend,
{
    /// Builds a parser using the reference [`PatternSearchMinimizer`].
    pub fn new(lexer: Lexer<L, B>, rules: Vec<RuleInfo>, weights: Weights) -> Self {
        Parser {
            lexer,
            rules,
            weights,
            minimizer: Box::new(PatternSearchMinimizer::default()),
        }
    }

    /// Swaps in an alternative [`Minimizer`].
    pub fn with_minimizer(mut self, minimizer: Box<dyn Minimizer>) -> Self {
        self.minimizer = minimizer;
        self
    }

    /// Runs nomination over already-tokenized input.
    pub fn nominate(&self, tokens: &[Token]) -> Vec<Interpretation> {
        parser::nominate(tokens, &self.rules, &self.weights)
    }

    /// Normalizes, tokenizes, nominates and optimizes `text` into a
    /// [`Match`]. Spell-check backend failures propagate as
    /// [`NluError::BackendError`]; a panic inside a rule's
    /// `nominate_words`/`evaluate` aborts the parse and is converted to
    /// [`NluError::RuleError`] rather than unwinding past the caller. The
    /// optimizer itself never fails — minimizer rejection is recovered
    /// into a zero-score all-`NoMatch` match rather than surfaced here.
    pub fn parse(&self, text: &str) -> Result<Match, NluError> {
        tracing::debug!(%text, "parsing utterance");
        let tokens = self.lexer.process(text)?;

        let interpretations =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.nominate(&tokens)))
                .map_err(|payload| rule_panic_error("nominate_words", payload))?;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            optimizer::optimize(&interpretations, &self.rules, &self.weights, self.minimizer.as_ref())
        }))
        .map_err(|payload| rule_panic_error("evaluate", payload))?;

        tracing::info!(score = result.score, "parse complete");
        Ok(result)
    }
}

fn rule_panic_error(rule: &str, payload: Box<dyn std::any::Any + Send>) -> NluError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "rule panicked with a non-string payload".to_string());

    NluError::RuleError { rule: rule.to_string(), source: anyhow::anyhow!(message) }
}
