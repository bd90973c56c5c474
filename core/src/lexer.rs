//! Token / Option data model plus the `Lexer`: normalize, split, explore.

use once_cell::sync::OnceCell;
use rayon::prelude::*;

use crate::error::NluError;
use crate::lang::LanguageProfile;
use crate::spellcheck::SpellBackend;
use crate::trigram::Trigram;
use crate::weights::Weights;

/// One spell-check suggestion, itself re-split into words by the language
/// profile (a suggestion may be a compound of several surface words).
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub words: Vec<String>,
    pub sim: f64,
}

/// Which family of hypothesis a [`TokenOption`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Verbatim,
    Stem,
    Neighbor,
}

/// One word inside a [`TokenOption`].
#[derive(Debug, Clone, PartialEq)]
pub struct OptionWord {
    pub surface: String,
    pub surface_lower: String,
}

impl OptionWord {
    fn new(surface: &str) -> Self {
        OptionWord {
            surface: surface.to_string(),
            surface_lower: surface.to_lowercase(),
        }
    }
}

/// One hypothesis for what a token might be. Named `TokenOption` rather
/// than `Option` to avoid shadowing `std::option::Option`.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenOption {
    pub kind: OptionKind,
    pub score: f64,
    pub words: Vec<OptionWord>,
}

/// Coordinates identifying one [`OptionWord`] inside a token set: the
/// non-owning, copyable stand-in for a back-reference from OptionWord up
/// through Option to Token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordRef {
    pub token: usize,
    pub option: usize,
    pub word: usize,
}

/// A flattened, borrowed view of one `OptionWord` as consumed by rules:
/// its coordinates, its text, and the score of its parent option.
#[derive(Debug, Clone, Copy)]
pub struct CandidateWord<'a> {
    pub at: WordRef,
    pub surface: &'a str,
    pub surface_lower: &'a str,
    pub kind: OptionKind,
    pub option_score: f64,
}

/// One surface unit produced by splitting normalized text.
///
/// Two tokens with identical surfaces are distinct values — identity here
/// is positional (index into the token sequence), never surface equality.
#[derive(Debug)]
pub struct Token {
    pub surface: String,
    pub is_word: bool,
    pub neighbors: Vec<Neighbor>,
    pub stems: Vec<String>,
    options: OnceCell<Vec<TokenOption>>,
}

impl Token {
    fn new(surface: String, is_word: bool) -> Self {
        Token {
            surface,
            is_word,
            neighbors: Vec::new(),
            stems: Vec::new(),
            options: OnceCell::new(),
        }
    }

    /// Options for this token, built and memoized on first access.
    pub fn options(&self, weights: &Weights) -> &[TokenOption] {
        self.options
            .get_or_init(|| self.build_options(weights))
            .as_slice()
    }

    fn build_options(&self, weights: &Weights) -> Vec<TokenOption> {
        let mut options = Vec::with_capacity(1 + self.stems.len() + self.neighbors.len());

        options.push(TokenOption {
            kind: OptionKind::Verbatim,
            score: weights.option_verbatim,
            words: vec![OptionWord::new(&self.surface)],
        });

        for stem in &self.stems {
            options.push(TokenOption {
                kind: OptionKind::Stem,
                score: weights.option_stem,
                words: vec![OptionWord::new(stem)],
            });
        }

        for neighbor in &self.neighbors {
            options.push(TokenOption {
                kind: OptionKind::Neighbor,
                score: neighbor.sim,
                words: neighbor.words.iter().map(|w| OptionWord::new(w)).collect(),
            });
        }

        options.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        options
    }

    /// Flattens this token's options into candidate words, addressed by
    /// `token_index`.
    pub fn candidates(&self, token_index: usize, weights: &Weights) -> Vec<CandidateWord<'_>> {
        self.options(weights)
            .iter()
            .enumerate()
            .flat_map(move |(option_index, option)| {
                option.words.iter().enumerate().map(move |(word_index, word)| CandidateWord {
                    at: WordRef {
                        token: token_index,
                        option: option_index,
                        word: word_index,
                    },
                    surface: word.surface.as_str(),
                    surface_lower: word.surface_lower.as_str(),
                    kind: option.kind,
                    option_score: option.score,
                })
            })
            .collect()
    }
}

/// Normalize → split → per-token spelling exploration.
pub struct Lexer<L, B> {
    language: L,
    backend: B,
    weights: Weights,
    pool: rayon::ThreadPool,
}

impl<L, B> Lexer<L, B>
where
    L: LanguageProfile,
    B: SpellBackend,
{
    /// Builds a lexer, eagerly sizing its exploration worker pool to the
    /// physical CPU count plus one.
    pub fn new(language: L, backend: B, weights: Weights) -> Result<Self, NluError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get_physical() + 1)
            .build()
            .map_err(|e| NluError::BackendError(format!("building exploration pool: {e}")))?;

        Ok(Lexer { language, backend, weights, pool })
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Applies the language profile's rewrite cascade.
    pub fn normalize(&self, text: &str) -> String {
        let normalized = self.language.normalize(text);
        tracing::debug!(input = text, %normalized, "normalized text");
        normalized
    }

    /// Splits `text` into tokens, optionally running spelling exploration.
    pub fn tokenize(&self, text: &str, explore: bool) -> Result<Vec<Token>, NluError> {
        let tokens: Vec<Token> = self
            .language
            .split(text)
            .into_iter()
            .map(|surface| {
                let is_word = self.language.is_word(&surface);
                Token::new(surface, is_word)
            })
            .collect();

        tracing::debug!(token_count = tokens.len(), explore, "tokenized text");

        if !explore {
            return Ok(tokens);
        }

        self.explore_all(tokens)
    }

    /// `normalize` then `tokenize` with exploration enabled.
    pub fn process(&self, text: &str) -> Result<Vec<Token>, NluError> {
        let normalized = self.normalize(text);
        self.tokenize(&normalized, true)
    }

    fn explore_all(&self, tokens: Vec<Token>) -> Result<Vec<Token>, NluError> {
        tracing::debug!(token_count = tokens.len(), threads = self.pool.current_num_threads(), "exploring tokens");
        self.pool.install(|| {
            tokens
                .into_par_iter()
                .map(|token| self.explore(token))
                .collect()
        })
    }

    fn explore(&self, mut token: Token) -> Result<Token, NluError> {
        if !token.is_word {
            return Ok(token);
        }

        let origin = Trigram::new(&token.surface.to_lowercase());

        for suggestion in self.backend.suggest(&token.surface)? {
            if suggestion == token.surface {
                continue;
            }

            let words = self.language.split(&suggestion);
            let sim = origin.similarity(&Trigram::new(&suggestion.to_lowercase()));
            token.neighbors.push(Neighbor { words, sim });
        }

        token.stems = self.backend.stem(&token.surface)?;

        tracing::trace!(
            surface = %token.surface,
            neighbors = token.neighbors.len(),
            stems = token.stems.len(),
            "explored token"
        );

        Ok(token)
    }
}
