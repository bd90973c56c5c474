//! Builds, for each token, the set of candidate (option × per-word
//! nomination) sequences surviving all-`NoMatch` pruning.

use std::collections::HashMap;

use crate::lexer::{Token, WordRef};
use crate::rules::{RuleInfo, WordMatch};
use crate::weights::Weights;

/// Per token, the candidate selections surviving pruning.
///
/// `token` is the index of the originating [`Token`] rather than a
/// reference to it, so an `Interpretation` never outlives its backing
/// token slice by construction.
#[derive(Debug, Clone)]
pub struct Interpretation {
    pub token: usize,
    pub nominations: Vec<Vec<WordMatch>>,
}

/// Builds every token's product of option-word candidates, bucketing rule
/// nominations first so each slot only has to look itself up once.
pub fn nominate(tokens: &[Token], rules: &[RuleInfo], weights: &Weights) -> Vec<Interpretation> {
    let all_candidates: Vec<_> = tokens
        .iter()
        .enumerate()
        .flat_map(|(index, token)| token.candidates(index, weights))
        .collect();

    let mut by_word: HashMap<WordRef, Vec<WordMatch>> = HashMap::new();

    for rule in rules {
        for nomination in rule.rule.nominate_words(&all_candidates) {
            by_word
                .entry(nomination.word)
                .or_default()
                .push(WordMatch::Nomination(nomination));
        }
    }

    let interpretations: Vec<Interpretation> = tokens
        .iter()
        .enumerate()
        .map(|(token_index, token)| {
            let options = token.options(weights);
            let mut nominations = Vec::new();

            for (option_index, option) in options.iter().enumerate() {
                // Independent allocation per slot: never replicate a single
                // templated Vec across positions, or extensions at one
                // slot would leak into every other slot.
                let slots: Vec<Vec<WordMatch>> = (0..option.words.len())
                    .map(|word_index| {
                        let word_ref = WordRef { token: token_index, option: option_index, word: word_index };
                        let mut slot = vec![WordMatch::NoMatch];
                        if let Some(found) = by_word.get(&word_ref) {
                            slot.extend(found.iter().cloned());
                        }
                        slot
                    })
                    .collect();

                for product in cartesian_product(&slots) {
                    if product.iter().any(WordMatch::is_match) {
                        nominations.push(product);
                    }
                }
            }

            Interpretation { token: token_index, nominations }
        })
        .collect();

    tracing::debug!(
        token_count = tokens.len(),
        rule_count = rules.len(),
        surviving = interpretations.iter().filter(|i| !i.nominations.is_empty()).count(),
        "nominated interpretations"
    );

    interpretations
}

fn cartesian_product(slots: &[Vec<WordMatch>]) -> Vec<Vec<WordMatch>> {
    let mut result: Vec<Vec<WordMatch>> = vec![Vec::new()];

    for slot in slots {
        let mut next = Vec::with_capacity(result.len() * slot.len().max(1));

        for prefix in &result {
            for item in slot {
                let mut combined = prefix.clone();
                combined.push(item.clone());
                next.push(combined);
            }
        }

        result = next;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::FrenchProfile;
    use crate::lexer::Lexer;
    use crate::rules::{MaximizeMatch, SausageRule};
    use crate::spellcheck::WordListBackend;

    fn lexer() -> Lexer<FrenchProfile, WordListBackend> {
        let backend = WordListBackend::from_entries([
            ("j\u{2019}aime", "aimer"),
            ("saucisses", "saucisse"),
        ]);
        Lexer::new(FrenchProfile::new(), backend, Weights::default()).unwrap()
    }

    #[test]
    fn tokens_with_no_keyword_match_have_empty_nominations() {
        let lx = lexer();
        let tokens = lx.process("les bananes").unwrap();
        let rules = vec![RuleInfo::new("sausage", 1.0, Box::new(SausageRule::new(["aimer"])))];
        let interpretations = nominate(&tokens, &rules, lx.weights());
        assert!(interpretations.iter().all(|i| i.nominations.is_empty()));
    }

    #[test]
    fn keyword_stem_produces_a_surviving_interpretation() {
        let lx = lexer();
        let tokens = lx.process("j'aime les saucisses").unwrap();
        let rules = vec![RuleInfo::new("sausage", 1.0, Box::new(SausageRule::new(["aimer", "saucisse"])))];
        let interpretations = nominate(&tokens, &rules, lx.weights());
        assert!(interpretations.iter().any(|i| !i.nominations.is_empty()));
    }

    #[test]
    fn rule_with_only_evaluate_contributes_no_nominations() {
        let lx = lexer();
        let tokens = lx.process("bonjour").unwrap();
        let rules = vec![RuleInfo::new("max_match", 1.0, Box::new(MaximizeMatch))];
        let interpretations = nominate(&tokens, &rules, lx.weights());
        assert!(interpretations.iter().all(|i| i.nominations.is_empty()));
    }

    #[test]
    fn slot_extension_never_leaks_across_positions() {
        // Two-word option ("bon", "jour"): nominating the first word must
        // not also populate the second word's slot.
        let lx = lexer();
        let tokens = lx.process("bonjour").unwrap();
        let rules: Vec<RuleInfo> = vec![];
        let interpretations = nominate(&tokens, &rules, lx.weights());
        for interpretation in &interpretations {
            for product in &interpretation.nominations {
                assert!(product.iter().any(WordMatch::is_match));
            }
        }
    }
}
