//! Rule capability, nomination/flag records, and the reusable word-matcher.

use serde_json::Value as Payload;

use crate::lexer::{CandidateWord, OptionKind, WordRef};

/// A rule's claim that a specific candidate word is meaningful, carrying
/// a rule-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Nomination {
    pub word: WordRef,
    pub surface_lower: String,
    pub is_stem: bool,
    pub option_score: f64,
    pub flag: Flag,
}

/// The rule that produced a [`Nomination`], plus its arbitrary payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    pub rule: String,
    pub data: Payload,
}

/// One slot of a selection: either no rule claimed this position, or a
/// specific [`Nomination`] did. A genuine sum type, not a class hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum WordMatch {
    NoMatch,
    Nomination(Nomination),
}

impl WordMatch {
    pub fn is_match(&self) -> bool {
        matches!(self, WordMatch::Nomination(_))
    }

    pub fn nomination(&self) -> Option<&Nomination> {
        match self {
            WordMatch::NoMatch => None,
            WordMatch::Nomination(n) => Some(n),
        }
    }
}

/// Equality-comparable helper used by rule bodies to recognize a fixed
/// word by its lowercase surface and whether it must come from a stem
/// option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordMatcher {
    pub text: String,
    pub stem: bool,
}

impl WordMatcher {
    pub fn new(text: impl Into<String>, stem: bool) -> Self {
        WordMatcher { text: text.into(), stem }
    }

    /// Tests a not-yet-nominated candidate word (as seen by `nominate_words`).
    pub fn matches_candidate(&self, word: &CandidateWord) -> bool {
        word.surface_lower == self.text && (word.kind == OptionKind::Stem) == self.stem
    }

    /// Tests a selection slot, delegating to its nomination's word.
    pub fn matches(&self, word_match: &WordMatch) -> bool {
        match word_match {
            WordMatch::NoMatch => false,
            WordMatch::Nomination(n) => n.surface_lower == self.text && n.is_stem == self.stem,
        }
    }
}

/// Capability every grammar rule implements.
///
/// `nominate_words` defaults to nominating nothing, so rules that only
/// participate in global scoring (like [`MaximizeMatch`]) need not
/// override it.
pub trait Rule: Send + Sync {
    /// Emits nominations for candidate words this rule considers relevant.
    /// Must only nominate words drawn from `words`.
    fn nominate_words(&self, words: &[CandidateWord]) -> Vec<Nomination> {
        let _ = words;
        Vec::new()
    }

    /// Scores a full selection (lower is better, preferred range
    /// `[0, 1]`), or returns `None` to reject the selection outright.
    fn evaluate(&self, selection: &[WordMatch]) -> Option<f64>;
}

/// A named, weighted rule as registered with the parser/optimizer.
pub struct RuleInfo {
    pub rule: Box<dyn Rule>,
    pub weight: f64,
    pub name: String,
}

impl RuleInfo {
    pub fn new(name: impl Into<String>, weight: f64, rule: Box<dyn Rule>) -> Self {
        RuleInfo { rule, weight, name: name.into() }
    }
}

/// Keyword-sequence rule: nominates any candidate word matching one of a
/// fixed, ordered list of stems, then evaluates by checking that the
/// matched positions appear in order and scoring how spread out they are.
pub struct SausageRule {
    pub keywords: Vec<String>,
}

impl SausageRule {
    pub fn new(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SausageRule {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    fn gap_to_score(gap: usize) -> f64 {
        match gap {
            0 | 1 | 2 => 0.0,
            3 => 0.25,
            4 => 0.5,
            _ => 1.0,
        }
    }
}

impl Rule for SausageRule {
    fn nominate_words(&self, words: &[CandidateWord]) -> Vec<Nomination> {
        let mut out = Vec::new();

        for keyword in &self.keywords {
            let matcher = WordMatcher::new(keyword.clone(), true);

            for word in words {
                if matcher.matches_candidate(word) {
                    out.push(Nomination {
                        word: word.at,
                        surface_lower: word.surface_lower.to_string(),
                        is_stem: true,
                        option_score: word.option_score,
                        flag: Flag {
                            rule: "sausage".to_string(),
                            data: Payload::from(keyword.clone()),
                        },
                    });
                }
            }
        }

        out
    }

    /// Locates each keyword's position directly via [`WordMatcher`]
    /// equality against the selection, exactly as the reference rule
    /// walks its selection once per keyword: a keyword found at more than
    /// one position is a duplicate and rejects the selection, same as one
    /// never found at all.
    fn evaluate(&self, selection: &[WordMatch]) -> Option<f64> {
        let mut positions = Vec::with_capacity(self.keywords.len());

        for keyword in &self.keywords {
            let matcher = WordMatcher::new(keyword.clone(), true);
            let mut found: Option<usize> = None;

            for (index, word_match) in selection.iter().enumerate() {
                if matcher.matches(word_match) {
                    if found.is_some() {
                        return None;
                    }
                    found = Some(index);
                }
            }

            positions.push(found?);
        }

        if positions.windows(2).any(|w| w[1] <= w[0]) {
            return None;
        }

        let gap = positions.last()? - positions.first()?;
        Some(Self::gap_to_score(gap))
    }
}

/// Rewards selections where a large fraction of slots are matched.
pub struct MaximizeMatch;

impl Rule for MaximizeMatch {
    fn evaluate(&self, selection: &[WordMatch]) -> Option<f64> {
        if selection.is_empty() {
            return Some(0.0);
        }

        let matched = selection.iter().filter(|wm| wm.is_match()).count();
        Some(1.0 - (matched as f64 / selection.len() as f64))
    }
}

/// Rewards selections whose nominated words came from high-similarity
/// options.
pub struct MaximizeSimilarity;

impl Rule for MaximizeSimilarity {
    fn evaluate(&self, selection: &[WordMatch]) -> Option<f64> {
        let penalties: Vec<f64> = selection
            .iter()
            .filter_map(|wm| wm.nomination().map(|n| 1.0 - n.option_score))
            .collect();

        if penalties.is_empty() {
            return None;
        }

        Some(penalties.iter().sum::<f64>() / penalties.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nomination(rule: &str, index: u64, surface_lower: &str, option_score: f64) -> Nomination {
        Nomination {
            word: WordRef { token: 0, option: 0, word: 0 },
            surface_lower: surface_lower.to_string(),
            is_stem: true,
            option_score,
            flag: Flag { rule: rule.to_string(), data: Payload::from(index) },
        }
    }

    #[test]
    fn word_matcher_respects_stem_flag() {
        let candidate = CandidateWord {
            at: WordRef { token: 0, option: 1, word: 0 },
            surface: "Aime",
            surface_lower: "aime",
            kind: OptionKind::Stem,
            option_score: 0.95,
        };
        assert!(WordMatcher::new("aime", true).matches_candidate(&candidate));
        assert!(!WordMatcher::new("aime", false).matches_candidate(&candidate));
    }

    #[test]
    fn maximize_match_rewards_full_matches() {
        let selection = vec![
            WordMatch::Nomination(nomination("sausage", 0, "aime", 1.0)),
            WordMatch::Nomination(nomination("sausage", 1, "saucisse", 1.0)),
        ];
        assert_eq!(MaximizeMatch.evaluate(&selection), Some(0.0));
    }

    #[test]
    fn maximize_match_on_empty_selection_is_zero() {
        assert_eq!(MaximizeMatch.evaluate(&[]), Some(0.0));
    }

    #[test]
    fn maximize_similarity_is_none_without_nominations() {
        assert_eq!(MaximizeSimilarity.evaluate(&[WordMatch::NoMatch]), None);
    }

    #[test]
    fn maximize_similarity_averages_one_minus_score() {
        let selection = vec![
            WordMatch::Nomination(nomination("sausage", 0, "aime", 0.9)),
            WordMatch::Nomination(nomination("sausage", 1, "saucisse", 0.7)),
        ];
        assert_eq!(MaximizeSimilarity.evaluate(&selection), Some(0.2));
    }

    #[test]
    fn sausage_rule_scores_in_order_keywords() {
        let rule = SausageRule::new(["aimer", "saucisse"]);
        let selection = vec![
            WordMatch::Nomination(nomination("sausage", 0, "aimer", 1.0)),
            WordMatch::NoMatch,
            WordMatch::Nomination(nomination("sausage", 1, "saucisse", 1.0)),
        ];
        assert_eq!(rule.evaluate(&selection), Some(0.0));
    }

    #[test]
    fn sausage_rule_rejects_missing_keyword() {
        let rule = SausageRule::new(["aimer", "saucisse"]);
        let selection = vec![WordMatch::Nomination(nomination("sausage", 0, "aimer", 1.0))];
        assert_eq!(rule.evaluate(&selection), None);
    }

    #[test]
    fn sausage_rule_rejects_out_of_order_keywords() {
        let rule = SausageRule::new(["aimer", "saucisse"]);
        let selection = vec![
            WordMatch::Nomination(nomination("sausage", 1, "saucisse", 1.0)),
            WordMatch::Nomination(nomination("sausage", 0, "aimer", 1.0)),
        ];
        assert_eq!(rule.evaluate(&selection), None);
    }

    #[test]
    fn sausage_rule_rejects_duplicated_keyword() {
        // "aimer" nominated at two positions: even though both are also
        // followed by "saucisse" in order, a keyword seen twice must
        // reject the whole selection rather than accept its first
        // occurrence.
        let rule = SausageRule::new(["aimer", "saucisse"]);
        let selection = vec![
            WordMatch::Nomination(nomination("sausage", 0, "aimer", 1.0)),
            WordMatch::Nomination(nomination("sausage", 0, "aimer", 1.0)),
            WordMatch::Nomination(nomination("sausage", 1, "saucisse", 1.0)),
        ];
        assert_eq!(rule.evaluate(&selection), None);
    }

    #[test]
    fn word_matcher_matches_delegates_to_nomination_word() {
        let n = nomination("sausage", 0, "aimer", 1.0);
        assert!(WordMatcher::new("aimer", true).matches(&WordMatch::Nomination(n.clone())));
        assert!(!WordMatcher::new("aimer", false).matches(&WordMatch::Nomination(n)));
        assert!(!WordMatcher::new("aimer", true).matches(&WordMatch::NoMatch));
    }
}
