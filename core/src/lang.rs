//! `LanguageProfile` capability and the French (`fr_FR`) implementation.

use fancy_regex::{Captures, Regex};
use once_cell::sync::Lazy;
use unicode_normalization::UnicodeNormalization;

use crate::locale::Locale;

/// Capability a language must implement to be usable by the [`crate::lexer::Lexer`].
///
/// Implementations are expected to be cheap to share (`Send + Sync`):
/// the lexer may explore many tokens against the same profile concurrently.
pub trait LanguageProfile: Send + Sync {
    /// The locale this profile is configured for.
    fn locale(&self) -> &Locale;

    /// Rewrites messy input into a canonical, space-separated form.
    fn normalize(&self, text: &str) -> String;

    /// Splits a _normalized_ string into surface tokens.
    fn split(&self, text: &str) -> Vec<String>;

    /// Whether a token should be treated as a spell-checkable word (as
    /// opposed to punctuation, a number, etc).
    fn is_word(&self, token: &str) -> bool;

    /// Dictionary identifier to request from the spell-check backend.
    fn dictionary_id(&self) -> String {
        self.locale().unix_locale()
    }
}

/// Either a literal replacement template (with `\1`-style backreferences)
/// or a function computing the replacement from the match.
enum Replacement {
    Template(&'static str),
    Func(fn(&Captures) -> String),
}

struct Rewrite {
    pattern: Regex,
    replacement: Replacement,
}

impl Rewrite {
    fn apply(&self, text: &str) -> String {
        match &self.replacement {
            Replacement::Template(tpl) => regex_sub_template(&self.pattern, text, tpl),
            Replacement::Func(f) => regex_sub_fn(&self.pattern, text, f),
        }
    }
}

/// Expands `\1`, `\2`, ... backreferences in `template` against `caps`.
/// A non-participating group expands to the empty string, matching
/// Python's `re.sub` behavior.
fn expand_template(template: &str, caps: &Captures) -> String {
    let mut out = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if let Some(idx) = next.to_digit(10) {
                    chars.next();
                    if let Some(m) = caps.get(idx as usize) {
                        out.push_str(m.as_str());
                    }
                    continue;
                }
            }
        }
        out.push(c);
    }

    out
}

/// Applies a global regex substitution using a literal backreference
/// template, without relying on `fancy_regex`'s own replace helpers (whose
/// closure-based replace API varies across versions) — this walks matches
/// directly via `captures_iter`.
fn regex_sub_template(re: &Regex, text: &str, template: &str) -> String {
    regex_sub_fn(re, text, |caps| expand_template(template, caps))
}

/// `normalize` has no error return in its public contract, so a
/// `fancy_regex` backtracking-budget failure on a pathological input must
/// degrade gracefully rather than panic: this stops substituting with
/// `re` at the point of failure and leaves the remainder of `text`
/// untouched for this rewrite, instead of unwinding out of `Lexer::process`
/// ahead of the `catch_unwind` guards around rule evaluation.
fn regex_sub_fn(re: &Regex, text: &str, f: impl Fn(&Captures) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;

    for caps in re.captures_iter(text) {
        let caps = match caps {
            Ok(caps) => caps,
            Err(error) => {
                tracing::warn!(%error, "normalization regex exhausted its backtracking budget; leaving remainder unchanged");
                break;
            }
        };
        let m = caps.get(0).expect("group 0 always present");
        out.push_str(&text[last_end..m.start()]);
        out.push_str(&f(&caps));
        last_end = m.end();
    }

    out.push_str(&text[last_end..]);
    out
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid normalization regex {pattern:?}: {e}"))
}

/// Strips `.`, `-` and whitespace from a matched numeric/phone run,
/// keeping the decimal comma and any trailing currency/percent symbol.
fn compact_number(caps: &Captures) -> String {
    caps.get(0)
        .expect("group 0 always present")
        .as_str()
        .chars()
        .filter(|c| *c != '.' && *c != '-' && !c.is_whitespace())
        .collect()
}

/// Expands "M.L.Blindon"-style name initials by inserting a space after
/// each initial's dot.
fn expand_initials(caps: &Captures) -> String {
    static INITIAL_CHAR: Lazy<Regex> = Lazy::new(|| re(r"(\w)\s*\.\s*"));
    let matched = caps.get(0).expect("group 0 always present").as_str();
    regex_sub_template(&INITIAL_CHAR, matched, "\\1. ")
}

/// Normalizes date separators (`.` or `/`, with surrounding whitespace)
/// down to a bare `/`.
fn fix_date(caps: &Captures) -> String {
    static DATE_SEP: Lazy<Regex> = Lazy::new(|| re(r"\s*[./]\s*"));
    let matched = caps.get(0).expect("group 0 always present").as_str();
    regex_sub_template(&DATE_SEP, matched, "/")
}

fn build_french_rewrites() -> Vec<Rewrite> {
    vec![
        // 1. Numbers & phone-number compaction.
        Rewrite {
            pattern: re(
                r"((\d{1,3}(\s*\.\s*\d{3})*(\s*,\s*\d+)?|\d{1,3}(\s+\d{3})*(\s*,\s*\d+)?|\d+)(\s*[\u{20ac}$%])|\d+(\s*([.\-]\s*)?\d+(?!\d)){3,})",
            ),
            replacement: Replacement::Func(compact_number),
        },
        // 2. Ellipsis.
        Rewrite {
            pattern: re(r"\.\.\."),
            replacement: Replacement::Template("\u{2026}"),
        },
        // 3. Space around commas (but not inside numbers).
        Rewrite {
            pattern: re(r"(?i)([a-z\u{e9}\u{e0}\u{e8}\u{f9}\u{e2}\u{ea}\u{ee}\u{f4}\u{fb}\u{eb}\u{ef}\u{fc}\u{ff}\u{e7}]\s*)(,)(\s*\w)?"),
            replacement: Replacement::Template("\\1 \\2 \\3"),
        },
        // 4. Space around punctuation.
        Rewrite {
            pattern: re(r"(\w|\))\s*([!?;\u{2026}./])(\s*\w)?"),
            replacement: Replacement::Template("\\1 \\2 \\3"),
        },
        // 5. Space inside parentheses.
        Rewrite {
            pattern: re(r"\(([^)]+)\)"),
            replacement: Replacement::Template("( \\1 )"),
        },
        // 6. Apostrophe contractions to the typographic apostrophe.
        Rewrite {
            pattern: re(r"(\w)\s*'\s*(\w)"),
            replacement: Replacement::Template("\\1\u{2019}\\2"),
        },
        // 7. De-elide "t'il"/"t'elle".
        Rewrite {
            pattern: re(r"(t)\u{2019}(il|elle)"),
            replacement: Replacement::Template("\\1-\\2"),
        },
        // 8. Collapse whitespace.
        Rewrite {
            pattern: re(r"\s+"),
            replacement: Replacement::Template(" "),
        },
        // 9. Expand name initials.
        Rewrite {
            pattern: re(
                r"([A-Z\u{c9}\u{c0}\u{c8}\u{d9}\u{c2}\u{ca}\u{ce}\u{d4}\u{db}\u{cb}\u{cf}\u{dc}\u{178}\u{c7}]\s*\.\s*)+[A-Z\u{c9}\u{c0}\u{c8}\u{d9}\u{c2}\u{ca}\u{ce}\u{d4}\u{db}\u{cb}\u{cf}\u{dc}\u{178}\u{c7}][a-z\u{e9}\u{e0}\u{e8}\u{f9}\u{e2}\u{ea}\u{ee}\u{f4}\u{fb}\u{eb}\u{ef}\u{fc}\u{ff}\u{e7}]",
            ),
            replacement: Replacement::Func(expand_initials),
        },
        // 10. Fix date separators together.
        Rewrite {
            pattern: re(
                r"(\s|^)(\d{2}\s*/\s*\d{2}\s*/\s*(\d{2}|\d{4})(?!\d)\s*|\d{2}\s*\.\s*\d{2}\s*\.\s*(\d{2}|\d{4})(?!\d)\s*)",
            ),
            replacement: Replacement::Func(fix_date),
        },
        // 11. Strip leading/trailing whitespace.
        Rewrite {
            pattern: re(r"(^\s+|\s+$)"),
            replacement: Replacement::Template(""),
        },
    ]
}

static FRENCH_REWRITES: Lazy<Vec<Rewrite>> = Lazy::new(build_french_rewrites);

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)^([a-z\u{e9}\u{e0}\u{e8}\u{f9}\u{e2}\u{ea}\u{ee}\u{f4}\u{fb}\u{eb}\u{ef}\u{fc}\u{ff}\u{e7}]\u{2019})?[a-z\u{e9}\u{e0}\u{e8}\u{f9}\u{e2}\u{ea}\u{ee}\u{f4}\u{fb}\u{eb}\u{ef}\u{fc}\u{ff}\u{e7}-]+")
});

/// French (`fr_FR`) language profile.
pub struct FrenchProfile {
    locale: Locale,
}

impl FrenchProfile {
    pub fn new() -> Self {
        FrenchProfile {
            locale: Locale::parse("fr_FR").expect("fr_FR is a valid locale"),
        }
    }
}

impl Default for FrenchProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageProfile for FrenchProfile {
    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn normalize(&self, text: &str) -> String {
        // Compose first: the rewrite cascade's character classes match
        // precomposed accented letters (é, à, ...), not a base letter
        // followed by a combining mark, which some input sources (OS
        // clipboard paste, other normalization forms) may deliver.
        let composed: String = text.nfc().collect();

        FRENCH_REWRITES
            .iter()
            .fold(composed, |acc, rewrite| rewrite.apply(&acc))
    }

    fn split(&self, text: &str) -> Vec<String> {
        text.split(' ').map(str::to_string).collect()
    }

    fn is_word(&self, token: &str) -> bool {
        WORD_RE.is_match(token).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fr() -> FrenchProfile {
        FrenchProfile::new()
    }

    #[test]
    fn normalize_is_idempotent() {
        let lang = fr();
        let once = lang.normalize("J'ai perdu mes codes d'acc à mon site");
        let twice = lang.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalizes_apostrophes() {
        let lang = fr();
        assert_eq!(
            lang.normalize("J'ai perdu mes codes d'acc à mon site"),
            "J\u{2019}ai perdu mes codes d\u{2019}acc à mon site"
        );
    }

    #[test]
    fn compacts_phone_numbers() {
        let lang = fr();
        assert_eq!(
            lang.normalize("Mon numéro est le 06.11.78.04.60"),
            "Mon numéro est le 0611780460"
        );
    }

    #[test]
    fn expands_name_initials() {
        let lang = fr();
        assert_eq!(lang.normalize("Cdt, M.L. Blidon"), "Cdt , M. L. Blidon");
    }

    #[test]
    fn compacts_percent_with_spaced_number() {
        let lang = fr();
        assert_eq!(
            lang.normalize("vetements 100 % basques."),
            "vetements 100% basques ."
        );
    }

    #[test]
    fn splits_on_single_space() {
        let lang = fr();
        let normalized = lang.normalize("Accès refusé !");
        let tokens = lang.split(&normalized);
        assert_eq!(tokens, vec!["Accès", "refusé", "!"]);
    }

    #[test]
    fn composes_decomposed_accents_before_rewriting() {
        let lang = fr();
        // "e" (U+0065) + combining acute accent (U+0301), not precomposed é.
        let decomposed = "acc\u{0065}\u{0301}s refuse\u{0301}";
        let precomposed = "accès refusé";
        assert_eq!(lang.normalize(decomposed), lang.normalize(precomposed));
    }

    #[test]
    fn word_shape_excludes_punctuation_and_numbers() {
        let lang = fr();
        assert!(lang.is_word("refusé"));
        assert!(lang.is_word("d\u{2019}acc"));
        assert!(!lang.is_word("!"));
        assert!(!lang.is_word("100%"));
    }
}
