//! Locale parsing — `Locale{lang, region}`.

use fancy_regex::Regex;
use once_cell::sync::Lazy;

use crate::error::NluError;

static LOCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([a-zA-Z]{2,3})[-_]([a-zA-Z]{2,3})$").expect("static regex"));

/// Neutral representation of a locale, which can then be derived to
/// different representations for different uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    pub lang: String,
    pub region: String,
}

impl Locale {
    /// Parses a locale string of the form `ll[-_]RR` (case-insensitive).
    pub fn parse(locale: &str) -> Result<Self, NluError> {
        let caps = LOCALE_RE
            .captures(locale)
            .ok()
            .flatten()
            .ok_or_else(|| NluError::InvalidLocale(locale.to_string()))?;

        Ok(Locale {
            lang: caps[1].to_lowercase(),
            region: caps[2].to_lowercase(),
        })
    }

    /// Conventional Unix locale representation (`ll_RR`), as consumed by
    /// Hunspell-style dictionary lookups.
    pub fn unix_locale(&self) -> String {
        format!("{}_{}", self.lang, self.region.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hyphenated_locale() {
        let l = Locale::parse("fr-FR").unwrap();
        assert_eq!(l.lang, "fr");
        assert_eq!(l.region, "fr");
        assert_eq!(l.unix_locale(), "fr_FR");
    }

    #[test]
    fn parses_underscored_locale() {
        let l = Locale::parse("fr_FR").unwrap();
        assert_eq!(l.unix_locale(), "fr_FR");
    }

    #[test]
    fn rejects_invalid_locale() {
        assert!(Locale::parse("not-a-locale!!").is_err());
        assert!(Locale::parse("french").is_err());
    }
}
