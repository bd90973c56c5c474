//! Spell-check backend adapter.
//!
//! The spec treats the spell-checker as an external collaborator,
//! specified only by its interface (`suggest`/`stem`). No Hunspell
//! binding crate is present anywhere in this crate's dependency stack, so
//! [`WordListBackend`] provides a small, genuinely functional
//! implementation: a flat dictionary of known word forms (optionally
//! carrying an explicit stem), with `suggest` ranking dictionary entries
//! by [`Trigram`] similarity. Production deployments that do have a real
//! Hunspell binding available can implement [`SpellBackend`] directly
//! against it.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::NluError;
use crate::trigram::Trigram;

/// Default directory Hunspell-style dictionaries are conventionally kept
/// in, overridable with the `HUNSPELL_DATA_DIR` environment variable.
pub const DEFAULT_HUNSPELL_DATA_DIR: &str = "/usr/share/hunspell";

/// How many suggestions to keep in [`WordListBackend::suggest`], so a
/// large dictionary doesn't return an unbounded candidate list.
const MAX_SUGGESTIONS: usize = 8;

/// Minimum trigram similarity for a dictionary entry to be considered a
/// plausible suggestion at all.
const MIN_SUGGESTION_SIMILARITY: f64 = 0.2;

/// Operations consumed by the lexer from the spell-check backend.
///
/// Both operations are side-effect-free on the core; failures (missing
/// dictionary, corrupt data, backend misuse) propagate as
/// [`NluError::BackendError`].
pub trait SpellBackend: Send + Sync {
    /// Plausible respellings and single/compound variants for `word`, in
    /// the backend's own preference order.
    fn suggest(&self, word: &str) -> Result<Vec<String>, NluError>;

    /// Morphological base forms of `word`.
    fn stem(&self, word: &str) -> Result<Vec<String>, NluError>;
}

/// Returns the configured Hunspell dictionary directory.
pub fn hunspell_data_dir() -> PathBuf {
    env::var("HUNSPELL_DATA_DIR")
        .unwrap_or_else(|_| DEFAULT_HUNSPELL_DATA_DIR.to_string())
        .into()
}

/// A dictionary-backed [`SpellBackend`].
///
/// Entries are `(word, stem)` pairs, both compared case-insensitively.
/// `suggest` ranks every dictionary word by trigram similarity to the
/// query and returns the closest ones above a minimum threshold; `stem`
/// looks up the exact (case-insensitive) dictionary entry and returns its
/// associated stem(s).
#[derive(Debug, Clone, Default)]
pub struct WordListBackend {
    // word_lower -> (original-case word, stem, trigram)
    entries: Vec<(String, String, Trigram)>,
    stems: HashMap<String, Vec<String>>,
}

impl WordListBackend {
    /// Builds a backend from `(word, stem)` pairs.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut backend = WordListBackend::default();

        for (word, stem) in entries {
            backend.insert(word.into(), stem.into());
        }

        backend
    }

    fn insert(&mut self, word: String, stem: String) {
        let key = word.to_lowercase();
        let trigram = Trigram::new(&key);
        self.stems.entry(key.clone()).or_default().push(stem.clone());
        self.entries.push((word, stem, trigram));
    }

    /// Loads a dictionary file named `<dictionary_id>.dic` from `dir`.
    ///
    /// Each line is either a bare word (its own stem) or `word\tstem`.
    /// Blank lines and lines starting with `#` are ignored.
    pub fn load(dir: impl AsRef<Path>, dictionary_id: &str) -> Result<Self, NluError> {
        let path = dir.as_ref().join(format!("{dictionary_id}.dic"));
        let content = std::fs::read_to_string(&path).map_err(|e| {
            NluError::BackendError(format!("reading dictionary {}: {e}", path.display()))
        })?;

        let mut backend = WordListBackend::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once('\t') {
                Some((word, stem)) => backend.insert(word.trim().to_string(), stem.trim().to_string()),
                None => backend.insert(line.to_string(), line.to_string()),
            }
        }

        Ok(backend)
    }

    /// Loads from [`hunspell_data_dir`] using the environment default.
    pub fn load_default(dictionary_id: &str) -> Result<Self, NluError> {
        Self::load(hunspell_data_dir(), dictionary_id)
    }
}

impl SpellBackend for WordListBackend {
    fn suggest(&self, word: &str) -> Result<Vec<String>, NluError> {
        let query = Trigram::new(&word.to_lowercase());

        let mut ranked: Vec<(f64, &str)> = self
            .entries
            .iter()
            .map(|(original, _, trigram)| (query.similarity(trigram), original.as_str()))
            .filter(|(sim, _)| *sim >= MIN_SUGGESTION_SIMILARITY)
            .collect();

        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(MAX_SUGGESTIONS);

        Ok(ranked.into_iter().map(|(_, w)| w.to_string()).collect())
    }

    fn stem(&self, word: &str) -> Result<Vec<String>, NluError> {
        let key = word.to_lowercase();
        Ok(self.stems.get(&key).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> WordListBackend {
        WordListBackend::from_entries([
            ("bonjour", "bonjour"),
            ("bonjours", "bonjour"),
            ("aime", "aimer"),
            ("aimer", "aimer"),
            ("saucisse", "saucisse"),
            ("saucisses", "saucisse"),
        ])
    }

    #[test]
    fn suggest_ranks_by_similarity() {
        let b = backend();
        let suggestions = b.suggest("bonjour").unwrap();
        assert!(suggestions.contains(&"bonjours".to_string()));
    }

    #[test]
    fn stem_looks_up_case_insensitively() {
        let b = backend();
        assert_eq!(b.stem("AIME").unwrap(), vec!["aimer".to_string()]);
    }

    #[test]
    fn stem_of_unknown_word_is_empty() {
        let b = backend();
        assert!(b.stem("xyzzy").unwrap().is_empty());
    }

    #[test]
    fn missing_dictionary_file_is_a_backend_error() {
        let err = WordListBackend::load("/nonexistent/path", "fr_FR").unwrap_err();
        assert!(matches!(err, NluError::BackendError(_)));
    }
}
