//! Trigram similarity.
//!
//! Computes the set of length-3 sliding windows of a string (padded with a
//! single space at each end) and a Jaccard-style similarity between two
//! such sets. The algorithm mirrors PostgreSQL's `pg_trgm` module.

use std::collections::HashSet;

type Window = (char, char, char);

fn make_trigrams(s: &str) -> HashSet<Window> {
    let mut out = HashSet::new();
    let mut q: [Option<char>; 3] = [None, None, None];

    let mut push = |q: &mut [Option<char>; 3], x: Option<char>| -> Window {
        q[0] = q[1];
        q[1] = q[2];
        q[2] = x;
        (
            q[0].unwrap_or(' '),
            q[1].unwrap_or(' '),
            q[2].unwrap_or(' '),
        )
    };

    for c in s.chars() {
        out.insert(push(&mut q, Some(c)));
    }

    // One final window with a trailing None, matching `make_trigrams` in
    // the reference implementation, but only if the string produced at
    // least one window (an empty string has no trigrams at all).
    if q != [None, None, None] {
        out.insert(push(&mut q, None));
    }

    out
}

/// A "compiled" trigram set for a string, able to compute its similarity
/// with other such sets.
#[derive(Debug, Clone)]
pub struct Trigram {
    trigrams: HashSet<Window>,
}

impl Trigram {
    pub fn new(s: &str) -> Self {
        Trigram {
            trigrams: make_trigrams(s),
        }
    }

    /// Jaccard similarity between two trigram sets, in `[0, 1]`. Returns
    /// `0` if either set is empty.
    pub fn similarity(&self, other: &Trigram) -> f64 {
        if self.trigrams.is_empty() || other.trigrams.is_empty() {
            return 0.0;
        }

        let count = self.trigrams.intersection(&other.trigrams).count() as f64;
        let len1 = self.trigrams.len() as f64;
        let len2 = other.trigrams.len() as f64;

        count / (len1 + len2 - count)
    }
}

impl std::ops::Rem for &Trigram {
    type Output = f64;

    /// Shortcut notation mirroring the reference implementation's `%`
    /// operator overload.
    fn rem(self, other: &Trigram) -> f64 {
        self.similarity(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_similarity_is_one() {
        let t = Trigram::new("bonjour");
        assert_eq!(t.similarity(&t), 1.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = Trigram::new("bonjour");
        let b = Trigram::new("bonjours");
        assert_eq!(a.similarity(&b), b.similarity(&a));
    }

    #[test]
    fn similarity_is_bounded() {
        let a = Trigram::new("bonjour");
        let b = Trigram::new("saucisse");
        let sim = a.similarity(&b);
        assert!((0.0..=1.0).contains(&sim));
    }

    #[test]
    fn empty_string_has_zero_similarity() {
        let a = Trigram::new("");
        let b = Trigram::new("bonjour");
        assert_eq!(a.similarity(&b), 0.0);
    }
}
