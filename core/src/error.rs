//! Error types for the interpretation pipeline.

use thiserror::Error;

/// Errors that can escape the public API.
///
/// `OptimizerFailure` deliberately has no variant here: per the pipeline's
/// contract it is recovered internally into a zero-score, all-`NoMatch`
/// [`crate::optimizer::Match`] rather than surfaced to the caller.
#[derive(Debug, Error)]
pub enum NluError {
    /// A locale string did not match `ll[-_]RR`.
    #[error("invalid locale: {0}")]
    InvalidLocale(String),

    /// The spell-check backend failed (missing/corrupt dictionary, I/O
    /// error, or backend-specific misuse).
    #[error("spell-check backend error: {0}")]
    BackendError(String),

    /// A user-supplied rule raised an error from `nominate_words` or
    /// `evaluate` instead of returning `None`.
    #[error("rule {rule} failed: {source}")]
    RuleError {
        rule: String,
        #[source]
        source: anyhow::Error,
    },
}
