//! Error types for the diff crate.

use strucmp_types::ValueKind;

/// Errors that abort a comparison.
///
/// Finding differences is never an error; these variants mean no report
/// could be produced at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// A root value was neither a map nor a list.
    #[error("origin and current data must be a map or a list, got {origin} and {current}")]
    InvalidInput { origin: ValueKind, current: ValueKind },

    /// The trees are nested deeper than the configured limit.
    #[error("comparison depth limit of {limit} exceeded at '{path}'")]
    DepthExceeded { limit: usize, path: String },

    /// An exclude pattern could not be parsed.
    #[error("malformed exclude pattern {pattern:?}: {reason}")]
    MalformedExcludePattern { pattern: String, reason: String },
}

impl DiffError {
    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        Self::MalformedExcludePattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
