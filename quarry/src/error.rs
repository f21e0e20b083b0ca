//! Error types for request compilation and response decoding

use crate::validation::ValidationResults;

/// Errors raised while compiling requests or decoding responses
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The node tree has at least one fatal validation result. Every
    /// collected result is retained, not just the first.
    #[error("validation failed: {0}")]
    Validation(ValidationResults),

    /// A named sub-result exists but could not be decoded into the requested type
    #[error("failed to decode result `{name}`: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Validation results carried by this error, if it is a validation failure
    pub fn validation_results(&self) -> Option<&ValidationResults> {
        match self {
            Self::Validation(results) => Some(results),
            _ => None,
        }
    }
}

/// Why a single bulk response item could not be decoded. Sibling items are
/// unaffected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemDecodeError {
    #[error("expected exactly one action key in bulk item, found {0}")]
    KeyCount(usize),

    #[error("unknown bulk action `{0}`")]
    UnknownAction(String),

    #[error("malformed bulk item: {0}")]
    Malformed(String),
}
