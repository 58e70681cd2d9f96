//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A story, node, card or player was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was being looked up (`"story"`, `"card"`, ...).
        kind: &'static str,
        /// The identifier that did not resolve.
        id: String,
    },

    /// A story document is structurally invalid.
    #[error("parse error: {0}")]
    Parse(String),

    /// The requested choice index is outside the visible choice list.
    #[error("invalid choice {index}: {visible} choice(s) available")]
    InvalidChoice {
        /// The index the player asked for.
        index: usize,
        /// How many choices were visible at the time.
        visible: usize,
    },

    /// A choice points at a node that does not exist in the story.
    #[error("invalid target: node {0} does not exist")]
    InvalidTarget(String),

    /// Bad input from the caller.
    #[error("validation error: {0}")]
    Validation(String),

    /// Progress store or reward ledger failure.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// Any other infrastructure problem (poisoned locks, I/O).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::NotFound`].
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}
