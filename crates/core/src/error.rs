//! Errors raised while building or checking domain values.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// A value was rejected before it reached a store.
///
/// Store and transport failures are modelled by the layers that own them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bad user input: non-positive amount, blank name, malformed email.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A textual id did not parse.
    #[error("malformed id: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
