use thiserror::Error;

/// Errors raised while interpreting backend codes and stored values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown user reaction code: {0}")]
    UnknownReaction(u8),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}
