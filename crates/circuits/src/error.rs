//! Errors raised by the field-level primitives.

use thiserror::Error;

/// Errors that can occur while encoding values, hashing, or maintaining the SMT.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("Key not found in sparse merkle tree: {0}")]
    KeyNotFound(String),
    #[error("Key {key} already holds value {existing}, refusing to overwrite with {attempted}")]
    DuplicateKey {
        key: String,
        existing: String,
        attempted: String,
    },
    #[error("Keys cannot be separated within a tree of height {height}")]
    DepthExceeded { height: usize },
    #[error("Invalid tree height {0}")]
    InvalidHeight(usize),
    #[error("Primitive failure: {0}")]
    PrimitiveFailure(String),
}
