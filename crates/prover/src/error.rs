//! Errors raised while preparing a circuit input.

use asset_zk_circuits::PrimitiveError;
use thiserror::Error;

/// Errors during input preparation
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Primitive(#[from] PrimitiveError),
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
    #[error("Signing failed: {0}")]
    Signing(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Ledger error: {0}")]
    Ledger(String),
    #[error("Nullifier already spent: {0}")]
    NullifierSpent(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`PipelineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidEncoding,
    KeyDerivationError,
    KeyNotFound,
    DuplicateKey,
    PrimitiveFailure,
    Config,
    Ledger,
    Replay,
    Io,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Primitive(e) => match e {
                PrimitiveError::InvalidEncoding(_) => ErrorKind::InvalidEncoding,
                PrimitiveError::KeyNotFound(_) => ErrorKind::KeyNotFound,
                PrimitiveError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
                PrimitiveError::InvalidHeight(_) => ErrorKind::Config,
                PrimitiveError::DepthExceeded { .. } | PrimitiveError::PrimitiveFailure(_) => {
                    ErrorKind::PrimitiveFailure
                }
            },
            PipelineError::KeyDerivation(_) => ErrorKind::KeyDerivationError,
            PipelineError::Signing(_) | PipelineError::Serialization(_) => {
                ErrorKind::PrimitiveFailure
            }
            PipelineError::Config(_) => ErrorKind::Config,
            PipelineError::Ledger(_) => ErrorKind::Ledger,
            PipelineError::NullifierSpent(_) => ErrorKind::Replay,
            PipelineError::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let e = PipelineError::from(PrimitiveError::KeyNotFound("1".into()));
        assert_eq!(e.kind(), ErrorKind::KeyNotFound);
        assert_eq!(
            PipelineError::KeyDerivation("zero".into()).kind(),
            ErrorKind::KeyDerivationError
        );
        assert_eq!(
            PipelineError::Signing("x".into()).kind(),
            ErrorKind::PrimitiveFailure
        );
        assert_eq!(
            PipelineError::from(PrimitiveError::InvalidEncoding("x".into())).kind(),
            ErrorKind::InvalidEncoding
        );
    }
}
