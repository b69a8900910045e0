//! Spent-nullifier tracking.

use std::collections::HashSet;

use ark_bn254::Fr;

use asset_zk_circuits::{field_from_decimal, field_to_decimal};

use crate::error::PipelineError;

/// Records which nullifiers have been consumed. Nullifiers are canonical
/// decimal strings, as they appear in the circuit input.
pub trait NullifierRegistry {
    fn is_spent(&self, nullifier: &str) -> Result<bool, PipelineError>;

    /// Marks the nullifier spent. A nullifier seen before is rejected.
    fn mark_spent(&mut self, nullifier: &str) -> Result<(), PipelineError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryNullifierRegistry {
    spent: HashSet<String>,
}

impl MemoryNullifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.spent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }
}

/// Parse and re-render so `"007"` and `"7"` name the same nullifier.
fn canonical(nullifier: &str) -> Result<String, PipelineError> {
    let element: Fr = field_from_decimal(nullifier.trim())?;
    Ok(field_to_decimal(&element))
}

impl NullifierRegistry for MemoryNullifierRegistry {
    fn is_spent(&self, nullifier: &str) -> Result<bool, PipelineError> {
        Ok(self.spent.contains(&canonical(nullifier)?))
    }

    fn mark_spent(&mut self, nullifier: &str) -> Result<(), PipelineError> {
        let key = canonical(nullifier)?;
        if !self.spent.insert(key.clone()) {
            return Err(PipelineError::NullifierSpent(key));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_replay_rejected() {
        let mut registry = MemoryNullifierRegistry::new();
        assert!(!registry.is_spent("42").unwrap());
        registry.mark_spent("42").unwrap();
        assert!(registry.is_spent("42").unwrap());

        let err = registry.mark_spent("0042").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Replay);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_malformed_nullifier() {
        let mut registry = MemoryNullifierRegistry::new();
        let err = registry.mark_spent("0x2a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
        assert!(registry.is_spent("").is_err());
        assert!(registry.is_empty());
    }
}
