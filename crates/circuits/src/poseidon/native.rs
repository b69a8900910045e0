//! Native Poseidon hashing (outside circuits).

use std::sync::Arc;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{PoseidonConfig, PoseidonSponge};
use ark_crypto_primitives::sponge::CryptographicSponge;

use super::config::poseidon_config;
use crate::error::PrimitiveError;
use crate::scalar::field_to_decimal;

/// Handle to an initialized Poseidon instance.
///
/// Cloning is cheap; the parameters are shared behind an `Arc` and never mutated.
#[derive(Clone)]
pub struct PoseidonHasher {
    config: Arc<PoseidonConfig<Fr>>,
}

impl PoseidonHasher {
    /// Acquire a hasher with the standard BN254 parameters.
    pub fn new() -> Result<Self, PrimitiveError> {
        Self::with_config(poseidon_config())
    }

    /// Acquire a hasher with caller-supplied parameters after checking their shape.
    pub fn with_config(config: PoseidonConfig<Fr>) -> Result<Self, PrimitiveError> {
        let width = config.rate + config.capacity;
        if config.rate == 0 || config.capacity == 0 {
            return Err(PrimitiveError::PrimitiveFailure(
                "poseidon rate and capacity must be non-zero".into(),
            ));
        }
        if config.full_rounds % 2 != 0 {
            return Err(PrimitiveError::PrimitiveFailure(format!(
                "poseidon full rounds must be even, got {}",
                config.full_rounds
            )));
        }
        if config.ark.len() != config.full_rounds + config.partial_rounds
            || config.ark.iter().any(|row| row.len() != width)
        {
            return Err(PrimitiveError::PrimitiveFailure(
                "poseidon round constants do not match round count and width".into(),
            ));
        }
        if config.mds.len() != width || config.mds.iter().any(|row| row.len() != width) {
            return Err(PrimitiveError::PrimitiveFailure(format!(
                "poseidon MDS matrix must be {width}x{width}"
            )));
        }

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Sponge parameters, for building in-circuit gadgets that must match.
    pub fn config(&self) -> &PoseidonConfig<Fr> {
        &self.config
    }

    /// Hash a sequence of field elements.
    pub fn hash(&self, inputs: &[Fr]) -> Fr {
        let mut sponge = PoseidonSponge::new(&self.config);
        sponge.absorb(&Fr::from(inputs.len() as u64));
        for input in inputs {
            sponge.absorb(input);
        }
        sponge.squeeze_field_elements::<Fr>(1)[0]
    }

    /// Hash two field elements.
    pub fn hash_two(&self, a: Fr, b: Fr) -> Fr {
        self.hash(&[a, b])
    }

    /// Decimal rendering of a hash output.
    pub fn to_decimal(element: &Fr) -> String {
        field_to_decimal(element)
    }
}

impl std::fmt::Debug for PoseidonHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseidonHasher")
            .field("rate", &self.config.rate)
            .field("full_rounds", &self.config.full_rounds)
            .field("partial_rounds", &self.config.partial_rounds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::One;

    #[test]
    fn test_hash_deterministic() {
        let hasher = PoseidonHasher::new().unwrap();
        let a = Fr::from(42u64);
        let b = Fr::from(123u64);

        assert_eq!(hasher.hash_two(a, b), hasher.hash_two(a, b));
    }

    #[test]
    fn test_independent_handles_agree() {
        let h1 = PoseidonHasher::new().unwrap();
        let h2 = PoseidonHasher::new().unwrap();
        let inputs = [Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)];
        assert_eq!(h1.hash(&inputs), h2.hash(&inputs));
    }

    #[test]
    fn test_arity_is_bound() {
        let hasher = PoseidonHasher::new().unwrap();
        let one = hasher.hash(&[Fr::one()]);
        let padded = hasher.hash(&[Fr::one(), Fr::from(0u64)]);
        assert_ne!(one, padded);
    }

    #[test]
    fn test_rejects_malformed_config() {
        let mut config = poseidon_config();
        config.ark.pop();
        assert!(matches!(
            PoseidonHasher::with_config(config),
            Err(PrimitiveError::PrimitiveFailure(_))
        ));

        let mut config = poseidon_config();
        config.mds[0].pop();
        assert!(PoseidonHasher::with_config(config).is_err());
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(PoseidonHasher::to_decimal(&Fr::from(0u64)), "0");
        assert_eq!(PoseidonHasher::to_decimal(&Fr::from(31337u64)), "31337");
    }
}
