//! Nullifier derivation.
//!
//! ```text
//! private_key_hashed = H(limbs(private_key))
//! nullifier          = H(asset_id, private_key_hashed, counter)
//! ```
//!
//! The private key is hashed through its 64-bit limbs, the same representation
//! the circuit receives, so the in-circuit recomputation matches exactly.
//! Uniqueness against replay is enforced by the spent-nullifier registry, not here.

use ark_bn254::Fr;

use crate::limbs;
use crate::poseidon::PoseidonHasher;
use crate::scalar::Scalar256;

/// Output of a nullifier derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nullifier {
    pub private_key_hashed: Fr,
    pub nullifier: Fr,
}

/// `H(limbs(private_key))`.
pub fn hash_private_key(hasher: &PoseidonHasher, private_key: &Scalar256) -> Fr {
    hasher.hash(&limbs::to_fields(&limbs::encode(private_key)))
}

/// `H(asset_id, private_key_hashed, counter)`.
pub fn nullifier_from_hashed_key(
    hasher: &PoseidonHasher,
    asset_id: Fr,
    private_key_hashed: Fr,
    counter: u64,
) -> Fr {
    hasher.hash(&[asset_id, private_key_hashed, Fr::from(counter)])
}

/// Derive the hashed key and nullifier for one (key, asset, counter) triple.
pub fn derive_nullifier(
    hasher: &PoseidonHasher,
    private_key: &Scalar256,
    asset_id: Fr,
    counter: u64,
) -> Nullifier {
    let private_key_hashed = hash_private_key(hasher, private_key);
    Nullifier {
        private_key_hashed,
        nullifier: nullifier_from_hashed_key(hasher, asset_id, private_key_hashed, counter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Scalar256 {
        Scalar256::from_hex("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
            .unwrap()
    }

    #[test]
    fn test_deterministic() {
        let hasher = PoseidonHasher::new().unwrap();
        let a = derive_nullifier(&hasher, &key(), Fr::from(12345u64), 1);
        let b = derive_nullifier(&hasher, &key(), Fr::from(12345u64), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_counter_changes_nullifier() {
        let hasher = PoseidonHasher::new().unwrap();
        let first = derive_nullifier(&hasher, &key(), Fr::from(12345u64), 1);
        let second = derive_nullifier(&hasher, &key(), Fr::from(12345u64), 2);

        assert_eq!(first.private_key_hashed, second.private_key_hashed);
        assert_ne!(first.nullifier, second.nullifier);
    }

    #[test]
    fn test_asset_and_key_change_nullifier() {
        let hasher = PoseidonHasher::new().unwrap();
        let base = derive_nullifier(&hasher, &key(), Fr::from(12345u64), 1);
        let other_asset = derive_nullifier(&hasher, &key(), Fr::from(12346u64), 1);
        let other_key = derive_nullifier(&hasher, &Scalar256::from_u64(1), Fr::from(12345u64), 1);

        assert_ne!(base.nullifier, other_asset.nullifier);
        assert_ne!(base.nullifier, other_key.nullifier);
    }

    #[test]
    fn test_hashes_through_limbs() {
        let hasher = PoseidonHasher::new().unwrap();
        let limbs = limbs::encode(&key());
        let expected = hasher.hash(&limbs.map(Fr::from));
        assert_eq!(hash_private_key(&hasher, &key()), expected);
    }
}
