//! Asset-ownership leaf commitment.

use ark_bn254::Fr;

use crate::poseidon::PoseidonHasher;
use crate::scalar::Scalar256;

/// `H(asset_id, address)`: the SMT leaf value binding an asset to its owner.
pub fn leaf_commitment(hasher: &PoseidonHasher, asset_id: Fr, address: Fr) -> Fr {
    hasher.hash_two(asset_id, address)
}

/// The 256-bit message the owner signs: the leaf commitment as a big-endian integer.
pub fn message_hash(hasher: &PoseidonHasher, asset_id: Fr, address: Fr) -> Scalar256 {
    Scalar256::from_field(&leaf_commitment(hasher, asset_id, address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_deterministic() {
        let hasher = PoseidonHasher::new().unwrap();
        let asset = Fr::from(12345u64);
        let address = Fr::from(0xdead_beef_u64);

        assert_eq!(
            leaf_commitment(&hasher, asset, address),
            leaf_commitment(&hasher, asset, address)
        );
    }

    #[test]
    fn test_commitment_binds_address_and_asset() {
        let hasher = PoseidonHasher::new().unwrap();
        let asset = Fr::from(12345u64);

        let a = leaf_commitment(&hasher, asset, Fr::from(1u64));
        let b = leaf_commitment(&hasher, asset, Fr::from(2u64));
        let c = leaf_commitment(&hasher, Fr::from(12346u64), Fr::from(1u64));

        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_message_hash_is_commitment() {
        let hasher = PoseidonHasher::new().unwrap();
        let asset = Fr::from(7u64);
        let address = Fr::from(11u64);

        let msg = message_hash(&hasher, asset, address);
        assert_eq!(msg.to_field().unwrap(), leaf_commitment(&hasher, asset, address));
    }
}
