//! Membership proof structure for SMT leaves.

use ark_bn254::Fr;
use ark_ff::Zero;

use super::tree::{key_bit, leaf_hash};
use crate::poseidon::PoseidonHasher;
use crate::scalar::field_to_decimal;

/// A fixed-length membership proof.
///
/// `siblings` always has exactly as many entries as the tree height. Levels
/// above the leaf hold the field zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembershipProof {
    key: Fr,
    value: Fr,
    siblings: Vec<Fr>,
}

impl MembershipProof {
    pub fn new(key: Fr, value: Fr, siblings: Vec<Fr>) -> Self {
        Self {
            key,
            value,
            siblings,
        }
    }

    pub fn key(&self) -> Fr {
        self.key
    }

    pub fn value(&self) -> Fr {
        self.value
    }

    /// Sibling hashes from the root level downwards, zero-padded.
    pub fn siblings(&self) -> &[Fr] {
        &self.siblings
    }

    /// Decimal renderings of the siblings, as written into circuit inputs.
    pub fn siblings_decimal(&self) -> Vec<String> {
        self.siblings.iter().map(field_to_decimal).collect()
    }

    /// Depth at which the leaf sits: one past the last non-zero sibling.
    pub fn leaf_depth(&self) -> usize {
        self.siblings
            .iter()
            .rposition(|s| !s.is_zero())
            .map_or(0, |i| i + 1)
    }

    /// Recompute the root from the leaf and its authentic path.
    pub fn compute_root(&self, hasher: &PoseidonHasher) -> Fr {
        let mut current = leaf_hash(hasher, self.key, self.value);

        for level in (0..self.leaf_depth()).rev() {
            let sibling = self.siblings[level];
            current = if key_bit(&self.key, level) {
                hasher.hash_two(sibling, current)
            } else {
                hasher.hash_two(current, sibling)
            };
        }

        current
    }

    /// Check this proof against an expected root.
    pub fn verify(&self, hasher: &PoseidonHasher, root: &Fr) -> bool {
        self.compute_root(hasher) == *root
    }
}
