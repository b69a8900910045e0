//! Sparse Merkle Tree native implementation.
//!
//! Layout follows the iden3 SMT used by circom's `SMTVerifier`:
//! - a leaf hashes as `H(key, value, 1)`, an internal node as `H(left, right)`
//! - the empty subtree is the field zero
//! - the path of a key is its bit decomposition, least-significant bit first
//! - a leaf lives at the shallowest level that separates it from every other leaf
//!
//! A tree with a single leaf therefore has that leaf's hash as its root and an
//! empty authentic sibling path.

use std::collections::HashMap;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField, Zero};

use super::proof::MembershipProof;
use crate::error::PrimitiveError;
use crate::poseidon::PoseidonHasher;
use crate::scalar::field_to_decimal;

/// Default tree height (20 levels, the height wired into the ownership circuit)
pub const DEFAULT_HEIGHT: usize = 20;

/// Largest usable height: keys are BN254 elements with 254 significant bits.
pub const MAX_HEIGHT: usize = Fr::MODULUS_BIT_SIZE as usize;

#[derive(Clone, Debug)]
enum Node {
    Leaf { key: Fr, value: Fr },
    Internal { left: Fr, right: Fr },
}

/// Result of walking the tree along a key's path.
enum Lookup {
    Found { value: Fr, siblings: Vec<Fr> },
    Empty { siblings: Vec<Fr> },
    Collision { key: Fr, value: Fr, siblings: Vec<Fr> },
}

/// Fixed-height sparse Merkle tree keyed by field elements.
#[derive(Clone)]
pub struct SparseMerkleTree {
    height: usize,
    hasher: PoseidonHasher,

    /// Node storage keyed by node hash
    nodes: HashMap<Fr, Node>,

    /// Leaf values: key -> value
    leaves: HashMap<Fr, Fr>,

    root: Fr,
}

impl SparseMerkleTree {
    /// Create a new empty SMT with the given height.
    pub fn new(hasher: PoseidonHasher, height: usize) -> Result<Self, PrimitiveError> {
        if height == 0 || height > MAX_HEIGHT {
            return Err(PrimitiveError::InvalidHeight(height));
        }

        Ok(Self {
            height,
            hasher,
            nodes: HashMap::new(),
            leaves: HashMap::new(),
            root: Fr::zero(),
        })
    }

    /// Create an SMT from a list of (key, value) pairs.
    pub fn from_leaves(
        hasher: PoseidonHasher,
        height: usize,
        leaves: &[(Fr, Fr)],
    ) -> Result<Self, PrimitiveError> {
        let mut tree = Self::new(hasher, height)?;
        for &(key, value) in leaves {
            tree.insert(key, value)?;
        }
        Ok(tree)
    }

    /// Insert a leaf and return the new root.
    ///
    /// Re-inserting an identical pair is a no-op. A different value at an
    /// existing key fails with [`PrimitiveError::DuplicateKey`].
    pub fn insert(&mut self, key: Fr, value: Fr) -> Result<Fr, PrimitiveError> {
        let mut siblings = match self.lookup(&key)? {
            Lookup::Found { value: existing, .. } if existing == value => return Ok(self.root),
            Lookup::Found { value: existing, .. } => {
                return Err(PrimitiveError::DuplicateKey {
                    key: field_to_decimal(&key),
                    existing: field_to_decimal(&existing),
                    attempted: field_to_decimal(&value),
                })
            }
            Lookup::Empty { siblings } => siblings,
            Lookup::Collision {
                key: old_key,
                value: old_value,
                mut siblings,
            } => {
                // Push both leaves down until their paths diverge.
                let mut level = siblings.len();
                while level < self.height && key_bit(&old_key, level) == key_bit(&key, level) {
                    siblings.push(Fr::zero());
                    level += 1;
                }
                if level == self.height {
                    return Err(PrimitiveError::DepthExceeded {
                        height: self.height,
                    });
                }
                siblings.push(self.hash_leaf(old_key, old_value));
                siblings
            }
        };

        let mut node = self.hash_leaf(key, value);
        self.nodes.insert(node, Node::Leaf { key, value });

        while let Some(sibling) = siblings.pop() {
            let level = siblings.len();
            let (left, right) = if key_bit(&key, level) {
                (sibling, node)
            } else {
                (node, sibling)
            };
            node = self.hasher.hash_two(left, right);
            self.nodes.insert(node, Node::Internal { left, right });
        }

        self.leaves.insert(key, value);
        self.root = node;
        Ok(node)
    }

    /// Look up a key and return its value with a sibling path padded to the tree height.
    pub fn find(&self, key: &Fr) -> Result<MembershipProof, PrimitiveError> {
        match self.lookup(key)? {
            Lookup::Found {
                value,
                mut siblings,
            } => {
                siblings.resize(self.height, Fr::zero());
                Ok(MembershipProof::new(*key, value, siblings))
            }
            _ => Err(PrimitiveError::KeyNotFound(field_to_decimal(key))),
        }
    }

    /// Walk from the root along `key`'s path, collecting siblings.
    fn lookup(&self, key: &Fr) -> Result<Lookup, PrimitiveError> {
        let mut siblings = Vec::new();
        let mut current = self.root;

        loop {
            if current.is_zero() {
                return Ok(Lookup::Empty { siblings });
            }

            match self.nodes.get(&current) {
                Some(Node::Leaf {
                    key: leaf_key,
                    value,
                }) => {
                    return Ok(if leaf_key == key {
                        Lookup::Found {
                            value: *value,
                            siblings,
                        }
                    } else {
                        Lookup::Collision {
                            key: *leaf_key,
                            value: *value,
                            siblings,
                        }
                    });
                }
                Some(Node::Internal { left, right }) => {
                    let level = siblings.len();
                    if level >= self.height {
                        return Err(PrimitiveError::PrimitiveFailure(format!(
                            "internal node below height {}",
                            self.height
                        )));
                    }
                    if key_bit(key, level) {
                        siblings.push(*left);
                        current = *right;
                    } else {
                        siblings.push(*right);
                        current = *left;
                    }
                }
                None => {
                    return Err(PrimitiveError::PrimitiveFailure(format!(
                        "dangling node {}",
                        field_to_decimal(&current)
                    )))
                }
            }
        }
    }

    fn hash_leaf(&self, key: Fr, value: Fr) -> Fr {
        leaf_hash(&self.hasher, key, value)
    }

    /// Get the value stored at a key.
    pub fn get(&self, key: &Fr) -> Option<Fr> {
        self.leaves.get(key).copied()
    }

    /// Get the current root hash.
    pub fn root(&self) -> Fr {
        self.root
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get all leaves.
    pub fn leaves(&self) -> impl Iterator<Item = (Fr, Fr)> + '_ {
        self.leaves.iter().map(|(&k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

/// Leaf hash `H(key, value, 1)`.
pub(crate) fn leaf_hash(hasher: &PoseidonHasher, key: Fr, value: Fr) -> Fr {
    hasher.hash(&[key, value, Fr::from(1u64)])
}

/// Bit `level` of the key, least-significant first.
pub(crate) fn key_bit(key: &Fr, level: usize) -> bool {
    key.into_bigint().get_bit(level)
}

#[cfg(test)]
mod tree_tests {
    use super::*;

    fn tree() -> SparseMerkleTree {
        SparseMerkleTree::new(PoseidonHasher::new().unwrap(), DEFAULT_HEIGHT).unwrap()
    }

    #[test]
    fn test_empty_tree() {
        let tree = tree();

        assert!(tree.is_empty());
        assert_eq!(tree.root(), Fr::zero());
        assert_eq!(tree.get(&Fr::from(1u64)), None);
    }

    #[test]
    fn test_single_leaf_root_is_leaf_hash() {
        let mut tree = tree();
        let root = tree.insert(Fr::from(5u64), Fr::from(77u64)).unwrap();

        let expected = leaf_hash(&PoseidonHasher::new().unwrap(), Fr::from(5u64), Fr::from(77u64));
        assert_eq!(root, expected);
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn test_multiple_inserts() {
        let mut tree = tree();

        tree.insert(Fr::from(1u64), Fr::from(100u64)).unwrap();
        tree.insert(Fr::from(42u64), Fr::from(50u64)).unwrap();
        tree.insert(Fr::from(1000u64), Fr::from(200u64)).unwrap();

        assert_eq!(tree.get(&Fr::from(1u64)), Some(Fr::from(100u64)));
        assert_eq!(tree.get(&Fr::from(42u64)), Some(Fr::from(50u64)));
        assert_eq!(tree.get(&Fr::from(1000u64)), Some(Fr::from(200u64)));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_reinsert_same_value_is_noop() {
        let mut tree = tree();
        let root = tree.insert(Fr::from(9u64), Fr::from(3u64)).unwrap();
        assert_eq!(tree.insert(Fr::from(9u64), Fr::from(3u64)).unwrap(), root);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_reinsert_different_value_rejected() {
        let mut tree = tree();
        tree.insert(Fr::from(9u64), Fr::from(3u64)).unwrap();
        let root = tree.root();

        let err = tree.insert(Fr::from(9u64), Fr::from(4u64)).unwrap_err();
        assert!(matches!(err, PrimitiveError::DuplicateKey { .. }));
        assert_eq!(tree.root(), root, "Failed insert must not touch the root");
        assert_eq!(tree.get(&Fr::from(9u64)), Some(Fr::from(3u64)));
    }

    #[test]
    fn test_order_independence() {
        let hasher = PoseidonHasher::new().unwrap();
        let a = [(Fr::from(1u64), Fr::from(100u64)), (Fr::from(42u64), Fr::from(50u64))];
        let b = [a[1], a[0]];

        let tree1 = SparseMerkleTree::from_leaves(hasher.clone(), DEFAULT_HEIGHT, &a).unwrap();
        let tree2 = SparseMerkleTree::from_leaves(hasher, DEFAULT_HEIGHT, &b).unwrap();

        assert_eq!(tree1.root(), tree2.root());
    }

    #[test]
    fn test_invalid_height() {
        let hasher = PoseidonHasher::new().unwrap();
        assert!(matches!(
            SparseMerkleTree::new(hasher.clone(), 0),
            Err(PrimitiveError::InvalidHeight(0))
        ));
        assert!(SparseMerkleTree::new(hasher, MAX_HEIGHT + 1).is_err());
    }

    #[test]
    fn test_keys_sharing_all_path_bits_exceed_height() {
        let hasher = PoseidonHasher::new().unwrap();
        let mut tree = SparseMerkleTree::new(hasher, 4).unwrap();
        tree.insert(Fr::from(3u64), Fr::from(1u64)).unwrap();

        // 3 and 19 agree on the low four bits.
        let err = tree.insert(Fr::from(19u64), Fr::from(1u64)).unwrap_err();
        assert_eq!(err, PrimitiveError::DepthExceeded { height: 4 });
    }

    #[test]
    fn test_key_bits_lsb_first() {
        let key = Fr::from(0b1010u64);
        assert!(!key_bit(&key, 0));
        assert!(key_bit(&key, 1));
        assert!(!key_bit(&key, 2));
        assert!(key_bit(&key, 3));
    }
}
