//! Sparse Merkle Tree for asset ownership leaves.
//!
//! This module provides:
//! - Native SMT operations (insert, find with fixed-length proofs)
//! - Membership proof structures

mod proof;
mod tree;


pub use proof::MembershipProof;
pub use tree::{SparseMerkleTree, DEFAULT_HEIGHT, MAX_HEIGHT};
