//! Field-level primitives for asset-ownership circuit inputs.
//!
//! This crate provides:
//! - [`Scalar256`] and the 4x64-bit limb codec used for circuit wiring
//! - [`PoseidonHasher`], an explicitly acquired Poseidon handle over BN254
//! - [`SparseMerkleTree`] with fixed-length, zero-padded membership proofs
//! - leaf commitments and nullifier derivation
//! - R1CS gadgets that replay the circuit's recomputations

pub mod commitment;
pub mod error;
pub mod limbs;
pub mod nullifier;
pub mod poseidon;
pub mod range_check;
pub mod scalar;
pub mod smt;
pub mod witness;

pub use commitment::{leaf_commitment, message_hash};
pub use error::PrimitiveError;
pub use limbs::{Limbs, LIMB_BITS, LIMB_COUNT};
pub use nullifier::{derive_nullifier, hash_private_key, Nullifier};
pub use poseidon::PoseidonHasher;
pub use scalar::{field_from_decimal, field_to_decimal, Scalar256};
pub use smt::{MembershipProof, SparseMerkleTree, DEFAULT_HEIGHT, MAX_HEIGHT};
pub use witness::{check_witness, InputWitness};

use ark_bn254::Fr;

/// Common type aliases
pub type ConstraintF = Fr;
