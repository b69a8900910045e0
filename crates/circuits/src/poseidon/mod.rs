//! Poseidon hash over the BN254 scalar field.
//!
//! The hash is exposed through an explicit [`PoseidonHasher`] handle that is
//! acquired once and passed to every component that hashes. Native and
//! in-circuit variants absorb the input count before the inputs, so hashes of
//! different arities never collide through zero padding of the sponge rate.

mod config;
mod gadgets;
mod native;


pub use config::{poseidon_config, ALPHA, CAPACITY, FULL_ROUNDS, PARTIAL_ROUNDS, RATE};
pub use gadgets::{poseidon_hash_two_var, poseidon_hash_var};
pub use native::PoseidonHasher;
