//! Poseidon configuration for BN254.
//!
//! Round constants and the MDS matrix come from the Grain LFSR procedure of
//! the Poseidon paper, for 128-bit security at width 3.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{find_poseidon_ark_and_mds, PoseidonConfig};
use ark_ff::PrimeField;

/// Number of full rounds (beginning + end)
pub const FULL_ROUNDS: usize = 8;

/// Number of partial rounds
pub const PARTIAL_ROUNDS: usize = 57;

/// S-box exponent
pub const ALPHA: u64 = 5;

/// Field elements absorbed per permutation
pub const RATE: usize = 2;

pub const CAPACITY: usize = 1;

/// Build the standard Poseidon configuration for the BN254 scalar field.
pub fn poseidon_config() -> PoseidonConfig<Fr> {
    let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
        Fr::MODULUS_BIT_SIZE as u64,
        RATE,
        FULL_ROUNDS as u64,
        PARTIAL_ROUNDS as u64,
        0,
    );

    PoseidonConfig::new(FULL_ROUNDS, PARTIAL_ROUNDS, ALPHA, mds, ark, RATE, CAPACITY)
}
