//! Range check gadgets for limb inputs.
//!
//! Every 256-bit value enters the circuit as four limbs. Without a width check
//! a limb could carry an arbitrary field element and the recomposed integer
//! would no longer match the signed or hashed value.

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::SynthesisError;

use crate::limbs::LIMB_BITS;

/// Enforce that a field element fits in `num_bits` bits.
///
/// All bits of the little-endian decomposition at or above `num_bits` must be zero.
pub fn enforce_range<F: PrimeField>(
    value: &FpVar<F>,
    num_bits: usize,
) -> Result<(), SynthesisError> {
    let value_bits = value.to_bits_le()?;

    for bit in value_bits.iter().skip(num_bits) {
        bit.enforce_equal(&Boolean::FALSE)?;
    }

    Ok(())
}

/// Enforce that a limb fits in 64 bits.
pub fn enforce_limb_width<F: PrimeField>(value: &FpVar<F>) -> Result<(), SynthesisError> {
    enforce_range(value, LIMB_BITS)
}
