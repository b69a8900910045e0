//! 256-bit <-> 4x64-bit limb codec.
//!
//! Limbs are little-endian: `limbs[0]` holds the least-significant 64 bits of
//! the big-endian source value, `limbs[3]` the most-significant.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};

use crate::error::PrimitiveError;
use crate::scalar::{field_to_decimal, Scalar256};

/// Number of limbs per 256-bit value.
pub const LIMB_COUNT: usize = 4;

/// Width of a single limb in bits.
pub const LIMB_BITS: usize = 64;

const LIMB_BYTES: usize = LIMB_BITS / 8;

pub type Limbs = [u64; LIMB_COUNT];

/// Split a scalar into four little-endian 64-bit limbs.
pub fn encode(value: &Scalar256) -> Limbs {
    let bytes = value.as_bytes();
    let mut limbs = [0u64; LIMB_COUNT];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let end = bytes.len() - i * LIMB_BYTES;
        let mut chunk = [0u8; LIMB_BYTES];
        chunk.copy_from_slice(&bytes[end - LIMB_BYTES..end]);
        *limb = u64::from_be_bytes(chunk);
    }
    limbs
}

/// Encode a hex string (optionally `0x`-prefixed, at most 64 digits).
pub fn encode_hex(input: &str) -> Result<Limbs, PrimitiveError> {
    Ok(encode(&Scalar256::from_hex(input)?))
}

/// Encode a big-endian buffer of at most 32 bytes.
pub fn encode_bytes(input: &[u8]) -> Result<Limbs, PrimitiveError> {
    Ok(encode(&Scalar256::from_be_bytes(input)?))
}

/// Reassemble a scalar from exactly four little-endian limbs.
pub fn decode(limbs: &[u64]) -> Result<Scalar256, PrimitiveError> {
    if limbs.len() != LIMB_COUNT {
        return Err(PrimitiveError::InvalidEncoding(format!(
            "expected {} limbs, got {}",
            LIMB_COUNT,
            limbs.len()
        )));
    }
    let mut bytes = [0u8; 32];
    for (i, limb) in limbs.iter().enumerate() {
        let end = bytes.len() - i * LIMB_BYTES;
        bytes[end - LIMB_BYTES..end].copy_from_slice(&limb.to_be_bytes());
    }
    Ok(Scalar256::new(bytes))
}

/// Reassemble from field-element limbs, rejecting any limb wider than 64 bits.
pub fn decode_fields(limbs: &[Fr]) -> Result<Scalar256, PrimitiveError> {
    let words = limbs
        .iter()
        .enumerate()
        .map(|(i, limb)| field_to_limb(limb).ok_or_else(|| {
            PrimitiveError::InvalidEncoding(format!("limb {i} exceeds {LIMB_BITS} bits"))
        }))
        .collect::<Result<Vec<_>, _>>()?;
    decode(&words)
}

/// Reassemble from decimal-string limbs as found in a circuit input artifact.
pub fn decode_decimal<S: AsRef<str>>(limbs: &[S]) -> Result<Scalar256, PrimitiveError> {
    let words = limbs
        .iter()
        .map(|limb| {
            let limb = limb.as_ref();
            if limb.is_empty() || !limb.bytes().all(|b| b.is_ascii_digit()) {
                return Err(PrimitiveError::InvalidEncoding(format!(
                    "limb {limb:?} is not a decimal integer"
                )));
            }
            limb.parse::<u64>()
                .map_err(|e| PrimitiveError::InvalidEncoding(format!("limb {limb:?}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    decode(&words)
}

/// Lift limbs into field elements, preserving order.
pub fn to_fields(limbs: &Limbs) -> [Fr; LIMB_COUNT] {
    limbs.map(Fr::from)
}

/// Decimal renderings of the limbs, preserving order.
pub fn to_decimal_strings(limbs: &Limbs) -> [String; LIMB_COUNT] {
    to_fields(limbs).map(|f| field_to_decimal(&f))
}

fn field_to_limb(element: &Fr) -> Option<u64> {
    let repr = element.into_bigint();
    if repr.num_bits() as usize > LIMB_BITS {
        return None;
    }
    Some(repr.as_ref()[0])
}
