//! 256-bit unsigned scalars and their canonical renderings.
//!
//! A [`Scalar256`] is stored as a 32-byte big-endian buffer. Hex strings,
//! decimal strings, byte slices and BN254 field elements all convert into it
//! with zero-padding on the most-significant side.

use std::fmt;
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::PrimeField;
use num_bigint::BigUint;

use crate::error::PrimitiveError;

/// Width of a scalar in bytes.
pub const SCALAR_BYTES: usize = 32;

/// An unsigned integer in `[0, 2^256)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Scalar256([u8; SCALAR_BYTES]);

impl Scalar256 {
    pub const ZERO: Self = Self([0u8; SCALAR_BYTES]);

    /// Wrap a full-width big-endian buffer.
    pub const fn new(bytes: [u8; SCALAR_BYTES]) -> Self {
        Self(bytes)
    }

    /// Build from a big-endian byte slice of at most 32 bytes.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() > SCALAR_BYTES {
            return Err(PrimitiveError::InvalidEncoding(format!(
                "{} bytes exceed 256 bits",
                bytes.len()
            )));
        }
        let mut out = [0u8; SCALAR_BYTES];
        out[SCALAR_BYTES - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Parse a hex string of at most 64 digits, with or without a `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, PrimitiveError> {
        let digits = strip_hex_prefix(input);
        if digits.is_empty() {
            return Err(PrimitiveError::InvalidEncoding("empty hex string".into()));
        }
        if digits.len() > SCALAR_BYTES * 2 {
            return Err(PrimitiveError::InvalidEncoding(format!(
                "{} hex digits exceed 256 bits",
                digits.len()
            )));
        }
        let padded = if digits.len() % 2 == 1 {
            format!("0{digits}")
        } else {
            digits.to_string()
        };
        let bytes = hex::decode(&padded)
            .map_err(|e| PrimitiveError::InvalidEncoding(format!("invalid hex: {e}")))?;
        Self::from_be_bytes(&bytes)
    }

    /// Parse a base-10 string.
    pub fn from_decimal(input: &str) -> Result<Self, PrimitiveError> {
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PrimitiveError::InvalidEncoding(format!(
                "not a decimal integer: {input:?}"
            )));
        }
        let value = BigUint::parse_bytes(input.as_bytes(), 10).ok_or_else(|| {
            PrimitiveError::InvalidEncoding(format!("not a decimal integer: {input:?}"))
        })?;
        Self::from_biguint(&value)
    }

    pub fn from_biguint(value: &BigUint) -> Result<Self, PrimitiveError> {
        Self::from_be_bytes(&value.to_bytes_be())
    }

    pub fn from_u64(value: u64) -> Self {
        let mut out = [0u8; SCALAR_BYTES];
        out[SCALAR_BYTES - 8..].copy_from_slice(&value.to_be_bytes());
        Self(out)
    }

    /// Canonical integer representative of a field element.
    pub fn from_field(element: &Fr) -> Self {
        let value: BigUint = element.into_bigint().into();
        // A BN254 element is always below 2^254.
        Self::from_biguint(&value).unwrap_or_default()
    }

    /// Interpret as a BN254 field element, rejecting values at or above the modulus.
    pub fn to_field(&self) -> Result<Fr, PrimitiveError> {
        let modulus: BigUint = Fr::MODULUS.into();
        if self.to_biguint() >= modulus {
            return Err(PrimitiveError::InvalidEncoding(format!(
                "0x{} is not a canonical BN254 element",
                self.to_hex()
            )));
        }
        Ok(Fr::from_be_bytes_mod_order(&self.0))
    }

    pub fn as_bytes(&self) -> &[u8; SCALAR_BYTES] {
        &self.0
    }

    pub fn to_be_bytes(&self) -> [u8; SCALAR_BYTES] {
        self.0
    }

    /// 64 lowercase hex digits, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    pub fn to_decimal(&self) -> String {
        self.to_biguint().to_str_radix(10)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl From<[u8; SCALAR_BYTES]> for Scalar256 {
    fn from(bytes: [u8; SCALAR_BYTES]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Scalar256 {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Scalar256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Scalar256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar256(0x{})", self.to_hex())
    }
}

/// Strip an optional `0x` / `0X` prefix.
pub fn strip_hex_prefix(input: &str) -> &str {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}

/// Decimal rendering of a field element, as consumed by circom/snarkjs tooling.
pub fn field_to_decimal(element: &Fr) -> String {
    let value: BigUint = element.into_bigint().into();
    value.to_str_radix(10)
}

/// Parse a canonical decimal field element.
pub fn field_from_decimal(input: &str) -> Result<Fr, PrimitiveError> {
    Scalar256::from_decimal(input)?.to_field()
}
