//! secp256k1 key material: private key resolution, public key and address
//! derivation, and ECDSA signing over a 32-byte message hash.

use std::fmt;

use ark_bn254::Fr;
use ark_ff::PrimeField;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{CryptoRng, RngCore};
use sha3::{Digest, Keccak256};
use tracing::warn;

use asset_zk_circuits::scalar::strip_hex_prefix;
use asset_zk_circuits::{PrimitiveError, Scalar256};

use crate::error::PipelineError;

/// Length of a private key in hex digits.
pub const PRIVATE_KEY_HEX_LEN: usize = 64;

/// Ethereum `v` offset for a recovery id.
const V_OFFSET: u8 = 27;

/// Where a resolved private key came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Parsed from caller input.
    Provided,
    /// No input given; generated from the RNG.
    Generated,
    /// Input was malformed; generated from the RNG instead.
    Fallback { reason: String },
}

impl KeyOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyOrigin::Provided => "provided",
            KeyOrigin::Generated => "generated",
            KeyOrigin::Fallback { .. } => "fallback",
        }
    }
}

/// A private scalar together with its origin.
#[derive(Clone)]
pub struct ResolvedKey {
    pub scalar: Scalar256,
    pub origin: KeyOrigin,
}

impl fmt::Debug for ResolvedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedKey")
            .field("scalar", &"<redacted>")
            .field("origin", &self.origin)
            .finish()
    }
}

/// Parse exactly 64 hex digits, optionally `0x`-prefixed.
pub fn parse_private_key(input: &str) -> Result<Scalar256, PrimitiveError> {
    let digits = strip_hex_prefix(input.trim());
    if digits.len() != PRIVATE_KEY_HEX_LEN {
        return Err(PrimitiveError::InvalidEncoding(format!(
            "private key must be {PRIVATE_KEY_HEX_LEN} hex digits, got {}",
            digits.len()
        )));
    }
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(digits, &mut bytes)
        .map_err(|e| PrimitiveError::InvalidEncoding(format!("invalid private key hex: {e}")))?;
    Ok(Scalar256::new(bytes))
}

/// Draw a uniformly random valid secp256k1 private key.
pub fn generate_private_key<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar256 {
    let key = SigningKey::random(rng);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&key.to_bytes());
    Scalar256::new(bytes)
}

/// Resolve the optional caller-supplied key.
///
/// Two branches: well-formed input is used as given; absent input or any
/// malformed input yields a fresh random key. Malformed input is reported
/// with a warning and recorded in [`KeyOrigin::Fallback`].
pub fn resolve_private_key<R: RngCore + CryptoRng>(input: Option<&str>, rng: &mut R) -> ResolvedKey {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => ResolvedKey {
            scalar: generate_private_key(rng),
            origin: KeyOrigin::Generated,
        },
        Some(raw) => match parse_private_key(raw) {
            Ok(scalar) => ResolvedKey {
                scalar,
                origin: KeyOrigin::Provided,
            },
            Err(e) => {
                warn!(error = %e, "invalid private key supplied, generating a random one instead");
                ResolvedKey {
                    scalar: generate_private_key(rng),
                    origin: KeyOrigin::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        },
    }
}

/// Uncompressed public key coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub x: Scalar256,
    pub y: Scalar256,
}

impl PublicKey {
    fn from_verifying_key(key: &VerifyingKey) -> Result<Self, PipelineError> {
        let point = key.as_affine().to_encoded_point(false);
        let (x, y) = match (point.x(), point.y()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(PipelineError::KeyDerivation(
                    "public key is the point at infinity".into(),
                ))
            }
        };
        Ok(Self {
            x: Scalar256::from_be_bytes(x)?,
            y: Scalar256::from_be_bytes(y)?,
        })
    }

    fn to_verifying_key(self) -> Result<VerifyingKey, PipelineError> {
        let mut sec1 = [0u8; 65];
        sec1[0] = 0x04;
        sec1[1..33].copy_from_slice(self.x.as_bytes());
        sec1[33..].copy_from_slice(self.y.as_bytes());
        VerifyingKey::from_sec1_bytes(&sec1)
            .map_err(|e| PipelineError::KeyDerivation(format!("invalid public key: {e}")))
    }
}

/// 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse a 40-digit hex address, optionally `0x`-prefixed.
    pub fn from_hex(input: &str) -> Result<Self, PrimitiveError> {
        let digits = strip_hex_prefix(input.trim());
        if digits.len() != 40 {
            return Err(PrimitiveError::InvalidEncoding(format!(
                "address must be 40 hex digits, got {}",
                digits.len()
            )));
        }
        let bytes = hex::decode(digits)
            .map_err(|e| PrimitiveError::InvalidEncoding(format!("invalid address: {e}")))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }

    /// Lowercase `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// The address as a big-endian integer.
    pub fn to_scalar(&self) -> Scalar256 {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(&self.0);
        Scalar256::new(bytes)
    }

    /// The address as a field element; 160 bits always fit.
    pub fn to_field(&self) -> Fr {
        Fr::from_be_bytes_mod_order(&self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

/// Derive the uncompressed public key of a private scalar.
///
/// Fails for zero and for scalars at or above the curve order.
pub fn derive_public_key(private_key: &Scalar256) -> Result<PublicKey, PipelineError> {
    let signing = signing_key(private_key)?;
    PublicKey::from_verifying_key(signing.verifying_key())
}

/// Ethereum address rule: last 20 bytes of `keccak256(X || Y)`.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update(public_key.x.as_bytes());
    hasher.update(public_key.y.as_bytes());
    let digest = hasher.finalize();

    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address(out)
}

fn signing_key(private_key: &Scalar256) -> Result<SigningKey, PipelineError> {
    SigningKey::from_slice(private_key.as_bytes()).map_err(|_| {
        PipelineError::KeyDerivation(
            "private key must be non-zero and below the secp256k1 order".into(),
        )
    })
}

/// ECDSA signature split into circuit-friendly scalars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: Scalar256,
    pub s: Scalar256,
    pub recovery_id: u8,
}

impl Signature {
    /// Ethereum-style `v`.
    pub fn v(&self) -> u8 {
        V_OFFSET + self.recovery_id
    }
}

/// A validated private key with its derived public key and address.
#[derive(Clone)]
pub struct KeyPair {
    private_key: Scalar256,
    public_key: PublicKey,
    address: Address,
    signing: SigningKey,
}

impl KeyPair {
    pub fn from_private_key(private_key: Scalar256) -> Result<Self, PipelineError> {
        let signing = signing_key(&private_key)?;
        let public_key = PublicKey::from_verifying_key(signing.verifying_key())?;
        let address = derive_address(&public_key);

        Ok(Self {
            private_key,
            public_key,
            address,
            signing,
        })
    }

    pub fn private_key(&self) -> &Scalar256 {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Deterministic (RFC 6979), low-S ECDSA signature over a 32-byte prehash.
    pub fn sign(&self, message_hash: &Scalar256) -> Result<Signature, PipelineError> {
        let (signature, recovery_id) = self
            .signing
            .sign_prehash_recoverable(message_hash.as_bytes())
            .map_err(|e| PipelineError::Signing(e.to_string()))?;
        let (r, s) = signature.split_bytes();

        Ok(Signature {
            r: Scalar256::from_be_bytes(&r)?,
            s: Scalar256::from_be_bytes(&s)?,
            recovery_id: recovery_id.to_byte(),
        })
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Check a signature against a public key and message hash.
pub fn verify_signature(
    public_key: &PublicKey,
    message_hash: &Scalar256,
    signature: &Signature,
) -> Result<bool, PipelineError> {
    let key = public_key.to_verifying_key()?;
    let signature = match EcdsaSignature::from_scalars(*signature.r.as_bytes(), *signature.s.as_bytes()) {
        Ok(sig) => sig,
        Err(_) => return Ok(false),
    };
    Ok(key.verify_prehash(message_hash.as_bytes(), &signature).is_ok())
}
