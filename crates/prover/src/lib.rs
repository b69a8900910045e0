//! Circuit input preparation for asset-ownership proofs.
//!
//! This crate provides:
//! - secp256k1 key handling, address derivation and ECDSA signing
//! - Assembly of the decimal-string circuit input artifact
//! - The end-to-end preparation pipeline and its configuration
//! - Ledger and nullifier-registry collaborators

pub mod assemble;
pub mod config;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod pipeline;
pub mod registry;

pub use assemble::{assemble, CircuitInput, InputParts};
pub use config::{LeafEntry, PipelineConfig};
pub use error::{ErrorKind, PipelineError};
pub use keys::{
    derive_address, derive_public_key, generate_private_key, parse_private_key,
    resolve_private_key, verify_signature, Address, KeyOrigin, KeyPair, PublicKey, ResolvedKey,
    Signature,
};
pub use ledger::{get_asset, put_asset, registry_leaves, AssetRecord, LedgerStore, MemoryLedger};
pub use pipeline::{prepare, run, PipelineOutput};
pub use registry::{MemoryNullifierRegistry, NullifierRegistry};

use ark_bn254::Fr;

/// Common field type for all operations
pub type ConstraintF = Fr;
