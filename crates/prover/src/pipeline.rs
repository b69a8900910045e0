//! One run of the input-preparation pipeline.
//!
//! key -> public key / address -> leaf commitment -> signature -> tree + path
//! -> nullifier -> assembled input -> artifact.
//!
//! Each run builds its own tree from an explicit population; only the hasher
//! handle is shared between runs.

use std::fmt;

use ark_bn254::Fr;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info};

use asset_zk_circuits::limbs;
use asset_zk_circuits::{
    derive_nullifier, field_to_decimal, leaf_commitment, MembershipProof, Nullifier,
    PoseidonHasher, Scalar256, SparseMerkleTree,
};

use crate::assemble::{assemble, CircuitInput, InputParts};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::keys::{resolve_private_key, Address, KeyOrigin, KeyPair, PublicKey, ResolvedKey, Signature};

/// Everything a run derived, alongside the assembled input.
#[derive(Clone)]
pub struct PipelineOutput {
    pub input: CircuitInput,
    pub private_key: Scalar256,
    pub key_origin: KeyOrigin,
    pub public_key: PublicKey,
    pub address: Address,
    pub leaf_commitment: Fr,
    pub message_hash: Scalar256,
    pub signature: Signature,
    pub nullifier: Nullifier,
    pub proof: MembershipProof,
    pub root: Fr,
}

impl fmt::Debug for PipelineOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOutput")
            .field("key_origin", &self.key_origin)
            .field("address", &self.address)
            .field("leaf_commitment", &field_to_decimal(&self.leaf_commitment))
            .field("nullifier", &field_to_decimal(&self.nullifier.nullifier))
            .field("root", &field_to_decimal(&self.root))
            .finish_non_exhaustive()
    }
}

/// Run every stage in memory. Nothing is written.
///
/// The tree is populated with the configured leaves, then `extra_leaves`, then
/// the asset leaf itself.
pub fn prepare(
    hasher: &PoseidonHasher,
    config: &PipelineConfig,
    key: ResolvedKey,
    extra_leaves: &[(Fr, Fr)],
) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;
    let asset_id = config.asset_id_field();

    let pair = KeyPair::from_private_key(key.scalar)?;
    let public_key = *pair.public_key();
    let address = pair.address();
    info!(origin = key.origin.as_str(), address = %address, "key material derived");
    debug!(
        pub_x = ?limbs::encode(&public_key.x),
        pub_y = ?limbs::encode(&public_key.y),
        "public key limbs"
    );

    let leaf = leaf_commitment(hasher, asset_id, address.to_field());
    let message_hash = Scalar256::from_field(&leaf);
    debug!(asset_id = config.asset_id, leaf = %field_to_decimal(&leaf), "leaf commitment");

    let signature = pair.sign(&message_hash)?;
    info!(v = signature.v(), "message hash signed");

    let mut population = config.leaf_fields()?;
    population.extend_from_slice(extra_leaves);
    let mut tree = SparseMerkleTree::from_leaves(hasher.clone(), config.tree_height, &population)?;
    let root = tree.insert(asset_id, leaf)?;
    let proof = tree.find(&asset_id)?;
    info!(
        height = config.tree_height,
        leaves = tree.len(),
        depth = proof.leaf_depth(),
        "membership path built"
    );
    debug!(root = %field_to_decimal(&root), "tree root");

    let nullifier = derive_nullifier(hasher, pair.private_key(), asset_id, config.counter);
    debug!(
        counter = config.counter,
        nullifier = %field_to_decimal(&nullifier.nullifier),
        "nullifier derived"
    );

    let input = assemble(
        hasher,
        &InputParts {
            private_key: pair.private_key(),
            signature: &signature,
            message_hash: &message_hash,
            asset_id: config.asset_id,
            counter: config.counter,
            nullifier: &nullifier,
            proof: &proof,
            root,
        },
        config.tree_height,
    )?;
    info!("circuit input assembled");

    Ok(PipelineOutput {
        input,
        private_key: *pair.private_key(),
        key_origin: key.origin,
        public_key,
        address,
        leaf_commitment: leaf,
        message_hash,
        signature,
        nullifier,
        proof,
        root,
    })
}

/// Resolve the key, run every stage and write the artifact to
/// `config.output_path`. No artifact is written if any stage fails.
pub fn run<R: RngCore + CryptoRng>(
    hasher: &PoseidonHasher,
    config: &PipelineConfig,
    private_key: Option<&str>,
    extra_leaves: &[(Fr, Fr)],
    rng: &mut R,
) -> Result<PipelineOutput, PipelineError> {
    let key = resolve_private_key(private_key, rng);
    let output = prepare(hasher, config, key, extra_leaves)?;
    output.input.write_artifact(&config.output_path)?;
    Ok(output)
}
