//! Circuit input assembly and the JSON artifact handed to the proving stage.
//!
//! Every value is a decimal string. 256-bit scalars are split into four
//! little-endian 64-bit limbs; field elements are written as their canonical
//! representative.

use std::fmt;
use std::io::Write;
use std::path::Path;

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use asset_zk_circuits::limbs::{self, LIMB_COUNT};
use asset_zk_circuits::{
    check_witness, field_from_decimal, field_to_decimal, InputWitness, MembershipProof, Nullifier,
    PoseidonHasher, PrimitiveError, Scalar256,
};

use crate::error::PipelineError;
use crate::keys::Signature;

/// The values a single input is assembled from.
#[derive(Clone)]
pub struct InputParts<'a> {
    pub private_key: &'a Scalar256,
    pub signature: &'a Signature,
    pub message_hash: &'a Scalar256,
    pub asset_id: u64,
    pub counter: u64,
    pub nullifier: &'a Nullifier,
    pub proof: &'a MembershipProof,
    pub root: Fr,
}

/// Input artifact consumed by the external proving program.
///
/// Field order here is the key order of the written JSON.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitInput {
    #[serde(rename = "privatekey")]
    pub private_key: [String; LIMB_COUNT],
    pub r: [String; LIMB_COUNT],
    pub s: [String; LIMB_COUNT],
    pub msghash: [String; LIMB_COUNT],
    #[serde(rename = "assetID")]
    pub asset_id: String,
    pub nullifier: String,
    pub counter: String,
    #[serde(rename = "privateKeyHashed")]
    pub private_key_hashed: String,
    pub siblings: Vec<String>,
    pub root: String,
}

impl fmt::Debug for CircuitInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitInput")
            .field("private_key", &"<redacted>")
            .field("asset_id", &self.asset_id)
            .field("nullifier", &self.nullifier)
            .field("counter", &self.counter)
            .field("siblings", &self.siblings.len())
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Assemble the artifact for a tree of height `tree_height`.
///
/// The circuit-side recomputations are replayed in a constraint system first;
/// an unsatisfied system aborts with `PrimitiveFailure`.
pub fn assemble(
    hasher: &PoseidonHasher,
    parts: &InputParts<'_>,
    tree_height: usize,
) -> Result<CircuitInput, PipelineError> {
    let siblings = parts.proof.siblings();
    if siblings.len() != tree_height {
        return Err(PrimitiveError::PrimitiveFailure(format!(
            "membership path has {} siblings, expected {tree_height}",
            siblings.len()
        ))
        .into());
    }

    let private_key = limbs::encode(parts.private_key);
    let r = limbs::encode(&parts.signature.r);
    let s = limbs::encode(&parts.signature.s);
    let msghash = limbs::encode(parts.message_hash);

    let witness = InputWitness::from_limbs(
        &private_key,
        &r,
        &s,
        &msghash,
        Fr::from(parts.asset_id),
        parts.counter,
        parts.nullifier.private_key_hashed,
        parts.nullifier.nullifier,
    );
    check_witness(hasher, &witness)?;
    debug!("circuit consistency check satisfied");

    Ok(CircuitInput {
        private_key: limbs::to_decimal_strings(&private_key),
        r: limbs::to_decimal_strings(&r),
        s: limbs::to_decimal_strings(&s),
        msghash: limbs::to_decimal_strings(&msghash),
        asset_id: parts.asset_id.to_string(),
        nullifier: field_to_decimal(&parts.nullifier.nullifier),
        counter: parts.counter.to_string(),
        private_key_hashed: field_to_decimal(&parts.nullifier.private_key_hashed),
        siblings: parts.proof.siblings_decimal(),
        root: field_to_decimal(&parts.root),
    })
}

impl CircuitInput {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(self).map_err(|e| PipelineError::Serialization(e.to_string()))
    }

    pub fn from_json(input: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(input).map_err(|e| PipelineError::Serialization(e.to_string()))
    }

    /// Write the artifact atomically: a temporary file in the target
    /// directory is renamed over `path`. Missing parent directories are created.
    pub fn write_artifact(&self, path: &Path) -> Result<(), PipelineError> {
        let json = self.to_json()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| PipelineError::Io(e.error))?;

        info!(path = %path.display(), "circuit input written");
        Ok(())
    }

    /// Read a written artifact back and check its shape against `tree_height`.
    pub fn read_artifact(path: &Path, tree_height: usize) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path)?;
        let input = Self::from_json(&raw)?;
        input.validate(tree_height)?;
        Ok(input)
    }

    /// Every limb must fit in 64 bits, every other value must be a canonical
    /// field element, and the path must have exactly `tree_height` siblings.
    pub fn validate(&self, tree_height: usize) -> Result<(), PipelineError> {
        for limbs in [&self.private_key, &self.r, &self.s, &self.msghash] {
            limbs::decode_decimal(limbs)?;
        }
        for value in [
            &self.asset_id,
            &self.nullifier,
            &self.counter,
            &self.private_key_hashed,
            &self.root,
        ] {
            field_from_decimal(value)?;
        }
        if self.siblings.len() != tree_height {
            return Err(PrimitiveError::InvalidEncoding(format!(
                "expected {tree_height} siblings, got {}",
                self.siblings.len()
            ))
            .into());
        }
        for sibling in &self.siblings {
            field_from_decimal(sibling)?;
        }
        Ok(())
    }

    /// Field elements in the order the proving program reads them.
    pub fn field_elements(&self) -> Result<Vec<Fr>, PipelineError> {
        let limb_groups = [&self.private_key, &self.r, &self.s, &self.msghash];
        let scalars = [
            &self.asset_id,
            &self.nullifier,
            &self.counter,
            &self.private_key_hashed,
        ];

        let mut out = Vec::with_capacity(4 * LIMB_COUNT + scalars.len() + self.siblings.len() + 1);
        for group in limb_groups {
            for limb in group.iter() {
                out.push(field_from_decimal(limb)?);
            }
        }
        for value in scalars {
            out.push(field_from_decimal(value)?);
        }
        for sibling in &self.siblings {
            out.push(field_from_decimal(sibling)?);
        }
        out.push(field_from_decimal(&self.root)?);
        Ok(out)
    }

    /// Rebuild the field-level witness from the decimal strings.
    pub fn to_witness(&self) -> Result<InputWitness, PipelineError> {
        let counter = self
            .counter
            .parse::<u64>()
            .map_err(|e| PrimitiveError::InvalidEncoding(format!("counter: {e}")))?;
        Ok(InputWitness::from_limbs(
            &limbs::encode(&limbs::decode_decimal(&self.private_key)?),
            &limbs::encode(&limbs::decode_decimal(&self.r)?),
            &limbs::encode(&limbs::decode_decimal(&self.s)?),
            &limbs::encode(&limbs::decode_decimal(&self.msghash)?),
            field_from_decimal(&self.asset_id)?,
            counter,
            field_from_decimal(&self.private_key_hashed)?,
            field_from_decimal(&self.nullifier)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset_zk_circuits::{derive_nullifier, message_hash, SparseMerkleTree};

    use crate::keys::KeyPair;

    const HEIGHT: usize = 20;

    fn build(hasher: &PoseidonHasher, counter: u64) -> CircuitInput {
        let pair = KeyPair::from_private_key(Scalar256::from_u64(0xabcdef)).unwrap();
        let asset_id = 12345u64;
        let asset = Fr::from(asset_id);
        let msg = message_hash(hasher, asset, pair.address().to_field());
        let signature = pair.sign(&msg).unwrap();

        let mut tree = SparseMerkleTree::new(hasher.clone(), HEIGHT).unwrap();
        let root = tree.insert(asset, msg.to_field().unwrap()).unwrap();
        let proof = tree.find(&asset).unwrap();
        let nullifier = derive_nullifier(hasher, pair.private_key(), asset, counter);

        assemble(
            hasher,
            &InputParts {
                private_key: pair.private_key(),
                signature: &signature,
                message_hash: &msg,
                asset_id,
                counter,
                nullifier: &nullifier,
                proof: &proof,
                root,
            },
            HEIGHT,
        )
        .unwrap()
    }

    #[test]
    fn test_json_key_order() {
        let hasher = PoseidonHasher::new().unwrap();
        let json = build(&hasher, 1).to_json().unwrap();

        let keys = [
            "\"privatekey\"",
            "\"r\"",
            "\"s\"",
            "\"msghash\"",
            "\"assetID\"",
            "\"nullifier\"",
            "\"counter\"",
            "\"privateKeyHashed\"",
            "\"siblings\"",
            "\"root\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_single_leaf_path_is_all_zero() {
        let hasher = PoseidonHasher::new().unwrap();
        let input = build(&hasher, 1);
        assert_eq!(input.siblings.len(), HEIGHT);
        assert!(input.siblings.iter().all(|s| s == "0"));
        assert_eq!(input.asset_id, "12345");
        assert_eq!(input.counter, "1");
        assert_eq!(
            limbs::decode_decimal(&input.private_key).unwrap(),
            Scalar256::from_u64(0xabcdef)
        );
    }

    #[test]
    fn test_wrong_path_length_rejected() {
        let hasher = PoseidonHasher::new().unwrap();
        let pair = KeyPair::from_private_key(Scalar256::from_u64(5)).unwrap();
        let msg = Scalar256::from_u64(9);
        let signature = pair.sign(&msg).unwrap();
        let nullifier = derive_nullifier(&hasher, pair.private_key(), Fr::from(1u64), 1);
        let proof = MembershipProof::new(Fr::from(1u64), Fr::from(9u64), vec![Fr::from(0u64); 3]);

        let err = assemble(
            &hasher,
            &InputParts {
                private_key: pair.private_key(),
                signature: &signature,
                message_hash: &msg,
                asset_id: 1,
                counter: 1,
                nullifier: &nullifier,
                proof: &proof,
                root: Fr::from(0u64),
            },
            HEIGHT,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Primitive(PrimitiveError::PrimitiveFailure(_))
        ));
    }

    #[test]
    fn test_mismatched_nullifier_rejected() {
        let hasher = PoseidonHasher::new().unwrap();
        let pair = KeyPair::from_private_key(Scalar256::from_u64(5)).unwrap();
        let msg = Scalar256::from_u64(9);
        let signature = pair.sign(&msg).unwrap();
        let mut nullifier = derive_nullifier(&hasher, pair.private_key(), Fr::from(1u64), 1);
        nullifier.nullifier = Fr::from(77u64);
        let proof = MembershipProof::new(Fr::from(1u64), Fr::from(9u64), vec![Fr::from(0u64); HEIGHT]);

        let err = assemble(
            &hasher,
            &InputParts {
                private_key: pair.private_key(),
                signature: &signature,
                message_hash: &msg,
                asset_id: 1,
                counter: 1,
                nullifier: &nullifier,
                proof: &proof,
                root: Fr::from(0u64),
            },
            HEIGHT,
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::PrimitiveFailure);
    }

    #[test]
    fn test_field_elements_order_and_length() {
        let hasher = PoseidonHasher::new().unwrap();
        let input = build(&hasher, 1);
        let elements = input.field_elements().unwrap();

        assert_eq!(elements.len(), 16 + 4 + HEIGHT + 1);
        assert_eq!(elements[16], Fr::from(12345u64));
        assert_eq!(elements[18], Fr::from(1u64));
        assert_eq!(field_to_decimal(&elements[17]), input.nullifier);
        assert_eq!(field_to_decimal(elements.last().unwrap()), input.root);
    }

    #[test]
    fn test_artifact_write_and_read() {
        let hasher = PoseidonHasher::new().unwrap();
        let input = build(&hasher, 1);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input").join("input_1_data.json");

        input.write_artifact(&path).unwrap();
        let back = CircuitInput::read_artifact(&path, HEIGHT).unwrap();
        assert_eq!(back, input);
        check_witness(&hasher, &back.to_witness().unwrap()).unwrap();

        assert!(CircuitInput::read_artifact(&path, HEIGHT + 1).is_err());
    }

    #[test]
    fn test_validate_rejects_wide_limb() {
        let hasher = PoseidonHasher::new().unwrap();
        let mut input = build(&hasher, 1);
        input.r[0] = "18446744073709551616".into();
        assert!(input.validate(HEIGHT).is_err());

        let mut input = build(&hasher, 1);
        input.root = "0x01".into();
        assert!(input.validate(HEIGHT).is_err());

        let mut input = build(&hasher, 1);
        input.private_key[3] = "+5".into();
        assert!(input.validate(HEIGHT).is_err());
    }
}
