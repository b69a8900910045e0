//! Asset ledger access.
//!
//! The permissioned ledger keeps one JSON record per asset under the asset id.
//! [`registry_leaves`] turns the records that carry a bound wallet address into
//! tree leaves, which is one way to populate the asset tree before a run.

use std::collections::BTreeMap;
use std::ops::Bound;

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use asset_zk_circuits::{leaf_commitment, PoseidonHasher};

use crate::error::PipelineError;
use crate::keys::Address;

/// Key-value view of the ledger world state. Writes are last-write-wins.
pub trait LedgerStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PipelineError>;
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), PipelineError>;
    /// Entries with `start <= key < end`, in key order. An empty `end` is unbounded.
    fn range(&self, start: &str, end: &str) -> Result<Vec<(String, Vec<u8>)>, PipelineError>;
    fn delete(&mut self, key: &str) -> Result<(), PipelineError>;
}

/// In-process ledger.
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LedgerStore for MemoryLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PipelineError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), PipelineError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn range(&self, start: &str, end: &str) -> Result<Vec<(String, Vec<u8>)>, PipelineError> {
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end.to_string())
        };
        if let Bound::Excluded(end) = &upper {
            if end.as_str() <= start {
                return Ok(Vec::new());
            }
        }
        Ok(self
            .entries
            .range((Bound::Included(start.to_string()), upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn delete(&mut self, key: &str) -> Result<(), PipelineError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Asset record as stored by the asset contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    #[serde(rename = "assetId")]
    pub asset_id: String,
    pub current_owner: String,
    /// Empty until the owner binds a wallet.
    #[serde(default)]
    pub wallet_address: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AssetRecord {
    pub fn new(asset_id: impl Into<String>, current_owner: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            current_owner: current_owner.into(),
            wallet_address: String::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_wallet(mut self, address: &Address) -> Self {
        self.wallet_address = address.to_hex();
        self
    }

    /// Numeric asset id, if the id is a plain integer.
    pub fn numeric_id(&self) -> Option<u64> {
        self.asset_id.parse().ok()
    }
}

pub fn put_asset<S: LedgerStore + ?Sized>(
    store: &mut S,
    record: &AssetRecord,
) -> Result<(), PipelineError> {
    let bytes =
        serde_json::to_vec(record).map_err(|e| PipelineError::Serialization(e.to_string()))?;
    store.put(&record.asset_id, bytes)
}

pub fn get_asset<S: LedgerStore + ?Sized>(
    store: &S,
    asset_id: &str,
) -> Result<Option<AssetRecord>, PipelineError> {
    store
        .get(asset_id)?
        .map(|bytes| decode_record(asset_id, &bytes))
        .transpose()
}

fn decode_record(key: &str, bytes: &[u8]) -> Result<AssetRecord, PipelineError> {
    serde_json::from_slice(bytes)
        .map_err(|e| PipelineError::Ledger(format!("undecodable record {key}: {e}")))
}

/// Leaves `(assetId, H(assetId, wallet_address))` for every record in
/// `[start, end)` with a numeric id and a bound wallet.
pub fn registry_leaves<S: LedgerStore + ?Sized>(
    store: &S,
    hasher: &PoseidonHasher,
    start: &str,
    end: &str,
) -> Result<Vec<(Fr, Fr)>, PipelineError> {
    let mut leaves = Vec::new();
    for (key, bytes) in store.range(start, end)? {
        let record = decode_record(&key, &bytes)?;
        if record.wallet_address.trim().is_empty() {
            debug!(key = %key, "skipping record without wallet address");
            continue;
        }
        let Some(id) = record.numeric_id() else {
            debug!(key = %key, "skipping record with non-numeric asset id");
            continue;
        };
        let address = Address::from_hex(&record.wallet_address)
            .map_err(|e| PipelineError::Ledger(format!("record {key}: {e}")))?;

        let asset_id = Fr::from(id);
        leaves.push((asset_id, leaf_commitment(hasher, asset_id, address.to_field())));
    }
    Ok(leaves)
}
