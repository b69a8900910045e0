//! HTTP request handlers.

use std::sync::Arc;

use ark_bn254::Fr;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use asset_zk_circuits::{derive_nullifier as derive, field_to_decimal, leaf_commitment as commit};
use asset_zk_prover::{
    parse_private_key, pipeline, resolve_private_key, Address, CircuitInput, ErrorKind, KeyPair,
    LeafEntry, NullifierRegistry, PipelineError,
};

use crate::AppState;

/// Errors surfaced to API clients
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(e) => match e.kind() {
                ErrorKind::InvalidEncoding
                | ErrorKind::KeyDerivationError
                | ErrorKind::DuplicateKey
                | ErrorKind::Config => StatusCode::BAD_REQUEST,
                ErrorKind::KeyNotFound => StatusCode::NOT_FOUND,
                ErrorKind::Replay => StatusCode::CONFLICT,
                ErrorKind::PrimitiveFailure | ErrorKind::Ledger | ErrorKind::Io => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ============ Input Generation ============

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub private_key: Option<String>,
    pub asset_id: Option<u64>,
    pub counter: Option<u64>,
    pub leaves: Option<Vec<LeafEntry>>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub input: CircuitInput,
    pub address: String,
    pub leaf_commitment: String,
    pub nullifier: String,
    pub root: String,
    pub key_origin: &'static str,
}

pub async fn generate_input(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let mut config = state.config.clone();
    if let Some(asset_id) = req.asset_id {
        config.asset_id = asset_id;
    }
    if let Some(counter) = req.counter {
        config.counter = counter;
    }
    if let Some(leaves) = req.leaves {
        config.leaves = leaves;
    }

    let key = resolve_private_key(req.private_key.as_deref(), &mut OsRng);
    let output = pipeline::prepare(&state.hasher, &config, key, &[])?;
    info!(address = %output.address, "circuit input generated");

    Ok(Json(GenerateResponse {
        address: output.address.to_hex(),
        leaf_commitment: field_to_decimal(&output.leaf_commitment),
        nullifier: output.input.nullifier.clone(),
        root: output.input.root.clone(),
        key_origin: output.key_origin.as_str(),
        input: output.input,
    }))
}

// ============ Nullifier ============

#[derive(Deserialize)]
pub struct DeriveNullifierRequest {
    pub private_key: String,
    pub asset_id: u64,
    pub counter: u64,
}

#[derive(Serialize)]
pub struct DeriveNullifierResponse {
    pub private_key_hashed: String,
    pub nullifier: String,
}

/// Strict counterpart of the generate route: a malformed key is rejected.
pub async fn derive_nullifier(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeriveNullifierRequest>,
) -> Result<Json<DeriveNullifierResponse>, ApiError> {
    let scalar = parse_private_key(&req.private_key).map_err(PipelineError::from)?;
    let pair = KeyPair::from_private_key(scalar)?;

    let derived = derive(&state.hasher, pair.private_key(), Fr::from(req.asset_id), req.counter);
    Ok(Json(DeriveNullifierResponse {
        private_key_hashed: field_to_decimal(&derived.private_key_hashed),
        nullifier: field_to_decimal(&derived.nullifier),
    }))
}

#[derive(Deserialize)]
pub struct NullifierRequest {
    pub nullifier: String,
}

#[derive(Serialize)]
pub struct NullifierStatusResponse {
    pub nullifier: String,
    pub spent: bool,
}

pub async fn spend_nullifier(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NullifierRequest>,
) -> Result<Json<NullifierStatusResponse>, ApiError> {
    state.registry.write().await.mark_spent(&req.nullifier)?;
    info!(nullifier = %req.nullifier, "nullifier spent");
    Ok(Json(NullifierStatusResponse {
        nullifier: req.nullifier,
        spent: true,
    }))
}

pub async fn nullifier_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NullifierRequest>,
) -> Result<Json<NullifierStatusResponse>, ApiError> {
    let spent = state.registry.read().await.is_spent(&req.nullifier)?;
    Ok(Json(NullifierStatusResponse {
        nullifier: req.nullifier,
        spent,
    }))
}

// ============ Commitment ============

#[derive(Deserialize)]
pub struct LeafCommitmentRequest {
    pub asset_id: u64,
    /// 20-byte hex address
    pub address: String,
}

#[derive(Serialize)]
pub struct LeafCommitmentResponse {
    pub commitment: String,
}

pub async fn leaf_commitment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LeafCommitmentRequest>,
) -> Result<Json<LeafCommitmentResponse>, ApiError> {
    let address = Address::from_hex(&req.address).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let commitment = commit(&state.hasher, Fr::from(req.asset_id), address.to_field());
    Ok(Json(LeafCommitmentResponse {
        commitment: field_to_decimal(&commitment),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use asset_zk_prover::PipelineConfig;

    const HARDHAT_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const HARDHAT_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(
            asset_zk_circuits::PoseidonHasher::new().unwrap(),
            PipelineConfig::default(),
        ))
    }

    async fn post(state: &Arc<AppState>, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = crate::app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = crate::app(state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&bytes).unwrap(), json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_generate_matches_derive_and_commitment() {
        let state = state();
        let (status, generated) =
            post(&state, "/api/inputs/generate", json!({ "private_key": HARDHAT_KEY })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(generated["address"], HARDHAT_ADDRESS);
        assert_eq!(generated["key_origin"], "provided");
        assert_eq!(generated["input"]["siblings"].as_array().unwrap().len(), 20);

        let (status, derived) = post(
            &state,
            "/api/nullifier/derive",
            json!({ "private_key": HARDHAT_KEY, "asset_id": 12345, "counter": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(derived["nullifier"], generated["nullifier"]);
        assert_eq!(derived["private_key_hashed"], generated["input"]["privateKeyHashed"]);

        let (status, leaf) = post(
            &state,
            "/api/commitment/leaf",
            json!({ "asset_id": 12345, "address": HARDHAT_ADDRESS }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(leaf["commitment"], generated["leaf_commitment"]);
    }

    #[tokio::test]
    async fn test_generate_falls_back_on_bad_key() {
        let (status, generated) =
            post(&state(), "/api/inputs/generate", json!({ "private_key": "nope" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(generated["key_origin"], "fallback");
    }

    #[tokio::test]
    async fn test_derive_rejects_bad_key() {
        let (status, body) = post(
            &state(),
            "/api/nullifier/derive",
            json!({ "private_key": "0x1234", "asset_id": 1, "counter": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_spend_twice_conflicts() {
        let state = state();
        let (status, _) = post(&state, "/api/nullifier/spend", json!({ "nullifier": "42" })).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post(&state, "/api/nullifier/status", json!({ "nullifier": "42" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["spent"], true);

        let (status, _) = post(&state, "/api/nullifier/spend", json!({ "nullifier": "42" })).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = post(&state, "/api/nullifier/status", json!({ "nullifier": "x" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
