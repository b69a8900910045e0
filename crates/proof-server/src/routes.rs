//! API route definitions.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::AppState;

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Circuit input generation
        .route("/api/inputs/generate", post(handlers::generate_input))
        // Utility endpoints
        .route("/api/nullifier/derive", post(handlers::derive_nullifier))
        .route("/api/commitment/leaf", post(handlers::leaf_commitment))
        // Spent-nullifier registry
        .route("/api/nullifier/spend", post(handlers::spend_nullifier))
        .route("/api/nullifier/status", post(handlers::nullifier_status))
}
