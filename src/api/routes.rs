//! Route configuration for the ledger HTTP surface
//!
//! | Method | Path | Handler | Description |
//! |--------|------|---------|-------------|
//! | POST | /accounts | `create_account` | Create a new account |
//! | GET | /accounts/{id} | `get_account` | Read an account snapshot |
//! | POST | /accounts/{id}/adjustments | `adjust_balance` | Credit or debit |
//! | GET | /health | `health_check` | Health check endpoint |

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::api::dto::HealthResponse;
use crate::api::handlers::{adjust_balance, create_account, get_account};
use crate::core::EntityRegistry;

/// GET /health - health check endpoint
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    (StatusCode::OK, Json(response))
}

/// Build the router over a registry
///
/// The registry is the only piece of shared state; handlers receive it
/// through axum's `State` extractor. Request/response tracing is attached
/// here so every surface gets it uniformly.
///
/// # Arguments
///
/// * `registry` - The entity registry commands are dispatched through
pub fn create_router(registry: Arc<EntityRegistry>) -> Router {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/accounts/{id}", get(get_account))
        .route("/accounts/{id}/adjustments", post(adjust_balance))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}
