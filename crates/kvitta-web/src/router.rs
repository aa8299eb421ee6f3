//! Axum router — maps URL paths to handlers.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{documents::user_documents, system::health, upload::upload_file};
use crate::state::{AppState, SharedState};

/// Multi-page scans get large; cap uploads well above typical receipt size.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/upload", post(upload_file))
        .route("/documents/{user_id}", get(user_documents))
        .route("/api/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
