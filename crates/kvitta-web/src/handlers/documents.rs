//! Per-user document listing.

use axum::extract::{Path, State};
use axum::Json;
use kvitta_common::ApiError;
use serde_json::{json, Value};

use crate::state::SharedState;

/// GET /documents/{user_id}
pub async fn user_documents(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let documents = state.store.find_by_user(&user_id).await?;
    Ok(Json(json!({
        "status": "success",
        "documents": documents,
    })))
}
