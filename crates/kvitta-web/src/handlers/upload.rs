//! Receipt upload endpoint.

use axum::extract::{Multipart, State};
use axum::Json;
use kvitta_common::ApiError;
use kvitta_ingestion::models::UploadedFile;
use serde_json::{json, Value};
use tracing::info;

use crate::state::SharedState;

/// POST /upload — multipart form with `file`, `user_id`, `user_directory`.
///
/// New artifacts answer `success` with the persisted metadata; unsupported
/// formats and dedup hits answer `skipped`. Infrastructure failures map to
/// the 500 error envelope via `ApiError`, leaving sibling uploads in a
/// client's batch unaffected.
pub async fn upload_file(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut file: Option<UploadedFile> = None;
    let mut user_id: Option<String> = None;
    let mut user_directory: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
                let bytes = field.bytes().await?.to_vec();
                file = Some(UploadedFile::new(filename, bytes));
            }
            Some("user_id") => user_id = Some(field.text().await?),
            Some("user_directory") => user_directory = Some(field.text().await?),
            _ => {}
        }
    }

    let (Some(file), Some(user_id), Some(user_directory)) = (file, user_id, user_directory) else {
        return Ok(Json(json!({
            "status": "error",
            "detail": "multipart form must include file, user_id and user_directory",
        })));
    };

    info!(user_id = %user_id, filename = %file.filename, size = file.bytes.len(), "upload received");

    match state.pipeline.process(file, &user_id, &user_directory).await? {
        Some(record) => {
            state.store.insert(&record).await?;
            Ok(Json(json!({ "status": "success", "metadata": record })))
        }
        None => Ok(Json(json!({
            "status": "skipped",
            "reason": "Already processed or unsupported format",
        }))),
    }
}
