//! End-to-end ingestion pipeline.
//!
//! Orchestrates the full flow for a single uploaded receipt:
//!   1. Check the file extension against the supported set
//!   2. Generate a unique storage path under the submitter's directory
//!   3. Persist the raw bytes to object storage (always, before dedup)
//!   4. Dedup gate on the storage path
//!   5. OCR — per page for PDFs, directly for images
//!   6. Normalise the OCR text
//!   7. Extract tags (fail-soft)
//!   8. Assemble the metadata record for the caller to persist
//!
//! Service handles are injected at construction so the web layer and the
//! tests build the same pipeline around different implementations.

use std::sync::Arc;

use chrono::Utc;
use kvitta_db::{DocumentRecord, MetadataStore, STATUS_TAGGED};
use kvitta_llm::LlmBackend;
use kvitta_ocr::pdf::extract_page_images;
use kvitta_ocr::OcrService;
use kvitta_storage::ObjectStorage;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dedup::DedupGate;
use crate::models::{ArtifactKind, UploadedFile};
use crate::normalise::normalise;
use crate::tags::TagExtractor;

/// Sentinel used when OCR finds nothing on a page or image.
const NO_TEXT: &str = "No text";

pub struct IngestionPipeline {
    storage: Arc<dyn ObjectStorage>,
    ocr: Arc<dyn OcrService>,
    extractor: TagExtractor,
    dedup: DedupGate,
}

impl IngestionPipeline {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        ocr: Arc<dyn OcrService>,
        backend: Arc<dyn LlmBackend>,
        store: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            storage,
            ocr,
            extractor: TagExtractor::new(backend),
            dedup: DedupGate::new(store),
        }
    }

    /// Process one uploaded file.
    ///
    /// Returns `Ok(None)` for unsupported formats and dedup hits ("skipped",
    /// not an error). Storage and OCR failures propagate; extraction
    /// failures degrade to fallback tags inside step 7.
    #[instrument(skip(self, file), fields(filename = %file.filename))]
    pub async fn process(
        &self,
        file: UploadedFile,
        user_id: &str,
        user_directory: &str,
    ) -> anyhow::Result<Option<DocumentRecord>> {
        // 1. Unsupported extensions are skipped before any side effect.
        let Some(ext) = file.extension() else {
            return Ok(None);
        };
        let Some(kind) = ArtifactKind::from_extension(&ext) else {
            return Ok(None);
        };

        // 2. Fresh path per call: timestamp + random hex under the user's dir.
        let artifact_path = generate_artifact_path(user_directory, &ext);

        // 3. Raw bytes are persisted unconditionally — the blob is kept even
        //    if the dedup gate skips the rest. The path, not the content, is
        //    the dedup key.
        let locator = self
            .storage
            .put(&artifact_path, &file.bytes, kind.content_type())
            .await?;

        // 4. Dedup gate.
        if self.dedup.already_processed(&artifact_path).await? {
            return Ok(None);
        }

        // 5–6. OCR, then normalise.
        let ocr_text = self.run_ocr(&file.bytes, kind).await?;
        let receipt_text = normalise(&ocr_text);

        // 7. Tag extraction never fails the pipeline.
        let outcome = self.extractor.extract(&receipt_text).await;

        // 8. Assemble the record; persistence is the caller's step.
        let job_id = Uuid::new_v4();
        let record = DocumentRecord {
            job_id,
            user_id: user_id.to_string(),
            user_directory: user_directory.to_string(),
            artifact_path,
            ingested_url: locator,
            original_filename: file.filename.clone(),
            ingested_at: Utc::now(),
            status: STATUS_TAGGED.to_string(),
            tags: outcome.tags,
        };

        info!(
            job_id = %job_id,
            path = %record.artifact_path,
            vendor = %record.tags.vendor,
            degraded = outcome.degraded.is_some(),
            "receipt ingested"
        );

        Ok(Some(record))
    }

    /// OCR dispatch. PDFs are handled page by page: an ordered reduction of
    /// per-page results with page-break markers, substituting the no-text
    /// sentinel for unreadable pages. Images go to the service directly.
    async fn run_ocr(&self, bytes: &[u8], kind: ArtifactKind) -> anyhow::Result<String> {
        match kind {
            ArtifactKind::Pdf => {
                // Page-image extraction is CPU-bound; keep it off the runtime.
                let data = bytes.to_vec();
                let pages =
                    tokio::task::spawn_blocking(move || extract_page_images(&data)).await??;

                let mut text = String::new();
                for page in &pages {
                    text.push_str(&format!("\n--- Page {} ---\n", page.number));
                    let detected = match &page.image {
                        Some(image) => self.ocr.detect_text(image).await?,
                        None => None,
                    };
                    match detected {
                        Some(t) => text.push_str(t.trim()),
                        None => text.push_str(NO_TEXT),
                    }
                }
                Ok(text.trim().to_string())
            }
            ArtifactKind::Jpeg | ArtifactKind::Png => Ok(self
                .ocr
                .detect_text(bytes)
                .await?
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| NO_TEXT.to_string())),
        }
    }
}

/// `rawdrop/<user_directory>/<unix_timestamp>_<random_hex>.<ext>`
fn generate_artifact_path(user_directory: &str, ext: &str) -> String {
    format!(
        "rawdrop/{}/{}_{}.{}",
        user_directory,
        Utc::now().timestamp(),
        Uuid::new_v4().simple(),
        ext
    )
}
