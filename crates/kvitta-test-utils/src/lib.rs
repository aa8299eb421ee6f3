//! In-memory fakes for every collaborator trait, so pipeline tests run
//! without blob accounts, Vision credentials or an LLM endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use kvitta_db::{DocumentRecord, MetadataStore, StoreError};
use kvitta_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse};
use kvitta_ocr::{OcrError, OcrService};
use kvitta_storage::{ObjectStorage, StorageError};

pub use pretty_assertions::assert_eq as pretty_assert_eq;

// ── Object storage ────────────────────────────────────────────────────────────

/// Records every `put`; optionally fails to simulate a storage outage.
#[derive(Default)]
pub struct FakeObjectStorage {
    pub puts: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl FakeObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let storage = Self::default();
        storage.fail.store(true, Ordering::SeqCst);
        storage
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for FakeObjectStorage {
    async fn put(
        &self,
        path: &str,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Api {
                status: 503,
                message: "simulated storage outage".to_string(),
            });
        }
        self.puts.lock().unwrap().push(path.to_string());
        Ok(format!("memory://{path}"))
    }
}

// ── OCR ───────────────────────────────────────────────────────────────────────

/// Returns a fixed detection result; `None` simulates a blank scan.
pub struct FakeOcrService {
    text: Option<String>,
}

impl FakeOcrService {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn blank() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl OcrService for FakeOcrService {
    async fn detect_text(&self, _image: &[u8]) -> Result<Option<String>, OcrError> {
        Ok(self.text.clone())
    }
}

// ── LLM backend ───────────────────────────────────────────────────────────────

/// Replays a canned completion, or errors to simulate an unreachable service.
pub struct FakeLlmBackend {
    response: Option<String>,
}

impl FakeLlmBackend {
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self { response: None }
    }
}

#[async_trait]
impl LlmBackend for FakeLlmBackend {
    async fn complete(&self, _req: LlmRequest) -> Result<LlmResponse, LlmError> {
        match &self.response {
            Some(content) => Ok(LlmResponse {
                content: content.clone(),
                model: "fake-model".to_string(),
            }),
            None => Err(LlmError::Unavailable(
                "simulated extraction outage".to_string(),
            )),
        }
    }

    fn model_id(&self) -> &str {
        "fake-model"
    }
}

// ── Metadata store ────────────────────────────────────────────────────────────

/// Vec-backed store. `mark_everything_processed` makes the dedup query
/// answer "seen" for any path, which is how tests simulate a generated-path
/// collision without racing the path generator.
#[derive(Default)]
pub struct FakeMetadataStore {
    pub records: Mutex<Vec<DocumentRecord>>,
    everything_processed: AtomicBool,
}

impl FakeMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_everything_processed(&self) {
        self.everything_processed.store(true, Ordering::SeqCst);
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl MetadataStore for FakeMetadataStore {
    async fn insert(&self, record: &DocumentRecord) -> Result<(), StoreError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn exists_by_artifact_path(&self, artifact_path: &str) -> Result<bool, StoreError> {
        if self.everything_processed.load(Ordering::SeqCst) {
            return Ok(true);
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.artifact_path == artifact_path))
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<DocumentRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}
