//! Shared application state for the web server.

use std::sync::Arc;

use kvitta_db::{MetadataStore, RedbMetadataStore};
use kvitta_ingestion::pipeline::IngestionPipeline;
use kvitta_ocr::GoogleVisionOcr;
use kvitta_storage::AzureBlobStorage;

use crate::config::Config;

/// Shared state injected into every Axum handler. Service handles are
/// built once here and threaded through the pipeline — no globals.
pub struct AppState {
    pub pipeline: IngestionPipeline,
    pub store: Arc<dyn MetadataStore>,
}

impl AppState {
    pub fn new(pipeline: IngestionPipeline, store: Arc<dyn MetadataStore>) -> Self {
        Self { pipeline, store }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn MetadataStore> = Arc::new(RedbMetadataStore::open(&config.db_dir)?);
        let storage = Arc::new(AzureBlobStorage::new(
            config.azure_storage_account.clone(),
            config.azure_container_name.clone(),
            config.azure_sas_token.clone(),
        ));
        let ocr = Arc::new(GoogleVisionOcr::new(config.vision_api_key.clone()));
        let backend = config.llm_backend()?;

        let pipeline = IngestionPipeline::new(storage, ocr, backend, store.clone());
        Ok(Self::new(pipeline, store))
    }
}

pub type SharedState = Arc<AppState>;
