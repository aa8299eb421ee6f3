//! Dedup gate: has this artifact path already produced a record?

use std::sync::Arc;

use kvitta_db::MetadataStore;
use tracing::debug;

/// Short-circuit check against the metadata store. This is not a lock:
/// concurrent uploads of identical content get different generated paths
/// and both pass the gate. Only an exact path resubmission is caught,
/// which in practice means a retried call that reused a generated path.
pub struct DedupGate {
    store: Arc<dyn MetadataStore>,
}

impl DedupGate {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    /// Whether any persisted record already references `artifact_path`.
    pub async fn already_processed(&self, artifact_path: &str) -> anyhow::Result<bool> {
        let seen = self.store.exists_by_artifact_path(artifact_path).await?;
        if seen {
            debug!(artifact_path, "artifact path already recorded, skipping");
        }
        Ok(seen)
    }
}
