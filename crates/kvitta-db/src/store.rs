//! Metadata store: trait seam plus the redb-backed implementation.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::error::StoreError;
use crate::schema::DocumentRecord;

/// `job_id → JSON-encoded DocumentRecord`.
const DOCUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

/// Document-store operations the rest of the workspace depends on.
///
/// Constructed once at startup and passed around as `Arc<dyn MetadataStore>`
/// so tests can substitute an in-memory fake.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Persist one record. Records are immutable; callers never update.
    async fn insert(&self, record: &DocumentRecord) -> Result<(), StoreError>;

    /// Whether any persisted record references `artifact_path` as its raw
    /// artifact storage path.
    async fn exists_by_artifact_path(&self, artifact_path: &str) -> Result<bool, StoreError>;

    /// All records belonging to one user, in storage order.
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<DocumentRecord>, StoreError>;
}

/// Embedded store using redb. Writes are transactional; reads run on
/// MVCC snapshots, so concurrent upload tasks never block each other.
pub struct RedbMetadataStore {
    db: Arc<Database>,
}

impl RedbMetadataStore {
    /// Open or create the store under `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;
        let db_path = data_dir.join("kvitta.redb");
        let db = Database::create(&db_path)
            .map_err(|e| StoreError::redb(format!("open {}: {e}", db_path.display())))?;

        // Make sure the table exists so the first read does not fail.
        let txn = db.begin_write().map_err(StoreError::redb)?;
        txn.open_table(DOCUMENTS).map_err(StoreError::redb)?;
        txn.commit().map_err(StoreError::redb)?;

        debug!(path = %db_path.display(), "metadata store opened");
        Ok(Self { db: Arc::new(db) })
    }

    fn scan<F>(&self, mut predicate: F) -> Result<Vec<DocumentRecord>, StoreError>
    where
        F: FnMut(&DocumentRecord) -> bool,
    {
        let txn = self.db.begin_read().map_err(StoreError::redb)?;
        let table = txn.open_table(DOCUMENTS).map_err(StoreError::redb)?;

        let mut matches = Vec::new();
        for entry in table.iter().map_err(StoreError::redb)? {
            let (_, value) = entry.map_err(StoreError::redb)?;
            let record: DocumentRecord = serde_json::from_slice(value.value())?;
            if predicate(&record) {
                matches.push(record);
            }
        }
        Ok(matches)
    }
}

#[async_trait]
impl MetadataStore for RedbMetadataStore {
    async fn insert(&self, record: &DocumentRecord) -> Result<(), StoreError> {
        let key = record.job_id.to_string();
        let value = serde_json::to_vec(record)?;

        let txn = self.db.begin_write().map_err(StoreError::redb)?;
        {
            let mut table = txn.open_table(DOCUMENTS).map_err(StoreError::redb)?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(StoreError::redb)?;
        }
        txn.commit().map_err(StoreError::redb)?;

        debug!(job_id = %record.job_id, path = %record.artifact_path, "record inserted");
        Ok(())
    }

    async fn exists_by_artifact_path(&self, artifact_path: &str) -> Result<bool, StoreError> {
        let hits = self.scan(|r| r.artifact_path == artifact_path)?;
        Ok(!hits.is_empty())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<DocumentRecord>, StoreError> {
        self.scan(|r| r.user_id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{TagSet, STATUS_TAGGED};
    use chrono::Utc;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn record_for(user_id: &str, artifact_path: &str) -> DocumentRecord {
        DocumentRecord {
            job_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            user_directory: format!("{user_id}-dir"),
            artifact_path: artifact_path.to_string(),
            ingested_url: format!("https://blobs.example/{artifact_path}"),
            original_filename: "kvitto.jpg".to_string(),
            ingested_at: Utc::now(),
            status: STATUS_TAGGED.to_string(),
            tags: TagSet::unknown(),
        }
    }

    #[tokio::test]
    async fn insert_then_lookup_by_path() {
        let dir = TempDir::new().unwrap();
        let store = RedbMetadataStore::open(dir.path()).unwrap();

        let record = record_for("alice", "rawdrop/alice/1_aa.jpg");
        store.insert(&record).await.unwrap();

        assert!(store
            .exists_by_artifact_path("rawdrop/alice/1_aa.jpg")
            .await
            .unwrap());
        assert!(!store
            .exists_by_artifact_path("rawdrop/alice/2_bb.jpg")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn find_by_user_filters_other_users() {
        let dir = TempDir::new().unwrap();
        let store = RedbMetadataStore::open(dir.path()).unwrap();

        store
            .insert(&record_for("alice", "rawdrop/alice/1_aa.jpg"))
            .await
            .unwrap();
        store
            .insert(&record_for("alice", "rawdrop/alice/2_bb.jpg"))
            .await
            .unwrap();
        store
            .insert(&record_for("bob", "rawdrop/bob/3_cc.jpg"))
            .await
            .unwrap();

        let docs = store.find_by_user("alice").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.user_id == "alice"));
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = "rawdrop/alice/1_aa.pdf";

        {
            let store = RedbMetadataStore::open(dir.path()).unwrap();
            store.insert(&record_for("alice", path)).await.unwrap();
        }

        let store = RedbMetadataStore::open(dir.path()).unwrap();
        assert!(store.exists_by_artifact_path(path).await.unwrap());
    }

    #[tokio::test]
    async fn empty_store_reads_cleanly() {
        let dir = TempDir::new().unwrap();
        let store = RedbMetadataStore::open(dir.path()).unwrap();
        assert!(!store.exists_by_artifact_path("anything").await.unwrap());
        assert!(store.find_by_user("nobody").await.unwrap().is_empty());
    }
}
