//! Persisted record shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status marker stamped on every record the pipeline emits.
pub const STATUS_TAGGED: &str = "tagged";

/// Structured purchase data extracted from one receipt.
///
/// All three fields are always present: unknown strings are the literal
/// `"Unknown"` and an unknown price is `0.0`, never a missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSet {
    pub vendor: String,
    /// Comma-joined list of purchased items.
    pub product_or_service: String,
    /// Total paid amount; non-negative.
    pub price: f64,
}

impl TagSet {
    /// The fixed fallback value used when extraction yields nothing usable.
    pub fn unknown() -> Self {
        Self {
            vendor: "Unknown".to_string(),
            product_or_service: "Unknown".to_string(),
            price: 0.0,
        }
    }
}

/// One metadata record per successfully ingested artifact.
///
/// Immutable once written. At most one record exists per distinct
/// `artifact_path` — enforced by the ingestion pipeline's dedup check,
/// not by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Globally unique job identifier; also the storage key.
    pub job_id: Uuid,
    pub user_id: String,
    pub user_directory: String,
    /// Raw artifact's storage path — the dedup key.
    pub artifact_path: String,
    /// Dereferenceable locator returned by the object storage.
    pub ingested_url: String,
    pub original_filename: String,
    pub ingested_at: DateTime<Utc>,
    pub status: String,
    pub tags: TagSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tagset_has_all_fields() {
        let tags = TagSet::unknown();
        assert_eq!(tags.vendor, "Unknown");
        assert_eq!(tags.product_or_service, "Unknown");
        assert_eq!(tags.price, 0.0);
    }
}
