//! kvitta-db — metadata persistence for ingested receipts.
//!
//! - `schema`: the persisted `DocumentRecord` and its `TagSet`
//! - `store`: the `MetadataStore` trait plus the redb-backed implementation
//!
//! The store is deliberately schema-light: one table, `job_id → JSON`.
//! Lookups used by the pipeline (dedup by artifact path) and by the web
//! layer (documents per user) are linear scans, which is fine at the
//! volumes a single receipt inbox produces.

pub mod error;
pub mod schema;
pub mod store;

pub use error::StoreError;
pub use schema::{DocumentRecord, TagSet, STATUS_TAGGED};
pub use store::{MetadataStore, RedbMetadataStore};
