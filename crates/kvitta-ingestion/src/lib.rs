//! kvitta-ingestion — receipt ingestion-and-extraction pipeline.
//!
//! - Artifact intake (supported formats, generated storage paths)
//! - OCR-text normalisation
//! - LLM tag extraction with fail-soft fallback
//! - Path-based dedup gate
//! - The pipeline orchestrating all of the above

pub mod dedup;
pub mod models;
pub mod normalise;
pub mod pipeline;
pub mod tags;
