//! kvitta-web — HTTP surface for the receipt pipeline.
//!
//!   POST /upload                multipart: file + user_id + user_directory
//!   GET  /documents/{user_id}   all metadata records for one user
//!   GET  /api/health            liveness probe

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
