//! kvitta-common — shared error types for the Kvitta workspace.

pub mod error;

pub use error::ApiError;
