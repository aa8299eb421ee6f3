use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("redb: {message}")]
    Redb { message: String },

    #[error("record serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}

impl StoreError {
    /// redb surfaces a different error type per operation; collapse them
    /// into one message-carrying variant.
    pub(crate) fn redb(err: impl std::fmt::Display) -> Self {
        Self::Redb {
            message: err.to_string(),
        }
    }
}
