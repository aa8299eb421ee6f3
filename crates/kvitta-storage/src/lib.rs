//! kvitta-storage — object storage for raw receipt uploads.
//!
//! The pipeline only needs one operation: `put(path, bytes) → locator`,
//! an idempotent overwrite. Production uses Azure Blob Storage with
//! SAS-token auth; tests substitute an in-memory fake.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage API error [{status}]: {message}")]
    Api { status: u16, message: String },
}

/// Write-side contract for the raw-artifact store.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Persist `bytes` at `path`, overwriting any existing blob, and return
    /// a dereferenceable locator for the stored object.
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// Azure Blob Storage client (Block Blob PUT, SAS-token query auth).
pub struct AzureBlobStorage {
    account: String,
    container: String,
    sas_token: String,
    client: reqwest::Client,
}

impl AzureBlobStorage {
    pub fn new(
        account: impl Into<String>,
        container: impl Into<String>,
        sas_token: impl Into<String>,
    ) -> Self {
        let sas_token = sas_token.into();
        Self {
            account: account.into(),
            container: container.into(),
            // Tolerate tokens pasted with their leading '?'.
            sas_token: sas_token.trim_start_matches('?').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn blob_url(&self, path: &str) -> String {
        format!(
            "https://{}.blob.core.windows.net/{}/{}",
            self.account, self.container, path
        )
    }
}

#[async_trait]
impl ObjectStorage for AzureBlobStorage {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = self.blob_url(path);
        let resp = self
            .client
            .put(format!("{url}?{}", self.sas_token))
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", "2021-12-02")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(path, size = bytes.len(), "blob uploaded");
        // The locator is the unsigned URL; access policy is the account's concern.
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_url_joins_account_container_and_path() {
        let storage = AzureBlobStorage::new("kvittaacct", "receipts", "?sv=2021&sig=x");
        assert_eq!(
            storage.blob_url("rawdrop/alice/1_aa.jpg"),
            "https://kvittaacct.blob.core.windows.net/receipts/rawdrop/alice/1_aa.jpg"
        );
        assert_eq!(storage.sas_token, "sv=2021&sig=x");
    }
}
