//! Environment-based configuration.
//!
//! Secrets and endpoints come from the environment (a local `.env` file is
//! loaded by the binary). Missing required keys fail startup with a named
//! error rather than a panic deep in a handler.

use std::sync::Arc;

use kvitta_llm::{GeminiBackend, LlmBackend, OpenAiCompatibleBackend};

#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,
    /// Directory for the embedded metadata store.
    pub db_dir: String,

    /// Google Cloud Vision API key.
    pub vision_api_key: String,

    /// Gemini extraction backend (default).
    pub gemini_key: Option<String>,
    pub gemini_model: String,
    /// Optional OpenAI-compatible endpoint; set to bypass Gemini for
    /// local development.
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,

    /// Azure Blob Storage for raw uploads.
    pub azure_storage_account: String,
    pub azure_container_name: String,
    pub azure_sas_token: String,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            bind_addr: env_or("KVITTA_BIND", "0.0.0.0:8080"),
            db_dir: env_or("KVITTA_DB_DIR", "./data"),
            vision_api_key: required("VISION_API_KEY")?,
            gemini_key: optional("GEMINI_KEY"),
            gemini_model: env_or("GEMINI_MODEL", "gemini-1.5-pro"),
            llm_base_url: optional("LLM_BASE_URL"),
            llm_model: optional("LLM_MODEL"),
            llm_api_key: optional("LLM_API_KEY"),
            azure_storage_account: required("AZURE_STORAGE_ACCOUNT")?,
            azure_container_name: required("AZURE_CONTAINER_NAME")?,
            azure_sas_token: required("AZURE_SAS_TOKEN")?,
        };

        if config.gemini_key.is_none() && config.llm_base_url.is_none() {
            anyhow::bail!("set GEMINI_KEY or LLM_BASE_URL — no extraction backend configured");
        }
        Ok(config)
    }

    /// Build the configured extraction backend.
    pub fn llm_backend(&self) -> anyhow::Result<Arc<dyn LlmBackend>> {
        if let Some(base_url) = &self.llm_base_url {
            let model = self
                .llm_model
                .clone()
                .unwrap_or_else(|| "llama3:8b".to_string());
            return Ok(Arc::new(OpenAiCompatibleBackend::new(
                base_url.clone(),
                model,
                self.llm_api_key.clone(),
            )));
        }

        let key = self
            .gemini_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("GEMINI_KEY is not set"))?;
        Ok(Arc::new(GeminiBackend::new(key, self.gemini_model.clone())))
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("required environment variable {key} is not set"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}
