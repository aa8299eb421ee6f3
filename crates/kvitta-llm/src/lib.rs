//! kvitta-llm — extraction-service backends.
//!
//! The tag extractor needs exactly one capability: a single-shot text
//! completion with no conversation state. `backend` defines that trait and
//! two implementations:
//!
//!   GeminiBackend          — Google Gemini API (the default deployment)
//!   OpenAiCompatibleBackend — any `/v1/chat/completions` endpoint
//!                             (Ollama, LMStudio, vLLM, …) for local runs

pub mod backend;

pub use backend::{
    GeminiBackend, LlmBackend, LlmError, LlmRequest, LlmResponse, Message,
    OpenAiCompatibleBackend,
};
