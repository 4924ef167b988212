use std::sync::Arc;

use ai_llm_service::{GeminiConfig, GeminiService, TextGenerator};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
///
/// Holds no per-request data; the generator owns the pooled HTTP client.
#[derive(Clone)]
pub struct AppState {
    /// Provider used to answer tutor questions.
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Builds a Gemini-backed state from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        let cfg = GeminiConfig::from_env()?;
        let client = GeminiService::build_http_client()?;
        Ok(Self::new(Arc::new(GeminiService::new(cfg, client)?)))
    }
}
