//! Seam between the tutor pipeline and the concrete provider client.

use async_trait::async_trait;

use crate::{error_handler::ProviderResult, services::gemini_service::GeminiService};

/// Something that turns a prompt into generated text.
///
/// Implementations must classify their own failures and never panic on
/// upstream errors. The HTTP layer holds an `Arc<dyn TextGenerator>` so tests
/// can swap in a double.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates text for `prompt`; `request_id` tags every log line.
    async fn generate(&self, prompt: &str, request_id: &str) -> ProviderResult;
}

#[async_trait]
impl TextGenerator for GeminiService {
    async fn generate(&self, prompt: &str, request_id: &str) -> ProviderResult {
        GeminiService::generate(self, prompt, request_id).await
    }
}
