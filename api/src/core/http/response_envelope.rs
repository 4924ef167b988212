use ai_llm_service::ErrorDetail;
use serde::{Deserialize, Serialize};

use crate::core::http::request_id::RequestId;

/// Body of a successful `/ask-ai` call.
#[derive(Debug, Serialize)]
pub struct AskAiResponse {
    /// Sanitized tutor answer.
    pub answer: String,
    pub request_id: RequestId,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-friendly, deliberately generic message.
    pub error: String,
    pub request_id: RequestId,
    /// Provider diagnostics, only for upstream failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetail>,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}
