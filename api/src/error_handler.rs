use ai_llm_service::{AiLlmError, ErrorDetail};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tutor_core::{TutorError, ValidationError};

use crate::core::http::{request_id::RequestId, response_envelope::ErrorBody};

pub const PROVIDER_ERROR_MESSAGE: &str = "AI provider error. Please try again.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error("invalid value in {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        reason: &'static str,
    },

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body rejected before the fields could be read; only `code` can grow that big.
    #[error("Field 'code' is too large.")]
    BodyTooLarge,

    /// Upstream provider failed; detail is forwarded to the client.
    #[error("AI provider error. Please try again.")]
    Provider(ErrorDetail),

    /// Anything unexpected. Never carries internals to the client.
    #[error("Internal server error.")]
    Internal,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(ValidationError::MissingQuestion) => StatusCode::BAD_REQUEST,
            AppError::Validation(ValidationError::CodeTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // upstream
            AppError::Provider(_) => StatusCode::BAD_GATEWAY,

            // 5xx
            AppError::Llm(_)
            | AppError::InvalidEnv { .. }
            | AppError::Bind(_)
            | AppError::Server(_)
            | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to API clients.
    fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::BodyTooLarge
            | AppError::Provider(_) => self.to_string(),
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Binds the error to the request it belongs to, so it can be rendered.
    pub fn for_request(self, request_id: &RequestId) -> RequestError {
        RequestError {
            request_id: request_id.clone(),
            error: self,
        }
    }
}

/// An [`AppError`] tagged with the correlation id of the failing request.
#[derive(Debug)]
pub struct RequestError {
    pub request_id: RequestId,
    pub error: AppError,
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorBody {
            error: self.error.public_message(),
            request_id: self.request_id,
            details: match self.error {
                AppError::Provider(detail) => Some(detail),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<TutorError> for AppError {
    fn from(err: TutorError) -> Self {
        match err {
            TutorError::Provider(failure) => AppError::Provider(failure.detail),
        }
    }
}

/// Maps Axum JSON extractor rejections to client-facing messages.
impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::BodyTooLarge;
        }
        match err {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::BadRequest("Content-Type must be application/json.".into())
            }
            JsonRejection::JsonSyntaxError(_) => {
                AppError::BadRequest("Request body must be valid JSON.".into())
            }
            JsonRejection::JsonDataError(e) => {
                AppError::BadRequest(format!("Invalid request body: {}", e.body_text()))
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use ai_llm_service::ProviderFailure;

    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (AppError::BadRequest("x".into()), 400),
            (AppError::Validation(ValidationError::MissingQuestion), 400),
            (
                AppError::Validation(ValidationError::CodeTooLarge { chars: 9, max: 1 }),
                413,
            ),
            (AppError::BodyTooLarge, 413),
            (AppError::Provider(ProviderFailure::timeout().detail), 502),
            (AppError::Internal, 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err:?}");
        }
    }

    #[test]
    fn internals_are_not_leaked() {
        let err = AppError::Server(std::io::Error::other("disk on fire"));
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn provider_failure_maps_to_detail() {
        let err = AppError::from(TutorError::Provider(ProviderFailure::missing_credential()));
        assert!(matches!(&err, AppError::Provider(d) if d.message.contains("GEMINI_API_KEY")));
        assert_eq!(err.public_message(), PROVIDER_ERROR_MESSAGE);
    }
}
