//! POST /ask-ai — tutor answer for a student question.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{error, info, warn};
use tutor_core::TutorRequest;

use crate::{
    core::{
        app_state::AppState,
        http::{request_id::RequestId, response_envelope::AskAiResponse},
    },
    error_handler::{AppError, RequestError},
    routes::ask_ai::ask_ai_request::AskAiRequest,
};

/// Topic is clipped to this many characters in the access log.
const LOG_TOPIC_CHARS: usize = 80;

/// Handler: POST /ask-ai
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:5000/ask-ai \
///   -H 'content-type: application/json' \
///   -d '{"question":"How do I use loops?","level":"beginner"}'
/// ```
pub async fn ask_ai(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<AskAiRequest>, JsonRejection>,
) -> Result<Json<AskAiResponse>, RequestError> {
    let Json(body) = payload.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "ask_ai rejected body");
        AppError::from(e).for_request(&request_id)
    })?;

    let request = TutorRequest::new(
        body.topic.as_deref(),
        body.code.as_deref(),
        body.question.as_deref(),
        body.level.as_deref(),
    )
    .map_err(|e| {
        warn!(request_id = %request_id, error = %e, "ask_ai validation failed");
        AppError::from(e).for_request(&request_id)
    })?;

    let topic: String = request.topic().chars().take(LOG_TOPIC_CHARS).collect();
    info!(
        request_id = %request_id,
        topic = %topic,
        level = %request.level(),
        question_len = request.question().chars().count(),
        code_len = request.code().chars().count(),
        "ask_ai"
    );

    let answer = tutor_core::answer(state.generator.as_ref(), &request, request_id.as_str())
        .await
        .map_err(|e| {
            error!(request_id = %request_id, error = %e, "ask_ai provider failure");
            AppError::from(e).for_request(&request_id)
        })?;

    Ok(Json(AskAiResponse { answer, request_id }))
}
