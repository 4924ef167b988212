//! Tutor pipeline: prompt builder → provider → output guardrail.
//!
//! Public API: [`answer`]. It renders the tutor prompt for a validated
//! [`TutorRequest`], asks the injected [`TextGenerator`] for text, and runs
//! the result through [`sanitize`]. Nothing is kept between calls.

pub mod api_types;
pub mod error;
pub mod prompt;
pub mod sanitize;

pub use api_types::{Level, MAX_CODE_CHARS, TutorRequest};
pub use error::{TutorError, ValidationError};
pub use prompt::build_tutor_prompt;
pub use sanitize::{sanitize, sanitize_opt};

use ai_llm_service::TextGenerator;
use tracing::debug;

/// Produces the final, guardrailed answer for one request.
///
/// # Errors
/// [`TutorError::Provider`] when the generator returns a failure; the
/// failure's detail is preserved for the caller.
pub async fn answer(
    generator: &dyn TextGenerator,
    request: &TutorRequest,
    request_id: &str,
) -> Result<String, TutorError> {
    let prompt = build_tutor_prompt(
        request.topic(),
        request.code(),
        request.question(),
        request.level().as_str(),
    );
    debug!(request_id, prompt_len = prompt.len(), "prompt built");

    let raw = generator.generate(&prompt, request_id).await?;
    let answer = sanitize(&raw).into_owned();

    debug!(
        request_id,
        raw_len = raw.len(),
        answer_len = answer.len(),
        "answer sanitized"
    );
    Ok(answer)
}
