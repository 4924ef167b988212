//! Typed errors for the tutor pipeline.

use ai_llm_service::ProviderFailure;
use thiserror::Error;

/// Client input that cannot be processed. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field 'question' is required.")]
    MissingQuestion,

    #[error("Field 'code' is too large.")]
    CodeTooLarge { chars: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum TutorError {
    /// The provider did not produce text after all permitted attempts.
    #[error(transparent)]
    Provider(#[from] ProviderFailure),
}
