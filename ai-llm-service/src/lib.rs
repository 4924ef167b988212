//! Gemini provider client for the tutor backend.
//!
//! - [`config`]: environment-driven [`GeminiConfig`] and the [`RetrySchedule`].
//! - [`retry_state`]: the retry state machine, free of I/O.
//! - [`services`]: the HTTP client and the [`TextGenerator`] seam.
//! - [`error_handler`]: config errors and classified provider failures.
//! - [`telemetry`]: `tracing-subscriber` helpers used by the binary.

pub mod config;
pub mod error_handler;
pub mod retry_state;
pub mod services;
pub mod telemetry;

pub use config::{
    gemini_config::{GeminiConfig, GenerationPolicy, TUTOR_GENERATION},
    retry_schedule::RetrySchedule,
};
pub use error_handler::{
    AiLlmError, ConfigError, ErrorDetail, FailureKind, ProviderFailure, ProviderResult,
};
pub use services::{gemini_service::GeminiService, text_generator::TextGenerator};
