//! Gemini configuration loaded from environment variables.
//!
//! # Environment variables
//!
//! - `GEMINI_API_KEY`     = API key (optional at startup; calls fail fast without it)
//! - `GEMINI_BASE_URL`    = API root, default `https://generativelanguage.googleapis.com`
//! - `GEMINI_MODEL`       = model id, default `gemini-1.5-flash`
//! - `REQUEST_TIMEOUT_S`  = per-attempt timeout in seconds, default `30`
//! - `RETRY_DELAYS_S`     = comma-separated backoff seconds, default `1,2,4,8,16`

use std::time::Duration;

use crate::{
    config::retry_schedule::RetrySchedule,
    error_handler::{AiLlmError, ConfigError, env_opt, env_opt_u64, validate_http_endpoint},
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sampling parameters sent with every request.
///
/// These are tutor policy, not something the caller can tune.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationPolicy {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

/// The policy used for all tutor answers.
pub const TUTOR_GENERATION: GenerationPolicy = GenerationPolicy {
    temperature: 0.4,
    top_p: 0.9,
    max_output_tokens: 900,
};

/// Configuration for the Gemini provider client.
///
/// # Fields
///
/// - `api_key`: Gemini API key, sent as the `key` query parameter.
/// - `base_url`: API root without trailing slash.
/// - `model`: model id used in the `models/{model}:generateContent` path.
/// - `request_timeout`: end-to-end bound for a single attempt.
/// - `retry`: backoff delays between attempts.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
    pub retry: RetrySchedule,
}

impl GeminiConfig {
    /// Builds the config from environment.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidFormat`] if `GEMINI_BASE_URL` is not http(s)
    /// - [`ConfigError::InvalidNumber`] for bad `REQUEST_TIMEOUT_S` / `RETRY_DELAYS_S`
    pub fn from_env() -> Result<Self, AiLlmError> {
        let base_url = env_opt("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        validate_http_endpoint("GEMINI_BASE_URL", &base_url)?;

        let model = env_opt("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        let timeout_secs = env_opt_u64("REQUEST_TIMEOUT_S")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let retry = match std::env::var("RETRY_DELAYS_S") {
            Ok(raw) => RetrySchedule::parse_secs("RETRY_DELAYS_S", &raw)?,
            Err(_) => RetrySchedule::default(),
        };

        let cfg = Self {
            api_key: env_opt("GEMINI_API_KEY"),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            request_timeout: Duration::from_secs(timeout_secs),
            retry,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks invariants that `from_env` and hand-built configs share.
    pub fn validate(&self) -> Result<(), AiLlmError> {
        validate_http_endpoint("GEMINI_BASE_URL", &self.base_url)?;
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        Ok(())
    }

    /// Full `generateContent` URL, without the credential.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(base: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: Some("k".into()),
            base_url: base.into(),
            model: "gemini-test".into(),
            request_timeout: Duration::from_secs(1),
            retry: RetrySchedule::none(),
        }
    }

    #[test]
    fn url_has_versioned_model_path() {
        assert_eq!(
            cfg("http://localhost:9/").generate_url(),
            "http://localhost:9/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(cfg("localhost").validate().is_err());
        let mut c = cfg("http://x");
        c.model = " ".into();
        assert!(matches!(
            c.validate(),
            Err(AiLlmError::Config(ConfigError::EmptyModel))
        ));
    }
}
