//! Unified error handling for `ai-llm-service`.
//!
//! Two families of errors live here:
//!
//! - [`AiLlmError`] / [`ConfigError`]: startup problems (bad env, HTTP client
//!   construction). These are returned as `Err` from constructors.
//! - [`ProviderFailure`]: the outcome of a failed `generate` call. It is a
//!   value, not a panic or a transport error bubbling up: the provider client
//!   always classifies what went wrong and hands back a failure with an
//!   [`ErrorDetail`] that can be shown to callers.
//!
//! All `Display` messages carry the `[AI LLM Service]` prefix to simplify
//! attribution in logs.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for configuration and construction paths.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/// Outcome of a single provider call: generated text, or a classified failure.
///
/// The `Ok` text is never empty.
pub type ProviderResult = std::result::Result<String, ProviderFailure>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for constructing services from configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The shared HTTP client could not be built.
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A number failed to parse (timeouts, retry delays).
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `REQUEST_TIMEOUT_S`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `GEMINI_BASE_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// Model name was empty.
    #[error("[AI LLM Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Provider failures                                                         */
/* ------------------------------------------------------------------------- */

/// Whether retrying the same request can reasonably succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Rate limit, 5xx, timeout, connection reset, empty/garbled 200.
    Transient,
    /// Bad request, auth failure, missing credential.
    Fatal,
}

/// Diagnostic payload attached to a [`ProviderFailure`].
///
/// Serialized as-is into the `details` field of API error responses, so it
/// must never carry the API key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    /// Short human-readable description.
    pub message: String,
    /// Upstream HTTP status, when a response was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Raw upstream payload (JSON, or `{"text": <snippet>}` for non-JSON).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Description of the underlying error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

impl ErrorDetail {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            body: None,
            exception: None,
        }
    }
}

/// A classified failure of one or more provider attempts.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[AI LLM Service] {}", .detail.message)]
pub struct ProviderFailure {
    /// Retry classification.
    pub kind: FailureKind,
    /// Diagnostics for logs and API payloads.
    pub detail: ErrorDetail,
}

impl ProviderFailure {
    fn new(kind: FailureKind, detail: ErrorDetail) -> Self {
        Self { kind, detail }
    }

    /// No API key configured; nothing was sent.
    pub fn missing_credential() -> Self {
        Self::new(
            FailureKind::Fatal,
            ErrorDetail::message("Missing GEMINI_API_KEY in environment."),
        )
    }

    /// HTTP 200 but the envelope had no generated text.
    pub fn empty_response(raw: Value) -> Self {
        Self::new(
            FailureKind::Transient,
            ErrorDetail {
                body: Some(raw),
                ..ErrorDetail::message("Empty response from Gemini.")
            },
        )
    }

    /// HTTP 200 but the body was not the expected JSON envelope.
    pub fn unparseable(reason: impl std::fmt::Display) -> Self {
        Self::new(
            FailureKind::Transient,
            ErrorDetail {
                exception: Some(reason.to_string()),
                ..ErrorDetail::message("Failed to parse Gemini response.")
            },
        )
    }

    /// Non-200 status. Retryable statuses yield a transient failure.
    pub fn http_status(status: u16, body: Value) -> Self {
        let kind = if is_retryable_status(status) {
            FailureKind::Transient
        } else {
            FailureKind::Fatal
        };
        Self::new(
            kind,
            ErrorDetail {
                status: Some(status),
                body: Some(body),
                ..ErrorDetail::message("Gemini HTTP error")
            },
        )
    }

    /// The attempt hit the per-attempt timeout.
    pub fn timeout() -> Self {
        Self::new(
            FailureKind::Transient,
            ErrorDetail::message("Gemini request timed out."),
        )
    }

    /// Connection-level failure.
    ///
    /// The request URL is stripped from the error before it is rendered
    /// because it carries the API key as a query parameter.
    pub fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::timeout();
        }
        Self::new(
            FailureKind::Transient,
            ErrorDetail {
                exception: Some(err.without_url().to_string()),
                ..ErrorDetail::message("Gemini request failed.")
            },
        )
    }

    /// Fallback when the retry loop ends without any recorded failure.
    pub fn unknown() -> Self {
        Self::new(
            FailureKind::Fatal,
            ErrorDetail::message("Unknown Gemini failure."),
        )
    }

    /// `true` if another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind == FailureKind::Transient
    }
}

/// Statuses treated as transient: rate limiting and gateway/server hiccups.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Maximum number of characters kept from a non-JSON upstream body.
pub const SNIPPET_MAX_CHARS: usize = 2000;

/// Returns the first [`SNIPPET_MAX_CHARS`] characters of `text`.
pub fn make_snippet(text: &str) -> String {
    text.chars().take(SNIPPET_MAX_CHARS).collect()
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Reads an optional, non-empty environment variable.
pub fn env_opt(name: &'static str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `u64`.
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match env_opt(name) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidFormat`] when
/// the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn retryable_statuses() {
        for s in [429, 500, 502, 503, 504] {
            assert!(ProviderFailure::http_status(s, json!({})).is_retryable());
        }
        for s in [400, 401, 403, 404, 501] {
            assert!(!ProviderFailure::http_status(s, json!({})).is_retryable());
        }
    }

    #[test]
    fn missing_credential_is_fatal() {
        let f = ProviderFailure::missing_credential();
        assert_eq!(f.kind, FailureKind::Fatal);
        assert!(f.detail.message.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn detail_skips_empty_fields() {
        let v = serde_json::to_value(&ProviderFailure::timeout().detail).unwrap();
        assert_eq!(v, json!({ "message": "Gemini request timed out." }));

        let v = serde_json::to_value(&ProviderFailure::http_status(401, json!({"e": 1})).detail)
            .unwrap();
        assert_eq!(v["status"], 401);
        assert_eq!(v["body"], json!({"e": 1}));
    }

    #[test]
    fn snippet_is_char_bounded() {
        let s = "é".repeat(SNIPPET_MAX_CHARS + 10);
        assert_eq!(make_snippet(&s).chars().count(), SNIPPET_MAX_CHARS);
        assert_eq!(make_snippet("short"), "short");
    }

    #[test]
    fn endpoint_validation() {
        assert!(validate_http_endpoint("X", "https://a").is_ok());
        assert!(validate_http_endpoint("X", "ftp://a").is_err());
    }
}
