//! Gemini `generateContent` client with bounded retry/backoff.
//!
//! Endpoint: `POST {base_url}/v1beta/models/{model}:generateContent?key={api_key}`
//!
//! Every call is classified into success or a [`ProviderFailure`]; nothing is
//! raised past this module. The retry loop is driven by [`RetryMachine`] and
//! the configured [`RetrySchedule`](crate::config::retry_schedule::RetrySchedule).

use std::time::Instant;

use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::{
    config::gemini_config::{GeminiConfig, GenerationPolicy, TUTOR_GENERATION},
    error_handler::{AiLlmError, ProviderFailure, ProviderResult, make_snippet},
    retry_state::{AttemptOutcome, RetryMachine, RetryState},
};

/// Thin client for the Gemini API.
///
/// Holds an injected `reqwest::Client`. The client is a pooled handle and is
/// cheap to clone, so one instance can serve all in-flight requests.
#[derive(Debug, Clone)]
pub struct GeminiService {
    client: reqwest::Client,
    cfg: GeminiConfig,
    url_generate: String,
}

impl GeminiService {
    /// Creates a new [`GeminiService`] around a shared HTTP client.
    ///
    /// A missing API key is not an error here; `generate` reports it per call.
    ///
    /// # Errors
    /// [`AiLlmError::Config`] if the config fails validation.
    pub fn new(cfg: GeminiConfig, client: reqwest::Client) -> Result<Self, AiLlmError> {
        cfg.validate()?;
        let url_generate = cfg.generate_url();

        info!(
            model = %cfg.model,
            base_url = %cfg.base_url,
            timeout_secs = cfg.request_timeout.as_secs(),
            max_attempts = cfg.retry.max_attempts(),
            has_api_key = cfg.api_key.is_some(),
            "GeminiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_generate,
        })
    }

    /// Builds the pooled HTTP client shared by the service.
    ///
    /// Timeouts are applied per request, so the same client may be reused by
    /// services with different budgets.
    pub fn build_http_client() -> Result<reqwest::Client, AiLlmError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        Ok(reqwest::Client::builder()
            .default_headers(headers)
            .build()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.cfg
    }

    /// Generates text for `prompt`, retrying transient failures.
    ///
    /// Returns the first non-empty text, or the last recorded failure once
    /// the schedule is exhausted or a fatal status is seen.
    pub async fn generate(&self, prompt: &str, request_id: &str) -> ProviderResult {
        let Some(api_key) = self.cfg.api_key.as_deref() else {
            let failure = ProviderFailure::missing_credential();
            error!(request_id, error = %failure, "gemini call skipped");
            return Err(failure);
        };

        let body = GenerateContentRequest::new(prompt, TUTOR_GENERATION);
        let mut machine = RetryMachine::new(&self.cfg.retry);
        let mut last_failure: Option<ProviderFailure> = None;
        let mut attempts = 0usize;

        loop {
            match machine.state() {
                RetryState::Attempting { attempt } => {
                    attempts = attempt;
                    match self.attempt(api_key, &body, request_id, attempt).await {
                        Ok(text) => {
                            machine.record(AttemptOutcome::Success);
                            return Ok(text);
                        }
                        Err(failure) => {
                            machine.record(outcome_of(&failure));
                            last_failure = Some(failure);
                        }
                    }
                }
                RetryState::Waiting {
                    next_attempt,
                    delay,
                } => {
                    debug!(
                        request_id,
                        next_attempt,
                        delay_ms = delay.as_millis(),
                        "gemini backoff"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    machine.wait_elapsed();
                }
                RetryState::Succeeded | RetryState::FailedTerminal => break,
            }
        }

        let failure = last_failure.unwrap_or_else(ProviderFailure::unknown);
        error!(
            request_id,
            attempts,
            status = failure.detail.status,
            error = %failure,
            "gemini gave up"
        );
        Err(failure)
    }

    /// Performs exactly one HTTP round trip and classifies it.
    async fn attempt(
        &self,
        api_key: &str,
        body: &GenerateContentRequest<'_>,
        request_id: &str,
        attempt: usize,
    ) -> ProviderResult {
        let started = Instant::now();

        debug!(request_id, attempt, model = %self.cfg.model, "POST {}", self.url_generate);

        let sent = self
            .client
            .post(&self.url_generate)
            .query(&[("key", api_key)])
            .timeout(self.cfg.request_timeout)
            .json(body)
            .send()
            .await;

        let resp = match sent {
            Ok(resp) => resp,
            Err(e) => {
                let failure = ProviderFailure::transport(e);
                warn!(
                    request_id,
                    attempt,
                    latency_ms = started.elapsed().as_millis(),
                    error = %failure,
                    "gemini request error"
                );
                return Err(failure);
            }
        };

        let status = resp.status().as_u16();
        let bytes = match resp.bytes().await {
            Ok(b) => b,
            Err(e) => {
                let failure = ProviderFailure::transport(e);
                warn!(
                    request_id,
                    attempt,
                    status,
                    latency_ms = started.elapsed().as_millis(),
                    error = %failure,
                    "gemini body read error"
                );
                return Err(failure);
            }
        };
        let latency_ms = started.elapsed().as_millis();

        if status != 200 {
            let failure = ProviderFailure::http_status(status, error_body(&bytes));
            warn!(
                request_id,
                attempt,
                status,
                retry = failure.is_retryable(),
                latency_ms,
                "gemini http error"
            );
            return Err(failure);
        }

        match extract_text(&bytes) {
            Ok(text) => {
                info!(request_id, attempt, latency_ms, "gemini ok");
                Ok(text)
            }
            Err(failure) => {
                error!(
                    request_id,
                    attempt,
                    latency_ms,
                    error = %failure,
                    "gemini unusable 200 response"
                );
                Err(failure)
            }
        }
    }
}

fn outcome_of(failure: &ProviderFailure) -> AttemptOutcome {
    if failure.is_retryable() {
        AttemptOutcome::Transient
    } else {
        AttemptOutcome::Fatal
    }
}

/// Upstream error body as JSON, or `{"text": <snippet>}` when it is not JSON.
fn error_body(bytes: &[u8]) -> Value {
    serde_json::from_slice::<Value>(bytes)
        .unwrap_or_else(|_| json!({ "text": make_snippet(&String::from_utf8_lossy(bytes)) }))
}

/// Pulls `candidates[0].content.parts[*].text` out of a 200 body.
fn extract_text(bytes: &[u8]) -> ProviderResult {
    let raw: Value = serde_json::from_slice(bytes).map_err(ProviderFailure::unparseable)?;
    let envelope: GenerateContentResponse =
        serde_json::from_value(raw.clone()).map_err(ProviderFailure::unparseable)?;

    let first = envelope
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderFailure::unparseable("no candidates in response"))?;

    let text: String = first
        .content
        .map(|c| {
            c.parts
                .iter()
                .filter_map(|p| p.as_object()?.get("text")?.as_str())
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        Err(ProviderFailure::empty_response(raw))
    } else {
        Ok(text)
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `generateContent` with the prompt as the only user turn.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<ContentIn<'a>>,
    generation_config: GenerationConfigIn,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, policy: GenerationPolicy) -> Self {
        Self {
            contents: vec![ContentIn {
                role: "user",
                parts: vec![PartIn { text: prompt }],
            }],
            generation_config: GenerationConfigIn {
                temperature: policy.temperature,
                top_p: policy.top_p,
                max_output_tokens: policy.max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ContentIn<'a> {
    role: &'a str,
    parts: Vec<PartIn<'a>>,
}

#[derive(Debug, Serialize)]
struct PartIn<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigIn {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

/// Minimal response envelope; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ContentOut>,
}

/// Parts stay loose: entries that are not objects are skipped, not rejected.
#[derive(Debug, Deserialize)]
struct ContentOut {
    #[serde(default)]
    parts: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use mockito::{Matcher, Server};

    use super::*;
    use crate::{config::retry_schedule::RetrySchedule, error_handler::FailureKind};

    const PATH: &str = r"^/v1beta/models/gemini-test:generateContent";

    fn service(base_url: &str, retries: usize, api_key: Option<&str>) -> GeminiService {
        service_with_timeout(base_url, retries, api_key, Duration::from_secs(5))
    }

    fn service_with_timeout(
        base_url: &str,
        retries: usize,
        api_key: Option<&str>,
        request_timeout: Duration,
    ) -> GeminiService {
        let cfg = GeminiConfig {
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
            model: "gemini-test".into(),
            request_timeout,
            retry: RetrySchedule::new(vec![Duration::ZERO; retries]),
        };
        GeminiService::new(cfg, GeminiService::build_http_client().unwrap()).unwrap()
    }

    fn ok_body(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn success_sends_key_and_policy() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(PATH.into()))
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "explain loops" }] }],
                "generationConfig": { "topP": 0.9, "maxOutputTokens": 900 }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok_body("Think about the counter."))
            .expect(1)
            .create_async()
            .await;

        let svc = service(&server.url(), 3, Some("test-key"));
        let out = svc.generate("explain loops", "req-1").await;

        assert_eq!(out.unwrap(), "Think about the counter.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn parts_are_concatenated() {
        let mut server = Server::new_async().await;
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "a" }, { "text": "b" }] } }]
        });
        server
            .mock("POST", Matcher::Regex(PATH.into()))
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let svc = service(&server.url(), 0, Some("k"));
        assert_eq!(svc.generate("p", "r").await.unwrap(), "ab");
    }

    #[tokio::test]
    async fn non_object_parts_are_skipped() {
        let mut server = Server::new_async().await;
        let body = json!({
            "candidates": [{ "content": { "parts": ["x", 7, { "text": "a" }, { "inlineData": {} }] } }]
        });
        server
            .mock("POST", Matcher::Regex(PATH.into()))
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let svc = service(&server.url(), 0, Some("k"));
        assert_eq!(svc.generate("p", "r").await.unwrap(), "a");
    }

    #[tokio::test]
    async fn server_errors_exhaust_schedule() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(PATH.into()))
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"error":{"message":"boom"}}"#)
            .expect(4)
            .create_async()
            .await;

        let svc = service(&server.url(), 3, Some("k"));
        let failure = svc.generate("p", "r").await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(failure.kind, FailureKind::Transient);
        assert_eq!(failure.detail.status, Some(500));
        assert_eq!(failure.detail.body, Some(json!({"error":{"message":"boom"}})));
    }

    #[tokio::test]
    async fn auth_error_is_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(PATH.into()))
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("unauthorized")
            .expect(1)
            .create_async()
            .await;

        let svc = service(&server.url(), 5, Some("k"));
        let failure = svc.generate("p", "r").await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(failure.kind, FailureKind::Fatal);
        assert_eq!(failure.detail.status, Some(401));
        assert_eq!(failure.detail.body, Some(json!({"text": "unauthorized"})));
    }

    #[tokio::test]
    async fn empty_envelope_is_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(PATH.into()))
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"candidates": [{"content": {"parts": []}}]}).to_string())
            .expect(3)
            .create_async()
            .await;

        let svc = service(&server.url(), 2, Some("k"));
        let failure = svc.generate("p", "r").await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(failure.detail.message, "Empty response from Gemini.");
        assert!(failure.detail.body.is_some());
    }

    #[tokio::test]
    async fn garbage_200_is_parse_failure() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(PATH.into()))
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>oops</html>")
            .expect(2)
            .create_async()
            .await;

        let svc = service(&server.url(), 1, Some("k"));
        let failure = svc.generate("p", "r").await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(failure.detail.message, "Failed to parse Gemini response.");
        assert!(failure.detail.exception.is_some());
    }

    #[tokio::test]
    async fn missing_key_makes_no_call() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let svc = service(&server.url(), 3, None);
        let failure = svc.generate("p", "r").await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(failure, ProviderFailure::missing_credential());
    }

    #[tokio::test]
    async fn silent_upstream_times_out_and_is_retried() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(socket);
            }
        });

        let svc = service_with_timeout(
            &format!("http://{addr}"),
            1,
            Some("k"),
            Duration::from_millis(100),
        );
        let failure = svc.generate("p", "r").await.unwrap_err();

        assert_eq!(accepted.load(Ordering::SeqCst), 2);
        assert_eq!(failure.kind, FailureKind::Transient);
        assert_eq!(failure.detail.message, "Gemini request timed out.");
    }

    #[tokio::test]
    async fn connection_failure_hides_key() {
        // Bind then drop to get a local port with nothing listening.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let svc = service(&format!("http://127.0.0.1:{port}"), 1, Some("secret-key"));
        let failure = svc.generate("p", "r").await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::Transient);
        assert_eq!(failure.detail.message, "Gemini request failed.");
        let rendered = serde_json::to_string(&failure.detail).unwrap();
        assert!(!rendered.contains("secret-key"));
    }
}
