//! Client for the backend AI proxy, plus the retrying request loop.

use async_trait::async_trait;

use crate::api::{GenerateRequest, GenerateResponse};

use super::error::{classify_response, AiError, AiErrorKind, RetryConfig, RetryDecision};

/// One-shot generation seam. The retry loop wraps this; tests swap in
/// scripted implementations.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Make exactly one generation attempt.
    async fn generate_once(&self, prompt: &str, max_tokens: u32) -> Result<String, AiError>;
}

/// HTTP client for the backend's `/api/ai/generate` endpoint.
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ProxyClient {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Generator for ProxyClient {
    async fn generate_once(&self, prompt: &str, max_tokens: u32) -> Result<String, AiError> {
        let url = format!("{}/ai/generate", self.base_url.trim_end_matches('/'));
        let request = GenerateRequest {
            prompt: prompt.to_string(),
            api_key: Some(self.api_key.clone()),
            max_tokens: Some(max_tokens),
        };

        let response = match self.http.post(&url).json(&request).send().await {
            Ok(r) => r,
            Err(e) if e.is_connect() => {
                return Err(AiError::network(format!("Connection failed: {e}")))
            }
            Err(e) if e.is_timeout() => {
                return Err(AiError::network(format!("Request timeout: {e}")))
            }
            Err(e) => return Err(AiError::network(format!("Request failed: {e}"))),
        };

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        if !(200..300).contains(&status) {
            let kind = classify_response(status, &body);
            return Err(AiError::new(kind, proxy_error_message(&body, status)));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| AiError::upstream(format!("Unexpected proxy response: {e}")))?;
        Ok(parsed.generated_text)
    }
}

/// Pull the `error`/`message` fields out of a proxy error body.
fn proxy_error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("API error ({status})"))
}

/// Invoke a generator with bounded, classified retry.
///
/// The budget covers every attempt; delays between attempts come from
/// the [`RetryConfig`] transition table. Auth failures surface
/// immediately, and an exhausted network budget becomes a distinct
/// "backend unreachable" error rather than an upstream one.
pub async fn generate_with_retry<G: Generator + ?Sized>(
    generator: &G,
    prompt: &str,
    max_tokens: u32,
    config: &RetryConfig,
) -> Result<String, AiError> {
    let mut attempt: u32 = 0;
    loop {
        match generator.generate_once(prompt, max_tokens).await {
            Ok(text) => {
                if attempt > 0 {
                    tracing::info!(retries = attempt, "AI request succeeded after retrying");
                }
                return Ok(text);
            }
            Err(error) => match config.decide(error.kind, attempt) {
                RetryDecision::Wait(delay) => {
                    tracing::warn!(
                        kind = %error.kind,
                        attempt = attempt + 1,
                        ?delay,
                        "AI request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::Fail => {
                    tracing::error!(kind = %error.kind, attempts = attempt + 1, "AI request failed");
                    return Err(finalize_error(error));
                }
            },
        }
    }
}

/// Rewrite terminal errors into the messages callers surface to users.
fn finalize_error(error: AiError) -> AiError {
    match error.kind {
        AiErrorKind::NetworkFailure => AiError::network(
            "Unable to reach the backend API; make sure the server is running",
        ),
        AiErrorKind::AuthFailure => {
            AiError::auth("Invalid API key; check your generative-language API key")
        }
        _ => error,
    }
}
