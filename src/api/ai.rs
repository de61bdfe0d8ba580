//! AI proxy endpoint.
//!
//! A stateless pass-through to the upstream generative-language
//! service. It exists so the browser never talks to the vendor
//! directly (no exposed key, no cross-origin issues). Retries are the
//! caller's job; this endpoint makes exactly one upstream call.

use std::sync::Arc;

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::routes::AppState;

/// Request body for POST /api/ai/generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Response body for a successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub generated_text: String,
    pub success: bool,
}

pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Marker the vendor puts in its error body for a bad key.
const INVALID_KEY_MARKER: &str = "API_KEY_INVALID";

/// POST /api/ai/generate - forward a prompt to the upstream service.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let api_key = req
        .api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| state.config.default_api_key.clone())
        .ok_or(ApiError::MissingApiKey)?;
    let max_tokens = req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);

    tracing::info!("Forwarding prompt to generative-language API");

    let body = UpstreamRequest {
        contents: vec![Content {
            parts: vec![Part { text: req.prompt }],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: max_tokens,
            temperature: 0.7,
        },
    };

    let response = state
        .http
        .post(&state.config.ai_api_url)
        .header("x-goog-api-key", &api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| ApiError::Upstream(format!("AI service request failed: {e}")))?;

    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    if !status.is_success() {
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
            || text.contains(INVALID_KEY_MARKER)
        {
            tracing::warn!("Upstream rejected the API key");
            return Err(ApiError::InvalidApiKey);
        }
        tracing::error!(status = %status, "AI proxy upstream error");
        return Err(ApiError::Upstream(upstream_message(&text, status.as_u16())));
    }

    let parsed: UpstreamResponse = serde_json::from_str(&text)
        .map_err(|e| ApiError::Upstream(format!("Failed to parse AI response: {e}")))?;
    let generated_text = parsed.generated_text().ok_or_else(|| {
        ApiError::Upstream("AI service returned no candidates".to_string())
    })?;

    tracing::info!("AI response received");
    Ok(Json(GenerateResponse {
        generated_text,
        success: true,
    }))
}

/// Pull the human-readable message out of an upstream error body,
/// falling back to the raw body so nothing is lost.
fn upstream_message(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("AI service error (status {status})")
            } else {
                body.to_string()
            }
        })
}

/// Upstream request format (generateContent).
#[derive(Debug, Serialize)]
struct UpstreamRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

/// Upstream response format.
#[derive(Debug, Deserialize)]
struct UpstreamResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl UpstreamResponse {
    fn generated_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::test_state;

    #[tokio::test]
    async fn missing_key_fails_fast_without_upstream_call() {
        // The test state points at an unresolvable upstream URL, so a
        // forwarded request would surface as an upstream error, not a
        // missing-key error.
        let state = test_state();
        let err = generate(
            State(state),
            Json(GenerateRequest {
                prompt: "hello".to_string(),
                api_key: None,
                max_tokens: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::MissingApiKey));
    }

    #[test]
    fn parses_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"part one, "},{"text":"part two"}]}}]}"#;
        let parsed: UpstreamResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.generated_text().as_deref(),
            Some("part one, part two")
        );
    }

    #[test]
    fn empty_candidates_yield_none() {
        let parsed: UpstreamResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(parsed.generated_text().is_none());
    }

    #[test]
    fn upstream_message_prefers_structured_error() {
        let body = r#"{"error":{"code":429,"message":"Resource exhausted"}}"#;
        assert_eq!(upstream_message(body, 429), "Resource exhausted");
        assert_eq!(upstream_message("plain text", 500), "plain text");
        assert_eq!(upstream_message("", 502), "AI service error (status 502)");
    }
}
