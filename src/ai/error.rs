//! AI request failure classification and retry policy.
//!
//! Every failed generation attempt is classified into one of a small
//! set of kinds, and the retry policy is a transition table keyed by
//! that classification: warming-up and network failures are retried
//! with class-specific backoff, authentication and malformed-response
//! failures are never retried.

use std::fmt;
use std::time::Duration;

/// Classification of a failed AI request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiErrorKind {
    /// No API key available; nothing was sent anywhere.
    MissingKey,
    /// The upstream model is cold-starting and asked us to wait.
    WarmingUp,
    /// The upstream rejected the API key.
    AuthFailure,
    /// The backend proxy could not be reached at all.
    NetworkFailure,
    /// Any other upstream failure.
    Upstream,
    /// The generated text contained no parseable JSON object.
    MalformedResponse,
}

impl fmt::Display for AiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AiErrorKind::MissingKey => "missing API key",
            AiErrorKind::WarmingUp => "model warming up",
            AiErrorKind::AuthFailure => "authentication failure",
            AiErrorKind::NetworkFailure => "network failure",
            AiErrorKind::Upstream => "upstream error",
            AiErrorKind::MalformedResponse => "malformed AI response",
        };
        f.write_str(name)
    }
}

/// An AI request error with its classification.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct AiError {
    pub kind: AiErrorKind,
    pub message: String,
}

impl AiError {
    pub fn new(kind: AiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_key() -> Self {
        Self::new(
            AiErrorKind::MissingKey,
            "API key required; configure one in settings",
        )
    }

    pub fn warming_up(message: impl Into<String>) -> Self {
        Self::new(AiErrorKind::WarmingUp, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(AiErrorKind::AuthFailure, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AiErrorKind::NetworkFailure, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(AiErrorKind::Upstream, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(AiErrorKind::MalformedResponse, message)
    }
}

/// Marker upstreams put in error bodies while a model is loading.
const LOADING_MARKER: &str = "loading";

/// Classify a non-success proxy response by status and body.
pub fn classify_response(status: u16, body: &str) -> AiErrorKind {
    if status == 503 || body.contains(LOADING_MARKER) {
        AiErrorKind::WarmingUp
    } else if status == 401 || status == 403 {
        AiErrorKind::AuthFailure
    } else {
        AiErrorKind::Upstream
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given duration, then attempt again.
    Wait(Duration),
    /// Give up and surface the error.
    Fail,
}

/// Retry policy: a fixed attempt budget with per-class backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Linear step while the model warms up (attempt number x step).
    pub warmup_step: Duration,
    /// Base for geometric backoff on network failures.
    pub network_base: Duration,
    /// Linear step for other retryable upstream failures.
    pub retry_step: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            warmup_step: Duration::from_secs(5),
            network_base: Duration::from_secs(2),
            retry_step: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Transition table keyed by failure classification. `attempt` is
    /// zero-based; the budget counts every attempt, including waits.
    pub fn decide(&self, kind: AiErrorKind, attempt: u32) -> RetryDecision {
        let attempts_left = attempt + 1 < self.max_attempts;
        match kind {
            AiErrorKind::WarmingUp if attempts_left => {
                RetryDecision::Wait(self.warmup_step * (attempt + 1))
            }
            AiErrorKind::NetworkFailure if attempts_left => {
                RetryDecision::Wait(self.network_base * 2u32.pow(attempt))
            }
            AiErrorKind::Upstream if attempts_left => {
                RetryDecision::Wait(self.retry_step * (attempt + 1))
            }
            // Auth failures, a missing key, and malformed output are
            // never retried; a fresh attempt cannot fix them.
            _ => RetryDecision::Fail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warming_up_waits_grow_linearly() {
        let config = RetryConfig::default();
        assert_eq!(
            config.decide(AiErrorKind::WarmingUp, 0),
            RetryDecision::Wait(Duration::from_secs(5))
        );
        assert_eq!(
            config.decide(AiErrorKind::WarmingUp, 1),
            RetryDecision::Wait(Duration::from_secs(10))
        );
        // Budget of three attempts: the third failure is final.
        assert_eq!(config.decide(AiErrorKind::WarmingUp, 2), RetryDecision::Fail);
    }

    #[test]
    fn network_waits_grow_geometrically() {
        let config = RetryConfig::default();
        assert_eq!(
            config.decide(AiErrorKind::NetworkFailure, 0),
            RetryDecision::Wait(Duration::from_secs(2))
        );
        assert_eq!(
            config.decide(AiErrorKind::NetworkFailure, 1),
            RetryDecision::Wait(Duration::from_secs(4))
        );
    }

    #[test]
    fn auth_and_malformed_never_retry() {
        let config = RetryConfig::default();
        assert_eq!(config.decide(AiErrorKind::AuthFailure, 0), RetryDecision::Fail);
        assert_eq!(config.decide(AiErrorKind::MissingKey, 0), RetryDecision::Fail);
        assert_eq!(
            config.decide(AiErrorKind::MalformedResponse, 0),
            RetryDecision::Fail
        );
    }

    #[test]
    fn classifies_proxy_responses() {
        assert_eq!(classify_response(503, ""), AiErrorKind::WarmingUp);
        assert_eq!(
            classify_response(500, "model gpt-x is still loading"),
            AiErrorKind::WarmingUp
        );
        assert_eq!(classify_response(401, ""), AiErrorKind::AuthFailure);
        assert_eq!(classify_response(403, ""), AiErrorKind::AuthFailure);
        assert_eq!(classify_response(500, "boom"), AiErrorKind::Upstream);
    }
}
