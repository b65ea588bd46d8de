//! Completion-provider abstraction and the OpenAI-compatible client.

use async_trait::async_trait;
use thiserror::Error;

mod openai;

pub use openai::{OpenAiConfig, OpenAiProvider};

/// Errors from a completion provider call.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
    #[error("Rate limit exceeded: retry after {retry_after:?}s")]
    RateLimitExceeded { retry_after: Option<u64> },
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Timeout")]
    Timeout,
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// One prompt-completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    /// Per-run API key; falls back to the provider's configured key.
    pub api_key: Option<String>,
}

/// Generated text plus reported token usage.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    /// Total token usage reported by the provider, 0 when unavailable.
    pub total_tokens: i64,
    pub model: String,
}

/// A remote language-model completion service.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_display() {
        assert_eq!(
            LlmError::AuthenticationError("bad key".into()).to_string(),
            "Authentication error: bad key"
        );
        assert_eq!(
            LlmError::ApiError {
                status: 500,
                message: "oops".into()
            }
            .to_string(),
            "API error (500): oops"
        );
        assert_eq!(LlmError::Timeout.to_string(), "Timeout");
        assert!(LlmError::RateLimitExceeded { retry_after: Some(3) }
            .to_string()
            .contains("retry after"));
    }
}
