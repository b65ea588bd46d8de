use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use async_trait::async_trait;
use serde_json::Value;

use super::{CompletionProvider, CompletionRequest, CompletionResponse, LlmError};

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

impl OpenAiConfig {
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or(base.api_key),
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(base.base_url),
        }
    }
}

/// Completion provider speaking the OpenAI chat-completions protocol.
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn build_headers(&self, request: &CompletionRequest) -> Result<HeaderMap, LlmError> {
        let api_key = request
            .api_key
            .clone()
            .unwrap_or_else(|| self.config.api_key.clone());
        if api_key.is_empty() {
            return Err(LlmError::AuthenticationError(
                "No API key configured".to_string(),
            ));
        }
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|e| LlmError::InvalidRequest(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn build_payload(request: &CompletionRequest) -> Value {
        let mut payload = serde_json::json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.prompt}],
        });
        if let Some(max_tokens) = request.max_tokens {
            payload["max_tokens"] = Value::Number(serde_json::Number::from(max_tokens));
        }
        if let Some(temp) = request.temperature {
            if let Some(n) = serde_json::Number::from_f64(temp) {
                payload["temperature"] = Value::Number(n);
            }
        }
        payload
    }

    fn parse_response(request: &CompletionRequest, body: Value) -> Result<CompletionResponse, LlmError> {
        let text = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                LlmError::SerializationError("Response missing message content".to_string())
            })?
            .to_string();
        let total_tokens = body["usage"]["total_tokens"].as_i64().unwrap_or(0);
        let model = body["model"]
            .as_str()
            .unwrap_or(request.model.as_str())
            .to_string();
        Ok(CompletionResponse {
            text,
            total_tokens,
            model,
        })
    }

    fn map_transport_error(e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::NetworkError(e.to_string())
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn id(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let headers = self.build_headers(&request)?;
        let payload = Self::build_payload(&request);
        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&payload)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let message = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationError(message),
                429 => LlmError::RateLimitExceeded { retry_after },
                code => LlmError::ApiError {
                    status: code,
                    message,
                },
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LlmError::SerializationError(e.to_string()))?;
        Self::parse_response(&request, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".into(),
            prompt: "Hello".into(),
            max_tokens: Some(100),
            temperature: Some(0.5),
            api_key: None,
        }
    }

    #[test]
    fn test_build_payload() {
        let payload = OpenAiProvider::build_payload(&request());
        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["messages"][0]["content"], "Hello");
        assert_eq!(payload["max_tokens"], 100);
        assert_eq!(payload["temperature"], 0.5);
    }

    #[test]
    fn test_build_payload_omits_unset_fields() {
        let mut req = request();
        req.max_tokens = None;
        req.temperature = None;
        let payload = OpenAiProvider::build_payload(&req);
        assert!(payload.get("max_tokens").is_none());
        assert!(payload.get("temperature").is_none());
    }

    #[test]
    fn test_parse_response() {
        let body = serde_json::json!({
            "model": "gpt-4o-mini-2024",
            "choices": [{"message": {"role": "assistant", "content": "Hi there"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
        });
        let resp = OpenAiProvider::parse_response(&request(), body).unwrap();
        assert_eq!(resp.text, "Hi there");
        assert_eq!(resp.total_tokens, 7);
        assert_eq!(resp.model, "gpt-4o-mini-2024");
    }

    #[test]
    fn test_parse_response_missing_usage_defaults_to_zero() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "ok"}}]
        });
        let resp = OpenAiProvider::parse_response(&request(), body).unwrap();
        assert_eq!(resp.total_tokens, 0);
        // Model falls back to the requested one.
        assert_eq!(resp.model, "gpt-4o-mini");
    }

    #[test]
    fn test_parse_response_missing_content_is_error() {
        let body = serde_json::json!({"choices": []});
        let err = OpenAiProvider::parse_response(&request(), body).unwrap_err();
        assert!(matches!(err, LlmError::SerializationError(_)));
    }

    #[test]
    fn test_missing_api_key_is_auth_error() {
        let provider = OpenAiProvider::new(OpenAiConfig::default());
        let err = provider.build_headers(&request()).unwrap_err();
        assert!(matches!(err, LlmError::AuthenticationError(_)));
    }
}
