//! OpenAI adapter — one chat-completions call per invocation.
//!
//! Token count comes from `usage.total_tokens`; cost from the static price
//! table in [`crate::pricing`].

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use autoglobal_core::config::{AiConfig, ProviderConfig};
use autoglobal_core::types::{CompletionRequest, CompletionResponse, ProviderKind};
use autoglobal_core::utils::truncate_string;

use crate::pricing;
use crate::traits::{CompletionProvider, ProviderError};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

// ─────────────────────────────────────────────
// Wire types (vendor-owned schema)
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

// ─────────────────────────────────────────────
// OpenAiProvider
// ─────────────────────────────────────────────

/// Adapter for the OpenAI chat-completions endpoint.
///
/// Holds its own `reqwest::Client`, passed in by the caller so tests can
/// share a client and point `api_base` at a mock server.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    default_model: String,
    default_max_tokens: u32,
    default_temperature: f64,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create an adapter with an injected HTTP client.
    pub fn new(
        client: reqwest::Client,
        config: &ProviderConfig,
        default_model: impl Into<String>,
        default_max_tokens: u32,
        default_temperature: f64,
    ) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        OpenAiProvider {
            client,
            api_base,
            api_key: config.api_key.clone(),
            default_model: default_model.into(),
            default_max_tokens,
            default_temperature,
        }
    }

    /// Build an adapter from config, constructing a client with the
    /// configured request timeout.
    pub fn from_config(provider: &ProviderConfig, ai: &AiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(ai.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        OpenAiProvider::new(
            client,
            provider,
            &ai.default_openai_model,
            ai.max_tokens,
            ai.temperature,
        )
    }

    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        request_id: &str,
        started: Instant,
    ) -> Result<CompletionResponse, ProviderError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        let mut messages = Vec::new();
        if let Some(ref system) = request.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt.clone(),
        });

        let body = ChatCompletionBody {
            model: model.clone(),
            messages,
            max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            temperature: request.temperature.unwrap_or(self.default_temperature),
        };

        debug!(
            request_id,
            model = %model,
            prompt = %truncate_string(&request.prompt, 80),
            "Calling OpenAI"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(request_id, status = %status, body = %body, "OpenAI API error");
            return Err(ProviderError::Api {
                provider: ProviderKind::OpenAi,
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatCompletionReply = response.json().await?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let tokens = reply.usage.map_or(0, |u| u.total_tokens);
        let cost = pricing::cost_for(ProviderKind::OpenAi, &model, tokens);
        let duration_ms = started.elapsed().as_millis() as u64;

        debug!(request_id, tokens, cost, duration_ms, "OpenAI response received");

        Ok(CompletionResponse {
            content,
            model,
            provider: ProviderKind::OpenAi,
            tokens,
            cost,
            duration_ms,
            request_id: request_id.to_string(),
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAiProvider {
        let config = ProviderConfig {
            api_key: "test-key-123".to_string(),
            api_base: Some(server.uri()),
        };
        OpenAiProvider::new(reqwest::Client::new(), &config, "gpt-5", 4096, 0.7)
    }

    fn success_body(content: &str, total_tokens: u32) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": total_tokens - 10,
                "total_tokens": total_tokens
            }
        })
    }

    #[test]
    fn test_completions_url_trailing_slash() {
        let config = ProviderConfig {
            api_key: "key".to_string(),
            api_base: Some("https://api.openai.com/v1/".to_string()),
        };
        let provider = OpenAiProvider::new(reqwest::Client::new(), &config, "gpt-5", 4096, 0.7);
        assert_eq!(
            provider.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_api_base() {
        let provider = OpenAiProvider::new(
            reqwest::Client::new(),
            &ProviderConfig::default(),
            "gpt-5",
            4096,
            0.7,
        );
        assert_eq!(provider.api_base, "https://api.openai.com/v1");
        assert_eq!(provider.kind(), ProviderKind::OpenAi);
        assert_eq!(provider.default_model(), "gpt-5");
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Hello!", 15)))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = CompletionRequest::new("org1", "Hi");
        let resp = provider
            .complete(&request, "req_1", Instant::now())
            .await
            .unwrap();

        assert_eq!(resp.content, "Hello!");
        assert_eq!(resp.model, "gpt-5");
        assert_eq!(resp.provider, ProviderKind::OpenAi);
        assert_eq!(resp.tokens, 15);
        assert!((resp.cost - 0.00045).abs() < 1e-9);
        assert_eq!(resp.request_id, "req_1");
    }

    #[tokio::test]
    async fn test_complete_sends_overrides_and_system_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4-turbo",
                "max_tokens": 256,
                "temperature": 0.2,
                "messages": [
                    { "role": "system", "content": "Be brief." },
                    { "role": "user", "content": "Hi" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok", 12)))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = CompletionRequest {
            model: Some("gpt-4-turbo".to_string()),
            max_tokens: Some(256),
            temperature: Some(0.2),
            system_prompt: Some("Be brief.".to_string()),
            ..CompletionRequest::new("org1", "Hi")
        };

        // A body mismatch would make wiremock answer 404 and fail the call.
        let resp = provider
            .complete(&request, "req_2", Instant::now())
            .await
            .unwrap();
        assert_eq!(resp.content, "ok");
        assert_eq!(resp.model, "gpt-4-turbo");
    }

    #[tokio::test]
    async fn test_complete_defaults_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-5",
                "max_tokens": 4096,
                "temperature": 0.7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok", 12)))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = CompletionRequest::new("org1", "Hi");
        let resp = provider
            .complete(&request, "req_3", Instant::now())
            .await
            .unwrap();
        assert_eq!(resp.content, "ok");
    }

    #[tokio::test]
    async fn test_configured_temperature_reaches_request_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({ "temperature": 0.2 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok", 12)))
            .mount(&server)
            .await;

        let ai = AiConfig {
            temperature: 0.2,
            ..AiConfig::default()
        };
        let config = ProviderConfig {
            api_key: "key".to_string(),
            api_base: Some(server.uri()),
        };
        let provider = OpenAiProvider::from_config(&config, &ai);

        let request = CompletionRequest::new("org1", "Hi");
        let resp = provider
            .complete(&request, "req_7", Instant::now())
            .await
            .unwrap();
        assert_eq!(resp.content, "ok");
    }

    #[tokio::test]
    async fn test_empty_choices_yield_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-empty",
                "choices": [],
                "usage": { "prompt_tokens": 4, "completion_tokens": 0, "total_tokens": 4 }
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = CompletionRequest::new("org1", "Hi");
        let resp = provider
            .complete(&request, "req_8", Instant::now())
            .await
            .unwrap();

        // No usable text is still a success, mirroring the backend this
        // replaces; the caller sees an empty string.
        assert_eq!(resp.content, "");
        assert_eq!(resp.tokens, 4);
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "message": "Rate limit exceeded", "type": "rate_limit_error" }
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = CompletionRequest::new("org1", "Hi");
        let err = provider
            .complete(&request, "req_4", Instant::now())
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { provider, status, body } => {
                assert_eq!(provider, ProviderKind::OpenAi);
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit exceeded"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_network_error() {
        // Point at a port that's not listening
        let config = ProviderConfig {
            api_key: "key".to_string(),
            api_base: Some("http://127.0.0.1:1".to_string()),
        };
        let provider = OpenAiProvider::new(reqwest::Client::new(), &config, "gpt-5", 4096, 0.7);
        let request = CompletionRequest::new("org1", "Hi");
        let err = provider
            .complete(&request, "req_5", Instant::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
    }

    #[tokio::test]
    async fn test_missing_usage_counts_zero_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-nousage",
                "choices": [{ "message": { "content": "ok" }, "finish_reason": "stop" }],
                "usage": null
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = CompletionRequest::new("org1", "Hi");
        let resp = provider
            .complete(&request, "req_6", Instant::now())
            .await
            .unwrap();
        assert_eq!(resp.tokens, 0);
        assert_eq!(resp.cost, 0.0);
    }
}
