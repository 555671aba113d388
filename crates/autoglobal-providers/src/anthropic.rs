//! Anthropic adapter — one messages-API call per invocation.
//!
//! Token count is `input_tokens + output_tokens` from the usage block; cost
//! comes from the static price table in [`crate::pricing`].

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use autoglobal_core::config::{AiConfig, ProviderConfig};
use autoglobal_core::types::{CompletionRequest, CompletionResponse, ProviderKind};
use autoglobal_core::utils::truncate_string;

use crate::pricing;
use crate::traits::{CompletionProvider, ProviderError};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ─────────────────────────────────────────────
// Wire types (vendor-owned schema)
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessageParam {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct MessagesBody {
    model: String,
    max_tokens: u32,
    messages: Vec<MessageParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    content: Vec<ContentBlock>,
    usage: MessagesUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: u32,
    output_tokens: u32,
}

// ─────────────────────────────────────────────
// AnthropicProvider
// ─────────────────────────────────────────────

/// Adapter for the Anthropic messages endpoint.
///
/// Authenticates with the `x-api-key` header rather than a bearer token,
/// and pins the `anthropic-version` the wire types were written against.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    default_model: String,
    default_max_tokens: u32,
    default_temperature: f64,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl AnthropicProvider {
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

        AnthropicProvider {
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
        AnthropicProvider::new(
            client,
            provider,
            &ai.default_anthropic_model,
            ai.max_tokens,
            ai.temperature,
        )
    }

    fn messages_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/v1/messages", base)
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
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

        let body = MessagesBody {
            model: model.clone(),
            max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            messages: vec![MessageParam {
                role: "user",
                content: request.prompt.clone(),
            }],
            system: request.system_prompt.clone(),
            temperature: request.temperature.unwrap_or(self.default_temperature),
        };

        debug!(
            request_id,
            model = %model,
            prompt = %truncate_string(&request.prompt, 80),
            "Calling Anthropic"
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(request_id, status = %status, body = %body, "Anthropic API error");
            return Err(ProviderError::Api {
                provider: ProviderKind::Anthropic,
                status: status.as_u16(),
                body,
            });
        }

        let reply: MessagesReply = response.json().await?;

        let content = reply
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .unwrap_or_default();
        let tokens = reply.usage.input_tokens + reply.usage.output_tokens;
        let cost = pricing::cost_for(ProviderKind::Anthropic, &model, tokens);
        let duration_ms = started.elapsed().as_millis() as u64;

        debug!(request_id, tokens, cost, duration_ms, "Anthropic response received");

        Ok(CompletionResponse {
            content,
            model,
            provider: ProviderKind::Anthropic,
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

    fn provider_for(server: &MockServer) -> AnthropicProvider {
        let config = ProviderConfig {
            api_key: "sk-ant-test".to_string(),
            api_base: Some(server.uri()),
        };
        AnthropicProvider::new(
            reqwest::Client::new(),
            &config,
            "claude-sonnet-4-20250514",
            4096,
            0.7,
        )
    }

    fn success_body(text: &str, input: u32, output: u32) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_test",
            "role": "assistant",
            "content": [{ "type": "text", "text": text }],
            "usage": { "input_tokens": input, "output_tokens": output }
        })
    }

    #[test]
    fn test_messages_url() {
        let config = ProviderConfig {
            api_key: "key".to_string(),
            api_base: Some("https://api.anthropic.com/".to_string()),
        };
        let provider = AnthropicProvider::new(
            reqwest::Client::new(),
            &config,
            "claude-sonnet-4-20250514",
            4096,
            0.7,
        );
        assert_eq!(provider.messages_url(), "https://api.anthropic.com/v1/messages");
        assert_eq!(provider.kind(), ProviderKind::Anthropic);
    }

    #[tokio::test]
    async fn test_complete_success_sums_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Hello!", 12, 8)))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = CompletionRequest::new("org1", "Hi");
        let resp = provider
            .complete(&request, "req_1", Instant::now())
            .await
            .unwrap();

        assert_eq!(resp.content, "Hello!");
        assert_eq!(resp.model, "claude-sonnet-4-20250514");
        assert_eq!(resp.provider, ProviderKind::Anthropic);
        assert_eq!(resp.tokens, 20);
        assert!((resp.cost - 0.0003).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_complete_sends_system_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "system": "Be brief.",
                "temperature": 0.7,
                "messages": [{ "role": "user", "content": "Hi" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok", 5, 5)))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = CompletionRequest {
            system_prompt: Some("Be brief.".to_string()),
            ..CompletionRequest::new("org1", "Hi")
        };
        let resp = provider
            .complete(&request, "req_2", Instant::now())
            .await
            .unwrap();
        assert_eq!(resp.content, "ok");
    }

    #[tokio::test]
    async fn test_configured_temperature_reaches_request_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(serde_json::json!({ "temperature": 1.1 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok", 5, 5)))
            .mount(&server)
            .await;

        let ai = AiConfig {
            temperature: 1.1,
            ..AiConfig::default()
        };
        let config = ProviderConfig {
            api_key: "sk-ant-test".to_string(),
            api_base: Some(server.uri()),
        };
        let provider = AnthropicProvider::from_config(&config, &ai);

        let request = CompletionRequest::new("org1", "Hi");
        let resp = provider
            .complete(&request, "req_5", Instant::now())
            .await
            .unwrap();
        assert_eq!(resp.content, "ok");
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_json(serde_json::json!({
                "type": "error",
                "error": { "type": "overloaded_error", "message": "Overloaded" }
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = CompletionRequest::new("org1", "Hi");
        let err = provider
            .complete(&request, "req_3", Instant::now())
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { provider, status, .. } => {
                assert_eq!(provider, ProviderKind::Anthropic);
                assert_eq!(status, 529);
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_text_blocks_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_mixed",
                "content": [
                    { "type": "thinking", "thinking": "hmm" },
                    { "type": "text", "text": "The answer." }
                ],
                "usage": { "input_tokens": 3, "output_tokens": 4 }
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = CompletionRequest::new("org1", "Hi");
        let resp = provider
            .complete(&request, "req_4", Instant::now())
            .await
            .unwrap();
        assert_eq!(resp.content, "The answer.");
    }
}
