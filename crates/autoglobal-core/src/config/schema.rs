//! Configuration schema.
//!
//! Hierarchy: `Config` → `AiConfig`, `ProvidersConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.autoglobal/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub ai: AiConfig,
    pub providers: ProvidersConfig,
}

// ─────────────────────────────────────────────
// AI defaults
// ─────────────────────────────────────────────

/// Defaults and policy knobs for the completion dispatcher.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    /// Default OpenAI model, used when no model hint is given.
    pub default_openai_model: String,
    /// Default Anthropic model, also the fallback target after an OpenAI
    /// failure.
    pub default_anthropic_model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// How to pick a provider when the request carries no model hint.
    pub load_balancing: LoadBalancing,
    /// Whether a failed usage-log write emits a warning. It never fails the
    /// completion call either way.
    pub report_log_failures: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            default_openai_model: "gpt-5".to_string(),
            default_anthropic_model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            timeout_secs: 30,
            load_balancing: LoadBalancing::RoundRobin,
            report_log_failures: true,
        }
    }
}

/// Provider-selection policy for requests without a model hint.
///
/// Round-robin replaces the coin flip the original backend used, so
/// selection is deterministic and testable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadBalancing {
    /// Alternate between vendors on successive requests.
    RoundRobin,
    /// Always start with OpenAI.
    #[serde(rename = "openai")]
    OpenAi,
    /// Always start with Anthropic.
    Anthropic,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a single AI vendor (API key, base URL).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides the vendor default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Both vendor configurations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub anthropic: ProviderConfig,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
