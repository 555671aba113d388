//! Core types for the AI completion flow.
//!
//! `CompletionRequest` and `CompletionResponse` are transient, built once per
//! call. `UsageLogEntry` is the persisted billing record; `UsageStats` is the
//! aggregate the storage layer returns for a time window.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// ProviderKind
// ─────────────────────────────────────────────

/// Which AI vendor handles a request.
///
/// The dispatcher resolves this tag once and carries it explicitly through
/// the adapter and fallback paths, so no downstream code has to guess the
/// vendor from a model-name substring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// The alternate vendor, used for the one-shot fallback.
    pub fn other(self) -> ProviderKind {
        match self {
            ProviderKind::OpenAi => ProviderKind::Anthropic,
            ProviderKind::Anthropic => ProviderKind::OpenAi,
        }
    }

    /// Stable identifier used in usage logs and config keys.
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Human-readable name for CLI output and logs.
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
        }
    }

    /// Resolve a provider from an explicit model hint.
    ///
    /// Claude-family model names route to Anthropic; everything else routes
    /// to OpenAI. Callers with no model hint should use the selection policy
    /// instead of this function.
    pub fn from_model_hint(model: &str) -> ProviderKind {
        if model.to_lowercase().contains("claude") {
            ProviderKind::Anthropic
        } else {
            ProviderKind::OpenAi
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────
// Completion request / response
// ─────────────────────────────────────────────

/// One inbound completion request, constructed per call. Not persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub prompt: String,
    /// Explicit model override. `None` means "let the selection policy pick".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl CompletionRequest {
    /// Create a request with only the required fields set.
    pub fn new(organization_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        CompletionRequest {
            organization_id: organization_id.into(),
            user_id: None,
            prompt: prompt.into(),
            model: None,
            max_tokens: None,
            temperature: None,
            system_prompt: None,
        }
    }
}

/// Result of one completion call, direct or via fallback. Its fields are
/// copied into a `UsageLogEntry` after the call completes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub provider: ProviderKind,
    pub tokens: u32,
    /// Estimated cost in USD. Illustrative, not contractual billing.
    pub cost: f64,
    pub duration_ms: u64,
    pub request_id: String,
}

// ─────────────────────────────────────────────
// Usage accounting
// ─────────────────────────────────────────────

/// One persisted usage-log row. Append-only; never mutated or deleted in
/// normal operation, retained for billing and analytics.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLogEntry {
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub provider: ProviderKind,
    pub model: String,
    pub tokens: u32,
    pub cost: f64,
    pub duration_ms: u64,
    /// Snapshot of the request (prompt, system prompt, caps).
    pub request_data: serde_json::Value,
    /// Snapshot of the response (content, request id).
    pub response_data: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate usage for one organization over a time window.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub organization_id: String,
    pub total_requests: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub period: Period,
}

/// Reporting window for usage queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Start of the window, relative to `now`.
    ///
    /// `Today` is midnight UTC, `Week` a rolling seven days, `Month` the
    /// first of the current calendar month.
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .expect("midnight is valid")
                .and_utc(),
            Period::Week => now - chrono::Duration::days(7),
            Period::Month => now
                .date_naive()
                .with_day(1)
                .expect("day 1 is valid")
                .and_hms_opt(0, 0, 0)
                .expect("midnight is valid")
                .and_utc(),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(format!("unknown period '{}'", other)),
        }
    }
}

// ─────────────────────────────────────────────
// Organizations and quota
// ─────────────────────────────────────────────

/// The slice of an organization the AI subsystem reads: identity plus the
/// subscription plan that determines its monthly request allowance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub subscription_plan: crate::plans::SubscriptionPlan,
}

/// Result of a quota check against the monthly plan limit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub within_quota: bool,
    /// Requests left this month. `-1` when the plan is unlimited.
    pub remaining: i64,
    /// The plan's monthly cap. `-1` means unlimited.
    pub limit: i64,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_provider_kind_other() {
        assert_eq!(ProviderKind::OpenAi.other(), ProviderKind::Anthropic);
        assert_eq!(ProviderKind::Anthropic.other(), ProviderKind::OpenAi);
    }

    #[test]
    fn test_provider_kind_from_model_hint() {
        assert_eq!(
            ProviderKind::from_model_hint("claude-sonnet-4-20250514"),
            ProviderKind::Anthropic
        );
        assert_eq!(
            ProviderKind::from_model_hint("Claude-3-Opus"),
            ProviderKind::Anthropic
        );
        assert_eq!(ProviderKind::from_model_hint("gpt-5"), ProviderKind::OpenAi);
        assert_eq!(
            ProviderKind::from_model_hint("gpt-3.5-turbo"),
            ProviderKind::OpenAi
        );
    }

    #[test]
    fn test_provider_kind_serde() {
        let json = serde_json::to_string(&ProviderKind::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
        let kind: ProviderKind = serde_json::from_str("\"anthropic\"").unwrap();
        assert_eq!(kind, ProviderKind::Anthropic);
    }

    #[test]
    fn test_request_serialization_skips_empty_fields() {
        let req = CompletionRequest::new("org1", "hello");
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["organizationId"], "org1");
        assert_eq!(json["prompt"], "hello");
        assert!(json.get("model").is_none());
        assert!(json.get("systemPrompt").is_none());
    }

    #[test]
    fn test_period_start_today() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 14, 30, 0).unwrap();
        let start = Period::Today.start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_period_start_week() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 14, 30, 0).unwrap();
        let start = Period::Week.start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 8, 14, 30, 0).unwrap());
    }

    #[test]
    fn test_period_start_month() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 14, 30, 0).unwrap();
        let start = Period::Month.start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_period_from_str() {
        assert_eq!("month".parse::<Period>().unwrap(), Period::Month);
        assert!("fortnight".parse::<Period>().is_err());
    }
}
