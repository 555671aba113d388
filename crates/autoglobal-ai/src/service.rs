//! The completion dispatcher — provider choice, one-shot fallback, usage
//! accounting, and quota checks.
//!
//! Flow per request: resolve a `ProviderKind` once (model hint, else the
//! selection policy), call that adapter, on failure call the other vendor's
//! adapter once with its default model, then persist a usage-log row. A
//! logging failure never fails the call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

use autoglobal_core::config::{AiConfig, Config};
use autoglobal_core::storage::UsageStore;
use autoglobal_core::types::{
    CompletionRequest, CompletionResponse, Period, ProviderKind, QuotaStatus, UsageLogEntry,
    UsageStats,
};
use autoglobal_core::{plans, utils};
use autoglobal_providers::{AnthropicProvider, CompletionProvider, OpenAiProvider};

use crate::error::AiError;
use crate::selection::ProviderSelector;

// ─────────────────────────────────────────────
// ProviderInfo
// ─────────────────────────────────────────────

/// Descriptor of one configured vendor, for admin listings.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ProviderKind,
    pub is_available: bool,
}

// ─────────────────────────────────────────────
// CompletionService
// ─────────────────────────────────────────────

/// The AI completion service. One instance serves all organizations;
/// requests are independent and share no per-request state.
pub struct CompletionService {
    openai: Arc<dyn CompletionProvider>,
    anthropic: Arc<dyn CompletionProvider>,
    store: Arc<dyn UsageStore>,
    selector: ProviderSelector,
    /// Whether a failed usage-log write emits a warning.
    report_log_failures: bool,
    /// Count of usage-log rows lost to storage failures.
    dropped_usage_logs: AtomicU64,
    openai_available: bool,
    anthropic_available: bool,
}

impl CompletionService {
    /// Assemble a service from explicit adapters — the seam tests use to
    /// substitute fakes.
    pub fn new(
        openai: Arc<dyn CompletionProvider>,
        anthropic: Arc<dyn CompletionProvider>,
        store: Arc<dyn UsageStore>,
        ai: &AiConfig,
    ) -> Self {
        CompletionService {
            openai,
            anthropic,
            store,
            selector: ProviderSelector::new(ai.load_balancing),
            report_log_failures: ai.report_log_failures,
            dropped_usage_logs: AtomicU64::new(0),
            openai_available: true,
            anthropic_available: true,
        }
    }

    /// Build a service with real vendor adapters from config.
    pub fn from_config(config: &Config, store: Arc<dyn UsageStore>) -> Self {
        let openai = OpenAiProvider::from_config(&config.providers.openai, &config.ai);
        let anthropic = AnthropicProvider::from_config(&config.providers.anthropic, &config.ai);

        let mut service =
            CompletionService::new(Arc::new(openai), Arc::new(anthropic), store, &config.ai);
        service.openai_available = config.providers.openai.is_configured();
        service.anthropic_available = config.providers.anthropic.is_configured();
        service
    }

    fn adapter(&self, kind: ProviderKind) -> &dyn CompletionProvider {
        match kind {
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::Anthropic => self.anthropic.as_ref(),
        }
    }

    /// Usage-log rows lost to storage failures since the service started.
    pub fn dropped_usage_logs(&self) -> u64 {
        self.dropped_usage_logs.load(Ordering::Relaxed)
    }

    // ─────────────────────────────────────────
    // Completion
    // ─────────────────────────────────────────

    /// Run one completion: dispatch, fall back once on failure, log usage.
    ///
    /// The provider tag is resolved here, once, and carried explicitly —
    /// the fallback path is always `kind.other()` with that vendor's
    /// default model, regardless of what the request asked for.
    pub async fn generate_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, AiError> {
        let started = Instant::now();
        let request_id = utils::request_id();

        let kind = match request.model.as_deref() {
            Some(model) => ProviderKind::from_model_hint(model),
            None => self.selector.select(),
        };

        debug!(
            request_id,
            organization = %request.organization_id,
            provider = %kind,
            model = request.model.as_deref().unwrap_or("(default)"),
            "Dispatching completion"
        );

        match self.adapter(kind).complete(request, &request_id, started).await {
            Ok(response) => {
                self.record_usage(request, &response).await;
                Ok(response)
            }
            Err(primary) => {
                let fallback_kind = kind.other();
                warn!(
                    request_id,
                    provider = %kind,
                    fallback = %fallback_kind,
                    error = %primary,
                    "Primary provider failed, trying fallback"
                );

                // The fallback ignores the original model hint and uses the
                // other vendor's default model.
                let fallback_request = CompletionRequest {
                    model: None,
                    ..request.clone()
                };

                match self
                    .adapter(fallback_kind)
                    .complete(&fallback_request, &request_id, started)
                    .await
                {
                    Ok(response) => {
                        self.record_usage(request, &response).await;
                        Ok(response)
                    }
                    Err(fallback) => {
                        error!(
                            request_id,
                            primary_error = %primary,
                            fallback_error = %fallback,
                            "Both providers failed"
                        );
                        Err(AiError::ProvidersExhausted { primary, fallback })
                    }
                }
            }
        }
    }

    /// Persist one usage-log row for a completed call.
    ///
    /// Side effect only. On storage failure the row is dropped, a warning
    /// is emitted (if configured), and the counter bumps; the completion
    /// result the caller sees is unchanged.
    async fn record_usage(&self, request: &CompletionRequest, response: &CompletionResponse) {
        let entry = UsageLogEntry {
            organization_id: request.organization_id.clone(),
            user_id: request.user_id.clone(),
            provider: response.provider,
            model: response.model.clone(),
            tokens: response.tokens,
            cost: response.cost,
            duration_ms: response.duration_ms,
            request_data: serde_json::json!({
                "prompt": request.prompt,
                "systemPrompt": request.system_prompt,
                "maxTokens": request.max_tokens,
                "temperature": request.temperature,
            }),
            response_data: serde_json::json!({
                "content": response.content,
                "requestId": response.request_id,
            }),
            status: "success".to_string(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.store.log_ai_usage(entry).await {
            self.dropped_usage_logs.fetch_add(1, Ordering::Relaxed);
            if self.report_log_failures {
                warn!(
                    request_id = %response.request_id,
                    organization = %request.organization_id,
                    error = %e,
                    "Failed to log AI usage"
                );
            }
        }
    }

    // ─────────────────────────────────────────
    // Quota and stats
    // ─────────────────────────────────────────

    /// Compare this month's request count against the organization's plan
    /// allowance.
    pub async fn check_quota(&self, organization_id: &str) -> Result<QuotaStatus, AiError> {
        let org = self
            .store
            .get_organization(organization_id)
            .await?
            .ok_or_else(|| AiError::UnknownOrganization(organization_id.to_string()))?;

        let limit = org.subscription_plan.limits().max_ai_requests;
        if limit == plans::UNLIMITED {
            return Ok(QuotaStatus {
                within_quota: true,
                remaining: plans::UNLIMITED,
                limit,
            });
        }

        let usage = self
            .store
            .get_ai_usage_stats(organization_id, Period::Month)
            .await?;
        let used = usage.total_requests as i64;

        Ok(QuotaStatus {
            within_quota: used < limit,
            remaining: (limit - used).max(0),
            limit,
        })
    }

    /// Aggregate usage for one organization over a reporting window.
    pub async fn usage_stats(
        &self,
        organization_id: &str,
        period: Period,
    ) -> Result<UsageStats, AiError> {
        Ok(self
            .store
            .get_ai_usage_stats(organization_id, period)
            .await?)
    }

    /// Vendor descriptors for admin listings. Availability reflects whether
    /// an API key is configured, not vendor health.
    pub fn available_providers(&self) -> Vec<ProviderInfo> {
        vec![
            ProviderInfo {
                id: "openai",
                name: "OpenAI",
                kind: ProviderKind::OpenAi,
                is_available: self.openai_available,
            },
            ProviderInfo {
                id: "anthropic",
                name: "Anthropic",
                kind: ProviderKind::Anthropic,
                is_available: self.anthropic_available,
            },
        ]
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
