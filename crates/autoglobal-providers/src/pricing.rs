//! Static per-model price tables and the cost function.
//!
//! Rates are per 1K tokens, in USD, and are approximate: they exist for
//! usage accounting and quota dashboards, not for invoicing against real
//! vendor bills.

use autoglobal_core::types::ProviderKind;

/// OpenAI rates per 1K tokens. Unknown models fall back to the gpt-4 rate.
static OPENAI_RATES: &[(&str, f64)] = &[
    ("gpt-5", 0.03),
    ("gpt-4", 0.03),
    ("gpt-4-turbo", 0.01),
    ("gpt-3.5-turbo", 0.002),
];

/// Fallback rate for unrecognized OpenAI models (the gpt-4 rate).
const OPENAI_FALLBACK_RATE: f64 = 0.03;

/// Anthropic rates per 1K tokens.
static ANTHROPIC_RATES: &[(&str, f64)] = &[
    ("claude-sonnet-4-20250514", 0.015),
    ("claude-3-5-sonnet-20241022", 0.015),
    ("claude-3-opus-20240229", 0.075),
];

/// Fallback rate for unrecognized Anthropic models.
const ANTHROPIC_FALLBACK_RATE: f64 = 0.015;

/// Rate per 1K tokens for a model, falling back to the vendor default when
/// the model is not in the table.
pub fn rate_per_1k(provider: ProviderKind, model: &str) -> f64 {
    let (table, fallback) = match provider {
        ProviderKind::OpenAi => (OPENAI_RATES, OPENAI_FALLBACK_RATE),
        ProviderKind::Anthropic => (ANTHROPIC_RATES, ANTHROPIC_FALLBACK_RATE),
    };
    table
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, rate)| *rate)
        .unwrap_or(fallback)
}

/// Estimated cost in USD: `(tokens / 1000) * rate_per_1k(model)`.
pub fn cost_for(provider: ProviderKind, model: &str, tokens: u32) -> f64 {
    (f64::from(tokens) / 1000.0) * rate_per_1k(provider, model)
}
