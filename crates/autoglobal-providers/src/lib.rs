//! Vendor adapters for the Automation Global AI subsystem.
//!
//! # Architecture
//!
//! - [`traits::CompletionProvider`] — trait both adapters implement
//! - [`openai::OpenAiProvider`] — OpenAI chat-completions client
//! - [`anthropic::AnthropicProvider`] — Anthropic messages client
//! - [`pricing`] — static per-model price tables and cost math
//!
//! Adapters are constructed with an explicit `reqwest::Client` and base URL
//! so tests can point them at a mock server.

pub mod anthropic;
pub mod openai;
pub mod pricing;
pub mod traits;

// Re-export main types for convenience
pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use pricing::{cost_for, rate_per_1k};
pub use traits::{CompletionProvider, ProviderError};
