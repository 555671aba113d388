//! The AI completion service for Automation Global.
//!
//! # Architecture
//!
//! - [`service::CompletionService`] — dispatch, one-shot cross-vendor
//!   fallback, non-fatal usage logging, quota checks, usage stats
//! - [`selection::ProviderSelector`] — deterministic provider choice for
//!   requests without a model hint
//! - [`error::AiError`] — caller-facing error taxonomy

pub mod error;
pub mod selection;
pub mod service;

pub use error::AiError;
pub use selection::ProviderSelector;
pub use service::{CompletionService, ProviderInfo};
