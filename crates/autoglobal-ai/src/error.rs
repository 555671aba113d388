//! Caller-facing error taxonomy for the completion service.

use thiserror::Error;

use autoglobal_core::storage::StoreError;
use autoglobal_providers::ProviderError;

/// What can go wrong in a service call.
///
/// A usage-logging failure is deliberately absent: it never surfaces as an
/// error from `generate_completion`, only as a warning and a counter.
#[derive(Debug, Error)]
pub enum AiError {
    /// The organization id resolved to nothing in storage.
    #[error("organization {0} not found")]
    UnknownOrganization(String),

    /// Primary and fallback vendor both failed. The primary error is the
    /// one the caller acted on; the fallback error is kept for diagnosis.
    #[error("all providers failed, primary error: {primary}")]
    ProvidersExhausted {
        primary: ProviderError,
        fallback: ProviderError,
    },

    /// A storage read failed (quota or stats lookups).
    #[error(transparent)]
    Storage(#[from] StoreError),
}
