//! The adapter contract — one vendor call per invocation.
//!
//! Each vendor (OpenAI, Anthropic) implements this trait. The dispatcher in
//! `autoglobal-ai` holds one adapter per vendor and decides which to call;
//! adapters never pick models for other vendors or retry on their own.

use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;

use autoglobal_core::types::{CompletionRequest, CompletionResponse, ProviderKind};

/// An adapter-level failure. Propagates unchanged to the dispatcher, which
/// owns the fallback decision.
///
/// A 200 with no usable text is not an error: adapters return an empty
/// `content` string and let the caller decide what to do with it.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor answered with a non-success status.
    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: ProviderKind,
        status: u16,
        body: String,
    },
}

/// Trait both vendor adapters implement.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Which vendor this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// The model used when the request carries no model hint. Also the
    /// model the dispatcher falls back to after the other vendor fails.
    fn default_model(&self) -> &str;

    /// Issue exactly one completion call.
    ///
    /// # Arguments
    /// * `request`    — The caller's request. `request.model` overrides the
    ///   default model; caps and temperature are request-or-default.
    /// * `request_id` — Correlation id, carried into the response.
    /// * `started`    — Wall-clock start of the overall dispatch, so the
    ///   reported duration covers a failed primary attempt too.
    async fn complete(
        &self,
        request: &CompletionRequest,
        request_id: &str,
        started: Instant,
    ) -> Result<CompletionResponse, ProviderError>;
}
