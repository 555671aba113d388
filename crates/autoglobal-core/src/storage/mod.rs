//! Storage abstraction for the AI subsystem.
//!
//! The production backend keeps organizations and usage logs in Postgres;
//! this subsystem only ever sees the three async operations below. The
//! in-memory implementation backs tests and the CLI demo harness.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Organization, Period, UsageLogEntry, UsageStats};

pub use memory::MemoryStore;

/// A storage-layer failure, opaque to this subsystem.
#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(msg: impl Into<String>) -> Self {
        StoreError(msg.into())
    }
}

/// The storage operations the AI subsystem consumes.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Persist one usage-log row. Append-only.
    async fn log_ai_usage(&self, entry: UsageLogEntry) -> Result<(), StoreError>;

    /// Look up an organization by id. `Ok(None)` when it does not exist.
    async fn get_organization(&self, id: &str) -> Result<Option<Organization>, StoreError>;

    /// Aggregate usage for one organization over a reporting window.
    async fn get_ai_usage_stats(
        &self,
        organization_id: &str,
        period: Period,
    ) -> Result<UsageStats, StoreError>;
}
