//! Core crate for Automation Global — shared types, the subscription-plan
//! catalog, configuration, and the storage abstraction used by the AI
//! completion service.

pub mod config;
pub mod plans;
pub mod storage;
pub mod types;
pub mod utils;

pub use config::{load_config, Config};
pub use plans::{PlanLimits, SubscriptionPlan, UNLIMITED};
pub use storage::{MemoryStore, StoreError, UsageStore};
pub use types::{
    CompletionRequest, CompletionResponse, Organization, Period, ProviderKind, QuotaStatus,
    UsageLogEntry, UsageStats,
};
