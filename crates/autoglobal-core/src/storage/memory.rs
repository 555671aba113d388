//! In-memory `UsageStore` — backs tests and the CLI demo harness.
//!
//! Thread-safe via `RwLock` — multiple readers, exclusive writer. Locks are
//! never held across an await point.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::types::{Organization, Period, UsageLogEntry, UsageStats};

use super::{StoreError, UsageStore};

/// Usage logs and organizations held in process memory.
#[derive(Default)]
pub struct MemoryStore {
    organizations: RwLock<HashMap<String, Organization>>,
    entries: RwLock<Vec<UsageLogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Insert or replace an organization.
    pub fn upsert_organization(&self, org: Organization) {
        let mut orgs = self.organizations.write().unwrap();
        orgs.insert(org.id.clone(), org);
    }

    /// All usage entries recorded for one organization, in insertion order.
    pub fn entries_for(&self, organization_id: &str) -> Vec<UsageLogEntry> {
        let entries = self.entries.read().unwrap();
        entries
            .iter()
            .filter(|e| e.organization_id == organization_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UsageStore for MemoryStore {
    async fn log_ai_usage(&self, entry: UsageLogEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap();
        entries.push(entry);
        Ok(())
    }

    async fn get_organization(&self, id: &str) -> Result<Option<Organization>, StoreError> {
        let orgs = self.organizations.read().unwrap();
        Ok(orgs.get(id).cloned())
    }

    async fn get_ai_usage_stats(
        &self,
        organization_id: &str,
        period: Period,
    ) -> Result<UsageStats, StoreError> {
        let start = period.start(Utc::now());
        let entries = self.entries.read().unwrap();

        let mut stats = UsageStats {
            organization_id: organization_id.to_string(),
            total_requests: 0,
            total_tokens: 0,
            total_cost: 0.0,
            period,
        };

        for entry in entries
            .iter()
            .filter(|e| e.organization_id == organization_id && e.created_at >= start)
        {
            stats.total_requests += 1;
            stats.total_tokens += u64::from(entry.tokens);
            stats.total_cost += entry.cost;
        }

        Ok(stats)
    }
}
