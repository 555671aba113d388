//! Provider selection for requests without a model hint.
//!
//! The production backend this replaces flipped a coin per request. A
//! round-robin counter gives the same rough load split while keeping the
//! choice deterministic, so tests can pin down which vendor handles which
//! call.

use std::sync::atomic::{AtomicUsize, Ordering};

use autoglobal_core::config::LoadBalancing;
use autoglobal_core::types::ProviderKind;

/// Picks the starting vendor for requests that carry no model hint.
#[derive(Debug)]
pub struct ProviderSelector {
    policy: LoadBalancing,
    counter: AtomicUsize,
}

impl ProviderSelector {
    pub fn new(policy: LoadBalancing) -> Self {
        ProviderSelector {
            policy,
            counter: AtomicUsize::new(0),
        }
    }

    /// The configured policy.
    pub fn policy(&self) -> LoadBalancing {
        self.policy
    }

    /// Pick a vendor. Round-robin alternates per call; pinned policies
    /// always return the same vendor.
    pub fn select(&self) -> ProviderKind {
        match self.policy {
            LoadBalancing::RoundRobin => {
                if self.counter.fetch_add(1, Ordering::Relaxed) % 2 == 0 {
                    ProviderKind::OpenAi
                } else {
                    ProviderKind::Anthropic
                }
            }
            LoadBalancing::OpenAi => ProviderKind::OpenAi,
            LoadBalancing::Anthropic => ProviderKind::Anthropic,
        }
    }
}
