//! Subscription-plan catalog — static limits for each tier.
//!
//! Read-only at runtime. `-1` is the unlimited sentinel for any cap.

use serde::{Deserialize, Serialize};

/// Sentinel meaning "no cap" for a plan limit.
pub const UNLIMITED: i64 = -1;

/// Subscription tiers an organization can be on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    Starter,
    Professional,
    Enterprise,
}

impl SubscriptionPlan {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionPlan::Starter => "starter",
            SubscriptionPlan::Professional => "professional",
            SubscriptionPlan::Enterprise => "enterprise",
        }
    }

    /// The static limits for this plan.
    pub fn limits(self) -> &'static PlanLimits {
        match self {
            SubscriptionPlan::Starter => &PLANS[0],
            SubscriptionPlan::Professional => &PLANS[1],
            SubscriptionPlan::Enterprise => &PLANS[2],
        }
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(SubscriptionPlan::Starter),
            "professional" => Ok(SubscriptionPlan::Professional),
            "enterprise" => Ok(SubscriptionPlan::Enterprise),
            other => Err(format!("unknown plan '{}'", other)),
        }
    }
}

/// Per-plan caps and pricing.
///
/// Invariant: `max_ai_requests` is non-negative or the `-1` unlimited
/// sentinel.
#[derive(Clone, Debug)]
pub struct PlanLimits {
    pub name: &'static str,
    /// Monthly price in USD.
    pub price_usd: u32,
    pub max_users: i64,
    /// Monthly AI-request allowance.
    pub max_ai_requests: i64,
    pub max_modules: i64,
    pub features: &'static [&'static str],
}

/// All plan tiers, in ascending price order.
pub static PLANS: &[PlanLimits] = &[
    PlanLimits {
        name: "Starter",
        price_usd: 29,
        max_users: 2,
        max_ai_requests: 1000,
        max_modules: 2,
        features: &["basic_integrations", "email_support"],
    },
    PlanLimits {
        name: "Professional",
        price_usd: 99,
        max_users: 10,
        max_ai_requests: 10_000,
        max_modules: UNLIMITED,
        features: &["advanced_integrations", "priority_support", "analytics"],
    },
    PlanLimits {
        name: "Enterprise",
        price_usd: 299,
        max_users: UNLIMITED,
        max_ai_requests: 100_000,
        max_modules: UNLIMITED,
        features: &[
            "custom_integrations",
            "dedicated_support",
            "custom_ai_models",
            "sla",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_lookup() {
        assert_eq!(SubscriptionPlan::Starter.limits().max_ai_requests, 1000);
        assert_eq!(
            SubscriptionPlan::Professional.limits().max_ai_requests,
            10_000
        );
        assert_eq!(
            SubscriptionPlan::Enterprise.limits().max_ai_requests,
            100_000
        );
    }

    #[test]
    fn test_unlimited_sentinels() {
        assert_eq!(SubscriptionPlan::Professional.limits().max_modules, UNLIMITED);
        assert_eq!(SubscriptionPlan::Enterprise.limits().max_users, UNLIMITED);
    }

    #[test]
    fn test_ai_request_caps_are_valid() {
        for plan in PLANS {
            assert!(plan.max_ai_requests >= 0 || plan.max_ai_requests == UNLIMITED);
        }
    }

    #[test]
    fn test_plan_serde_roundtrip() {
        let json = serde_json::to_string(&SubscriptionPlan::Professional).unwrap();
        assert_eq!(json, "\"professional\"");
        let plan: SubscriptionPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, SubscriptionPlan::Professional);
    }

    #[test]
    fn test_plan_from_str() {
        assert_eq!(
            "enterprise".parse::<SubscriptionPlan>().unwrap(),
            SubscriptionPlan::Enterprise
        );
        assert!("free".parse::<SubscriptionPlan>().is_err());
    }
}
