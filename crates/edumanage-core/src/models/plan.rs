use serde::Serialize;

use super::subscription::Plan;

/// Pricing entry for a subscription plan.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlanPricing {
    pub plan: Plan,
    pub name: &'static str,
    /// Monthly price in whole currency units, as the payment gateway expects.
    pub monthly_amount: i64,
    pub sort_order: i32,
}

/// Static plan catalog, ordered cheapest first.
pub const PLAN_CATALOG: &[PlanPricing] = &[
    PlanPricing {
        plan: Plan::Basic,
        name: "Basic",
        monthly_amount: 1499,
        sort_order: 1,
    },
    PlanPricing {
        plan: Plan::Standard,
        name: "Standard",
        monthly_amount: 2499,
        sort_order: 2,
    },
    PlanPricing {
        plan: Plan::Enterprise,
        name: "Enterprise",
        monthly_amount: 3499,
        sort_order: 3,
    },
];

impl Plan {
    /// All plans in catalog order.
    pub fn all() -> impl Iterator<Item = Plan> {
        PLAN_CATALOG.iter().map(|p| p.plan)
    }

    pub fn pricing(&self) -> &'static PlanPricing {
        PLAN_CATALOG
            .iter()
            .find(|p| p.plan == *self)
            .expect("every plan has a catalog entry")
    }

    /// Monthly price in whole currency units.
    pub fn price(&self) -> i64 {
        self.pricing().monthly_amount
    }

    pub fn display_name(&self) -> &'static str {
        self.pricing().name
    }
}
