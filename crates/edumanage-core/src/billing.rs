//! Due-amount rules for plan purchases, renewals, and upgrades.
//!
//! A trial never earns credit: any purchase made while trialing is charged
//! at the full target-plan price. Pro-ration applies only when an active,
//! paid-for plan is upgraded to a strictly more expensive one.

use crate::models::{Plan, Subscription, SubscriptionStatus};

/// Amount due to move the given subscription to `target`.
pub fn due_amount(subscription: Option<&Subscription>, target: Plan) -> i64 {
    let Some(sub) = subscription else {
        return target.price();
    };
    match sub.status {
        // Trial access was never paid for; charge the full price.
        SubscriptionStatus::Trial => target.price(),
        SubscriptionStatus::Active => {
            let difference = target.price() - sub.plan.price();
            if difference > 0 {
                difference
            } else {
                // Same plan or a downgrade: flat renewal charge.
                target.price()
            }
        }
        SubscriptionStatus::Expired => target.price(),
    }
}

/// Whether the pro-rated-upgrade rule applies, i.e. the amount due is a
/// price difference rather than the full price. Drives the pro-ration
/// banner in the upgrade flow.
pub fn prorated(subscription: Option<&Subscription>, target: Plan) -> bool {
    match subscription {
        Some(sub) => {
            sub.status == SubscriptionStatus::Active
                && target != sub.plan
                && target.price() > sub.plan.price()
        }
        None => false,
    }
}
