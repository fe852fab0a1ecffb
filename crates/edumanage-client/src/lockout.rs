//! Lockout gate: the blocking decision behind the full-screen lock overlay.
//!
//! When the entitlement store reports the tenant locked, every route is
//! blocked except the billing page, the one place the lock can be
//! resolved. The gate also carries the "recheck" affordance for admins who
//! paid out-of-band and want the lock re-evaluated without waiting for a
//! poll.

use chrono::Utc;

use edumanage_core::SubscriptionStatus;

use crate::store::EntitlementStore;

/// Route prefix that stays reachable while locked.
pub const BILLING_ROUTE: &str = "/billing";

/// Blocking decision for the current tenant state.
#[derive(Clone)]
pub struct LockoutGate {
    store: EntitlementStore,
}

impl LockoutGate {
    pub fn new(store: EntitlementStore) -> Self {
        Self { store }
    }

    /// Whether the overlay should block `route` right now. Recomputed per
    /// call; the lock is time-dependent.
    pub fn should_block(&self, route: &str) -> bool {
        self.store.is_locked() && !route.starts_with(BILLING_ROUTE)
    }

    /// Force a fresh tenant-config load and report the resulting lock
    /// state. Used after an out-of-band payment.
    pub async fn recheck(&self) -> bool {
        self.store.load().await;
        self.store.is_locked()
    }

    /// Display strings for the overlay. `None` while unlocked.
    pub fn notice(&self) -> Option<LockoutNotice> {
        let config = self.store.config();
        if !config.is_locked_at(Utc::now()) {
            return None;
        }

        let school = config.school_name.clone();
        let notice = match config.subscription.as_ref().map(|s| s.status) {
            Some(SubscriptionStatus::Expired) => LockoutNotice {
                school_name: school.clone(),
                headline: "Subscription expired",
                message: format!(
                    "The subscription for {} has expired. Renew a plan to regain access.",
                    school
                ),
            },
            Some(SubscriptionStatus::Trial) => LockoutNotice {
                school_name: school.clone(),
                headline: "Trial ended",
                message: format!(
                    "The free trial for {} has ended. Upgrade to a plan to keep using EduManage.",
                    school
                ),
            },
            // Active never reaches here; no subscription at all gates closed.
            Some(SubscriptionStatus::Active) | None => LockoutNotice {
                school_name: school.clone(),
                headline: "Subscription required",
                message: format!(
                    "No active subscription was found for {}. Choose a plan to continue.",
                    school
                ),
            },
        };
        Some(notice)
    }
}

/// What a renderer needs to draw the blocking overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutNotice {
    pub school_name: String,
    pub headline: &'static str,
    pub message: String,
}
