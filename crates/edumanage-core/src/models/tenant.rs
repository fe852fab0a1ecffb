use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::subscription::Subscription;

/// Tenant (school) configuration as served by the backend.
///
/// Replaced wholesale on every successful refetch; the only client-side
/// mutation is the optimistic `school_logo` patch applied through the
/// entitlement store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenantConfig {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub school_name: String,
    #[serde(default)]
    pub school_code: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub school_logo: Option<String>,
    #[serde(default)]
    pub subscription: Option<Subscription>,
}

impl TenantConfig {
    /// Built-in default used before any fetch has succeeded and when no
    /// cached copy exists. Unsubscribed, so everything gates closed.
    pub fn fallback() -> Self {
        Self {
            id: None,
            school_name: "EduManage".to_string(),
            school_code: None,
            contact_email: None,
            contact_phone: None,
            school_logo: None,
            subscription: None,
        }
    }

    /// Lock predicate at `now`. A missing subscription record counts as
    /// locked (no time remaining), never as a crash.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        match &self.subscription {
            Some(sub) => sub.is_locked_at(now),
            None => true,
        }
    }

    /// Whole days of trial remaining at `now`; 0 when no subscription.
    pub fn trial_days_remaining_at(&self, now: DateTime<Utc>) -> i64 {
        self.subscription
            .as_ref()
            .map(|s| s.trial_days_remaining_at(now))
            .unwrap_or(0)
    }

    /// Apply an optimistic local patch. Only covers fields the client can
    /// determine without a refetch.
    pub fn apply(&mut self, patch: TenantConfigPatch) {
        if let Some(logo) = patch.school_logo {
            self.school_logo = Some(logo);
        }
    }
}

/// Partial update for the optimistic local merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantConfigPatch {
    pub school_logo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Plan, SubscriptionStatus};

    #[test]
    fn fallback_is_unsubscribed_and_locked() {
        let config = TenantConfig::fallback();
        assert_eq!(config.school_name, "EduManage");
        assert!(config.subscription.is_none());
        assert!(config.is_locked_at(Utc::now()));
        assert_eq!(config.trial_days_remaining_at(Utc::now()), 0);
    }

    #[test]
    fn patch_only_touches_logo() {
        let mut config = TenantConfig::fallback();
        config.apply(TenantConfigPatch {
            school_logo: Some("https://cdn.example.com/logo.png".into()),
        });
        assert_eq!(
            config.school_logo.as_deref(),
            Some("https://cdn.example.com/logo.png")
        );
        assert_eq!(config.school_name, "EduManage");

        // Empty patch is a no-op.
        config.apply(TenantConfigPatch::default());
        assert!(config.school_logo.is_some());
    }

    #[test]
    fn deserializes_sparse_backend_payload() {
        let config: TenantConfig =
            serde_json::from_str(r#"{"school_name":"Hilltop Academy"}"#).unwrap();
        assert_eq!(config.school_name, "Hilltop Academy");
        assert!(config.subscription.is_none());
        assert!(config.is_locked_at(Utc::now()));
    }

    #[test]
    fn active_subscription_unlocks() {
        let config: TenantConfig = serde_json::from_str(
            r#"{"school_name":"Hilltop","subscription":{"plan":"standard","status":"active"}}"#,
        )
        .unwrap();
        assert!(!config.is_locked_at(Utc::now()));
        assert_eq!(
            config.subscription.as_ref().unwrap().status,
            SubscriptionStatus::Active
        );
        assert_eq!(config.subscription.as_ref().unwrap().plan, Plan::Standard);
    }
}
