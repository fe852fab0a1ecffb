use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service tier controlling which features are enabled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Basic,
    Standard,
    Enterprise,
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Plan::Basic => write!(f, "basic"),
            Plan::Standard => write!(f, "standard"),
            Plan::Enterprise => write!(f, "enterprise"),
        }
    }
}

impl std::str::FromStr for Plan {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Plan::Basic),
            "standard" => Ok(Plan::Standard),
            "enterprise" => Ok(Plan::Enterprise),
            other => Err(crate::error::AppError::InvalidInput(format!(
                "Unknown plan: {}",
                other
            ))),
        }
    }
}

/// Billing state of a tenant, independent of which plan is selected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
}

/// Subscription record embedded in the tenant configuration.
///
/// `trial_end` is meaningful only while `status` is `Trial`. When it is
/// absent the trial is treated as already over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub plan: Plan,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub trial_end: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Whether the tenant is locked out at `now`.
    ///
    /// Time-dependent, so callers must recompute per read instead of caching
    /// the result: a trial flips to locked the moment `now` passes
    /// `trial_end`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            SubscriptionStatus::Active => false,
            SubscriptionStatus::Expired => true,
            SubscriptionStatus::Trial => match self.trial_end {
                Some(end) => now > end,
                None => true,
            },
        }
    }

    /// Whole days of trial remaining at `now`, clamped to zero.
    ///
    /// Returns 0 for non-trial statuses and when `trial_end` is absent.
    pub fn trial_days_remaining_at(&self, now: DateTime<Utc>) -> i64 {
        if self.status != SubscriptionStatus::Trial {
            return 0;
        }
        match self.trial_end {
            Some(end) => (end - now).num_days().max(0),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sub(plan: Plan, status: SubscriptionStatus, trial_end: Option<DateTime<Utc>>) -> Subscription {
        Subscription {
            plan,
            status,
            trial_end,
        }
    }

    #[test]
    fn active_is_never_locked() {
        let now = Utc::now();
        for trial_end in [None, Some(now - Duration::days(30)), Some(now + Duration::days(30))] {
            let s = sub(Plan::Basic, SubscriptionStatus::Active, trial_end);
            assert!(!s.is_locked_at(now));
        }
    }

    #[test]
    fn expired_is_always_locked() {
        let now = Utc::now();
        for trial_end in [None, Some(now + Duration::days(30))] {
            let s = sub(Plan::Basic, SubscriptionStatus::Expired, trial_end);
            assert!(s.is_locked_at(now));
        }
    }

    #[test]
    fn trial_locks_when_clock_crosses_trial_end() {
        let end = Utc::now();
        let s = sub(Plan::Basic, SubscriptionStatus::Trial, Some(end));
        assert!(!s.is_locked_at(end - Duration::seconds(1)));
        assert!(!s.is_locked_at(end));
        assert!(s.is_locked_at(end + Duration::seconds(1)));
    }

    #[test]
    fn trial_without_end_date_is_locked() {
        let s = sub(Plan::Standard, SubscriptionStatus::Trial, None);
        assert!(s.is_locked_at(Utc::now()));
        assert_eq!(s.trial_days_remaining_at(Utc::now()), 0);
    }

    #[test]
    fn trial_days_remaining_clamps_to_zero() {
        let now = Utc::now();
        let s = sub(
            Plan::Basic,
            SubscriptionStatus::Trial,
            Some(now - Duration::days(3)),
        );
        assert_eq!(s.trial_days_remaining_at(now), 0);

        let s = sub(
            Plan::Basic,
            SubscriptionStatus::Trial,
            Some(now + Duration::days(3)),
        );
        assert_eq!(s.trial_days_remaining_at(now), 3);
    }

    #[test]
    fn days_remaining_is_zero_outside_trial() {
        let now = Utc::now();
        let s = sub(
            Plan::Basic,
            SubscriptionStatus::Active,
            Some(now + Duration::days(10)),
        );
        assert_eq!(s.trial_days_remaining_at(now), 0);
    }

    #[test]
    fn wire_format_is_lowercase() {
        let s = sub(Plan::Enterprise, SubscriptionStatus::Trial, None);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["plan"], "enterprise");
        assert_eq!(json["status"], "trial");
    }

    #[test]
    fn malformed_trial_end_is_rejected_by_parsing() {
        // Garbage timestamps must not deserialize into an unlocked trial.
        let err = serde_json::from_str::<Subscription>(
            r#"{"plan":"basic","status":"trial","trial_end":"not-a-date"}"#,
        );
        assert!(err.is_err());
    }
}
