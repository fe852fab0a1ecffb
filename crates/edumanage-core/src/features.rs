//! Feature gating by subscription plan.
//!
//! The plan→feature mapping is a declarative table, not branching code, so
//! it stays auditable and trivially testable. Lookups are pure and total:
//! a feature absent from the table, or a name nobody recognizes, is
//! disabled. New capabilities must be allow-listed per plan before they are
//! exposed anywhere.

use crate::models::Plan;

/// A named capability whose availability depends on the tenant's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Attendance,
    FeeManagement,
    FinanceReports,
    BulkImport,
    SmsNotifications,
    Transport,
    Canteen,
    ApiAccess,
}

/// Plan allow-list per feature. Plans not listed are disabled.
pub const FEATURE_MATRIX: &[(Feature, &[Plan])] = &[
    (
        Feature::Attendance,
        &[Plan::Basic, Plan::Standard, Plan::Enterprise],
    ),
    (
        Feature::FeeManagement,
        &[Plan::Basic, Plan::Standard, Plan::Enterprise],
    ),
    (Feature::FinanceReports, &[Plan::Standard, Plan::Enterprise]),
    (Feature::BulkImport, &[Plan::Standard, Plan::Enterprise]),
    (
        Feature::SmsNotifications,
        &[Plan::Standard, Plan::Enterprise],
    ),
    (Feature::Transport, &[Plan::Enterprise]),
    (Feature::Canteen, &[Plan::Enterprise]),
    (Feature::ApiAccess, &[Plan::Enterprise]),
];

impl Feature {
    /// All gated features, in matrix order.
    pub fn all() -> impl Iterator<Item = Feature> {
        FEATURE_MATRIX.iter().map(|(f, _)| *f)
    }

    /// Wire name used by navigation and page components.
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Attendance => "attendance",
            Feature::FeeManagement => "fee_management",
            Feature::FinanceReports => "finance_reports",
            Feature::BulkImport => "bulk_import",
            Feature::SmsNotifications => "sms_notifications",
            Feature::Transport => "transport",
            Feature::Canteen => "canteen",
            Feature::ApiAccess => "api_access",
        }
    }

    /// Fail-closed lookup: unknown names map to no feature at all.
    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::all().find(|f| f.name() == name)
    }
}

/// Whether `feature` is enabled for `plan`.
pub fn is_enabled(feature: Feature, plan: Plan) -> bool {
    FEATURE_MATRIX
        .iter()
        .find(|(f, _)| *f == feature)
        .map(|(_, plans)| plans.contains(&plan))
        .unwrap_or(false)
}

/// Name-based variant for callers holding strings. Unrecognized names are
/// disabled, never an error.
pub fn is_enabled_by_name(name: &str, plan: Plan) -> bool {
    Feature::from_name(name)
        .map(|f| is_enabled(f, plan))
        .unwrap_or(false)
}
