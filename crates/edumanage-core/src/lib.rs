//! EduManage Core Library
//!
//! This crate provides the domain models, feature gating, billing rules,
//! error types, and configuration shared across all EduManage client
//! components.

pub mod billing;
pub mod config;
pub mod error;
pub mod features;
pub mod hooks;
pub mod models;

// Re-export commonly used types
pub use billing::{due_amount, prorated};
pub use config::ClientConfig;
pub use error::AppError;
pub use features::{is_enabled, is_enabled_by_name, Feature};
pub use hooks::BillingApi;
pub use models::{
    PaymentInitiated, PaymentPhase, PaymentRequest, PaymentStatus, Plan, Subscription,
    SubscriptionStatus, TenantConfig, TenantConfigPatch,
};
