//! Backend collaborator traits
//!
//! The entitlement store, upgrade workflow, and confirmation poller talk to
//! the backend through this trait rather than a concrete HTTP client, so
//! tests can inject in-memory implementations. The client crate provides
//! the real implementation.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{PaymentInitiated, PaymentRequest, PaymentStatus, TenantConfig};

/// The three backend operations the entitlement core relies on.
#[async_trait]
pub trait BillingApi: Send + Sync {
    /// Fetch the tenant configuration, including the subscription record.
    async fn fetch_tenant_config(&self) -> Result<TenantConfig, AppError>;

    /// Initiate a mobile-money push payment. Returns the correlation
    /// reference used by the confirmation poll.
    async fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentInitiated, AppError>;

    /// Ask whether the payment has been confirmed and the subscription
    /// upgrade applied server-side.
    async fn verify_payment(&self, reference: &str) -> Result<PaymentStatus, AppError>;
}
