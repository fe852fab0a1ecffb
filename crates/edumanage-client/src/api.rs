//! Domain methods for the EduManage API client.
//!
//! Request/response types live in `edumanage_core::models`; this module
//! binds them to endpoints and implements the [`BillingApi`] seam trait so
//! the store, workflow, and poller stay testable without HTTP.

use async_trait::async_trait;
use serde_json::json;

use crate::{api_prefix, ApiClient};
use edumanage_core::{
    AppError, BillingApi, PaymentInitiated, PaymentRequest, PaymentStatus, TenantConfig,
};

impl ApiClient {
    /// Fetch the tenant configuration for the authenticated school.
    pub async fn fetch_tenant_config(&self) -> Result<TenantConfig, AppError> {
        self.get(&format!("{}/tenant/config", api_prefix()), &[])
            .await
    }

    /// Initiate a mobile-money push payment for a plan purchase.
    ///
    /// A rejection (validation error, gateway error) comes back as
    /// `PaymentRejected` carrying the backend message so the UI can show it
    /// verbatim.
    pub async fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentInitiated, AppError> {
        self.post_json(&format!("{}/billing/payments", api_prefix()), request)
            .await
            .map_err(|e| match e {
                AppError::Api { message, .. } => AppError::PaymentRejected(message),
                other => other,
            })
    }

    /// Poll whether a previously initiated payment has been confirmed and
    /// the subscription upgrade applied.
    pub async fn verify_payment(&self, reference: &str) -> Result<PaymentStatus, AppError> {
        self.get(
            &format!("{}/billing/payments/{}", api_prefix(), reference),
            &[],
        )
        .await
    }

    /// Persist a freshly uploaded school logo URL server-side. The
    /// entitlement store applies the same change locally via `update`.
    pub async fn update_school_logo(&self, logo_url: &str) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .put_json(
                &format!("{}/tenant/logo", api_prefix()),
                &json!({ "school_logo": logo_url }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BillingApi for ApiClient {
    async fn fetch_tenant_config(&self) -> Result<TenantConfig, AppError> {
        ApiClient::fetch_tenant_config(self).await
    }

    async fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentInitiated, AppError> {
        ApiClient::initiate_payment(self, request).await
    }

    async fn verify_payment(&self, reference: &str) -> Result<PaymentStatus, AppError> {
        ApiClient::verify_payment(self, reference).await
    }
}
