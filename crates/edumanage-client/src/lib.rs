//! HTTP client and entitlement components for the EduManage API.
//!
//! Provides a minimal client with configurable auth (Bearer token or
//! X-API-Key), generic GET/POST/PUT helpers, and domain methods (tenant
//! config, payment initiation, payment verification). On top of it sit the
//! entitlement store, the lockout gate, the upgrade workflow, and the
//! payment confirmation poller.

pub mod api;
pub mod cache;
pub mod lockout;
pub mod poller;
pub mod store;
pub mod upgrade;

#[cfg(test)]
pub(crate) mod test_support;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use edumanage_core::AppError;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// API version prefix (e.g. "/api/v1"). Set EDUMANAGE_API_VERSION to match
/// the server.
pub fn api_prefix() -> String {
    let version = std::env::var("EDUMANAGE_API_VERSION").unwrap_or_else(|_| "v1".to_string());
    format!("/api/{}", version)
}

/// HTTP client for the EduManage API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self, AppError> {
        Self::with_timeout(base_url, auth, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: String,
        auth: Auth,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Create client from environment: EDUMANAGE_API_URL (or API_URL),
    /// EDUMANAGE_API_KEY (or API_KEY). Uses X-API-Key auth by default.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_env_with_timeout(Duration::from_secs(30))
    }

    /// Like [`from_env`](ApiClient::from_env) with an explicit request
    /// timeout.
    pub fn from_env_with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let base_url = std::env::var("EDUMANAGE_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let api_key = std::env::var("EDUMANAGE_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| {
                AppError::Unauthorized("Missing API key. Set EDUMANAGE_API_KEY or API_KEY".into())
            })?;

        Self::with_timeout(base_url, Auth::XApiKey(api_key), timeout)
    }

    /// Create client from environment using a Bearer token: EDUMANAGE_TOKEN
    /// or JWT_TOKEN.
    pub fn from_env_bearer() -> Result<Self, AppError> {
        let base_url = std::env::var("EDUMANAGE_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let token = std::env::var("EDUMANAGE_TOKEN")
            .or_else(|_| std::env::var("JWT_TOKEN"))
            .map_err(|_| {
                AppError::Unauthorized("Missing token. Set EDUMANAGE_TOKEN or JWT_TOKEN".into())
            })?;

        Self::new(base_url, Auth::Bearer(token))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = self.build_url(path);
        let mut request = self.client.get(&url);
        request = self.apply_auth(request);

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Http(e.to_string()))?;
        Self::decode(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = self.build_url(path);
        let request = self.client.post(&url).json(body);
        let request = self.apply_auth(request);

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Http(e.to_string()))?;
        Self::decode(response).await
    }

    /// PUT JSON body and deserialize response.
    pub async fn put_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = self.build_url(path);
        let request = self.client.put(&url).json(body);
        let request = self.apply_auth(request);

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Http(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(status, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse response as JSON: {}", e)))
    }

    /// Map a non-2xx response to an error, surfacing the backend-provided
    /// `message` field when the body carries one.
    async fn error_from_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> AppError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
            })
            .unwrap_or(body);

        if status == reqwest::StatusCode::UNAUTHORIZED {
            AppError::Unauthorized(message)
        } else {
            AppError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Raw client for custom requests. Caller must apply auth via build_url
    /// and headers.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

// Re-export the main components for convenience.
pub use cache::{ConfigCache, FileConfigCache, NoCache};
pub use lockout::{LockoutGate, LockoutNotice, BILLING_ROUTE};
pub use poller::{PollOutcome, PollerConfig, PollerHandle};
pub use store::{EntitlementStore, LoginBroadcast, LoginListenerHandle};
pub use upgrade::{Quote, UpgradeWorkflow};
