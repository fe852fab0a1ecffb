//! Error types module
//!
//! This module provides the error types used throughout the EduManage
//! client. All errors are unified under the `AppError` enum, which covers
//! transport, API, payment, and local cache failures.
//!
//! Propagation policy: entitlement fetch failures are absorbed inside the
//! entitlement store (logged, state kept); payment-flow errors are the one
//! category surfaced to the end user, since they require a decision.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payment rejected: {0}")]
    PaymentRejected(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether retrying the same request can reasonably succeed.
    /// Transport failures and server-side errors are retryable; validation
    /// and rejection are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Http(_) => true,
            AppError::Api { status, .. } => *status >= 500,
            AppError::Unauthorized(_) => false,
            AppError::InvalidInput(_) => false,
            AppError::PaymentRejected(_) => false,
            AppError::Cache(_) => true,
            AppError::Internal(_) => true,
        }
    }

    /// Message fit for the end user. Backend-provided payment messages are
    /// surfaced verbatim; transport details are not.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Http(_) => "Network error. Check your connection and try again.".to_string(),
            AppError::Api { message, .. } if !message.is_empty() => message.clone(),
            AppError::Api { .. } => "Request failed. Please try again.".to_string(),
            AppError::Unauthorized(_) => "Session expired. Please sign in again.".to_string(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::PaymentRejected(msg) if !msg.is_empty() => msg.clone(),
            AppError::PaymentRejected(_) => {
                "Payment could not be processed. Please try again.".to_string()
            }
            AppError::Cache(_) | AppError::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Cache(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON parsing error: {}", err))
    }
}
