use serde::{Deserialize, Serialize};

use super::subscription::Plan;

/// State of an upgrade purchase, from form submit to terminal outcome.
///
/// Transitions are driven by the upgrade workflow: `Idle → Processing` on
/// submit, `Processing → Waiting` once the gateway accepts and returns a
/// reference, `Waiting → Success` when the poller reports confirmation,
/// `Processing → Error` on rejection, `Error → Idle` on user retry.
/// `Success` is terminal for the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum PaymentPhase {
    Idle,
    Processing,
    Waiting { reference: String },
    Success,
    Error { message: String },
}

impl PaymentPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentPhase::Success)
    }
}

/// Payment initiation payload: a mobile-money push for the target plan.
/// Transient, never persisted client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub phone: String,
    pub plan: Plan,
    /// Amount due in whole currency units, computed by the billing rules.
    pub amount: i64,
}

/// Response from the payment initiation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitiated {
    /// Opaque correlation reference for the confirmation poll.
    pub reference: String,
}

/// Response from the payment verification endpoint.
///
/// Fields default to false so a sparse or unexpected payload counts as
/// "not confirmed yet" rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub upgraded: bool,
}

impl PaymentStatus {
    /// Confirmed and the subscription upgrade has been applied server-side.
    pub fn is_confirmed(&self) -> bool {
        self.success && self.upgraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_success_is_terminal() {
        assert!(PaymentPhase::Success.is_terminal());
        assert!(!PaymentPhase::Idle.is_terminal());
        assert!(!PaymentPhase::Processing.is_terminal());
        assert!(!PaymentPhase::Waiting {
            reference: "r".into()
        }
        .is_terminal());
        assert!(!PaymentPhase::Error {
            message: "m".into()
        }
        .is_terminal());
    }

    #[test]
    fn sparse_status_payload_is_not_confirmed() {
        let status: PaymentStatus = serde_json::from_str("{}").unwrap();
        assert!(!status.is_confirmed());

        let status: PaymentStatus = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(!status.is_confirmed());

        let status: PaymentStatus =
            serde_json::from_str(r#"{"success":true,"upgraded":true}"#).unwrap();
        assert!(status.is_confirmed());
    }
}
