//! Payment confirmation poller.
//!
//! Repeatedly asks the backend whether a payment reference has been
//! confirmed and the subscription upgrade applied, without blocking the
//! caller. The loop is a spawned task with a hard attempt ceiling and a
//! shutdown channel, so it always terminates within a bounded wall-clock
//! time and never outlives the context that started it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;

use edumanage_core::{BillingApi, ClientConfig};

/// Timing budget for one confirmation poll.
#[derive(Clone, Debug)]
pub struct PollerConfig {
    /// Wait before the first check, giving the mobile-money prompt time to
    /// reach the user's handset.
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10),
            interval: Duration::from_secs(6),
            max_attempts: 15,
        }
    }
}

impl PollerConfig {
    pub fn from_client_config(config: &ClientConfig) -> Self {
        Self {
            initial_delay: Duration::from_secs(config.poll_initial_delay_secs),
            interval: Duration::from_secs(config.poll_interval_secs),
            max_attempts: config.poll_max_attempts,
        }
    }
}

/// Terminal result of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The backend reported the payment confirmed and the upgrade applied.
    Confirmed,
    /// The attempt budget ran out without a definitive answer.
    TimedOut,
}

/// Handle to a running poll. Cancelling (or dropping) stops the task at its
/// next reschedule point; no timer survives the owner.
pub struct PollerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl PollerHandle {
    /// Stop polling. Idempotent; the outcome channel is dropped unsent.
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.try_send(());
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.try_send(());
    }
}

/// Spawn a confirmation poll for `reference`. The outcome is delivered once
/// on `outcome_tx`; a cancelled poll delivers nothing.
pub fn spawn(
    api: Arc<dyn BillingApi>,
    reference: String,
    config: PollerConfig,
    outcome_tx: oneshot::Sender<PollOutcome>,
) -> PollerHandle {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    tokio::spawn(async move {
        tracing::debug!(
            reference = %reference,
            max_attempts = config.max_attempts,
            interval_secs = config.interval.as_secs(),
            "Payment confirmation poll started"
        );

        tokio::select! {
            _ = sleep(config.initial_delay) => {}
            _ = shutdown_rx.recv() => {
                tracing::debug!(reference = %reference, "Poll cancelled before first check");
                return;
            }
        }

        for attempt in 1..=config.max_attempts {
            match api.verify_payment(&reference).await {
                Ok(status) if status.is_confirmed() => {
                    tracing::info!(reference = %reference, attempt, "Payment confirmed");
                    let _ = outcome_tx.send(PollOutcome::Confirmed);
                    return;
                }
                Ok(_) => {
                    tracing::debug!(reference = %reference, attempt, "Payment not confirmed yet");
                }
                Err(e) => {
                    // A failed check spends an attempt like any other; the
                    // budget is the only thing keeping total wait bounded.
                    tracing::debug!(reference = %reference, attempt, error = %e, "Verification check failed");
                }
            }

            if attempt < config.max_attempts {
                tokio::select! {
                    _ = sleep(config.interval) => {}
                    _ = shutdown_rx.recv() => {
                        tracing::debug!(reference = %reference, "Poll cancelled");
                        return;
                    }
                }
            }
        }

        tracing::warn!(
            reference = %reference,
            attempts = config.max_attempts,
            "Confirmation poll exhausted without a definitive answer"
        );
        let _ = outcome_tx.send(PollOutcome::TimedOut);
    });

    PollerHandle { shutdown_tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedApi;
    use edumanage_core::{AppError, PaymentStatus};

    fn fast_config(max_attempts: u32) -> PollerConfig {
        PollerConfig {
            initial_delay: Duration::from_millis(1),
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn never_exceeds_the_attempt_budget() {
        let api = Arc::new(ScriptedApi::new());
        // Empty verification queue: every check reports "still pending".
        let (tx, rx) = oneshot::channel();
        let _handle = spawn(api.clone(), "ref-1".into(), fast_config(3), tx);

        assert_eq!(rx.await.unwrap(), PollOutcome::TimedOut);
        assert_eq!(api.verify_calls(), 3);
    }

    #[tokio::test]
    async fn stops_as_soon_as_confirmed() {
        let api = Arc::new(ScriptedApi::new());
        api.push_verification(PaymentStatus::default());
        api.push_verification(PaymentStatus {
            success: true,
            upgraded: true,
        });

        let (tx, rx) = oneshot::channel();
        let _handle = spawn(api.clone(), "ref-2".into(), fast_config(10), tx);

        assert_eq!(rx.await.unwrap(), PollOutcome::Confirmed);
        assert_eq!(api.verify_calls(), 2);
    }

    #[tokio::test]
    async fn success_without_upgrade_is_not_confirmation() {
        let api = Arc::new(ScriptedApi::new());
        api.push_verification(PaymentStatus {
            success: true,
            upgraded: false,
        });

        let (tx, rx) = oneshot::channel();
        let _handle = spawn(api.clone(), "ref-3".into(), fast_config(2), tx);

        assert_eq!(rx.await.unwrap(), PollOutcome::TimedOut);
        assert_eq!(api.verify_calls(), 2);
    }

    #[tokio::test]
    async fn network_errors_spend_attempts() {
        let api = Arc::new(ScriptedApi::new());
        api.push_verification_err(AppError::Http("reset by peer".into()));
        api.push_verification_err(AppError::Http("reset by peer".into()));

        let (tx, rx) = oneshot::channel();
        let _handle = spawn(api.clone(), "ref-4".into(), fast_config(2), tx);

        assert_eq!(rx.await.unwrap(), PollOutcome::TimedOut);
        assert_eq!(api.verify_calls(), 2);
    }

    #[tokio::test]
    async fn cancel_stops_before_the_first_check() {
        let api = Arc::new(ScriptedApi::new());
        let config = PollerConfig {
            initial_delay: Duration::from_millis(50),
            interval: Duration::from_millis(1),
            max_attempts: 5,
        };
        let (tx, rx) = oneshot::channel();
        let handle = spawn(api.clone(), "ref-5".into(), config, tx);

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(api.verify_calls(), 0);
        // No outcome is ever delivered for a cancelled poll.
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn dropping_the_handle_cancels() {
        let api = Arc::new(ScriptedApi::new());
        let config = PollerConfig {
            initial_delay: Duration::from_millis(50),
            interval: Duration::from_millis(1),
            max_attempts: 5,
        };
        let (tx, rx) = oneshot::channel();
        let handle = spawn(api.clone(), "ref-6".into(), config, tx);

        drop(handle);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(api.verify_calls(), 0);
        assert!(rx.await.is_err());
    }
}
