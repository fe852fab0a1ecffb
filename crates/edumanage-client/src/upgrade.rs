//! Upgrade/renewal workflow.
//!
//! Drives one plan purchase from form submit to a terminal outcome:
//! `Idle → Processing → Waiting → Success`, with `Error` reachable from
//! `Processing` and recoverable back to `Idle` via [`retry`]. Phase changes
//! are published on a watch channel so any number of observers (UI, CLI)
//! can follow along.
//!
//! On `Success` the workflow asks the entitlement store to refresh so the
//! new entitlements become visible without a restart.
//!
//! [`retry`]: UpgradeWorkflow::retry

use std::sync::{Arc, Mutex};

use tokio::sync::{oneshot, watch};

use edumanage_core::{
    billing, AppError, BillingApi, ClientConfig, PaymentPhase, PaymentRequest, Plan,
};

use crate::poller::{self, PollOutcome, PollerConfig, PollerHandle};
use crate::store::EntitlementStore;

/// Amount due for a target plan, plus whether the pro-rated-upgrade rule
/// produced it (drives the pro-ration banner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub amount: i64,
    pub prorated: bool,
}

struct WorkflowInner {
    api: Arc<dyn BillingApi>,
    store: EntitlementStore,
    poll_config: PollerConfig,
    assume_success_on_timeout: bool,
    phase: watch::Sender<PaymentPhase>,
    poller: Mutex<Option<PollerHandle>>,
}

/// One purchase session. Cheap to clone; all clones share phase and poller.
///
/// Call [`cancel`](UpgradeWorkflow::cancel) when the owning view goes away
/// so a poll in flight stops rescheduling.
#[derive(Clone)]
pub struct UpgradeWorkflow {
    inner: Arc<WorkflowInner>,
}

impl UpgradeWorkflow {
    pub fn new(api: Arc<dyn BillingApi>, store: EntitlementStore, config: &ClientConfig) -> Self {
        Self::with_timing(
            api,
            store,
            PollerConfig::from_client_config(config),
            config.assume_success_on_timeout,
        )
    }

    pub fn with_timing(
        api: Arc<dyn BillingApi>,
        store: EntitlementStore,
        poll_config: PollerConfig,
        assume_success_on_timeout: bool,
    ) -> Self {
        let (phase, _) = watch::channel(PaymentPhase::Idle);
        Self {
            inner: Arc::new(WorkflowInner {
                api,
                store,
                poll_config,
                assume_success_on_timeout,
                phase,
                poller: Mutex::new(None),
            }),
        }
    }

    /// Current phase snapshot.
    pub fn phase(&self) -> PaymentPhase {
        self.inner.phase.borrow().clone()
    }

    /// Observe phase changes.
    pub fn subscribe(&self) -> watch::Receiver<PaymentPhase> {
        self.inner.phase.subscribe()
    }

    /// Amount due for `target` under the current subscription, and whether
    /// the pro-ration banner applies.
    pub fn quote(&self, target: Plan) -> Quote {
        let config = self.inner.store.config();
        let sub = config.subscription.as_ref();
        Quote {
            amount: billing::due_amount(sub, target),
            prorated: billing::prorated(sub, target),
        }
    }

    /// Submit the purchase form.
    ///
    /// Returns `Err` only for caller mistakes (blank phone, submit while a
    /// purchase is already running); backend rejections become the `Error`
    /// phase with the backend message attached, matching how the flow is
    /// presented to the user.
    pub async fn submit(&self, target: Plan, phone: &str) -> Result<(), AppError> {
        // Presence check only; number format is the backend's call.
        if phone.trim().is_empty() {
            return Err(AppError::InvalidInput("Phone number is required".into()));
        }
        if !matches!(self.phase(), PaymentPhase::Idle) {
            return Err(AppError::InvalidInput(
                "A purchase is already in progress".into(),
            ));
        }

        self.set_phase(PaymentPhase::Processing);

        let quote = self.quote(target);
        let request = PaymentRequest {
            phone: phone.trim().to_string(),
            plan: target,
            amount: quote.amount,
        };

        match self.inner.api.initiate_payment(&request).await {
            Ok(initiated) => {
                tracing::info!(
                    reference = %initiated.reference,
                    plan = %target,
                    amount = quote.amount,
                    "Payment initiated"
                );
                self.set_phase(PaymentPhase::Waiting {
                    reference: initiated.reference.clone(),
                });
                self.start_poll(initiated.reference);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, plan = %target, "Payment initiation rejected");
                self.set_phase(PaymentPhase::Error {
                    message: e.client_message(),
                });
                Ok(())
            }
        }
    }

    /// User-initiated retry after a rejection: `Error → Idle`. Returns
    /// whether a transition happened.
    pub fn retry(&self) -> bool {
        let is_error = matches!(self.phase(), PaymentPhase::Error { .. });
        if is_error {
            self.set_phase(PaymentPhase::Idle);
        }
        is_error
    }

    /// Stop any confirmation poll in flight. Call when the owning view is
    /// torn down; the phase is left untouched.
    pub fn cancel(&self) {
        if let Some(handle) = self.inner.poller.lock().expect("poller lock poisoned").take() {
            handle.cancel();
        }
    }

    fn start_poll(&self, reference: String) {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let handle = poller::spawn(
            self.inner.api.clone(),
            reference.clone(),
            self.inner.poll_config.clone(),
            outcome_tx,
        );
        *self.inner.poller.lock().expect("poller lock poisoned") = Some(handle);

        let workflow = self.clone();
        tokio::spawn(async move {
            match outcome_rx.await {
                Ok(PollOutcome::Confirmed) => workflow.finish_success().await,
                Ok(PollOutcome::TimedOut) => {
                    if workflow.inner.assume_success_on_timeout {
                        // Deliberate product behavior: an indeterminate
                        // outcome unblocks the admin instead of stranding
                        // them on a flaky webhook. Audited via this log.
                        tracing::warn!(
                            reference = %reference,
                            "No definitive confirmation within the attempt budget, assuming success"
                        );
                        workflow.finish_success().await;
                    } else {
                        workflow.set_phase(PaymentPhase::Error {
                            message: "Payment confirmation timed out. If you were charged, \
                                      recheck your subscription in a moment."
                                .into(),
                        });
                    }
                }
                // Poll was cancelled; nothing to finalize.
                Err(_) => {}
            }
        });
    }

    async fn finish_success(&self) {
        self.set_phase(PaymentPhase::Success);
        self.inner.store.refresh().await;
    }

    fn set_phase(&self, phase: PaymentPhase) {
        tracing::debug!(phase = ?phase, "Upgrade workflow phase change");
        self.inner.phase.send_replace(phase);
    }
}
