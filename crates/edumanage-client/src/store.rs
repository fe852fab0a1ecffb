//! Entitlement store: the single source of truth for tenant configuration
//! and subscription state.
//!
//! Reads are synchronous snapshots of in-memory state; fetches replace that
//! state wholesale and never propagate errors to callers. A transient
//! failure (network drop, 401 during token refresh) keeps the last-known
//! state visible instead of flashing an unconfigured UI.
//!
//! Overlapping fetches are ordered by ticket: a response is discarded when a
//! newer fetch was issued after it started, and when a local optimistic
//! edit landed mid-flight. Last writer wins, deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tokio::sync::{mpsc, watch};

use edumanage_core::{BillingApi, Feature, TenantConfig, TenantConfigPatch};

use crate::cache::ConfigCache;

struct StoreState {
    config: TenantConfig,
    /// Bumped by every local optimistic edit.
    edit_seq: u64,
}

struct StoreInner {
    api: Arc<dyn BillingApi>,
    cache: Arc<dyn ConfigCache>,
    state: RwLock<StoreState>,
    /// Ticket counter ordering concurrent fetches.
    fetch_ticket: AtomicU64,
}

/// Shared entitlement store. Cheap to clone; all clones see the same state.
#[derive(Clone)]
pub struct EntitlementStore {
    inner: Arc<StoreInner>,
}

impl EntitlementStore {
    /// Seed state from the persistent cache when present, otherwise from the
    /// built-in fallback. No network I/O happens here; call [`load`] next.
    ///
    /// [`load`]: EntitlementStore::load
    pub fn new(api: Arc<dyn BillingApi>, cache: Arc<dyn ConfigCache>) -> Self {
        let config = cache.load().unwrap_or_else(TenantConfig::fallback);
        Self {
            inner: Arc::new(StoreInner {
                api,
                cache,
                state: RwLock::new(StoreState {
                    config,
                    edit_seq: 0,
                }),
                fetch_ticket: AtomicU64::new(0),
            }),
        }
    }

    /// Fetch the tenant config from the backend.
    ///
    /// On success the in-memory state is replaced and the cache rewritten.
    /// On failure the last-known state is kept and the error is logged,
    /// never returned: components only ever see a consistent (possibly
    /// stale) config.
    pub async fn load(&self) {
        let ticket = self.inner.fetch_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let edits_at_start = self.read_state(|s| s.edit_seq);

        match self.inner.api.fetch_tenant_config().await {
            Ok(config) => {
                {
                    let mut state = self.inner.state.write().expect("store lock poisoned");
                    if self.inner.fetch_ticket.load(Ordering::SeqCst) > ticket {
                        tracing::debug!(ticket, "Discarding stale tenant config response");
                        return;
                    }
                    if state.edit_seq != edits_at_start {
                        tracing::debug!(
                            ticket,
                            "Discarding tenant config response older than a local edit"
                        );
                        return;
                    }
                    state.config = config.clone();
                }
                if let Err(e) = self.inner.cache.store(&config) {
                    tracing::warn!(error = %e, "Failed to write tenant config cache");
                }
                tracing::debug!(school = %config.school_name, "Tenant config loaded");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Tenant config fetch failed, keeping last-known state");
            }
        }
    }

    /// Re-fetch on demand (e.g. after a login event). Same contract as
    /// [`load`](EntitlementStore::load).
    pub async fn refresh(&self) {
        self.load().await;
    }

    /// Optimistic local merge for fields the client already knows (a
    /// freshly uploaded logo URL). Rewrites the cache; does not call the
    /// backend. The caller persists server-side separately.
    pub fn update(&self, patch: TenantConfigPatch) {
        let snapshot = {
            let mut state = self.inner.state.write().expect("store lock poisoned");
            state.config.apply(patch);
            state.edit_seq += 1;
            state.config.clone()
        };
        if let Err(e) = self.inner.cache.store(&snapshot) {
            tracing::warn!(error = %e, "Failed to write tenant config cache");
        }
    }

    /// Snapshot of the current tenant config.
    pub fn config(&self) -> TenantConfig {
        self.read_state(|s| s.config.clone())
    }

    /// Whether the named capability is enabled for the current plan.
    /// `false` when the tenant has no subscription at all.
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.read_state(|s| {
            s.config
                .subscription
                .as_ref()
                .map(|sub| edumanage_core::is_enabled(feature, sub.plan))
                .unwrap_or(false)
        })
    }

    /// Name-based feature check; unknown names are disabled.
    pub fn has_feature_named(&self, name: &str) -> bool {
        self.read_state(|s| {
            s.config
                .subscription
                .as_ref()
                .map(|sub| edumanage_core::is_enabled_by_name(name, sub.plan))
                .unwrap_or(false)
        })
    }

    /// Time-sensitive lock predicate, recomputed against the wall clock on
    /// every call.
    pub fn is_locked(&self) -> bool {
        self.read_state(|s| s.config.is_locked_at(Utc::now()))
    }

    /// Whole days of trial remaining; 0 when absent or expired.
    pub fn trial_days_remaining(&self) -> i64 {
        self.read_state(|s| s.config.trial_days_remaining_at(Utc::now()))
    }

    /// Spawn a listener that refreshes the store on every login broadcast.
    /// The task stops when the handle is shut down or the broadcast sender
    /// is dropped.
    pub fn subscribe_login(&self, mut login_rx: watch::Receiver<u64>) -> LoginListenerHandle {
        let store = self.clone();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = login_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        tracing::debug!("Login broadcast received, refreshing tenant config");
                        store.refresh().await;
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
            tracing::debug!("Login listener stopped");
        });

        LoginListenerHandle { shutdown_tx }
    }

    fn read_state<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let state = self.inner.state.read().expect("store lock poisoned");
        f(&state)
    }
}

/// Handle for the login-broadcast listener task.
pub struct LoginListenerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl LoginListenerHandle {
    /// Stop the listener. Idempotent.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Client-side login signal raised after authentication completes.
///
/// Other parts of the application call [`notify`](LoginBroadcast::notify);
/// the entitlement store subscribes via
/// [`subscribe_login`](EntitlementStore::subscribe_login).
#[derive(Clone)]
pub struct LoginBroadcast {
    sender: Arc<watch::Sender<u64>>,
    receiver: watch::Receiver<u64>,
}

impl LoginBroadcast {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(0u64);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// Signal that a login completed.
    pub fn notify(&self) {
        let current = *self.sender.borrow();
        let _ = self.sender.send(current.wrapping_add(1));
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.receiver.clone()
    }
}

impl Default for LoginBroadcast {
    fn default() -> Self {
        Self::new()
    }
}
