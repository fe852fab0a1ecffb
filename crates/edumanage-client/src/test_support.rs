//! Scripted backend for tests.
//!
//! Queues canned responses per endpoint so store, workflow, and poller
//! tests run without HTTP. An optional per-response delay simulates slow
//! requests for ordering tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use edumanage_core::{
    AppError, BillingApi, PaymentInitiated, PaymentRequest, PaymentStatus, TenantConfig,
};

pub(crate) struct ScriptedApi {
    configs: Mutex<VecDeque<(u64, Result<TenantConfig, AppError>)>>,
    initiations: Mutex<VecDeque<Result<PaymentInitiated, AppError>>>,
    verifications: Mutex<VecDeque<Result<PaymentStatus, AppError>>>,
    config_calls: AtomicU32,
    initiate_calls: AtomicU32,
    verify_calls: AtomicU32,
    last_initiation: Mutex<Option<PaymentRequest>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self {
            configs: Mutex::new(VecDeque::new()),
            initiations: Mutex::new(VecDeque::new()),
            verifications: Mutex::new(VecDeque::new()),
            config_calls: AtomicU32::new(0),
            initiate_calls: AtomicU32::new(0),
            verify_calls: AtomicU32::new(0),
            last_initiation: Mutex::new(None),
        }
    }

    pub(crate) fn push_config_ok(&self, delay_ms: u64, config: TenantConfig) {
        self.configs
            .lock()
            .unwrap()
            .push_back((delay_ms, Ok(config)));
    }

    pub(crate) fn push_config_err(&self, err: AppError) {
        self.configs.lock().unwrap().push_back((0, Err(err)));
    }

    pub(crate) fn push_initiation_ok(&self, reference: &str) {
        self.initiations.lock().unwrap().push_back(Ok(PaymentInitiated {
            reference: reference.to_string(),
        }));
    }

    pub(crate) fn push_initiation_err(&self, err: AppError) {
        self.initiations.lock().unwrap().push_back(Err(err));
    }

    pub(crate) fn push_verification(&self, status: PaymentStatus) {
        self.verifications.lock().unwrap().push_back(Ok(status));
    }

    pub(crate) fn push_verification_err(&self, err: AppError) {
        self.verifications.lock().unwrap().push_back(Err(err));
    }

    pub(crate) fn config_calls(&self) -> u32 {
        self.config_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn initiate_calls(&self) -> u32 {
        self.initiate_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn verify_calls(&self) -> u32 {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_initiation(&self) -> Option<PaymentRequest> {
        self.last_initiation.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillingApi for ScriptedApi {
    async fn fetch_tenant_config(&self) -> Result<TenantConfig, AppError> {
        self.config_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.configs.lock().unwrap().pop_front();
        match next {
            Some((delay_ms, result)) => {
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                result
            }
            None => Err(AppError::Http("no scripted tenant config".into())),
        }
    }

    async fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentInitiated, AppError> {
        self.initiate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_initiation.lock().unwrap() = Some(request.clone());
        let next = self.initiations.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(AppError::Internal("no scripted initiation".into())))
    }

    async fn verify_payment(&self, _reference: &str) -> Result<PaymentStatus, AppError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.verifications.lock().unwrap().pop_front();
        // An empty queue means "still pending", the common polling case.
        next.unwrap_or_else(|| Ok(PaymentStatus::default()))
    }
}
