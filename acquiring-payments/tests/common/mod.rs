//! In-memory collaborators for payment engine tests.

#![allow(dead_code)]

use acquiring_core::models::{
    Base64CardDataEncoder, ChargePayload, Check3DSVersionPayload, Confirmation3DS2AppBasedData,
    Confirmation3DSData, Confirmation3DSDataACS, FinishAuthorizePayload, FinishAuthorizeStatus,
    GetPaymentStatePayload, InitPayload, PaymentId, PaymentInitData, PaymentStatus,
};
use acquiring_core::requests::{
    ChargeData, Check3DSVersionData, CresData, FinishAuthorizeData, Submit3DSAuthorizationData,
};
use acquiring_core::{
    APIFailureError, AcquiringError, AcquiringPaymentsService, AcquiringResult,
    AcquiringThreeDsService,
};
use acquiring_http::BackoffStrategy;
use acquiring_payments::threeds::{
    AuthenticationRequestParameters, ChallengeParameters, ChallengeSdk, ChallengeStatusReceiver,
    ChallengeTransaction, ThreeDsMethodData, ThreeDsMethodResult, ThreeDsWebFlowHost,
    WebChallenge, WebChallengeResult,
};
use acquiring_payments::{
    ChallengeError, PaymentConfig, PaymentControllerDelegate, PaymentDependencies,
    PaymentDependenciesBuilder, PaymentError, PaymentProcessDelegate, PollingConfig, ProcessInfo,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

// =============================================================================
// Payloads
// =============================================================================

pub fn state(payment_id: &str, status: PaymentStatus) -> GetPaymentStatePayload {
    GetPaymentStatePayload {
        payment_id: PaymentId::new(payment_id),
        amount: 320,
        order_id: "12345".into(),
        status,
    }
}

pub fn done(payment_id: &str, status: PaymentStatus) -> FinishAuthorizePayload {
    FinishAuthorizePayload {
        status: FinishAuthorizeStatus::Done(state(payment_id, status)),
        payment_status: status,
        rebill_id: None,
        card_id: None,
    }
}

fn checking(status: FinishAuthorizeStatus) -> FinishAuthorizePayload {
    FinishAuthorizePayload {
        status,
        payment_status: PaymentStatus::ThreeDsChecking,
        rebill_id: None,
        card_id: None,
    }
}

pub fn needs_3ds_v1() -> FinishAuthorizePayload {
    checking(FinishAuthorizeStatus::NeedConfirmation3DS(Confirmation3DSData {
        acs_url: "https://acs.example/v1".into(),
        pa_req: "pareq".into(),
        md: "md-1".into(),
    }))
}

pub fn needs_3ds_browser() -> FinishAuthorizePayload {
    checking(FinishAuthorizeStatus::NeedConfirmation3DSACS(
        Confirmation3DSDataACS {
            acs_url: "https://acs.example/v2".into(),
            acs_trans_id: "acs-1".into(),
            tds_server_trans_id: "tds-1".into(),
        },
    ))
}

pub fn needs_3ds_app() -> FinishAuthorizePayload {
    checking(FinishAuthorizeStatus::NeedConfirmation3DS2AppBased(
        Confirmation3DS2AppBasedData {
            acs_signed_content: "signed".into(),
            acs_trans_id: "acs-1".into(),
            tds_server_trans_id: "tds-1".into(),
            acs_ref_number: "ref-1".into(),
        },
    ))
}

pub fn still_checking() -> FinishAuthorizePayload {
    checking(FinishAuthorizeStatus::Unknown)
}

pub fn version(version: Option<&str>, payment_system: &str) -> Check3DSVersionPayload {
    Check3DSVersionPayload {
        version: version.map(str::to_string),
        tds_server_trans_id: Some("tds-1".into()),
        three_ds_method_url: None,
        payment_system: Some(payment_system.into()),
    }
}

pub fn api_failure(code: i64) -> AcquiringError {
    AcquiringError::Api(APIFailureError {
        error_code: code,
        error_message: Some("Additional data required".into()),
        error_details: None,
        terminal_key: None,
        status: None,
        order_id: None,
        payment_id: None,
        amount: None,
    })
}

// =============================================================================
// Services
// =============================================================================

/// Scripted payment service. Empty queues fall back to a successful answer.
#[derive(Default)]
pub struct MockPayments {
    pub inits: Mutex<VecDeque<AcquiringResult<InitPayload>>>,
    pub finishes: Mutex<VecDeque<AcquiringResult<FinishAuthorizePayload>>>,
    pub charges: Mutex<VecDeque<AcquiringResult<ChargePayload>>>,
    pub states: Mutex<VecDeque<PaymentStatus>>,
    /// Number of upcoming `Init` calls that never answer.
    pub hanging_inits: Mutex<u32>,
    /// Runs after `FinishAuthorize` produced its answer.
    pub after_finish: Mutex<Option<Box<dyn Fn() + Send + Sync>>>,

    pub init_calls: Mutex<Vec<PaymentInitData>>,
    pub finish_calls: Mutex<Vec<FinishAuthorizeData>>,
    pub charge_calls: Mutex<Vec<ChargeData>>,
    pub state_calls: AtomicUsize,
}

impl MockPayments {
    pub fn state_calls(&self) -> usize {
        self.state_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AcquiringPaymentsService for MockPayments {
    async fn init_payment(&self, data: PaymentInitData) -> AcquiringResult<InitPayload> {
        let call = {
            let mut calls = self.init_calls.lock();
            calls.push(data.clone());
            calls.len()
        };

        let hang = {
            let mut hanging = self.hanging_inits.lock();
            let hang = *hanging > 0;
            *hanging = hanging.saturating_sub(1);
            hang
        };
        if hang {
            std::future::pending::<()>().await;
        }

        let scripted = self.inits.lock().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(InitPayload {
                amount: data.amount,
                order_id: data.order_id.clone(),
                payment_id: PaymentId::new((1000 + call).to_string()),
                status: PaymentStatus::New,
            })
        })
    }

    async fn finish_authorize(
        &self,
        data: FinishAuthorizeData,
    ) -> AcquiringResult<FinishAuthorizePayload> {
        let payment_id = data.payment_id.to_string();
        self.finish_calls.lock().push(data);
        let scripted = self.finishes.lock().pop_front();
        let result = scripted.unwrap_or_else(|| Ok(done(&payment_id, PaymentStatus::Authorized)));
        if let Some(hook) = self.after_finish.lock().as_ref() {
            hook();
        }
        result
    }

    async fn charge(&self, data: ChargeData) -> AcquiringResult<ChargePayload> {
        let payment_id = data.payment_id.to_string();
        self.charge_calls.lock().push(data);
        let scripted = self.charges.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(done(&payment_id, PaymentStatus::Authorized)))
    }

    async fn get_payment_state(
        &self,
        payment_id: PaymentId,
    ) -> AcquiringResult<GetPaymentStatePayload> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        let status = self
            .states
            .lock()
            .pop_front()
            .unwrap_or(PaymentStatus::Authorized);
        Ok(state(payment_id.as_str(), status))
    }
}

/// Scripted 3DS service. Unscripted cards are not enrolled.
#[derive(Default)]
pub struct MockThreeDs {
    pub versions: Mutex<VecDeque<Check3DSVersionPayload>>,
    pub check_calls: Mutex<Vec<Check3DSVersionData>>,
    pub submit_v1_calls: Mutex<Vec<Submit3DSAuthorizationData>>,
    pub submit_v2_calls: Mutex<Vec<CresData>>,
}

#[async_trait]
impl AcquiringThreeDsService for MockThreeDs {
    async fn check_3ds_version(
        &self,
        data: Check3DSVersionData,
    ) -> AcquiringResult<Check3DSVersionPayload> {
        self.check_calls.lock().push(data);
        let scripted = self.versions.lock().pop_front();
        Ok(scripted.unwrap_or_else(|| Check3DSVersionPayload {
            version: None,
            tds_server_trans_id: None,
            three_ds_method_url: None,
            payment_system: None,
        }))
    }

    async fn submit_3ds_authorization(
        &self,
        data: Submit3DSAuthorizationData,
    ) -> AcquiringResult<GetPaymentStatePayload> {
        let payment_id = data.payment_id.to_string();
        self.submit_v1_calls.lock().push(data);
        Ok(state(&payment_id, PaymentStatus::ThreeDsChecked))
    }

    async fn submit_3ds_authorization_v2(
        &self,
        data: CresData,
    ) -> AcquiringResult<GetPaymentStatePayload> {
        self.submit_v2_calls.lock().push(data);
        Ok(state("0", PaymentStatus::ThreeDsChecked))
    }

    fn confirmation_3ds_termination_url(&self) -> String {
        "https://bank.example/v2/Submit3DSAuthorization".into()
    }

    fn confirmation_3ds_termination_v2_url(&self) -> String {
        "https://bank.example/v2/Submit3DSAuthorizationV2".into()
    }

    fn complete_3ds_method_url(&self) -> String {
        "https://bank.example/v2/Complete3DSMethodv2".into()
    }
}

// =============================================================================
// 3DS collaborators
// =============================================================================

pub struct MockWebHost {
    pub method_result: ThreeDsMethodResult,
    pub challenge_result: Mutex<WebChallengeResult>,
    pub methods: Mutex<Vec<ThreeDsMethodData>>,
    pub challenges: Mutex<Vec<WebChallenge>>,
}

impl Default for MockWebHost {
    fn default() -> Self {
        Self {
            method_result: ThreeDsMethodResult::Completed,
            challenge_result: Mutex::new(WebChallengeResult::V1Completed {
                pa_res: "pares".into(),
                md: "md-1".into(),
            }),
            methods: Mutex::new(Vec::new()),
            challenges: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ThreeDsWebFlowHost for MockWebHost {
    async fn complete_3ds_method(&self, data: ThreeDsMethodData) -> ThreeDsMethodResult {
        self.methods.lock().push(data);
        self.method_result
    }

    async fn present_challenge(&self, challenge: WebChallenge) -> WebChallengeResult {
        self.challenges.lock().push(challenge);
        self.challenge_result.lock().clone()
    }
}

/// What the fake challenge UI does with the receiver.
#[derive(Debug, Clone)]
pub enum ChallengeBehavior {
    Complete(String),
    Cancel,
    /// Keep the receiver and never report.
    Silent,
}

pub struct MockChallengeSdk {
    pub behavior: ChallengeBehavior,
    pub created: AtomicUsize,
    pub closed: Arc<AtomicUsize>,
    pub challenges: Arc<Mutex<Vec<ChallengeParameters>>>,
    held_receivers: Arc<Mutex<Vec<ChallengeStatusReceiver>>>,
}

impl MockChallengeSdk {
    pub fn new(behavior: ChallengeBehavior) -> Self {
        Self {
            behavior,
            created: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
            challenges: Arc::new(Mutex::new(Vec::new())),
            held_receivers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

struct MockTransaction {
    behavior: ChallengeBehavior,
    closed: Arc<AtomicUsize>,
    challenges: Arc<Mutex<Vec<ChallengeParameters>>>,
    held_receivers: Arc<Mutex<Vec<ChallengeStatusReceiver>>>,
}

impl ChallengeTransaction for MockTransaction {
    fn authentication_request_parameters(
        &self,
    ) -> Result<AuthenticationRequestParameters, ChallengeError> {
        Ok(AuthenticationRequestParameters {
            sdk_transaction_id: "sdk-trans-1".into(),
            device_data: "encrypted-device-data".into(),
            sdk_ephemeral_public_key: "{\"kty\":\"EC\"}".into(),
            sdk_app_id: "app-1".into(),
            sdk_reference_number: "ref-sdk".into(),
            message_version: "2.1.0".into(),
        })
    }

    fn do_challenge(
        &self,
        parameters: ChallengeParameters,
        receiver: ChallengeStatusReceiver,
        _timeout: Duration,
    ) -> Result<(), ChallengeError> {
        self.challenges.lock().push(parameters);
        match &self.behavior {
            ChallengeBehavior::Complete(trans_status) => receiver.completed(trans_status.clone()),
            ChallengeBehavior::Cancel => receiver.cancelled(),
            ChallengeBehavior::Silent => self.held_receivers.lock().push(receiver),
        }
        Ok(())
    }

    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChallengeSdk for MockChallengeSdk {
    fn supports(&self, _payment_system: &str) -> bool {
        true
    }

    async fn create_transaction(
        &self,
        _directory_server_id: &str,
        _message_version: &str,
    ) -> Result<Box<dyn ChallengeTransaction>, ChallengeError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockTransaction {
            behavior: self.behavior.clone(),
            closed: self.closed.clone(),
            challenges: self.challenges.clone(),
            held_receivers: self.held_receivers.clone(),
        }))
    }
}

// =============================================================================
// Delegates
// =============================================================================

#[derive(Debug)]
pub enum Outcome {
    Finished {
        state: GetPaymentStatePayload,
        card_id: Option<String>,
        rebill_id: Option<String>,
    },
    Cancelled {
        card_id: Option<String>,
        rebill_id: Option<String>,
    },
    Failed {
        error: PaymentError,
        card_id: Option<String>,
        rebill_id: Option<String>,
    },
}

/// Forwards every callback, with the id of the reporting process.
pub struct RecordingDelegate {
    sender: mpsc::UnboundedSender<(Uuid, Outcome)>,
}

impl RecordingDelegate {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<(Uuid, Outcome)>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender }), receiver)
    }

    fn record(&self, info: &ProcessInfo, outcome: Outcome) {
        let _ = self.sender.send((info.id, outcome));
    }
}

impl PaymentProcessDelegate for RecordingDelegate {
    fn payment_did_finish(
        &self,
        process: &ProcessInfo,
        state: GetPaymentStatePayload,
        card_id: Option<String>,
        rebill_id: Option<String>,
    ) {
        self.record(process, Outcome::Finished { state, card_id, rebill_id });
    }

    fn payment_did_cancel(
        &self,
        process: &ProcessInfo,
        card_id: Option<String>,
        rebill_id: Option<String>,
    ) {
        self.record(process, Outcome::Cancelled { card_id, rebill_id });
    }

    fn payment_did_fail(
        &self,
        process: &ProcessInfo,
        error: PaymentError,
        card_id: Option<String>,
        rebill_id: Option<String>,
    ) {
        self.record(process, Outcome::Failed { error, card_id, rebill_id });
    }
}

impl PaymentControllerDelegate for RecordingDelegate {
    fn did_finish_payment(
        &self,
        payment: &ProcessInfo,
        state: GetPaymentStatePayload,
        card_id: Option<String>,
        rebill_id: Option<String>,
    ) {
        self.payment_did_finish(payment, state, card_id, rebill_id);
    }

    fn payment_was_cancelled(
        &self,
        payment: &ProcessInfo,
        card_id: Option<String>,
        rebill_id: Option<String>,
    ) {
        self.payment_did_cancel(payment, card_id, rebill_id);
    }

    fn did_fail(
        &self,
        payment: &ProcessInfo,
        error: PaymentError,
        card_id: Option<String>,
        rebill_id: Option<String>,
    ) {
        self.payment_did_fail(payment, error, card_id, rebill_id);
    }
}

/// Nothing else arrives within `window`.
pub async fn assert_quiet(receiver: &mut mpsc::UnboundedReceiver<(Uuid, Outcome)>, window: Duration) {
    tokio::time::sleep(window).await;
    if let Ok((id, outcome)) = receiver.try_recv() {
        panic!("unexpected outcome from {}: {:?}", id, outcome);
    }
}

// =============================================================================
// Wiring
// =============================================================================

pub struct Harness {
    pub payments: Arc<MockPayments>,
    pub three_ds: Arc<MockThreeDs>,
    pub web_host: Arc<MockWebHost>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            payments: Arc::new(MockPayments::default()),
            three_ds: Arc::new(MockThreeDs::default()),
            web_host: Arc::new(MockWebHost::default()),
        }
    }

    pub fn config() -> PaymentConfig {
        PaymentConfig {
            polling: PollingConfig {
                max_attempts: 5,
                backoff: BackoffStrategy::Constant(Duration::from_secs(1)),
            },
            ..PaymentConfig::default()
        }
    }

    pub fn builder(&self) -> PaymentDependenciesBuilder {
        PaymentDependencies::builder(
            self.payments.clone(),
            self.three_ds.clone(),
            Arc::new(Base64CardDataEncoder),
        )
        .web_flow_host(self.web_host.clone())
        .config(Self::config())
    }

    pub fn deps(&self) -> PaymentDependencies {
        self.builder().build()
    }
}
