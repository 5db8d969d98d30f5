//! Recurring charges and the repeat `Init` recovery.

mod common;

use acquiring_core::models::{
    CustomerOptions, InitPayload, OrderOptions, PaymentFlow, PaymentId, PaymentOptions,
    PaymentSourceData, PaymentStatus,
};
use acquiring_payments::charge_process::{FAIL_MAPI_SESSION_ID, RECURRING_TYPE};
use acquiring_payments::{
    ChargeRecoveryDelegate, PaymentDependencies, PaymentError, PaymentFactory, PaymentProcess,
    PaymentProcessDelegate, ProcessState, RepeatInitData, RepeatInitRequest,
};
use async_trait::async_trait;
use common::*;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use acquiring_payments::threeds::WebChallenge;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

fn parent() -> PaymentSourceData {
    PaymentSourceData::ParentPayment {
        rebill_id: "rebill-1".into(),
    }
}

fn full_flow() -> PaymentFlow {
    PaymentFlow::Full(PaymentOptions::new(
        OrderOptions::new("12345", 320).additional_data("channel", "app"),
        CustomerOptions::new("customer-1"),
    ))
}

/// Answers with a saved card and CVC, or gives up.
struct Recovery {
    reply: Option<RepeatInitData>,
    requests: Mutex<Vec<RepeatInitRequest>>,
}

impl Recovery {
    fn with_cvc() -> Arc<Self> {
        let mut additional_data = BTreeMap::new();
        additional_data.insert("cvcChecked".to_string(), "Y".to_string());
        Arc::new(Self {
            reply: Some(RepeatInitData {
                source: PaymentSourceData::SavedCard {
                    card_id: "42".into(),
                    cvv: Some("111".into()),
                },
                additional_data,
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn giving_up() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChargeRecoveryDelegate for Recovery {
    async fn additional_data_needed(&self, request: RepeatInitRequest) -> Option<RepeatInitData> {
        self.requests.lock().push(request);
        self.reply.clone()
    }
}

fn launch(
    deps: PaymentDependencies,
    flow: PaymentFlow,
) -> (
    Arc<dyn PaymentProcess>,
    Arc<RecordingDelegate>,
    mpsc::UnboundedReceiver<(Uuid, Outcome)>,
) {
    let (delegate, outcomes) = RecordingDelegate::new();
    let process_delegate: Arc<dyn PaymentProcessDelegate> = delegate.clone();
    let process = PaymentFactory::new(deps)
        .create_payment(parent(), flow, Arc::downgrade(&process_delegate))
        .expect("charge strategy");
    process.clone().start();
    (process, delegate, outcomes)
}

#[tokio::test]
async fn test_charge_succeeds_with_rebill_id() {
    let harness = Harness::new();
    let (process, _delegate, mut outcomes) = launch(harness.deps(), full_flow());

    match outcomes.recv().await.unwrap().1 {
        Outcome::Finished {
            state, rebill_id, ..
        } => {
            assert_eq!(state.status, PaymentStatus::Authorized);
            assert_eq!(rebill_id.as_deref(), Some("rebill-1"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(process.state(), ProcessState::Succeeded);

    let charge = harness.payments.charge_calls.lock()[0].clone();
    assert_eq!(charge.payment_id, PaymentId::new("1001"));
    assert_eq!(charge.rebill_id, "rebill-1");
    assert!(harness.three_ds.check_calls.lock().is_empty());
    assert!(harness.payments.finish_calls.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_charge_in_3ds_checking_polls() {
    let harness = Harness::new();
    harness.payments.charges.lock().push_back(Ok(still_checking()));
    harness
        .payments
        .states
        .lock()
        .extend([PaymentStatus::ThreeDsChecking, PaymentStatus::Confirmed]);

    let (_process, _delegate, mut outcomes) = launch(harness.deps(), full_flow());

    match outcomes.recv().await.unwrap().1 {
        Outcome::Finished { state, .. } => assert_eq!(state.status, PaymentStatus::Confirmed),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(harness.payments.state_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_charge_v1_challenge_is_presented_and_submitted() {
    let harness = Harness::new();
    harness.payments.charges.lock().push_back(Ok(needs_3ds_v1()));
    harness
        .payments
        .states
        .lock()
        .push_back(PaymentStatus::Confirmed);

    let (process, _delegate, mut outcomes) = launch(harness.deps(), full_flow());

    match outcomes.recv().await.unwrap().1 {
        Outcome::Finished { state, .. } => assert_eq!(state.status, PaymentStatus::Confirmed),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(process.state(), ProcessState::Succeeded);

    let challenges = harness.web_host.challenges.lock();
    assert_eq!(challenges.len(), 1);
    assert!(matches!(&challenges[0], WebChallenge::V1 { md, .. } if md == "md-1"));

    let submitted = harness.three_ds.submit_v1_calls.lock();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].payment_id, PaymentId::new("1001"));
    assert_eq!(submitted[0].pa_res, "pares");
    assert_eq!(harness.payments.state_calls(), 1);
    assert!(harness.three_ds.check_calls.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_charge_app_challenge_opens_its_own_transaction() {
    let harness = Harness::new();
    harness.payments.charges.lock().push_back(Ok(needs_3ds_app()));
    let sdk = Arc::new(MockChallengeSdk::new(ChallengeBehavior::Complete("Y".into())));
    let deps = harness.builder().challenge_sdk(sdk.clone()).build();

    let (_process, _delegate, mut outcomes) = launch(deps, full_flow());

    match outcomes.recv().await.unwrap().1 {
        Outcome::Finished { state, .. } => assert_eq!(state.status, PaymentStatus::Authorized),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(sdk.created.load(Ordering::SeqCst), 1);
    assert_eq!(sdk.closed(), 1);
    assert_eq!(sdk.challenges.lock()[0].acs_transaction_id, "acs-1");
    assert_eq!(harness.three_ds.submit_v2_calls.lock().len(), 1);
    assert!(harness.web_host.challenges.lock().is_empty());
    assert_eq!(harness.payments.state_calls(), 1);
}

#[tokio::test]
async fn test_charge_app_challenge_without_sdk_fails() {
    let harness = Harness::new();
    harness.payments.charges.lock().push_back(Ok(needs_3ds_app()));

    let (process, _delegate, mut outcomes) = launch(harness.deps(), full_flow());

    assert!(matches!(
        outcomes.recv().await.unwrap().1,
        Outcome::Failed {
            error: PaymentError::Configuration(_),
            ..
        }
    ));
    assert_eq!(process.state(), ProcessState::Failed);
    assert!(harness.three_ds.submit_v2_calls.lock().is_empty());
    assert_eq!(harness.payments.state_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_polling_gives_up_after_max_attempts() {
    let harness = Harness::new();
    harness.payments.charges.lock().push_back(Ok(still_checking()));
    harness
        .payments
        .states
        .lock()
        .extend(std::iter::repeat_n(PaymentStatus::Authorizing, 10));

    let (_process, _delegate, mut outcomes) = launch(harness.deps(), full_flow());

    assert!(matches!(
        outcomes.recv().await.unwrap().1,
        Outcome::Failed {
            error: PaymentError::PollingTimeout { attempts: 5 },
            ..
        }
    ));
    assert_eq!(harness.payments.state_calls(), 5);
}

#[tokio::test]
async fn test_repeat_init_runs_once_with_merged_data() {
    let harness = Harness::new();
    harness.payments.charges.lock().push_back(Err(api_failure(104)));
    let recovery = Recovery::with_cvc();
    let recovery_delegate: Arc<dyn ChargeRecoveryDelegate> = recovery.clone();
    let deps = harness
        .builder()
        .charge_recovery_delegate(&recovery_delegate)
        .build();

    let (process, _delegate, mut outcomes) = launch(deps, full_flow());

    match outcomes.recv().await.unwrap().1 {
        Outcome::Finished {
            state, rebill_id, ..
        } => {
            assert_eq!(state.payment_id, PaymentId::new("1002"));
            assert_eq!(rebill_id.as_deref(), Some("rebill-1"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(process.payment_id(), Some(PaymentId::new("1002")));

    let requests = recovery.requests.lock().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].failed_payment_id, PaymentId::new("1001"));
    assert_eq!(requests[0].rebill_id, "rebill-1");
    assert_eq!(requests[0].failure.error_code, 104);
    assert_eq!(requests[0].additional_data[FAIL_MAPI_SESSION_ID], "1001");
    assert_eq!(requests[0].additional_data[RECURRING_TYPE], "12");

    let inits = harness.payments.init_calls.lock().clone();
    assert_eq!(inits.len(), 2);
    assert!(inits[0].data.get(FAIL_MAPI_SESSION_ID).is_none());
    assert_eq!(inits[1].data["channel"], "app");
    assert_eq!(inits[1].data[FAIL_MAPI_SESSION_ID], "1001");
    assert_eq!(inits[1].data[RECURRING_TYPE], "12");
    assert_eq!(inits[1].data["cvcChecked"], "Y");

    assert_eq!(harness.payments.charge_calls.lock().len(), 1);
    assert_eq!(harness.three_ds.check_calls.lock().len(), 1);
    assert_eq!(
        harness.payments.finish_calls.lock()[0].payment_id,
        PaymentId::new("1002")
    );
}

#[tokio::test]
async fn test_repeat_init_failure_is_not_retried() {
    let harness = Harness::new();
    harness.payments.charges.lock().push_back(Err(api_failure(104)));
    harness.payments.finishes.lock().push_back(Err(api_failure(104)));
    let recovery = Recovery::with_cvc();
    let recovery_delegate: Arc<dyn ChargeRecoveryDelegate> = recovery.clone();
    let deps = harness
        .builder()
        .charge_recovery_delegate(&recovery_delegate)
        .build();

    let (_process, _delegate, mut outcomes) = launch(deps, full_flow());

    match outcomes.recv().await.unwrap().1 {
        Outcome::Failed {
            error: PaymentError::Api(failure),
            ..
        } => assert_eq!(failure.error_code, 104),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(recovery.requests.lock().len(), 1);
    assert_eq!(harness.payments.init_calls.lock().len(), 2);
    assert_quiet(&mut outcomes, Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_recovery_declined_fails_with_api_error() {
    let harness = Harness::new();
    harness.payments.charges.lock().push_back(Err(api_failure(104)));
    let recovery = Recovery::giving_up();
    let recovery_delegate: Arc<dyn ChargeRecoveryDelegate> = recovery.clone();
    let deps = harness
        .builder()
        .charge_recovery_delegate(&recovery_delegate)
        .build();

    let (_process, _delegate, mut outcomes) = launch(deps, full_flow());

    match outcomes.recv().await.unwrap().1 {
        Outcome::Failed {
            error: PaymentError::Api(failure),
            rebill_id,
            ..
        } => {
            assert_eq!(failure.error_code, 104);
            assert_eq!(rebill_id.as_deref(), Some("rebill-1"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(recovery.requests.lock().len(), 1);
    assert_eq!(harness.payments.init_calls.lock().len(), 1);
}

#[tokio::test]
async fn test_finish_flow_cannot_repeat_init() {
    let harness = Harness::new();
    harness.payments.charges.lock().push_back(Err(api_failure(104)));
    let recovery = Recovery::with_cvc();
    let recovery_delegate: Arc<dyn ChargeRecoveryDelegate> = recovery.clone();
    let deps = harness
        .builder()
        .charge_recovery_delegate(&recovery_delegate)
        .build();
    let flow = PaymentFlow::Finish {
        payment_id: PaymentId::new("555"),
        customer_options: None,
    };

    let (_process, _delegate, mut outcomes) = launch(deps, flow);

    assert!(matches!(
        outcomes.recv().await.unwrap().1,
        Outcome::Failed {
            error: PaymentError::Api(_),
            ..
        }
    ));
    assert!(recovery.requests.lock().is_empty());
    assert!(harness.payments.init_calls.lock().is_empty());
}

#[tokio::test]
async fn test_other_charge_errors_are_terminal() {
    let harness = Harness::new();
    harness.payments.charges.lock().push_back(Err(api_failure(99)));
    let recovery = Recovery::with_cvc();
    let recovery_delegate: Arc<dyn ChargeRecoveryDelegate> = recovery.clone();
    let deps = harness
        .builder()
        .charge_recovery_delegate(&recovery_delegate)
        .build();

    let (_process, _delegate, mut outcomes) = launch(deps, full_flow());

    assert!(matches!(
        outcomes.recv().await.unwrap().1,
        Outcome::Failed {
            error: PaymentError::Api(_),
            ..
        }
    ));
    assert!(recovery.requests.lock().is_empty());
}

#[tokio::test]
async fn test_init_failure_fails_the_charge() {
    let harness = Harness::new();
    harness.payments.inits.lock().push_back(Err(api_failure(8)));
    let (process, _delegate, mut outcomes) = launch(harness.deps(), full_flow());

    assert!(matches!(
        outcomes.recv().await.unwrap().1,
        Outcome::Failed {
            error: PaymentError::Api(_),
            ..
        }
    ));
    assert!(process.payment_id().is_none());
    assert!(harness.payments.charge_calls.lock().is_empty());
}

#[tokio::test]
async fn test_scripted_init_payment_id_is_used() {
    let harness = Harness::new();
    harness.payments.inits.lock().push_back(Ok(InitPayload {
        amount: 320,
        order_id: "12345".into(),
        payment_id: PaymentId::new("31337"),
        status: PaymentStatus::New,
    }));
    let (process, _delegate, mut outcomes) = launch(harness.deps(), full_flow());

    assert!(matches!(
        outcomes.recv().await.unwrap().1,
        Outcome::Finished { .. }
    ));
    assert_eq!(process.payment_id(), Some(PaymentId::new("31337")));
    assert_eq!(
        harness.payments.charge_calls.lock()[0].payment_id,
        PaymentId::new("31337")
    );
}
