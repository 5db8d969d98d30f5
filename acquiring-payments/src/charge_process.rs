//! Recurring charges against a parent payment

use crate::authorization::Authorization;
use crate::error::{PaymentError, PaymentResult};
use crate::factory::PaymentDependencies;
use crate::polling::PaymentStatePoller;
use crate::process::{PaymentProcess, PaymentProcessDelegate, ProcessCore, ProcessState};
use crate::threeds::ThreeDsResolver;
use acquiring_core::APIFailureError;
use acquiring_core::models::{
    FinishAuthorizeStatus, GetPaymentStatePayload, PaymentFlow, PaymentId, PaymentInitData,
    PaymentOptions, PaymentSourceData,
};
use acquiring_core::requests::ChargeData;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// `DATA` key carrying the id of the charge that failed.
pub const FAIL_MAPI_SESSION_ID: &str = "failMapiSessionId";
/// `DATA` key marking the repeat `Init` as a recurring payment.
pub const RECURRING_TYPE: &str = "recurringType";
/// Recurring payment initiated by the customer.
pub const RECURRING_TYPE_CUSTOMER: &str = "12";

/// Asked for a payment source when a charge has to be repeated through a
/// fresh `Init`.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatInitRequest {
    pub failed_payment_id: PaymentId,
    pub rebill_id: String,
    pub failure: APIFailureError,
    /// `DATA` entries the repeat `Init` will carry.
    pub additional_data: BTreeMap<String, String>,
}

/// What the collaborator supplied for the repeat attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatInitData {
    /// Card or saved card, usually with the CVC the issuer asked for.
    pub source: PaymentSourceData,
    pub additional_data: BTreeMap<String, String>,
}

#[async_trait]
pub trait ChargeRecoveryDelegate: Send + Sync {
    /// `None` gives up and fails the charge with the original error.
    async fn additional_data_needed(&self, request: RepeatInitRequest) -> Option<RepeatInitData>;
}

/// `Init` (full flow), `Charge`, and the card tail when the bank wants the
/// customer back in the loop.
pub struct ChargePaymentProcess {
    core: ProcessCore,
    deps: PaymentDependencies,
    resolver: ThreeDsResolver,
    poller: PaymentStatePoller,
}

impl ChargePaymentProcess {
    pub fn new(
        source: PaymentSourceData,
        flow: PaymentFlow,
        deps: PaymentDependencies,
        delegate: Weak<dyn PaymentProcessDelegate>,
    ) -> Self {
        let resolver = deps.resolver();
        let poller =
            PaymentStatePoller::new(deps.payments_service.clone(), deps.config.polling.clone());
        Self {
            core: ProcessCore::new(source, flow, delegate),
            deps,
            resolver,
            poller,
        }
    }

    fn authorization(&self) -> Authorization<'_> {
        Authorization {
            core: &self.core,
            deps: &self.deps,
            resolver: &self.resolver,
            poller: &self.poller,
        }
    }

    async fn run(&self) -> PaymentResult<GetPaymentStatePayload> {
        let core = &self.core;
        let rebill_id = core
            .source()
            .rebill_id()
            .ok_or(PaymentError::UnsupportedSource)?
            .to_string();

        let payment_id = match core.flow() {
            PaymentFlow::Full(options) => {
                core.transition(ProcessState::Initializing)?;
                let init = core
                    .step(self.deps.payments_service.init_payment(PaymentInitData::from(options)))
                    .await?;
                init.payment_id
            }
            PaymentFlow::Finish { payment_id, .. } => payment_id.clone(),
        };
        core.assign_payment_id(payment_id.clone())?;
        core.transition(ProcessState::Authorizing)?;

        let charge = core
            .step(self.deps.payments_service.charge(ChargeData {
                payment_id: payment_id.clone(),
                rebill_id: rebill_id.clone(),
            }))
            .await;

        // `Charge` runs once, so a charge is repeated through `Init` at most once.
        match charge {
            Ok(payload) => {
                core.record_reported_ids(payload.card_id.clone(), payload.rebill_id.clone());
                match payload.status {
                    // 3DS_CHECKING without challenge data settles on the bank side.
                    FinishAuthorizeStatus::Unknown => self.authorization().poll(&payment_id).await,
                    status => self.authorization().settle(&payment_id, status).await,
                }
            }
            Err(PaymentError::Api(failure))
                if self.deps.config.repeat_init.requires_additional_data(&failure) =>
            {
                self.repeat_init(payment_id, rebill_id, failure).await
            }
            Err(e) => Err(e),
        }
    }

    async fn repeat_init(
        &self,
        failed_payment_id: PaymentId,
        rebill_id: String,
        failure: APIFailureError,
    ) -> PaymentResult<GetPaymentStatePayload> {
        let core = &self.core;
        let PaymentFlow::Full(options) = core.flow() else {
            warn!(
                payment_id = %failed_payment_id,
                error_code = failure.error_code,
                "Charge needs a repeat Init, which only the full flow can do"
            );
            return Err(PaymentError::Api(failure));
        };
        let Some(delegate) = self.deps.charge_recovery.as_ref().and_then(Weak::upgrade) else {
            warn!(error_code = failure.error_code, "No charge recovery delegate");
            return Err(PaymentError::Api(failure));
        };

        let mut additional_data = BTreeMap::new();
        additional_data.insert(FAIL_MAPI_SESSION_ID.to_string(), failed_payment_id.to_string());
        additional_data.insert(RECURRING_TYPE.to_string(), RECURRING_TYPE_CUSTOMER.to_string());

        info!(
            payment_id = %failed_payment_id,
            error_code = failure.error_code,
            "Charge needs additional data"
        );
        let request = RepeatInitRequest {
            failed_payment_id,
            rebill_id,
            failure: failure.clone(),
            additional_data: additional_data.clone(),
        };
        let reply = core
            .step(async { Ok::<_, PaymentError>(delegate.additional_data_needed(request).await) })
            .await?;
        drop(delegate);

        let Some(reply) = reply else {
            return Err(PaymentError::Api(failure));
        };
        if reply.source.card_data().is_none() {
            return Err(PaymentError::UnsupportedSource);
        }

        let payment_id = self.init_repeat(options, &additional_data, &reply).await?;
        self.authorization()
            .authorize(&payment_id, &reply.source, Some(&options.customer))
            .await
    }

    async fn init_repeat(
        &self,
        options: &PaymentOptions,
        additional_data: &BTreeMap<String, String>,
        reply: &RepeatInitData,
    ) -> PaymentResult<PaymentId> {
        let data = PaymentInitData::from(options)
            .adding_data(additional_data)
            .adding_data(&reply.additional_data);
        let init = self
            .core
            .step(self.deps.payments_service.init_payment(data))
            .await?;
        self.core.replace_payment_id(init.payment_id.clone());
        Ok(init.payment_id)
    }
}

impl PaymentProcess for ChargePaymentProcess {
    fn id(&self) -> Uuid {
        self.core.id()
    }

    fn payment_id(&self) -> Option<PaymentId> {
        self.core.payment_id()
    }

    fn payment_source(&self) -> &PaymentSourceData {
        self.core.source()
    }

    fn payment_flow(&self) -> &PaymentFlow {
        self.core.flow()
    }

    fn state(&self) -> ProcessState {
        self.core.state()
    }

    fn start(self: Arc<Self>) {
        if !self.core.begin() {
            return;
        }
        let span = info_span!("charge_payment", process_id = %self.core.id());
        tokio::spawn(
            async move {
                let result = self.run().await;
                self.resolver.close_transaction();
                self.core.complete(result);
            }
            .instrument(span),
        );
    }

    fn cancel(&self) {
        self.core.cancel();
        self.resolver.close_transaction();
    }
}
