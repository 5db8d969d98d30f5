//! Card and wallet payments

use crate::authorization::Authorization;
use crate::error::PaymentResult;
use crate::factory::PaymentDependencies;
use crate::polling::PaymentStatePoller;
use crate::process::{PaymentProcess, PaymentProcessDelegate, ProcessCore, ProcessState};
use crate::threeds::ThreeDsResolver;
use acquiring_core::models::{
    GetPaymentStatePayload, PaymentFlow, PaymentId, PaymentInitData, PaymentSourceData,
};
use std::sync::{Arc, Weak};
use tracing::{Instrument, info_span};
use uuid::Uuid;

/// `Init` (full flow), 3DS version check, `FinishAuthorize`, challenge,
/// confirmation and polling for a card or wallet source.
pub struct CardPaymentProcess {
    core: ProcessCore,
    deps: PaymentDependencies,
    resolver: ThreeDsResolver,
    poller: PaymentStatePoller,
}

impl CardPaymentProcess {
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

    async fn run(&self) -> PaymentResult<GetPaymentStatePayload> {
        let core = &self.core;
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

        Authorization {
            core,
            deps: &self.deps,
            resolver: &self.resolver,
            poller: &self.poller,
        }
        .authorize(&payment_id, core.source(), core.flow().customer_options())
        .await
    }
}

impl PaymentProcess for CardPaymentProcess {
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
        let span = info_span!("card_payment", process_id = %self.core.id());
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
