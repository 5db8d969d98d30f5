//! Payment process abstraction and the bookkeeping shared by all strategies

use crate::error::{PaymentError, PaymentResult};
use acquiring_core::models::{GetPaymentStatePayload, PaymentFlow, PaymentId, PaymentSourceData};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lifecycle of a payment process. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    Created,
    Initializing,
    Authorizing,
    Checking3DS,
    Confirming,
    Polling,
    Succeeded,
    Failed,
    Cancelled,
}

impl ProcessState {
    fn rank(&self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Initializing => 1,
            Self::Authorizing => 2,
            Self::Checking3DS => 3,
            Self::Confirming => 4,
            Self::Polling => 5,
            Self::Succeeded | Self::Failed | Self::Cancelled => 6,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Snapshot of a process handed to delegates.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    pub id: Uuid,
    pub payment_id: Option<PaymentId>,
    pub source: PaymentSourceData,
    pub flow: PaymentFlow,
}

/// Receives the outcome of a process. Exactly one method is called, once.
pub trait PaymentProcessDelegate: Send + Sync {
    fn payment_did_finish(
        &self,
        process: &ProcessInfo,
        state: GetPaymentStatePayload,
        card_id: Option<String>,
        rebill_id: Option<String>,
    );

    fn payment_did_cancel(
        &self,
        process: &ProcessInfo,
        card_id: Option<String>,
        rebill_id: Option<String>,
    );

    fn payment_did_fail(
        &self,
        process: &ProcessInfo,
        error: PaymentError,
        card_id: Option<String>,
        rebill_id: Option<String>,
    );
}

/// One payment attempt.
pub trait PaymentProcess: Send + Sync {
    fn id(&self) -> Uuid;

    fn payment_id(&self) -> Option<PaymentId>;

    fn payment_source(&self) -> &PaymentSourceData;

    fn payment_flow(&self) -> &PaymentFlow;

    fn state(&self) -> ProcessState;

    /// Run the attempt on the current Tokio runtime. Later calls do nothing.
    fn start(self: Arc<Self>);

    /// Stop the attempt. Reports cancellation unless an outcome was already
    /// reported, and suppresses everything afterwards.
    fn cancel(&self);
}

/// State, identity and outcome delivery of a process.
pub(crate) struct ProcessCore {
    id: Uuid,
    source: PaymentSourceData,
    flow: PaymentFlow,
    delegate: Weak<dyn PaymentProcessDelegate>,
    state: Mutex<ProcessState>,
    payment_id: Mutex<Option<PaymentId>>,
    reported_ids: Mutex<(Option<String>, Option<String>)>,
    cancel: CancellationToken,
    delivered: AtomicBool,
}

impl ProcessCore {
    pub(crate) fn new(
        source: PaymentSourceData,
        flow: PaymentFlow,
        delegate: Weak<dyn PaymentProcessDelegate>,
    ) -> Self {
        let payment_id = match &flow {
            PaymentFlow::Finish { payment_id, .. } => Some(payment_id.clone()),
            PaymentFlow::Full(_) => None,
        };

        Self {
            id: Uuid::new_v4(),
            source,
            flow,
            delegate,
            state: Mutex::new(ProcessState::Created),
            payment_id: Mutex::new(payment_id),
            reported_ids: Mutex::new((None, None)),
            cancel: CancellationToken::new(),
            delivered: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn source(&self) -> &PaymentSourceData {
        &self.source
    }

    pub(crate) fn flow(&self) -> &PaymentFlow {
        &self.flow
    }

    pub(crate) fn state(&self) -> ProcessState {
        *self.state.lock()
    }

    pub(crate) fn payment_id(&self) -> Option<PaymentId> {
        self.payment_id.lock().clone()
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn info(&self) -> ProcessInfo {
        ProcessInfo {
            id: self.id,
            payment_id: self.payment_id(),
            source: self.source.clone(),
            flow: self.flow.clone(),
        }
    }

    /// Claim the right to run. Only the first caller gets it.
    pub(crate) fn begin(&self) -> bool {
        let mut state = self.state.lock();
        if *state != ProcessState::Created || self.cancel.is_cancelled() {
            return false;
        }
        *state = ProcessState::Initializing;
        true
    }

    /// Move forward; fails once the process is cancelled.
    pub(crate) fn transition(&self, next: ProcessState) -> PaymentResult<()> {
        if self.cancel.is_cancelled() {
            return Err(PaymentError::Cancelled);
        }
        let mut state = self.state.lock();
        if state.is_terminal() || next.rank() < state.rank() {
            return Err(PaymentError::Configuration(format!(
                "illegal process transition {:?} -> {:?}",
                *state, next
            )));
        }
        if *state != next {
            debug!(process_id = %self.id, from = ?*state, to = ?next, "Process transition");
            *state = next;
        }
        Ok(())
    }

    /// Record the id `Init` assigned. A process gets exactly one.
    pub(crate) fn assign_payment_id(&self, payment_id: PaymentId) -> PaymentResult<()> {
        let mut slot = self.payment_id.lock();
        match slot.as_ref() {
            Some(existing) if *existing != payment_id => Err(PaymentError::Configuration(format!(
                "payment id already assigned: {}",
                existing
            ))),
            _ => {
                *slot = Some(payment_id);
                Ok(())
            }
        }
    }

    /// The repeat `Init` of a recovered charge starts a new attempt with a new id.
    pub(crate) fn replace_payment_id(&self, payment_id: PaymentId) {
        let previous = self.payment_id.lock().replace(payment_id.clone());
        info!(
            process_id = %self.id,
            previous = ?previous.as_ref().map(PaymentId::as_str),
            payment_id = %payment_id,
            "Payment re-initiated"
        );
    }

    /// Ids the backend reported for the card, used when the source has none.
    pub(crate) fn record_reported_ids(&self, card_id: Option<String>, rebill_id: Option<String>) {
        let mut ids = self.reported_ids.lock();
        if card_id.is_some() {
            ids.0 = card_id;
        }
        if rebill_id.is_some() {
            ids.1 = rebill_id;
        }
    }

    fn outcome_ids(&self) -> (Option<String>, Option<String>) {
        let reported = self.reported_ids.lock().clone();
        (
            self.source.card_id().map(str::to_string).or(reported.0),
            self.source.rebill_id().map(str::to_string).or(reported.1),
        )
    }

    /// Await a step unless the process is cancelled first. A result that
    /// lands after cancellation is dropped.
    pub(crate) async fn step<T, E, F>(&self, future: F) -> PaymentResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<PaymentError>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PaymentError::Cancelled),
            result = future => {
                if self.cancel.is_cancelled() {
                    Err(PaymentError::Cancelled)
                } else {
                    result.map_err(Into::into)
                }
            }
        }
    }

    /// Deliver the result of a finished run.
    pub(crate) fn complete(&self, result: PaymentResult<GetPaymentStatePayload>) {
        match result {
            Ok(state) => {
                info!(process_id = %self.id, status = %state.status, "Payment finished");
                self.deliver(ProcessState::Succeeded, |delegate, info, card_id, rebill_id| {
                    delegate.payment_did_finish(info, state, card_id, rebill_id)
                });
            }
            Err(PaymentError::Cancelled) => self.cancel(),
            Err(error) => {
                warn!(process_id = %self.id, error = %error, "Payment failed");
                self.deliver(ProcessState::Failed, |delegate, info, card_id, rebill_id| {
                    delegate.payment_did_fail(info, error, card_id, rebill_id)
                });
            }
        }
    }

    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
        if self.claim_delivery() {
            info!(process_id = %self.id, "Payment cancelled");
            *self.state.lock() = ProcessState::Cancelled;
            let (card_id, rebill_id) = self.outcome_ids();
            if let Some(delegate) = self.delegate.upgrade() {
                delegate.payment_did_cancel(&self.info(), card_id, rebill_id);
            }
        }
    }

    fn claim_delivery(&self) -> bool {
        self.delivered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn deliver<F>(&self, state: ProcessState, notify: F)
    where
        F: FnOnce(&dyn PaymentProcessDelegate, &ProcessInfo, Option<String>, Option<String>),
    {
        if self.cancel.is_cancelled() || !self.claim_delivery() {
            debug!(process_id = %self.id, "Outcome suppressed");
            return;
        }
        *self.state.lock() = state;
        let (card_id, rebill_id) = self.outcome_ids();
        if let Some(delegate) = self.delegate.upgrade() {
            notify(delegate.as_ref(), &self.info(), card_id, rebill_id);
        }
    }
}
