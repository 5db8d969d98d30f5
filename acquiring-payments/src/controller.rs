//! Session-level payment coordination
//!
//! The controller keeps at most one process active. Starting a payment
//! cancels the previous one and discards whatever it reports afterwards.
//! Every callback reaches the [`PaymentControllerDelegate`] from a single
//! dispatcher task, in the order processes reported them.

use crate::error::PaymentError;
use crate::factory::PaymentFactory;
use crate::process::{PaymentProcess, PaymentProcessDelegate, ProcessInfo};
use acquiring_core::models::{
    CustomerOptions, GetPaymentStatePayload, PaymentFlow, PaymentId, PaymentOptions,
    PaymentSourceData,
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome callbacks of the controller.
pub trait PaymentControllerDelegate: Send + Sync {
    fn did_finish_payment(
        &self,
        payment: &ProcessInfo,
        state: GetPaymentStatePayload,
        card_id: Option<String>,
        rebill_id: Option<String>,
    );

    fn payment_was_cancelled(
        &self,
        payment: &ProcessInfo,
        card_id: Option<String>,
        rebill_id: Option<String>,
    );

    fn did_fail(
        &self,
        payment: &ProcessInfo,
        error: PaymentError,
        card_id: Option<String>,
        rebill_id: Option<String>,
    );
}

enum ControllerEvent {
    Finished(GetPaymentStatePayload),
    Cancelled,
    Failed(PaymentError),
}

struct Envelope {
    /// `None` for failures raised before any process existed.
    process_id: Option<Uuid>,
    info: ProcessInfo,
    event: ControllerEvent,
    card_id: Option<String>,
    rebill_id: Option<String>,
}

type ActiveSlot = Arc<Mutex<Option<Arc<dyn PaymentProcess>>>>;

/// Process delegate that forwards into the dispatcher queue.
struct EventRelay {
    sender: mpsc::UnboundedSender<Envelope>,
}

impl EventRelay {
    fn send(&self, envelope: Envelope) {
        if self.sender.send(envelope).is_err() {
            debug!("Payment controller dispatcher is gone");
        }
    }
}

impl PaymentProcessDelegate for EventRelay {
    fn payment_did_finish(
        &self,
        process: &ProcessInfo,
        state: GetPaymentStatePayload,
        card_id: Option<String>,
        rebill_id: Option<String>,
    ) {
        self.send(Envelope {
            process_id: Some(process.id),
            info: process.clone(),
            event: ControllerEvent::Finished(state),
            card_id,
            rebill_id,
        });
    }

    fn payment_did_cancel(
        &self,
        process: &ProcessInfo,
        card_id: Option<String>,
        rebill_id: Option<String>,
    ) {
        self.send(Envelope {
            process_id: Some(process.id),
            info: process.clone(),
            event: ControllerEvent::Cancelled,
            card_id,
            rebill_id,
        });
    }

    fn payment_did_fail(
        &self,
        process: &ProcessInfo,
        error: PaymentError,
        card_id: Option<String>,
        rebill_id: Option<String>,
    ) {
        self.send(Envelope {
            process_id: Some(process.id),
            info: process.clone(),
            event: ControllerEvent::Failed(error),
            card_id,
            rebill_id,
        });
    }
}

/// Runs payments one at a time for a UI collaborator.
pub struct PaymentController {
    factory: PaymentFactory,
    active: ActiveSlot,
    relay: Arc<EventRelay>,
}

impl PaymentController {
    /// Create a controller and spawn its dispatcher on the current Tokio
    /// runtime. The delegate is held weakly.
    pub fn new(factory: PaymentFactory, delegate: Weak<dyn PaymentControllerDelegate>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let active: ActiveSlot = Arc::new(Mutex::new(None));
        tokio::spawn(dispatch(receiver, active.clone(), delegate));

        Self {
            factory,
            active,
            relay: Arc::new(EventRelay { sender }),
        }
    }

    /// Start a payment, cancelling the active one. Returns the id of the new
    /// process, or `None` when no strategy handles `source`; the delegate then
    /// gets [`PaymentError::UnsupportedSource`].
    pub fn perform_payment(&self, flow: PaymentFlow, source: PaymentSourceData) -> Option<Uuid> {
        let relay: Arc<dyn PaymentProcessDelegate> = self.relay.clone();
        let process =
            self.factory
                .create_payment(source.clone(), flow.clone(), Arc::downgrade(&relay));

        let previous = {
            let mut active = self.active.lock();
            std::mem::replace(&mut *active, process.clone())
        };
        if let Some(previous) = previous {
            info!(process_id = %previous.id(), "Replacing active payment");
            previous.cancel();
        }

        match process {
            Some(process) => {
                let id = process.id();
                info!(process_id = %id, source = ?source, "Starting payment");
                process.start();
                Some(id)
            }
            None => {
                warn!(source = ?source, "Unsupported payment source");
                let payment_id = match &flow {
                    PaymentFlow::Finish { payment_id, .. } => Some(payment_id.clone()),
                    PaymentFlow::Full(_) => None,
                };
                self.relay.send(Envelope {
                    process_id: None,
                    info: ProcessInfo {
                        id: Uuid::new_v4(),
                        payment_id,
                        source,
                        flow,
                    },
                    event: ControllerEvent::Failed(PaymentError::UnsupportedSource),
                    card_id: None,
                    rebill_id: None,
                });
                None
            }
        }
    }

    /// Full flow: `Init` with `options`, then pay with `source`.
    pub fn perform_init_payment(
        &self,
        options: PaymentOptions,
        source: PaymentSourceData,
    ) -> Option<Uuid> {
        self.perform_payment(PaymentFlow::Full(options), source)
    }

    /// Pay a payment initiated elsewhere.
    pub fn perform_finish_payment(
        &self,
        payment_id: PaymentId,
        customer_options: Option<CustomerOptions>,
        source: PaymentSourceData,
    ) -> Option<Uuid> {
        self.perform_payment(
            PaymentFlow::Finish {
                payment_id,
                customer_options,
            },
            source,
        )
    }

    /// Cancel the active payment, if any.
    pub fn cancel_active_payment(&self) {
        let active = self.active.lock().clone();
        if let Some(process) = active {
            info!(process_id = %process.id(), "Cancelling active payment");
            process.cancel();
        }
    }

    pub fn active_payment(&self) -> Option<Arc<dyn PaymentProcess>> {
        self.active.lock().clone()
    }
}

impl Drop for PaymentController {
    fn drop(&mut self) {
        if let Some(process) = self.active.lock().take() {
            process.cancel();
        }
    }
}

async fn dispatch(
    mut receiver: mpsc::UnboundedReceiver<Envelope>,
    active: ActiveSlot,
    delegate: Weak<dyn PaymentControllerDelegate>,
) {
    while let Some(envelope) = receiver.recv().await {
        if let Some(process_id) = envelope.process_id {
            let mut slot = active.lock();
            match slot.as_ref() {
                Some(process) if process.id() == process_id => {
                    // Terminal event; the process is done.
                    *slot = None;
                }
                _ => {
                    debug!(process_id = %process_id, "Discarding event of inactive payment");
                    continue;
                }
            }
        }

        let Some(delegate) = delegate.upgrade() else {
            continue;
        };
        let Envelope {
            info,
            event,
            card_id,
            rebill_id,
            ..
        } = envelope;
        match event {
            ControllerEvent::Finished(state) => {
                delegate.did_finish_payment(&info, state, card_id, rebill_id)
            }
            ControllerEvent::Cancelled => delegate.payment_was_cancelled(&info, card_id, rebill_id),
            ControllerEvent::Failed(error) => delegate.did_fail(&info, error, card_id, rebill_id),
        }
    }
    debug!("Payment controller dispatcher stopped");
}
