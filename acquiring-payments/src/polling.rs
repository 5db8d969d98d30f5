//! `GetState` polling until the payment settles

use crate::config::PollingConfig;
use crate::error::{PaymentError, PaymentResult};
use acquiring_core::AcquiringPaymentsService;
use acquiring_core::models::{GetPaymentStatePayload, PaymentId};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Polls the payment state until it succeeds, fails or attempts run out.
#[derive(Clone)]
pub struct PaymentStatePoller {
    service: Arc<dyn AcquiringPaymentsService>,
    config: PollingConfig,
}

impl PaymentStatePoller {
    pub fn new(service: Arc<dyn AcquiringPaymentsService>, config: PollingConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &PollingConfig {
        &self.config
    }

    /// Poll `payment_id`.
    ///
    /// A successful status returns the state, any other final status is
    /// [`PaymentError::Declined`]. Running out of attempts is
    /// [`PaymentError::PollingTimeout`]. Request failures end polling at once.
    pub async fn poll(
        &self,
        payment_id: &PaymentId,
        cancel: &CancellationToken,
    ) -> PaymentResult<GetPaymentStatePayload> {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 0..max_attempts {
            let state = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PaymentError::Cancelled),
                result = self.service.get_payment_state(payment_id.clone()) => result?,
            };

            debug!(
                payment_id = %payment_id,
                attempt = attempt + 1,
                status = %state.status,
                "Polled payment state"
            );

            if state.status.is_successful() {
                return Ok(state);
            }
            if state.status.is_final() {
                return Err(PaymentError::Declined(state));
            }

            if attempt + 1 < max_attempts {
                let delay = self.config.backoff.delay_for_attempt(attempt);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(PaymentError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        warn!(payment_id = %payment_id, attempts = max_attempts, "Payment state did not settle");
        Err(PaymentError::PollingTimeout {
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acquiring_core::AcquiringResult;
    use acquiring_core::models::{
        ChargePayload, FinishAuthorizePayload, InitPayload, PaymentInitData, PaymentStatus,
    };
    use acquiring_core::requests::{ChargeData, FinishAuthorizeData};
    use acquiring_http::BackoffStrategy;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::time::Duration;

    struct ScriptedStates {
        statuses: Mutex<VecDeque<PaymentStatus>>,
        calls: Mutex<u32>,
    }

    impl ScriptedStates {
        fn new(statuses: &[PaymentStatus]) -> Arc<Self> {
            Arc::new(Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl AcquiringPaymentsService for ScriptedStates {
        async fn init_payment(&self, _: PaymentInitData) -> AcquiringResult<InitPayload> {
            unreachable!()
        }

        async fn finish_authorize(
            &self,
            _: FinishAuthorizeData,
        ) -> AcquiringResult<FinishAuthorizePayload> {
            unreachable!()
        }

        async fn charge(&self, _: ChargeData) -> AcquiringResult<ChargePayload> {
            unreachable!()
        }

        async fn get_payment_state(
            &self,
            payment_id: PaymentId,
        ) -> AcquiringResult<GetPaymentStatePayload> {
            *self.calls.lock() += 1;
            let status = self
                .statuses
                .lock()
                .pop_front()
                .unwrap_or(PaymentStatus::Authorizing);
            Ok(GetPaymentStatePayload {
                payment_id,
                amount: 320,
                order_id: "12345".into(),
                status,
            })
        }
    }

    fn poller(service: Arc<ScriptedStates>, max_attempts: u32) -> PaymentStatePoller {
        PaymentStatePoller::new(
            service,
            PollingConfig {
                max_attempts,
                backoff: BackoffStrategy::Constant(Duration::from_secs(3)),
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_authorized() {
        let service = ScriptedStates::new(&[
            PaymentStatus::Authorizing,
            PaymentStatus::ThreeDsChecked,
            PaymentStatus::Authorized,
        ]);
        let state = poller(service.clone(), 10)
            .poll(&PaymentId::new("999"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(state.status, PaymentStatus::Authorized);
        assert_eq!(*service.calls.lock(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_failure_is_declined() {
        let service = ScriptedStates::new(&[PaymentStatus::Rejected]);
        let err = poller(service, 10)
            .poll(&PaymentId::new("999"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Declined(state) if state.status == PaymentStatus::Rejected));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_exhausted() {
        let service = ScriptedStates::new(&[]);
        let err = poller(service.clone(), 4)
            .poll(&PaymentId::new("999"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::PollingTimeout { attempts: 4 }));
        assert_eq!(*service.calls.lock(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let service = ScriptedStates::new(&[]);
        let cancel = CancellationToken::new();
        let poller = poller(service.clone(), 10);

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move { poller.poll(&PaymentId::new("999"), &cancel).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, PaymentError::Cancelled));
        assert_eq!(*service.calls.lock(), 1);
    }
}
