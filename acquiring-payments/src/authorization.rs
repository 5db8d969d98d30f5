//! Authorization tail shared by the card and charge strategies

use crate::error::{PaymentError, PaymentResult};
use crate::factory::PaymentDependencies;
use crate::polling::PaymentStatePoller;
use crate::process::{ProcessCore, ProcessState};
use crate::threeds::{Resolution, ThreeDsResolver};
use acquiring_core::models::{
    CustomerOptions, FinishAuthorizeStatus, GetPaymentStatePayload, PaymentId, PaymentSourceData,
};
use acquiring_core::requests::{Check3DSVersionData, FinishAuthorizeData, FinishPaymentSource};
use tracing::debug;

/// Everything a strategy needs to authorize and settle one payment id.
pub(crate) struct Authorization<'a> {
    pub core: &'a ProcessCore,
    pub deps: &'a PaymentDependencies,
    pub resolver: &'a ThreeDsResolver,
    pub poller: &'a PaymentStatePoller,
}

impl Authorization<'_> {
    /// Check the 3DS version, call `FinishAuthorize` and settle the result.
    pub(crate) async fn authorize(
        &self,
        payment_id: &PaymentId,
        source: &PaymentSourceData,
        customer: Option<&CustomerOptions>,
    ) -> PaymentResult<GetPaymentStatePayload> {
        let core = self.core;
        core.transition(ProcessState::Authorizing)?;

        let (finish_source, device_info) = match source {
            PaymentSourceData::CardNumber { .. } | PaymentSourceData::SavedCard { .. } => {
                let card = source.card_data().ok_or(PaymentError::UnsupportedSource)?;
                let card_data = self.deps.card_data_encoder.encode(&card)?;

                let version = core
                    .step(self.deps.three_ds_service.check_3ds_version(Check3DSVersionData {
                        payment_id: payment_id.clone(),
                        card_data: card_data.clone(),
                    }))
                    .await?;
                debug!(
                    payment_id = %payment_id,
                    version = ?version.version,
                    payment_system = ?version.payment_system,
                    "3DS version checked"
                );

                let device_info = core.step(self.resolver.prepare(&version)).await?;
                (FinishPaymentSource::CardData(card_data), device_info)
            }
            PaymentSourceData::PaymentData {
                base64_token,
                wallet,
            } => (
                FinishPaymentSource::Wallet {
                    token: base64_token.clone(),
                    wallet: *wallet,
                },
                None,
            ),
            PaymentSourceData::ParentPayment { .. } | PaymentSourceData::Unknown => {
                return Err(PaymentError::UnsupportedSource);
            }
        };

        let mut data = FinishAuthorizeData::new(payment_id.clone(), finish_source);
        data.device_info = device_info;
        data.ip = self.deps.collaborators.device_info.device_info().ip_address;
        if let Some(email) = customer.and_then(|c| c.email.clone()) {
            data.send_email = Some(true);
            data.info_email = Some(email);
        }

        let payload = core
            .step(self.deps.payments_service.finish_authorize(data))
            .await?;
        core.record_reported_ids(payload.card_id.clone(), payload.rebill_id.clone());

        self.settle(payment_id, payload.status).await
    }

    /// Finish a payment whose authorization answered with `status`.
    pub(crate) async fn settle(
        &self,
        payment_id: &PaymentId,
        status: FinishAuthorizeStatus,
    ) -> PaymentResult<GetPaymentStatePayload> {
        let core = self.core;
        match status {
            FinishAuthorizeStatus::Done(state) => self.settle_state(payment_id, state).await,
            challenge => {
                core.transition(ProcessState::Checking3DS)?;
                match core.step(self.resolver.resolve(challenge)).await? {
                    Resolution::NotRequired(state) => self.settle_state(payment_id, state).await,
                    Resolution::Confirmation(confirmation) => {
                        core.transition(ProcessState::Confirming)?;
                        core.step(self.resolver.confirm(payment_id, confirmation))
                            .await?;
                        self.poll(payment_id).await
                    }
                }
            }
        }
    }

    async fn settle_state(
        &self,
        payment_id: &PaymentId,
        state: GetPaymentStatePayload,
    ) -> PaymentResult<GetPaymentStatePayload> {
        if state.status.is_successful() {
            return Ok(state);
        }
        if state.status.is_final() {
            return Err(PaymentError::Declined(state));
        }
        self.poll(payment_id).await
    }

    pub(crate) async fn poll(&self, payment_id: &PaymentId) -> PaymentResult<GetPaymentStatePayload> {
        self.core.transition(ProcessState::Polling)?;
        self.poller.poll(payment_id, self.core.cancel_token()).await
    }
}
