//! Service seams consumed by the payment engine
//!
//! The engine talks to these traits rather than to [`AcquiringApi`] so that
//! processes can be driven by in-memory fakes.

use crate::api::AcquiringApi;
use crate::error::AcquiringResult;
use crate::models::{
    ChargePayload, Check3DSVersionPayload, FinishAuthorizePayload, GetPaymentStatePayload,
    InitPayload, PaymentId, PaymentInitData,
};
use crate::requests::{
    ChargeData, Check3DSVersionData, CresData, FinishAuthorizeData, Submit3DSAuthorizationData,
};
use async_trait::async_trait;

/// Payment lifecycle operations.
#[async_trait]
pub trait AcquiringPaymentsService: Send + Sync {
    async fn init_payment(&self, data: PaymentInitData) -> AcquiringResult<InitPayload>;

    async fn finish_authorize(
        &self,
        data: FinishAuthorizeData,
    ) -> AcquiringResult<FinishAuthorizePayload>;

    async fn charge(&self, data: ChargeData) -> AcquiringResult<ChargePayload>;

    async fn get_payment_state(&self, payment_id: PaymentId)
    -> AcquiringResult<GetPaymentStatePayload>;
}

/// 3-D Secure operations and the URLs challenge pages call back to.
#[async_trait]
pub trait AcquiringThreeDsService: Send + Sync {
    async fn check_3ds_version(
        &self,
        data: Check3DSVersionData,
    ) -> AcquiringResult<Check3DSVersionPayload>;

    async fn submit_3ds_authorization(
        &self,
        data: Submit3DSAuthorizationData,
    ) -> AcquiringResult<GetPaymentStatePayload>;

    async fn submit_3ds_authorization_v2(
        &self,
        data: CresData,
    ) -> AcquiringResult<GetPaymentStatePayload>;

    fn confirmation_3ds_termination_url(&self) -> String;

    fn confirmation_3ds_termination_v2_url(&self) -> String;

    fn complete_3ds_method_url(&self) -> String;
}

#[async_trait]
impl AcquiringPaymentsService for AcquiringApi {
    async fn init_payment(&self, data: PaymentInitData) -> AcquiringResult<InitPayload> {
        self.init(data).await
    }

    async fn finish_authorize(
        &self,
        data: FinishAuthorizeData,
    ) -> AcquiringResult<FinishAuthorizePayload> {
        AcquiringApi::finish_authorize(self, data).await
    }

    async fn charge(&self, data: ChargeData) -> AcquiringResult<ChargePayload> {
        AcquiringApi::charge(self, data).await
    }

    async fn get_payment_state(
        &self,
        payment_id: PaymentId,
    ) -> AcquiringResult<GetPaymentStatePayload> {
        AcquiringApi::get_payment_state(self, payment_id).await
    }
}

#[async_trait]
impl AcquiringThreeDsService for AcquiringApi {
    async fn check_3ds_version(
        &self,
        data: Check3DSVersionData,
    ) -> AcquiringResult<Check3DSVersionPayload> {
        AcquiringApi::check_3ds_version(self, data).await
    }

    async fn submit_3ds_authorization(
        &self,
        data: Submit3DSAuthorizationData,
    ) -> AcquiringResult<GetPaymentStatePayload> {
        AcquiringApi::submit_3ds_authorization(self, data).await
    }

    async fn submit_3ds_authorization_v2(
        &self,
        data: CresData,
    ) -> AcquiringResult<GetPaymentStatePayload> {
        AcquiringApi::submit_3ds_authorization_v2(self, data).await
    }

    fn confirmation_3ds_termination_url(&self) -> String {
        self.config().confirmation_3ds_termination_url()
    }

    fn confirmation_3ds_termination_v2_url(&self) -> String {
        self.config().confirmation_3ds_termination_v2_url()
    }

    fn complete_3ds_method_url(&self) -> String {
        self.config().complete_3ds_method_url()
    }
}
