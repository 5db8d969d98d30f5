//! Strategy selection and the dependencies processes share

use crate::card_process::CardPaymentProcess;
use crate::charge_process::{ChargePaymentProcess, ChargeRecoveryDelegate};
use crate::config::PaymentConfig;
use crate::process::{PaymentProcess, PaymentProcessDelegate};
use crate::threeds::{
    ChallengeSdk, DeviceInfoProvider, StaticDeviceInfoProvider, ThreeDsCollaborators,
    ThreeDsResolver, ThreeDsWebFlowHost,
};
use acquiring_core::models::{CardDataEncoder, PaymentFlow, PaymentSourceData};
use acquiring_core::{AcquiringApi, AcquiringPaymentsService, AcquiringThreeDsService};
use std::sync::{Arc, Weak};
use tracing::warn;

/// Services, collaborators and settings every process is built from.
#[derive(Clone)]
pub struct PaymentDependencies {
    pub payments_service: Arc<dyn AcquiringPaymentsService>,
    pub three_ds_service: Arc<dyn AcquiringThreeDsService>,
    pub collaborators: ThreeDsCollaborators,
    pub card_data_encoder: Arc<dyn CardDataEncoder>,
    pub charge_recovery: Option<Weak<dyn ChargeRecoveryDelegate>>,
    pub config: PaymentConfig,
}

impl PaymentDependencies {
    pub fn builder(
        payments_service: Arc<dyn AcquiringPaymentsService>,
        three_ds_service: Arc<dyn AcquiringThreeDsService>,
        card_data_encoder: Arc<dyn CardDataEncoder>,
    ) -> PaymentDependenciesBuilder {
        PaymentDependenciesBuilder {
            deps: PaymentDependencies {
                payments_service,
                three_ds_service,
                collaborators: ThreeDsCollaborators {
                    device_info: Arc::new(StaticDeviceInfoProvider::default()),
                    web_host: None,
                    challenge_sdk: None,
                },
                card_data_encoder,
                charge_recovery: None,
                config: PaymentConfig::default(),
            },
        }
    }

    /// Both services backed by one API client.
    pub fn from_api(
        api: AcquiringApi,
        card_data_encoder: Arc<dyn CardDataEncoder>,
    ) -> PaymentDependenciesBuilder {
        let api = Arc::new(api);
        Self::builder(api.clone(), api, card_data_encoder)
    }

    pub(crate) fn resolver(&self) -> ThreeDsResolver {
        ThreeDsResolver::new(
            self.three_ds_service.clone(),
            self.collaborators.clone(),
            self.config.effective_challenge_timeout(),
        )
    }
}

/// Builder for [`PaymentDependencies`].
pub struct PaymentDependenciesBuilder {
    deps: PaymentDependencies,
}

impl PaymentDependenciesBuilder {
    pub fn device_info_provider(mut self, provider: Arc<dyn DeviceInfoProvider>) -> Self {
        self.deps.collaborators.device_info = provider;
        self
    }

    pub fn web_flow_host(mut self, host: Arc<dyn ThreeDsWebFlowHost>) -> Self {
        self.deps.collaborators.web_host = Some(host);
        self
    }

    pub fn challenge_sdk(mut self, sdk: Arc<dyn ChallengeSdk>) -> Self {
        self.deps.collaborators.challenge_sdk = Some(sdk);
        self
    }

    /// Asked for extra data when a charge needs a repeat `Init`. Held weakly.
    pub fn charge_recovery_delegate(mut self, delegate: &Arc<dyn ChargeRecoveryDelegate>) -> Self {
        self.deps.charge_recovery = Some(Arc::downgrade(delegate));
        self
    }

    pub fn config(mut self, config: PaymentConfig) -> Self {
        self.deps.config = config;
        self
    }

    pub fn build(self) -> PaymentDependencies {
        self.deps
    }
}

/// Picks the process strategy for a payment source.
#[derive(Clone)]
pub struct PaymentFactory {
    deps: PaymentDependencies,
}

impl PaymentFactory {
    pub fn new(deps: PaymentDependencies) -> Self {
        Self { deps }
    }

    pub fn dependencies(&self) -> &PaymentDependencies {
        &self.deps
    }

    /// Cards and wallet tokens get a card process, parent payments a charge
    /// process. `None` for a source no strategy handles.
    pub fn create_payment(
        &self,
        source: PaymentSourceData,
        flow: PaymentFlow,
        delegate: Weak<dyn PaymentProcessDelegate>,
    ) -> Option<Arc<dyn PaymentProcess>> {
        match source {
            PaymentSourceData::CardNumber { .. }
            | PaymentSourceData::SavedCard { .. }
            | PaymentSourceData::PaymentData { .. } => Some(Arc::new(CardPaymentProcess::new(
                source,
                flow,
                self.deps.clone(),
                delegate,
            ))),
            PaymentSourceData::ParentPayment { .. } => Some(Arc::new(ChargePaymentProcess::new(
                source,
                flow,
                self.deps.clone(),
                delegate,
            ))),
            PaymentSourceData::Unknown => {
                warn!("No payment strategy for source");
                None
            }
        }
    }
}
