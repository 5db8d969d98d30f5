//! 3-D Secure resolution for one payment attempt

use super::host::{
    AuthenticationRequestParameters, ChallengeParameters, ChallengeSdk, ChallengeStatus,
    ChallengeStatusReceiver, ChallengeTransaction, DeviceInfo, DeviceInfoProvider,
    ThreeDsMethodData, ThreeDsWebFlowHost, WebChallenge, WebChallengeResult, directory_server_id,
};
use super::messages;
use crate::error::{ChallengeError, PaymentError, PaymentResult};
use acquiring_core::AcquiringThreeDsService;
use acquiring_core::models::{
    Check3DSVersionPayload, Confirmation3DS2AppBasedData, Confirmation3DSDataACS,
    FinishAuthorizeStatus, GetPaymentStatePayload, PaymentId, SdkInterface, ThreeDSDeviceInfo,
};
use acquiring_core::requests::{CresData, Submit3DSAuthorizationData};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_MESSAGE_VERSION: &str = "2.1.0";
const SDK_UI_TYPES: &str = "01,02,03,04,05";
/// Tried in order when a challenge has no card payment system to go by.
const APP_PAYMENT_SYSTEMS: [&str; 4] = ["visa", "mastercard", "mir", "upi"];

/// Progress of the 3DS handling of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreeDsState {
    NotStarted,
    VersionChecked,
    NoChallengeRequired,
    WebChallengeInProgress,
    AppChallengeInProgress,
    Confirmed,
    Terminal,
}

/// Which 3DS flow the card takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreeDsFlow {
    NotRequired,
    V1,
    Browser,
    AppBased,
}

/// What the challenge produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    V1 { pa_res: String, md: String },
    V2 { cres: String },
}

/// Outcome of handling a `FinishAuthorize` status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No challenge was needed.
    NotRequired(GetPaymentStatePayload),
    /// Challenge passed; the result still has to be confirmed.
    Confirmation(Confirmation),
}

/// External parts the resolver drives.
#[derive(Clone)]
pub struct ThreeDsCollaborators {
    pub device_info: Arc<dyn DeviceInfoProvider>,
    pub web_host: Option<Arc<dyn ThreeDsWebFlowHost>>,
    pub challenge_sdk: Option<Arc<dyn ChallengeSdk>>,
}

struct Inner {
    state: ThreeDsState,
    flow: Option<ThreeDsFlow>,
    message_version: Option<String>,
    transaction: Option<Box<dyn ChallengeTransaction>>,
}

/// Drives version preparation, challenges and confirmation.
///
/// An app-based transaction, once created, is closed exactly once whatever
/// the outcome.
pub struct ThreeDsResolver {
    service: Arc<dyn AcquiringThreeDsService>,
    collaborators: ThreeDsCollaborators,
    challenge_timeout: Duration,
    inner: Mutex<Inner>,
}

impl ThreeDsResolver {
    pub fn new(
        service: Arc<dyn AcquiringThreeDsService>,
        collaborators: ThreeDsCollaborators,
        challenge_timeout: Duration,
    ) -> Self {
        Self {
            service,
            collaborators,
            challenge_timeout,
            inner: Mutex::new(Inner {
                state: ThreeDsState::NotStarted,
                flow: None,
                message_version: None,
                transaction: None,
            }),
        }
    }

    pub fn state(&self) -> ThreeDsState {
        self.inner.lock().state
    }

    pub fn flow(&self) -> Option<ThreeDsFlow> {
        self.inner.lock().flow
    }

    fn set_state(&self, state: ThreeDsState) {
        self.inner.lock().state = state;
    }

    fn web_host(&self) -> PaymentResult<&Arc<dyn ThreeDsWebFlowHost>> {
        self.collaborators
            .web_host
            .as_ref()
            .ok_or_else(|| PaymentError::Configuration("no 3DS web flow host registered".into()))
    }

    /// Pick the flow for the card and build the device info `FinishAuthorize`
    /// has to carry, if any.
    pub async fn prepare(
        &self,
        version: &Check3DSVersionPayload,
    ) -> PaymentResult<Option<ThreeDSDeviceInfo>> {
        let Some(major) = version.major_version() else {
            debug!("Card is not enrolled in 3DS");
            self.record_flow(ThreeDsFlow::NotRequired, ThreeDsState::NoChallengeRequired, None);
            return Ok(None);
        };

        if major < 2 {
            self.record_flow(ThreeDsFlow::V1, ThreeDsState::VersionChecked, version.version.clone());
            return Ok(None);
        }

        let message_version = version
            .version
            .clone()
            .unwrap_or_else(|| DEFAULT_MESSAGE_VERSION.to_string());
        let device = self.collaborators.device_info.device_info();

        if let Some((sdk, ds_id)) = self.app_sdk_for(version.payment_system.as_deref()) {
            let transaction = sdk.create_transaction(ds_id, &message_version).await?;
            let parameters = match transaction.authentication_request_parameters() {
                Ok(parameters) => parameters,
                Err(e) => {
                    transaction.close();
                    self.set_state(ThreeDsState::Terminal);
                    return Err(e.into());
                }
            };

            info!(directory_server = ds_id, "Prepared app-based 3DS transaction");
            {
                let mut inner = self.inner.lock();
                inner.transaction = Some(transaction);
            }
            self.record_flow(
                ThreeDsFlow::AppBased,
                ThreeDsState::VersionChecked,
                Some(message_version),
            );
            return Ok(Some(self.app_device_info(&device, parameters)));
        }

        let completion = match &version.three_ds_method_url {
            Some(url) => {
                let host = self.web_host()?;
                let result = host
                    .complete_3ds_method(ThreeDsMethodData {
                        tds_server_trans_id: version.tds_server_trans_id.clone().unwrap_or_default(),
                        three_ds_method_url: url.clone(),
                        notification_url: self.service.complete_3ds_method_url(),
                    })
                    .await;
                debug!(result = ?result, "3DS method finished");
                result.completion_indicator()
            }
            None => "U",
        };

        self.record_flow(
            ThreeDsFlow::Browser,
            ThreeDsState::VersionChecked,
            Some(message_version),
        );
        Ok(Some(self.browser_device_info(&device, completion)))
    }

    fn record_flow(&self, flow: ThreeDsFlow, state: ThreeDsState, message_version: Option<String>) {
        let mut inner = self.inner.lock();
        inner.flow = Some(flow);
        inner.state = state;
        inner.message_version = message_version;
    }

    fn app_sdk_for(&self, payment_system: Option<&str>) -> Option<(&Arc<dyn ChallengeSdk>, &'static str)> {
        let sdk = self.collaborators.challenge_sdk.as_ref()?;
        let payment_system = payment_system?;
        let ds_id = directory_server_id(payment_system)?;
        sdk.supports(payment_system).then_some((sdk, ds_id))
    }

    fn browser_device_info(&self, device: &DeviceInfo, completion: &str) -> ThreeDSDeviceInfo {
        ThreeDSDeviceInfo {
            three_ds_comp_ind: completion.to_string(),
            java_enabled: device.java_enabled.to_string(),
            color_depth: device.color_depth,
            language: device.language.clone(),
            timezone: device.timezone_offset_minutes,
            screen_height: device.screen_height,
            screen_width: device.screen_width,
            cres_callback_url: self.service.confirmation_3ds_termination_v2_url(),
            sdk_app_id: None,
            sdk_ephem_pub_key: None,
            sdk_reference_number: None,
            sdk_trans_id: None,
            sdk_max_timeout: None,
            sdk_enc_data: None,
            sdk_interface: SdkInterface::Both,
            sdk_ui_type: SDK_UI_TYPES.to_string(),
        }
    }

    fn app_device_info(
        &self,
        device: &DeviceInfo,
        parameters: AuthenticationRequestParameters,
    ) -> ThreeDSDeviceInfo {
        let minutes = self.challenge_timeout.as_secs().div_ceil(60);
        ThreeDSDeviceInfo {
            sdk_app_id: Some(parameters.sdk_app_id),
            sdk_ephem_pub_key: Some(parameters.sdk_ephemeral_public_key),
            sdk_reference_number: Some(parameters.sdk_reference_number),
            sdk_trans_id: Some(parameters.sdk_transaction_id),
            sdk_max_timeout: Some(format!("{:02}", minutes)),
            sdk_enc_data: Some(parameters.device_data),
            ..self.browser_device_info(device, "U")
        }
    }

    /// Handle what `FinishAuthorize` asked for.
    pub async fn resolve(&self, status: FinishAuthorizeStatus) -> PaymentResult<Resolution> {
        let result = match status {
            FinishAuthorizeStatus::Done(state) => {
                self.close_transaction();
                self.set_state(ThreeDsState::NoChallengeRequired);
                return Ok(Resolution::NotRequired(state));
            }
            FinishAuthorizeStatus::NeedConfirmation3DS(data) => {
                let host = self.web_host()?;
                self.set_state(ThreeDsState::WebChallengeInProgress);
                info!("Presenting 3DS v1 challenge");
                let result = host
                    .present_challenge(WebChallenge::V1 {
                        acs_url: data.acs_url,
                        pa_req: data.pa_req,
                        md: data.md,
                        term_url: self.service.confirmation_3ds_termination_url(),
                    })
                    .await;
                match result {
                    WebChallengeResult::V1Completed { pa_res, md } => {
                        Ok(Confirmation::V1 { pa_res, md })
                    }
                    other => web_failure(other),
                }
            }
            FinishAuthorizeStatus::NeedConfirmation3DSACS(data) => {
                self.browser_challenge(data).await
            }
            FinishAuthorizeStatus::NeedConfirmation3DS2AppBased(data) => {
                self.app_challenge(data).await
            }
            FinishAuthorizeStatus::Unknown => Err(PaymentError::InvalidResponse(
                "3DS_CHECKING without challenge data".into(),
            )),
        };

        match result {
            Ok(confirmation) => Ok(Resolution::Confirmation(confirmation)),
            Err(e) => {
                self.close_transaction();
                self.set_state(ThreeDsState::Terminal);
                Err(e)
            }
        }
    }

    fn message_version(&self) -> String {
        self.inner
            .lock()
            .message_version
            .clone()
            .unwrap_or_else(|| DEFAULT_MESSAGE_VERSION.to_string())
    }

    async fn browser_challenge(&self, data: Confirmation3DSDataACS) -> PaymentResult<Confirmation> {
        let host = self.web_host()?;
        let creq = messages::creq(
            &data.tds_server_trans_id,
            &data.acs_trans_id,
            &self.message_version(),
        )?;
        self.set_state(ThreeDsState::WebChallengeInProgress);
        info!("Presenting 3DS v2 browser challenge");
        let result = host
            .present_challenge(WebChallenge::V2 {
                acs_url: data.acs_url,
                creq,
                cres_callback_url: self.service.confirmation_3ds_termination_v2_url(),
            })
            .await;
        match result {
            WebChallengeResult::V2Completed { cres } => Ok(Confirmation::V2 { cres }),
            other => web_failure(other),
        }
    }

    /// Open a transaction for a challenge that arrived without `prepare`,
    /// as it does after `Charge`.
    async fn ensure_transaction(&self) -> PaymentResult<()> {
        if self.inner.lock().transaction.is_some() {
            return Ok(());
        }
        let sdk = self.collaborators.challenge_sdk.as_ref().ok_or_else(|| {
            PaymentError::Configuration("app-based challenge without a challenge SDK".into())
        })?;
        let ds_id = APP_PAYMENT_SYSTEMS
            .iter()
            .find(|payment_system| sdk.supports(payment_system))
            .and_then(|payment_system| directory_server_id(payment_system))
            .ok_or_else(|| {
                PaymentError::Configuration("challenge SDK supports no payment system".into())
            })?;

        let message_version = self.message_version();
        let transaction = sdk.create_transaction(ds_id, &message_version).await?;
        info!(directory_server = ds_id, "Opened app-based 3DS transaction for the challenge");

        let mut inner = self.inner.lock();
        inner.transaction = Some(transaction);
        inner.flow = Some(ThreeDsFlow::AppBased);
        inner.message_version = Some(message_version);
        Ok(())
    }

    async fn app_challenge(&self, data: Confirmation3DS2AppBasedData) -> PaymentResult<Confirmation> {
        let timeout = self.challenge_timeout;
        let (receiver, status) = ChallengeStatusReceiver::channel();
        let parameters = ChallengeParameters {
            three_ds_server_transaction_id: data.tds_server_trans_id.clone(),
            acs_transaction_id: data.acs_trans_id.clone(),
            acs_ref_number: data.acs_ref_number.clone(),
            acs_signed_content: data.acs_signed_content.clone(),
        };

        self.ensure_transaction().await?;
        {
            let mut inner = self.inner.lock();
            let Some(transaction) = inner.transaction.as_ref() else {
                return Err(PaymentError::Configuration(
                    "app-based challenge without a transaction".into(),
                ));
            };
            transaction.do_challenge(parameters, receiver, timeout)?;
            inner.state = ThreeDsState::AppChallengeInProgress;
        }
        info!(timeout_secs = timeout.as_secs(), "App-based 3DS challenge started");

        let status = tokio::time::timeout(timeout, status).await;
        self.close_transaction();

        match status {
            Err(_) => {
                warn!("App-based 3DS challenge timed out");
                Err(ChallengeError::Timeout(timeout).into())
            }
            Ok(Err(_)) => Err(ChallengeError::Runtime("challenge ended without a status".into()).into()),
            Ok(Ok(ChallengeStatus::Completed { trans_status })) => {
                debug!(trans_status = %trans_status, "App-based 3DS challenge completed");
                Ok(Confirmation::V2 {
                    cres: messages::cres(
                        &data.tds_server_trans_id,
                        &data.acs_trans_id,
                        &self.message_version(),
                        &trans_status,
                    )?,
                })
            }
            Ok(Ok(ChallengeStatus::Cancelled)) => Err(PaymentError::Cancelled),
            Ok(Ok(ChallengeStatus::TimedOut)) => Err(ChallengeError::Timeout(timeout).into()),
            Ok(Ok(ChallengeStatus::ProtocolError(message))) => {
                Err(ChallengeError::Protocol(message).into())
            }
            Ok(Ok(ChallengeStatus::RuntimeError(message))) => {
                Err(ChallengeError::Runtime(message).into())
            }
        }
    }

    /// Send the challenge result to the backend.
    pub async fn confirm(
        &self,
        payment_id: &PaymentId,
        confirmation: Confirmation,
    ) -> PaymentResult<GetPaymentStatePayload> {
        let result = match confirmation {
            Confirmation::V1 { pa_res, md } => {
                self.service
                    .submit_3ds_authorization(Submit3DSAuthorizationData {
                        payment_id: payment_id.clone(),
                        pa_res,
                        md,
                    })
                    .await
            }
            Confirmation::V2 { cres } => {
                self.service
                    .submit_3ds_authorization_v2(CresData { cres })
                    .await
            }
        };

        match result {
            Ok(state) => {
                self.set_state(ThreeDsState::Confirmed);
                Ok(state)
            }
            Err(e) => {
                self.set_state(ThreeDsState::Terminal);
                Err(e.into())
            }
        }
    }

    /// Close the app-based transaction if one is open.
    pub fn close_transaction(&self) {
        let transaction = self.inner.lock().transaction.take();
        if let Some(transaction) = transaction {
            debug!("Closing 3DS transaction");
            transaction.close();
        }
    }
}

impl Drop for ThreeDsResolver {
    fn drop(&mut self) {
        self.close_transaction();
    }
}

fn web_failure(result: WebChallengeResult) -> PaymentResult<Confirmation> {
    match result {
        WebChallengeResult::Cancelled => Err(PaymentError::Cancelled),
        WebChallengeResult::Failed(message) => Err(ChallengeError::Host(message).into()),
        other => Err(ChallengeError::Protocol(format!(
            "web challenge returned a result of the wrong protocol version: {:?}",
            other
        ))
        .into()),
    }
}
