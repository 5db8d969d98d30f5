//! Collaborators the 3DS resolver drives
//!
//! The web flow host renders ACS pages, the challenge SDK runs certified
//! app-based challenges and the device info provider describes the device.
//! None of them is implemented here.

use crate::error::ChallengeError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

/// Device characteristics for 3DS fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub language: String,
    /// Offset from UTC in minutes.
    pub timezone_offset_minutes: i32,
    pub screen_height: u32,
    pub screen_width: u32,
    pub color_depth: u32,
    pub java_enabled: bool,
    pub ip_address: Option<String>,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            language: "ru".into(),
            timezone_offset_minutes: 0,
            screen_height: 0,
            screen_width: 0,
            color_depth: 32,
            java_enabled: false,
            ip_address: None,
        }
    }
}

pub trait DeviceInfoProvider: Send + Sync {
    fn device_info(&self) -> DeviceInfo;
}

/// Fixed device description.
#[derive(Debug, Clone, Default)]
pub struct StaticDeviceInfoProvider(pub DeviceInfo);

impl DeviceInfoProvider for StaticDeviceInfoProvider {
    fn device_info(&self) -> DeviceInfo {
        self.0.clone()
    }
}

/// Hidden 3DS method step of the browser flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreeDsMethodData {
    pub tds_server_trans_id: String,
    pub three_ds_method_url: String,
    pub notification_url: String,
}

/// How the 3DS method step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreeDsMethodResult {
    Completed,
    Failed,
    NotPerformed,
}

impl ThreeDsMethodResult {
    /// `threeDSCompInd` value.
    pub fn completion_indicator(&self) -> &'static str {
        match self {
            Self::Completed => "Y",
            Self::Failed => "N",
            Self::NotPerformed => "U",
        }
    }
}

/// ACS page to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebChallenge {
    /// 3DS v1: POST `PaReq`, `MD` and `TermUrl` to the ACS.
    V1 {
        acs_url: String,
        pa_req: String,
        md: String,
        term_url: String,
    },
    /// 3DS v2 browser: POST the base64url `creq` to the ACS.
    V2 {
        acs_url: String,
        creq: String,
        cres_callback_url: String,
    },
}

/// How an ACS page ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebChallengeResult {
    V1Completed { pa_res: String, md: String },
    V2Completed { cres: String },
    Cancelled,
    Failed(String),
}

/// Shows 3DS pages in a web view.
#[async_trait]
pub trait ThreeDsWebFlowHost: Send + Sync {
    async fn complete_3ds_method(&self, data: ThreeDsMethodData) -> ThreeDsMethodResult;

    async fn present_challenge(&self, challenge: WebChallenge) -> WebChallengeResult;
}

/// Values the challenge SDK contributes to the device info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationRequestParameters {
    pub sdk_transaction_id: String,
    pub device_data: String,
    pub sdk_ephemeral_public_key: String,
    pub sdk_app_id: String,
    pub sdk_reference_number: String,
    pub message_version: String,
}

/// ACS data the challenge SDK needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeParameters {
    pub three_ds_server_transaction_id: String,
    pub acs_transaction_id: String,
    pub acs_ref_number: String,
    pub acs_signed_content: String,
}

/// How an app-based challenge ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeStatus {
    Completed { trans_status: String },
    Cancelled,
    TimedOut,
    ProtocolError(String),
    RuntimeError(String),
}

/// Hands the challenge status back to the waiting resolver.
///
/// Only the first reported status counts.
#[derive(Debug)]
pub struct ChallengeStatusReceiver {
    sender: Mutex<Option<oneshot::Sender<ChallengeStatus>>>,
}

impl ChallengeStatusReceiver {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<ChallengeStatus>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                sender: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    pub fn report(&self, status: ChallengeStatus) {
        if let Some(sender) = self.sender.lock().take() {
            let _ = sender.send(status);
        }
    }

    pub fn completed(&self, trans_status: impl Into<String>) {
        self.report(ChallengeStatus::Completed {
            trans_status: trans_status.into(),
        });
    }

    pub fn cancelled(&self) {
        self.report(ChallengeStatus::Cancelled);
    }

    pub fn timed_out(&self) {
        self.report(ChallengeStatus::TimedOut);
    }

    pub fn protocol_error(&self, message: impl Into<String>) {
        self.report(ChallengeStatus::ProtocolError(message.into()));
    }

    pub fn runtime_error(&self, message: impl Into<String>) {
        self.report(ChallengeStatus::RuntimeError(message.into()));
    }
}

/// One app-based 3DS transaction.
pub trait ChallengeTransaction: Send + Sync {
    fn authentication_request_parameters(
        &self,
    ) -> Result<AuthenticationRequestParameters, ChallengeError>;

    /// Start the challenge UI; the outcome goes to `receiver`.
    fn do_challenge(
        &self,
        parameters: ChallengeParameters,
        receiver: ChallengeStatusReceiver,
        timeout: Duration,
    ) -> Result<(), ChallengeError>;

    fn close(&self);
}

/// Certified 3DS SDK.
#[async_trait]
pub trait ChallengeSdk: Send + Sync {
    /// Whether the SDK can handle cards of this payment system.
    fn supports(&self, payment_system: &str) -> bool;

    async fn create_transaction(
        &self,
        directory_server_id: &str,
        message_version: &str,
    ) -> Result<Box<dyn ChallengeTransaction>, ChallengeError>;
}

/// Registered application provider id of a payment system's directory server.
pub fn directory_server_id(payment_system: &str) -> Option<&'static str> {
    match payment_system.to_lowercase().as_str() {
        "visa" => Some("A000000003"),
        "mastercard" => Some("A000000004"),
        "mir" => Some("A000000658"),
        "upi" | "unionpay" => Some("A000000333"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receiver_reports_first_status_only() {
        let (receiver, mut rx) = ChallengeStatusReceiver::channel();
        receiver.completed("Y");
        receiver.cancelled();
        assert_eq!(
            rx.try_recv().unwrap(),
            ChallengeStatus::Completed {
                trans_status: "Y".into()
            }
        );
    }

    #[test]
    fn test_directory_server_ids() {
        assert_eq!(directory_server_id("Mir"), Some("A000000658"));
        assert_eq!(directory_server_id("amex"), None);
    }

    #[test]
    fn test_completion_indicator() {
        assert_eq!(ThreeDsMethodResult::Completed.completion_indicator(), "Y");
        assert_eq!(ThreeDsMethodResult::NotPerformed.completion_indicator(), "U");
    }
}
