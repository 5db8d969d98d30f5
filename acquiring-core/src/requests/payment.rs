//! Payment lifecycle: Init, FinishAuthorize, Charge, GetState

use crate::error::AcquiringResult;
use crate::keys;
use crate::models::{
    ChargePayload, FinishAuthorizePayload, GetPaymentStatePayload, InitPayload, PaymentId,
    PaymentInitData, ThreeDSDeviceInfo, WalletKind,
};
use crate::request::{AcquiringRequest, to_parameters};
use serde::Serialize;
use serde_json::{Map, Value};

/// `v2/Init`
#[derive(Debug, Clone)]
pub struct InitRequest {
    pub data: PaymentInitData,
}

impl AcquiringRequest for InitRequest {
    type Payload = InitPayload;

    fn path(&self) -> String {
        "v2/Init".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        to_parameters(&self.data)
    }
}

/// What pays in `FinishAuthorize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishPaymentSource {
    /// Encoded card data string.
    CardData(String),
    /// Encrypted wallet token.
    Wallet { token: String, wallet: WalletKind },
}

/// `FinishAuthorize` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishAuthorizeData {
    pub payment_id: PaymentId,
    pub source: FinishPaymentSource,
    pub send_email: Option<bool>,
    pub info_email: Option<String>,
    pub ip: Option<String>,
    /// Sent in `DATA` when a 3DS v2 flow was prepared.
    pub device_info: Option<ThreeDSDeviceInfo>,
}

impl FinishAuthorizeData {
    pub fn new(payment_id: PaymentId, source: FinishPaymentSource) -> Self {
        Self {
            payment_id,
            source,
            send_email: None,
            info_email: None,
            ip: None,
            device_info: None,
        }
    }
}

/// `v2/FinishAuthorize`
#[derive(Debug, Clone)]
pub struct FinishAuthorizeRequest {
    pub data: FinishAuthorizeData,
}

impl AcquiringRequest for FinishAuthorizeRequest {
    type Payload = FinishAuthorizePayload;

    fn path(&self) -> String {
        "v2/FinishAuthorize".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        let data = &self.data;
        let mut parameters = Map::new();
        parameters.insert(keys::PAYMENT_ID.into(), data.payment_id.as_str().into());

        match &data.source {
            FinishPaymentSource::CardData(card_data) => {
                parameters.insert(keys::CARD_DATA.into(), card_data.as_str().into());
            }
            FinishPaymentSource::Wallet { token, wallet } => {
                parameters.insert("EncryptedPaymentData".into(), token.as_str().into());
                parameters.insert("Route".into(), "ACQ".into());
                parameters.insert("Source".into(), wallet.source_name().into());
            }
        }

        if let Some(send_email) = data.send_email {
            parameters.insert("SendEmail".into(), send_email.into());
        }
        if let Some(email) = &data.info_email {
            parameters.insert("InfoEmail".into(), email.as_str().into());
        }
        if let Some(ip) = &data.ip {
            parameters.insert("IP".into(), ip.as_str().into());
        }
        if let Some(device_info) = &data.device_info {
            parameters.insert(keys::DATA.into(), Value::Object(to_parameters(device_info)?));
        }

        Ok(parameters)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeData {
    #[serde(rename = "PaymentId")]
    pub payment_id: PaymentId,
    #[serde(rename = "RebillId")]
    pub rebill_id: String,
}

/// `v2/Charge`
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub data: ChargeData,
}

impl AcquiringRequest for ChargeRequest {
    type Payload = ChargePayload;

    fn path(&self) -> String {
        "v2/Charge".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        to_parameters(&self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetPaymentStateData {
    #[serde(rename = "PaymentId")]
    pub payment_id: PaymentId,
}

/// `v2/GetState`
#[derive(Debug, Clone)]
pub struct GetPaymentStateRequest {
    pub data: GetPaymentStateData,
}

impl AcquiringRequest for GetPaymentStateRequest {
    type Payload = GetPaymentStatePayload;

    fn path(&self) -> String {
        "v2/GetState".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        to_parameters(&self.data)
    }
}
