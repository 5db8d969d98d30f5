//! 3-D Secure requests

use crate::error::AcquiringResult;
use crate::models::{Check3DSVersionPayload, GetPaymentStatePayload, PaymentId};
use crate::request::{AcquiringRequest, to_parameters};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check3DSVersionData {
    #[serde(rename = "PaymentId")]
    pub payment_id: PaymentId,
    /// Encoded card data.
    #[serde(rename = "CardData")]
    pub card_data: String,
}

/// `v2/Check3dsVersion`
#[derive(Debug, Clone)]
pub struct Check3DSVersionRequest {
    pub data: Check3DSVersionData,
}

impl AcquiringRequest for Check3DSVersionRequest {
    type Payload = Check3DSVersionPayload;

    fn path(&self) -> String {
        "v2/Check3dsVersion".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        to_parameters(&self.data)
    }
}

/// Result of a 3DS v1 browser challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submit3DSAuthorizationData {
    #[serde(rename = "PaymentId")]
    pub payment_id: PaymentId,
    #[serde(rename = "PaRes")]
    pub pa_res: String,
    #[serde(rename = "MD")]
    pub md: String,
}

/// `v2/Submit3DSAuthorization`
#[derive(Debug, Clone)]
pub struct Submit3DSAuthorizationRequest {
    pub data: Submit3DSAuthorizationData,
}

impl AcquiringRequest for Submit3DSAuthorizationRequest {
    type Payload = GetPaymentStatePayload;

    fn path(&self) -> String {
        "v2/Submit3DSAuthorization".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        to_parameters(&self.data)
    }
}

/// Base64 CRes of a 3DS v2 challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CresData {
    pub cres: String,
}

/// `v2/Submit3DSAuthorizationV2`
#[derive(Debug, Clone)]
pub struct Submit3DSAuthorizationV2Request {
    pub data: CresData,
}

impl AcquiringRequest for Submit3DSAuthorizationV2Request {
    type Payload = GetPaymentStatePayload;

    fn path(&self) -> String {
        "v2/Submit3DSAuthorizationV2".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        to_parameters(&self.data)
    }
}
