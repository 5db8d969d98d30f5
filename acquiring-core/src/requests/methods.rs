//! TinkoffPay, SBP and terminal method requests

use crate::error::AcquiringResult;
use crate::keys;
use crate::models::{
    GetQrPayload, GetSbpBanksPayload, GetTerminalPayMethodsPayload, PaymentId, QrDataType,
    TinkoffPayLinkPayload, TinkoffPayStatusPayload,
};
use crate::request::{AcquiringRequest, DecodeStrategy, to_parameters};
use crate::token::TokenFormation;
use acquiring_http::Method;
use serde::Serialize;
use serde_json::{Map, Value};

/// `v2/TinkoffPay/terminals/{TerminalKey}/status`
#[derive(Debug, Clone)]
pub struct GetTinkoffPayStatusRequest {
    pub terminal_key: String,
}

impl AcquiringRequest for GetTinkoffPayStatusRequest {
    type Payload = TinkoffPayStatusPayload;

    fn path(&self) -> String {
        format!("v2/TinkoffPay/terminals/{}/status", self.terminal_key)
    }

    fn method(&self) -> Method {
        Method::GET
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        Ok(Map::new())
    }

    fn token_formation(&self) -> TokenFormation {
        TokenFormation::None
    }
}

/// `v2/TinkoffPay/transactions/{PaymentId}/versions/{version}/link`
#[derive(Debug, Clone)]
pub struct GetTinkoffPayLinkRequest {
    pub payment_id: PaymentId,
    pub version: String,
}

impl AcquiringRequest for GetTinkoffPayLinkRequest {
    type Payload = TinkoffPayLinkPayload;

    fn path(&self) -> String {
        format!(
            "v2/TinkoffPay/transactions/{}/versions/{}/link",
            self.payment_id, self.version
        )
    }

    fn method(&self) -> Method {
        Method::GET
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        Ok(Map::new())
    }

    fn token_formation(&self) -> TokenFormation {
        TokenFormation::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetQrData {
    #[serde(rename = "PaymentId")]
    pub payment_id: PaymentId,
    #[serde(rename = "DataType")]
    pub data_type: QrDataType,
}

/// `v2/GetQr`
#[derive(Debug, Clone)]
pub struct GetQrRequest {
    pub data: GetQrData,
}

impl AcquiringRequest for GetQrRequest {
    type Payload = GetQrPayload;

    fn path(&self) -> String {
        "v2/GetQr".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        to_parameters(&self.data)
    }
}

/// `v2/GetTerminalPayMethods`
#[derive(Debug, Clone)]
pub struct GetTerminalPayMethodsRequest {
    pub terminal_key: String,
}

impl AcquiringRequest for GetTerminalPayMethodsRequest {
    type Payload = GetTerminalPayMethodsPayload;

    fn path(&self) -> String {
        "v2/GetTerminalPayMethods".into()
    }

    fn method(&self) -> Method {
        Method::GET
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        let mut parameters = Map::new();
        parameters.insert(keys::TERMINAL_KEY.into(), self.terminal_key.as_str().into());
        parameters.insert("PaySource".into(), "SDK".into());
        Ok(parameters)
    }

    fn token_formation(&self) -> TokenFormation {
        TokenFormation::None
    }
}

/// SBP participants dictionary, served outside the acquiring API.
#[derive(Debug, Clone)]
pub struct GetSbpBanksRequest {
    pub url: String,
}

impl AcquiringRequest for GetSbpBanksRequest {
    type Payload = GetSbpBanksPayload;

    fn path(&self) -> String {
        self.url.clone()
    }

    fn method(&self) -> Method {
        Method::GET
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        Ok(Map::new())
    }

    fn token_formation(&self) -> TokenFormation {
        TokenFormation::None
    }

    fn decode_strategy(&self) -> DecodeStrategy {
        DecodeStrategy::Raw
    }
}
