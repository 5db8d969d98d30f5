//! Alternative payment methods: TinkoffPay, SBP and the terminal's method list

use crate::models::PaymentId;
use serde::{Deserialize, Deserializer, Serialize};

/// `TinkoffPay/terminals/{key}/status` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTinkoffPayStatus")]
pub enum TinkoffPayStatusPayload {
    Allowed { version: String },
    Disallowed,
}

#[derive(Deserialize)]
struct RawTinkoffPayStatus {
    #[serde(rename = "Params", default)]
    params: Option<RawTinkoffPayParams>,
}

#[derive(Deserialize)]
struct RawTinkoffPayParams {
    #[serde(rename = "Allowed", default)]
    allowed: bool,
    #[serde(rename = "Version", default)]
    version: Option<String>,
}

impl From<RawTinkoffPayStatus> for TinkoffPayStatusPayload {
    fn from(raw: RawTinkoffPayStatus) -> Self {
        match raw.params {
            Some(RawTinkoffPayParams {
                allowed: true,
                version: Some(version),
            }) => Self::Allowed { version },
            _ => Self::Disallowed,
        }
    }
}

/// `TinkoffPay/transactions/{id}/versions/{v}/link` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TinkoffPayLinkPayload {
    #[serde(rename = "Params")]
    pub params: TinkoffPayLinkParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TinkoffPayLinkParams {
    #[serde(rename = "RedirectUrl")]
    pub redirect_url: String,
}

/// What `GetQr` should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum QrDataType {
    /// Payment link for the bank app.
    #[default]
    #[serde(rename = "PAYLOAD")]
    Payload,
    /// SVG image of the QR code.
    #[serde(rename = "IMAGE")]
    Image,
}

/// `GetQr` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetQrPayload {
    #[serde(rename = "Data")]
    pub data: String,
    #[serde(rename = "PaymentId")]
    pub payment_id: PaymentId,
    #[serde(rename = "OrderId", default)]
    pub order_id: Option<String>,
}

/// A bank from the SBP (Faster Payments System) participants dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SbpBank {
    #[serde(rename = "bankName")]
    pub name: String,
    #[serde(rename = "logoURL", default)]
    pub logo_url: Option<String>,
    /// URL scheme of the bank app.
    pub schema: String,
}

/// SBP participants dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetSbpBanksPayload {
    #[serde(default)]
    pub version: Option<String>,
    pub dictionary: Vec<SbpBank>,
}

/// A payment method enabled on the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayMethod {
    TinkoffPay { version: String },
    YandexPay { merchant_id: Option<String>, showcase_id: Option<String> },
    Sbp,
    MirPay,
    Other(String),
}

impl<'de> Deserialize<'de> for PayMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(rename = "PayMethod")]
            method: String,
            #[serde(rename = "Params", default)]
            params: serde_json::Map<String, serde_json::Value>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let param = |key: &str| {
            raw.params
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        Ok(match raw.method.as_str() {
            "TinkoffPay" => Self::TinkoffPay {
                version: param("Version").unwrap_or_default(),
            },
            "YandexPay" => Self::YandexPay {
                merchant_id: param("MerchantId"),
                showcase_id: param("ShowcaseId"),
            },
            "SBP" => Self::Sbp,
            "MirPay" => Self::MirPay,
            other => Self::Other(other.to_string()),
        })
    }
}

/// Terminal capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TerminalInfo {
    #[serde(rename = "Paymethods", default)]
    pub pay_methods: Vec<PayMethod>,
    #[serde(rename = "AddCardScheme", default)]
    pub add_card_scheme: bool,
}

/// `GetTerminalPayMethods` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetTerminalPayMethodsPayload {
    #[serde(rename = "TerminalInfo")]
    pub terminal_info: TerminalInfo,
}
