//! 3-D Secure data exchanged with the backend

use crate::models::{GetPaymentStatePayload, PaymentId, PaymentStatus};
use serde::{Deserialize, Serialize, Serializer};

/// Challenge interfaces the 3DS SDK can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkInterface {
    Native,
    Html,
    Both,
}

impl SdkInterface {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Native => "01",
            Self::Html => "02",
            Self::Both => "03",
        }
    }
}

impl Serialize for SdkInterface {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Device fingerprint sent with `FinishAuthorize` in `DATA`.
///
/// Fields prefixed with `sdk` belong to the app-based flow, the rest to the
/// browser flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreeDSDeviceInfo {
    /// `Y` completed, `N` failed or did not run, `U` no 3DS method URL.
    #[serde(rename = "threeDSCompInd")]
    pub three_ds_comp_ind: String,
    #[serde(rename = "javaEnabled")]
    pub java_enabled: String,
    #[serde(rename = "colorDepth")]
    pub color_depth: u32,
    pub language: String,
    /// Offset from UTC in minutes.
    pub timezone: i32,
    #[serde(rename = "screen_height")]
    pub screen_height: u32,
    #[serde(rename = "screen_width")]
    pub screen_width: u32,
    #[serde(rename = "cresCallbackUrl")]
    pub cres_callback_url: String,
    #[serde(rename = "sdkAppID", skip_serializing_if = "Option::is_none")]
    pub sdk_app_id: Option<String>,
    #[serde(rename = "sdkEphemPubKey", skip_serializing_if = "Option::is_none")]
    pub sdk_ephem_pub_key: Option<String>,
    #[serde(rename = "sdkReferenceNumber", skip_serializing_if = "Option::is_none")]
    pub sdk_reference_number: Option<String>,
    #[serde(rename = "sdkTransID", skip_serializing_if = "Option::is_none")]
    pub sdk_trans_id: Option<String>,
    /// Minutes, two digits, at least `05`.
    #[serde(rename = "sdkMaxTimeout", skip_serializing_if = "Option::is_none")]
    pub sdk_max_timeout: Option<String>,
    #[serde(rename = "sdkEncData", skip_serializing_if = "Option::is_none")]
    pub sdk_enc_data: Option<String>,
    #[serde(rename = "sdkInterface")]
    pub sdk_interface: SdkInterface,
    #[serde(rename = "sdkUiType")]
    pub sdk_ui_type: String,
}

/// `Check3dsVersion` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Check3DSVersionPayload {
    #[serde(rename = "Version", default)]
    pub version: Option<String>,
    #[serde(rename = "TdsServerTransID", default)]
    pub tds_server_trans_id: Option<String>,
    #[serde(rename = "ThreeDSMethodURL", default)]
    pub three_ds_method_url: Option<String>,
    #[serde(rename = "PaymentSystem", default)]
    pub payment_system: Option<String>,
}

impl Check3DSVersionPayload {
    /// 3DS protocol generation announced by the issuer.
    pub fn major_version(&self) -> Option<u32> {
        self.version
            .as_deref()
            .and_then(|v| v.split('.').next())
            .and_then(|major| major.trim().parse().ok())
    }
}

/// Legacy browser challenge data (3DS v1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation3DSData {
    pub acs_url: String,
    pub pa_req: String,
    pub md: String,
}

/// Browser challenge data (3DS v2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation3DSDataACS {
    pub acs_url: String,
    pub acs_trans_id: String,
    pub tds_server_trans_id: String,
}

/// App-based challenge data (3DS v2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation3DS2AppBasedData {
    pub acs_signed_content: String,
    pub acs_trans_id: String,
    pub tds_server_trans_id: String,
    pub acs_ref_number: String,
}

/// What `FinishAuthorize` (or `Charge`) asks the client to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishAuthorizeStatus {
    /// No challenge; the state is as reported.
    Done(GetPaymentStatePayload),
    NeedConfirmation3DS(Confirmation3DSData),
    NeedConfirmation3DSACS(Confirmation3DSDataACS),
    NeedConfirmation3DS2AppBased(Confirmation3DS2AppBasedData),
    /// `3DS_CHECKING` without a recognisable challenge description.
    Unknown,
}

/// `FinishAuthorize` / `Charge` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAuthorizationResponse")]
pub struct FinishAuthorizePayload {
    pub status: FinishAuthorizeStatus,
    pub payment_status: PaymentStatus,
    pub rebill_id: Option<String>,
    pub card_id: Option<String>,
}

/// `Charge` answers in the same shape as `FinishAuthorize`.
pub type ChargePayload = FinishAuthorizePayload;

#[derive(Deserialize)]
struct RawAuthorizationResponse {
    #[serde(rename = "PaymentId")]
    payment_id: PaymentId,
    #[serde(rename = "Amount", default)]
    amount: i64,
    #[serde(rename = "OrderId", default)]
    order_id: String,
    #[serde(rename = "Status", default)]
    status: PaymentStatus,
    #[serde(rename = "RebillId", default, deserialize_with = "crate::error::optional_string_or_number")]
    rebill_id: Option<String>,
    #[serde(rename = "CardId", default, deserialize_with = "crate::error::optional_string_or_number")]
    card_id: Option<String>,
    #[serde(rename = "ACSUrl", default)]
    acs_url: Option<String>,
    #[serde(rename = "PaReq", default)]
    pa_req: Option<String>,
    #[serde(rename = "MD", default)]
    md: Option<String>,
    #[serde(rename = "AcsTransId", default)]
    acs_trans_id: Option<String>,
    #[serde(rename = "TdsServerTransId", default)]
    tds_server_trans_id: Option<String>,
    #[serde(rename = "AcsSignedContent", default)]
    acs_signed_content: Option<String>,
    #[serde(rename = "AcsReferenceNumber", default)]
    acs_ref_number: Option<String>,
}

impl From<RawAuthorizationResponse> for FinishAuthorizePayload {
    fn from(raw: RawAuthorizationResponse) -> Self {
        let status = if raw.status == PaymentStatus::ThreeDsChecking {
            challenge_status(&raw)
        } else {
            FinishAuthorizeStatus::Done(GetPaymentStatePayload {
                payment_id: raw.payment_id.clone(),
                amount: raw.amount,
                order_id: raw.order_id.clone(),
                status: raw.status,
            })
        };

        Self {
            status,
            payment_status: raw.status,
            rebill_id: raw.rebill_id,
            card_id: raw.card_id,
        }
    }
}

fn challenge_status(raw: &RawAuthorizationResponse) -> FinishAuthorizeStatus {
    if let (Some(content), Some(acs_trans_id), Some(tds_id), Some(ref_number)) = (
        &raw.acs_signed_content,
        &raw.acs_trans_id,
        &raw.tds_server_trans_id,
        &raw.acs_ref_number,
    ) {
        return FinishAuthorizeStatus::NeedConfirmation3DS2AppBased(Confirmation3DS2AppBasedData {
            acs_signed_content: content.clone(),
            acs_trans_id: acs_trans_id.clone(),
            tds_server_trans_id: tds_id.clone(),
            acs_ref_number: ref_number.clone(),
        });
    }

    if let (Some(acs_url), Some(pa_req), Some(md)) = (&raw.acs_url, &raw.pa_req, &raw.md) {
        return FinishAuthorizeStatus::NeedConfirmation3DS(Confirmation3DSData {
            acs_url: acs_url.clone(),
            pa_req: pa_req.clone(),
            md: md.clone(),
        });
    }

    if let (Some(acs_url), Some(acs_trans_id), Some(tds_id)) =
        (&raw.acs_url, &raw.acs_trans_id, &raw.tds_server_trans_id)
    {
        return FinishAuthorizeStatus::NeedConfirmation3DSACS(Confirmation3DSDataACS {
            acs_url: acs_url.clone(),
            acs_trans_id: acs_trans_id.clone(),
            tds_server_trans_id: tds_id.clone(),
        });
    }

    FinishAuthorizeStatus::Unknown
}
