//! 3DS v2 CReq / CRes messages, base64url encoded without padding

use crate::error::{ChallengeError, PaymentResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CReq<'a> {
    #[serde(rename = "threeDSServerTransID")]
    three_ds_server_trans_id: &'a str,
    #[serde(rename = "acsTransID")]
    acs_trans_id: &'a str,
    message_version: &'a str,
    challenge_window_size: &'a str,
    message_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CRes<'a> {
    #[serde(rename = "threeDSServerTransID")]
    three_ds_server_trans_id: &'a str,
    #[serde(rename = "acsTransID")]
    acs_trans_id: &'a str,
    message_version: &'a str,
    message_type: &'a str,
    trans_status: &'a str,
}

/// Challenge request for a browser challenge. Window size `05` is full screen.
pub fn creq(
    tds_server_trans_id: &str,
    acs_trans_id: &str,
    message_version: &str,
) -> PaymentResult<String> {
    encode(&CReq {
        three_ds_server_trans_id: tds_server_trans_id,
        acs_trans_id,
        message_version,
        challenge_window_size: "05",
        message_type: "CReq",
    })
}

/// Challenge response reported by a finished app-based challenge.
pub fn cres(
    tds_server_trans_id: &str,
    acs_trans_id: &str,
    message_version: &str,
    trans_status: &str,
) -> PaymentResult<String> {
    encode(&CRes {
        three_ds_server_trans_id: tds_server_trans_id,
        acs_trans_id,
        message_version,
        message_type: "CRes",
        trans_status,
    })
}

fn encode<T: Serialize>(message: &T) -> PaymentResult<String> {
    let json = serde_json::to_vec(message)
        .map_err(|e| ChallengeError::Protocol(format!("cannot encode challenge message: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}
