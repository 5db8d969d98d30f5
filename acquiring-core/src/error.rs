//! Error types for the acquiring API

use acquiring_http::NetworkError;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Acquiring API error types
#[derive(Error, Debug)]
pub enum AcquiringError {
    /// Transport failure: connectivity, timeout, HTTP status
    #[error("Transport error: {0}")]
    Transport(#[from] NetworkError),

    /// Backend answered with `Success: false`
    #[error("{0}")]
    Api(#[from] APIFailureError),

    /// Body was not a well-formed envelope for this request
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Token could not be produced
    #[error("Token provider error: {0}")]
    Token(String),

    /// Operation was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,
}

impl AcquiringError {
    /// Connectivity problems may be retried by the caller; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_retryable())
    }

    /// The backend-reported failure, if this is one.
    pub fn api_failure(&self) -> Option<&APIFailureError> {
        match self {
            Self::Api(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AcquiringError {
    fn from(err: serde_json::Error) -> Self {
        AcquiringError::InvalidResponse(err.to_string())
    }
}

/// Result type for acquiring operations
pub type AcquiringResult<T> = Result<T, AcquiringError>;

/// Business failure reported by the backend.
///
/// The whole `Success: false` object decodes into this; operation-specific
/// fields are ignored. `Message` wins over `ErrorMessage` and `Details` over
/// `ErrorDetails` when a body carries both.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Error)]
#[serde(from = "ApiFailureBody")]
#[error("API failure {error_code}: {}", .error_message.as_deref().unwrap_or("no message"))]
pub struct APIFailureError {
    pub error_code: i64,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
    pub terminal_key: Option<String>,
    pub status: Option<String>,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub amount: Option<i64>,
}

#[derive(Deserialize)]
struct ApiFailureBody {
    #[serde(rename = "ErrorCode", deserialize_with = "code_from_string_or_number")]
    error_code: i64,
    #[serde(rename = "Message", default)]
    message: Option<String>,
    #[serde(rename = "ErrorMessage", default)]
    error_message: Option<String>,
    #[serde(rename = "Details", default)]
    details: Option<String>,
    #[serde(rename = "ErrorDetails", default)]
    error_details: Option<String>,
    #[serde(rename = "TerminalKey", default)]
    terminal_key: Option<String>,
    #[serde(rename = "Status", default)]
    status: Option<String>,
    #[serde(rename = "OrderId", default)]
    order_id: Option<String>,
    #[serde(rename = "PaymentId", default, deserialize_with = "optional_string_or_number")]
    payment_id: Option<String>,
    #[serde(rename = "Amount", default)]
    amount: Option<i64>,
}

impl From<ApiFailureBody> for APIFailureError {
    fn from(body: ApiFailureBody) -> Self {
        Self {
            error_code: body.error_code,
            error_message: body.message.or(body.error_message),
            error_details: body.details.or(body.error_details),
            terminal_key: body.terminal_key,
            status: body.status,
            order_id: body.order_id,
            payment_id: body.payment_id,
            amount: body.amount,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(i64),
}

fn code_from_string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

pub(crate) fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(String),

    #[error("Invalid configuration value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_decodes_string_code() {
        let failure: APIFailureError = serde_json::from_str(
            r#"{"Success":false,"ErrorCode":"104","Message":"Need repeat","Details":"retry with card"}"#,
        )
        .unwrap();
        assert_eq!(failure.error_code, 104);
        assert_eq!(failure.error_message.as_deref(), Some("Need repeat"));
        assert_eq!(failure.error_details.as_deref(), Some("retry with card"));
    }

    #[test]
    fn test_failure_decodes_numeric_code_and_payment_id() {
        let failure: APIFailureError =
            serde_json::from_str(r#"{"ErrorCode":9999,"PaymentId":13660}"#).unwrap();
        assert_eq!(failure.error_code, 9999);
        assert_eq!(failure.payment_id.as_deref(), Some("13660"));
        assert_eq!(failure.error_message, None);
    }

    #[test]
    fn test_failure_with_both_message_keys_prefers_message() {
        let failure: APIFailureError = serde_json::from_str(
            r#"{"ErrorCode":"1051","Message":"Declined","ErrorMessage":"Insufficient funds","ErrorDetails":"limit"}"#,
        )
        .unwrap();
        assert_eq!(failure.error_code, 1051);
        assert_eq!(failure.error_message.as_deref(), Some("Declined"));
        assert_eq!(failure.error_details.as_deref(), Some("limit"));
    }

    #[test]
    fn test_failure_falls_back_to_error_message() {
        let failure: APIFailureError =
            serde_json::from_str(r#"{"ErrorCode":"7","ErrorMessage":"Unknown terminal"}"#).unwrap();
        assert_eq!(failure.error_message.as_deref(), Some("Unknown terminal"));
    }

    #[test]
    fn test_only_transport_errors_are_retryable() {
        let transport = AcquiringError::Transport(NetworkError::Connection("reset".into()));
        assert!(transport.is_retryable());
        assert!(!AcquiringError::InvalidResponse("eof".into()).is_retryable());
        assert!(!AcquiringError::Cancelled.is_retryable());
    }
}
