//! The request abstraction every endpoint implements

use crate::error::{AcquiringError, AcquiringResult};
use crate::token::TokenFormation;
use acquiring_http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// How a response body becomes a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeStrategy {
    /// Object envelope with a `Success` flag; the payload shares the object.
    #[default]
    Standard,
    /// Bare array on success; an object with `Success: false` on failure.
    Clipped,
    /// No envelope at all. Used for dictionaries served outside the API.
    Raw,
}

/// An acquiring API operation.
///
/// Parameters are a flat JSON object. `TerminalKey` and `Token` are attached
/// by [`AcquiringApi`](crate::AcquiringApi) for signed requests; GET requests
/// send their parameters in the query string.
pub trait AcquiringRequest: Send + Sync {
    /// Decoded success payload.
    type Payload: DeserializeOwned + Send;

    /// Path relative to the API base URL, or an absolute URL.
    fn path(&self) -> String;

    fn method(&self) -> Method {
        Method::POST
    }

    /// Request parameters, without `TerminalKey` and `Token`.
    fn parameters(&self) -> AcquiringResult<Map<String, Value>>;

    fn token_formation(&self) -> TokenFormation {
        TokenFormation::SIGNED
    }

    fn decode_strategy(&self) -> DecodeStrategy {
        DecodeStrategy::Standard
    }
}

/// Serialize a parameter struct into a flat JSON object.
pub(crate) fn to_parameters<T: Serialize>(value: &T) -> AcquiringResult<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AcquiringError::InvalidRequest(format!(
            "parameters must be an object, got {}",
            other
        ))),
        Err(e) => Err(AcquiringError::InvalidRequest(e.to_string())),
    }
}
