//! Response envelope decoding

use crate::error::{APIFailureError, AcquiringError, AcquiringResult};
use crate::keys;
use crate::request::DecodeStrategy;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a response body according to `strategy`.
///
/// A `Success: false` envelope always yields [`AcquiringError::Api`]; payload
/// decoding is never attempted for it.
pub fn decode<P: DeserializeOwned>(body: &[u8], strategy: DecodeStrategy) -> AcquiringResult<P> {
    if strategy == DecodeStrategy::Raw {
        return Ok(serde_json::from_slice(body)?);
    }

    let value: Value = serde_json::from_slice(body)?;
    match (strategy, value) {
        (_, Value::Object(object)) => {
            let success = object.get(keys::SUCCESS).map(Value::as_bool);
            match success {
                Some(Some(false)) => Err(failure(Value::Object(object))),
                Some(Some(true)) if strategy == DecodeStrategy::Standard => {
                    Ok(serde_json::from_value(Value::Object(object))?)
                }
                Some(Some(true)) => Err(AcquiringError::InvalidResponse(
                    "expected an array for a successful response".into(),
                )),
                Some(None) => Err(AcquiringError::InvalidResponse(
                    "`Success` is not a boolean".into(),
                )),
                None => Err(AcquiringError::InvalidResponse(
                    "response has no `Success` flag".into(),
                )),
            }
        }
        (DecodeStrategy::Clipped, array @ Value::Array(_)) => Ok(serde_json::from_value(array)?),
        (_, other) => Err(AcquiringError::InvalidResponse(format!(
            "unexpected response shape: {}",
            shape(&other)
        ))),
    }
}

fn failure(value: Value) -> AcquiringError {
    match serde_json::from_value::<APIFailureError>(value) {
        Ok(failure) => AcquiringError::Api(failure),
        Err(e) => AcquiringError::InvalidResponse(format!("malformed failure envelope: {}", e)),
    }
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
