//! Request signing
//!
//! Every signed request carries a `Token`: the lowercase hex SHA-256 digest of
//! the request's scalar parameters, ordered by key and concatenated as
//! `key=value`, followed by the terminal password. Nested objects and arrays
//! never take part, and neither do the keys in [`COMMON_IGNORED_KEYS`].

use crate::error::{AcquiringError, AcquiringResult};
use crate::keys;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Keys never signed, compared case-insensitively.
pub const COMMON_IGNORED_KEYS: [&str; 4] = [keys::DATA, keys::RECEIPT, keys::RECEIPTS, keys::SHOPS];

/// Whether and how a request is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormation {
    /// Request goes out without `TerminalKey` and `Token`.
    None,
    /// Signed; `ignored` keys are left out on top of the common ones.
    Signed { ignored: &'static [&'static str] },
}

impl TokenFormation {
    /// Signed with the common exclusions only.
    pub const SIGNED: Self = Self::Signed { ignored: &[] };

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed { .. })
    }
}

/// Parameters that take part in the token, ordered by key.
pub fn parameters_for_token(
    parameters: &Map<String, Value>,
    ignored: &[&str],
) -> BTreeMap<String, String> {
    parameters
        .iter()
        .filter(|(key, _)| key.as_str() != keys::TOKEN)
        .filter(|(key, _)| {
            !COMMON_IGNORED_KEYS
                .iter()
                .chain(ignored.iter())
                .any(|ignored| ignored.eq_ignore_ascii_case(key))
        })
        .filter_map(|(key, value)| scalar(value).map(|value| (key.clone(), value)))
        .collect()
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Produces the `Token` value for a request.
///
/// The default [`PasswordTokenProvider`] keeps the terminal password on the
/// device; integrations that keep it on their backend sign there instead.
///
/// ```
/// use acquiring_core::token::{parameters_for_token, PasswordTokenProvider, TokenProvider};
/// use secrecy::SecretString;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let request = json!({"TerminalKey": "TestSDK", "PaymentId": "999", "DATA": {"a": "b"}});
/// let parameters = parameters_for_token(request.as_object().unwrap(), &[]);
/// assert_eq!(parameters.len(), 2);
///
/// let provider = PasswordTokenProvider::new(SecretString::from("secret"));
/// let token = provider.provide_token(&parameters).await.unwrap();
/// assert_eq!(token.len(), 64);
/// # });
/// ```
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// `parameters` are already filtered and ordered by key.
    async fn provide_token(&self, parameters: &BTreeMap<String, String>) -> AcquiringResult<String>;
}

/// SHA-256 signing with the terminal password.
#[derive(Clone)]
pub struct PasswordTokenProvider {
    password: SecretString,
}

impl PasswordTokenProvider {
    pub fn new(password: SecretString) -> Self {
        Self { password }
    }

    /// Digest for the given ordered parameters.
    pub fn sign(&self, parameters: &BTreeMap<String, String>) -> AcquiringResult<String> {
        let password = self.password.expose_secret();
        if password.is_empty() {
            return Err(AcquiringError::Token("terminal password is empty".into()));
        }

        let mut hasher = Sha256::new();
        for (key, value) in parameters {
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }
        hasher.update(password.as_bytes());

        Ok(hex::encode(hasher.finalize()))
    }
}

impl fmt::Debug for PasswordTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordTokenProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for PasswordTokenProvider {
    async fn provide_token(&self, parameters: &BTreeMap<String, String>) -> AcquiringResult<String> {
        self.sign(parameters)
    }
}
