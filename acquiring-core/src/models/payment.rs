//! Payment identifiers, statuses and state payloads

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Backend-assigned payment identifier.
///
/// The backend sends it either as a string or as a number; both decode to the
/// same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaymentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PaymentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Serialize for PaymentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PaymentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            String(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::String(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// Payment status reported by the backend.
///
/// Any string this SDK does not know decodes to [`PaymentStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaymentStatus {
    New,
    FormShowed,
    Preauthorizing,
    Authorizing,
    ThreeDsChecking,
    ThreeDsChecked,
    AuthFail,
    Authorized,
    Confirming,
    Confirmed,
    Reversing,
    PartialReversed,
    Reversed,
    Refunding,
    PartialRefunded,
    Refunded,
    Rejected,
    Canceled,
    DeadlineExpired,
    #[default]
    Unknown,
}

impl PaymentStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::FormShowed => "FORM_SHOWED",
            Self::Preauthorizing => "PREAUTHORIZING",
            Self::Authorizing => "AUTHORIZING",
            Self::ThreeDsChecking => "3DS_CHECKING",
            Self::ThreeDsChecked => "3DS_CHECKED",
            Self::AuthFail => "AUTH_FAIL",
            Self::Authorized => "AUTHORIZED",
            Self::Confirming => "CONFIRMING",
            Self::Confirmed => "CONFIRMED",
            Self::Reversing => "REVERSING",
            Self::PartialReversed => "PARTIAL_REVERSED",
            Self::Reversed => "REVERSED",
            Self::Refunding => "REFUNDING",
            Self::PartialRefunded => "PARTIAL_REFUNDED",
            Self::Refunded => "REFUNDED",
            Self::Rejected => "REJECTED",
            Self::Canceled => "CANCELED",
            Self::DeadlineExpired => "DEADLINE_EXPIRED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Money is held or captured.
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Authorized | Self::Confirmed)
    }

    /// The payment will not move any further on its own.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Authorized
                | Self::Confirmed
                | Self::Rejected
                | Self::Canceled
                | Self::DeadlineExpired
        )
    }
}

impl From<&str> for PaymentStatus {
    fn from(value: &str) -> Self {
        match value {
            "NEW" => Self::New,
            "FORM_SHOWED" => Self::FormShowed,
            "PREAUTHORIZING" => Self::Preauthorizing,
            "AUTHORIZING" => Self::Authorizing,
            "3DS_CHECKING" => Self::ThreeDsChecking,
            "3DS_CHECKED" => Self::ThreeDsChecked,
            "AUTH_FAIL" => Self::AuthFail,
            "AUTHORIZED" => Self::Authorized,
            "CONFIRMING" => Self::Confirming,
            "CONFIRMED" => Self::Confirmed,
            "REVERSING" => Self::Reversing,
            "PARTIAL_REVERSED" => Self::PartialReversed,
            "REVERSED" => Self::Reversed,
            "REFUNDING" => Self::Refunding,
            "PARTIAL_REFUNDED" => Self::PartialRefunded,
            "REFUNDED" => Self::Refunded,
            "REJECTED" => Self::Rejected,
            "CANCELED" => Self::Canceled,
            "DEADLINE_EXPIRED" => Self::DeadlineExpired,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(serde_json::Value::String(s)) => Self::from(s.as_str()),
            _ => Self::Unknown,
        })
    }
}

/// `Init` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InitPayload {
    #[serde(rename = "Amount")]
    pub amount: i64,
    #[serde(rename = "OrderId")]
    pub order_id: String,
    #[serde(rename = "PaymentId")]
    pub payment_id: PaymentId,
    #[serde(rename = "Status", default)]
    pub status: PaymentStatus,
}

/// `GetState` response payload; also what 3DS submission returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPaymentStatePayload {
    #[serde(rename = "PaymentId")]
    pub payment_id: PaymentId,
    #[serde(rename = "Amount", default)]
    pub amount: i64,
    #[serde(rename = "OrderId", default)]
    pub order_id: String,
    #[serde(rename = "Status", default)]
    pub status: PaymentStatus,
}
