//! Saved cards

use crate::models::PaymentId;
use serde::{Deserialize, Serialize};

/// Lifecycle of a saved card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CardStatus {
    #[serde(rename = "A")]
    Active,
    #[serde(rename = "I")]
    Inactive,
    #[serde(rename = "D")]
    Deleted,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Verification performed when a card is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum CheckType {
    /// Card is saved without a check.
    #[default]
    #[serde(rename = "NO")]
    No,
    /// Check with a hold of 1 RUB.
    #[serde(rename = "HOLD")]
    Hold,
    /// Check with 3-D Secure.
    #[serde(rename = "3DS")]
    ThreeDs,
    /// Check with 3-D Secure and a hold.
    #[serde(rename = "3DSHOLD")]
    ThreeDsHold,
}

/// An item of `GetCardList`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentCard {
    #[serde(rename = "Pan")]
    pub pan: String,
    #[serde(rename = "CardId", deserialize_with = "crate::error::string_or_number")]
    pub card_id: String,
    #[serde(rename = "Status", default)]
    pub status: CardStatus,
    #[serde(rename = "RebillId", default, deserialize_with = "crate::error::optional_string_or_number")]
    pub rebill_id: Option<String>,
    #[serde(rename = "CardType", default)]
    pub card_type: Option<i64>,
    #[serde(rename = "ExpDate", default)]
    pub exp_date: Option<String>,
}

impl PaymentCard {
    pub fn is_active(&self) -> bool {
        self.status == CardStatus::Active
    }
}

/// `AddCard` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddCardPayload {
    #[serde(rename = "RequestKey")]
    pub request_key: String,
    #[serde(rename = "PaymentId", default)]
    pub payment_id: Option<PaymentId>,
    #[serde(rename = "CustomerKey", default)]
    pub customer_key: Option<String>,
}

/// `AttachCard` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttachCardPayload {
    #[serde(rename = "RequestKey", default)]
    pub request_key: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "CustomerKey", default)]
    pub customer_key: Option<String>,
    #[serde(rename = "CardId", default, deserialize_with = "crate::error::optional_string_or_number")]
    pub card_id: Option<String>,
    #[serde(rename = "RebillId", default, deserialize_with = "crate::error::optional_string_or_number")]
    pub rebill_id: Option<String>,
    #[serde(rename = "ACSUrl", default)]
    pub acs_url: Option<String>,
    #[serde(rename = "PaReq", default)]
    pub pa_req: Option<String>,
    #[serde(rename = "MD", default)]
    pub md: Option<String>,
}

impl AttachCardPayload {
    /// The card is attached only after a 3-D Secure challenge.
    pub fn needs_confirmation(&self) -> bool {
        self.status.as_deref() == Some("3DS_CHECKING")
    }
}

/// `RemoveCard` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoveCardPayload {
    #[serde(rename = "CardId", deserialize_with = "crate::error::string_or_number")]
    pub card_id: String,
    #[serde(rename = "Status", default)]
    pub card_status: CardStatus,
    #[serde(rename = "CustomerKey", default)]
    pub customer_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_list_item() {
        let card: PaymentCard = serde_json::from_str(
            r#"{"Pan":"430000******0777","CardId":"4750","Status":"A","RebillId":130799909,"CardType":0,"ExpDate":"1122"}"#,
        )
        .unwrap();
        assert_eq!(card.card_id, "4750");
        assert_eq!(card.rebill_id.as_deref(), Some("130799909"));
        assert!(card.is_active());
    }

    #[test]
    fn test_unknown_card_status() {
        let card: PaymentCard =
            serde_json::from_str(r#"{"Pan":"430000******0777","CardId":1,"Status":"X"}"#).unwrap();
        assert_eq!(card.status, CardStatus::Unknown);
        assert_eq!(card.card_id, "1");
    }

    #[test]
    fn test_check_type_wire_names() {
        assert_eq!(serde_json::to_value(CheckType::ThreeDsHold).unwrap(), "3DSHOLD");
        assert_eq!(serde_json::to_value(CheckType::No).unwrap(), "NO");
    }

    #[test]
    fn test_attach_card_needs_confirmation() {
        let payload: AttachCardPayload = serde_json::from_str(
            r#"{"RequestKey":"rk","Status":"3DS_CHECKING","ACSUrl":"https://acs","PaReq":"p","MD":"m"}"#,
        )
        .unwrap();
        assert!(payload.needs_confirmation());
    }
}
