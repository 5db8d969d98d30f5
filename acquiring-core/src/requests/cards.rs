//! Saved card management

use crate::error::AcquiringResult;
use crate::keys;
use crate::models::{AddCardPayload, AttachCardPayload, CheckType, PaymentCard, RemoveCardPayload};
use crate::request::{AcquiringRequest, DecodeStrategy, to_parameters};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddCardData {
    #[serde(rename = "CustomerKey")]
    pub customer_key: String,
    #[serde(rename = "CheckType")]
    pub check_type: CheckType,
}

/// `v2/AddCard`
#[derive(Debug, Clone)]
pub struct AddCardRequest {
    pub data: AddCardData,
}

impl AcquiringRequest for AddCardRequest {
    type Payload = AddCardPayload;

    fn path(&self) -> String {
        "v2/AddCard".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        to_parameters(&self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachCardData {
    #[serde(rename = "RequestKey")]
    pub request_key: String,
    /// Encoded card data.
    #[serde(rename = "CardData")]
    pub card_data: String,
    #[serde(rename = "DATA", skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

/// `v2/AttachCard`
#[derive(Debug, Clone)]
pub struct AttachCardRequest {
    pub data: AttachCardData,
}

impl AcquiringRequest for AttachCardRequest {
    type Payload = AttachCardPayload;

    fn path(&self) -> String {
        "v2/AttachCard".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        to_parameters(&self.data)
    }
}

/// `v2/GetCardList`, answered with a bare array.
#[derive(Debug, Clone)]
pub struct GetCardListRequest {
    pub customer_key: String,
}

impl AcquiringRequest for GetCardListRequest {
    type Payload = Vec<PaymentCard>;

    fn path(&self) -> String {
        "v2/GetCardList".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        let mut parameters = Map::new();
        parameters.insert(keys::CUSTOMER_KEY.into(), self.customer_key.as_str().into());
        Ok(parameters)
    }

    fn decode_strategy(&self) -> DecodeStrategy {
        DecodeStrategy::Clipped
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveCardData {
    #[serde(rename = "CardId")]
    pub card_id: String,
    #[serde(rename = "CustomerKey")]
    pub customer_key: String,
}

/// `v2/RemoveCard`
#[derive(Debug, Clone)]
pub struct RemoveCardRequest {
    pub data: RemoveCardData,
}

impl AcquiringRequest for RemoveCardRequest {
    type Payload = RemoveCardPayload;

    fn path(&self) -> String {
        "v2/RemoveCard".into()
    }

    fn parameters(&self) -> AcquiringResult<Map<String, Value>> {
        to_parameters(&self.data)
    }
}
