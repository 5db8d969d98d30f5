//! What is being paid for

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payment stage scheme of the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayType {
    /// Authorization and capture in one step.
    #[serde(rename = "O")]
    OneStage,
    /// Authorization now, capture later.
    #[serde(rename = "T")]
    TwoStage,
}

/// Order being paid. Amounts are in minor units (kopecks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderOptions {
    pub order_id: String,
    pub amount: i64,
    pub description: Option<String>,
    /// Register the payment as a parent for later recurring charges.
    pub save_as_parent: bool,
    pub pay_type: Option<PayType>,
    pub receipt: Option<serde_json::Value>,
    pub shops: Option<Vec<serde_json::Value>>,
    pub receipts: Option<Vec<serde_json::Value>>,
    /// Merchant key/values sent in `DATA`.
    pub additional_data: BTreeMap<String, String>,
}

impl OrderOptions {
    pub fn new(order_id: impl Into<String>, amount: i64) -> Self {
        Self {
            order_id: order_id.into(),
            amount,
            description: None,
            save_as_parent: false,
            pay_type: None,
            receipt: None,
            shops: None,
            receipts: None,
            additional_data: BTreeMap::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn save_as_parent(mut self) -> Self {
        self.save_as_parent = true;
        self
    }

    pub fn pay_type(mut self, pay_type: PayType) -> Self {
        self.pay_type = Some(pay_type);
        self
    }

    pub fn receipt(mut self, receipt: serde_json::Value) -> Self {
        self.receipt = Some(receipt);
        self
    }

    pub fn additional_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_data.insert(key.into(), value.into());
        self
    }
}

/// Customer the payment belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerOptions {
    pub customer_key: Option<String>,
    pub email: Option<String>,
}

impl CustomerOptions {
    pub fn new(customer_key: impl Into<String>) -> Self {
        Self {
            customer_key: Some(customer_key.into()),
            email: None,
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Payment intent: immutable once handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOptions {
    pub order: OrderOptions,
    pub customer: CustomerOptions,
}

impl PaymentOptions {
    pub fn new(order: OrderOptions, customer: CustomerOptions) -> Self {
        Self { order, customer }
    }
}

/// `Init` request parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentInitData {
    #[serde(rename = "Amount")]
    pub amount: i64,
    #[serde(rename = "OrderId")]
    pub order_id: String,
    #[serde(rename = "CustomerKey", skip_serializing_if = "Option::is_none")]
    pub customer_key: Option<String>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Recurrent", skip_serializing_if = "Option::is_none")]
    pub recurrent: Option<String>,
    #[serde(rename = "PayType", skip_serializing_if = "Option::is_none")]
    pub pay_type: Option<PayType>,
    #[serde(rename = "DATA", skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(rename = "Receipt", skip_serializing_if = "Option::is_none")]
    pub receipt: Option<serde_json::Value>,
    #[serde(rename = "Shops", skip_serializing_if = "Option::is_none")]
    pub shops: Option<Vec<serde_json::Value>>,
    #[serde(rename = "Receipts", skip_serializing_if = "Option::is_none")]
    pub receipts: Option<Vec<serde_json::Value>>,
}

impl PaymentInitData {
    /// Merge extra `DATA` entries; later values win.
    pub fn adding_data(mut self, data: &BTreeMap<String, String>) -> Self {
        self.data
            .extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }
}

impl From<&PaymentOptions> for PaymentInitData {
    fn from(options: &PaymentOptions) -> Self {
        let order = &options.order;
        Self {
            amount: order.amount,
            order_id: order.order_id.clone(),
            customer_key: options.customer.customer_key.clone(),
            description: order.description.clone(),
            recurrent: order.save_as_parent.then(|| "Y".to_string()),
            pay_type: order.pay_type,
            data: order.additional_data.clone(),
            receipt: order.receipt.clone(),
            shops: order.shops.clone(),
            receipts: order.receipts.clone(),
        }
    }
}
