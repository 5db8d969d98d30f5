//! Payment sources and flows

use crate::error::{AcquiringError, AcquiringResult};
use crate::models::{CustomerOptions, PaymentId, PaymentOptions};
use base64::Engine;
use std::fmt;

/// Wallet that produced an encrypted payment token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletKind {
    ApplePay,
    YandexPay,
}

impl WalletKind {
    /// `Source` value sent with `FinishAuthorize`.
    pub fn source_name(&self) -> &'static str {
        match self {
            Self::ApplePay => "ApplePay",
            Self::YandexPay => "YandexPay",
        }
    }
}

/// Where the money comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum PaymentSourceData {
    /// Card entered by the user.
    CardNumber {
        number: String,
        expire_date: String,
        cvv: String,
    },
    /// Card saved for the customer.
    SavedCard { card_id: String, cvv: Option<String> },
    /// Wallet token, base64 encoded.
    PaymentData { base64_token: String, wallet: WalletKind },
    /// Recurring charge against a previously authorized payment.
    ParentPayment { rebill_id: String },
    /// Anything the SDK does not know how to pay with.
    Unknown,
}

impl PaymentSourceData {
    /// Card data string for `CardData`, if this source is a card.
    pub fn card_data(&self) -> Option<CardData> {
        match self {
            Self::CardNumber {
                number,
                expire_date,
                cvv,
            } => Some(CardData::Number {
                pan: number.clone(),
                expire_date: expire_date.clone(),
                cvv: cvv.clone(),
            }),
            Self::SavedCard { card_id, cvv } => Some(CardData::Saved {
                card_id: card_id.clone(),
                cvv: cvv.clone(),
            }),
            _ => None,
        }
    }

    /// Saved card id reported back to the delegate.
    pub fn card_id(&self) -> Option<&str> {
        match self {
            Self::SavedCard { card_id, .. } => Some(card_id),
            _ => None,
        }
    }

    /// Rebill id reported back to the delegate.
    pub fn rebill_id(&self) -> Option<&str> {
        match self {
            Self::ParentPayment { rebill_id } => Some(rebill_id),
            _ => None,
        }
    }
}

impl fmt::Debug for PaymentSourceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CardNumber { number, .. } => f
                .debug_struct("CardNumber")
                .field("number", &mask_pan(number))
                .finish_non_exhaustive(),
            Self::SavedCard { card_id, .. } => f
                .debug_struct("SavedCard")
                .field("card_id", card_id)
                .finish_non_exhaustive(),
            Self::PaymentData { wallet, .. } => f
                .debug_struct("PaymentData")
                .field("wallet", wallet)
                .finish_non_exhaustive(),
            Self::ParentPayment { rebill_id } => f
                .debug_struct("ParentPayment")
                .field("rebill_id", rebill_id)
                .finish(),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

fn mask_pan(pan: &str) -> String {
    let digits: Vec<char> = pan.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 10 {
        return "*".repeat(digits.len());
    }
    let head: String = digits[..6].iter().collect();
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(digits.len() - 10), tail)
}

/// Whether the engine has to create the payment or resume an existing one.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentFlow {
    /// Call `Init` with these options.
    Full(PaymentOptions),
    /// Payment was already initiated elsewhere.
    Finish {
        payment_id: PaymentId,
        customer_options: Option<CustomerOptions>,
    },
}

impl PaymentFlow {
    pub fn customer_options(&self) -> Option<&CustomerOptions> {
        match self {
            Self::Full(options) => Some(&options.customer),
            Self::Finish {
                customer_options, ..
            } => customer_options.as_ref(),
        }
    }
}

/// Card details in the `key=value;` form the backend expects before encryption.
#[derive(Clone, PartialEq, Eq)]
pub enum CardData {
    Number {
        pan: String,
        expire_date: String,
        cvv: String,
    },
    Saved {
        card_id: String,
        cvv: Option<String>,
    },
}

impl CardData {
    /// Plain `PAN=...;ExpDate=...;CVV=...` / `CardId=...;CVV=...` string.
    pub fn plain(&self) -> String {
        match self {
            Self::Number {
                pan,
                expire_date,
                cvv,
            } => format!(
                "PAN={};ExpDate={};CVV={}",
                pan.replace(' ', ""),
                expire_date.replace('/', ""),
                cvv
            ),
            Self::Saved { card_id, cvv } => match cvv {
                Some(cvv) => format!("CardId={};CVV={}", card_id, cvv),
                None => format!("CardId={}", card_id),
            },
        }
    }
}

impl fmt::Debug for CardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CardData(..)")
    }
}

/// Encrypts card data before it leaves the device.
///
/// Production integrations encrypt with the bank's RSA public key; that key
/// and cipher belong to the integrating app.
pub trait CardDataEncoder: Send + Sync {
    fn encode(&self, card: &CardData) -> AcquiringResult<String>;
}

/// Base64 of the plain card string. Suitable for test terminals only.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64CardDataEncoder;

impl CardDataEncoder for Base64CardDataEncoder {
    fn encode(&self, card: &CardData) -> AcquiringResult<String> {
        let plain = card.plain();
        if plain.is_empty() {
            return Err(AcquiringError::InvalidRequest("empty card data".into()));
        }
        Ok(base64::engine::general_purpose::STANDARD.encode(plain))
    }
}
