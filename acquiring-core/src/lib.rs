//! # Acquiring core
//!
//! Signed client for the bank's acquiring API: request signing, response
//! envelope decoding, every endpoint as a typed request, and the payment
//! models shared with the payment engine.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use acquiring_core::{AcquiringApi, AcquiringConfig};
//! use acquiring_core::models::{CustomerOptions, OrderOptions, PaymentInitData, PaymentOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AcquiringConfig::builder()
//!         .terminal_key("TestSDK")
//!         .password("secret")
//!         .build()?;
//!     let api = AcquiringApi::new(config)?;
//!
//!     let options = PaymentOptions::new(OrderOptions::new("12345", 320), CustomerOptions::default());
//!     let payment = api.init(PaymentInitData::from(&options)).await?;
//!     println!("payment {} is {}", payment.payment_id, payment.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Envelope
//!
//! Successful responses carry `"Success": true` next to the payload fields.
//! `"Success": false` is decoded into [`APIFailureError`] and never into the
//! payload. `GetCardList` answers with a bare array instead; see
//! [`DecodeStrategy`].

pub mod api;
pub mod config;
pub mod decoder;
pub mod error;
pub mod keys;
pub mod models;
pub mod request;
pub mod requests;
pub mod services;
pub mod token;

pub use api::AcquiringApi;
pub use config::{AcquiringConfig, AcquiringConfigBuilder, Environment};
pub use error::{APIFailureError, AcquiringError, AcquiringResult, ConfigError};
pub use request::{AcquiringRequest, DecodeStrategy};
pub use services::{AcquiringPaymentsService, AcquiringThreeDsService};
pub use token::{PasswordTokenProvider, TokenFormation, TokenProvider};

pub use tokio_util::sync::CancellationToken;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::api::AcquiringApi;
    pub use crate::config::{AcquiringConfig, Environment};
    pub use crate::error::{APIFailureError, AcquiringError, AcquiringResult};
    pub use crate::models::*;
    pub use crate::requests::*;
    pub use crate::services::{AcquiringPaymentsService, AcquiringThreeDsService};
    pub use crate::token::{PasswordTokenProvider, TokenProvider};
}
