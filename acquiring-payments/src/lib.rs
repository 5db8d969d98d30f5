//! Payment orchestration for the acquiring SDK
//!
//! Turns a payment source and a flow into a settled payment: `Init`,
//! 3-D Secure, authorization, confirmation and status polling.
//!
//! ## Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      PaymentController                           │
//! │   perform_payment() | cancel_active_payment() | dispatcher task  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │ PaymentFactory
//!              ┌─────────────────┴─────────────────┐
//!              ▼                                   ▼
//!   ┌─────────────────────┐             ┌─────────────────────┐
//!   │ CardPaymentProcess  │             │ ChargePaymentProcess│
//!   │ card / saved / wallet│            │ parent payment      │
//!   └─────────────────────┘             └─────────────────────┘
//!              │                                   │
//!              └───────── ThreeDsResolver ─────────┤
//!                         PaymentStatePoller ──────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use acquiring_payments::prelude::*;
//! use std::sync::Arc;
//!
//! let api = AcquiringApi::new(AcquiringConfig::from_env()?)?;
//! let deps = PaymentDependencies::from_api(api, Arc::new(MyRsaEncoder::new(public_key)))
//!     .web_flow_host(Arc::new(MyWebView))
//!     .build();
//!
//! let delegate: Arc<dyn PaymentControllerDelegate> = Arc::new(MyScreen);
//! let controller = PaymentController::new(PaymentFactory::new(deps), Arc::downgrade(&delegate));
//!
//! controller.perform_init_payment(
//!     PaymentOptions::new(OrderOptions::new("12345", 320), CustomerOptions::new("c-1")),
//!     PaymentSourceData::CardNumber {
//!         number: "2201382000000021".into(),
//!         expire_date: "12/29".into(),
//!         cvv: "123".into(),
//!     },
//! );
//! ```

mod authorization;
pub mod card_process;
pub mod charge_process;
pub mod config;
pub mod controller;
pub mod error;
pub mod factory;
pub mod polling;
pub mod process;
pub mod threeds;

pub use card_process::CardPaymentProcess;
pub use charge_process::{
    ChargePaymentProcess, ChargeRecoveryDelegate, RepeatInitData, RepeatInitRequest,
};
pub use config::{PaymentConfig, PollingConfig, RepeatInitPolicy};
pub use controller::{PaymentController, PaymentControllerDelegate};
pub use error::{ChallengeError, PaymentError, PaymentErrorKind, PaymentResult};
pub use factory::{PaymentDependencies, PaymentDependenciesBuilder, PaymentFactory};
pub use polling::PaymentStatePoller;
pub use process::{PaymentProcess, PaymentProcessDelegate, ProcessInfo, ProcessState};
pub use threeds::ThreeDsResolver;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::controller::{PaymentController, PaymentControllerDelegate};
    pub use crate::error::{PaymentError, PaymentErrorKind, PaymentResult};
    pub use crate::factory::{PaymentDependencies, PaymentFactory};
    pub use crate::process::{PaymentProcess, ProcessInfo, ProcessState};
    pub use crate::threeds::{
        ChallengeSdk, ChallengeTransaction, DeviceInfo, DeviceInfoProvider, ThreeDsWebFlowHost,
    };
    pub use acquiring_core::models::*;
    pub use acquiring_core::{AcquiringApi, AcquiringConfig};
}
