// Acquiring SDK - payment acceptance for Rust applications
//
// This library re-exports the transport, the signed API client and the
// payment engine under one crate.

// Re-export the API client
pub use acquiring_core::*;

// Re-export the transport
pub use acquiring_http;

// Re-export the payment engine
#[cfg(feature = "payments")]
pub use acquiring_payments;

// Prelude for common imports
pub mod prelude {
    pub use acquiring_core::prelude::*;

    #[cfg(feature = "payments")]
    pub use acquiring_payments::prelude::{
        ChallengeSdk, ChallengeTransaction, DeviceInfo, DeviceInfoProvider, PaymentController,
        PaymentControllerDelegate, PaymentDependencies, PaymentError, PaymentErrorKind,
        PaymentFactory, PaymentProcess, PaymentResult, ProcessInfo, ProcessState,
        ThreeDsWebFlowHost,
    };
}
