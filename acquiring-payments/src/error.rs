//! Error types for payment processing

use acquiring_core::models::GetPaymentStatePayload;
use acquiring_core::{APIFailureError, AcquiringError};
use acquiring_http::NetworkError;
use std::time::Duration;
use thiserror::Error;

/// 3-D Secure challenge failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    /// The challenge did not finish in time
    #[error("Challenge timed out after {0:?}")]
    Timeout(Duration),

    /// The ACS or the challenge SDK broke the protocol
    #[error("Challenge protocol error: {0}")]
    Protocol(String),

    /// The challenge SDK failed
    #[error("Challenge runtime error: {0}")]
    Runtime(String),

    /// No challenge transaction could be created
    #[error("Failed to create challenge transaction: {0}")]
    TransactionCreation(String),

    /// The web flow host failed
    #[error("Web flow host error: {0}")]
    Host(String),
}

/// Payment error types
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Network failure; the attempt may be repeated
    #[error("Transport error: {0}")]
    Transport(#[from] NetworkError),

    /// Backend answered in an unexpected way
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Backend rejected the operation
    #[error("{0}")]
    Api(#[from] APIFailureError),

    /// 3-D Secure challenge failed
    #[error("{0}")]
    Challenge(#[from] ChallengeError),

    /// Payment was cancelled
    #[error("Payment cancelled")]
    Cancelled,

    /// Payment reached a final status other than success
    #[error("Payment declined with status {}", .0.status)]
    Declined(GetPaymentStatePayload),

    /// Status polling ran out of attempts
    #[error("Payment status unresolved after {attempts} polling attempts")]
    PollingTimeout { attempts: u32 },

    /// No payment strategy exists for the source
    #[error("Unsupported payment source")]
    UnsupportedSource,

    /// Missing collaborator or invalid setup
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Coarse classification for collaborators deciding what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentErrorKind {
    Transport,
    InvalidResponse,
    Api,
    Challenge,
    Cancelled,
    Declined,
    Timeout,
    UnsupportedSource,
    Configuration,
}

impl PaymentError {
    pub fn kind(&self) -> PaymentErrorKind {
        match self {
            Self::Transport(_) => PaymentErrorKind::Transport,
            Self::InvalidResponse(_) => PaymentErrorKind::InvalidResponse,
            Self::Api(_) => PaymentErrorKind::Api,
            Self::Challenge(ChallengeError::Timeout(_)) => PaymentErrorKind::Timeout,
            Self::Challenge(_) => PaymentErrorKind::Challenge,
            Self::Cancelled => PaymentErrorKind::Cancelled,
            Self::Declined(_) => PaymentErrorKind::Declined,
            Self::PollingTimeout { .. } => PaymentErrorKind::Timeout,
            Self::UnsupportedSource => PaymentErrorKind::UnsupportedSource,
            Self::Configuration(_) => PaymentErrorKind::Configuration,
        }
    }

    /// Whether starting a new attempt may help.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::PollingTimeout { .. } => true,
            _ => false,
        }
    }

    /// The backend failure behind this error, if any.
    pub fn api_failure(&self) -> Option<&APIFailureError> {
        match self {
            Self::Api(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<AcquiringError> for PaymentError {
    fn from(err: AcquiringError) -> Self {
        match err {
            AcquiringError::Transport(e) => Self::Transport(e),
            AcquiringError::Api(failure) => Self::Api(failure),
            AcquiringError::InvalidResponse(message) => Self::InvalidResponse(message),
            AcquiringError::InvalidRequest(message) | AcquiringError::Token(message) => {
                Self::Configuration(message)
            }
            AcquiringError::Cancelled => Self::Cancelled,
        }
    }
}

/// Result type for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
