//! # Acquiring HTTP transport
//!
//! The network layer underneath the acquiring API client. It knows nothing
//! about signing or the acquiring response envelope; it only moves bytes.
//!
//! ## Features
//!
//! - **Owned requests**: a [`NetworkRequest`] is plain data built before
//!   anything touches the network
//! - **Timeouts**: every call is bounded by the client timeout
//! - **No replays**: a request goes out once; [`BackoffStrategy`] only paces
//!   payment status polling upstream
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use acquiring_http::{NetworkClient, NetworkClientConfig, NetworkRequest};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NetworkClientConfig::builder()
//!         .base_url("https://rest-api-test.tinkoff.ru/")
//!         .timeout(Duration::from_secs(40))
//!         .build();
//!
//!     let client = NetworkClient::new(config)?;
//!     let request = NetworkRequest::post("v2/GetState")
//!         .json(&serde_json::json!({"TerminalKey": "TestSDK", "PaymentId": "42"}));
//!
//!     let response = client.perform(&request).await?;
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```

mod backoff;
mod client;
mod config;
mod error;
mod request;
mod response;

pub use backoff::BackoffStrategy;
pub use client::NetworkClient;
pub use config::{NetworkClientConfig, NetworkClientConfigBuilder};
pub use error::{NetworkError, Result};
pub use request::{NetworkRequest, RequestBody};
pub use response::NetworkResponse;

pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use acquiring_http::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backoff::BackoffStrategy;
    pub use crate::client::NetworkClient;
    pub use crate::config::{NetworkClientConfig, NetworkClientConfigBuilder};
    pub use crate::error::{NetworkError, Result};
    pub use crate::request::NetworkRequest;
    pub use crate::response::NetworkResponse;
    pub use http::{Method, StatusCode};
}
