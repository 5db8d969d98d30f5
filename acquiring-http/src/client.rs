//! Network client implementation.

use std::sync::Arc;
use tracing::{debug, trace};

use crate::request::RequestBody;
use crate::{NetworkClientConfig, NetworkError, NetworkRequest, NetworkResponse, Result};

/// HTTP client with timeouts. Every request goes out exactly once.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct NetworkClient {
    inner: reqwest::Client,
    config: Arc<NetworkClientConfig>,
}

impl NetworkClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NetworkClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &NetworkClientConfig {
        &self.config
    }

    /// Send a request once and read the whole response.
    ///
    /// Non-2xx statuses come back as [`NetworkError::Status`].
    pub async fn perform(&self, request: &NetworkRequest) -> Result<NetworkResponse> {
        let url = request.url(self.config.base_url.as_deref())?;
        trace!(method = %request.method(), url = %url, "Sending request");

        let mut builder = self.inner.request(request.method().clone(), url);

        for (name, value) in &self.config.default_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(content_type) = request.body().content_type() {
            builder = builder.header(http::header::CONTENT_TYPE, content_type);
        }
        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.body(bytes.clone()),
        };

        let timeout = self.config.timeout;

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                NetworkError::Timeout(timeout)
            } else if e.is_connect() {
                NetworkError::Connection(e.to_string())
            } else {
                NetworkError::Http(e)
            }
        })?;

        let response = NetworkResponse::from_reqwest(response).await?;
        debug!(
            path = %request.path(),
            status = response.status().as_u16(),
            bytes = response.bytes().len(),
            "Received response"
        );
        response.error_for_status()
    }
}
