//! Network client configuration.

use std::time::Duration;

/// Timeouts, pooling and headers of a [`NetworkClient`](crate::NetworkClient).
#[derive(Debug, Clone)]
pub struct NetworkClientConfig {
    /// Base URL every relative request path is joined onto.
    pub base_url: Option<String>,
    /// Upper bound for a whole request, connect included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Idle timeout for pooled connections.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// Sent with every request.
    pub default_headers: Vec<(String, String)>,
    pub user_agent: String,
}

impl Default for NetworkClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(40),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 4,
            default_headers: Vec::new(),
            user_agent: format!("acquiring-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetworkClientConfig {
    pub fn builder() -> NetworkClientConfigBuilder {
        NetworkClientConfigBuilder::default()
    }
}

/// Builder for [`NetworkClientConfig`].
#[derive(Debug, Default)]
pub struct NetworkClientConfigBuilder {
    config: NetworkClientConfig,
}

impl NetworkClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Whole-request deadline. The acquiring API answers within 40 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> NetworkClientConfig {
        self.config
    }
}
