//! Acquiring client configuration
//!
//! Loaded from code through [`AcquiringConfig::builder`], from environment
//! variables (`ACQUIRING_TERMINAL_KEY`, `ACQUIRING_PASSWORD`, ...) with an
//! optional `.env` file, or from a TOML file.

use crate::error::ConfigError;
use secrecy::SecretString;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "ACQUIRING";

const TEST_BASE_URL: &str = "https://rest-api-test.tinkoff.ru/";
const PROD_BASE_URL: &str = "https://securepay.tinkoff.ru/";
const SBP_BANKS_URL: &str = "https://qr.nspk.ru/proxyapp/c2bmembers.json";

/// Backend environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Test,
    Prod,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Test => TEST_BASE_URL,
            Self::Prod => PROD_BASE_URL,
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(ConfigError::Invalid {
                key: "environment".into(),
                message: format!("unknown environment `{}`", other),
            }),
        }
    }
}

/// Terminal credentials and endpoints.
#[derive(Clone)]
pub struct AcquiringConfig {
    pub terminal_key: String,
    pub password: SecretString,
    pub environment: Environment,
    /// Overrides the environment's base URL.
    pub base_url: Option<String>,
    pub request_timeout: Duration,
    pub sbp_banks_url: String,
    /// Where the ACS posts the CRes of a browser challenge.
    pub cres_callback_url: Option<String>,
}

impl fmt::Debug for AcquiringConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquiringConfig")
            .field("terminal_key", &self.terminal_key)
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("sbp_banks_url", &self.sbp_banks_url)
            .field("cres_callback_url", &self.cres_callback_url)
            .finish_non_exhaustive()
    }
}

impl AcquiringConfig {
    pub fn builder() -> AcquiringConfigBuilder {
        AcquiringConfigBuilder::default()
    }

    /// Base URL of the acquiring API, always with a trailing slash.
    pub fn api_base_url(&self) -> String {
        let base = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url());
        if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        }
    }

    /// `TermUrl` for 3DS v1 challenges.
    pub fn confirmation_3ds_termination_url(&self) -> String {
        format!("{}v2/Submit3DSAuthorization", self.api_base_url())
    }

    /// `cresCallbackUrl` for 3DS v2 browser challenges.
    pub fn confirmation_3ds_termination_v2_url(&self) -> String {
        self.cres_callback_url
            .clone()
            .unwrap_or_else(|| format!("{}v2/Submit3DSAuthorizationV2", self.api_base_url()))
    }

    /// Notification URL of the 3DS method step.
    pub fn complete_3ds_method_url(&self) -> String {
        format!("{}v2/Complete3DSMethodv2", self.api_base_url())
    }

    /// Load from `ACQUIRING_*` environment variables, reading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            return Err(ConfigError::Load(e.to_string()));
        }
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Load from any key/value source; `lookup` receives full variable names.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", prefix, name));

        let mut builder = Self::builder();
        if let Some(terminal_key) = var("TERMINAL_KEY") {
            builder = builder.terminal_key(terminal_key);
        }
        if let Some(password) = var("PASSWORD") {
            builder = builder.password(password);
        }
        if let Some(environment) = var("ENVIRONMENT") {
            builder = builder.environment(environment.parse()?);
        }
        if let Some(base_url) = var("BASE_URL") {
            builder = builder.base_url(base_url);
        }
        if let Some(timeout) = var("REQUEST_TIMEOUT_SECS") {
            builder = builder.request_timeout(Duration::from_secs(parse_number(
                "REQUEST_TIMEOUT_SECS",
                &timeout,
            )?));
        }
        if let Some(url) = var("SBP_BANKS_URL") {
            builder = builder.sbp_banks_url(url);
        }
        if let Some(url) = var("CRES_CALLBACK_URL") {
            builder = builder.cres_callback_url(url);
        }

        builder.build()
    }

    /// Load from a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.into_config()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        message: format!("{}", e),
    })
}

#[derive(Deserialize)]
struct ConfigFile {
    terminal_key: String,
    password: String,
    #[serde(default)]
    environment: Environment,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    sbp_banks_url: Option<String>,
    #[serde(default)]
    cres_callback_url: Option<String>,
}

impl ConfigFile {
    fn into_config(self) -> Result<AcquiringConfig, ConfigError> {
        let mut builder = AcquiringConfig::builder()
            .terminal_key(self.terminal_key)
            .password(self.password)
            .environment(self.environment);
        if let Some(base_url) = self.base_url {
            builder = builder.base_url(base_url);
        }
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(url) = self.sbp_banks_url {
            builder = builder.sbp_banks_url(url);
        }
        if let Some(url) = self.cres_callback_url {
            builder = builder.cres_callback_url(url);
        }
        builder.build()
    }
}

/// Builder for [`AcquiringConfig`].
#[derive(Default)]
pub struct AcquiringConfigBuilder {
    terminal_key: Option<String>,
    password: Option<SecretString>,
    environment: Environment,
    base_url: Option<String>,
    request_timeout: Option<Duration>,
    sbp_banks_url: Option<String>,
    cres_callback_url: Option<String>,
}

impl AcquiringConfigBuilder {
    pub fn terminal_key(mut self, terminal_key: impl Into<String>) -> Self {
        self.terminal_key = Some(terminal_key.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn sbp_banks_url(mut self, url: impl Into<String>) -> Self {
        self.sbp_banks_url = Some(url.into());
        self
    }

    pub fn cres_callback_url(mut self, url: impl Into<String>) -> Self {
        self.cres_callback_url = Some(url.into());
        self
    }

    pub fn build(self) -> Result<AcquiringConfig, ConfigError> {
        let terminal_key = self
            .terminal_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing("terminal_key".into()))?;
        let password = self
            .password
            .ok_or_else(|| ConfigError::Missing("password".into()))?;

        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url).map_err(|e| ConfigError::Invalid {
                key: "base_url".into(),
                message: e.to_string(),
            })?;
        }

        Ok(AcquiringConfig {
            terminal_key,
            password,
            environment: self.environment,
            base_url: self.base_url,
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(40)),
            sbp_banks_url: self.sbp_banks_url.unwrap_or_else(|| SBP_BANKS_URL.into()),
            cres_callback_url: self.cres_callback_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    #[test]
    fn test_builder_defaults() {
        let config = AcquiringConfig::builder()
            .terminal_key("TestSDK")
            .password("secret")
            .build()
            .unwrap();

        assert_eq!(config.api_base_url(), "https://rest-api-test.tinkoff.ru/");
        assert_eq!(config.request_timeout, Duration::from_secs(40));
        assert_eq!(config.sbp_banks_url, SBP_BANKS_URL);
        assert_eq!(
            config.confirmation_3ds_termination_v2_url(),
            "https://rest-api-test.tinkoff.ru/v2/Submit3DSAuthorizationV2"
        );
    }

    #[test]
    fn test_missing_credentials() {
        let result = AcquiringConfig::builder().password("secret").build();
        assert!(matches!(result, Err(ConfigError::Missing(key)) if key == "terminal_key"));

        let result = AcquiringConfig::builder().terminal_key("T").build();
        assert!(matches!(result, Err(ConfigError::Missing(key)) if key == "password"));
    }

    #[test]
    fn test_base_url_override_gets_trailing_slash() {
        let config = AcquiringConfig::builder()
            .terminal_key("T")
            .password("p")
            .environment(Environment::Prod)
            .base_url("http://127.0.0.1:8080")
            .build()
            .unwrap();
        assert_eq!(config.api_base_url(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("SHOP_TERMINAL_KEY", "TestSDK"),
            ("SHOP_PASSWORD", "secret"),
            ("SHOP_ENVIRONMENT", "prod"),
            ("SHOP_REQUEST_TIMEOUT_SECS", "15"),
        ]
        .into_iter()
        .collect();

        let config =
            AcquiringConfig::from_lookup("SHOP", |key| vars.get(key).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(config.terminal_key, "TestSDK");
        assert_eq!(config.password.expose_secret(), "secret");
        assert_eq!(config.environment, Environment::Prod);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let result = AcquiringConfig::from_lookup("X", |key| match key {
            "X_TERMINAL_KEY" => Some("T".into()),
            "X_PASSWORD" => Some("p".into()),
            "X_REQUEST_TIMEOUT_SECS" => Some("soon".into()),
            _ => None,
        });
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_from_toml() {
        let config = AcquiringConfig::from_toml(
            r#"
            terminal_key = "TestSDK"
            password = "secret"
            environment = "prod"
            cres_callback_url = "https://merchant.example/cres"
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url(), "https://securepay.tinkoff.ru/");
        assert_eq!(
            config.confirmation_3ds_termination_v2_url(),
            "https://merchant.example/cres"
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let config = AcquiringConfig::builder()
            .terminal_key("T")
            .password("hunter2")
            .build()
            .unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
