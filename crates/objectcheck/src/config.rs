//! Configuration for the harness client
//!
//! Configuration is an explicit value handed to [`ApiClient`](crate::ApiClient)
//! at construction time. Nothing is read from process-wide state after that,
//! so tests built from different configurations stay independent.

use http::{HeaderMap, HeaderName, HeaderValue, header};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::error::{Error, Result};

/// Base URL used when `BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://api.restful-api.dev";

/// Per-request timeout used when `REQUEST_TIMEOUT` is not set.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment label used when `ENVIRONMENT` is not set.
pub const DEFAULT_ENVIRONMENT: &str = "test";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Environment variable names read by [`ClientConfig::from_env`].
pub mod env_vars {
    /// Service base URL.
    pub const BASE_URL: &str = "BASE_URL";
    /// Request timeout in whole seconds.
    pub const REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT";
    /// API key sent as `X-API-Key`.
    pub const API_KEY: &str = "API_KEY";
    /// Token sent as `Authorization: Bearer`.
    pub const AUTH_TOKEN: &str = "AUTH_TOKEN";
    /// Free-form environment label.
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Configuration for the harness client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service, without the `/objects` suffix
    pub base_url: String,

    /// Timeout applied to every request
    pub timeout: Duration,

    /// API key, sent as `X-API-Key` when present
    pub api_key: Option<SecretString>,

    /// Auth token, sent as `Authorization: Bearer <token>` when present
    pub auth_token: Option<SecretString>,

    /// Label for the target environment, used in logs and reports
    pub environment: String,

    /// Extra headers to include with every request
    pub default_headers: HeaderMap,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            api_key: None,
            auth_token: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            default_headers: HeaderMap::new(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration targeting `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create a new builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first;
    /// variables already set in the process take precedence over it.
    ///
    /// This will look for:
    /// - `BASE_URL` for the service base URL
    /// - `REQUEST_TIMEOUT` for request timeout (in seconds)
    /// - `API_KEY` and `AUTH_TOKEN` for credentials
    /// - `ENVIRONMENT` for the environment label
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `REQUEST_TIMEOUT` is not a whole
    /// number of seconds.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_timeout(None)
    }

    /// Like [`ClientConfig::from_env`], except that a given `timeout` replaces
    /// `REQUEST_TIMEOUT`, which is then not read at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `timeout` is `None` and
    /// `REQUEST_TIMEOUT` is not a whole number of seconds.
    #[cfg(feature = "env")]
    pub fn from_env_with_timeout(timeout: Option<Duration>) -> Result<Self> {
        use std::env;

        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }

        let mut config = Self::default();

        if let Ok(base_url) = env::var(env_vars::BASE_URL) {
            config.base_url = base_url;
        }

        match timeout {
            Some(timeout) => config.timeout = timeout,
            None => {
                if let Ok(timeout_str) = env::var(env_vars::REQUEST_TIMEOUT) {
                    config.timeout = parse_timeout(&timeout_str)?;
                }
            }
        }

        // Empty values count as unset
        if let Ok(api_key) = env::var(env_vars::API_KEY)
            && !api_key.is_empty()
        {
            config.api_key = Some(SecretString::new(api_key.into_boxed_str()));
        }

        if let Ok(auth_token) = env::var(env_vars::AUTH_TOKEN)
            && !auth_token.is_empty()
        {
            config.auth_token = Some(SecretString::new(auth_token.into_boxed_str()));
        }

        if let Ok(environment) = env::var(env_vars::ENVIRONMENT) {
            config.environment = environment;
        }

        tracing::info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            environment = %config.environment,
            has_api_key = config.api_key.is_some(),
            has_auth_token = config.auth_token.is_some(),
            "Resolved client configuration"
        );

        Ok(config)
    }

    /// Build the header set sent with every request.
    ///
    /// Always contains `Content-Type: application/json`. `Authorization` and
    /// `X-API-Key` are added only when the matching credential is configured;
    /// their values are marked sensitive. Custom default headers are applied
    /// last and may override the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeaderValue`] if a credential contains
    /// characters that are not valid in a header.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        if let Some(token) = &self.auth_token {
            let value = sensitive_value(&format!("Bearer {}", token.expose_secret()))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        if let Some(api_key) = &self.api_key {
            let value = sensitive_value(api_key.expose_secret())?;
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }

        for (key, value) in &self.default_headers {
            headers.insert(key.clone(), value.clone());
        }

        Ok(headers)
    }
}

fn sensitive_value(raw: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(raw)
        .map_err(|_| Error::InvalidHeaderValue("<redacted credential>".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| Error::InvalidConfig {
            key: env_vars::REQUEST_TIMEOUT,
            message: format!("'{}' is not a whole number of seconds: {}", raw, e),
        })
}

/// Builder for creating ClientConfig with a fluent API.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(SecretString::new(api_key.into().into_boxed_str()));
        self
    }

    /// Set the auth token.
    pub fn auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.config.auth_token = Some(SecretString::new(auth_token.into().into_boxed_str()));
        self
    }

    /// Set the environment label.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.config.environment = environment.into();
        self
    }

    /// Add a default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        let key_str = key.into();
        let value_str = value.into();

        let key: HeaderName = key_str
            .parse()
            .map_err(|_| Error::InvalidHeaderName(key_str.clone()))?;
        let value: HeaderValue = value_str
            .parse()
            .map_err(|_| Error::InvalidHeaderValue(value_str.clone()))?;

        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.environment, "test");
        assert!(config.api_key.is_none());
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::builder()
            .base_url("https://example.com")
            .timeout(Duration::from_secs(5))
            .api_key("key-123")
            .auth_token("tok-456")
            .environment("staging")
            .default_header("x-trace", "abc")
            .unwrap()
            .build();

        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.environment, "staging");
        assert!(config.api_key.is_some());
        assert!(config.auth_token.is_some());
        assert!(config.default_headers.contains_key("x-trace"));
    }

    #[test]
    fn test_builder_rejects_invalid_header_name() {
        let result = ClientConfig::builder().default_header("bad header", "v");
        assert!(matches!(result, Err(Error::InvalidHeaderName(name)) if name == "bad header"));
    }

    #[test]
    fn test_headers_without_credentials() {
        let headers = ClientConfig::default().headers().unwrap();

        assert_eq!(headers.len(), 1);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert!(!headers.contains_key(header::AUTHORIZATION));
        assert!(!headers.contains_key(API_KEY_HEADER));
    }

    #[test]
    fn test_headers_with_credentials_are_sensitive() {
        let config = ClientConfig::builder()
            .auth_token("tok-456")
            .api_key("key-123")
            .build();
        let headers = config.headers().unwrap();

        let auth = &headers[header::AUTHORIZATION];
        assert_eq!(auth, "Bearer tok-456");
        assert!(auth.is_sensitive());

        let key = &headers[API_KEY_HEADER];
        assert_eq!(key, "key-123");
        assert!(key.is_sensitive());
    }

    #[test]
    fn test_custom_headers_override_defaults() {
        let config = ClientConfig::builder()
            .default_header("content-type", "application/merge-patch+json")
            .unwrap()
            .build();
        let headers = config.headers().unwrap();
        assert_eq!(
            headers[header::CONTENT_TYPE],
            "application/merge-patch+json"
        );
    }

    #[test]
    fn test_credential_with_newline_is_rejected() {
        let config = ClientConfig::builder().api_key("bad\nkey").build();
        let err = config.headers().unwrap_err();
        assert!(matches!(err, Error::InvalidHeaderValue(_)));
        assert!(!err.to_string().contains("bad"));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("45").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_timeout(" 7 ").unwrap(), Duration::from_secs(7));
        assert!(matches!(
            parse_timeout("soon"),
            Err(Error::InvalidConfig { key: "REQUEST_TIMEOUT", .. })
        ));
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_config_from_env_variables() {
        // Use temp-env for safe, thread-safe environment variable management (Rust 2024 compliant)
        temp_env::with_vars(
            [
                (env_vars::BASE_URL, Some("https://env-base.example")),
                (env_vars::REQUEST_TIMEOUT, Some("12")),
                (env_vars::API_KEY, Some("env-key")),
                (env_vars::AUTH_TOKEN, Some("env-token")),
                (env_vars::ENVIRONMENT, Some("ci")),
            ],
            || {
                let config = ClientConfig::from_env().expect("Should load config from environment");
                assert_eq!(config.base_url, "https://env-base.example");
                assert_eq!(config.timeout, Duration::from_secs(12));
                assert_eq!(config.environment, "ci");
                assert_eq!(
                    config.api_key.as_ref().map(|k| k.expose_secret().to_string()),
                    Some("env-key".to_string())
                );
                assert!(config.auth_token.is_some());
            },
        );
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_config_from_env_empty_credentials_are_unset() {
        temp_env::with_vars(
            [
                (env_vars::API_KEY, Some("")),
                (env_vars::AUTH_TOKEN, Some("")),
                (env_vars::REQUEST_TIMEOUT, None),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert!(config.api_key.is_none());
                assert!(config.auth_token.is_none());
            },
        );
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_config_from_env_rejects_bad_timeout() {
        temp_env::with_var(env_vars::REQUEST_TIMEOUT, Some("thirty"), || {
            let err = ClientConfig::from_env().unwrap_err();
            assert!(matches!(err, Error::InvalidConfig { .. }));
        });
    }

    #[test]
    fn test_explicit_timeout_skips_invalid_env_value() {
        temp_env::with_var(env_vars::REQUEST_TIMEOUT, Some("thirty"), || {
            let config = ClientConfig::from_env_with_timeout(Some(Duration::from_secs(5)))
                .expect("explicit timeout must win over REQUEST_TIMEOUT");
            assert_eq!(config.timeout, Duration::from_secs(5));
        });
    }
}
