//! HTTP client wrapper bound to one service base URL

use std::sync::Arc;
use std::time::Duration;

use http::Method;
use serde::Serialize;
use url::Url;

use crate::{
    config::ClientConfig,
    error::{Error, Result},
    http::{RequestBuilder, Response},
    resources::Objects,
};

/// Client for the service under test.
///
/// Holds one `reqwest` connection pool, the base URL, the timeout and the
/// default headers. Clones share the pool. Every verb method issues exactly
/// one request and returns the response whatever its status; deciding
/// whether a status is acceptable is the caller's job.
///
/// # Example
///
/// ```rust,no_run
/// use objectcheck::{ApiClient, ClientConfig};
///
/// # async fn example() -> objectcheck::Result<()> {
/// let client = ApiClient::new(&ClientConfig::new("https://api.restful-api.dev"))?;
/// let response = client.get("/objects/1").await?;
/// assert_eq!(response.status_code(), 200);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    environment: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .field("environment", &self.inner.environment)
            .finish()
    }
}

impl ApiClient {
    /// Create a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The base URL is not an absolute http(s) URL
    /// - A credential cannot be encoded as a header value
    /// - The HTTP client cannot be initialized
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| Error::InvalidUrl(format!("'{}': {}", config.base_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "'{}': scheme must be http or https",
                config.base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .default_headers(config.headers()?)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                timeout: config.timeout,
                environment: config.environment.clone(),
            }),
        })
    }

    /// Access the typed objects resource.
    pub fn objects(&self) -> Objects {
        Objects::new(self.clone())
    }

    /// Base URL requests are composed against, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Timeout applied to every request.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Environment label from the configuration.
    pub fn environment(&self) -> &str {
        &self.inner.environment
    }

    /// Compose the absolute URL for an endpoint-relative path.
    ///
    /// The path is appended to the base URL, so a base URL with a path prefix
    /// keeps it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the result does not parse.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        let joined = format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| {
            Error::InvalidUrl(format!(
                "Failed to construct URL from path '{}': {}",
                path, e
            ))
        })
    }

    /// Create a request builder for custom requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be constructed from the base URL and path.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint_url(path)?;
        Ok(RequestBuilder::new(
            self.inner.http_client.clone(),
            method,
            url,
            path,
            self.inner.timeout,
        ))
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.request(Method::GET, path)?.send().await
    }

    /// Send a GET request with query parameters.
    ///
    /// Pairs are sent in order and keys may repeat, e.g.
    /// `[("id", "3"), ("id", "5")]` sends `?id=3&id=5`.
    pub async fn get_with_query<K, V>(&self, path: &str, query: &[(K, V)]) -> Result<Response>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = self.request(Method::GET, path)?;
        for (key, value) in query {
            builder = builder.query(key.as_ref(), value.as_ref());
        }
        builder.send().await
    }

    /// Send a POST request with an optional JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        self.send_with_body(Method::POST, path, body).await
    }

    /// Send a PUT request with an optional JSON body.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        self.send_with_body(Method::PUT, path, body).await
    }

    /// Send a PATCH request with an optional JSON body.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        self.send_with_body(Method::PATCH, path, body).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Response> {
        self.request(Method::DELETE, path)?.send().await
    }

    async fn send_with_body<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let mut builder = self.request(method, path)?;
        if let Some(body) = body {
            builder = builder.json(body)?;
        }
        builder.send().await
    }
}
