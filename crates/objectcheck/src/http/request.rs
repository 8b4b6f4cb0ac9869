//! HTTP request builder

use super::Response;
use crate::error::{Error, Result};
use crate::observability::Exchange;
use http::Method;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Builder for a single request against the service.
///
/// A built request is sent exactly once. There is no retry: a timeout or
/// connection failure is returned to the caller as-is.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl RequestBuilder {
    /// Create a new request builder.
    ///
    /// `path` is the endpoint-relative path, kept for logs and error reports.
    pub(crate) fn new(
        http_client: reqwest::Client,
        method: Method,
        url: Url,
        path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            method,
            url,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout,
            http_client,
        }
    }

    /// Append a query parameter. Repeating a key sends it repeatedly.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Get the method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the timeout.
    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    /// Send the request and read the whole response body.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the exchange exceeds the timeout
    /// - [`Error::Connection`] if the service cannot be reached
    /// - [`Error::HttpClient`] for any other client-side failure
    pub async fn send(self) -> Result<Response> {
        let mut req = self
            .http_client
            .request(self.method.clone(), self.url.as_str())
            .timeout(self.timeout);

        if !self.query.is_empty() {
            req = req.query(&self.query);
        }

        let body_size = self.body.as_ref().map(Vec::len);
        if let Some(body) = self.body {
            req = req.body(body);
        }

        let exchange = Exchange::begin(self.method.as_str(), &self.path, body_size);

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let err = classify(e, self.timeout);
                exchange.failed(&err);
                return Err(err);
            }
        };

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = match resp.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                let err = classify(e, self.timeout);
                exchange.failed(&err);
                return Err(err);
            }
        };

        let elapsed = exchange.completed(status, body.len());

        Ok(Response::new(
            self.method,
            self.path,
            status,
            headers,
            body,
            elapsed,
        ))
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout(timeout)
    } else if err.is_connect() {
        Error::Connection(err.to_string())
    } else {
        Error::HttpClient(err.to_string())
    }
}
