//! HTTP response handling

use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::error::{Error, Result};

/// Longest body excerpt carried in a status-mismatch error.
const MAX_DIAGNOSTIC_BODY: usize = 2048;

/// A fully consumed HTTP response together with the request it answers.
#[derive(Debug, Clone)]
pub struct Response {
    method: Method,
    path: String,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    elapsed: Duration,
}

impl Response {
    /// Create a new response.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
        elapsed: Duration,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            status,
            headers,
            body,
            elapsed,
        }
    }

    /// Method of the request this response answers.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Endpoint-relative path of the request this response answers.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the status code as a number.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Time from sending the request to reading the last body byte.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Parse the body as an untyped JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body is not JSON.
    pub fn json_value(&self) -> Result<Value> {
        self.json()
    }

    /// Parse the body as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] naming the request if the body does not
    /// deserialize into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            Error::Decode(format!(
                "{} {} returned a body that is not the expected JSON: {} (body: {})",
                self.method,
                self.path,
                e,
                self.diagnostic_body()
            ))
        })
    }

    /// Require the status to equal `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StatusMismatch`] carrying both codes, the response
    /// headers and a body excerpt.
    pub fn ensure_status(&self, expected: StatusCode) -> Result<&Self> {
        if self.status == expected {
            return Ok(self);
        }
        Err(Error::StatusMismatch {
            method: self.method.to_string(),
            path: self.path.clone(),
            expected: expected.as_u16(),
            actual: self.status.as_u16(),
            headers: self.headers.clone(),
            body: self.diagnostic_body(),
        })
    }

    fn diagnostic_body(&self) -> String {
        let text = self.text();
        if text.len() <= MAX_DIAGNOSTIC_BODY {
            return text;
        }
        let mut cut = MAX_DIAGNOSTIC_BODY;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…", &text[..cut])
    }
}
