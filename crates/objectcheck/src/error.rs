//! Error types for the contract harness
//!
//! Every failure a scenario can hit is a variant of [`Error`]. The four kinds a
//! contract run cares about are transport failures, status mismatches, schema
//! violations and field-value mismatches; the rest are setup problems
//! (bad configuration, unserializable payloads) that stop a case before it
//! reaches the service.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::schema::SchemaViolation;

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness.
#[derive(Debug, Error)]
pub enum Error {
    /// The request did not complete within the configured timeout.
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Network or connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// HTTP client configuration or initialization error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// The service answered with a status other than the one the contract expects.
    #[error("Expected status {expected} for {method} {path}, but got {actual}{}", body_suffix(.body))]
    StatusMismatch {
        /// HTTP method of the offending request
        method: String,
        /// Endpoint-relative path of the offending request
        path: String,
        /// Status the contract requires
        expected: u16,
        /// Status the service returned
        actual: u16,
        /// Response headers, kept for diagnosis
        headers: http::HeaderMap,
        /// Response body (possibly truncated), kept for diagnosis
        body: String,
    },

    /// The response body does not match the declared schema.
    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    /// A business-level assertion on a field value failed.
    #[error("Field mismatch at {field}: expected {expected}, got {actual}")]
    FieldMismatch {
        /// Field (JSON-pointer style) that was checked
        field: String,
        /// Rendered expected value
        expected: String,
        /// Rendered actual value
        actual: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid URL provided or composed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid HTTP header name.
    #[error("Invalid HTTP header name: {0}")]
    InvalidHeaderName(String),

    /// Invalid HTTP header value.
    #[error("Invalid HTTP header value: {0}")]
    InvalidHeaderValue(String),

    /// A schema declaration did not compile.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Configuration value present but unusable.
    #[error("Invalid configuration for {key}: {message}")]
    InvalidConfig {
        /// Configuration key (environment variable name)
        key: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// The service created an object but its response failed a check.
    #[error("{source} (object {id} was created)")]
    CreatedButRejected {
        /// Id the service assigned
        id: String,
        /// Why the response was rejected
        #[source]
        source: Box<Error>,
    },

    /// A numbered step of a multi-step scenario failed.
    #[error("Step {step} ({call}) failed: {source}")]
    Step {
        /// 1-based step number
        step: u8,
        /// Short description of the call issued at this step
        call: &'static str,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },
}

/// Coarse classification of a failure, used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Connection failure or timeout.
    Transport,
    /// Unexpected HTTP status.
    Status,
    /// Response shape disagrees with the schema.
    Schema,
    /// A field held the wrong value, or the body could not be decoded.
    Field,
    /// The case could not be set up (configuration, serialization).
    Setup,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Transport => "transport",
            Self::Status => "status",
            Self::Schema => "schema",
            Self::Field => "field",
            Self::Setup => "setup",
        };
        f.write_str(label)
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Timeout(_) | Error::Connection(_) => FailureKind::Transport,
            Error::StatusMismatch { .. } => FailureKind::Status,
            Error::Schema(_) => FailureKind::Schema,
            Error::FieldMismatch { .. } | Error::Decode(_) => FailureKind::Field,
            Error::Step { source, .. } | Error::CreatedButRejected { source, .. } => {
                source.kind()
            }
            Error::HttpClient(_)
            | Error::Serialization(_)
            | Error::InvalidUrl(_)
            | Error::InvalidHeaderName(_)
            | Error::InvalidHeaderValue(_)
            | Error::InvalidSchema(_)
            | Error::InvalidConfig { .. } => FailureKind::Setup,
        }
    }

    /// Whether this is a transport-level failure.
    pub fn is_transport(&self) -> bool {
        self.kind() == FailureKind::Transport
    }

    /// Whether this is a timeout, looking through step wrappers.
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Error::Timeout(_))
    }

    /// The innermost error, with [`Error::Step`] and
    /// [`Error::CreatedButRejected`] wrappers removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::Step { source, .. } | Error::CreatedButRejected { source, .. } => source.root(),
            other => other,
        }
    }

    /// Id of an object the service created even though this error was
    /// raised, looking through step wrappers.
    pub fn created_id(&self) -> Option<&str> {
        match self {
            Error::CreatedButRejected { id, .. } => Some(id),
            Error::Step { source, .. } => source.created_id(),
            _ => None,
        }
    }

    /// The step number this error was raised at, if it came from a multi-step scenario.
    pub fn step(&self) -> Option<u8> {
        match self {
            Error::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Wrap this error with the scenario step it happened at.
    pub fn at_step(self, step: u8, call: &'static str) -> Self {
        Error::Step {
            step,
            call,
            source: Box::new(self),
        }
    }

    /// Build a field mismatch from two displayable values.
    pub fn field_mismatch(
        field: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Error::FieldMismatch {
            field: field.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Error::Connection(err.to_string())
        } else {
            Error::HttpClient(err.to_string())
        }
    }
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" (body: {})", body)
    }
}
