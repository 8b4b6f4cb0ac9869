//! HTTP request/response layer
//!
//! Thin wrappers over `reqwest` that keep the endpoint-relative path next to
//! every exchange, so failures can be reported against the contract path
//! rather than the absolute URL.

pub use request::RequestBuilder;
pub use response::Response;

mod request;
mod response;

// Re-export HTTP types from the http crate for convenience
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
