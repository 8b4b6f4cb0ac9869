//! API resource endpoints
//!
//! Typed wrappers over [`ApiClient`](crate::ApiClient) that enforce the
//! service contract on every call.

pub mod objects;

pub use objects::{OBJECTS_PATH, Objects, object_path};
