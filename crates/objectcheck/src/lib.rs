//! # objectcheck
//!
//! Contract tests for a REST "objects" service: a CRUD store of product-like
//! records exposed at `/objects` and `/objects/{id}`.
//!
//! The crate provides:
//! - An HTTP client wrapper bound to one base URL, timeout and header set
//! - A declarative schema validator for response bodies
//! - Scoped fixtures that create objects and always clean them up
//! - A seven-step CRUD sequence and a catalog of read, query and mutation
//!   scenarios
//! - A suite runner that executes scenarios in isolation and reports results
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use objectcheck::{ClientConfig, SuiteRunner, scenarios::Group};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let report = SuiteRunner::new(config).group(Group::Read).run().await;
//!
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{Error, FailureKind, Result};
pub use fixture::{TestContext, with_created_object};
pub use crate::http::Response;
pub use runner::{Outcome, ScenarioOutcome, SuiteReport, SuiteRunner};
pub use schema::{
    ObjectSchema, SchemaValidator, SchemaViolation, product_schema, validate, validate_collection,
};
pub use types::*;

// Module declarations
pub mod assertions;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod fixture;
pub mod http;
pub mod observability;
pub mod resources;
pub mod runner;
pub mod scenarios;
pub mod schema;
pub mod types;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use objectcheck::prelude::*;
/// ```
pub mod prelude {

    pub use crate::{
        ApiClient, ClientConfig, Error, FailureKind, Result, TestContext,
        assertions::{expect_data, expect_eq, expect_identity, expect_same_set, expect_status},
        http::StatusCode,
        types::{ObjectPayload, ObjectRecord, PatchPayload},
        with_created_object,
    };
}

/// Crate version, from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
