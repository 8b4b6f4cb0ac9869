//! Structured logging for exchanges and scenario progress.
//!
//! The library only emits `tracing` events. Installing a subscriber is left
//! to the binary or test that uses it.

use http::StatusCode;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One request on the wire, from send to the last body byte.
#[derive(Debug)]
pub(crate) struct Exchange<'a> {
    method: &'a str,
    path: &'a str,
    started: Instant,
}

impl<'a> Exchange<'a> {
    /// Log the outgoing request and start the clock.
    pub(crate) fn begin(method: &'a str, path: &'a str, body_size: Option<usize>) -> Self {
        debug!(method, path, body_size, "Sending HTTP request");
        Self {
            method,
            path,
            started: Instant::now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log a response and return the total round-trip time.
    ///
    /// Every status is `info`: a 404 is often what the contract asks for.
    pub(crate) fn completed(&self, status: StatusCode, body_size: usize) -> Duration {
        let elapsed = self.elapsed();
        info!(
            method = self.method,
            path = self.path,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis(),
            body_size,
            "HTTP request completed"
        );
        elapsed
    }

    /// Log a request that never produced a full response.
    pub(crate) fn failed(&self, error: &dyn std::fmt::Display) {
        warn!(
            method = self.method,
            path = self.path,
            elapsed_ms = self.elapsed().as_millis(),
            error = %error,
            "HTTP request failed before a response arrived"
        );
    }
}

/// Log a scenario step transition
pub fn log_step(scenario: &str, step: u8, call: &str, state: &str) {
    info!(scenario, step, call, state, "Scenario step passed");
}

/// Log a scenario failure
pub fn log_scenario_failure(scenario: &str, kind: &str, error: &str) {
    warn!(scenario, kind, error, "Scenario failed");
}
