/// Live-test utilities
///
/// Configuration is read with `ClientConfig::from_env()`; a `RUST_LOG`
/// subscriber is installed once so request logs show with `--nocapture`.
use std::sync::Once;

use objectcheck::{ClientConfig, TestContext};

static TRACING: Once = Once::new();

/// Build a context for the configured live service.
pub fn live_context() -> Result<TestContext, Box<dyn std::error::Error>> {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });

    let config = ClientConfig::from_env()?;
    println!("Using BASE_URL: {} ({})", config.base_url, config.environment);
    Ok(TestContext::new(&config)?)
}
