/// Whole catalog through the suite runner
///
/// Run with: cargo test --test real_world -- --ignored real_world_suite -- --nocapture
use objectcheck::{ClientConfig, SuiteRunner};

#[tokio::test]
#[ignore]
async fn real_world_suite_full_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let report = SuiteRunner::new(ClientConfig::from_env()?).run().await;
    println!("{}", report);

    assert!(report.is_success(), "{} scenario(s) failed", report.failed());
    Ok(())
}
