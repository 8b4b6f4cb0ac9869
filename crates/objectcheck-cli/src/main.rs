//! objectcheck command-line runner
//!
//! Runs the contract scenario catalog against a live objects service.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use objectcheck::config::ClientConfigBuilder;
use objectcheck::scenarios::{Group, catalog};
use objectcheck::{ClientConfig, SuiteRunner};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Contract tests for a REST objects service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every scenario in the catalog
    List,

    /// Run scenarios and print a report
    Run {
        /// Only run scenarios whose name contains this text
        #[arg(long)]
        filter: Option<String>,

        /// Only run scenarios of this group (crud, read, query, mutation)
        #[arg(long)]
        group: Option<Group>,

        /// Service base URL, overriding BASE_URL
        #[arg(long)]
        base_url: Option<String>,

        /// Per-request timeout in seconds, overriding REQUEST_TIMEOUT
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args = Args::parse();

    match args.command {
        Command::List => {
            for scenario in catalog() {
                println!(
                    "{:<40} {:<9} {}",
                    scenario.name(),
                    scenario.group(),
                    scenario.description()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            filter,
            group,
            base_url,
            timeout,
        } => {
            let config = resolve_config(base_url, timeout)?;

            let mut runner = SuiteRunner::new(config);
            if let Some(filter) = filter {
                runner = runner.filter(filter);
            }
            if let Some(group) = group {
                runner = runner.group(group);
            }

            let report = runner.run().await;
            println!("{}", report);

            if report.is_success() {
                info!("All scenarios passed");
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// Environment configuration with command-line overrides applied. An explicit
/// `--timeout` means `REQUEST_TIMEOUT` is never parsed.
fn resolve_config(base_url: Option<String>, timeout: Option<u64>) -> anyhow::Result<ClientConfig> {
    let config = ClientConfig::from_env_with_timeout(timeout.map(Duration::from_secs))
        .context("Failed to load configuration")?;

    let mut builder = ClientConfigBuilder::from_config(config);
    if let Some(base_url) = base_url {
        builder = builder.base_url(base_url);
    }
    Ok(builder.build())
}
