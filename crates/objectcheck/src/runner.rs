//! Suite runner and report

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{
    config::ClientConfig,
    error::FailureKind,
    fixture::TestContext,
    observability::log_scenario_failure,
    scenarios::{Group, Scenario, catalog},
};

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// Every assertion held
    Passed,
    /// The scenario stopped at its first failure
    Failed {
        /// Classification of the failure
        #[serde(serialize_with = "serialize_kind")]
        kind: FailureKind,
        /// Rendered error
        message: String,
    },
}

fn serialize_kind<S: serde::Serializer>(
    kind: &FailureKind,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(kind)
}

impl Outcome {
    /// Whether the scenario passed.
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

/// One row of a [`SuiteReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    /// Scenario group
    #[serde(serialize_with = "serialize_group")]
    pub group: Group,
    /// Pass or failure
    pub outcome: Outcome,
    /// Wall-clock time spent, context setup included
    pub elapsed: Duration,
}

fn serialize_group<S: serde::Serializer>(
    group: &Group,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(group.as_str())
}

/// Outcome of a suite run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Environment label from the configuration
    pub environment: String,
    /// Service base URL
    pub base_url: String,
    /// Per-scenario results, in run order
    pub outcomes: Vec<ScenarioOutcome>,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
}

impl SuiteReport {
    /// Number of scenarios that passed.
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_passed()).count()
    }

    /// Number of scenarios that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// Whether every scenario passed. An empty run counts as success.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// The failed rows.
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.outcome.is_passed())
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Suite against {} ({}) started {}",
            self.base_url,
            self.environment,
            self.started_at.to_rfc3339()
        )?;
        for row in &self.outcomes {
            match &row.outcome {
                Outcome::Passed => writeln!(
                    f,
                    "  PASS {:<40} {:>6}ms",
                    row.name,
                    row.elapsed.as_millis()
                )?,
                Outcome::Failed { kind, message } => {
                    writeln!(
                        f,
                        "  FAIL {:<40} {:>6}ms [{}]",
                        row.name,
                        row.elapsed.as_millis(),
                        kind
                    )?;
                    writeln!(f, "       {}", message)?;
                }
            }
        }
        write!(
            f,
            "{} passed, {} failed in {:.2}s",
            self.passed(),
            self.failed(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Runs scenarios one after another, each with its own [`TestContext`].
#[derive(Debug, Clone)]
pub struct SuiteRunner {
    config: ClientConfig,
    filter: Option<String>,
    group: Option<Group>,
}

impl SuiteRunner {
    /// Create a runner that builds every context from `config`.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            filter: None,
            group: None,
        }
    }

    /// Only run scenarios whose name contains `filter`.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Only run scenarios of `group`.
    pub fn group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    /// The catalog entries this runner would execute.
    pub fn select(&self, scenarios: Vec<Scenario>) -> Vec<Scenario> {
        scenarios
            .into_iter()
            .filter(|s| s.matches(self.filter.as_deref(), self.group))
            .collect()
    }

    /// Run the selected part of the full catalog.
    pub async fn run(&self) -> SuiteReport {
        let selected = self.select(catalog());
        self.run_scenarios(&selected).await
    }

    /// Run `scenarios` as given, ignoring the runner's selection.
    ///
    /// A failing scenario is recorded and the run moves on; a context that
    /// cannot be built counts as a setup failure of that scenario.
    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> SuiteReport {
        let started_at = Utc::now();
        let start = Instant::now();
        info!(
            scenarios = scenarios.len(),
            base_url = %self.config.base_url,
            environment = %self.config.environment,
            "Starting suite"
        );

        let mut outcomes = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            outcomes.push(self.run_one(scenario).await);
        }

        let report = SuiteReport {
            started_at,
            environment: self.config.environment.clone(),
            base_url: self.config.base_url.clone(),
            outcomes,
            elapsed: start.elapsed(),
        };
        info!(
            passed = report.passed(),
            failed = report.failed(),
            elapsed_ms = report.elapsed.as_millis(),
            "Suite finished"
        );
        report
    }

    async fn run_one(&self, scenario: &Scenario) -> ScenarioOutcome {
        let start = Instant::now();
        let result = match TestContext::new(&self.config) {
            Ok(ctx) => scenario.run(ctx).await,
            Err(err) => Err(err),
        };

        let outcome = match result {
            Ok(()) => {
                info!(scenario = %scenario.name(), "Scenario passed");
                Outcome::Passed
            }
            Err(err) => {
                let kind = err.kind();
                let message = err.to_string();
                log_scenario_failure(scenario.name(), &kind.to_string(), &message);
                Outcome::Failed { kind, message }
            }
        };

        ScenarioOutcome {
            name: scenario.name().to_string(),
            group: scenario.group(),
            outcome,
            elapsed: start.elapsed(),
        }
    }
}
