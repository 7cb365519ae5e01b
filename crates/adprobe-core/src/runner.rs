use crate::client::ListingsClient;
use crate::scenarios::Scenario;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Runs scenarios one after another. A failing scenario is recorded and the
/// run moves on; nothing is retried.
pub struct Runner<R = SmallRng> {
    client: ListingsClient,
    rng: R,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub id: &'static str,
    pub title: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub reports: Vec<ScenarioReport>,
}

impl Runner<SmallRng> {
    pub fn new(client: ListingsClient) -> Self {
        Self::with_rng(client, SmallRng::from_entropy())
    }

    /// Same seed, same seller ids.
    pub fn seeded(client: ListingsClient, seed: u64) -> Self {
        Self::with_rng(client, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Runner<R> {
    pub fn with_rng(client: ListingsClient, rng: R) -> Self {
        Self { client, rng }
    }

    pub async fn run_one(&mut self, scenario: Scenario) -> ScenarioReport {
        let span = tracing::info_span!("scenario", id = scenario.id(), title = scenario.title());
        async {
            let start = Instant::now();
            let result = scenario.run(&self.client, &mut self.rng).await;
            let elapsed = start.elapsed();

            let outcome = match result {
                Ok(()) => {
                    tracing::info!(?elapsed, "passed");
                    Outcome::Passed
                }
                Err(err) => {
                    tracing::warn!(?elapsed, error = %err, "failed");
                    Outcome::Failed {
                        message: err.to_string(),
                    }
                }
            };

            ScenarioReport {
                id: scenario.id(),
                title: scenario.title(),
                outcome,
                elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            }
        }
        .instrument(span)
        .await
    }

    pub async fn run(&mut self, scenarios: &[Scenario]) -> RunSummary {
        tracing::info!(
            base_url = %self.client.base_url(),
            total = scenarios.len(),
            "running scenarios"
        );

        let mut summary = RunSummary::default();
        for scenario in scenarios {
            let report = self.run_one(*scenario).await;
            summary.reports.push(report);
        }

        tracing::info!(
            passed = summary.passed(),
            failed = summary.failed(),
            "run finished"
        );
        summary
    }

    pub async fn run_all(&mut self) -> RunSummary {
        self.run(&Scenario::all()).await
    }
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Passed => None,
            Outcome::Failed { message } => Some(message),
        }
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Passed => write!(f, "{} {}: passed", self.id, self.title),
            Outcome::Failed { message } => {
                write!(f, "{} {}: failed: {message}", self.id, self.title)
            }
        }
    }
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn report(&self, scenario: Scenario) -> Option<&ScenarioReport> {
        self.reports.iter().find(|r| r.id == scenario.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: Outcome) -> ScenarioReport {
        ScenarioReport {
            id: Scenario::GetMissingItem.id(),
            title: Scenario::GetMissingItem.title(),
            outcome,
            elapsed_ms: 12,
        }
    }

    #[test]
    fn report_serializes_flat() {
        let json = serde_json::to_value(report(Outcome::Failed {
            message: "Expected 404, got 200".into(),
        }))
        .unwrap();
        assert_eq!(json["id"], "TC-006");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["message"], "Expected 404, got 200");
        assert_eq!(json["elapsed_ms"], 12);

        let json = serde_json::to_value(report(Outcome::Passed)).unwrap();
        assert_eq!(json["status"], "passed");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn summary_counts() {
        let summary = RunSummary {
            reports: vec![
                report(Outcome::Passed),
                report(Outcome::Failed {
                    message: "boom".into(),
                }),
                report(Outcome::Passed),
            ],
        };
        assert_eq!(summary.passed(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.is_success());
        assert!(RunSummary::default().is_success());
    }

    #[test]
    fn display_includes_failure() {
        let r = report(Outcome::Failed {
            message: "Expected 404, got 500".into(),
        });
        assert_eq!(
            r.to_string(),
            "TC-006 Get by nonexistent id: failed: Expected 404, got 500"
        );
        assert_eq!(r.failure(), Some("Expected 404, got 500"));
        assert_eq!(r.elapsed(), Duration::from_millis(12));
    }
}
