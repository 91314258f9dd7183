//! Golden-set metrics harness.
//!
//! Replays the golden tickets through full triage in three independent,
//! strictly sequential passes:
//!
//! - **Correctness**: every ticket at every threshold, produced routing
//!   compared to the expected routing.
//! - **Stability**: a subset of tickets run repeatedly at one threshold; the
//!   canonical routing must be identical on every run.
//! - **Latency**: every ticket once, raw stage timings kept.
//!
//! Routing mismatches are metrics, not errors. A provider failure stops the
//! run immediately and is returned to the caller.

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use super::golden::GoldenTicket;
use super::metrics::{MetricsResults, StabilityResult, StabilityTicket, ThresholdAccuracy};
use crate::canon::canonical_json;
use crate::error::TriageError;
use crate::orchestrator::{StageTimings, TriageOutcome, TriageService};

/// Errors that stop a harness run.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("triage failed for golden ticket {index} at threshold {threshold}: {source}")]
    Triage {
        index: usize,
        threshold: f64,
        #[source]
        source: TriageError,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not canonicalize routing output: {0}")]
    Canonicalize(#[from] serde_json::Error),
}

/// Pass parameters.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Thresholds for the correctness pass, in report order.
    pub thresholds: Vec<f64>,
    /// Golden indices checked for stability; out-of-range indices are skipped.
    pub stability_indices: Vec<usize>,
    pub stability_runs: usize,
    pub stability_threshold: f64,
    pub latency_threshold: f64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![0.5, 0.6, 0.7, 0.75],
            stability_indices: vec![0, 5, 10, 20, 30],
            stability_runs: 10,
            stability_threshold: 0.6,
            latency_threshold: 0.6,
        }
    }
}

pub struct MetricsHarness<'a> {
    service: &'a TriageService,
    golden: &'a [GoldenTicket],
    config: HarnessConfig,
}

impl<'a> MetricsHarness<'a> {
    pub fn new(service: &'a TriageService, golden: &'a [GoldenTicket], config: HarnessConfig) -> Self {
        Self {
            service,
            golden,
            config,
        }
    }

    /// Run all three passes and assemble the results file.
    pub async fn run(&self) -> Result<MetricsResults, HarnessError> {
        let correctness = self.run_correctness().await?;
        let stability = self.run_stability().await?;
        let latency = self.run_latency().await?;

        let mut results = MetricsResults {
            thresholds: self.config.thresholds.clone(),
            stability: Some(stability),
            latency,
            generated_at: Some(chrono::Utc::now()),
            ..Default::default()
        };
        for (threshold, accuracy) in correctness {
            results
                .correctness
                .insert(MetricsResults::threshold_key(threshold), accuracy);
        }
        Ok(results)
    }

    /// Accuracy per threshold, in configured order.
    pub async fn run_correctness(&self) -> Result<Vec<(f64, ThresholdAccuracy)>, HarnessError> {
        let mut per_threshold = Vec::with_capacity(self.config.thresholds.len());
        for &threshold in &self.config.thresholds {
            let mut accuracy = ThresholdAccuracy::default();
            for (index, ticket) in self.golden.iter().enumerate() {
                let outcome = self.triage(index, ticket, threshold).await?;
                if outcome.routing != ticket.expected_routing {
                    tracing::debug!(
                        index,
                        threshold,
                        expected = %ticket.expected_routing.summary(),
                        actual = %outcome.routing.summary(),
                        "Routing mismatch"
                    );
                }
                accuracy.record(&ticket.expected_routing, &outcome.routing);
            }
            info!(
                threshold,
                total = accuracy.total,
                both_pct = accuracy.accuracy_both_pct,
                "Correctness pass complete"
            );
            per_threshold.push((threshold, accuracy));
        }
        Ok(per_threshold)
    }

    /// Repeat each stability ticket and compare canonical routing outputs.
    pub async fn run_stability(&self) -> Result<StabilityResult, HarnessError> {
        let threshold = self.config.stability_threshold;
        let mut tickets = Vec::new();
        for &index in &self.config.stability_indices {
            let Some(ticket) = self.golden.get(index) else {
                warn!(index, golden = self.golden.len(), "Stability index out of range, skipped");
                continue;
            };
            let mut outputs = BTreeSet::new();
            for _ in 0..self.config.stability_runs {
                let outcome = self.triage(index, ticket, threshold).await?;
                outputs.insert(canonical_json(&outcome.routing)?);
            }
            if outputs.len() != 1 {
                warn!(index, distinct = outputs.len(), "Routing not stable across runs");
            }
            tickets.push(StabilityTicket {
                index,
                runs: self.config.stability_runs,
                distinct_outputs: outputs.len(),
            });
        }
        let result = StabilityResult::from_tickets(self.config.stability_runs, tickets);
        info!(
            verdict = result.verdict(),
            tickets = result.tickets_checked,
            runs = result.runs_per_ticket,
            "Stability pass complete"
        );
        Ok(result)
    }

    /// Raw stage timings, one entry per golden ticket.
    pub async fn run_latency(&self) -> Result<Vec<StageTimings>, HarnessError> {
        let threshold = self.config.latency_threshold;
        let mut timings = Vec::with_capacity(self.golden.len());
        for (index, ticket) in self.golden.iter().enumerate() {
            let outcome = self.triage(index, ticket, threshold).await?;
            timings.push(outcome.timings_ms);
        }
        info!(samples = timings.len(), "Latency pass complete");
        Ok(timings)
    }

    async fn triage(
        &self,
        index: usize,
        ticket: &GoldenTicket,
        threshold: f64,
    ) -> Result<TriageOutcome, HarnessError> {
        let request = ticket.preset.build_request(&ticket.text, threshold);
        self.service
            .analyze(&request)
            .await
            .map_err(|source| HarnessError::Triage {
                index,
                threshold,
                source,
            })
    }
}
