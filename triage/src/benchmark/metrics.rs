//! Harness metrics: routing accuracy, stability verdict, latency statistics.
//!
//! Collected incrementally during one harness run and serialized once as
//! the metrics results file consumed by the report renderer.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::harness::HarnessError;
use crate::orchestrator::{StageTimings, STAGE_KEYS};
use crate::routing::RoutingDecision;

/// Linear-interpolated percentile of an ascending-sorted slice.
///
/// `p` is in `[0, 100]`. Empty input yields `0.0`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let last = sorted.len() - 1;
    let k = last as f64 * (p / 100.0);
    let f = (k.floor() as usize).min(last);
    let c = (f + 1).min(last);
    sorted[f] + (k - f as f64) * (sorted[c] - sorted[f])
}

/// Percentage rounded to one decimal; zero when `total` is zero.
pub fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (1000.0 * count as f64 / total as f64).round() / 10.0
}

/// Routing accuracy at one threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAccuracy {
    pub total: usize,
    pub correct_next_queue: usize,
    pub correct_priority: usize,
    pub correct_both: usize,
    pub accuracy_next_queue_pct: f64,
    pub accuracy_priority_pct: f64,
    pub accuracy_both_pct: f64,
}

impl ThresholdAccuracy {
    /// Count one comparison and refresh the derived percentages.
    pub fn record(&mut self, expected: &RoutingDecision, actual: &RoutingDecision) {
        let queue_ok = expected.next_queue == actual.next_queue;
        let priority_ok = expected.priority == actual.priority;

        self.total += 1;
        self.correct_next_queue += usize::from(queue_ok);
        self.correct_priority += usize::from(priority_ok);
        self.correct_both += usize::from(queue_ok && priority_ok);

        self.accuracy_next_queue_pct = pct(self.correct_next_queue, self.total);
        self.accuracy_priority_pct = pct(self.correct_priority, self.total);
        self.accuracy_both_pct = pct(self.correct_both, self.total);
    }
}

/// Repeated-run outcome for one golden ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityTicket {
    pub index: usize,
    pub runs: usize,
    /// Number of distinct canonical routing outputs observed.
    pub distinct_outputs: usize,
}

impl StabilityTicket {
    pub fn stable(&self) -> bool {
        self.distinct_outputs == 1
    }
}

/// Determinism verdict across the stability subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityResult {
    pub passed: bool,
    pub runs_per_ticket: usize,
    /// Indices actually run; indices past the end of the golden set are not counted.
    pub tickets_checked: usize,
    pub stable_tickets: usize,
    /// Share of checked tickets that were stable, rounded to one decimal.
    /// 100 when nothing was checked.
    pub output_stability_pct: f64,
    #[serde(default)]
    pub tickets: Vec<StabilityTicket>,
}

impl StabilityResult {
    pub fn from_tickets(runs_per_ticket: usize, tickets: Vec<StabilityTicket>) -> Self {
        let stable = tickets.iter().filter(|t| t.stable()).count();
        Self {
            passed: stable == tickets.len(),
            runs_per_ticket,
            tickets_checked: tickets.len(),
            stable_tickets: stable,
            output_stability_pct: if tickets.is_empty() {
                100.0
            } else {
                pct(stable, tickets.len())
            },
            tickets,
        }
    }

    pub fn verdict(&self) -> &'static str {
        if self.passed {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

/// Summary statistics for one stage's latency samples, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub stage: String,
    pub samples: usize,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub max: f64,
}

impl LatencySummary {
    /// `None` when there are no finite samples.
    pub fn from_samples(stage: &str, samples: &[f64]) -> Option<Self> {
        let mut vals: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return None;
        }
        vals.sort_by(f64::total_cmp);
        let n = vals.len();
        Some(Self {
            stage: stage.to_string(),
            samples: n,
            mean: vals.iter().sum::<f64>() / n as f64,
            p50: percentile(&vals, 50.0),
            p95: percentile(&vals, 95.0),
            max: vals[n - 1],
        })
    }
}

/// Per-stage summaries in [`STAGE_KEYS`] order.
pub fn summarize_latency(timings: &[StageTimings]) -> Vec<LatencySummary> {
    STAGE_KEYS
        .iter()
        .filter_map(|stage| {
            let samples: Vec<f64> = timings.iter().filter_map(|t| t.get(stage)).collect();
            LatencySummary::from_samples(stage, &samples)
        })
        .collect()
}

/// The metrics results file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsResults {
    /// Threshold (as text, e.g. `"0.75"`) → accuracy.
    #[serde(default)]
    pub correctness: BTreeMap<String, ThresholdAccuracy>,
    #[serde(default)]
    pub stability: Option<StabilityResult>,
    #[serde(default)]
    pub latency: Vec<StageTimings>,
    #[serde(default)]
    pub thresholds: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl MetricsResults {
    pub fn threshold_key(threshold: f64) -> String {
        format!("{threshold}")
    }

    /// Correctness entries sorted by numeric threshold.
    pub fn correctness_sorted(&self) -> Vec<(&str, &ThresholdAccuracy)> {
        let mut rows: Vec<(&str, &ThresholdAccuracy)> = self
            .correctness
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        rows.sort_by(|a, b| {
            let fa = a.0.parse::<f64>().unwrap_or(f64::INFINITY);
            let fb = b.0.parse::<f64>().unwrap_or(f64::INFINITY);
            fa.total_cmp(&fb).then_with(|| a.0.cmp(b.0))
        });
        rows
    }

    pub fn latency_summary(&self) -> Vec<LatencySummary> {
        summarize_latency(&self.latency)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), HarnessError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| HarnessError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| HarnessError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read_from(path: &Path) -> Result<Self, HarnessError> {
        let raw = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| HarnessError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
