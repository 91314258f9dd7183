//! Benchmark Module
//!
//! Measures routing quality over a fixed golden ticket set.
//!
//! # Architecture
//!
//! ```text
//! golden_tickets.json → load_golden_tickets → MetricsHarness
//!                                                  ↓
//!                          ┌──────────────────────┼──────────────────────┐
//!                          ↓                      ↓                      ↓
//!                    Correctness            Stability               Latency
//!                 (per threshold)      (repeat, canonical eq)   (stage timings)
//!                          └──────────────────────┼──────────────────────┘
//!                                                 ↓
//!                                          MetricsResults → format_report
//! ```

pub mod golden;
pub mod harness;
pub mod metrics;
pub mod report;

pub use golden::{load_golden_tickets, GoldenTicket};
pub use harness::{HarnessConfig, HarnessError, MetricsHarness};
pub use metrics::{
    pct, percentile, summarize_latency, LatencySummary, MetricsResults, StabilityResult,
    StabilityTicket, ThresholdAccuracy,
};
pub use report::format_report;
