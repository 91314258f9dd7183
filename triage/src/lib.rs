//! Support Ticket Triage Library
//!
//! This library provides:
//! - A deterministic rule-based router from (severity, intent) to (queue, priority)
//! - A bounded recent-ticket memory used as context for reply drafts
//! - A triage orchestrator over an external extraction model
//! - A draft composer over an external language model
//! - A golden-set metrics harness (correctness, stability, latency) and report renderer
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use triage::{HttpExtractionProvider, Preset, RecentTicketMemory, TriageConfig, TriageService};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let extractor = HttpExtractionProvider::new(
//!     "http://127.0.0.1:9000",
//!     "fastino/gliner2-base-v1",
//!     Duration::from_secs(30),
//! )?;
//! let service = TriageService::new(
//!     Arc::new(extractor),
//!     Arc::new(RecentTicketMemory::new()),
//!     TriageConfig::default(),
//! );
//! let request = Preset::Billing.build_request("Customer wants refund for invoice #123", 0.6);
//! let outcome = service.analyze(&request).await?;
//! println!("{}", outcome.routing.summary());
//! # Ok(())
//! # }
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod benchmark;
pub mod canon;
pub mod draft;
pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod presets;
pub mod provider;
pub mod routing;
pub mod schema;

pub use benchmark::{
    format_report, load_golden_tickets, percentile, GoldenTicket, HarnessConfig, HarnessError,
    MetricsHarness, MetricsResults,
};
pub use draft::{DraftComposer, DraftRequest, DraftResponse};
pub use error::{ErrorClass, TriageError, TriageResult};
pub use memory::{MemoryEntry, RecentTicketMemory, TicketMemory};
pub use orchestrator::{StageTimings, TriageConfig, TriageOutcome, TriageService};
pub use presets::Preset;
pub use provider::{
    Classification, DraftCompletion, DraftProvider, ExtractionProvider, HttpExtractionProvider,
    OpenAiDraftProvider, OpenAiDraftSettings,
};
pub use routing::{route, Priority, Queue, RoutingDecision};
pub use schema::AnalyzeRequest;
