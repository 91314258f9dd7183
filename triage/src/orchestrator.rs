//! Triage orchestrator.
//!
//! Runs one ticket through the extraction provider, routes it, and records
//! the outcome in recent-ticket memory:
//!
//! ```text
//! validate → entities → severity → intent → extract_json → route → remember
//!            └──────────── timed, each bounded by stage_timeout ───┘
//! ```
//!
//! Any stage error aborts the request. Memory is only written once every
//! stage and routing have succeeded.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{TriageError, TriageResult};
use crate::memory::TicketMemory;
use crate::provider::{Classification, ExtractionProvider};
use crate::routing::{route, RoutingDecision};
use crate::schema::AnalyzeRequest;

/// Stage keys, in execution order, followed by the total.
pub const STAGE_KEYS: [&str; 5] = ["entities", "severity", "intent", "extract_json", "total"];

/// Wall-clock duration of each stage in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimings {
    pub entities: f64,
    pub severity: f64,
    pub intent: f64,
    pub extract_json: f64,
    pub total: f64,
}

impl StageTimings {
    /// Look up a stage by its key in [`STAGE_KEYS`].
    pub fn get(&self, stage: &str) -> Option<f64> {
        match stage {
            "entities" => Some(self.entities),
            "severity" => Some(self.severity),
            "intent" => Some(self.intent),
            "extract_json" => Some(self.extract_json),
            "total" => Some(self.total),
            _ => None,
        }
    }
}

/// Full result of one triage run; also the `/analyze` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageOutcome {
    pub preset: String,
    pub entities: Value,
    pub severity: Classification,
    pub intent: Classification,
    pub ticket_fields: Value,
    pub routing: RoutingDecision,
    pub timings_ms: StageTimings,
}

#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Upper bound on each provider call.
    pub stage_timeout: Duration,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            stage_timeout: Duration::from_secs(30),
        }
    }
}

pub struct TriageService {
    extractor: Arc<dyn ExtractionProvider>,
    memory: Arc<dyn TicketMemory>,
    config: TriageConfig,
}

impl TriageService {
    pub fn new(
        extractor: Arc<dyn ExtractionProvider>,
        memory: Arc<dyn TicketMemory>,
        config: TriageConfig,
    ) -> Self {
        Self {
            extractor,
            memory,
            config,
        }
    }

    pub fn extractor(&self) -> &Arc<dyn ExtractionProvider> {
        &self.extractor
    }

    /// Triage one ticket.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> TriageResult<TriageOutcome> {
        request.validate()?;
        let text = request.text.trim();
        let extractor = &self.extractor;

        let t0 = Instant::now();
        let entities = self
            .stage(
                "entities",
                extractor.extract_entities(text, &request.entity_labels, request.threshold),
            )
            .await?;
        let t1 = Instant::now();

        let severity = self
            .stage(
                "severity",
                extractor.classify_text(text, &request.severity_schema),
            )
            .await?;
        let severity_label = severity.single_label()?;
        let t2 = Instant::now();

        let intent = self
            .stage("intent", extractor.classify_text(text, &request.intent_schema))
            .await?;
        let intent_label = intent.single_label()?;
        let t3 = Instant::now();

        let ticket_fields = self
            .stage("extract_json", extractor.extract_json(text, &request.json_schema))
            .await?;
        let t4 = Instant::now();

        let routing = route(&severity_label, &intent_label);
        self.memory
            .remember(text, routing, &intent_label, &severity_label);

        let timings_ms = StageTimings {
            entities: millis(t1 - t0),
            severity: millis(t2 - t1),
            intent: millis(t3 - t2),
            extract_json: millis(t4 - t3),
            total: millis(t4 - t0),
        };

        info!(
            preset = %request.preset,
            severity = %severity_label,
            intent = %intent_label,
            routing = %routing.summary(),
            total_ms = timings_ms.total,
            "Ticket triaged"
        );

        Ok(TriageOutcome {
            preset: request.preset.clone(),
            entities,
            severity,
            intent,
            ticket_fields,
            routing,
            timings_ms,
        })
    }

    async fn stage<T, F>(&self, name: &str, call: F) -> TriageResult<T>
    where
        F: Future<Output = TriageResult<T>>,
    {
        debug!(stage = name, "Calling extraction provider");
        match tokio::time::timeout(self.config.stage_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(stage = name, error = %e, "Triage stage failed");
                Err(e)
            }
            Err(_) => {
                warn!(stage = name, timeout = ?self.config.stage_timeout, "Triage stage timed out");
                Err(TriageError::Timeout {
                    stage: name.to_string(),
                    after: self.config.stage_timeout,
                })
            }
        }
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
