//! Reply draft composition.
//!
//! Turns a ticket and its triage result into a prompt, enriched with the most
//! recent ticket routed to the same queue, and asks the draft provider for a
//! reply. Drafting reads memory but never writes it.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{TriageError, TriageResult};
use crate::memory::TicketMemory;
use crate::provider::{Classification, DraftProvider};
use crate::routing::{route, RoutingDecision};

/// Body of `POST /draft`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRequest {
    pub text: String,
    /// The `/analyze` response for this ticket, as the client received it.
    #[serde(default)]
    pub triage: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftResponse {
    pub draft: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub latency_ms: f64,
}

/// The parts of a triage payload the prompt needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageView {
    pub severity: String,
    pub intent: String,
    pub routing: RoutingDecision,
    pub ticket_fields: Option<Value>,
}

impl TriageView {
    /// Read a client-supplied triage payload.
    ///
    /// Missing labels read as empty. A missing or malformed `routing` is
    /// re-derived from the labels.
    pub fn from_value(triage: &Value) -> Self {
        let severity = label_in(&triage["severity"]);
        let intent = label_in(&triage["intent"]);
        let routing = serde_json::from_value(triage["routing"].clone())
            .unwrap_or_else(|_| route(&severity, &intent));
        let ticket_fields = match &triage["ticket_fields"] {
            Value::Null => None,
            v => Some(v.clone()),
        };
        Self {
            severity,
            intent,
            routing,
            ticket_fields,
        }
    }
}

fn label_in(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => Classification(map.clone())
            .single_label()
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Build the reply prompt.
pub fn build_prompt(ticket_text: &str, view: &TriageView, similar: Option<&str>) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are a support engineer drafting a reply to a customer ticket.\n\n");
    prompt.push_str(&format!("## Ticket\n\n{ticket_text}\n\n"));
    prompt.push_str(&format!(
        "## Triage\n\n\
         - Severity: {}\n\
         - Intent: {}\n\
         - Queue: {}\n\
         - Priority: {}\n\n",
        or_unknown(&view.severity),
        or_unknown(&view.intent),
        view.routing.next_queue,
        view.routing.priority
    ));
    if let Some(fields) = &view.ticket_fields {
        let rendered = serde_json::to_string_pretty(fields).unwrap_or_else(|_| fields.to_string());
        prompt.push_str(&format!("## Extracted fields\n\n{rendered}\n\n"));
    }
    if let Some(snippet) = similar {
        prompt.push_str(&format!(
            "## Recent ticket routed to the same queue\n\n{snippet}\n\n"
        ));
    }
    prompt.push_str(&format!(
        "Write a concise, empathetic reply under 150 words. Acknowledge the issue, \
         ask only for details that are actually missing, and say the {} team is handling it. \
         Do not promise resolution times.",
        view.routing.next_queue
    ));
    prompt
}

fn or_unknown(s: &str) -> &str {
    if s.is_empty() {
        "unknown"
    } else {
        s
    }
}

pub struct DraftComposer {
    provider: Arc<dyn DraftProvider>,
    memory: Arc<dyn TicketMemory>,
}

impl DraftComposer {
    pub fn new(provider: Arc<dyn DraftProvider>, memory: Arc<dyn TicketMemory>) -> Self {
        Self { provider, memory }
    }

    pub async fn compose(&self, request: &DraftRequest) -> TriageResult<DraftResponse> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(TriageError::validation("text must not be empty"));
        }

        let view = TriageView::from_value(&request.triage);
        let similar = self.memory.find_similar(text, &view.routing);
        let prompt = build_prompt(text, &view, similar.as_deref());

        let start = Instant::now();
        let completion = self.provider.complete(&prompt).await?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        info!(
            model = self.provider.model(),
            queue = %view.routing.next_queue,
            with_similar = similar.is_some(),
            tokens_in = completion.tokens_in,
            tokens_out = completion.tokens_out,
            latency_ms,
            "Reply drafted"
        );

        Ok(DraftResponse {
            draft: completion.text,
            tokens_in: completion.tokens_in,
            tokens_out: completion.tokens_out,
            latency_ms,
        })
    }
}
