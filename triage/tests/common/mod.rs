//! Shared in-process providers for triage integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use triage::schema::{ClassificationSchema, JsonSchema};
use triage::{
    Classification, DraftCompletion, DraftProvider, ExtractionProvider, RecentTicketMemory,
    TriageConfig, TriageError, TriageResult, TriageService,
};

pub fn golden_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/golden_tickets.json")
}

/// Which provider call should misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    /// Every classify call fails as unavailable.
    ClassifyUnavailable,
    /// Structured extraction returns a provider error.
    ExtractJsonError,
    /// Severity classification comes back with two fields.
    TwoSeverityFields,
    /// Entity extraction never finishes.
    HangEntities,
    /// Intent flips between calls.
    Flaky,
}

/// Keyword-driven stand-in for the extraction model.
pub struct KeywordExtractor {
    pub fault: Fault,
    calls: AtomicUsize,
    classify_calls: AtomicUsize,
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self::with_fault(Fault::None)
    }

    pub fn with_fault(fault: Fault) -> Self {
        Self {
            fault,
            calls: AtomicUsize::new(0),
            classify_calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn severity_for(text: &str) -> &'static str {
        let t = text.to_lowercase();
        if ["outage", "down", "nobody can"].iter().any(|k| t.contains(k)) {
            "sev0"
        } else if ["urgent", "blocked", "incident", "all users"]
            .iter()
            .any(|k| t.contains(k))
        {
            "sev1"
        } else if t.contains("how do i") || t.contains("question") {
            "sev3"
        } else {
            "sev2"
        }
    }

    /// First candidate whose leading token appears in the text, else the last one.
    fn pick_label(text: &str, candidates: &[String]) -> String {
        let t = text.to_lowercase();
        candidates
            .iter()
            .find(|label| {
                let key = label.split('_').next().unwrap_or(label);
                key != "other" && t.contains(key)
            })
            .or_else(|| candidates.last())
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ExtractionProvider for KeywordExtractor {
    fn model_id(&self) -> &str {
        "keyword-test-model"
    }

    async fn extract_entities(
        &self,
        text: &str,
        labels: &[String],
        threshold: f64,
    ) -> TriageResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fault == Fault::HangEntities {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        let mut found = Map::new();
        for label in labels {
            if text.to_lowercase().contains(label.as_str()) {
                found.insert(label.clone(), json!([{"text": label, "confidence": threshold}]));
            }
        }
        Ok(json!({ "entities": found }))
    }

    async fn classify_text(
        &self,
        text: &str,
        schema: &ClassificationSchema,
    ) -> TriageResult<Classification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let n = self.classify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fault == Fault::ClassifyUnavailable {
            return Err(TriageError::unavailable("extraction model", "model not loaded"));
        }
        let (field, candidates) = schema.iter().next().expect("schema has one field");
        if field == "severity" {
            let mut c = Classification::single(field, Self::severity_for(text));
            if self.fault == Fault::TwoSeverityFields {
                c.0.insert("urgency".into(), json!("high"));
            }
            return Ok(c);
        }
        let label = if self.fault == Fault::Flaky && n % 4 == 1 {
            "incident".to_string()
        } else {
            Self::pick_label(text, candidates)
        };
        Ok(Classification::single(field, &label))
    }

    async fn extract_json(&self, text: &str, schema: &JsonSchema) -> TriageResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fault == Fault::ExtractJsonError {
            return Err(TriageError::provider("extraction model", "extract_json returned 500"));
        }
        let root = schema.keys().next().cloned().unwrap_or_default();
        let summary: String = text.chars().take(40).collect();
        let mut out = Map::new();
        out.insert(root, json!([{ "summary": summary }]));
        Ok(Value::Object(out))
    }

    async fn is_available(&self) -> bool {
        self.fault != Fault::ClassifyUnavailable
    }
}

/// Records prompts and answers with a canned reply.
pub struct RecordingDrafter {
    pub prompts: Mutex<Vec<String>>,
    pub unavailable: bool,
}

impl RecordingDrafter {
    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            unavailable: false,
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl DraftProvider for RecordingDrafter {
    fn model(&self) -> &str {
        "recording-drafter"
    }

    async fn complete(&self, prompt: &str) -> TriageResult<DraftCompletion> {
        if self.unavailable {
            return Err(TriageError::unavailable("draft model", "OPENAI_API_KEY is not set"));
        }
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(DraftCompletion {
            text: "Thanks for reaching out, we're on it.".into(),
            tokens_in: prompt.split_whitespace().count() as u64,
            tokens_out: 8,
        })
    }
}

pub fn service_with(extractor: Arc<KeywordExtractor>) -> (TriageService, Arc<RecentTicketMemory>) {
    let memory = Arc::new(RecentTicketMemory::new());
    let service = TriageService::new(extractor, memory.clone(), TriageConfig::default());
    (service, memory)
}
