//! External collaborator contracts.
//!
//! The extraction model and the language model are consumed as black boxes.
//! The orchestrator receives ready-to-use handles at construction and never
//! manages their lifecycle.
//!
//! - [`extraction`]: HTTP client for the extraction model sidecar
//! - [`draft`]: OpenAI-compatible chat completion client

pub mod draft;
pub mod extraction;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TriageError, TriageResult};
use crate::schema::{ClassificationSchema, JsonSchema};

pub use draft::{OpenAiDraftProvider, OpenAiDraftSettings};
pub use extraction::HttpExtractionProvider;

/// Entity extraction, classification and structured field extraction.
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Model identifier reported by `/health`.
    fn model_id(&self) -> &str;

    /// Entity label → extracted value(s).
    async fn extract_entities(
        &self,
        text: &str,
        labels: &[String],
        threshold: f64,
    ) -> TriageResult<Value>;

    /// Field name → chosen label.
    async fn classify_text(
        &self,
        text: &str,
        schema: &ClassificationSchema,
    ) -> TriageResult<Classification>;

    /// Root key → extracted structured fields.
    async fn extract_json(&self, text: &str, schema: &JsonSchema) -> TriageResult<Value>;

    /// Whether the model is loaded and reachable.
    async fn is_available(&self) -> bool;
}

/// Text generation for reply drafts.
#[async_trait]
pub trait DraftProvider: Send + Sync {
    fn model(&self) -> &str;

    async fn complete(&self, prompt: &str) -> TriageResult<DraftCompletion>;
}

/// Generated text plus token usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftCompletion {
    pub text: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
}

/// Classification output: one field name mapped to its chosen label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification(pub Map<String, Value>);

impl Classification {
    pub fn single(field: &str, label: &str) -> Self {
        let mut map = Map::new();
        map.insert(field.to_string(), Value::String(label.to_string()));
        Self(map)
    }

    /// The one label this classification carries.
    ///
    /// Accepts a plain string, an object with a `label` string, or a
    /// one-element array of either. Zero fields, several fields, or any other
    /// value shape is a validation error.
    pub fn single_label(&self) -> TriageResult<String> {
        let mut fields = self.0.iter();
        let (field, value) = match (fields.next(), fields.next()) {
            (Some(only), None) => only,
            (None, _) => {
                return Err(TriageError::validation(
                    "classification returned no labeled field",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(TriageError::validation(format!(
                    "classification returned {} fields, expected exactly one",
                    self.0.len()
                )))
            }
        };
        label_of(value).ok_or_else(|| {
            TriageError::validation(format!(
                "classification field '{field}' has no usable label: {value}"
            ))
        })
    }
}

fn label_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("label").and_then(Value::as_str).map(str::to_string),
        Value::Array(items) if items.len() == 1 => label_of(&items[0]),
        _ => None,
    }
}
