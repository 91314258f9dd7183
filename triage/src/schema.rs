//! Analyze request shape and validation.
//!
//! The wire format keeps the camelCase keys the web client sends
//! (`entityLabels`, `severitySchema`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{TriageError, TriageResult};

/// Default entity confidence threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// `{field_name: [candidate_label, ...]}`, exactly one field in practice.
pub type ClassificationSchema = BTreeMap<String, Vec<String>>;

/// `{root_key: ["field::type::description", ...]}`.
pub type JsonSchema = BTreeMap<String, Vec<String>>;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Body of `POST /analyze` and the input of one triage run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    pub entity_labels: Vec<String>,
    pub severity_schema: ClassificationSchema,
    pub intent_schema: ClassificationSchema,
    pub json_schema: JsonSchema,
    pub preset: String,
}

impl AnalyzeRequest {
    /// Reject malformed requests before any provider is called.
    pub fn validate(&self) -> TriageResult<()> {
        if self.text.trim().is_empty() {
            return Err(TriageError::validation("text must not be empty"));
        }
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(TriageError::validation(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if self.entity_labels.is_empty() {
            return Err(TriageError::validation("entityLabels must not be empty"));
        }
        if self.entity_labels.iter().any(|l| l.trim().is_empty()) {
            return Err(TriageError::validation("entityLabels must not contain blanks"));
        }
        validate_classification("severitySchema", &self.severity_schema)?;
        validate_classification("intentSchema", &self.intent_schema)?;
        validate_json_schema(&self.json_schema)?;
        Ok(())
    }
}

fn validate_classification(name: &str, schema: &ClassificationSchema) -> TriageResult<()> {
    if schema.len() != 1 {
        return Err(TriageError::validation(format!(
            "{name} must declare exactly one field, got {}",
            schema.len()
        )));
    }
    for (field, labels) in schema {
        if field.trim().is_empty() {
            return Err(TriageError::validation(format!("{name} field name is empty")));
        }
        if labels.is_empty() {
            return Err(TriageError::validation(format!(
                "{name}.{field} has no candidate labels"
            )));
        }
    }
    Ok(())
}

fn validate_json_schema(schema: &JsonSchema) -> TriageResult<()> {
    if schema.is_empty() {
        return Err(TriageError::validation("jsonSchema must declare a root key"));
    }
    for (root, specs) in schema {
        if specs.is_empty() {
            return Err(TriageError::validation(format!(
                "jsonSchema.{root} has no field specs"
            )));
        }
        for spec in specs {
            FieldSpec::parse(spec)?;
        }
    }
    Ok(())
}

/// One `name::type::description` entry of a JSON extraction schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: Option<String>,
    pub description: Option<String>,
}

impl FieldSpec {
    /// Type and description are optional; the name is not.
    pub fn parse(spec: &str) -> TriageResult<Self> {
        let mut parts = spec.splitn(3, "::");
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(TriageError::validation(format!(
                "field spec '{spec}' has no name"
            )));
        }
        let non_empty = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Ok(Self {
            name: name.to_string(),
            kind: non_empty(parts.next()),
            description: non_empty(parts.next()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AnalyzeRequest {
        AnalyzeRequest {
            text: "Refund invoice #123".into(),
            threshold: 0.6,
            entity_labels: vec!["invoice_id".into()],
            severity_schema: BTreeMap::from([(
                "severity".to_string(),
                vec!["sev0".to_string(), "sev3".to_string()],
            )]),
            intent_schema: BTreeMap::from([(
                "intent".to_string(),
                vec!["refund_request".to_string()],
            )]),
            json_schema: BTreeMap::from([(
                "ticket_fields".to_string(),
                vec!["invoice_id::str::Invoice ID if present".to_string()],
            )]),
            preset: "billing".into(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        for bad in [-0.1, 1.01, f64::NAN] {
            let mut req = valid();
            req.threshold = bad;
            assert!(matches!(req.validate(), Err(TriageError::Validation(_))));
        }
        for ok in [0.0, 1.0] {
            let mut req = valid();
            req.threshold = ok;
            assert!(req.validate().is_ok());
        }
    }

    #[test]
    fn test_blank_text_rejected() {
        let mut req = valid();
        req.text = "   \n".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_classification_needs_one_field() {
        let mut req = valid();
        req.intent_schema.insert("topic".into(), vec!["a".into()]);
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("intentSchema"));

        let mut req = valid();
        req.severity_schema.clear();
        assert!(req.validate().is_err());

        let mut req = valid();
        req.severity_schema.insert("severity".into(), vec![]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_json_schema_specs() {
        let mut req = valid();
        req.json_schema
            .insert("ticket_fields".into(), vec!["::str::nameless".into()]);
        assert!(req.validate().is_err());

        let mut req = valid();
        req.json_schema.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_field_spec_parse() {
        let spec = FieldSpec::parse("idp::str::Identity provider (Okta/AzureAD/etc.)").unwrap();
        assert_eq!(spec.name, "idp");
        assert_eq!(spec.kind.as_deref(), Some("str"));
        assert_eq!(
            spec.description.as_deref(),
            Some("Identity provider (Okta/AzureAD/etc.)")
        );

        let bare = FieldSpec::parse("region").unwrap();
        assert!(bare.kind.is_none());
        assert!(bare.description.is_none());
    }

    #[test]
    fn test_wire_keys_and_default_threshold() {
        let req: AnalyzeRequest = serde_json::from_value(serde_json::json!({
            "text": "hi",
            "entityLabels": ["company"],
            "severitySchema": {"severity": ["sev0"]},
            "intentSchema": {"intent": ["bug"]},
            "jsonSchema": {"ticket_fields": ["company::str::Company name"]},
            "preset": "saas_support"
        }))
        .unwrap();
        assert_eq!(req.threshold, DEFAULT_THRESHOLD);
        assert_eq!(req.entity_labels, vec!["company"]);

        let back = serde_json::to_value(&req).unwrap();
        assert!(back.get("severitySchema").is_some());
    }
}
