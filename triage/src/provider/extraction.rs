//! HTTP client for the extraction model sidecar.
//!
//! The sidecar hosts the extraction model and exposes one endpoint per call:
//!
//! ```text
//! GET  /health            → 2xx once the model is loaded
//! POST /extract_entities  {text, labels, threshold} → {label: values}
//! POST /classify_text     {text, schema}            → {field: label}
//! POST /extract_json      {text, schema}            → {root: fields}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Classification, ExtractionProvider};
use crate::error::{TriageError, TriageResult};
use crate::schema::{ClassificationSchema, JsonSchema};

const PROVIDER: &str = "extraction model";

pub struct HttpExtractionProvider {
    base_url: String,
    model_id: String,
    client: reqwest::Client,
}

impl HttpExtractionProvider {
    pub fn new(
        base_url: impl Into<String>,
        model_id: impl Into<String>,
        timeout: Duration,
    ) -> TriageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TriageError::provider(PROVIDER, format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model_id: model_id.into(),
            client,
        })
    }

    async fn post(&self, path: &str, body: Value) -> TriageResult<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TriageError::unavailable(PROVIDER, format!("cannot reach {url}: {e}"))
                } else {
                    TriageError::provider(PROVIDER, format!("{path}: {e}"))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(TriageError::unavailable(PROVIDER, "model not loaded"));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TriageError::provider(
                PROVIDER,
                format!("{path} returned {status}: {body}"),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| TriageError::provider(PROVIDER, format!("{path} body: {e}")))
    }
}

#[async_trait]
impl ExtractionProvider for HttpExtractionProvider {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn extract_entities(
        &self,
        text: &str,
        labels: &[String],
        threshold: f64,
    ) -> TriageResult<Value> {
        self.post(
            "extract_entities",
            json!({ "text": text, "labels": labels, "threshold": threshold }),
        )
        .await
    }

    async fn classify_text(
        &self,
        text: &str,
        schema: &ClassificationSchema,
    ) -> TriageResult<Classification> {
        let value = self
            .post("classify_text", json!({ "text": text, "schema": schema }))
            .await?;
        match value {
            Value::Object(map) => Ok(Classification(map)),
            other => Err(TriageError::provider(
                PROVIDER,
                format!("classify_text returned non-object: {other}"),
            )),
        }
    }

    async fn extract_json(&self, text: &str, schema: &JsonSchema) -> TriageResult<Value> {
        self.post("extract_json", json!({ "text": text, "schema": schema }))
            .await
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let p = HttpExtractionProvider::new(
            "http://127.0.0.1:9000/",
            "fastino/gliner2-base-v1",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(p.base_url, "http://127.0.0.1:9000");
        assert_eq!(p.model_id(), "fastino/gliner2-base-v1");
    }

    #[tokio::test]
    async fn test_unreachable_sidecar_is_unavailable() {
        // Port 9 (discard) is never served in test environments.
        let p = HttpExtractionProvider::new("http://127.0.0.1:9", "m", Duration::from_secs(2))
            .unwrap();
        assert!(!p.is_available().await);
        let err = p
            .extract_entities("text", &["company".to_string()], 0.5)
            .await
            .unwrap_err();
        assert!(matches!(err, TriageError::ProviderUnavailable { .. }));
    }
}
