//! OpenAI-compatible chat completion client for reply drafts.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{DraftCompletion, DraftProvider};
use crate::error::{TriageError, TriageResult};

const PROVIDER: &str = "draft model";

/// Connection settings for [`OpenAiDraftProvider`].
#[derive(Debug, Clone)]
pub struct OpenAiDraftSettings {
    /// `None` or empty means drafting is unavailable.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for OpenAiDraftSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.3,
            max_tokens: 400,
            timeout: Duration::from_secs(60),
        }
    }
}

pub struct OpenAiDraftProvider {
    settings: OpenAiDraftSettings,
    client: reqwest::Client,
}

impl OpenAiDraftProvider {
    pub fn new(settings: OpenAiDraftSettings) -> TriageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| TriageError::provider(PROVIDER, format!("HTTP client: {e}")))?;
        Ok(Self { settings, client })
    }

    fn api_key(&self) -> TriageResult<&str> {
        self.settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TriageError::unavailable(PROVIDER, "OPENAI_API_KEY is not set"))
    }
}

#[async_trait]
impl DraftProvider for OpenAiDraftProvider {
    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn complete(&self, prompt: &str) -> TriageResult<DraftCompletion> {
        let api_key = self.api_key()?;

        let request_body = serde_json::json!({
            "model": self.settings.model,
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
            "messages": [{
                "role": "user",
                "content": prompt
            }]
        });

        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| TriageError::provider(PROVIDER, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TriageError::provider(
                PROVIDER,
                format!("API error ({status}): {body}"),
            ));
        }

        let resp_json: Value = response
            .json()
            .await
            .map_err(|e| TriageError::provider(PROVIDER, format!("response body: {e}")))?;

        parse_completion(&resp_json)
    }
}

fn parse_completion(resp_json: &Value) -> TriageResult<DraftCompletion> {
    let text = resp_json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| TriageError::provider(PROVIDER, "response has no message content"))?
        .trim()
        .to_string();
    Ok(DraftCompletion {
        text,
        tokens_in: resp_json["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
        tokens_out: resp_json["usage"]["completion_tokens"].as_u64().unwrap_or(0),
    })
}
