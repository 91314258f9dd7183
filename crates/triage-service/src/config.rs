use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use triage::memory::DEFAULT_MEMORY_CAPACITY;
use triage::{HttpExtractionProvider, OpenAiDraftSettings, TriageConfig};

/// Language-model settings for reply drafts.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    /// Drafting answers 503 while this is unset.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl std::fmt::Debug for DraftConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self::from_lookup(&env_lookup)
    }
}

impl DraftConfig {
    fn from_lookup(var: &dyn Fn(&str) -> Option<String>) -> Self {
        let defaults = OpenAiDraftSettings::default();
        Self {
            api_key: var("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            base_url: var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: var("TRIAGE_DRAFT_MODEL").unwrap_or(defaults.model),
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address for `serve`.
    pub bind: String,
    /// Base URL of the extraction model sidecar.
    pub extractor_url: String,
    /// Extraction model identifier, reported by `/health`.
    pub model_id: String,
    /// Upper bound on each extraction call.
    pub provider_timeout_secs: u64,
    pub memory_capacity: usize,
    pub draft: DraftConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_lookup(&env_lookup)
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

impl ServiceConfig {
    /// Build from a variable lookup; unparsable numbers fall back to defaults.
    pub fn from_lookup(var: &dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            bind: var("TRIAGE_BIND").unwrap_or_else(|| "127.0.0.1:8000".into()),
            extractor_url: var("TRIAGE_EXTRACTOR_URL")
                .unwrap_or_else(|| "http://127.0.0.1:9000".into()),
            model_id: var("TRIAGE_MODEL_ID").unwrap_or_else(|| "fastino/gliner2-base-v1".into()),
            provider_timeout_secs: var("TRIAGE_PROVIDER_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            memory_capacity: var("TRIAGE_MEMORY_CAPACITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MEMORY_CAPACITY),
            draft: DraftConfig::from_lookup(var),
        }
    }

    /// Environment defaults, overlaid by `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml(&raw)
                    .with_context(|| format!("Failed to parse config {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Keys missing from the document keep their environment defaults.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs.max(1))
    }

    pub fn triage_config(&self) -> TriageConfig {
        TriageConfig {
            stage_timeout: self.provider_timeout(),
        }
    }

    pub fn extractor(&self) -> Result<HttpExtractionProvider> {
        HttpExtractionProvider::new(
            &self.extractor_url,
            &self.model_id,
            self.provider_timeout(),
        )
        .context("Failed to build extraction client")
    }

    pub fn draft_settings(&self) -> OpenAiDraftSettings {
        OpenAiDraftSettings {
            api_key: self.draft.api_key.clone(),
            base_url: self.draft.base_url.clone(),
            model: self.draft.model.clone(),
            ..OpenAiDraftSettings::default()
        }
    }
}
