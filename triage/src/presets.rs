//! Preset schema tables.
//!
//! Each preset fixes the entity labels, the intent label set and the JSON
//! ticket-field schema sent with a ticket. The web client and the metrics
//! harness build identical payloads from these tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::schema::AnalyzeRequest;

pub const SEVERITY_LABELS: &[&str] = &["sev0", "sev1", "sev2", "sev3"];

/// Root key of every preset's JSON schema.
pub const TICKET_FIELDS_ROOT: &str = "ticket_fields";

/// Deserializes through [`Preset::from_key`], so unknown keys read as the
/// default preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    SaasSupport,
    AuthIncident,
    Billing,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::SaasSupport, Preset::AuthIncident, Preset::Billing];

    pub fn key(&self) -> &'static str {
        match self {
            Self::SaasSupport => "saas_support",
            Self::AuthIncident => "auth_incident",
            Self::Billing => "billing",
        }
    }

    /// Display name used by the web client.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SaasSupport => "SaaS Support Triage (default)",
            Self::AuthIncident => "Auth / SSO Incident",
            Self::Billing => "Billing / Subscription",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SaasSupport => {
                "Extract product/integration/env + classify severity/intent + build JSON ticket fields"
            }
            Self::AuthIncident => "Focus on SSO, IdP, auth errors, and incident routing",
            Self::Billing => "Extract plan, invoice IDs, pricing, and billing intent",
        }
    }

    /// Unknown keys fall back to the default preset, as the web client does.
    pub fn from_key(key: &str) -> Self {
        match key {
            "auth_incident" => Self::AuthIncident,
            "billing" => Self::Billing,
            _ => Self::SaasSupport,
        }
    }

    pub fn intent_labels(&self) -> &'static [&'static str] {
        match self {
            Self::Billing => &[
                "billing_question",
                "refund_request",
                "invoice_issue",
                "pricing",
                "cancelation",
                "other",
            ],
            Self::AuthIncident => &[
                "sso_issue",
                "login_issue",
                "access_request",
                "incident_report",
                "how_to",
                "other",
            ],
            Self::SaasSupport => &["bug", "how_to", "access", "incident", "billing", "other"],
        }
    }

    pub fn entity_labels(&self) -> &'static [&'static str] {
        match self {
            Self::Billing => &[
                "customer_name",
                "company",
                "plan",
                "invoice_id",
                "amount",
                "currency",
                "product",
                "date",
                "region",
            ],
            Self::AuthIncident => &[
                "customer_name",
                "company",
                "idp",
                "integration",
                "product",
                "error_code",
                "environment",
                "region",
            ],
            Self::SaasSupport => &[
                "customer_name",
                "company",
                "product",
                "feature",
                "integration",
                "error_code",
                "environment",
                "cloud",
                "region",
            ],
        }
    }

    pub fn ticket_field_specs(&self) -> &'static [&'static str] {
        match self {
            Self::Billing => &[
                "customer_name::str::Customer name",
                "company::str::Company name",
                "plan::str::Plan name if mentioned",
                "invoice_id::str::Invoice ID if present",
                "amount::str::Amount if present",
                "currency::str::Currency if present",
                "intent::str::Billing intent category",
                "severity::str::sev0-sev3",
                "next_queue::str::Routing queue",
            ],
            Self::AuthIncident => &[
                "customer_name::str::Customer name",
                "company::str::Company name",
                "idp::str::Identity provider (Okta/AzureAD/etc.)",
                "integration::str::Integration name",
                "error_code::str::Error code if present",
                "environment::str::prod/stage/dev",
                "region::str::Region",
                "intent::str::Intent label",
                "severity::str::sev0-sev3",
                "next_queue::str::Routing queue",
            ],
            Self::SaasSupport => &[
                "customer_name::str::Customer name",
                "company::str::Company name",
                "product::str::Product area",
                "feature::str::Feature area",
                "integration::str::Integration mentioned",
                "error_code::str::Error code if present",
                "environment::str::prod/stage/dev",
                "cloud::str::aws/gcp/azure if present",
                "region::str::Region",
                "intent::str::Intent label",
                "severity::str::sev0-sev3",
                "next_queue::str::Routing queue",
            ],
        }
    }

    /// Build the analyze payload for `text` at `threshold`.
    pub fn build_request(&self, text: &str, threshold: f64) -> AnalyzeRequest {
        let owned = |labels: &[&str]| labels.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        AnalyzeRequest {
            text: text.to_string(),
            threshold,
            entity_labels: owned(self.entity_labels()),
            severity_schema: BTreeMap::from([("severity".to_string(), owned(SEVERITY_LABELS))]),
            intent_schema: BTreeMap::from([("intent".to_string(), owned(self.intent_labels()))]),
            json_schema: BTreeMap::from([(
                TICKET_FIELDS_ROOT.to_string(),
                owned(self.ticket_field_specs()),
            )]),
            preset: self.key().to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(Self::from_key(&key))
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
