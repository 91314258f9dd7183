//! Rule-based ticket router.
//!
//! Maps a classified `(severity, intent)` pair to a downstream queue and a
//! priority. Rules are evaluated in order and the first match wins:
//!
//! ```text
//! Condition                                   | Queue            | Priority
//! --------------------------------------------|------------------|-----------------
//! severity ∈ {sev0, sev1} or intent ~ incident | oncall_incidents | P0 if sev0 else P1
//! intent ~ billing|refund|invoice|pricing     | billing_ops      | P2
//! intent ~ access|sso|login                   | identity_access  | P2
//! anything else                               | general_support  | P3
//! ```
//!
//! `~` is case-insensitive substring containment: classifier labels such as
//! `refund_request` or `incident_report` embed the keyword.

use serde::{Deserialize, Serialize};

/// Downstream team/workflow a ticket is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Queue {
    OncallIncidents,
    BillingOps,
    IdentityAccess,
    GeneralSupport,
}

impl Queue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OncallIncidents => "oncall_incidents",
            Self::BillingOps => "billing_ops",
            Self::IdentityAccess => "identity_access",
            Self::GeneralSupport => "general_support",
        }
    }
}

impl std::fmt::Display for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handling priority, P0 most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing outcome for one ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub next_queue: Queue,
    pub priority: Priority,
}

impl RoutingDecision {
    pub fn new(next_queue: Queue, priority: Priority) -> Self {
        Self {
            next_queue,
            priority,
        }
    }

    /// Compact summary for logging.
    pub fn summary(&self) -> String {
        format!("{}/{}", self.next_queue, self.priority)
    }
}

const BILLING_KEYWORDS: &[&str] = &["billing", "refund", "invoice", "pricing"];
const ACCESS_KEYWORDS: &[&str] = &["access", "sso", "login"];

/// Route a ticket from its severity and intent labels.
///
/// Never fails: unrecognized input falls through to `general_support/P3`.
pub fn route(severity: &str, intent: &str) -> RoutingDecision {
    let sev = severity.trim().to_lowercase();
    let it = intent.trim().to_lowercase();
    let contains = |kws: &[&str]| kws.iter().any(|k| it.contains(k));

    if sev == "sev0" || sev == "sev1" || it.contains("incident") {
        let priority = if sev == "sev0" {
            Priority::P0
        } else {
            Priority::P1
        };
        RoutingDecision::new(Queue::OncallIncidents, priority)
    } else if contains(BILLING_KEYWORDS) {
        RoutingDecision::new(Queue::BillingOps, Priority::P2)
    } else if contains(ACCESS_KEYWORDS) {
        RoutingDecision::new(Queue::IdentityAccess, Priority::P2)
    } else {
        RoutingDecision::new(Queue::GeneralSupport, Priority::P3)
    }
}
