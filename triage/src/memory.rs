//! Recent-ticket memory.
//!
//! A bounded, append-only record of past triage outcomes. The draft composer
//! asks it for a "similar" prior ticket (same queue, different text) to give
//! the language model some context.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::routing::RoutingDecision;

/// Default number of entries retained.
pub const DEFAULT_MEMORY_CAPACITY: usize = 20;

/// Number of leading characters compared to detect the current ticket itself.
pub const SELF_MATCH_PREFIX_CHARS: usize = 200;

/// Maximum characters of a prior ticket returned as a snippet.
pub const SNIPPET_MAX_CHARS: usize = 500;

/// A single remembered triage outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub ticket_text: String,
    pub routing: RoutingDecision,
    pub intent: String,
    pub severity: String,
}

/// Interface for the recent-ticket store.
///
/// Implementations are shared across requests, so both operations take
/// `&self` and synchronize internally.
pub trait TicketMemory: Send + Sync {
    /// Append an entry, evicting the oldest ones past capacity.
    fn remember(&self, ticket_text: &str, decision: RoutingDecision, intent: &str, severity: &str);

    /// Most recent prior ticket routed to the same queue, truncated to
    /// [`SNIPPET_MAX_CHARS`]. The current ticket never matches itself.
    fn find_similar(&self, ticket_text: &str, decision: &RoutingDecision) -> Option<String>;

    /// Snapshot of retained entries, oldest first.
    fn entries(&self) -> Vec<MemoryEntry>;

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process ring buffer guarded by a mutex.
pub struct RecentTicketMemory {
    entries: Mutex<VecDeque<MemoryEntry>>,
    capacity: usize,
}

impl RecentTicketMemory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    /// Capacity is clamped to at least one entry.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<MemoryEntry>> {
        // push/pop are single calls, so a poisoned deque is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RecentTicketMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketMemory for RecentTicketMemory {
    fn remember(&self, ticket_text: &str, decision: RoutingDecision, intent: &str, severity: &str) {
        let mut entries = self.lock();
        entries.push_back(MemoryEntry {
            ticket_text: ticket_text.to_string(),
            routing: decision,
            intent: intent.to_string(),
            severity: severity.to_string(),
        });
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        tracing::debug!(
            retained = entries.len(),
            queue = %decision.next_queue,
            "Remembered triage outcome"
        );
    }

    fn find_similar(&self, ticket_text: &str, decision: &RoutingDecision) -> Option<String> {
        let current = char_prefix(ticket_text, SELF_MATCH_PREFIX_CHARS);
        let entries = self.lock();
        entries
            .iter()
            .rev()
            .filter(|e| char_prefix(&e.ticket_text, SELF_MATCH_PREFIX_CHARS) != current)
            .find(|e| e.routing.next_queue == decision.next_queue)
            .map(|e| char_prefix(&e.ticket_text, SNIPPET_MAX_CHARS).to_string())
    }

    fn entries(&self) -> Vec<MemoryEntry> {
        self.lock().iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// First `max_chars` characters of `text`, on a char boundary.
fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{route, Priority, Queue};

    fn billing() -> RoutingDecision {
        RoutingDecision::new(Queue::BillingOps, Priority::P2)
    }

    fn general() -> RoutingDecision {
        RoutingDecision::new(Queue::GeneralSupport, Priority::P3)
    }

    #[test]
    fn test_capacity_bound_keeps_most_recent_in_order() {
        let memory = RecentTicketMemory::new();
        for i in 0..35 {
            memory.remember(&format!("ticket {i}"), general(), "other", "sev3");
            assert!(memory.len() <= DEFAULT_MEMORY_CAPACITY);
        }
        let entries = memory.entries();
        assert_eq!(entries.len(), 20);
        let texts: Vec<_> = entries.iter().map(|e| e.ticket_text.as_str()).collect();
        let expected: Vec<String> = (15..35).map(|i| format!("ticket {i}")).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_find_similar_skips_self() {
        let memory = RecentTicketMemory::new();
        memory.remember("Refund invoice #123 please", billing(), "refund_request", "sev2");
        assert_eq!(
            memory.find_similar("Refund invoice #123 please", &billing()),
            None
        );
    }

    #[test]
    fn test_find_similar_prefers_most_recent_same_queue() {
        let memory = RecentTicketMemory::new();
        memory.remember("old billing ticket", billing(), "billing_question", "sev3");
        memory.remember("how do I export?", general(), "how_to", "sev3");
        memory.remember("newer billing ticket", billing(), "refund_request", "sev2");
        memory.remember("another how-to", general(), "how_to", "sev3");

        let hit = memory.find_similar("charged twice", &billing());
        assert_eq!(hit.as_deref(), Some("newer billing ticket"));

        let miss = memory.find_similar(
            "sso broken",
            &RoutingDecision::new(Queue::IdentityAccess, Priority::P2),
        );
        assert!(miss.is_none());
    }

    #[test]
    fn test_self_match_uses_200_char_prefix() {
        let memory = RecentTicketMemory::new();
        let base = "x".repeat(200);
        memory.remember(&format!("{base} first tail"), billing(), "billing", "sev3");
        // Same first 200 characters counts as the same ticket.
        assert!(memory
            .find_similar(&format!("{base} second tail"), &billing())
            .is_none());
        // Differing inside the prefix does not.
        assert!(memory.find_similar(&"y".repeat(200), &billing()).is_some());
    }

    #[test]
    fn test_snippet_truncated_to_500_chars() {
        let memory = RecentTicketMemory::new();
        let long = "é".repeat(800);
        memory.remember(&long, billing(), "refund", "sev2");
        let snippet = memory.find_similar("short", &billing()).unwrap();
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS);
    }

    #[test]
    fn test_entry_records_labels() {
        let memory = RecentTicketMemory::with_capacity(2);
        let decision = route("sev0", "incident");
        memory.remember("prod down", decision, "incident", "sev0");
        let entry = &memory.entries()[0];
        assert_eq!(entry.routing, decision);
        assert_eq!(entry.intent, "incident");
        assert_eq!(entry.severity, "sev0");
        assert_eq!(memory.capacity(), 2);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let memory = RecentTicketMemory::with_capacity(0);
        memory.remember("a", general(), "", "");
        memory.remember("b", general(), "", "");
        assert_eq!(memory.len(), 1);
        assert!(!memory.is_empty());
    }

    #[test]
    fn test_char_prefix() {
        assert_eq!(char_prefix("hello", 3), "hel");
        assert_eq!(char_prefix("hi", 3), "hi");
        assert_eq!(char_prefix("ééé", 2), "éé");
    }
}
