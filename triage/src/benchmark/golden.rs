//! Golden ticket fixtures.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::harness::HarnessError;
use crate::presets::Preset;
use crate::routing::RoutingDecision;

/// A fixture ticket with a human-assigned expected routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenTicket {
    pub preset: Preset,
    pub text: String,
    pub expected_routing: RoutingDecision,
}

/// Load an ordered golden set from a JSON array file.
pub fn load_golden_tickets(path: &Path) -> Result<Vec<GoldenTicket>, HarnessError> {
    let raw = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tickets: Vec<GoldenTicket> =
        serde_json::from_str(&raw).map_err(|source| HarnessError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), count = tickets.len(), "Loaded golden tickets");
    Ok(tickets)
}
