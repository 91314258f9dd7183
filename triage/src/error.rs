//! Triage error taxonomy.
//!
//! Every failure a triage or draft request can hit is represented here.
//! Callers map an error to its [`ErrorClass`] instead of matching on strings.
//!
//! | Class               | Raised when                                          |
//! |---------------------|------------------------------------------------------|
//! | Validation          | request shape is wrong, or a provider broke contract |
//! | ProviderUnavailable | extraction model unreachable, draft credential unset |
//! | ProviderFailure     | provider call failed, timed out, or sent garbage     |

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rejected before (or instead of) trusting any provider output.
    Validation,
    /// A collaborator is not ready to serve this request.
    ProviderUnavailable,
    /// A collaborator was reached but the call did not produce a usable answer.
    ProviderFailure,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::ProviderUnavailable => write!(f, "provider_unavailable"),
            Self::ProviderFailure => write!(f, "provider_failure"),
        }
    }
}

/// Unified error type for triage and draft operations.
#[derive(Debug, Error)]
pub enum TriageError {
    /// Malformed request or a classification that does not carry exactly one label.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Provider not loaded, not reachable, or missing its credential.
    #[error("{provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    /// Provider call returned an error status or an unparseable body.
    #[error("{provider} failed: {message}")]
    Provider { provider: String, message: String },

    /// Provider call exceeded the configured per-stage timeout.
    #[error("Stage '{stage}' timed out after {after:?}")]
    Timeout { stage: String, after: Duration },
}

impl TriageError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) => ErrorClass::Validation,
            Self::ProviderUnavailable { .. } => ErrorClass::ProviderUnavailable,
            Self::Provider { .. } | Self::Timeout { .. } => ErrorClass::ProviderFailure,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type TriageResult<T> = Result<T, TriageError>;
