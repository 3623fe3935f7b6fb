// Typed per-source results combined by the merge step

use std::fmt;

use serde::Serialize;
use tokio::task::JoinError;

use crate::error::ReaderError;
use crate::models::Health;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Volumes,
    Network,
    Battery,
}

impl SourceId {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::Volumes => "volumes",
            SourceId::Network => "network",
            SourceId::Battery => "battery",
        }
    }

    /// Reader call behind this source.
    pub fn operation(self) -> &'static str {
        match self {
            SourceId::Volumes => "list_volumes",
            SourceId::Network => "current_network",
            SourceId::Battery => "battery_status",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    Unavailable,
    Panicked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: SourceId,
    pub kind: FailureKind,
    pub message: String,
}

impl SourceFailure {
    pub fn from_reader_error(source: SourceId, error: &ReaderError) -> Self {
        let kind = if error.is_permission_denied() {
            FailureKind::PermissionDenied
        } else {
            FailureKind::Unavailable
        };
        Self {
            source,
            kind,
            message: error.to_string(),
        }
    }

    pub fn panicked(source: SourceId, error: JoinError) -> Self {
        let message = if error.is_panic() {
            let payload = error.into_panic();
            payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "reader panicked".into())
        } else {
            error.to_string()
        };
        Self {
            source,
            kind: FailureKind::Panicked,
            message,
        }
    }

    pub(crate) fn with_context(mut self, context: &str) -> Self {
        self.message = format!("{}: {}", context, self.message);
        self
    }
}

/// Result of sampling one source.
#[derive(Debug)]
pub enum SourceOutcome<T> {
    Success(T),
    /// A usable value was produced, but part of the source failed.
    Degraded {
        value: T,
        failures: Vec<SourceFailure>,
    },
    Failed(SourceFailure),
}

impl<T> SourceOutcome<T> {
    pub fn health(&self) -> Health {
        match self {
            SourceOutcome::Success(_) => Health::Ok,
            SourceOutcome::Degraded { .. } => Health::Degraded,
            SourceOutcome::Failed(_) => Health::Failed,
        }
    }

    pub fn failures(&self) -> &[SourceFailure] {
        match self {
            SourceOutcome::Success(_) => &[],
            SourceOutcome::Degraded { failures, .. } => failures,
            SourceOutcome::Failed(f) => std::slice::from_ref(f),
        }
    }

    pub fn into_value_or_else(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            SourceOutcome::Success(value) | SourceOutcome::Degraded { value, .. } => value,
            SourceOutcome::Failed(_) => fallback(),
        }
    }
}
