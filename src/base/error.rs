//! Typed failures of the triage pipeline.

use thiserror::Error;

/// Errors raised while building the index or triaging a ticket.
///
/// Plumbing around the pipeline uses `anyhow`; these variants exist so callers
/// can tell configuration problems apart from per-request inference failures.
#[derive(Debug, Error)]
pub enum TriageError {
    /// The roster has no specialists; the service cannot start.
    #[error("no specialists available: the roster is empty")]
    EmptyRoster,
    /// Two roster entries share an id.
    #[error("duplicate specialist id in roster: {0}")]
    DuplicateEmployer(String),
    /// The index produced no candidate for a ticket.
    #[error("no suitable specialist found")]
    NoMatchFound,
    /// The embedding or classification backend failed.
    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),
}

impl TriageError {
    pub fn inference(err: impl Into<anyhow::Error>) -> Self {
        TriageError::Inference(err.into())
    }

    /// Whether this error comes from configuration rather than a request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TriageError::EmptyRoster | TriageError::DuplicateEmployer(_))
    }
}
