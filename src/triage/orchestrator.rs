//! The triage pipeline: priority, assignee, rationale, first reply.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::base::{
    error::TriageError,
    types::{Ticket, TriageResult},
};

use super::{
    index::EmbeddingIndex,
    priority::{PriorityAssessment, PriorityClassifier},
    reply,
};

/// Shown in the rationale when the matched specialist lists no skills.
const FALLBACK_SKILLS: &str = "General technical support";

/// Triages tickets against one roster index and one classifier.
///
/// Holds only shared, read-only state; clone it freely and call [`Triager::triage`]
/// from as many tasks as needed.
#[derive(Clone)]
pub struct Triager {
    index: Arc<EmbeddingIndex>,
    classifier: PriorityClassifier,
}

impl Triager {
    pub fn new(index: Arc<EmbeddingIndex>, classifier: PriorityClassifier) -> Self {
        Self { index, classifier }
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    /// Assign a priority and a specialist to `ticket` and draft the first reply.
    ///
    /// Any inference failure fails the whole call; no defaults are substituted.
    #[instrument(name = "Triager::triage", skip_all, fields(title = %ticket.title))]
    pub async fn triage(&self, ticket: &Ticket) -> Result<TriageResult, TriageError> {
        let text = ticket.text();

        let PriorityAssessment { priority, score: priority_score } = self.classifier.classify(ticket).await?;

        let found = self.index.query(&text).await?;
        let employer = self.index.employer(&found.employer_id).ok_or(TriageError::NoMatchFound)?;

        let skills = found.skills.join(", ");
        let needed = if found.skills.is_empty() { FALLBACK_SKILLS } else { skills.as_str() };

        let rationale = format!("Priority classification confidence: {priority_score:.1}/100. Ticket content suggests skills needed: {needed}");
        let assignee_reason = format!("Best skills match (similarity score: {:.2}): {} has expertise in {skills}", found.score, employer.name);
        let first_reply = reply::compose(priority, priority_score, &employer.name, &found.skills);

        info!("Triaged as {priority} for `{}` (similarity {:.2}).", employer.id, found.score);

        Ok(TriageResult {
            priority,
            priority_score,
            rationale,
            assignee: employer.id.clone(),
            assignee_reason,
            first_reply,
        })
    }
}
