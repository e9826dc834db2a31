//! Priority inference by zero-shot classification.

use tracing::{debug, instrument};

use crate::{
    base::{
        error::TriageError,
        types::{Priority, Ticket},
    },
    service::classify::Classifier,
};

/// Candidate labels, most urgent first. Argmax ties resolve to the earlier label.
pub const PRIORITY_LABELS: [&str; 4] = ["urgent critical", "high priority", "medium priority", "low priority"];

impl Priority {
    /// Map a classifier label to its priority code; unknown labels are `P3`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "urgent critical" => Priority::P0,
            "high priority" => Priority::P1,
            "medium priority" => Priority::P2,
            _ => Priority::P3,
        }
    }
}

/// Priority code with its classifier confidence scaled to `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityAssessment {
    pub priority: Priority,
    pub score: f64,
}

/// Wraps a zero-shot classifier over [`PRIORITY_LABELS`].
#[derive(Clone)]
pub struct PriorityClassifier {
    classifier: Classifier,
}

impl PriorityClassifier {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    #[instrument(name = "PriorityClassifier::classify", skip_all)]
    pub async fn classify(&self, ticket: &Ticket) -> Result<PriorityAssessment, TriageError> {
        let scores = self.classifier.classify(&ticket.text(), &PRIORITY_LABELS).await.map_err(TriageError::Inference)?;

        let assessment = assess(&scores)?;
        debug!("Classified as {} ({:.1}/100).", assessment.priority, assessment.score);

        Ok(assessment)
    }
}

/// Pick the winning label from per-label scores.
fn assess(scores: &[f64]) -> Result<PriorityAssessment, TriageError> {
    if scores.len() != PRIORITY_LABELS.len() {
        return Err(TriageError::inference(anyhow::anyhow!(
            "Classifier returned {} scores for {} labels.",
            scores.len(),
            PRIORITY_LABELS.len()
        )));
    }

    if scores.iter().any(|score| !score.is_finite()) {
        return Err(TriageError::inference(anyhow::anyhow!("Classifier returned a non-finite score.")));
    }

    let mut best = 0;
    for (index, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = index;
        }
    }

    Ok(PriorityAssessment {
        priority: Priority::from_label(PRIORITY_LABELS[best]),
        score: (scores[best] * 100.0).clamp(0.0, 100.0),
    })
}
