//! Skill embeddings for the roster and nearest-specialist lookup.

use std::collections::HashSet;

use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use crate::{
    base::{error::TriageError, types::Employer},
    service::embed::{Embedder, cosine_similarity},
};

/// Precomputed embedding of one specialist's skill set.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    pub employer_id: String,
    pub skills: Vec<String>,
    pub embedding: Vec<f32>,
}

/// The best specialist for a piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatch {
    pub employer_id: String,
    pub score: f32,
    pub skills: Vec<String>,
}

/// Immutable index over a roster.
///
/// Built once; queries only read, so one instance can be shared behind an
/// `Arc` by any number of concurrent triages.
pub struct EmbeddingIndex {
    embedder: Embedder,
    roster: Vec<Employer>,
    records: Vec<EmbeddingRecord>,
}

impl EmbeddingIndex {
    /// Embed every employer's comma-joined skills.
    ///
    /// Fails with [`TriageError::EmptyRoster`] on an empty roster and with
    /// [`TriageError::DuplicateEmployer`] when two entries share an id.
    #[instrument(name = "EmbeddingIndex::build", skip_all, fields(roster_size = roster.len()))]
    pub async fn build(roster: Vec<Employer>, embedder: Embedder) -> Result<Self, TriageError> {
        if roster.is_empty() {
            return Err(TriageError::EmptyRoster);
        }

        let mut seen = HashSet::new();
        for employer in &roster {
            if !seen.insert(employer.id.as_str()) {
                return Err(TriageError::DuplicateEmployer(employer.id.clone()));
            }
        }

        let skill_texts = roster.iter().map(Employer::skill_text).collect::<Vec<_>>();
        let embeddings = try_join_all(skill_texts.iter().map(|text| embedder.embed(text))).await.map_err(TriageError::Inference)?;

        let dims = embeddings[0].len();
        for (employer, embedding) in roster.iter().zip(&embeddings) {
            check_embedding(embedding, dims).map_err(|err| TriageError::Inference(err.context(format!("skills of `{}`", employer.id))))?;
        }

        let records = roster
            .iter()
            .zip(embeddings)
            .map(|(employer, embedding)| EmbeddingRecord {
                employer_id: employer.id.clone(),
                skills: employer.skills.clone(),
                embedding,
            })
            .collect();

        info!("Indexed {} specialists ({dims} dimensions).", roster.len());

        Ok(Self { embedder, roster, records })
    }

    /// The roster the index was built from, in insertion order.
    pub fn roster(&self) -> &[Employer] {
        &self.roster
    }

    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }

    /// Look up an employer by id.
    pub fn employer(&self, id: &str) -> Option<&Employer> {
        self.roster.iter().find(|employer| employer.id == id)
    }

    /// Find the specialist whose skills are closest to `text`.
    ///
    /// Records are scanned in roster order and the best is only replaced on a
    /// strictly greater score, so the earliest specialist wins a tie.
    #[instrument(name = "EmbeddingIndex::query", skip_all)]
    pub async fn query(&self, text: &str) -> Result<SkillMatch, TriageError> {
        let query = self.embedder.embed(text).await.map_err(TriageError::Inference)?;

        let dims = self.records.first().map(|record| record.embedding.len()).ok_or(TriageError::NoMatchFound)?;
        check_embedding(&query, dims).map_err(|err| TriageError::Inference(err.context("ticket text")))?;

        let mut best: Option<(&EmbeddingRecord, f32)> = None;

        for record in &self.records {
            let score = cosine_similarity(&query, &record.embedding).map_err(TriageError::Inference)?;
            debug!("Similarity with `{}`: {score:.4}", record.employer_id);

            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((record, score));
            }
        }

        let (record, score) = best.ok_or(TriageError::NoMatchFound)?;

        Ok(SkillMatch {
            employer_id: record.employer_id.clone(),
            score,
            skills: record.skills.clone(),
        })
    }
}

/// Embeddings must be non-empty, finite, and `dims` long.
fn check_embedding(embedding: &[f32], dims: usize) -> anyhow::Result<()> {
    if embedding.is_empty() {
        return Err(anyhow::anyhow!("Embedder returned an empty vector."));
    }

    if embedding.len() != dims {
        return Err(anyhow::anyhow!("Embedder returned {} dimensions, expected {dims}.", embedding.len()));
    }

    if embedding.iter().any(|value| !value.is_finite()) {
        return Err(anyhow::anyhow!("Embedder returned a non-finite value."));
    }

    Ok(())
}
