//! Zero-shot classification through the Hugging Face inference API.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::{
    base::{config::Config, types::Res},
    service::huggingface::HuggingFaceClient,
};

use super::{Classifier, GenericClassifier, align_scores};

impl Classifier {
    pub fn huggingface(config: &Config) -> Self {
        let client = HuggingFaceClassifier::new(config);
        Self { inner: Arc::new(client) }
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Zero-shot pipeline output.
///
/// The classic API returns parallel `labels`/`scores` arrays sorted by score;
/// the router API returns a list of `{label, score}` objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotOutput {
    Parallel { labels: Vec<String>, scores: Vec<f64> },
    Pairs(Vec<LabelScore>),
}

impl ZeroShotOutput {
    fn into_pairs(self) -> Res<Vec<(String, f64)>> {
        match self {
            ZeroShotOutput::Parallel { labels, scores } => {
                if labels.len() != scores.len() {
                    return Err(anyhow::anyhow!("Zero-shot response has {} labels but {} scores.", labels.len(), scores.len()));
                }

                Ok(labels.into_iter().zip(scores).collect())
            }
            ZeroShotOutput::Pairs(pairs) => Ok(pairs.into_iter().map(|p| (p.label, p.score)).collect()),
        }
    }
}

/// Hugging Face zero-shot classifier (an NLI model such as `bart-large-mnli`).
#[derive(Clone)]
pub struct HuggingFaceClassifier {
    client: HuggingFaceClient,
    model: String,
}

impl HuggingFaceClassifier {
    pub fn new(config: &Config) -> Self {
        Self {
            client: HuggingFaceClient::new(config),
            model: config.huggingface_classifier_model.clone(),
        }
    }
}

#[async_trait]
impl GenericClassifier for HuggingFaceClassifier {
    #[instrument(name = "HuggingFaceClassifier::classify", skip_all)]
    async fn classify(&self, text: &str, labels: &[&str]) -> Res<Vec<f64>> {
        let parameters = json!({ "candidate_labels": labels, "multi_label": false });

        let output: ZeroShotOutput = self.client.infer(&self.model, text, Some(parameters)).await?;
        let pairs = output.into_pairs()?;

        debug!("Zero-shot classification returned {} labels.", pairs.len());

        align_scores(labels, &pairs)
    }
}
