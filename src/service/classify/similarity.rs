//! Embedding-based zero-shot classification.
//!
//! Each label is embedded with the same embedder as the text; label scores
//! are a softmax over the cosine similarities. Useful offline together with
//! the hash embedder, or to avoid a second remote model.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, instrument};

use crate::{
    base::types::Res,
    service::embed::{Embedder, cosine_similarity},
};

use super::{Classifier, GenericClassifier};

impl Classifier {
    pub fn similarity(embedder: Embedder, temperature: f64) -> Self {
        Self {
            inner: Arc::new(SimilarityClassifier::new(embedder, temperature)),
        }
    }
}

/// Zero-shot classifier that compares text and label embeddings.
#[derive(Clone)]
pub struct SimilarityClassifier {
    embedder: Embedder,
    temperature: f64,
}

impl SimilarityClassifier {
    pub fn new(embedder: Embedder, temperature: f64) -> Self {
        Self { embedder, temperature }
    }
}

#[async_trait]
impl GenericClassifier for SimilarityClassifier {
    #[instrument(name = "SimilarityClassifier::classify", skip_all)]
    async fn classify(&self, text: &str, labels: &[&str]) -> Res<Vec<f64>> {
        let text_embedding = self.embedder.embed(text).await?;
        let label_embeddings = try_join_all(labels.iter().map(|label| self.embedder.embed(label))).await?;

        let similarities = label_embeddings
            .iter()
            .map(|label_embedding| cosine_similarity(&text_embedding, label_embedding).map(f64::from))
            .collect::<Res<Vec<_>>>()?;

        debug!("Label similarities: {similarities:?}");

        Ok(softmax(&similarities, self.temperature))
    }
}

/// Temperature-scaled softmax.
fn softmax(values: &[f64], temperature: f64) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps = values.iter().map(|v| ((v - max) / temperature).exp()).collect::<Vec<_>>();
    let total: f64 = exps.iter().sum();

    exps.into_iter().map(|e| e / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one_and_keeps_order() {
        let probs = softmax(&[0.9, 0.1, 0.5], 0.1);

        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probs[0] > probs[2] && probs[2] > probs[1]);
    }

    #[test]
    fn test_softmax_of_equal_values_is_uniform() {
        assert_eq!(softmax(&[0.3, 0.3], 0.05), vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn test_label_matching_the_text_wins() {
        let classifier = SimilarityClassifier::new(Embedder::hash(256), 0.05);

        let scores = classifier.classify("urgent critical outage", &["low priority", "urgent critical"]).await.unwrap();

        assert_eq!(scores.len(), 2);
        assert!(scores[1] > scores[0]);
    }
}
