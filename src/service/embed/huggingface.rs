//! Sentence embeddings from the Hugging Face feature-extraction pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    base::{config::Config, types::Res},
    service::huggingface::HuggingFaceClient,
};

use super::{Embedder, GenericEmbedder};

impl Embedder {
    pub fn huggingface(config: &Config) -> Self {
        let client = HuggingFaceEmbedder::new(config);
        Self { inner: Arc::new(client) }
    }
}

/// Feature-extraction output.
///
/// Sentence-transformers models return one pooled vector; plain encoders
/// return one vector per token, optionally wrapped in a batch of one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureOutput {
    Pooled(Vec<f32>),
    Tokens(Vec<Vec<f32>>),
    Batch(Vec<Vec<Vec<f32>>>),
}

impl FeatureOutput {
    fn into_vector(self) -> Res<Vec<f32>> {
        let vector = match self {
            FeatureOutput::Pooled(vector) => vector,
            FeatureOutput::Tokens(tokens) => mean_pool(&tokens)?,
            FeatureOutput::Batch(batch) => {
                let tokens = batch.into_iter().next().ok_or_else(|| anyhow::anyhow!("Feature extraction returned an empty batch."))?;
                mean_pool(&tokens)?
            }
        };

        if vector.is_empty() {
            return Err(anyhow::anyhow!("Feature extraction returned an empty vector."));
        }

        Ok(vector)
    }
}

/// Average token vectors into one sentence vector.
fn mean_pool(tokens: &[Vec<f32>]) -> Res<Vec<f32>> {
    let dims = tokens.first().map(Vec::len).ok_or_else(|| anyhow::anyhow!("Feature extraction returned no tokens."))?;

    let mut pooled = vec![0.0f32; dims];
    for token in tokens {
        if token.len() != dims {
            return Err(anyhow::anyhow!("Token vectors have mismatched dimensions ({} vs {dims}).", token.len()));
        }

        for (acc, value) in pooled.iter_mut().zip(token) {
            *acc += value;
        }
    }

    let count = tokens.len() as f32;
    pooled.iter_mut().for_each(|value| *value /= count);

    Ok(pooled)
}

/// Hugging Face feature-extraction embedder.
#[derive(Clone)]
pub struct HuggingFaceEmbedder {
    client: HuggingFaceClient,
    model: String,
}

impl HuggingFaceEmbedder {
    pub fn new(config: &Config) -> Self {
        Self {
            client: HuggingFaceClient::new(config),
            model: config.huggingface_embedding_model.clone(),
        }
    }
}

#[async_trait]
impl GenericEmbedder for HuggingFaceEmbedder {
    #[instrument(name = "HuggingFaceEmbedder::embed", skip_all)]
    async fn embed(&self, text: &str) -> Res<Vec<f32>> {
        let output: FeatureOutput = self.client.infer(&self.model, text, None).await?;

        output.into_vector()
    }
}
