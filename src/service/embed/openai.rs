//! OpenAI embeddings via `async-openai`.

use std::sync::Arc;

use async_openai::{Client, config::OpenAIConfig, types::CreateEmbeddingRequestArgs};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::base::{config::Config, types::Res};

use super::{Embedder, GenericEmbedder};

// Extra methods on `Embedder` applied by the openai implementation.

impl Embedder {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiEmbedder::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI embedding client implementation.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbedder {
    /// Create a new OpenAI embedding client.
    #[instrument(name = "OpenAiEmbedder::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            model: config.openai_embedding_model.clone(),
        }
    }
}

#[async_trait]
impl GenericEmbedder for OpenAiEmbedder {
    #[instrument(name = "OpenAiEmbedder::embed", skip_all)]
    async fn embed(&self, text: &str) -> Res<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default().model(&self.model).input(text).build()?;

        let response = self.client.embeddings().create(request).await?;
        debug!("OpenAI returned {} embeddings.", response.data.len());

        response
            .data
            .into_iter()
            .next()
            .map(|embedding| embedding.embedding)
            .ok_or_else(|| anyhow::anyhow!("OpenAI returned no embedding for the input."))
    }
}
