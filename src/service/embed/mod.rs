//! Text embedding backends.
//!
//! The `GenericEmbedder` trait turns text into a fixed-length vector. The
//! triage pipeline only ever talks to this trait, so remote models, local
//! hashing, and test doubles are interchangeable.

pub mod hash;
pub mod huggingface;
pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{config::Config, types::Res};

// Traits.

/// Generic embedding client trait that backends must implement.
///
/// Implementations must be deterministic for identical input, and every
/// vector returned by one instance must have the same length.
#[async_trait]
pub trait GenericEmbedder: Send + Sync + 'static {
    /// Embed `text` into a vector.
    async fn embed(&self, text: &str) -> Res<Vec<f32>>;
}

// Structs.

/// Embedding client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Embedder {
    inner: Arc<dyn GenericEmbedder>,
}

impl Deref for Embedder {
    type Target = dyn GenericEmbedder;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl Embedder {
    pub fn new(inner: Arc<dyn GenericEmbedder>) -> Self {
        Self { inner }
    }

    /// Build the embedder selected by `embedding_backend`.
    pub fn from_config(config: &Config) -> Res<Self> {
        match config.embedding_backend.as_str() {
            "huggingface" => Ok(Self::huggingface(config)),
            "openai" => Ok(Self::openai(config)),
            "hash" => Ok(Self::hash(config.hash_embedding_dims)),
            other => Err(anyhow::anyhow!("Unknown embedding backend: {other}")),
        }
    }
}

/// Cosine similarity of two vectors.
///
/// Zero-norm vectors have similarity `0.0`. Vectors of different lengths are
/// an error rather than a silent zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Res<f32> {
    if a.len() != b.len() {
        return Err(anyhow::anyhow!("Embedding dimension mismatch ({} vs {}).", a.len(), b.len()));
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a * norm_b))
}
