//! Local hash embeddings.
//!
//! Signed feature hashing of lowercase tokens and bigrams, L2-normalized.
//! Each feature lands in one dimension picked by FNV-1a followed by the
//! murmur3 finalizer. Fully deterministic, no model download. Embedding runs
//! on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::base::types::Res;

use super::{Embedder, GenericEmbedder};

impl Embedder {
    pub fn hash(dims: usize) -> Self {
        Self {
            inner: Arc::new(HashEmbedder::new(dims)),
        }
    }
}

/// Feature-hashing embedder.
#[derive(Clone, Copy, Debug)]
pub struct HashEmbedder {
    dims: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dims: 384 }
    }
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Embed text synchronously.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dims];
        if self.dims == 0 {
            return embedding;
        }

        let tokens = tokenize(text);

        for token in &tokens {
            accumulate(&mut embedding, token, 1.0);
        }

        for window in tokens.windows(2) {
            let bigram = format!("{} {}", window[0], window[1]);
            accumulate(&mut embedding, &bigram, 0.5);
        }

        l2_normalize(&mut embedding);
        embedding
    }
}

#[async_trait]
impl GenericEmbedder for HashEmbedder {
    #[instrument(name = "HashEmbedder::embed", skip_all)]
    async fn embed(&self, text: &str) -> Res<Vec<f32>> {
        let embedder = *self;
        let text = text.to_string();

        Ok(tokio::task::spawn_blocking(move || embedder.embed_sync(&text)).await?)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|token| token.len() >= 2)
        .map(str::to_string)
        .collect()
}

fn accumulate(embedding: &mut [f32], feature: &str, weight: f32) {
    let hash = fmix64(fnv1a(feature.as_bytes()));
    let sign = if hash >> 63 == 0 { weight } else { -weight };

    embedding[(hash % embedding.len() as u64) as usize] += sign;
}

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51afd7ed558ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ceb9fe1a85ec53);
    k ^ (k >> 33)
}

fn fnv1a(data: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    data.iter().fold(OFFSET, |hash, byte| (hash ^ *byte as u64).wrapping_mul(PRIME))
}

fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}
