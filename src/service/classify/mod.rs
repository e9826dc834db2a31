//! Zero-shot text classification backends.
//!
//! The `GenericClassifier` trait scores a text against an arbitrary set of
//! natural-language labels. Scores come back aligned to the requested label
//! order, whatever order the backend reports them in.

pub mod huggingface;
pub mod openai;
pub mod similarity;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::{
    base::{config::Config, types::Res},
    service::embed::Embedder,
};

// Traits.

/// Generic zero-shot classifier trait that backends must implement.
#[async_trait]
pub trait GenericClassifier: Send + Sync + 'static {
    /// Score `text` against each of `labels`.
    ///
    /// The result has one probability-like score per label, in `labels` order.
    async fn classify(&self, text: &str, labels: &[&str]) -> Res<Vec<f64>>;
}

// Structs.

/// Classifier client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Classifier {
    inner: Arc<dyn GenericClassifier>,
}

impl Deref for Classifier {
    type Target = dyn GenericClassifier;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl Classifier {
    pub fn new(inner: Arc<dyn GenericClassifier>) -> Self {
        Self { inner }
    }

    /// Build the classifier selected by `classifier_backend`.
    ///
    /// The `similarity` backend reuses `embedder` to score labels.
    pub fn from_config(config: &Config, embedder: &Embedder) -> Res<Self> {
        match config.classifier_backend.as_str() {
            "huggingface" => Ok(Self::huggingface(config)),
            "openai" => Ok(Self::openai(config)),
            "similarity" => Ok(Self::similarity(embedder.clone(), config.similarity_temperature)),
            other => Err(anyhow::anyhow!("Unknown classifier backend: {other}")),
        }
    }
}

/// Reorder `(label, score)` pairs reported by a backend into `labels` order.
///
/// Every requested label must be present exactly once.
pub fn align_scores<S: AsRef<str>>(labels: &[&str], reported: &[(S, f64)]) -> Res<Vec<f64>> {
    labels
        .iter()
        .map(|label| {
            let mut matches = reported.iter().filter(|(name, _)| name.as_ref() == *label);

            match (matches.next(), matches.next()) {
                (Some((_, score)), None) => Ok(*score),
                (None, _) => Err(anyhow::anyhow!("Classifier response is missing label `{label}`.")),
                (Some(_), Some(_)) => Err(anyhow::anyhow!("Classifier response repeats label `{label}`.")),
            }
        })
        .collect()
}
