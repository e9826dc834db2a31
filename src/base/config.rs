//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, path::PathBuf, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default listen address for the HTTP service.
fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

/// Default embedding backend.
fn default_embedding_backend() -> String {
    "huggingface".to_string()
}

/// Default classifier backend.
fn default_classifier_backend() -> String {
    "huggingface".to_string()
}

/// Default OpenAI embedding model.
fn default_openai_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

/// Default OpenAI model used for zero-shot classification.
fn default_openai_classifier_model() -> String {
    "gpt-4.1-mini".to_string()
}

/// Default max output tokens for the OpenAI classifier.
fn default_openai_max_tokens() -> u32 {
    1024
}

/// Default Hugging Face inference endpoint.
fn default_huggingface_endpoint() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

/// Default Hugging Face sentence embedding model.
fn default_huggingface_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

/// Default Hugging Face zero-shot classification model.
fn default_huggingface_classifier_model() -> String {
    "facebook/bart-large-mnli".to_string()
}

/// Default dimension of the hash embedder.
fn default_hash_embedding_dims() -> usize {
    384
}

/// Default softmax temperature of the similarity classifier.
fn default_similarity_temperature() -> f64 {
    0.05
}

/// Default upper bound on a single triage request.
fn default_triage_timeout_secs() -> u64 {
    120
}

pub const EMBEDDING_BACKENDS: [&str; 3] = ["huggingface", "openai", "hash"];
pub const CLASSIFIER_BACKENDS: [&str; 3] = ["huggingface", "openai", "similarity"];

/// Configuration for the ticket-triage service.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inner: Arc::new(ConfigInner::default()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Address the HTTP service listens on (`BIND_ADDRESS`).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Optional JSON roster file (`ROSTER_PATH`); the built-in roster is used when unset.
    #[serde(default)]
    pub roster_path: Option<PathBuf>,
    /// Embedding backend: `huggingface`, `openai` or `hash` (`EMBEDDING_BACKEND`).
    #[serde(default = "default_embedding_backend")]
    pub embedding_backend: String,
    /// Classifier backend: `huggingface`, `openai` or `similarity` (`CLASSIFIER_BACKEND`).
    #[serde(default = "default_classifier_backend")]
    pub classifier_backend: String,
    /// OpenAI API key (`OPENAI_API_KEY`).
    #[serde(default)]
    pub openai_api_key: String,
    /// OpenAI embedding model (`OPENAI_EMBEDDING_MODEL`).
    #[serde(default = "default_openai_embedding_model")]
    pub openai_embedding_model: String,
    /// OpenAI model used for zero-shot classification (`OPENAI_CLASSIFIER_MODEL`).
    #[serde(default = "default_openai_classifier_model")]
    pub openai_classifier_model: String,
    /// Max output tokens for the OpenAI classifier (`OPENAI_MAX_TOKENS`).
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,
    /// Hugging Face API token (`HUGGINGFACE_API_KEY`); anonymous access when empty.
    #[serde(default)]
    pub huggingface_api_key: String,
    /// Base URL of the Hugging Face inference API (`HUGGINGFACE_ENDPOINT`).
    #[serde(default = "default_huggingface_endpoint")]
    pub huggingface_endpoint: String,
    /// Sentence embedding model (`HUGGINGFACE_EMBEDDING_MODEL`).
    #[serde(default = "default_huggingface_embedding_model")]
    pub huggingface_embedding_model: String,
    /// Zero-shot classification model (`HUGGINGFACE_CLASSIFIER_MODEL`).
    #[serde(default = "default_huggingface_classifier_model")]
    pub huggingface_classifier_model: String,
    /// Vector length of the hash embedder (`HASH_EMBEDDING_DIMS`).
    #[serde(default = "default_hash_embedding_dims")]
    pub hash_embedding_dims: usize,
    /// Softmax temperature of the similarity classifier (`SIMILARITY_TEMPERATURE`).
    /// Lower values sharpen the label distribution.
    #[serde(default = "default_similarity_temperature")]
    pub similarity_temperature: f64,
    /// Seconds a triage request may take before the HTTP layer gives up (`TRIAGE_TIMEOUT_SECS`).
    #[serde(default = "default_triage_timeout_secs")]
    pub triage_timeout_secs: u64,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            roster_path: None,
            embedding_backend: default_embedding_backend(),
            classifier_backend: default_classifier_backend(),
            openai_api_key: String::new(),
            openai_embedding_model: default_openai_embedding_model(),
            openai_classifier_model: default_openai_classifier_model(),
            openai_max_tokens: default_openai_max_tokens(),
            huggingface_api_key: String::new(),
            huggingface_endpoint: default_huggingface_endpoint(),
            huggingface_embedding_model: default_huggingface_embedding_model(),
            huggingface_classifier_model: default_huggingface_classifier_model(),
            hash_embedding_dims: default_hash_embedding_dims(),
            similarity_temperature: default_similarity_temperature(),
            triage_timeout_secs: default_triage_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("TICKET_TRIAGE"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check value ranges and backend selections.
    pub fn validate(&self) -> Res<()> {
        if !EMBEDDING_BACKENDS.contains(&self.embedding_backend.as_str()) {
            return Err(anyhow::anyhow!("Unknown embedding backend `{}`. Must be one of: {}.", self.embedding_backend, EMBEDDING_BACKENDS.join(", ")));
        }

        if !CLASSIFIER_BACKENDS.contains(&self.classifier_backend.as_str()) {
            return Err(anyhow::anyhow!("Unknown classifier backend `{}`. Must be one of: {}.", self.classifier_backend, CLASSIFIER_BACKENDS.join(", ")));
        }

        let uses_openai = self.embedding_backend == "openai" || self.classifier_backend == "openai";
        if uses_openai && self.openai_api_key.is_empty() {
            return Err(anyhow::anyhow!("An OpenAI API key is required when an OpenAI backend is selected."));
        }

        if self.hash_embedding_dims < 1 || self.hash_embedding_dims > 8192 {
            return Err(anyhow::anyhow!("Hash embedding dims must be between 1 and 8192."));
        }

        if !(self.similarity_temperature > 0.0) {
            return Err(anyhow::anyhow!("Similarity temperature must be greater than 0."));
        }

        if self.triage_timeout_secs < 1 {
            return Err(anyhow::anyhow!("Triage timeout must be at least 1 second."));
        }

        if self.openai_max_tokens < 1 || self.openai_max_tokens > 128000 {
            return Err(anyhow::anyhow!("OpenAI max tokens must be between 1 and 128000."));
        }

        Ok(())
    }
}
