//! Thin wrapper around the Hugging Face inference API.
//!
//! Both the sentence-embedding and the zero-shot classification backends post
//! JSON to `{endpoint}/{model}`; this client owns the shared HTTP plumbing.

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::base::{config::Config, types::Res};

/// Hugging Face inference client.
///
/// Cloning is cheap: `reqwest::Client` is reference counted internally.
#[derive(Clone)]
pub struct HuggingFaceClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HuggingFaceClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.huggingface_endpoint.trim_end_matches('/').to_string(),
            api_key: config.huggingface_api_key.clone(),
        }
    }

    /// URL of the inference route for `model`.
    pub fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.endpoint, model)
    }

    /// Run `model` on `inputs` with optional pipeline `parameters`.
    #[instrument(name = "HuggingFaceClient::infer", skip(self, inputs, parameters))]
    pub async fn infer<I, R>(&self, model: &str, inputs: &I, parameters: Option<serde_json::Value>) -> Res<R>
    where
        I: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut body = json!({
            "inputs": inputs,
            "options": { "wait_for_model": true },
        });

        if let Some(parameters) = parameters {
            body["parameters"] = parameters;
        }

        let mut request = self.http.post(self.model_url(model)).json(&body);

        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.with_context(|| format!("Hugging Face request to `{model}` failed"))?;
        let status = response.status();

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Hugging Face returned {status} for `{model}`: {detail}");
            return Err(anyhow::anyhow!("Hugging Face inference for `{model}` returned {status}: {detail}"));
        }

        debug!("Hugging Face inference for `{model}` succeeded.");

        response.json::<R>().await.with_context(|| format!("Unexpected Hugging Face response shape for `{model}`"))
    }
}
