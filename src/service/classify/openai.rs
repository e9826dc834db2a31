//! Zero-shot classification with an OpenAI model.
//!
//! The model is asked, through a strict JSON schema, to distribute a
//! probability over the candidate labels. Scores are normalized to sum to one
//! so they read like the output of an NLI zero-shot pipeline.

use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        Content, CreateResponseArgs, Input, InputItem, InputMessageArgs, OutputContent, Response, ResponseFormatJsonSchema, Role, TextConfig, TextResponseFormat,
    },
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::base::{config::Config, types::Res};

use super::{Classifier, GenericClassifier, align_scores};

const CLASSIFIER_DIRECTIVE: &str = "You are a zero-shot text classifier for helpdesk tickets. \
Given a ticket and a list of candidate labels, assign each label the probability that it describes the ticket. \
Use every candidate label exactly once, and make the probabilities sum to 1.";

impl Classifier {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiClassifier::new(config);
        Self { inner: Arc::new(client) }
    }
}

#[derive(Debug, Deserialize)]
struct ScoredLabels {
    scores: Vec<ScoredLabel>,
}

#[derive(Debug, Deserialize)]
struct ScoredLabel {
    label: String,
    score: f64,
}

/// OpenAI zero-shot classifier implementation.
#[derive(Clone)]
pub struct OpenAiClassifier {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiClassifier {
    /// Create a new OpenAI classifier.
    #[instrument(name = "OpenAiClassifier::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Build the request input.
    fn build_input(&self, text: &str, labels: &[&str]) -> Res<Input> {
        let candidates = labels.iter().map(|label| format!("- `{label}`")).collect::<Vec<_>>().join("\n");

        Ok(Input::Items(vec![
            InputItem::Message(
                InputMessageArgs::default()
                    .role(Role::Developer)
                    .content(format!("## Candidate Labels\n\n{candidates}\n\n"))
                    .build()?,
            ),
            InputItem::Message(InputMessageArgs::default().role(Role::User).content(format!("# Ticket\n\n{text}\n\n")).build()?),
        ]))
    }
}

#[async_trait]
impl GenericClassifier for OpenAiClassifier {
    #[instrument(name = "OpenAiClassifier::classify", skip_all)]
    async fn classify(&self, text: &str, labels: &[&str]) -> Res<Vec<f64>> {
        let input = self.build_input(text, labels)?;

        let mut request = CreateResponseArgs::default();
        request
            .instructions(CLASSIFIER_DIRECTIVE)
            .max_output_tokens(self.config.openai_max_tokens)
            .model(&self.config.openai_classifier_model)
            .text(label_scores_text_config(labels))
            .input(input);

        // Pin the temperature for the non-reasoning models.
        if self.config.openai_classifier_model.starts_with("gpt") {
            request.temperature(0.0);
        }

        let response = self.client.responses().create(request.build()?).await?;
        let scored = parse_scored_labels(&response)?;

        info!("OpenAI classifier scored {} labels.", scored.scores.len());

        let pairs = scored.scores.into_iter().map(|s| (s.label, s.score)).collect::<Vec<_>>();

        Ok(normalize(align_scores(labels, &pairs)?))
    }
}

/// Extract the structured scores from a response.
fn parse_scored_labels(response: &Response) -> Res<ScoredLabels> {
    for output in &response.output {
        match output {
            OutputContent::Message(message) => {
                for content in &message.content {
                    match content {
                        Content::OutputText(text) => return Ok(serde_json::from_str(&text.text)?),
                        Content::Refusal(reason) => return Err(anyhow::anyhow!("Request refused: {reason:#?}")),
                    }
                }
            }
            _ => warn!("Unexpected output: {output:#?}"),
        }
    }

    Err(anyhow::anyhow!("OpenAI returned no classification output."))
}

/// Scale scores so they sum to one; all-zero scores are left as they are.
fn normalize(scores: Vec<f64>) -> Vec<f64> {
    let total: f64 = scores.iter().sum();

    if total > 0.0 { scores.into_iter().map(|score| score / total).collect() } else { scores }
}

/// Strict JSON schema restricting the model to the candidate labels.
fn label_scores_text_config(labels: &[&str]) -> TextConfig {
    TextConfig {
        format: TextResponseFormat::JsonSchema(ResponseFormatJsonSchema {
            name: "LabelScores".to_string(),
            description: Some("Probability of each candidate label.".to_string()),
            schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "scores": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "label": { "type": "string", "enum": labels },
                                "score": { "type": "number" }
                            },
                            "required": ["label", "score"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["scores"],
                "additionalProperties": false
            })),
            strict: Some(true),
        }),
    }
}
