//! Anthropic-backed document generator
//!
//! Calls the Anthropic Messages API once per requested template. Failures on
//! individual templates are collected into the run metadata; the run itself
//! only fails when the request cannot be serviced at all.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::generator::{DocumentGenerator, GeneratorError};
use crate::domain::{
    DetailLevel, Document, GenerationMetadata, GenerationRequest, GenerationResult, TokenUsage,
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const MAX_TOKENS: u32 = 4000;

/// Configuration for the Anthropic generator
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    /// Override for tests; defaults to the public API endpoint
    pub base_url: String,
}

impl AnthropicConfig {
    /// Read configuration from the environment (`ANTHROPIC_API_KEY`,
    /// optional `ANTHROPIC_MODEL`).
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }
}

/// Messages API request body
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Messages API response body (only the fields we consume)
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

/// Document generator backed by the Anthropic Messages API
pub struct AnthropicGenerator {
    http: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicGenerator {
    pub fn new(config: AnthropicConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    async fn generate_single(
        &self,
        template_id: &str,
        request: &GenerationRequest,
    ) -> Result<Document, GeneratorError> {
        let prompt = build_prompt(template_id, request);

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.3,
            messages: vec![Message {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .http
            .post(&self.config.base_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Backend { status, message });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .content
            .iter()
            .find(|b| b.block_type == "text")
            .map(|b| b.text.clone())
            .ok_or_else(|| {
                GeneratorError::MalformedResponse("response carried no text block".to_string())
            })?;

        debug!(
            template_id,
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "generated document"
        );

        Ok(Document {
            id: Uuid::new_v4(),
            project_id: request.project_id.clone(),
            template_id: template_id.to_string(),
            title: template_title(template_id),
            content,
            generated_by: self.config.model.clone(),
            token_usage: TokenUsage::new(parsed.usage.input_tokens, parsed.usage.output_tokens),
            created_at: Utc::now(),
        })
    }
}

#[async_trait]
impl DocumentGenerator for AnthropicGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, GeneratorError> {
        if self.config.api_key.is_empty() {
            return Err(GeneratorError::MissingCredentials);
        }

        let started = std::time::Instant::now();
        let mut documents = Vec::new();
        let mut errors = Vec::new();
        let mut total_tokens = 0u64;

        for template_id in &request.template_ids {
            match self.generate_single(template_id, &request).await {
                Ok(document) => {
                    total_tokens += document.token_usage.total;
                    documents.push(document);
                }
                Err(e) => {
                    warn!(template_id, error = %e, "template generation failed");
                    errors.push(format!(
                        "Failed to generate document for template {}: {}",
                        template_id, e
                    ));
                }
            }
        }

        let success = errors.is_empty();
        Ok(GenerationResult {
            documents,
            metadata: GenerationMetadata {
                total_tokens,
                generation_time_ms: started.elapsed().as_millis() as u64,
                model_used: self.config.model.clone(),
                success,
                errors,
            },
        })
    }
}

/// Human title for a known template id; falls back to the id itself.
fn template_title(template_id: &str) -> String {
    match template_id {
        "agents-md" => "AGENTS.md".to_string(),
        "cursor-rules" => ".cursorrules".to_string(),
        "api-docs" => "API Documentation".to_string(),
        "readme" => "README".to_string(),
        other => other.to_string(),
    }
}

/// Assemble the prompt for one template from the request's variable bag.
fn build_prompt(template_id: &str, request: &GenerationRequest) -> String {
    let mut prompt = String::new();

    prompt.push_str(match template_id {
        "agents-md" => {
            "Create a comprehensive AGENTS.md file that tells AI coding agents how to \
             work inside this project: conventions, build and test commands, and \
             architectural boundaries.\n\n"
        }
        "cursor-rules" => {
            "Create a .cursorrules file for the Cursor IDE that encodes this project's \
             coding conventions and review expectations.\n\n"
        }
        _ => "Generate project documentation for the template described below.\n\n",
    });

    prompt.push_str(&format!("Template: {}\n", template_id));

    let detail = match request.options.detail_level {
        DetailLevel::Basic => "Keep it brief: only the essentials.",
        DetailLevel::Detailed => "Cover each topic with concrete detail.",
        DetailLevel::Comprehensive => "Be exhaustive: cover every relevant topic in depth.",
    };
    prompt.push_str(detail);
    prompt.push('\n');

    if !request.variables.is_empty() {
        prompt.push_str("\nProject context:\n");
        for (key, value) in &request.variables {
            match value {
                Value::String(s) => prompt.push_str(&format!("- {}: {}\n", key, s)),
                other => prompt.push_str(&format!(
                    "- {}: {}\n",
                    key,
                    serde_json::to_string(other).unwrap_or_default()
                )),
            }
        }
    }

    if let Some(custom) = &request.custom_prompt {
        prompt.push_str("\nAdditional instructions:\n");
        prompt.push_str(custom);
        prompt.push('\n');
    }

    prompt
}
