//! Generation request and result types
//!
//! Wire shapes use camelCase to stay compatible with existing clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// How much detail the generated document should carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Basic,
    Detailed,
    Comprehensive,
}

/// Output format of a generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Json,
    Yaml,
}

/// Options controlling a generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub include_comments: bool,
    pub detail_level: DetailLevel,
    pub output_format: OutputFormat,
}

/// One entry in a project's tech stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechStackEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A request to generate one or more documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Project the documents belong to
    pub project_id: String,
    /// Template ids to generate, one document each
    pub template_ids: Vec<String>,
    /// Extra instructions appended to every template prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
    /// Free-form variable bag substituted into prompts
    #[serde(default)]
    pub variables: Map<String, Value>,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    /// Build a single-template request from a project description.
    ///
    /// Used by the fixed-shape convenience tools that wrap one template.
    pub fn for_template(
        template_id: &str,
        project_name: String,
        project_description: String,
        tech_stack: Vec<TechStackEntry>,
        custom_prompt: Option<String>,
        detail_level: DetailLevel,
    ) -> Self {
        let mut variables = Map::new();
        variables.insert("projectName".into(), Value::String(project_name));
        variables.insert(
            "projectDescription".into(),
            Value::String(project_description),
        );
        variables.insert(
            "techStack".into(),
            serde_json::to_value(tech_stack).unwrap_or(Value::Array(vec![])),
        );

        Self {
            project_id: format!("project_{}", Utc::now().timestamp_millis()),
            template_ids: vec![template_id.to_string()],
            custom_prompt,
            variables,
            options: GenerationOptions {
                include_comments: true,
                detail_level,
                output_format: OutputFormat::Markdown,
            },
        }
    }
}

/// Token accounting for one generation call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl TokenUsage {
    pub fn new(input: u64, output: u64) -> Self {
        Self {
            input,
            output,
            total: input + output,
        }
    }
}

/// One generated document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub project_id: String,
    pub template_id: String,
    pub title: String,
    pub content: String,
    pub generated_by: String,
    pub token_usage: TokenUsage,
    pub created_at: DateTime<Utc>,
}

/// Metadata about a whole generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub total_tokens: u64,
    pub generation_time_ms: u64,
    pub model_used: String,
    pub success: bool,
    /// Per-template failures; generation is best-effort across templates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Result of a generation run: zero or more documents plus run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub documents: Vec<Document>,
    pub metadata: GenerationMetadata,
}

impl GenerationResult {
    /// Content of the first document, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.documents.first().map(|d| d.content.as_str())
    }
}
