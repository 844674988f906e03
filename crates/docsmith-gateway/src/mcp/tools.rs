//! Tool invocation surface
//!
//! Declares the named remote procedures a session can invoke, validates their
//! arguments into typed structs before any business logic runs, and
//! normalizes outcomes: collaborator failures become tool-level error results
//! (`isError: true`), never transport faults, so clients can distinguish
//! "your session is gone" from "the generation failed, try different input".

use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::warn;

use docsmith_core::{
    DetailLevel, DocumentGenerator, GenerationOptions, GenerationRequest, TechStackEntry,
};

use super::jsonrpc::JsonRpcError;

pub const GENERATE_DOCUMENTATION: &str = "generate-documentation";
pub const CREATE_AGENTS_MD: &str = "create-agents-md";
pub const CREATE_CURSOR_RULES: &str = "create-cursor-rules";

/// Static declaration of one tool, served by tools/list
pub struct ToolSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl ToolSpec {
    pub fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "title": self.title,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }
}

fn scaffold_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "projectName": { "type": "string" },
            "projectDescription": { "type": "string" },
            "techStack": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "version": { "type": "string" }
                    },
                    "required": ["name"]
                }
            },
            "customInstructions": { "type": "string" }
        },
        "required": ["projectName", "projectDescription", "techStack"]
    })
}

/// All declared tools. The schemas are documentation for clients; the
/// authoritative validation is the typed deserialization in [`ToolRequest::parse`].
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: GENERATE_DOCUMENTATION,
            title: "Generate Documentation",
            description: "Generate AI-powered documentation from templates and project variables",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "projectId": { "type": "string" },
                    "templateIds": { "type": "array", "items": { "type": "string" } },
                    "customPrompt": { "type": "string" },
                    "variables": { "type": "object" },
                    "options": {
                        "type": "object",
                        "properties": {
                            "includeComments": { "type": "boolean" },
                            "detailLevel": {
                                "type": "string",
                                "enum": ["basic", "detailed", "comprehensive"]
                            },
                            "outputFormat": {
                                "type": "string",
                                "enum": ["markdown", "json", "yaml"]
                            }
                        },
                        "required": ["includeComments", "detailLevel", "outputFormat"]
                    }
                },
                "required": ["projectId", "templateIds", "variables", "options"]
            }),
        },
        ToolSpec {
            name: CREATE_AGENTS_MD,
            title: "Create AGENTS.md",
            description: "Create a comprehensive AGENTS.md file for AI coding agents",
            input_schema: scaffold_schema(),
        },
        ToolSpec {
            name: CREATE_CURSOR_RULES,
            title: "Create .cursorrules",
            description: "Create a .cursorrules file for Cursor IDE configuration",
            input_schema: scaffold_schema(),
        },
    ]
}

/// Arguments of generate-documentation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentationArgs {
    pub project_id: String,
    pub template_ids: Vec<String>,
    #[serde(default)]
    pub custom_prompt: Option<String>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    pub options: GenerationOptions,
}

/// Arguments shared by the fixed-shape scaffold tools
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldArgs {
    pub project_name: String,
    pub project_description: String,
    pub tech_stack: Vec<TechStackEntry>,
    #[serde(default)]
    pub custom_instructions: Option<String>,
}

/// A schema-valid tool invocation, one variant per declared tool
#[derive(Debug, Clone)]
pub enum ToolRequest {
    GenerateDocumentation(GenerateDocumentationArgs),
    CreateAgentsMd(ScaffoldArgs),
    CreateCursorRules(ScaffoldArgs),
}

impl ToolRequest {
    /// Validate a raw invocation into a typed request.
    ///
    /// Invalid arguments are rejected here, before any business logic or
    /// collaborator call.
    pub fn parse(name: &str, arguments: Value) -> Result<Self, JsonRpcError> {
        let invalid =
            |e: serde_json::Error| JsonRpcError::invalid_params(format!("{}: {}", name, e));
        match name {
            GENERATE_DOCUMENTATION => Ok(ToolRequest::GenerateDocumentation(
                serde_json::from_value(arguments).map_err(invalid)?,
            )),
            CREATE_AGENTS_MD => Ok(ToolRequest::CreateAgentsMd(
                serde_json::from_value(arguments).map_err(invalid)?,
            )),
            CREATE_CURSOR_RULES => Ok(ToolRequest::CreateCursorRules(
                serde_json::from_value(arguments).map_err(invalid)?,
            )),
            other => Err(JsonRpcError::invalid_params(format!(
                "Unknown tool: {}",
                other
            ))),
        }
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolRequest::GenerateDocumentation(_) => GENERATE_DOCUMENTATION,
            ToolRequest::CreateAgentsMd(_) => CREATE_AGENTS_MD,
            ToolRequest::CreateCursorRules(_) => CREATE_CURSOR_RULES,
        }
    }
}

/// Normalized tool outcome: literal text content plus an error flag
#[derive(Debug, Clone)]
pub struct CallToolResult {
    pub content: String,
    pub is_error: bool,
}

impl CallToolResult {
    pub fn text(content: String) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            content: message,
            is_error: true,
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.content }],
            "isError": self.is_error,
        })
    }
}

/// Execute a validated tool request. Infallible at the transport level:
/// every collaborator failure is folded into the result.
pub async fn execute(
    request: ToolRequest,
    generator: &Arc<dyn DocumentGenerator>,
) -> CallToolResult {
    match request {
        ToolRequest::GenerateDocumentation(args) => {
            let generation = GenerationRequest {
                project_id: args.project_id,
                template_ids: args.template_ids,
                custom_prompt: args.custom_prompt,
                variables: args.variables,
                options: args.options,
            };
            match generator.generate(generation).await {
                Ok(result) => match serde_json::to_string_pretty(&result) {
                    Ok(text) => CallToolResult::text(text),
                    Err(e) => tool_failure("generating documentation", &e.to_string()),
                },
                Err(e) => tool_failure("generating documentation", &e.to_string()),
            }
        }
        ToolRequest::CreateAgentsMd(args) => {
            scaffold("agents-md", "AGENTS.md", DetailLevel::Comprehensive, args, generator).await
        }
        ToolRequest::CreateCursorRules(args) => {
            scaffold(
                "cursor-rules",
                ".cursorrules",
                DetailLevel::Detailed,
                args,
                generator,
            )
            .await
        }
    }
}

async fn scaffold(
    template_id: &str,
    label: &str,
    detail_level: DetailLevel,
    args: ScaffoldArgs,
    generator: &Arc<dyn DocumentGenerator>,
) -> CallToolResult {
    let generation = GenerationRequest::for_template(
        template_id,
        args.project_name,
        args.project_description,
        args.tech_stack,
        args.custom_instructions,
        detail_level,
    );

    match generator.generate(generation).await {
        Ok(result) => match result.first_content() {
            Some(content) => CallToolResult::text(content.to_string()),
            None => CallToolResult::text("No content generated".to_string()),
        },
        Err(e) => tool_failure(&format!("creating {}", label), &e.to_string()),
    }
}

fn tool_failure(action: &str, message: &str) -> CallToolResult {
    warn!(action, message, "tool execution failed");
    CallToolResult::error(format!("Error {}: {}", action, message))
}
