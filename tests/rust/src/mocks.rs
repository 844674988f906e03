//! Mock generator implementations for testing
//!
//! In-memory stand-ins for the generation backend so gateway tests never
//! touch the network.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use docsmith_core::{
    Document, DocumentGenerator, GenerationMetadata, GenerationRequest, GenerationResult,
    GeneratorError, TokenUsage,
};

enum Mode {
    Succeed(String),
    Fail(String),
}

/// Counts invocations and either returns fixed content or fails.
pub struct MockGenerator {
    calls: AtomicUsize,
    mode: Mode,
}

impl MockGenerator {
    /// Every call succeeds, producing one document per template id with the
    /// given content.
    pub fn succeeding(content: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            mode: Mode::Succeed(content.to_string()),
        })
    }

    /// Every call fails with a run-level transport error.
    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            mode: Mode::Fail(message.to_string()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentGenerator for MockGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.mode {
            Mode::Fail(message) => Err(GeneratorError::Transport(message.clone())),
            Mode::Succeed(content) => {
                let documents: Vec<Document> = request
                    .template_ids
                    .iter()
                    .map(|template_id| Document {
                        id: Uuid::new_v4(),
                        project_id: request.project_id.clone(),
                        template_id: template_id.clone(),
                        title: format!("Mock document for {}", template_id),
                        content: content.clone(),
                        generated_by: "mock-generator".to_string(),
                        token_usage: TokenUsage::new(10, 20),
                        created_at: Utc::now(),
                    })
                    .collect();

                Ok(GenerationResult {
                    metadata: GenerationMetadata {
                        total_tokens: 30 * documents.len() as u64,
                        generation_time_ms: 1,
                        model_used: "mock".to_string(),
                        success: true,
                        errors: vec![],
                    },
                    documents,
                })
            }
        }
    }
}
