//! The document generation seam
//!
//! The gateway only ever sees this trait. Tool handlers treat the generator
//! as an opaque async collaborator: any failure it reports is translated into
//! a tool-level error result, never a protocol fault.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{GenerationRequest, GenerationResult};

/// Errors a generator implementation can report
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generation backend request failed: {0}")]
    Transport(String),

    #[error("generation backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("generation backend returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("no API credentials configured for the generation backend")]
    MissingCredentials,
}

impl From<reqwest::Error> for GeneratorError {
    fn from(err: reqwest::Error) -> Self {
        GeneratorError::Transport(err.to_string())
    }
}

/// Asynchronous document generation collaborator.
///
/// Implementations are expected to be best-effort across templates: a failure
/// on one template id goes into `GenerationResult::metadata.errors` while the
/// rest still generate. `Err` is reserved for run-level failures where no
/// result could be produced at all.
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, GeneratorError>;
}
