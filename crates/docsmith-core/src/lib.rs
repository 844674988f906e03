//! # Docsmith Core Library
//!
//! Domain types and the document generation collaborator for Docsmith.
//!
//! ## Modules
//!
//! - `branding` - Centralized product constants
//! - `domain` - Generation request/result entities
//! - `service` - The `DocumentGenerator` seam and its Anthropic-backed implementation

pub mod branding;
pub mod domain;
pub mod service;

// Re-export commonly used types
pub use domain::*;
pub use service::{AnthropicGenerator, DocumentGenerator, GeneratorError};
