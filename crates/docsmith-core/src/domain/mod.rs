//! Core domain entities

mod generation;

pub use generation::{
    DetailLevel, Document, GenerationMetadata, GenerationOptions, GenerationRequest,
    GenerationResult, OutputFormat, TechStackEntry, TokenUsage,
};
