//! Domain services

mod anthropic;
mod generator;

pub use anthropic::{AnthropicConfig, AnthropicGenerator};
pub use generator::{DocumentGenerator, GeneratorError};
