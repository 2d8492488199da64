pub mod gemini;

pub use gemini::GeminiClient;

use crate::types::{ModelResponse, Prompt};
use anyhow::Result;
use async_trait::async_trait;

/// Connector to a remote generation endpoint that already knows the tool set.
#[async_trait]
pub trait ModelBinding: Send + Sync {
    /// Send one prompt and wait for the parsed reply.
    async fn invoke(&self, prompt: &Prompt) -> Result<ModelResponse>;
}
