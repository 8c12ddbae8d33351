//! Scoring backend seam — a one-shot text completion service.
//!
//! `AppState` holds an `Arc<dyn ScoringBackend>`; production wires in
//! `LlmClient`, tests wire in a scripted fake.

use async_trait::async_trait;

use crate::llm_client::prompts::JSON_ARRAY_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};

#[async_trait]
pub trait ScoringBackend: Send + Sync {
    /// Sends `prompt` and returns the raw reply text. No streaming.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl ScoringBackend for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.send_message(prompt, JSON_ARRAY_ONLY_SYSTEM).await?;
        // A reply with no text block is surfaced as empty text; the extractor
        // reports it as unusable output.
        Ok(response.text().unwrap_or_default().to_string())
    }
}
