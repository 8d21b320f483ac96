//! Gemini completion backend integration.

use async_trait::async_trait;

pub mod classify;
pub mod client;
pub mod models;

pub use classify::{CompletionError, classify_failure};
pub use client::{GeminiClient, ModelInfo};
pub use models::{FALLBACK_MODELS, FREE_TIER_MODELS, model_candidates, select_fallback_model};

/// Interface implemented by completion backends able to answer a prompt.
#[async_trait]
pub trait CompletionBackend {
    /// Submit the prompt and return the generated text verbatim.
    async fn generate(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Interpolate the context and query into the fixed instructional prompt.
pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "You have access to the following documents from Google Drive:\n\n{context}\n\n---\n\nUser Question: {query}\n\nPlease provide a comprehensive answer based on the documents above. If the information is not available in the documents, please state that clearly."
    )
}
