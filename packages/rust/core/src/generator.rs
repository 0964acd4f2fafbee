//! The text-generation capability consumed by the engine.

use async_trait::async_trait;
use docqa_shared::Result;

/// Maps a prompt to generated text.
///
/// Implementations report transport failures, non-success statuses, and
/// envelopes without a text payload as `DocQaError::Generator`. The engine
/// makes no assumption about latency or determinism.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model or backend label for tracing.
    fn model(&self) -> &str {
        "unknown"
    }
}
