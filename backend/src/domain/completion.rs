//! Text completion seam used by the classifier and the assistant.

use anyhow::{bail, Result};
use async_trait::async_trait;

/// Opaque prompt-in, text-out service
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Used when no API key is configured; every call fails
#[derive(Debug, Clone, Default)]
pub struct DisabledCompletion;

#[async_trait]
impl CompletionService for DisabledCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        bail!("completion service is not configured")
    }
}
