use anyhow::Result;
use async_trait::async_trait;

/// Durable key-value store for secrets (factory secret, device-key map).
///
/// Implementations are expected to provide at-least-once reads and
/// last-writer-wins whole-value writes. `get` returns `Ok(None)` for a name
/// that has never been written.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the value stored under `name`, if any.
    async fn get(&self, name: &str) -> Result<Option<String>>;

    /// Replace the whole value stored under `name`.
    async fn put(&self, name: &str, value: &str) -> Result<()>;
}

/// Trait for completion backends invoked after authorization succeeds.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name (e.g., "http", "mock").
    fn name(&self) -> &str;

    /// Send a completion request and return the response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}

/// Request to a completion backend.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Response from a completion backend.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
}
