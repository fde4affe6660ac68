use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use edgegate_core::{CompletionProvider, CompletionRequest, CompletionResponse};

/// A mock completion provider that returns canned responses and counts calls,
/// so tests can assert the backend was (or was not) invoked.
#[derive(Default)]
pub struct MockProvider {
    fixed_response: Option<String>,
    calls: AtomicU64,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(CompletionResponse {
            content: self
                .fixed_response
                .clone()
                .unwrap_or_else(|| format!("echo: {}", request.prompt)),
            provider: "mock".to_string(),
            model: request.model.clone(),
        })
    }
}
