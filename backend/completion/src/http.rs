use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use edgegate_core::{CompletionProvider, CompletionRequest, CompletionResponse};

/// HTTP completion provider speaking the messages wire shape.
///
/// The whole call carries a client-level bounded timeout and is never
/// retried; a timeout surfaces to the caller as a server error.
pub struct HttpProvider {
    client: Client,
    url: String,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build completion HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl CompletionProvider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let body = MessagesRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        };

        debug!(model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Completion HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Completion backend returned {}: {}", status, error_body);
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        let content = parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            provider: "http".to_string(),
            model: request.model.clone(),
        })
    }
}
