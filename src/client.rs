use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;

/// Capability to exchange one message with the chat backend.
///
/// Every call is independent: no history is sent, and the reply is the
/// complete response text. Any failure is reported as `Err`; callers do not
/// distinguish between failure kinds.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, text: &str) -> Result<String>;
}

/// Body posted to the chat endpoint
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// HTTP transport: `POST {"message": ...}`, plain-text reply
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, text: &str) -> Result<String> {
        tracing::debug!(endpoint = %self.endpoint, chars = text.chars().count(), "sending message");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message: text })
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Chat endpoint returned {}: {}", status, error_text));
        }

        // The body is handed to the conversation verbatim, never parsed.
        response
            .text()
            .await
            .context("Failed to read response body")
    }
}
