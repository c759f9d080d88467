//! # Courseflow Models
//!
//! The narrow external capability seam: text completion and image
//! generation. The engine only ever sees the [`CompletionClient`] trait; the
//! Gemini implementation lives behind it so tests can script replies.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

/// Maximum attempts per capability call; only transient overload conditions
/// are retried, everything else surfaces immediately.
const MAX_ATTEMPTS: usize = 3;

/// Text/image generation capability consumed by the dispatcher and executor.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete a prompt into text. May fail; no streaming.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Generate an image into `output_path`.
    async fn generate_image(&self, prompt: &str, output_path: &Path) -> Result<()>;
}

/// Overload/rate-limit markers worth a retry with backoff.
fn is_transient(message: &str) -> bool {
    ["429", "503", "UNAVAILABLE", "RESOURCE_EXHAUSTED", "overloaded"]
        .iter()
        .any(|marker| message.contains(marker))
}

/// Gemini-backed [`CompletionClient`] over the Generative Language API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    text_model: String,
    image_model: String,
    base_url: String,
}

impl GeminiClient {
    /// Configure from the environment: `GEMINI_API_KEY` (required),
    /// `GEMINI_TEXT_MODEL` and `GEMINI_IMAGE_MODEL` (optional overrides).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            text_model: std::env::var("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            image_model: std::env::var("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-image".to_string()),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        })
    }

    /// Point the client at a different endpoint (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn generate_content(&self, model: &str, prompt: &str) -> Result<Value> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "contents": [{"parts": [{"text": prompt}]}]
            }))
            .send()
            .await
            .context("request to Gemini API failed")?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            bail!("Gemini API error {status}: {body}");
        }
        serde_json::from_str(&body).context("malformed Gemini API response")
    }

    fn first_text_part(reply: &Value) -> Option<String> {
        let parts = reply
            .pointer("/candidates/0/content/parts")?
            .as_array()?;
        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn first_image_part(reply: &Value) -> Option<&str> {
        let parts = reply
            .pointer("/candidates/0/content/parts")?
            .as_array()?;
        parts
            .iter()
            .filter_map(|part| part.pointer("/inlineData/data").and_then(Value::as_str))
            .next()
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let mut last_error = anyhow::anyhow!("no attempts made");
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let wait = Duration::from_secs(2 * attempt as u64);
                tracing::info!(attempt, ?wait, "Gemini busy, backing off before retry");
                tokio::time::sleep(wait).await;
            }
            match self.generate_content(&self.text_model, prompt).await {
                Ok(reply) => {
                    return Self::first_text_part(&reply)
                        .context("Gemini reply contained no text");
                }
                Err(err) => {
                    if !is_transient(&err.to_string()) {
                        return Err(err);
                    }
                    last_error = err;
                }
            }
        }
        Err(last_error.context(format!("Gemini API busy after {MAX_ATTEMPTS} attempts")))
    }

    async fn generate_image(&self, prompt: &str, output_path: &Path) -> Result<()> {
        let mut last_error = anyhow::anyhow!("no attempts made");
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let wait = Duration::from_secs(2 * attempt as u64);
                tracing::info!(attempt, ?wait, "image API busy, backing off before retry");
                tokio::time::sleep(wait).await;
            }
            match self.generate_content(&self.image_model, prompt).await {
                Ok(reply) => {
                    let data = Self::first_image_part(&reply)
                        .context("no image returned by model")?;
                    let bytes = base64::engine::general_purpose::STANDARD
                        .decode(data)
                        .context("image payload is not valid base64")?;
                    if let Some(parent) = output_path.parent() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                    tokio::fs::write(output_path, bytes)
                        .await
                        .with_context(|| format!("failed to write image: {output_path:?}"))?;
                    return Ok(());
                }
                Err(err) => {
                    if !is_transient(&err.to_string()) {
                        return Err(err);
                    }
                    last_error = err;
                }
            }
        }
        Err(last_error.context(format!("image generation busy after {MAX_ATTEMPTS} attempts")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_markers_are_recognized() {
        assert!(is_transient("Gemini API error 429 Too Many Requests: slow down"));
        assert!(is_transient("Gemini API error 503 Service Unavailable: busy"));
        assert!(is_transient("status RESOURCE_EXHAUSTED"));
        assert!(!is_transient("Gemini API error 400 Bad Request: bad field"));
        assert!(!is_transient("GEMINI_API_KEY is not set"));
    }

    #[test]
    fn text_parts_are_concatenated() {
        let reply = json!({
            "candidates": [{"content": {"parts": [
                {"text": "Hello "},
                {"text": "world"}
            ]}}]
        });
        assert_eq!(
            GeminiClient::first_text_part(&reply).as_deref(),
            Some("Hello world")
        );
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        assert!(GeminiClient::first_text_part(&json!({"candidates": []})).is_none());
    }

    #[test]
    fn inline_image_data_is_found() {
        let reply = json!({
            "candidates": [{"content": {"parts": [
                {"text": "here you go"},
                {"inlineData": {"mimeType": "image/png", "data": "aGVsbG8="}}
            ]}}]
        });
        assert_eq!(GeminiClient::first_image_part(&reply), Some("aGVsbG8="));
    }
}
