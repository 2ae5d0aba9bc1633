//! Optional rewriting of recommendation text into friendlier prose
//!
//! Polishing is an enrichment step only. `polish_or_original` is the one
//! entry point callers use: whatever goes wrong in the collaborator, the
//! caller gets usable text back.

use async_trait::async_trait;

/// Something that rewrites recommendation text
#[async_trait]
pub trait Polisher: Send + Sync {
    async fn polish(&self, text: &str) -> anyhow::Result<String>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Default polisher: returns the text unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPolisher;

#[async_trait]
impl Polisher for IdentityPolisher {
    async fn polish(&self, text: &str) -> anyhow::Result<String> {
        Ok(text.to_string())
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Polish `text`, falling back to it verbatim on any failure or empty reply.
pub async fn polish_or_original(polisher: &dyn Polisher, text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    match polisher.polish(text).await {
        Ok(polished) if !polished.trim().is_empty() => polished.trim().to_string(),
        Ok(_) => {
            tracing::warn!("{} polisher returned empty text, using original", polisher.name());
            text.to_string()
        }
        Err(e) => {
            tracing::warn!("{} polisher failed, using original text: {:#}", polisher.name(), e);
            text.to_string()
        }
    }
}

// ============================================================================
// Chat-completion polisher (OpenAI-compatible endpoint)
// ============================================================================

#[cfg(feature = "api")]
pub use completion::CompletionPolisher;

#[cfg(feature = "api")]
mod completion {
    use std::time::Duration;

    use anyhow::Context;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};

    use super::Polisher;

    const SYSTEM_PROMPT: &str = "You are a friendly plant-care assistant.";
    const INSTRUCTION: &str = "Polish and expand the following care instructions into a concise, \
        helpful paragraph with specific actionable steps and short reasons.";

    pub struct CompletionPolisher {
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
        model: String,
    }

    #[derive(Serialize)]
    struct ChatRequest<'a> {
        model: &'a str,
        messages: Vec<ChatMessage<'a>>,
        temperature: f32,
        max_tokens: u32,
    }

    #[derive(Serialize)]
    struct ChatMessage<'a> {
        role: &'a str,
        content: String,
    }

    #[derive(Deserialize)]
    struct ChatResponse {
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: ReplyMessage,
    }

    #[derive(Deserialize)]
    struct ReplyMessage {
        content: Option<String>,
    }

    impl CompletionPolisher {
        pub fn new(
            endpoint: impl Into<String>,
            api_key: impl Into<String>,
            model: impl Into<String>,
            timeout: Duration,
        ) -> anyhow::Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build HTTP client for polishing")?;

            Ok(Self {
                client,
                endpoint: endpoint.into(),
                api_key: api_key.into(),
                model: model.into(),
            })
        }
    }

    #[async_trait]
    impl Polisher for CompletionPolisher {
        async fn polish(&self, text: &str) -> anyhow::Result<String> {
            let request = ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: SYSTEM_PROMPT.to_string(),
                    },
                    ChatMessage {
                        role: "user",
                        content: format!("{}\n\nInstructions:\n{}", INSTRUCTION, text),
                    },
                ],
                temperature: 0.6,
                max_tokens: 200,
            };

            let response: ChatResponse = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .context("Polishing request failed")?
                .error_for_status()
                .context("Polishing service returned an error")?
                .json()
                .await
                .context("Unreadable polishing response")?;

            response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .context("Polishing response had no content")
        }

        fn name(&self) -> &'static str {
            "completion"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingPolisher;

    #[async_trait]
    impl Polisher for FailingPolisher {
        async fn polish(&self, _text: &str) -> anyhow::Result<String> {
            anyhow::bail!("missing credentials")
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct FixedPolisher(&'static str);

    #[async_trait]
    impl Polisher for FixedPolisher {
        async fn polish(&self, _text: &str) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    const TEXT: &str = "Hydration looks okay.\nFertilizer schedule OK.";

    #[tokio::test]
    async fn test_identity_returns_input() {
        assert_eq!(polish_or_original(&IdentityPolisher, TEXT).await, TEXT);
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        assert_eq!(polish_or_original(&FailingPolisher, TEXT).await, TEXT);
    }

    #[tokio::test]
    async fn test_empty_reply_falls_back() {
        assert_eq!(polish_or_original(&FixedPolisher("  \n"), TEXT).await, TEXT);
    }

    #[tokio::test]
    async fn test_polished_text_is_trimmed() {
        let polished = polish_or_original(&FixedPolisher("  Your plant is doing well. \n"), TEXT).await;
        assert_eq!(polished, "Your plant is doing well.");
    }

    #[tokio::test]
    async fn test_blank_input_skips_polisher() {
        assert_eq!(polish_or_original(&FixedPolisher("should not appear"), "").await, "");
    }
}
