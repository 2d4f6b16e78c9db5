//! Mock provider implementation for testing.

use super::{ProviderError, ProviderResponse, TextProvider};
use crate::services::encoder::EncodedPayload;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// How the mock answers.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always return this text.
    Reply(String),
    /// Return the prompt it was given.
    EchoPrompt,
    /// Fail every call with this API error message.
    Fail(String),
}

/// One recorded `generate` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub attachment: Option<EncodedPayload>,
}

/// Mock text provider that records every call it receives.
pub struct MockTextProvider {
    behavior: MockBehavior,
    healthy: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    completed: AtomicUsize,
}

impl MockTextProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            healthy: true,
            delay: None,
            calls: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Reply(text.into()))
    }

    pub fn echoing() -> Self {
        Self::new(MockBehavior::EchoPrompt)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fail(message.into()))
    }

    /// Make `health_check` fail.
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Calls that ran to the end, successful or not.
    pub fn completed_calls(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        attachment: Option<&EncodedPayload>,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.lock().await.push(RecordedCall {
            prompt: prompt.to_string(),
            attachment: attachment.cloned(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        let text = match &self.behavior {
            MockBehavior::Reply(text) => text.clone(),
            MockBehavior::EchoPrompt => prompt.to_string(),
            MockBehavior::Fail(message) => return Err(ProviderError::ApiError(message.clone())),
        };

        Ok(ProviderResponse {
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: text.len() as i32 / 4,
            text,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.healthy {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ))
        }
    }
}
