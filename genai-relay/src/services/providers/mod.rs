//! Model provider abstraction.
//!
//! Handlers only see [`TextProvider`]; the Gemini client is wired in at
//! startup and the mock is used by tests.

pub mod gemini;
pub mod mock;

use crate::services::encoder::EncodedPayload;
use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl From<ProviderError> for AppError {
    /// API errors already carry the provider's own message and status, so they
    /// pass through bare. The other variants keep their single label.
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::ApiError(message) => AppError::Upstream(message),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// Text produced by a single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub text: String,

    /// Input tokens consumed, when the provider reports them.
    pub input_tokens: i32,

    /// Output tokens generated, when the provider reports them.
    pub output_tokens: i32,
}

/// A generative model that answers a prompt, optionally grounded in one
/// inline attachment.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// One round trip to the model. No retries.
    async fn generate(
        &self,
        prompt: &str,
        attachment: Option<&EncodedPayload>,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Whether the provider is configured and reachable.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream_message(err: ProviderError) -> String {
        match AppError::from(err) {
            AppError::Upstream(message) => message,
            other => panic!("expected an upstream error, got {:?}", other),
        }
    }

    #[test]
    fn api_error_reaches_the_caller_without_an_extra_prefix() {
        let message = upstream_message(ProviderError::ApiError(
            "Gemini API error 400 Bad Request: API key not valid".to_string(),
        ));

        assert_eq!(message, "Gemini API error 400 Bad Request: API key not valid");
    }

    #[test]
    fn other_provider_errors_keep_one_label() {
        assert_eq!(
            upstream_message(ProviderError::RateLimited("Resource has been exhausted".to_string())),
            "Rate limited: Resource has been exhausted"
        );
        assert_eq!(
            upstream_message(ProviderError::NetworkError("connection refused".to_string())),
            "Network error: connection refused"
        );
    }
}
