//! Inline payload encoding for staged uploads.

use crate::services::staging::StagedFile;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use service_core::error::AppError;

/// Base64 file content tagged with the MIME type declared to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub data: String,
    pub mime_type: String,
}

impl EncodedPayload {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }
}

/// Read a staged file fully and encode it under `mime_type`.
pub async fn encode_staged(staged: &StagedFile, mime_type: &str) -> Result<EncodedPayload, AppError> {
    let bytes = staged.read().await.map_err(|e| {
        tracing::error!(
            path = %staged.path().display(),
            "Failed to read staged file: {}",
            e
        );
        e
    })?;

    tracing::debug!(
        bytes = bytes.len(),
        mime_type = %mime_type,
        "Encoded staged file as inline payload"
    );

    Ok(EncodedPayload::from_bytes(&bytes, mime_type))
}
