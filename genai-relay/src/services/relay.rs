//! The request pipeline shared by all generation routes:
//! staged file → inline payload → provider → text.

use crate::models::MediaRoute;
use crate::services::encoder::{encode_staged, EncodedPayload};
use crate::services::metrics;
use crate::services::providers::TextProvider;
use crate::services::staging::StagedFile;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;

pub const TEXT_ROUTE_LABEL: &str = "text";

/// Forward a bare prompt.
pub async fn relay_text(provider: Arc<dyn TextProvider>, prompt: String) -> Result<String, AppError> {
    dispatch(provider.as_ref(), TEXT_ROUTE_LABEL, &prompt, None).await
}

/// Forward a prompt grounded in one staged upload.
///
/// The staged file is released before this returns, whatever the outcome. A
/// failed release is logged and does not replace the outcome.
pub async fn relay_media(
    provider: Arc<dyn TextProvider>,
    route: MediaRoute,
    prompt: String,
    staged: StagedFile,
) -> Result<String, AppError> {
    let outcome = encode_and_dispatch(provider.as_ref(), route, &prompt, &staged).await;

    let path = staged.path().to_path_buf();
    if let Err(e) = staged.release().await {
        tracing::warn!(
            route = route.label(),
            path = %path.display(),
            "Failed to remove staged file: {}",
            e
        );
    }

    outcome
}

async fn encode_and_dispatch(
    provider: &dyn TextProvider,
    route: MediaRoute,
    prompt: &str,
    staged: &StagedFile,
) -> Result<String, AppError> {
    let mime_type = route.payload_mime_type(staged.mime_type());
    let payload = encode_staged(staged, &mime_type).await?;
    dispatch(provider, route.label(), prompt, Some(&payload)).await
}

async fn dispatch(
    provider: &dyn TextProvider,
    route: &str,
    prompt: &str,
    payload: Option<&EncodedPayload>,
) -> Result<String, AppError> {
    let started = Instant::now();
    let result = provider.generate(prompt, payload).await;
    metrics::observe_provider_latency(route, started.elapsed().as_secs_f64());

    match result {
        Ok(response) => {
            tracing::info!(
                route,
                input_tokens = response.input_tokens,
                output_tokens = response.output_tokens,
                output_len = response.text.len(),
                "Generation succeeded"
            );
            Ok(response.text)
        }
        Err(e) => {
            tracing::error!(route, "Provider call failed: {}", e);
            Err(e.into())
        }
    }
}
