use crate::dtos::{GenerateResponse, GenerateTextRequest};
use crate::models::media::FALLBACK_MIME_TYPE;
use crate::models::MediaRoute;
use crate::services::metrics;
use crate::services::relay::{self, TEXT_ROUTE_LABEL};
use crate::services::{StagedFile, StagingArea};
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};
use service_core::error::AppError;
use std::future::Future;

/// Fields parsed out of a media request.
struct MediaUpload {
    prompt: Option<String>,
    file: StagedFile,
}

pub async fn generate_text(
    State(state): State<AppState>,
    body: Result<Json<GenerateTextRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let result = async {
        // An unreadable body is the same as one without a message.
        let request = body.map(|Json(request)| request).unwrap_or_default();
        let prompt = request
            .prompt()
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Prompt is required")))?;

        let provider = state.text_provider.clone();
        run_detached(relay::relay_text(provider, prompt)).await
    }
    .await;

    respond(TEXT_ROUTE_LABEL, result)
}

pub async fn generate_from_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    generate_from_media(state, MediaRoute::Image, multipart).await
}

pub async fn generate_from_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    generate_from_media(state, MediaRoute::Document, multipart).await
}

pub async fn generate_from_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    generate_from_media(state, MediaRoute::Audio, multipart).await
}

async fn generate_from_media(
    state: AppState,
    route: MediaRoute,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let result = async {
        let multipart = multipart.map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Expected a multipart form: {}", e))
        })?;
        let MediaUpload { prompt, file } = receive_upload(&state.staging, route, multipart).await?;
        let prompt = route.resolve_prompt(prompt);

        tracing::info!(
            route = route.label(),
            bytes = file.len(),
            mime_type = %file.mime_type(),
            "Upload staged"
        );
        metrics::record_upload_bytes(route.label(), file.len());

        let provider = state.text_provider.clone();
        run_detached(relay::relay_media(provider, route, prompt, file)).await
    }
    .await;

    respond(route.label(), result)
}

/// Stream the route's file field to the staging area and collect the prompt.
///
/// Any early return drops the partially written [`StagedFile`], which removes
/// it from disk.
async fn receive_upload(
    staging: &StagingArea,
    route: MediaRoute,
    mut multipart: Multipart,
) -> Result<MediaUpload, AppError> {
    let mut prompt = None;
    let mut staged: Option<StagedFile> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == route.field_name() {
            if staged.is_some() {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Unexpected field: {}",
                    name
                )));
            }

            let mime_type = field
                .content_type()
                .unwrap_or(FALLBACK_MIME_TYPE)
                .to_string();
            let mut file = staging.acquire(mime_type).await?;
            while let Some(chunk) = field.chunk().await.map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
            })? {
                file.write_chunk(&chunk).await?;
            }
            file.seal().await?;
            staged = Some(file);
        } else if name == "prompt" {
            let text = field.text().await.map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Failed to read prompt: {}", e))
            })?;
            prompt = Some(text);
        } else if field.file_name().is_some() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Unexpected field: {}",
                name
            )));
        } else {
            tracing::trace!("Ignoring unknown multipart field: {}", name);
        }
    }

    let file = staged.ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("{} file is required", route.field_name()))
    })?;

    Ok(MediaUpload { prompt, file })
}

/// Run the pipeline on its own task so that a client disconnect cannot cancel
/// the provider call or the staged-file cleanup halfway through.
async fn run_detached<F>(pipeline: F) -> Result<String, AppError>
where
    F: Future<Output = Result<String, AppError>> + Send + 'static,
{
    tokio::spawn(pipeline).await.map_err(|e| {
        tracing::error!("Relay task failed: {}", e);
        AppError::InternalError(anyhow::anyhow!("Relay task failed: {}", e))
    })?
}

fn respond(route: &str, result: Result<String, AppError>) -> Result<Json<GenerateResponse>, AppError> {
    match result {
        Ok(output) => {
            metrics::record_request(route, 200);
            Ok(Json(GenerateResponse { output }))
        }
        Err(e) => {
            metrics::record_request(route, e.status_code().as_u16());
            if let AppError::BadRequest(_) = &e {
                tracing::warn!(route, "Rejected request: {}", e);
            }
            Err(e)
        }
    }
}
