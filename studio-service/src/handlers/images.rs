use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::images::{GenerateImageRequest, GenerateImageResponse};
use crate::startup::AppState;

#[tracing::instrument(skip(state, request))]
pub async fn generate_image(
    State(state): State<AppState>,
    Json(request): Json<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, AppError> {
    request.validate()?;

    let image = state
        .images
        .get_or_generate(&request.section_id, &request.prompt)
        .await?;

    Ok(Json(GenerateImageResponse {
        image_data: image.image_data,
        section_id: request.section_id,
    }))
}

#[tracing::instrument(skip(state))]
pub async fn get_generated_image(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let image = state.images.get(&section_id).await.ok_or_else(|| {
        AppError::NotFound(anyhow::anyhow!("Image not found. Generate it first."))
    })?;

    let bytes = image.decode().map_err(|e| {
        tracing::error!(section_id = %section_id, error = %e, "Cached image is not valid base64");
        AppError::InternalError(anyhow::anyhow!("Cached image is corrupt: {}", e))
    })?;

    Ok(([(header::CONTENT_TYPE, image.mime_type)], bytes))
}
