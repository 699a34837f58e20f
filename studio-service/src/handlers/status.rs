use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::status::CreateStatusCheckRequest;
use crate::models::StatusCheck;
use crate::services::STATUS_LIST_LIMIT;
use crate::startup::AppState;

#[tracing::instrument(skip(state, request))]
pub async fn create_status_check(
    State(state): State<AppState>,
    Json(request): Json<CreateStatusCheckRequest>,
) -> Result<Json<StatusCheck>, AppError> {
    request.validate()?;

    let check = StatusCheck::new(request.client_name);
    state.store.insert_status_check(&check).await?;

    tracing::info!(status_check_id = %check.id, "Status check recorded");

    Ok(Json(check))
}

#[tracing::instrument(skip(state))]
pub async fn list_status_checks(
    State(state): State<AppState>,
) -> Result<Json<Vec<StatusCheck>>, AppError> {
    let checks = state.store.list_status_checks(STATUS_LIST_LIMIT).await?;
    Ok(Json(checks))
}
