use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::contact::{ContactRequest, ContactResponse};
use crate::models::ContactSubmission;
use crate::startup::AppState;

#[tracing::instrument(skip(state, request))]
pub async fn send_contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    request.validate()?;

    let receipt = state
        .mailer
        .relay(&request.name, &request.email, &request.message)
        .await?;

    tracing::info!(
        provider_id = ?receipt.provider_id,
        "Contact form relayed"
    );

    // The mail is already out; a lost record must not turn this into a failure.
    let submission = ContactSubmission::sent(request.name, request.email, request.message);
    if let Err(e) = state.store.insert_contact_submission(&submission).await {
        tracing::warn!(
            submission_id = %submission.id,
            error = %e,
            "Failed to record contact submission"
        );
    }

    Ok(Json(ContactResponse {
        success: true,
        message: "Thank you for your message! We'll get back to you soon.".to_string(),
    }))
}
