//! Handler for link creation.

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, CreateLinkResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a URL.
///
/// # Endpoint
///
/// `POST /links`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/page" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "code": "aZ3k9Qx", "short_url": "http://localhost:8080/aZ3k9Qx" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for malformed JSON or an invalid URL.
/// Returns 409 Conflict if no free code was found.
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let code = state.link_service.create_short_link(&payload.url).await?;
    let short_url = state.link_service.short_url(&code);

    tracing::info!(code = %code, "short link created");

    Ok((StatusCode::CREATED, Json(CreateLinkResponse { code, short_url })))
}
