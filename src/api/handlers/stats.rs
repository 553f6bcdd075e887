//! Handler for link statistics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::links::LinkStatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the persisted click count for a short link.
///
/// # Endpoint
///
/// `GET /links/{code}/stats`
///
/// Clicks still waiting in the pipeline are not counted yet.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LinkStatsResponse>, AppError> {
    let total_clicks = state.stats_service.total_clicks(&code).await?;

    Ok(Json(LinkStatsResponse { code, total_clicks }))
}
