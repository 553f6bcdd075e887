//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse, PipelineCheck};
use crate::domain::click_pipeline::PipelineState;
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: Database unreachable or click pipeline not running
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok" },
///     "click_pipeline": {
///       "status": "ok",
///       "state": "running",
///       "queued": 3,
///       "capacity": 1024
///     }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;
    let pipeline_check = check_click_pipeline(&state);

    let all_healthy = db_check.status == "ok" && pipeline_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            click_pipeline: pipeline_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.link_repository.ping().await {
        Ok(()) => CheckStatus {
            status: "ok".to_string(),
            message: None,
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            message: Some(format!("Database error: {}", e)),
        },
    }
}

/// Only a running pipeline accepts clicks.
fn check_click_pipeline(state: &AppState) -> PipelineCheck {
    let pipeline_state = state.pipeline.state();

    PipelineCheck {
        status: if pipeline_state == PipelineState::Running {
            "ok"
        } else {
            "error"
        }
        .to_string(),
        state: pipeline_state.as_str().to_string(),
        queued: state.pipeline.queued(),
        capacity: state.pipeline.capacity(),
    }
}
