//! Click statistics service.

use std::sync::Arc;

use crate::domain::repositories::ClickRepository;
use crate::error::AppError;
use serde_json::json;

/// Service for reading persisted click counts.
///
/// Counts only include clicks the pipeline has already flushed, so a fresh
/// redirect may take up to one flush interval to show up.
pub struct StatsService<R: ClickRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: ClickRepository + ?Sized> StatsService<R> {
    /// Creates a new statistics service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns the number of persisted clicks for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn total_clicks(&self, code: &str) -> Result<i64, AppError> {
        self.repository
            .total_clicks(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }
}
