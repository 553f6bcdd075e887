//! Repository trait for click persistence and counting.

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface consumed by the click pipeline and the stats service.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Writes a batch of click events.
    ///
    /// An empty batch is a no-op. A batch is applied as a single statement, so
    /// it is either written entirely or not at all.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert_clicks(&self, batch: &[ClickEvent]) -> Result<(), AppError>;

    /// Counts persisted clicks for a short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(count))` if the link exists (count may be zero)
    /// - `Ok(None)` if no link has this code
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn total_clicks(&self, code: &str) -> Result<Option<i64>, AppError>;
}
