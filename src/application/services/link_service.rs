//! Link creation and resolution service.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::click_event::{ClickEvent, ClickMeta};
use crate::domain::click_pipeline::ClickPipeline;
use crate::domain::entities::NewLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::generate_code;
use crate::utils::url_validator::validate_url;

/// Number of random codes tried before a collision is reported.
pub const MAX_CODE_ATTEMPTS: usize = 8;

/// Service for creating short links and resolving them to their targets.
///
/// Resolution records a click through the [`ClickPipeline`] but never waits
/// for it to be persisted.
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    pipeline: Arc<ClickPipeline>,
    base_url: String,
    code_length: usize,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    ///
    /// `base_url` is the public origin short URLs are built from; a trailing
    /// slash is ignored.
    pub fn new(
        link_repository: Arc<L>,
        pipeline: Arc<ClickPipeline>,
        base_url: impl Into<String>,
        code_length: usize,
    ) -> Self {
        Self {
            link_repository,
            pipeline,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            code_length,
        }
    }

    /// Validates `original_url` and stores it under a fresh random code.
    ///
    /// # Code Generation
    ///
    /// Each attempt draws an independent code of `code_length` base62 symbols.
    /// A uniqueness conflict from the repository triggers another attempt, up
    /// to [`MAX_CODE_ATTEMPTS`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is not an absolute HTTP(S) URL.
    /// Returns [`AppError::Conflict`] if every attempt collided.
    /// Returns [`AppError::Internal`] on repository or random source failure.
    pub async fn create_short_link(&self, original_url: &str) -> Result<String, AppError> {
        let original_url = original_url.trim();
        validate_url(original_url)?;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code(self.code_length)?;
            let new_link = NewLink {
                code,
                original_url: original_url.to_string(),
            };

            match self.link_repository.create(new_link).await {
                Ok(link) => return Ok(link.code),
                Err(e) if e.is_conflict() => {
                    debug!(attempt, "short code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::conflict(
            "Failed to generate unique code",
            json!({ "attempts": MAX_CODE_ATTEMPTS }),
        ))
    }

    /// Looks up the target URL for `code` and records a click.
    ///
    /// The click is offered to the pipeline without waiting; if the queue is
    /// full or shutting down the click is dropped and the redirect still succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    /// Returns [`AppError::Internal`] on repository errors.
    pub async fn resolve(&self, code: &str, meta: ClickMeta) -> Result<String, AppError> {
        let link = self
            .link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        if !self.pipeline.enqueue(ClickEvent::now(link.id, meta)) {
            debug!(code, link_id = link.id, "click dropped");
        }

        Ok(link.original_url)
    }

    /// Builds the public short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}
