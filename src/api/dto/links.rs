//! DTOs for link creation and link statistics.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// The original URL; scheme and host are checked by the link service.
    #[validate(length(min = 1, max = 8192, message = "URL must be 1 to 8192 characters"))]
    pub url: String,
}

/// Newly created short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLinkResponse {
    pub code: String,
    pub short_url: String,
}

/// Persisted click count for a short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkStatsResponse {
    pub code: String,
    pub total_clicks: i64,
}
