//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{LinkService, StatsService};
use crate::domain::click_pipeline::ClickPipeline;
use crate::domain::repositories::{ClickRepository, LinkRepository};

/// Handler state. Cheap to clone: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub stats_service: Arc<StatsService<dyn ClickRepository>>,
    /// Used directly by the health check.
    pub link_repository: Arc<dyn LinkRepository>,
    pub pipeline: Arc<ClickPipeline>,
}

impl AppState {
    /// Wires the services over the given repositories and a running pipeline.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        click_repository: Arc<dyn ClickRepository>,
        pipeline: Arc<ClickPipeline>,
        base_url: impl Into<String>,
        code_length: usize,
    ) -> Self {
        let link_service = Arc::new(LinkService::new(
            link_repository.clone(),
            pipeline.clone(),
            base_url,
            code_length,
        ));
        let stats_service = Arc::new(StatsService::new(click_repository));

        Self {
            link_service,
            stats_service,
            link_repository,
            pipeline,
        }
    }
}
