//! Domain layer: entities, repository contracts, and the click pipeline.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Persistence trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_pipeline`] - Bounded queue, batch workers, and shutdown protocol
//!
//! # Click Processing Flow
//!
//! 1. HTTP handler resolves a code through [`crate::application::services::LinkService`]
//! 2. A [`click_event::ClickEvent`] is offered to the [`click_pipeline::ClickPipeline`]
//! 3. A batch worker accumulates it and flushes on size or timer
//! 4. The batch is written via [`repositories::ClickRepository::insert_clicks`]

pub mod click_event;
pub mod click_pipeline;
pub mod entities;
pub mod repositories;
