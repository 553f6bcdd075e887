//! Application layer services implementing business logic.
//!
//! Services consume repository traits and the click pipeline and expose a
//! small API to the HTTP handlers.
//!
//! - [`services::link_service::LinkService`] - Short link creation and resolution
//! - [`services::stats_service::StatsService`] - Click counts

pub mod services;
