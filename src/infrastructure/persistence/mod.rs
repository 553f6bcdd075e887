//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries with bound parameters.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage and retrieval
//! - [`PgClickRepository`] - Batched click writes and click counts
//!
//! [`pool`] owns connection setup and the embedded migrations.

pub mod pg_click_repository;
pub mod pg_link_repository;
pub mod pool;

pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
