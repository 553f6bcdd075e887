//! Core domain entities.
//!
//! - [`Link`] - A persisted short code to URL mapping
//! - [`NewLink`] - Input for creating a link

pub mod link;

pub use link::{Link, NewLink};
