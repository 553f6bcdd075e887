//! HTTP middleware for request processing.
//!
//! Provides request tracing.

pub mod tracing;
