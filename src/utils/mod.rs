//! Utility functions shared by the service layer.
//!
//! - [`code_generator`] - Random base62 short-code generation
//! - [`url_validator`] - Target URL validation

pub mod code_generator;
pub mod url_validator;
