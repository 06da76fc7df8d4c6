//! HQL diagnostics and error handling
//!
//! This crate provides the error handling infrastructure for the HQL front end,
//! including error codes, source locations, and advisory diagnostics.

mod error;
mod error_code;
mod span;

pub use error::*;
pub use error_code::*;
pub use span::*;

/// Result type for HQL operations
pub type Result<T> = std::result::Result<T, HqlError>;
