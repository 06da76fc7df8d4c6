//! Common test utilities for semantic analysis
//!
//! This module provides shared testing infrastructure including:
//! - A domain metamodel covering every kind of attribute
//! - Helpers that parse and interpret query text

#![allow(dead_code)]

pub mod domain;
pub mod interpret;

pub use domain::*;
pub use interpret::*;
