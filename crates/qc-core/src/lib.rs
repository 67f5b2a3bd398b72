//! # qc-core
//!
//! Core types shared by the query-composer crates.
//!
//! This crate provides the foundational building blocks used across the other crates:
//! - Configuration-time error types
//! - Result type aliases
//! - Sort direction
//! - Composer defaults loaded from the environment
//! - Pagination parameters

pub mod error;
pub mod result;
pub mod types;
pub mod pagination;
pub mod config;

pub use error::*;
pub use result::*;
pub use types::*;
pub use pagination::*;
pub use config::ComposerConfig;
