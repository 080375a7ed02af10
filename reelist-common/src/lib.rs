//! # Reelist Common Library
//!
//! Shared code for the reelist services:
//! - Configuration loading and validation
//! - Common error types

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
