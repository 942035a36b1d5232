//! Adrelay Core Library
//!
//! This crate provides the pieces shared by every adrelay crate:
//! configuration management and error handling.

pub mod config;
pub mod error;

pub use error::{Error, Result};

/// Adrelay version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
