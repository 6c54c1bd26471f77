//! Core utilities for buildcfg
//!
//! This crate provides shared functionality used by the resolver and the CLI:
//!
//! - **Error handling**: errors with codes, context, recovery suggestions and exit codes
//! - **Configuration**: `.buildcfg.toml` loading with defaults
//! - **Validation**: fluent validator producing errors and warnings
//!
//! # Example
//!
//! ```rust,no_run
//! use buildcfg_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid .buildcfg.toml");
//! println!("document: {}", config.schema.general.document);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

/// `.buildcfg.toml` loading
pub mod config;
/// Error types and exit codes
pub mod error;
/// Fluent input validation
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

