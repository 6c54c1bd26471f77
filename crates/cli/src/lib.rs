//! CLI utilities for buildcfg tools
//!
//! Provides shared CLI functionality:
//! - Status messages with optional color
//! - Validation issue reports
//! - Aligned key/value listings

#![warn(missing_docs)]

/// Terminal output helpers
pub mod output;
