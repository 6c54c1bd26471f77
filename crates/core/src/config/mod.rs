//! Configuration loading and schema definitions
//!
//! Tool configuration for `buildcfg`, read from `.buildcfg.toml`.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
