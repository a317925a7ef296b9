//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging (tracing)

pub mod config;
pub mod logging;
