//! Comet extension hosting
//!
//! Configuration, the extension itself, and the axum host adapter.

pub mod config;
pub mod extension;

pub use config::{CometConfig, ConfigError};
pub use extension::{CometExtension, CometRequest, CometResponse, EXTENSION_NAME};
