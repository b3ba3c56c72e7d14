//! Dawr Core Library
//!
//! Typed lifecycle policy model, rule fingerprinting, configuration
//! diffing, and the settings layer for the Dawr reconciliation tool.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod settings;

pub use config::{Action, DawrConfig};
pub use error::{Error, Result};

/// Dawr version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default S3 region
pub const DEFAULT_REGION: &str = "us-east-1";

/// File extension of declaration documents
pub const DECLARATION_EXTENSION: &str = ".toml";
