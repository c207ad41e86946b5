//! KDL configuration parsing for the Hireline backend.
//!
//! This crate handles parsing of the server configuration (hireline.kdl)
//! and the environment variables that override it.

pub mod error;
pub mod system;

pub use error::{ConfigError, ConfigResult};
pub use system::{DatabaseConfig, LogFormat, ServerConfig, SystemConfig, UploadConfig};
