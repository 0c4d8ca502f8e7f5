//! Modcheck Config - Configuration management

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader};
pub use types::{LogConfig, ModcheckConfig, RefreshConfig, RulesConfig};
