//! Configuration module for the Trellis runtime.
//!
//! Layered loading (defaults, files, environment) through `figment`, a serde
//! schema for site, query and logging settings, and validation.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LoggingConfig, QueryConfig, SiteConfig, SpanEventConfig,
    TrellisConfig,
};
pub use validation::validate_config;
