//! Configuration for the Hinge runtime.
//!
//! Layered TOML and environment based configuration for logging and registry
//! wiring.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    HingeConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, RegistriesConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
