//! Hinge Runtime - Configuration, logging and the plugin container.
//!
//! This crate provides:
//! - Layered configuration (`hinge.toml`, `HINGE_*` environment variables)
//! - Logging setup over `tracing-subscriber`
//! - The [`PluginContainer`] that wires registries and installs plugins
//!
//! ```ignore
//! use hinge_runtime::PluginContainer;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut container = PluginContainer::builder()
//!         .contracts(contracts![dyn Formatter, dyn Validator])
//!         .with_logging()
//!         .build()?;
//!     container.start()?;
//!
//!     let formatters = container.registry::<dyn Formatter>().unwrap();
//!     let csv = formatters.get_plugin_for(&"csv".to_string())?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod container;
pub mod error;
pub mod logging;

pub use config::{ConfigError, ConfigLoader, ConfigResult, HingeConfig, RegistriesConfig};
pub use container::{ContainerBuilder, ContainerState, PluginContainer};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for applications built on the runtime.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
