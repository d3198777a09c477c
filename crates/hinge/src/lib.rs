//! # Hinge
//!
//! Extension-point plugin registries for Rust applications.
//!
//! ## Overview
//!
//! An application defines *extension points* as traits extending
//! [`Plugin<D>`](core::Plugin). Implementations say, for a *delimiter* value of
//! type `D`, whether they apply. The host never names implementations: it
//! asks a registry for the plugin(s) supporting the delimiter at hand.
//!
//! ```text
//! ┌───────────────┐  wire   ┌─────────────────────────────┐  get_plugin_for(&"csv")
//! │ contracts![…] │────────▶│ formatterRegistry           │──────────────────────▶ CsvFormatter
//! └───────────────┘         │  1. CsvFormatter   (order 1) │
//!                           │  2. JsonFormatter           │
//!                           └─────────────────────────────┘
//! ```
//!
//! - **Contracts**: traits declared with `#[plugin_contract]`
//! - **Registries**: ordered, thread-safe plugin lists per contract
//! - **Wiring**: one registry per contract, named `formatterRegistry` or by
//!   qualifier
//! - **Container**: configuration, contributions and lifecycle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hinge::prelude::*;
//!
//! #[plugin_contract]
//! pub trait Formatter: Plugin<String> {
//!     fn format(&self, rows: &[Vec<String>]) -> String;
//! }
//!
//! struct Csv;
//!
//! impl Plugin<String> for Csv {
//!     fn supports(&self, format: &String) -> bool {
//!         format == "csv"
//!     }
//! }
//!
//! impl Formatter for Csv { /* … */ }
//!
//! #[register_plugin(Formatter, order = 1)]
//! fn csv() -> Csv {
//!     Csv
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut container = PluginContainer::builder()
//!         .contracts(contracts![dyn Formatter])
//!         .build()?;
//!     container.start()?;
//!
//!     let formatters = container.registry::<dyn Formatter>().unwrap();
//!     let csv = formatters.get_plugin_for(&"csv".to_string())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `macros`: `#[plugin_contract]` and `#[register_plugin]` (default)
//! - `toml-config`: `hinge.toml` configuration files (default)
//! - `json-log`: JSON log output

pub use hinge_core as core;
pub use hinge_runtime as runtime;

#[cfg(feature = "macros")]
pub use hinge_macros::{plugin_contract, register_plugin};

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use hinge::prelude::*;
/// ```
pub mod prelude {
    // Container - main entry point
    pub use hinge_runtime::{ContainerState, HingeConfig, PluginContainer};

    // Contracts and wiring
    pub use hinge_core::contracts;
    pub use hinge_core::{ComponentDirectory, ContractType, PluginContract, RegistryWiring};

    // Plugins and registries
    pub use hinge_core::{
        NoSupportingPlugin, OrderAwarePluginRegistry, OrderKey, Plugin, PluginRegistry,
    };

    #[cfg(feature = "macros")]
    pub use hinge_macros::{plugin_contract, register_plugin};
}
