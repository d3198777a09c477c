//! # Hinge Core
//!
//! Extension-point registries for plugin-based applications.
//!
//! An *extension point* is a trait extending [`Plugin<D>`]. Each plugin says,
//! for a given *delimiter* value of type `D`, whether it applies. Hosts ask a
//! registry for the plugin(s) supporting a delimiter instead of knowing the
//! implementations.
//!
//! ## Building Blocks
//!
//! - **Plugins**: the [`Plugin`] capability and self-declared [`OrderKey`]s
//! - **Registries**: [`PluginRegistry`] queries over
//!   [`OrderAwarePluginRegistry`] and [`SimplePluginRegistry`]
//! - **Contracts**: [`PluginContract`] / [`ContractType`] metadata and the
//!   [`TypeResolver`] that binds each contract to its delimiter type
//! - **Wiring**: [`RegistryWiring`] publishing one registry per contract into a
//!   [`ComponentDirectory`]
//! - **Contributions**: link-time plugins collected in [`PLUGIN_CONTRIBUTIONS`]
//!
//! ## Wiring Flow
//!
//! ```text
//! contracts![dyn Formatter, dyn Validator]
//!        │
//!        ▼
//! ┌──────────────┐   plan    ┌────────────┐  commit  ┌────────────────────┐
//! │ TypeResolver │──────────▶│ WiringPlan │─────────▶│ ComponentDirectory │
//! └──────────────┘           └────────────┘          └────────────────────┘
//!                                                      formatterRegistry
//!                                                      validatorRegistry
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use hinge_core::prelude::*;
//!
//! pub trait Formatter: Plugin<String> {
//!     fn format(&self, input: &str) -> String;
//! }
//!
//! impl PluginContract for dyn Formatter {
//!     type Delimiter = String;
//!     const SIMPLE_NAME: &'static str = "Formatter";
//! }
//!
//! let directory = RegistryWiring::new(contracts![dyn Formatter])
//!     .wire(ComponentDirectory::new())?;
//!
//! let formatters = directory.get::<dyn Formatter>("formatterRegistry").unwrap();
//! formatters.register(std::sync::Arc::new(Csv))?;
//! let csv = formatters.get_plugin_for(&"csv".to_string())?;
//! ```

pub mod contract;
pub mod contribution;
pub mod directory;
pub mod error;
pub mod order;
pub mod plugin;
pub mod registry;
pub mod resolver;
pub mod wiring;

pub use linkme;

// ─── Contracts ───
pub use contract::{ContractType, DelimiterType, PluginContract, RegistryFactory, TypeBinding};
pub use resolver::{RegistryShape, TypeResolver};

// ─── Plugins & Registries ───
pub use order::OrderKey;
pub use plugin::Plugin;
pub use registry::{ErasedRegistry, OrderAwarePluginRegistry, PluginRegistry, SimplePluginRegistry};

// ─── Wiring ───
pub use directory::{ComponentDirectory, RegistryEntry, RegistryOf, RegistrySummary};
pub use wiring::{
    RegistryDefinition, RegistryDescriptor, RegistryWiring, WiringPlan, default_registry_name,
    registry_name, uncapitalize,
};

// ─── Contributions ───
pub use contribution::{PLUGIN_CONTRIBUTIONS, PluginContribution, contributions};

// ─── Errors ───
pub use error::{
    ContributionError, NoSupportingPlugin, RegistrationError, UnresolvableReason, WiringError,
    WiringResult,
};

/// Commonly used items.
pub mod prelude {
    pub use crate::contracts;
    pub use crate::{
        ComponentDirectory, ContractType, NoSupportingPlugin, OrderAwarePluginRegistry, OrderKey,
        Plugin, PluginContract, PluginRegistry, RegistryWiring, WiringError,
    };
}
