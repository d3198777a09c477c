//! The plugin contract.
//!
//! Every extension point in Hinge is a trait that extends [`Plugin<D>`], where
//! `D` is the *delimiter*: the context value a plugin is asked to evaluate.
//!
//! ```rust,ignore
//! use hinge::prelude::*;
//!
//! #[plugin_contract]
//! pub trait Formatter: Plugin<String> {
//!     fn format(&self, input: &str) -> String;
//! }
//!
//! struct Csv;
//!
//! impl Plugin<String> for Csv {
//!     fn supports(&self, format: &String) -> bool {
//!         format == "csv"
//!     }
//! }
//! ```

/// Capability implemented by every plugin.
///
/// A plugin declares, per delimiter value, whether it applies. Registries use
/// [`supports`](Plugin::supports) to select plugins and
/// [`order`](Plugin::order) to rank them.
pub trait Plugin<D: ?Sized>: Send + Sync {
    /// Returns `true` if this plugin applies to `delimiter`.
    fn supports(&self, delimiter: &D) -> bool;

    /// Priority declared by the plugin itself.
    ///
    /// Lower values win. `None` leaves the plugin unordered: it is placed after
    /// every ordered plugin and keeps its registration position. An explicit
    /// order given at registration time takes precedence over this value.
    fn order(&self) -> Option<i32> {
        None
    }
}
