//! Plugin registries.
//!
//! A registry holds the plugins of one contract type `T` over one delimiter
//! type `D` and answers "which plugin(s) support this delimiter".
//!
//! - [`OrderAwarePluginRegistry`] ranks plugins by [`OrderKey`](crate::OrderKey)
//!   and is what registry wiring constructs.
//! - [`SimplePluginRegistry`] keeps plain registration order.
//!
//! Both share the query surface of [`PluginRegistry`]. Lookups work on an
//! immutable snapshot of the plugin list, so any number of threads can query a
//! registry while nobody holds a lock during `supports` calls.

mod order_aware;
mod simple;

pub use order_aware::OrderAwarePluginRegistry;
pub use simple::SimplePluginRegistry;

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::contract::DelimiterType;
use crate::error::{NoSupportingPlugin, RegistrationError};
use crate::plugin::Plugin;

/// Query and registration surface shared by every registry.
pub trait PluginRegistry<T, D>
where
    T: ?Sized + Plugin<D>,
    D: ?Sized,
{
    /// Adds a plugin.
    fn register(&self, plugin: Arc<T>) -> Result<(), RegistrationError>;

    /// All plugins in priority order, as a shared immutable snapshot.
    fn snapshot(&self) -> Arc<[Arc<T>]>;

    /// Full type name of the contract, used in error messages.
    fn contract_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    /// Full type name of the delimiter, used in error messages.
    fn delimiter_name(&self) -> &'static str {
        std::any::type_name::<D>()
    }

    /// All plugins in priority order, regardless of support.
    fn get_plugins(&self) -> Vec<Arc<T>> {
        self.snapshot().to_vec()
    }

    /// The highest priority plugin supporting `delimiter`, if any.
    fn find_plugin_for(&self, delimiter: &D) -> Option<Arc<T>> {
        self.snapshot()
            .iter()
            .find(|plugin| plugin.supports(delimiter))
            .cloned()
    }

    /// The highest priority plugin supporting `delimiter`.
    ///
    /// Several plugins claiming support is not an error: the first one in
    /// priority order wins, which is what makes override and fallback chains
    /// possible.
    fn get_plugin_for(&self, delimiter: &D) -> Result<Arc<T>, NoSupportingPlugin> {
        self.find_plugin_for(delimiter)
            .ok_or_else(|| NoSupportingPlugin::new(self.contract_name(), self.delimiter_name()))
    }

    /// Like [`get_plugin_for`](Self::get_plugin_for), reporting `message` on failure.
    fn get_required_plugin_for<M, F>(
        &self,
        delimiter: &D,
        message: F,
    ) -> Result<Arc<T>, NoSupportingPlugin>
    where
        M: Into<String>,
        F: FnOnce() -> M,
    {
        self.find_plugin_for(delimiter).ok_or_else(|| {
            NoSupportingPlugin::new(self.contract_name(), self.delimiter_name())
                .with_message(message())
        })
    }

    /// The highest priority plugin supporting `delimiter`, or `fallback()`.
    fn get_plugin_or_else<F>(&self, delimiter: &D, fallback: F) -> Arc<T>
    where
        F: FnOnce() -> Arc<T>,
    {
        self.find_plugin_for(delimiter).unwrap_or_else(fallback)
    }

    /// Every plugin supporting `delimiter`, in priority order.
    fn get_plugins_for(&self, delimiter: &D) -> Vec<Arc<T>> {
        self.snapshot()
            .iter()
            .filter(|plugin| plugin.supports(delimiter))
            .cloned()
            .collect()
    }

    /// Every plugin supporting `delimiter`, or `defaults` when none does.
    fn get_plugins_or(&self, delimiter: &D, defaults: Vec<Arc<T>>) -> Vec<Arc<T>> {
        let plugins = self.get_plugins_for(delimiter);
        if plugins.is_empty() {
            defaults
        } else {
            plugins
        }
    }

    /// Returns `true` if at least one plugin supports `delimiter`.
    fn has_plugin_for(&self, delimiter: &D) -> bool {
        self.snapshot()
            .iter()
            .any(|plugin| plugin.supports(delimiter))
    }

    /// Number of registered plugins.
    fn count_plugins(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns `true` if no plugin is registered.
    fn is_empty(&self) -> bool {
        self.count_plugins() == 0
    }

    /// Returns `true` if this exact plugin instance is registered.
    fn contains(&self, plugin: &Arc<T>) -> bool {
        self.snapshot()
            .iter()
            .any(|registered| std::ptr::addr_eq(Arc::as_ptr(registered), Arc::as_ptr(plugin)))
    }
}

/// Type-erased view of a registry, as stored in a
/// [`ComponentDirectory`](crate::ComponentDirectory).
///
/// Recover the typed registry with [`into_any`](Self::into_any) followed by
/// `Arc::downcast`.
pub trait ErasedRegistry: Any + Send + Sync {
    /// Full type name of the contract.
    fn contract_name(&self) -> &'static str;

    /// `TypeId` of the contract.
    fn contract_id(&self) -> TypeId;

    /// Delimiter type the registry is specialized to.
    fn delimiter(&self) -> DelimiterType;

    /// Number of registered plugins.
    fn plugin_count(&self) -> usize;

    /// Ends the registration phase.
    fn seal(&self);

    /// Returns `true` once [`seal`](Self::seal) has been called.
    fn is_sealed(&self) -> bool;

    /// Upcasts to `Any` for downcasting to the concrete registry type.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}
