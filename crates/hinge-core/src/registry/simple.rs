use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use super::PluginRegistry;
use crate::error::RegistrationError;
use crate::plugin::Plugin;

/// A registry that keeps plugins in plain registration order.
///
/// Plugin-declared orders are ignored. Use
/// [`OrderAwarePluginRegistry`](super::OrderAwarePluginRegistry) when ranking
/// matters.
pub struct SimplePluginRegistry<T: ?Sized, D: ?Sized> {
    plugins: RwLock<Arc<[Arc<T>]>>,
    _delimiter: PhantomData<fn(&D)>,
}

impl<T: ?Sized, D: ?Sized> SimplePluginRegistry<T, D> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(Arc::from(Vec::new())),
            _delimiter: PhantomData,
        }
    }

    /// Creates a registry holding `plugins` in iteration order.
    pub fn with_plugins(plugins: impl IntoIterator<Item = Arc<T>>) -> Self {
        Self {
            plugins: RwLock::new(plugins.into_iter().collect()),
            _delimiter: PhantomData,
        }
    }
}

impl<T, D> PluginRegistry<T, D> for SimplePluginRegistry<T, D>
where
    T: ?Sized + Plugin<D>,
    D: ?Sized,
{
    fn register(&self, plugin: Arc<T>) -> Result<(), RegistrationError> {
        let mut plugins = self.plugins.write();
        *plugins = plugins.iter().cloned().chain(Some(plugin)).collect();
        Ok(())
    }

    fn snapshot(&self) -> Arc<[Arc<T>]> {
        Arc::clone(&self.plugins.read())
    }
}

impl<T: ?Sized, D: ?Sized> Default for SimplePluginRegistry<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, D: ?Sized> fmt::Debug for SimplePluginRegistry<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplePluginRegistry")
            .field("contract", &std::any::type_name::<T>())
            .field("plugins", &self.plugins.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::fixtures::{Fixed, Formatter, labels};

    #[test]
    fn test_registration_order_ignores_declared_order() {
        let registry = SimplePluginRegistry::<dyn Formatter, String>::new();
        registry.register(Fixed::new("a", &["csv"])).unwrap();
        registry.register(Fixed::declaring("b", &["csv"], -100)).unwrap();
        registry.register(Fixed::new("c", &["json"])).unwrap();

        assert_eq!(labels(&registry.get_plugins()), ["a", "b", "c"]);
        assert_eq!(
            labels(&registry.get_plugins_for(&"csv".to_string())),
            ["a", "b"]
        );
        assert_eq!(
            registry.get_plugin_for(&"json".to_string()).unwrap().label(),
            "c"
        );
    }
}
