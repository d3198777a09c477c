use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::{ErasedRegistry, PluginRegistry};
use crate::contract::DelimiterType;
use crate::error::RegistrationError;
use crate::order::OrderKey;
use crate::plugin::Plugin;

/// A registry that ranks its plugins deterministically.
///
/// # Ordering
///
/// 1. Plugins with an [`OrderKey::Ordered`] key come first, ascending by key
///    (lower value, higher priority). Equal keys keep registration order.
/// 2. Unordered plugins follow, in registration order.
///
/// The key of a plugin is the order passed to
/// [`register_ordered`](Self::register_ordered), or else the one returned by
/// [`Plugin::order`], or else unordered.
///
/// # Concurrency
///
/// The ranked list is rebuilt on every registration and published as an
/// `Arc<[Arc<T>]>` snapshot. Queries clone the snapshot under a brief read
/// guard and evaluate plugins without holding any lock.
pub struct OrderAwarePluginRegistry<T: ?Sized, D: ?Sized> {
    state: RwLock<RegistryState<T>>,
    // fn(&D) keeps the registry Send + Sync whatever D is.
    _delimiter: PhantomData<fn(&D)>,
}

struct RankedPlugin<T: ?Sized> {
    plugin: Arc<T>,
    key: OrderKey,
}

struct RegistryState<T: ?Sized> {
    /// Sorted by key; equal keys in registration order.
    ranked: Vec<RankedPlugin<T>>,
    snapshot: Arc<[Arc<T>]>,
    sealed: bool,
}

impl<T: ?Sized, D: ?Sized> OrderAwarePluginRegistry<T, D> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                ranked: Vec::new(),
                snapshot: Arc::from(Vec::new()),
                sealed: false,
            }),
            _delimiter: PhantomData,
        }
    }

    /// Ends the registration phase. Further registrations fail with
    /// [`RegistrationError::Sealed`].
    pub fn seal(&self) {
        self.state.write().sealed = true;
    }

    /// Returns `true` once the registry has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.state.read().sealed
    }

    /// The order key of every plugin, in ranking order.
    pub fn order_keys(&self) -> Vec<OrderKey> {
        self.state.read().ranked.iter().map(|r| r.key).collect()
    }
}

impl<T, D> OrderAwarePluginRegistry<T, D>
where
    T: ?Sized + Plugin<D>,
    D: ?Sized,
{
    /// Creates a registry holding `plugins`, registered in iteration order.
    pub fn with_plugins(plugins: impl IntoIterator<Item = Arc<T>>) -> Self {
        let registry = Self::new();
        {
            let mut state = registry.state.write();
            for plugin in plugins {
                let key = OrderKey::from(plugin.order());
                state.insert(plugin, key);
            }
            state.publish();
        }
        registry
    }

    /// Adds a plugin with an explicit order, overriding [`Plugin::order`].
    pub fn register_ordered(&self, plugin: Arc<T>, order: i32) -> Result<(), RegistrationError> {
        self.register_with_key(plugin, OrderKey::Ordered(order))
    }

    /// Adds a plugin under `key`.
    pub fn register_with_key(&self, plugin: Arc<T>, key: OrderKey) -> Result<(), RegistrationError> {
        let mut state = self.state.write();
        if state.sealed {
            return Err(RegistrationError::Sealed {
                contract: std::any::type_name::<T>(),
            });
        }
        state.insert(plugin, key);
        state.publish();
        trace!(
            contract = std::any::type_name::<T>(),
            order = %key,
            plugins = state.ranked.len(),
            "Plugin registered"
        );
        Ok(())
    }
}

impl<T: ?Sized> RegistryState<T> {
    fn insert(&mut self, plugin: Arc<T>, key: OrderKey) {
        // Insert after every entry with an equal key to keep registration order.
        let at = self.ranked.partition_point(|ranked| ranked.key <= key);
        self.ranked.insert(at, RankedPlugin { plugin, key });
    }

    fn publish(&mut self) {
        self.snapshot = self
            .ranked
            .iter()
            .map(|ranked| Arc::clone(&ranked.plugin))
            .collect();
    }
}

impl<T, D> PluginRegistry<T, D> for OrderAwarePluginRegistry<T, D>
where
    T: ?Sized + Plugin<D>,
    D: ?Sized,
{
    fn register(&self, plugin: Arc<T>) -> Result<(), RegistrationError> {
        let key = OrderKey::from(plugin.order());
        self.register_with_key(plugin, key)
    }

    fn snapshot(&self) -> Arc<[Arc<T>]> {
        Arc::clone(&self.state.read().snapshot)
    }
}

impl<T, D> ErasedRegistry for OrderAwarePluginRegistry<T, D>
where
    T: ?Sized + Plugin<D> + 'static,
    D: ?Sized + 'static,
{
    fn contract_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn contract_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn delimiter(&self) -> DelimiterType {
        DelimiterType::of::<D>()
    }

    fn plugin_count(&self) -> usize {
        self.state.read().ranked.len()
    }

    fn seal(&self) {
        OrderAwarePluginRegistry::seal(self);
    }

    fn is_sealed(&self) -> bool {
        OrderAwarePluginRegistry::is_sealed(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T: ?Sized, D: ?Sized> Default for OrderAwarePluginRegistry<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, D: ?Sized> fmt::Debug for OrderAwarePluginRegistry<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("OrderAwarePluginRegistry")
            .field("contract", &std::any::type_name::<T>())
            .field("delimiter", &std::any::type_name::<D>())
            .field("plugins", &state.ranked.len())
            .field("sealed", &state.sealed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::fixtures::{Fixed, Formatter, labels};

    type Registry = OrderAwarePluginRegistry<dyn Formatter, String>;

    fn csv() -> String {
        "csv".to_string()
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.get_plugins().is_empty());
        assert!(registry.get_plugins_for(&csv()).is_empty());
    }

    #[test]
    fn test_ordered_plugins_rank_ascending() {
        let registry = Registry::new();
        registry.register_ordered(Fixed::new("late", &["csv"]), 20).unwrap();
        registry.register_ordered(Fixed::new("early", &["csv"]), -3).unwrap();
        registry.register_ordered(Fixed::new("middle", &["csv"]), 5).unwrap();

        assert_eq!(
            labels(&registry.get_plugins_for(&csv())),
            ["early", "middle", "late"]
        );
        assert_eq!(
            registry.order_keys(),
            [OrderKey::Ordered(-3), OrderKey::Ordered(5), OrderKey::Ordered(20)]
        );
    }

    #[test]
    fn test_unordered_follow_ordered_in_registration_order() {
        let registry = Registry::new();
        registry.register(Fixed::new("u1", &["csv"])).unwrap();
        registry.register_ordered(Fixed::new("o100", &["csv"]), 100).unwrap();
        registry.register(Fixed::new("u2", &["csv"])).unwrap();
        registry.register_ordered(Fixed::new("o1", &["csv"]), 1).unwrap();
        registry.register(Fixed::new("u3", &["csv"])).unwrap();

        assert_eq!(
            labels(&registry.get_plugins()),
            ["o1", "o100", "u1", "u2", "u3"]
        );
    }

    #[test]
    fn test_equal_keys_keep_registration_order() {
        let registry = Registry::new();
        registry.register_ordered(Fixed::new("first", &["csv"]), 7).unwrap();
        registry.register_ordered(Fixed::new("second", &["csv"]), 7).unwrap();
        registry.register_ordered(Fixed::new("zero", &["csv"]), 0).unwrap();
        registry.register_ordered(Fixed::new("third", &["csv"]), 7).unwrap();

        assert_eq!(
            labels(&registry.get_plugins()),
            ["zero", "first", "second", "third"]
        );
    }

    #[test]
    fn test_declared_order_and_explicit_override() {
        let registry = Registry::new();
        registry.register(Fixed::declaring("declared-9", &["csv"], 9)).unwrap();
        registry.register(Fixed::new("plain", &["csv"])).unwrap();
        // Explicit order wins over the declared 50.
        registry
            .register_ordered(Fixed::declaring("override-1", &["csv"], 50), 1)
            .unwrap();

        assert_eq!(
            labels(&registry.get_plugins()),
            ["override-1", "declared-9", "plain"]
        );
    }

    #[test]
    fn test_get_plugin_for_selects_highest_priority() {
        let registry = Registry::new();
        registry.register(Fixed::new("fallback", &["csv", "tsv"])).unwrap();
        registry.register_ordered(Fixed::new("special", &["csv"]), 10).unwrap();

        let csv_plugin = registry.get_plugin_for(&csv()).unwrap();
        assert_eq!(csv_plugin.label(), "special");

        let tsv_plugin = registry.get_plugin_for(&"tsv".to_string()).unwrap();
        assert_eq!(tsv_plugin.label(), "fallback");
    }

    #[test]
    fn test_get_plugin_for_without_match_fails() {
        let registry = Registry::new();
        registry.register(Fixed::new("json", &["json"])).unwrap();

        let err = registry.get_plugin_for(&csv()).err().unwrap();
        assert_eq!(err.contract, std::any::type_name::<dyn Formatter>());
        assert_eq!(err.delimiter, std::any::type_name::<String>());
        assert!(registry.find_plugin_for(&csv()).is_none());
        assert!(!registry.has_plugin_for(&csv()));
    }

    #[test]
    fn test_required_plugin_reports_message() {
        let registry = Registry::new();
        let err = registry
            .get_required_plugin_for(&csv(), || "no csv formatter installed")
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "no csv formatter installed");
    }

    #[test]
    fn test_fallbacks() {
        let registry = Registry::new();
        registry.register(Fixed::new("json", &["json"])).unwrap();

        let fallback = registry.get_plugin_or_else(&csv(), || Fixed::new("default", &[]));
        assert_eq!(fallback.label(), "default");

        let defaults = registry.get_plugins_or(&csv(), vec![Fixed::new("d1", &[])]);
        assert_eq!(labels(&defaults), ["d1"]);

        let found = registry.get_plugins_or(&"json".to_string(), vec![Fixed::new("d1", &[])]);
        assert_eq!(labels(&found), ["json"]);
    }

    #[test]
    fn test_contains_compares_instances() {
        let registry = Registry::new();
        let registered = Fixed::new("a", &["csv"]);
        registry.register(Arc::clone(&registered)).unwrap();

        assert!(registry.contains(&registered));
        assert!(!registry.contains(&Fixed::new("a", &["csv"])));
        assert_eq!(registry.count_plugins(), 1);
    }

    #[test]
    fn test_with_plugins_uses_declared_orders() {
        let registry = Registry::with_plugins([
            Fixed::new("u", &["csv"]),
            Fixed::declaring("o", &["csv"], 3),
        ]);
        assert_eq!(labels(&registry.get_plugins()), ["o", "u"]);
    }

    #[test]
    fn test_sealed_registry_rejects_registration() {
        let registry = Registry::new();
        registry.register(Fixed::new("a", &["csv"])).unwrap();
        registry.seal();

        assert!(registry.is_sealed());
        let err = registry.register(Fixed::new("b", &["csv"])).unwrap_err();
        assert!(matches!(err, RegistrationError::Sealed { .. }));
        assert_eq!(registry.count_plugins(), 1);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_registration() {
        let registry = Registry::new();
        registry.register(Fixed::new("a", &["csv"])).unwrap();
        let before = registry.snapshot();
        registry.register(Fixed::new("b", &["csv"])).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn test_concurrent_lookups() {
        let registry = Registry::new();
        registry.register(Fixed::new("any", &["csv", "json"])).unwrap();
        registry.register_ordered(Fixed::new("json", &["json"]), 0).unwrap();
        registry.seal();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..1000 {
                        assert_eq!(registry.get_plugin_for(&csv()).unwrap().label(), "any");
                        assert_eq!(
                            registry.get_plugin_for(&"json".to_string()).unwrap().label(),
                            "json"
                        );
                    }
                });
            }
        });
    }

    #[test]
    fn test_erased_view() {
        let registry: Arc<Registry> = Arc::new(Registry::new());
        registry.register(Fixed::new("a", &["csv"])).unwrap();

        let erased: Arc<dyn ErasedRegistry> = registry.clone();
        assert_eq!(erased.plugin_count(), 1);
        assert_eq!(erased.contract_id(), TypeId::of::<dyn Formatter>());
        assert_eq!(erased.delimiter(), DelimiterType::of::<String>());

        erased.seal();
        assert!(registry.is_sealed());

        let typed = erased.into_any().downcast::<Registry>().unwrap();
        assert!(Arc::ptr_eq(&typed, &registry));
    }
}
