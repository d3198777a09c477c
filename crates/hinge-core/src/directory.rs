//! The component directory.
//!
//! Holds every wired registry under its lookup name, the equivalent of the
//! component/bean directory registry wiring publishes into. Registries are
//! stored type-erased and recovered by contract type on lookup.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::contract::{DelimiterType, PluginContract};
use crate::error::{ContributionError, WiringError};
use crate::order::OrderKey;
use crate::plugin::Plugin;
use crate::registry::{ErasedRegistry, OrderAwarePluginRegistry};
use crate::wiring::RegistryDescriptor;

/// The typed registry of contract `C`.
pub type RegistryOf<C> = OrderAwarePluginRegistry<C, <C as PluginContract>::Delimiter>;

/// A named registry stored in a [`ComponentDirectory`].
#[derive(Clone)]
pub struct RegistryEntry {
    descriptor: RegistryDescriptor,
    registry: Arc<dyn ErasedRegistry>,
}

impl RegistryEntry {
    pub fn descriptor(&self) -> &RegistryDescriptor {
        &self.descriptor
    }

    pub fn registry(&self) -> &Arc<dyn ErasedRegistry> {
        &self.registry
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("descriptor", &self.descriptor)
            .field("plugins", &self.registry.plugin_count())
            .field("sealed", &self.registry.is_sealed())
            .finish()
    }
}

/// Serializable overview of one registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrySummary {
    pub name: String,
    pub contract: String,
    pub delimiter: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    pub plugins: usize,
    pub sealed: bool,
}

/// Name-indexed store of wired registries.
#[derive(Debug, Default)]
pub struct ComponentDirectory {
    entries: Vec<RegistryEntry>,
    by_name: HashMap<String, usize>,
}

impl ComponentDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `registry` under the name of `descriptor`.
    ///
    /// Fails with [`WiringError::DuplicateRegistryName`] if the name is taken.
    pub fn register(
        &mut self,
        descriptor: RegistryDescriptor,
        registry: Arc<dyn ErasedRegistry>,
    ) -> Result<(), WiringError> {
        if let Some(existing) = self.entry(descriptor.name()) {
            return Err(WiringError::DuplicateRegistryName {
                name: descriptor.name().to_string(),
                existing: existing.descriptor.contract_name().to_string(),
                contract: descriptor.contract_name().to_string(),
            });
        }
        self.by_name
            .insert(descriptor.name().to_string(), self.entries.len());
        self.entries.push(RegistryEntry {
            descriptor,
            registry,
        });
        Ok(())
    }

    /// Returns `true` if a registry is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registry names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.descriptor.name())
    }

    /// The entry registered under `name`.
    pub fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.by_name.get(name).map(|&index| &self.entries[index])
    }

    /// All entries in registration order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Descriptor of the registry registered under `name`.
    pub fn descriptor(&self, name: &str) -> Option<&RegistryDescriptor> {
        self.entry(name).map(RegistryEntry::descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The registry named `name`, if it belongs to contract `C`.
    pub fn get<C>(&self, name: &str) -> Option<Arc<RegistryOf<C>>>
    where
        C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
    {
        self.entry(name).and_then(downcast::<C>)
    }

    /// The registry of contract `C` wired under alias `qualifier`.
    pub fn qualified<C>(&self, qualifier: &str) -> Option<Arc<RegistryOf<C>>>
    where
        C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
    {
        self.entries
            .iter()
            .filter(|entry| entry.descriptor.qualifier() == Some(qualifier))
            .find_map(downcast::<C>)
    }

    /// The first registry wired for contract `C`.
    pub fn registry_for<C>(&self) -> Option<Arc<RegistryOf<C>>>
    where
        C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
    {
        self.entries.iter().find_map(downcast::<C>)
    }

    /// Every registry wired for contract `C`, in registration order.
    pub fn registries_for<C>(&self) -> Vec<Arc<RegistryOf<C>>>
    where
        C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
    {
        self.entries.iter().filter_map(downcast::<C>).collect()
    }

    /// Adds `plugin` to every registry wired for contract `C`.
    ///
    /// `order` overrides the order the plugin declares. Returns the number of
    /// registries the plugin was added to.
    pub fn install<C>(
        &self,
        plugin: Arc<C>,
        order: Option<i32>,
    ) -> Result<usize, ContributionError>
    where
        C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
    {
        let registries = self.registries_for::<C>();
        if registries.is_empty() {
            return Err(ContributionError::UnknownContract {
                contract: std::any::type_name::<C>(),
            });
        }
        let key = OrderKey::resolve(order, plugin.order());
        for registry in &registries {
            registry.register_with_key(Arc::clone(&plugin), key)?;
        }
        Ok(registries.len())
    }

    /// Seals every registry.
    pub fn seal_all(&self) {
        for entry in &self.entries {
            entry.registry.seal();
        }
    }

    /// Removes every registry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_name.clear();
    }

    /// An overview of every registry, in registration order.
    pub fn summaries(&self) -> Vec<RegistrySummary> {
        self.entries
            .iter()
            .map(|entry| RegistrySummary {
                name: entry.descriptor.name().to_string(),
                contract: entry.descriptor.contract_name().to_string(),
                delimiter: entry.descriptor.delimiter().name(),
                qualifier: entry.descriptor.qualifier().map(str::to_string),
                plugins: entry.registry.plugin_count(),
                sealed: entry.registry.is_sealed(),
            })
            .collect()
    }
}

fn downcast<C>(entry: &RegistryEntry) -> Option<Arc<RegistryOf<C>>>
where
    C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
{
    if entry.registry.contract_id() != TypeId::of::<C>()
        || entry.registry.delimiter() != DelimiterType::of::<C::Delimiter>()
    {
        return None;
    }
    Arc::clone(&entry.registry)
        .into_any()
        .downcast::<RegistryOf<C>>()
        .ok()
}
