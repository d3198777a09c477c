//! Link-time plugin contributions.
//!
//! `#[register_plugin(Contract)]` places a [`PluginContribution`] into the
//! [`PLUGIN_CONTRIBUTIONS`] distributed slice. The runtime container installs
//! every entry once the registries are wired.

use std::any::TypeId;
use std::fmt;

use linkme::distributed_slice;

use crate::directory::ComponentDirectory;
use crate::error::ContributionError;

/// A plugin contributed from anywhere in the final binary.
pub struct PluginContribution {
    /// Name of the contributing constructor.
    pub name: &'static str,
    /// Contract path as written at the contribution site.
    pub contract_name: &'static str,
    /// `TypeId` of the contract type.
    pub contract_id: fn() -> TypeId,
    /// Explicit order, overriding the plugin's declared one.
    pub order: Option<i32>,
    /// Builds the plugin and adds it to every registry of its contract.
    pub install: fn(&ComponentDirectory) -> Result<usize, ContributionError>,
}

impl PluginContribution {
    /// Installs the plugin into `directory`.
    pub fn install_into(&self, directory: &ComponentDirectory) -> Result<usize, ContributionError> {
        (self.install)(directory)
    }

    /// Returns `true` if this contribution targets contract `C`.
    pub fn targets<C: ?Sized + 'static>(&self) -> bool {
        (self.contract_id)() == TypeId::of::<C>()
    }
}

impl fmt::Debug for PluginContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContribution")
            .field("name", &self.name)
            .field("contract", &self.contract_name)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Every plugin contributed with `#[register_plugin]`.
#[distributed_slice]
pub static PLUGIN_CONTRIBUTIONS: [PluginContribution];

/// Contributions in installation order: by contract, then by name.
///
/// Link order is unspecified, so this is the order to install in.
pub fn contributions() -> Vec<&'static PluginContribution> {
    let mut all: Vec<_> = PLUGIN_CONTRIBUTIONS.iter().collect();
    all.sort_by(|a, b| (a.contract_name, a.name).cmp(&(b.contract_name, b.name)));
    all
}
