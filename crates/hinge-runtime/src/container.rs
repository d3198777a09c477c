//! The plugin container.
//!
//! Owns the component directory and drives the startup sequence:
//!
//! 1. Apply configured qualifier overrides and exclusions to the declared
//!    contracts.
//! 2. Wire one registry per contract. Any wiring error aborts startup before a
//!    registry is published.
//! 3. Install link-time contributions (`#[register_plugin]`), then the ones
//!    passed to [`PluginContainer::contribute`].
//! 4. Seal every registry, unless `registries.seal_on_start` is off.
//!
//! ```rust,ignore
//! let mut container = PluginContainer::builder()
//!     .contract(ContractType::of::<dyn Formatter>())
//!     .build()?;
//! container.contribute::<dyn Formatter>(Arc::new(JsonFormatter), None)?;
//! container.start()?;
//!
//! let formatters = container.registry::<dyn Formatter>().unwrap();
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use hinge_core::{
    ComponentDirectory, ContractType, ContributionError, Plugin, PluginContract, RegistryOf,
    RegistryWiring,
};
use tracing::{debug, info, info_span, warn};

use crate::config::{ConfigLoader, HingeConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Lifecycle state of a [`PluginContainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Accepting contracts and contributions.
    Created,
    /// Registries are wired and populated.
    Running,
    /// Registries have been torn down.
    Stopped,
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

type InstallFn =
    Box<dyn FnOnce(&ComponentDirectory) -> Result<usize, ContributionError> + Send + Sync>;

struct PendingContribution {
    contract: &'static str,
    install: InstallFn,
}

/// Wires plugin registries and installs plugins into them.
pub struct PluginContainer {
    config: HingeConfig,
    contracts: Vec<ContractType>,
    pending: Vec<PendingContribution>,
    directory: ComponentDirectory,
    state: ContainerState,
}

impl PluginContainer {
    /// Creates a container using `config`.
    pub fn new(config: HingeConfig) -> Self {
        Self {
            config,
            contracts: Vec::new(),
            pending: Vec::new(),
            directory: ComponentDirectory::new(),
            state: ContainerState::Created,
        }
    }

    /// Starts a builder that loads configuration from files and env.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Configuration the container was created with.
    pub fn config(&self) -> &HingeConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ContainerState {
        self.state
    }

    /// Declares a contract to wire on start. Declaration order is wiring order.
    pub fn declare(&mut self, contract: ContractType) -> RuntimeResult<()> {
        self.expect_state(ContainerState::Created, "declare contracts on")?;
        self.contracts.push(contract);
        Ok(())
    }

    /// Declares several contracts, in order.
    pub fn declare_all(
        &mut self,
        contracts: impl IntoIterator<Item = ContractType>,
    ) -> RuntimeResult<()> {
        self.expect_state(ContainerState::Created, "declare contracts on")?;
        self.contracts.extend(contracts);
        Ok(())
    }

    /// Queues `plugin` for every registry of contract `C`.
    ///
    /// `order` overrides the order the plugin declares.
    pub fn contribute<C>(&mut self, plugin: Arc<C>, order: Option<i32>) -> RuntimeResult<()>
    where
        C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
    {
        self.expect_state(ContainerState::Created, "contribute to")?;
        self.pending.push(PendingContribution {
            contract: std::any::type_name::<C>(),
            install: Box::new(move |directory: &ComponentDirectory| {
                directory.install::<C>(plugin, order)
            }),
        });
        Ok(())
    }

    /// Wires the registries and installs every contribution.
    ///
    /// A failed start leaves the container stopped with no registries.
    pub fn start(&mut self) -> RuntimeResult<()> {
        self.expect_state(ContainerState::Created, "start")?;

        let span = info_span!("container_start", contracts = self.contracts.len());
        let _guard = span.enter();

        match self.try_start() {
            Ok(directory) => {
                self.directory = directory;
                self.state = ContainerState::Running;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Plugin container failed to start");
                self.state = ContainerState::Stopped;
                Err(err)
            }
        }
    }

    fn try_start(&mut self) -> RuntimeResult<ComponentDirectory> {
        let contracts = self.effective_contracts();
        let directory = RegistryWiring::new(contracts).wire(ComponentDirectory::new())?;

        let strict = self.config.registries.strict_contributions;
        let mut installed = 0;
        for contribution in hinge_core::contributions() {
            installed += install_contribution(
                &directory,
                contribution.contract_name,
                contribution.name,
                strict,
                |directory| contribution.install_into(directory),
            )?;
        }
        for pending in std::mem::take(&mut self.pending) {
            installed += install_contribution(
                &directory,
                pending.contract,
                "programmatic",
                strict,
                pending.install,
            )?;
        }

        if self.config.registries.seal_on_start {
            directory.seal_all();
        }

        for summary in directory.summaries() {
            debug!(
                registry = %summary.name,
                contract = %summary.contract,
                plugins = summary.plugins,
                sealed = summary.sealed,
                "Registry ready"
            );
        }
        info!(
            registries = directory.len(),
            plugins = installed,
            "Plugin container started"
        );
        Ok(directory)
    }

    /// Declared contracts with configuration applied.
    fn effective_contracts(&self) -> Vec<ContractType> {
        let registries = &self.config.registries;
        self.contracts
            .iter()
            .filter_map(|contract| {
                let (simple, full) = (contract.simple_name(), contract.type_name());
                if registries.is_excluded(simple, full) {
                    info!(contract = %contract, "Contract excluded by configuration");
                    return None;
                }
                let contract = match registries.qualifier_for(simple, full) {
                    Some(qualifier) => contract.clone().qualified(qualifier.to_string()),
                    None => contract.clone(),
                };
                Some(contract)
            })
            .collect()
    }

    /// Tears down every registry.
    pub fn stop(&mut self) -> RuntimeResult<()> {
        self.expect_state(ContainerState::Running, "stop")?;
        let registries = self.directory.len();
        self.directory.clear();
        self.state = ContainerState::Stopped;
        info!(registries, "Plugin container stopped");
        Ok(())
    }

    /// Wired registries. Empty before start and after stop.
    pub fn directory(&self) -> &ComponentDirectory {
        &self.directory
    }

    /// The first registry wired for contract `C`.
    pub fn registry<C>(&self) -> Option<Arc<RegistryOf<C>>>
    where
        C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
    {
        self.directory.registry_for::<C>()
    }

    /// The registry of contract `C` wired under `qualifier`.
    pub fn qualified<C>(&self, qualifier: &str) -> Option<Arc<RegistryOf<C>>>
    where
        C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
    {
        self.directory.qualified::<C>(qualifier)
    }

    /// The registry named `name`, if it belongs to contract `C`.
    pub fn get<C>(&self, name: &str) -> Option<Arc<RegistryOf<C>>>
    where
        C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
    {
        self.directory.get::<C>(name)
    }

    fn expect_state(&self, expected: ContainerState, operation: &'static str) -> RuntimeResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RuntimeError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

impl Default for PluginContainer {
    fn default() -> Self {
        Self::new(HingeConfig::default())
    }
}

impl fmt::Debug for PluginContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContainer")
            .field("state", &self.state)
            .field("contracts", &self.contracts.len())
            .field("pending", &self.pending.len())
            .field("directory", &self.directory)
            .finish()
    }
}

/// Installs one contribution, returning how many plugins were added.
fn install_contribution<F>(
    directory: &ComponentDirectory,
    contract: &str,
    name: &str,
    strict: bool,
    install: F,
) -> RuntimeResult<usize>
where
    F: FnOnce(&ComponentDirectory) -> Result<usize, ContributionError>,
{
    match install(directory) {
        Ok(registries) => {
            debug!(plugin = name, contract, registries, "Plugin installed");
            Ok(1)
        }
        Err(ContributionError::UnknownContract { .. }) if !strict => {
            warn!(
                plugin = name,
                contract, "Skipping plugin for a contract that is not wired"
            );
            Ok(0)
        }
        Err(err) => Err(err.into()),
    }
}

// =============================================================================
// ContainerBuilder
// =============================================================================

/// Builds a [`PluginContainer`] from loaded configuration.
pub struct ContainerBuilder {
    config_loader: ConfigLoader,
    contracts: Vec<ContractType>,
    init_logging: bool,
}

impl ContainerBuilder {
    /// Searches the current directory, then the user config directory, for
    /// `hinge.toml` and reads `HINGE_*` variables.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            contracts: Vec::new(),
            init_logging: false,
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration above every loaded source.
    pub fn merge(mut self, config: HingeConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Declares a contract.
    pub fn contract(mut self, contract: ContractType) -> Self {
        self.contracts.push(contract);
        self
    }

    /// Declares several contracts, in order.
    pub fn contracts(mut self, contracts: impl IntoIterator<Item = ContractType>) -> Self {
        self.contracts.extend(contracts);
        self
    }

    /// Installs the global subscriber from the `logging` section.
    pub fn with_logging(mut self) -> Self {
        self.init_logging = true;
        self
    }

    /// Loads configuration and creates the container with the declared
    /// contracts.
    pub fn build(self) -> RuntimeResult<PluginContainer> {
        let config = self.config_loader.load()?;
        if self.init_logging {
            logging::init_from_config(&config.logging);
        }
        let mut container = PluginContainer::new(config);
        container.declare_all(self.contracts)?;
        Ok(container)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
