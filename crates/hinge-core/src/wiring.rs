//! Registry wiring.
//!
//! Turns an ordered list of contract types into named
//! [`OrderAwarePluginRegistry`](crate::OrderAwarePluginRegistry) instances in a
//! [`ComponentDirectory`].
//!
//! # Naming
//!
//! A registry is published under the contract's qualifier verbatim when one is
//! attached, otherwise under the contract's simple name with a `Registry`
//! suffix and its first character lowercased:
//!
//! | contract                         | registry name         |
//! |----------------------------------|-----------------------|
//! | `dyn Formatter`                  | `formatterRegistry`   |
//! | `dyn Formatter` as `csvFormatters` | `csvFormatters`     |
//! | `dyn HTTPHandler`                | `hTTPHandlerRegistry` |
//!
//! # Failure
//!
//! Wiring is all-or-nothing. [`RegistryWiring::plan`] resolves and names every
//! contract before any registry is built, so an unresolvable contract or a
//! name collision leaves the directory untouched.

use std::any::TypeId;
use std::collections::HashMap;

use tracing::{debug, debug_span, info};

use crate::contract::{ContractType, DelimiterType, RegistryFactory};
use crate::directory::ComponentDirectory;
use crate::error::{WiringError, WiringResult};
use crate::resolver::TypeResolver;

/// Lowercases the first character of `name`, leaving the rest unchanged.
pub fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The registry name used when a contract carries no qualifier.
pub fn default_registry_name(simple_name: &str) -> String {
    uncapitalize(&format!("{simple_name}Registry"))
}

/// The registry name for `contract`.
pub fn registry_name(contract: &ContractType) -> String {
    match contract.qualifier() {
        Some(qualifier) => qualifier.to_string(),
        None => default_registry_name(contract.simple_name()),
    }
}

// =============================================================================
// Definitions
// =============================================================================

/// Metadata published alongside a wired registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryDescriptor {
    name: String,
    contract_name: String,
    contract_simple_name: String,
    contract_id: Option<TypeId>,
    delimiter: DelimiterType,
    qualifier: Option<String>,
}

impl RegistryDescriptor {
    /// Lookup name of the registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full type name of the contract.
    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    /// Unqualified name of the contract.
    pub fn contract_simple_name(&self) -> &str {
        &self.contract_simple_name
    }

    /// `TypeId` of the contract, absent for contracts built from names only.
    pub fn contract_id(&self) -> Option<TypeId> {
        self.contract_id
    }

    /// Resolved delimiter type.
    pub fn delimiter(&self) -> DelimiterType {
        self.delimiter
    }

    /// Qualifier attached to the contract, if any.
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

/// A registry that is ready to be instantiated.
#[derive(Debug, Clone)]
pub struct RegistryDefinition {
    descriptor: RegistryDescriptor,
    factory: RegistryFactory,
    registry_type: String,
}

impl RegistryDefinition {
    /// Name, contract and delimiter of the registry to create.
    pub fn descriptor(&self) -> &RegistryDescriptor {
        &self.descriptor
    }

    /// Readable registry type, e.g. `OrderAwarePluginRegistry<dyn Formatter, String>`.
    pub fn registry_type(&self) -> &str {
        &self.registry_type
    }
}

/// The checked outcome of a wiring pass, not yet applied.
#[derive(Debug, Clone, Default)]
pub struct WiringPlan {
    definitions: Vec<RegistryDefinition>,
}

impl WiringPlan {
    /// Definitions in declaration order.
    pub fn definitions(&self) -> &[RegistryDefinition] {
        &self.definitions
    }

    /// Number of registries the plan creates.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Instantiates every registry and adds it to `directory`.
    ///
    /// Names are checked against the directory before the first registry is
    /// added, so on error the directory is left as it was.
    pub fn commit(self, directory: &mut ComponentDirectory) -> WiringResult<usize> {
        for definition in &self.definitions {
            let name = definition.descriptor.name();
            if let Some(existing) = directory.descriptor(name) {
                return Err(WiringError::DuplicateRegistryName {
                    name: name.to_string(),
                    existing: existing.contract_name().to_string(),
                    contract: definition.descriptor.contract_name().to_string(),
                });
            }
        }

        let count = self.definitions.len();
        for definition in self.definitions {
            let registry = definition.factory.create();
            info!(
                registry = %definition.descriptor.name,
                contract = %definition.descriptor.contract_name,
                delimiter = %definition.descriptor.delimiter,
                qualifier = ?definition.descriptor.qualifier,
                "Plugin registry wired"
            );
            directory.register(definition.descriptor, registry)?;
        }
        Ok(count)
    }
}

// =============================================================================
// RegistryWiring
// =============================================================================

/// One wiring pass over an ordered list of contracts.
#[derive(Debug, Clone, Default)]
pub struct RegistryWiring {
    contracts: Vec<ContractType>,
    resolver: TypeResolver,
}

impl RegistryWiring {
    /// Creates a pass over `contracts`, in order.
    pub fn new(contracts: impl IntoIterator<Item = ContractType>) -> Self {
        Self {
            contracts: contracts.into_iter().collect(),
            resolver: TypeResolver::new(),
        }
    }

    /// Declared contracts.
    pub fn contracts(&self) -> &[ContractType] {
        &self.contracts
    }

    /// Resolves and names every contract without touching any directory.
    pub fn plan(&self) -> WiringResult<WiringPlan> {
        let mut definitions = Vec::with_capacity(self.contracts.len());
        let mut taken: HashMap<String, String> = HashMap::new();

        for contract in &self.contracts {
            let shape = self.resolver.resolve(contract)?;
            let name = registry_name(contract);

            if let Some(existing) = taken.get(&name) {
                return Err(WiringError::DuplicateRegistryName {
                    name,
                    existing: existing.clone(),
                    contract: contract.type_name().to_string(),
                });
            }
            taken.insert(name.clone(), contract.type_name().to_string());

            debug!(
                registry = %name,
                registry_type = %shape.registry_type,
                "Resolved plugin contract"
            );
            definitions.push(RegistryDefinition {
                descriptor: RegistryDescriptor {
                    name,
                    contract_name: contract.type_name().to_string(),
                    contract_simple_name: contract.simple_name().to_string(),
                    contract_id: contract.type_id(),
                    delimiter: shape.delimiter,
                    qualifier: contract.qualifier().map(str::to_string),
                },
                factory: shape.factory,
                registry_type: shape.registry_type,
            });
        }

        Ok(WiringPlan { definitions })
    }

    /// Plans and commits into `directory`, returning the populated directory.
    pub fn wire(&self, mut directory: ComponentDirectory) -> WiringResult<ComponentDirectory> {
        let span = debug_span!("wire_registries", contracts = self.contracts.len());
        let _guard = span.enter();

        if self.contracts.is_empty() {
            debug!("No plugin contracts declared");
            return Ok(directory);
        }

        let wired = self.plan()?.commit(&mut directory)?;
        info!(registries = wired, "Registry wiring complete");
        Ok(directory)
    }
}
