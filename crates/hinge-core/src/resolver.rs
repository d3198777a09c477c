//! Delimiter type resolution.
//!
//! Determines, for a contract type, the concrete type its `Plugin<D>` binding
//! resolves to, following inherited bindings through parent contracts.

use crate::contract::{ContractType, DelimiterType, RegistryFactory, TypeBinding};
use crate::error::{UnresolvableReason, WiringError, WiringResult};

/// The registry type a contract resolves to.
#[derive(Debug, Clone)]
pub struct RegistryShape {
    /// The resolved delimiter.
    pub delimiter: DelimiterType,
    /// Factory building `OrderAwarePluginRegistry<C, D>`.
    pub factory: RegistryFactory,
    /// Readable form of the registry type.
    pub registry_type: String,
}

/// Resolves contract types to concrete delimiter types.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeResolver;

impl TypeResolver {
    /// Creates a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Returns the concrete delimiter `contract` binds, walking inherited
    /// bindings until a concrete one is found.
    pub fn resolve_delimiter(&self, contract: &ContractType) -> WiringResult<DelimiterType> {
        let mut current = contract;
        loop {
            match current.binding() {
                Some(TypeBinding::Concrete(delimiter)) => return Ok(*delimiter),
                Some(TypeBinding::Inherited(parent)) => current = parent,
                Some(TypeBinding::Variable(variable)) => {
                    return Err(WiringError::unresolvable(
                        contract.type_name(),
                        UnresolvableReason::FreeVariable(variable.to_string()),
                    ));
                }
                None => {
                    return Err(WiringError::unresolvable(
                        contract.type_name(),
                        UnresolvableReason::Missing,
                    ));
                }
            }
        }
    }

    /// Resolves the full registry shape of `contract`.
    ///
    /// Fails if the delimiter cannot be resolved, if the contract has no
    /// registry factory, or if the factory was built for a different delimiter
    /// than the one inherited from the parent chain.
    pub fn resolve(&self, contract: &ContractType) -> WiringResult<RegistryShape> {
        let delimiter = self.resolve_delimiter(contract)?;
        let factory = *contract.factory().ok_or_else(|| {
            WiringError::unresolvable(contract.type_name(), UnresolvableReason::Missing)
        })?;

        if factory.delimiter() != delimiter {
            return Err(WiringError::unresolvable(
                contract.type_name(),
                UnresolvableReason::Conflicting {
                    declared: factory.delimiter().name(),
                    inherited: delimiter.name(),
                },
            ));
        }

        Ok(RegistryShape {
            delimiter,
            factory,
            registry_type: format!(
                "OrderAwarePluginRegistry<{}, {}>",
                contract.type_name(),
                delimiter.name()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::fixtures::{Formatter, Validator};

    #[test]
    fn test_direct_binding() {
        let shape = TypeResolver::new()
            .resolve(&ContractType::of::<dyn Formatter>())
            .unwrap();
        assert_eq!(shape.delimiter, DelimiterType::of::<String>());
        assert!(shape.registry_type.starts_with("OrderAwarePluginRegistry<dyn "));
        assert!(shape.registry_type.ends_with("String>"));
    }

    #[test]
    fn test_inherited_binding() {
        let child = ContractType::of::<dyn Formatter>()
            .extending(ContractType::raw("Base").extending(ContractType::of::<dyn Formatter>()));

        let delimiter = TypeResolver::new().resolve_delimiter(&child).unwrap();
        assert_eq!(delimiter, DelimiterType::of::<String>());
        assert!(TypeResolver::new().resolve(&child).is_ok());
    }

    #[test]
    fn test_free_variable_is_unresolvable() {
        let err = TypeResolver::new()
            .resolve(&ContractType::unbound("Sink", "T"))
            .unwrap_err();
        assert_eq!(
            err,
            WiringError::unresolvable("dyn Sink<T>", UnresolvableReason::FreeVariable("T".into()))
        );
    }

    #[test]
    fn test_inherited_free_variable_is_unresolvable() {
        let child = ContractType::of::<dyn Formatter>().extending(ContractType::unbound("Sink", "T"));
        let err = TypeResolver::new().resolve(&child).unwrap_err();
        assert!(matches!(
            err,
            WiringError::UnresolvableDelimiterType {
                reason: UnresolvableReason::FreeVariable(_),
                ..
            }
        ));
    }

    #[test]
    fn test_missing_binding_and_factory() {
        let resolver = TypeResolver::new();
        let err = resolver.resolve(&ContractType::raw("Legacy")).unwrap_err();
        assert!(matches!(
            err,
            WiringError::UnresolvableDelimiterType {
                reason: UnresolvableReason::Missing,
                ..
            }
        ));

        let named_only = ContractType::raw("Legacy").extending(ContractType::of::<dyn Validator>());
        assert_eq!(
            resolver.resolve_delimiter(&named_only).unwrap(),
            DelimiterType::of::<u32>()
        );
        assert!(resolver.resolve(&named_only).is_err());
    }

    #[test]
    fn test_conflicting_inherited_binding() {
        let child = ContractType::of::<dyn Formatter>().extending(ContractType::of::<dyn Validator>());
        let err = TypeResolver::new().resolve(&child).unwrap_err();
        assert!(matches!(
            err,
            WiringError::UnresolvableDelimiterType {
                reason: UnresolvableReason::Conflicting { .. },
                ..
            }
        ));
    }
}
