//! Plugin contract metadata.
//!
//! A *contract type* is the trait object of a plugin trait, e.g.
//! `dyn Formatter`. Registry wiring never inspects types at runtime; instead
//! every contract carries a [`ContractType`] record describing which delimiter
//! it is bound to, which contract it extends, and how to build its registry.
//!
//! The record is produced in one of two ways:
//!
//! - [`ContractType::of::<C>()`](ContractType::of) for contracts implementing
//!   [`PluginContract`], usually via `#[plugin_contract]`.
//! - [`ContractType::unbound`] / [`ContractType::raw`] for contracts known only
//!   by name, such as a generic contract declared without its type argument.
//!   Wiring rejects those with `UnresolvableDelimiterType`.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::plugin::Plugin;
use crate::registry::{ErasedRegistry, OrderAwarePluginRegistry};

// =============================================================================
// PluginContract
// =============================================================================

/// Static metadata of a plugin contract type.
///
/// Implemented for trait objects such as `dyn Formatter`. The
/// `#[plugin_contract]` attribute generates this impl from the trait's
/// `Plugin<D>` supertrait.
///
/// ```rust,ignore
/// pub trait Formatter: Plugin<String> {}
///
/// impl PluginContract for dyn Formatter {
///     type Delimiter = String;
///     const SIMPLE_NAME: &'static str = "Formatter";
/// }
/// ```
pub trait PluginContract: Send + Sync + 'static {
    /// The context type plugins of this contract evaluate.
    type Delimiter: ?Sized + 'static;

    /// Unqualified name of the contract trait, used to derive the default
    /// registry name.
    const SIMPLE_NAME: &'static str;

    /// Alias that replaces the derived registry name.
    const QUALIFIER: Option<&'static str> = None;

    /// The contract this one extends, when the delimiter binding is inherited.
    fn supertype() -> Option<ContractType> {
        None
    }
}

// =============================================================================
// DelimiterType
// =============================================================================

/// Identity of a delimiter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DelimiterType {
    #[serde(skip)]
    id: TypeId,
    name: &'static str,
}

impl DelimiterType {
    /// Describes the type `D`.
    pub fn of<D: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<D>(),
            name: std::any::type_name::<D>(),
        }
    }

    /// `TypeId` of the delimiter.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full type name of the delimiter.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for DelimiterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// =============================================================================
// TypeBinding
// =============================================================================

/// How a contract binds the delimiter type parameter of [`Plugin<D>`].
#[derive(Debug, Clone)]
pub enum TypeBinding {
    /// Bound directly to a concrete type.
    Concrete(DelimiterType),
    /// Inherited from the contract this one extends.
    Inherited(Box<ContractType>),
    /// Left as a type variable, e.g. the `T` of `Sink<T>`.
    Variable(Cow<'static, str>),
}

// =============================================================================
// RegistryFactory
// =============================================================================

/// Builds the order-aware registry specialized to one contract.
#[derive(Clone, Copy)]
pub struct RegistryFactory {
    delimiter: DelimiterType,
    create: fn() -> Arc<dyn ErasedRegistry>,
}

impl RegistryFactory {
    /// Factory for `OrderAwarePluginRegistry<C, C::Delimiter>`.
    pub fn of<C>() -> Self
    where
        C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
    {
        Self {
            delimiter: DelimiterType::of::<C::Delimiter>(),
            create: create_registry::<C>,
        }
    }

    /// Delimiter the produced registry is specialized to.
    pub fn delimiter(&self) -> DelimiterType {
        self.delimiter
    }

    /// Creates an empty registry.
    pub fn create(&self) -> Arc<dyn ErasedRegistry> {
        (self.create)()
    }
}

fn create_registry<C>() -> Arc<dyn ErasedRegistry>
where
    C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
{
    Arc::new(OrderAwarePluginRegistry::<C, C::Delimiter>::new())
}

impl fmt::Debug for RegistryFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryFactory")
            .field("delimiter", &self.delimiter.name)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ContractType
// =============================================================================

/// Metadata record describing one plugin contract type.
#[derive(Debug, Clone)]
pub struct ContractType {
    type_name: Cow<'static, str>,
    simple_name: Cow<'static, str>,
    type_id: Option<TypeId>,
    qualifier: Option<Cow<'static, str>>,
    binding: Option<TypeBinding>,
    factory: Option<RegistryFactory>,
}

impl ContractType {
    /// Describes the statically known contract `C`.
    pub fn of<C>() -> Self
    where
        C: ?Sized + PluginContract + Plugin<<C as PluginContract>::Delimiter>,
    {
        let binding = match C::supertype() {
            Some(parent) => TypeBinding::Inherited(Box::new(parent)),
            None => TypeBinding::Concrete(DelimiterType::of::<C::Delimiter>()),
        };
        Self {
            type_name: Cow::Borrowed(std::any::type_name::<C>()),
            simple_name: Cow::Borrowed(C::SIMPLE_NAME),
            type_id: Some(TypeId::of::<C>()),
            qualifier: C::QUALIFIER.map(Cow::Borrowed),
            binding: Some(binding),
            factory: Some(RegistryFactory::of::<C>()),
        }
    }

    /// Describes a generic contract whose delimiter is still the type
    /// variable `variable`.
    pub fn unbound(
        simple_name: impl Into<Cow<'static, str>>,
        variable: impl Into<Cow<'static, str>>,
    ) -> Self {
        let simple_name = simple_name.into();
        let variable = variable.into();
        Self {
            type_name: Cow::Owned(format!("dyn {simple_name}<{variable}>")),
            simple_name,
            type_id: None,
            qualifier: None,
            binding: Some(TypeBinding::Variable(variable)),
            factory: None,
        }
    }

    /// Describes a contract known only by name, without any delimiter binding.
    pub fn raw(simple_name: impl Into<Cow<'static, str>>) -> Self {
        let simple_name = simple_name.into();
        Self {
            type_name: Cow::Owned(format!("dyn {simple_name}")),
            simple_name,
            type_id: None,
            qualifier: None,
            binding: None,
            factory: None,
        }
    }

    /// Attaches an alias that replaces the derived registry name.
    pub fn qualified(mut self, qualifier: impl Into<Cow<'static, str>>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Removes any alias, restoring the derived registry name.
    pub fn unqualified(mut self) -> Self {
        self.qualifier = None;
        self
    }

    /// Makes the delimiter binding inherited from `parent`.
    pub fn extending(mut self, parent: ContractType) -> Self {
        self.binding = Some(TypeBinding::Inherited(Box::new(parent)));
        self
    }

    /// Full type name, e.g. `dyn my_app::Formatter`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Unqualified trait name, e.g. `Formatter`.
    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    /// `TypeId` of the contract, if statically known.
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Alias attached to the contract.
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// The declared delimiter binding.
    pub fn binding(&self) -> Option<&TypeBinding> {
        self.binding.as_ref()
    }

    /// Factory for the contract's registry, if statically known.
    pub fn factory(&self) -> Option<&RegistryFactory> {
        self.factory.as_ref()
    }

    /// Returns `true` if `self` describes the contract `C`.
    pub fn is<C: ?Sized + 'static>(&self) -> bool {
        self.type_id == Some(TypeId::of::<C>())
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}

/// Builds a `Vec<ContractType>` from a list of contract types, in order.
///
/// ```rust,ignore
/// let declared = contracts![dyn Formatter, dyn Validator];
/// ```
#[macro_export]
macro_rules! contracts {
    () => {
        ::std::vec::Vec::<$crate::ContractType>::new()
    };
    ($($contract:ty),+ $(,)?) => {
        ::std::vec![$($crate::ContractType::of::<$contract>()),+]
    };
}
