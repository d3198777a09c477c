//! Error types for registry wiring, registration and lookup.
//!
//! Wiring failures ([`WiringError`]) are configuration defects and abort
//! startup. [`NoSupportingPlugin`] is an ordinary query outcome that callers
//! are expected to handle, so it is a separate type and never converts into a
//! wiring error.

use std::fmt;

use thiserror::Error;

// =============================================================================
// Wiring Errors
// =============================================================================

/// Why a contract's delimiter type could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvableReason {
    /// The contract carries no delimiter binding at all.
    Missing,
    /// The binding is still a free type variable.
    FreeVariable(String),
    /// The inherited binding disagrees with the delimiter the contract's
    /// registry was compiled for.
    Conflicting {
        /// Delimiter the registry factory expects.
        declared: &'static str,
        /// Delimiter found by walking the contract's parents.
        inherited: &'static str,
    },
}

impl fmt::Display for UnresolvableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("no delimiter binding declared"),
            Self::FreeVariable(var) => write!(f, "delimiter is the free type variable `{var}`"),
            Self::Conflicting {
                declared,
                inherited,
            } => write!(
                f,
                "registry expects `{declared}` but the parent contract binds `{inherited}`"
            ),
        }
    }
}

/// Errors that abort a wiring pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WiringError {
    /// A declared contract could not be resolved to a concrete delimiter type.
    #[error("cannot resolve delimiter type of plugin contract `{contract}`: {reason}")]
    UnresolvableDelimiterType {
        /// Full type name of the contract.
        contract: String,
        /// What went wrong.
        reason: UnresolvableReason,
    },

    /// Two registries resolved to the same lookup name.
    #[error(
        "registry name '{name}' is already taken by `{existing}`; \
         qualify `{contract}` with a distinct alias"
    )]
    DuplicateRegistryName {
        /// The colliding lookup name.
        name: String,
        /// Contract of the registry already holding the name.
        existing: String,
        /// Contract that tried to claim the name.
        contract: String,
    },
}

impl WiringError {
    /// Creates an unresolvable-delimiter error.
    pub fn unresolvable(contract: impl Into<String>, reason: UnresolvableReason) -> Self {
        Self::UnresolvableDelimiterType {
            contract: contract.into(),
            reason,
        }
    }
}

/// Result type for wiring operations.
pub type WiringResult<T> = Result<T, WiringError>;

// =============================================================================
// Lookup Errors
// =============================================================================

/// Returned when no registered plugin supports the requested delimiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", self.describe())]
pub struct NoSupportingPlugin {
    /// Contract type of the queried registry.
    pub contract: &'static str,
    /// Delimiter type of the queried registry.
    pub delimiter: &'static str,
    /// Caller supplied message, if any.
    pub message: Option<String>,
}

impl NoSupportingPlugin {
    /// Creates the error for a registry of `contract` over `delimiter`.
    pub fn new(contract: &'static str, delimiter: &'static str) -> Self {
        Self {
            contract,
            delimiter,
            message: None,
        }
    }

    /// Replaces the default description with `message`.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn describe(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => format!(
                "no plugin of `{}` supports the given `{}` delimiter",
                self.contract, self.delimiter
            ),
        }
    }
}

// =============================================================================
// Registration Errors
// =============================================================================

/// Errors raised when adding plugins to a registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// The registry left its registration phase.
    #[error("registry for `{contract}` is sealed; plugins can no longer be registered")]
    Sealed {
        /// Contract type of the sealed registry.
        contract: &'static str,
    },
}

/// Errors raised while installing contributed plugins into a directory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContributionError {
    /// No registry was wired for the plugin's contract.
    #[error("no registry is wired for plugin contract `{contract}`")]
    UnknownContract {
        /// Full type name of the contract.
        contract: &'static str,
    },

    /// The target registry rejected the plugin.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}
