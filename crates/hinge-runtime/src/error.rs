//! Runtime error types.

use hinge_core::{ContributionError, WiringError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::container::ContainerState;

/// Errors that can occur while running a plugin container.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Registry wiring failed; no registry was published.
    #[error("Registry wiring failed: {0}")]
    Wiring(#[from] WiringError),

    /// A plugin contribution could not be installed.
    #[error("Plugin contribution failed: {0}")]
    Contribution(#[from] ContributionError),

    /// The operation is not allowed in the container's current state.
    #[error("Cannot {operation} a container that is {state}")]
    InvalidState {
        operation: &'static str,
        state: ContainerState,
    },
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
