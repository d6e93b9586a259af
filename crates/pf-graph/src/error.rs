//! Model-layer error types.

use pf_kernel::KernelError;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Component construction and lookup errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Two ports with the same name in one component.
    #[error("Duplicate port '{port}'")]
    DuplicatePort { port: String },

    /// Port lookup by name failed.
    #[error("Component '{component}' has no port '{port}'")]
    UnknownPort { component: String, port: String },

    /// A reference would make a component (transitively) contain itself.
    #[error("Adding reference to '{target}' would create a cycle through '{component}'")]
    Cycle { component: String, target: String },

    /// Port with non-finite placement or negative width.
    #[error("Invalid port '{port}': {reason}")]
    InvalidPort { port: String, reason: &'static str },

    /// Component name must be non-empty.
    #[error("Component name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Kernel(#[from] KernelError),
}
