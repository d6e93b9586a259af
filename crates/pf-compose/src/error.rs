//! Combinator errors.

use pf_cache::CacheError;
use pf_components::ComponentError;
use pf_graph::ModelError;
use pf_kernel::KernelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    /// No component to wrap was supplied.
    #[error("Combinator '{combinator}' needs a source component")]
    MissingSource { combinator: String },

    /// Port selection names a port the component does not have.
    #[error("Component '{component}' has no port '{port}' to select")]
    UnknownPortSelection { component: String, port: String },

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

pub type ComposeResult<T> = Result<T, ComposeError>;
