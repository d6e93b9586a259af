//! Error types for generator invocation.

use pf_cache::CacheError;
use pf_graph::ModelError;
use pf_kernel::KernelError;
use thiserror::Error;

/// Errors that can occur while resolving and running generators.
#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("Unknown generator '{id}'")]
    UnknownGenerator { id: String },

    #[error("Generator '{generator}' is missing parameter '{param}'")]
    MissingParam { generator: String, param: String },

    #[error("Generator '{generator}': invalid parameter '{param}': {reason}")]
    InvalidParam {
        generator: String,
        param: String,
        reason: String,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::MissingParam {
            generator: "straight".into(),
            param: "length".into(),
        };
        assert!(err.to_string().contains("length"));
    }

    #[test]
    fn error_conversion() {
        let model = ModelError::DuplicatePort { port: "o1".into() };
        let err: ComponentError = model.into();
        assert!(matches!(err, ComponentError::Model(_)));
    }
}
