//! pf-cache: fingerprinting and memoization of generated components.
//!
//! - `args`: tagged generator parameters (`Arg`, `Args`, `GeneratorCall`)
//! - `fingerprint`: canonical serialization and SHA-256 fingerprints
//! - `cache`: process-wide build cache with per-key locking and a name registry
//! - `store`: on-disk artifact store (YAML metadata + kernel geometry)

pub mod args;
pub mod cache;
pub mod fingerprint;
pub mod store;

pub use args::{Arg, Args, GeneratorCall};
pub use cache::{BuildCache, CacheStats};
pub use fingerprint::{canonical_bytes, canonical_value, canonicalize, fingerprint};
pub use store::{ArtifactMetadata, ArtifactStore, to_text};

use pf_core::Fingerprint;
use pf_kernel::KernelError;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// Argument that has no stable serialized form.
    #[error("Unserializable argument at '{path}': {reason}")]
    UnserializableArgument { path: String, reason: String },

    /// Two distinct invocations produced components with the same name.
    #[error("Component name '{name}' already taken by {existing}, refusing {incoming}")]
    NameCollision {
        name: String,
        existing: Fingerprint,
        incoming: Fingerprint,
    },

    #[error("Artifact not found: {name}")]
    ArtifactNotFound { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}
