//! Shared application service layer for photonflow.
//!
//! Front ends (the `pf` CLI today) go through this crate for configuration
//! loading and for the generator -> combinators -> store pipeline.

pub mod build_service;
pub mod config;
pub mod error;

// Re-export key types for convenience
pub use build_service::{
    BuildRequest, BuildResponse, RouteRequest, build, generator_defaults, list_generators,
    parse_setting, parse_settings,
};
pub use config::{DEFAULT_CONFIG_FILE, LayoutConfig, load_config, save_config};
pub use error::{AppError, AppResult};
