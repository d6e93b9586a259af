//! Layout configuration loaded from `photonflow.yml`.

use std::path::{Path, PathBuf};

use pf_routing::{ArraySpec, RouteConfig, RoutingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "photonflow.yml";

/// Settings shared by every build a front end runs.
///
/// Every field is optional in the file; absent fields keep their defaults.
///
/// ```yaml
/// router:
///   bend_radius: 15.0
///   separation: 3.0
/// array:
///   origin: [0.0, -200.0]
///   pitch: 127.0
///   count: 4
///   orientation: 90.0
/// strategy: looped
/// store_dir: build/artifacts
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub router: RouteConfig,
    pub array: ArraySpec,
    pub strategy: RoutingStrategy,
    /// Where persisted artifacts go unless a build names its own directory.
    pub store_dir: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            router: RouteConfig::default(),
            array: ArraySpec::default(),
            strategy: RoutingStrategy::default(),
            store_dir: PathBuf::from("build"),
        }
    }
}

impl LayoutConfig {
    /// Reject values the router would refuse anyway, before any build runs.
    pub fn validate(&self) -> AppResult<()> {
        self.router.validate()?;
        self.array.validate()?;
        Ok(())
    }
}

/// Load `path`, or [`DEFAULT_CONFIG_FILE`] when `None`.
///
/// A missing file yields the defaults; an unreadable or malformed one is an
/// error.
pub fn load_config(path: Option<&Path>) -> AppResult<LayoutConfig> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(LayoutConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: LayoutConfig =
        serde_yaml::from_str(&content).map_err(|e| AppError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    config.validate()?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Save `config` as YAML.
pub fn save_config(path: &Path, config: &LayoutConfig) -> AppResult<()> {
    std::fs::write(path, serde_yaml::to_string(config)?)?;
    Ok(())
}
