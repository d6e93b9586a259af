//! Artifact storage API.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pf_core::Fingerprint;
use pf_graph::{Component, Netlist, Port, Settings, dependency_order, netlist};
use pf_kernel::GeometryKernel;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{CacheError, CacheResult};

/// Render any serializable record (settings, metadata, netlists) as YAML.
pub fn to_text<T: Serialize>(value: &T) -> CacheResult<String> {
    Ok(serde_yaml::to_string(value)?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub name: String,
    pub fingerprint: Option<Fingerprint>,
    pub timestamp: String,
    pub ports: Vec<Port>,
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Settings::is_empty")]
    pub provenance: Settings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

impl ArtifactMetadata {
    pub fn of(component: &Component) -> Self {
        Self {
            name: component.name().to_string(),
            fingerprint: component.fingerprint(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            ports: component.get_ports(),
            settings: component.get_settings().clone(),
            provenance: component.provenance().clone(),
            references: component
                .references()
                .iter()
                .map(|r| r.target.name().to_string())
                .collect(),
        }
    }
}

/// On-disk store, one directory per component name.
///
/// Layout: `<root>/<name>/metadata.yml`, `geometry.json` and, for
/// hierarchical components, `netlist.yml`.
#[derive(Clone)]
pub struct ArtifactStore {
    root_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(root_dir: PathBuf) -> CacheResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn artifact_dir(&self, name: &str) -> PathBuf {
        self.root_dir.join(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.artifact_dir(name).join("metadata.yml").exists()
    }

    /// Write one component. Returns its directory.
    pub fn save(&self, kernel: &dyn GeometryKernel, component: &Component) -> CacheResult<PathBuf> {
        let dir = self.artifact_dir(component.name());
        fs::create_dir_all(&dir)?;

        let metadata = ArtifactMetadata::of(component);
        fs::write(dir.join("metadata.yml"), to_text(&metadata)?)?;

        let geometry = kernel.serialize(component.geometry())?;
        fs::write(dir.join("geometry.json"), geometry)?;

        if !component.references().is_empty() {
            fs::write(dir.join("netlist.yml"), to_text(&netlist(component))?)?;
        }

        Ok(dir)
    }

    /// Write `root` and every component it depends on, leaves first.
    pub fn save_tree(
        &self,
        kernel: &dyn GeometryKernel,
        root: &Arc<Component>,
    ) -> CacheResult<Vec<String>> {
        let mut saved = Vec::new();
        for c in dependency_order(root) {
            self.save(kernel, &c)?;
            saved.push(c.name().to_string());
        }
        info!(root = %root.name(), count = saved.len(), dir = %self.root_dir.display(), "saved artifacts");
        Ok(saved)
    }

    pub fn load_metadata(&self, name: &str) -> CacheResult<ArtifactMetadata> {
        let path = self.artifact_dir(name).join("metadata.yml");
        if !path.exists() {
            return Err(CacheError::ArtifactNotFound {
                name: name.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn load_netlist(&self, name: &str) -> CacheResult<Netlist> {
        let path = self.artifact_dir(name).join("netlist.yml");
        if !path.exists() {
            return Err(CacheError::ArtifactNotFound {
                name: name.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Names of all stored artifacts, sorted.
    pub fn list(&self) -> CacheResult<Vec<String>> {
        let mut names = Vec::new();
        if !self.root_dir.exists() {
            return Ok(names);
        }
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.path().is_dir() && self.has(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> CacheResult<()> {
        let dir = self.artifact_dir(name);
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}
