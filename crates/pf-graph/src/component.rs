//! Sealed components and placed references.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use pf_core::{BBox, Fingerprint, Transform};
use pf_kernel::{GeometryHandle, GeometryKernel, KernelResult};

use crate::error::{ModelError, ModelResult};
use crate::port::{Port, PortSet};

/// Build settings / provenance record: JSON values keyed by name.
pub type Settings = BTreeMap<String, serde_json::Value>;

/// Placement of a shared component inside a parent.
#[derive(Debug, Clone)]
pub struct Reference {
    pub target: Arc<Component>,
    pub transform: Transform,
}

impl Reference {
    pub fn new(target: Arc<Component>, transform: Transform) -> Self {
        Self { target, transform }
    }

    /// Target port expressed in the parent's coordinates.
    pub fn port(&self, name: &str) -> Option<Port> {
        self.target
            .port(name)
            .map(|p| p.transformed(&self.transform))
    }

    /// All target ports in the parent's coordinates, in target order.
    pub fn ports(&self) -> PortSet {
        self.target.ports().transformed(&self.transform)
    }
}

/// Immutable geometric artifact.
///
/// Components are only created through [`crate::ComponentBuilder::build`] and
/// shared as `Arc<Component>`; nothing mutates one after sealing.
#[derive(Debug)]
pub struct Component {
    pub(crate) name: String,
    pub(crate) fingerprint: Option<Fingerprint>,
    pub(crate) geometry: GeometryHandle,
    pub(crate) ports: PortSet,
    pub(crate) settings: Settings,
    pub(crate) references: Vec<Reference>,
    pub(crate) provenance: Settings,
}

impl Component {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fingerprint of the invocation that produced this component, if cached.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    pub fn geometry(&self) -> GeometryHandle {
        self.geometry
    }

    pub fn ports(&self) -> &PortSet {
        &self.ports
    }

    /// Ports in their stored order.
    pub fn get_ports(&self) -> Vec<Port> {
        self.ports.as_slice().to_vec()
    }

    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn provenance(&self) -> &Settings {
        &self.provenance
    }

    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.get(name)
    }

    pub fn require_port(&self, name: &str) -> ModelResult<&Port> {
        self.port(name).ok_or_else(|| ModelError::UnknownPort {
            component: self.name.clone(),
            port: name.to_string(),
        })
    }

    /// True if any component reachable through references is named `name`.
    pub fn depends_on(&self, name: &str) -> bool {
        let mut seen: HashSet<*const Component> = HashSet::new();
        let mut stack: Vec<&Component> = self.references.iter().map(|r| &*r.target).collect();
        while let Some(c) = stack.pop() {
            if !seen.insert(c as *const Component) {
                continue;
            }
            if c.name == name {
                return true;
            }
            stack.extend(c.references.iter().map(|r| &*r.target));
        }
        false
    }

    pub fn bbox(&self, kernel: &dyn GeometryKernel) -> KernelResult<Option<BBox>> {
        kernel.bounding_box(self.geometry)
    }
}
