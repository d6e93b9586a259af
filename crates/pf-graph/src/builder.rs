//! Mutable construction stage of a component.

use std::sync::Arc;

use pf_core::{Fingerprint, Point, Transform};
use pf_kernel::{GeometryKernel, Layer};
use tracing::trace;

use crate::component::{Component, Reference, Settings};
use crate::error::{ModelError, ModelResult};
use crate::port::{Port, PortSet};
use crate::validate;

/// Builder for a single component.
///
/// Add polygons, references and ports, then call `build()` to allocate the
/// geometry in a kernel and seal the result into an immutable `Component`.
#[derive(Debug, Default)]
pub struct ComponentBuilder {
    name: String,
    fingerprint: Option<Fingerprint>,
    polygons: Vec<(Vec<Point>, Layer)>,
    references: Vec<Reference>,
    ports: PortSet,
    settings: Settings,
    provenance: Settings,
}

impl ComponentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename, re-running the cycle check against existing references.
    pub fn rename(&mut self, name: impl Into<String>) -> ModelResult<()> {
        let name = name.into();
        for r in &self.references {
            check_cycle(&name, &r.target)?;
        }
        self.name = name;
        Ok(())
    }

    pub fn add_polygon(&mut self, points: Vec<Point>, layer: Layer) -> &mut Self {
        self.polygons.push((points, layer));
        self
    }

    /// Place `target` inside this component and return the reference index.
    ///
    /// Fails with `Cycle` if `target` is, or transitively contains, a
    /// component named like this builder.
    pub fn add_ref(&mut self, target: Arc<Component>, transform: Transform) -> ModelResult<usize> {
        check_cycle(&self.name, &target)?;
        self.references.push(Reference::new(target, transform));
        Ok(self.references.len() - 1)
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn add_port(&mut self, port: Port) -> ModelResult<()> {
        self.ports.add(port)
    }

    pub fn add_ports(&mut self, ports: impl IntoIterator<Item = Port>) -> ModelResult<()> {
        for port in ports {
            self.ports.add(port)?;
        }
        Ok(())
    }

    pub fn ports(&self) -> &PortSet {
        &self.ports
    }

    pub fn replace_ports(&mut self, ports: PortSet) {
        self.ports = ports;
    }

    pub fn sort_ports_clockwise(&mut self) {
        self.ports = self.ports.sorted_clockwise();
    }

    pub fn set_setting(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.settings.insert(key.into(), value);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn set_provenance(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.provenance.insert(key.into(), value);
    }

    /// Copy entries from `other` whose keys are not set yet.
    pub fn merge_provenance(&mut self, other: &Settings) {
        for (k, v) in other {
            self.provenance
                .entry(k.clone())
                .or_insert_with(|| v.clone());
        }
    }

    pub fn provenance(&self) -> &Settings {
        &self.provenance
    }

    pub fn set_fingerprint(&mut self, fingerprint: Fingerprint) {
        self.fingerprint = Some(fingerprint);
    }

    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    /// Allocate geometry and seal.
    pub fn build(self, kernel: &dyn GeometryKernel) -> ModelResult<Component> {
        validate::validate_name(&self.name)?;
        validate::validate_ports(&self.ports)?;

        let mut parts = Vec::with_capacity(self.polygons.len() + self.references.len());
        for (points, layer) in &self.polygons {
            parts.push(kernel.allocate_polygon(points, *layer)?);
        }
        for r in &self.references {
            parts.push(kernel.instantiate(r.target.geometry(), &r.transform)?);
        }
        let geometry = kernel.compose(&parts)?;
        trace!(
            component = %self.name,
            polygons = self.polygons.len(),
            references = self.references.len(),
            "sealed component"
        );

        Ok(Component {
            name: self.name,
            fingerprint: self.fingerprint,
            geometry,
            ports: self.ports,
            settings: self.settings,
            references: self.references,
            provenance: self.provenance,
        })
    }
}

fn check_cycle(name: &str, target: &Component) -> ModelResult<()> {
    if target.name() == name || target.depends_on(name) {
        return Err(ModelError::Cycle {
            component: name.to_string(),
            target: target.name().to_string(),
        });
    }
    Ok(())
}
