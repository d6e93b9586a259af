//! Hierarchy walks: dependency order and netlist extraction.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use pf_core::{GRID, Real, angle_difference};
use serde::{Deserialize, Serialize};

use crate::component::{Component, Settings};
use crate::port::Port;

/// Every distinct component reachable from `root`, children before parents.
///
/// `root` is always last. Components are deduplicated by name, so a leaf
/// placed many times appears once.
pub fn dependency_order(root: &Arc<Component>) -> Vec<Arc<Component>> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    visit(root, &mut seen, &mut order);
    order
}

fn visit(c: &Arc<Component>, seen: &mut HashSet<String>, order: &mut Vec<Arc<Component>>) {
    if !seen.insert(c.name().to_string()) {
        return;
    }
    for r in c.references() {
        visit(&r.target, seen, order);
    }
    order.push(Arc::clone(c));
}

/// Instance record of a netlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetlistInstance {
    pub component: String,
    pub settings: Settings,
}

/// Where an instance sits in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: Real,
    pub y: Real,
    pub rotation: Real,
    pub mirror: bool,
}

/// One level of hierarchy as instances, placements and port connectivity.
///
/// Connection and port entries use `"instance,port"` strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Netlist {
    pub name: String,
    pub instances: BTreeMap<String, NetlistInstance>,
    pub placements: BTreeMap<String, Placement>,
    pub connections: BTreeMap<String, String>,
    pub ports: BTreeMap<String, String>,
}

fn coincident(a: &Port, b: &Port) -> bool {
    (a.center - b.center).norm() < GRID / 2.0
}

/// Extract the netlist of `component`'s direct references.
///
/// Two instance ports are connected when they coincide and face each other.
/// A top-level port maps to the instance port it was exposed from (same
/// position and orientation).
pub fn netlist(component: &Component) -> Netlist {
    let mut out = Netlist {
        name: component.name().to_string(),
        ..Netlist::default()
    };

    let mut placed: Vec<(String, Vec<Port>)> = Vec::new();
    for (i, r) in component.references().iter().enumerate() {
        let inst = format!("{}_{}", r.target.name(), i);
        out.instances.insert(
            inst.clone(),
            NetlistInstance {
                component: r.target.name().to_string(),
                settings: r.target.get_settings().clone(),
            },
        );
        out.placements.insert(
            inst.clone(),
            Placement {
                x: r.transform.translation.x,
                y: r.transform.translation.y,
                rotation: r.transform.rotation,
                mirror: r.transform.mirror,
            },
        );
        placed.push((inst, r.ports().into_vec()));
    }

    for (i, (a_name, a_ports)) in placed.iter().enumerate() {
        for (b_name, b_ports) in &placed[i + 1..] {
            for pa in a_ports {
                for pb in b_ports {
                    if coincident(pa, pb) && angle_difference(pa.orientation, pb.orientation) > 179.0 {
                        out.connections.insert(
                            format!("{},{}", a_name, pa.name),
                            format!("{},{}", b_name, pb.name),
                        );
                    }
                }
            }
        }
    }

    for top in component.ports() {
        let source = placed.iter().find_map(|(inst, ports)| {
            ports
                .iter()
                .find(|p| coincident(p, top) && angle_difference(p.orientation, top.orientation) < 1.0)
                .map(|p| format!("{},{}", inst, p.name))
        });
        if let Some(source) = source {
            out.ports.insert(top.name.clone(), source);
        }
    }

    out
}
