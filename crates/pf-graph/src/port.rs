//! Ports and ordered port sets.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use pf_core::{Point, Real, Transform, normalize_angle};
use pf_kernel::Layer;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// What travels through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Optical,
    Electrical,
    /// Alignment/placement marker, carries no signal.
    Placement,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalKind::Optical => "optical",
            SignalKind::Electrical => "electrical",
            SignalKind::Placement => "placement",
        };
        f.write_str(s)
    }
}

impl FromStr for SignalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "optical" => Ok(SignalKind::Optical),
            "electrical" | "dc" => Ok(SignalKind::Electrical),
            "placement" => Ok(SignalKind::Placement),
            other => Err(format!("unknown signal kind '{other}'")),
        }
    }
}

/// Side of a component a port faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    West,
    North,
    East,
    South,
}

impl Side {
    /// Classify an orientation: North is `[45, 135)`, West `[135, 225)`,
    /// South `[225, 315)`, East the rest.
    pub fn of(orientation: Real) -> Side {
        let a = normalize_angle(orientation);
        if (45.0..135.0).contains(&a) {
            Side::North
        } else if (135.0..225.0).contains(&a) {
            Side::West
        } else if (225.0..315.0).contains(&a) {
            Side::South
        } else {
            Side::East
        }
    }
}

/// Named connection point on a component boundary.
///
/// `orientation` points out of the component, in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub center: Point,
    pub orientation: Real,
    pub width: Real,
    pub kind: SignalKind,
    pub layer: Layer,
}

impl Port {
    /// Optical port on the waveguide layer.
    pub fn new(name: impl Into<String>, center: Point, orientation: Real, width: Real) -> Self {
        Self {
            name: name.into(),
            center,
            orientation: normalize_angle(orientation),
            width,
            kind: SignalKind::Optical,
            layer: Layer::WG,
        }
    }

    pub fn with_kind(mut self, kind: SignalKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Port as seen from the parent after placing its owner with `t`.
    pub fn transformed(&self, t: &Transform) -> Self {
        Self {
            center: t.apply_point(&self.center),
            orientation: t.apply_angle(self.orientation),
            ..self.clone()
        }
    }

    pub fn side(&self) -> Side {
        Side::of(self.orientation)
    }
}

/// Ordered port collection with unique names.
///
/// Insertion order is preserved; it is the order routing and netlists see.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortSet {
    ports: Vec<Port>,
}

impl PortSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting duplicate names.
    pub fn from_ports(ports: impl IntoIterator<Item = Port>) -> ModelResult<Self> {
        let mut set = Self::new();
        for port in ports {
            set.add(port)?;
        }
        Ok(set)
    }

    pub fn add(&mut self, port: Port) -> ModelResult<()> {
        if self.contains(&port.name) {
            return Err(ModelError::DuplicatePort { port: port.name });
        }
        self.ports.push(port);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.ports.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn as_slice(&self) -> &[Port] {
        &self.ports
    }

    pub fn into_vec(self) -> Vec<Port> {
        self.ports
    }

    /// Every port moved by `t`.
    pub fn transformed(&self, t: &Transform) -> Self {
        Self {
            ports: self.ports.iter().map(|p| p.transformed(t)).collect(),
        }
    }

    /// Canonical clockwise order starting at the lower-left corner.
    ///
    /// West ports by ascending y, then North by ascending x, East by
    /// descending y, South by descending x. Exact ties fall back to name.
    pub fn sorted_clockwise(&self) -> Self {
        let mut ports = self.ports.clone();
        ports.sort_by(clockwise_cmp);
        Self { ports }
    }
}

impl<'a> IntoIterator for &'a PortSet {
    type Item = &'a Port;
    type IntoIter = core::slice::Iter<'a, Port>;

    fn into_iter(self) -> Self::IntoIter {
        self.ports.iter()
    }
}

fn clockwise_key(port: &Port) -> (Side, Real) {
    let side = port.side();
    let key = match side {
        Side::West => port.center.y,
        Side::North => port.center.x,
        Side::East => -port.center.y,
        Side::South => -port.center.x,
    };
    (side, key)
}

fn clockwise_cmp(a: &Port, b: &Port) -> Ordering {
    let (sa, ka) = clockwise_key(a);
    let (sb, kb) = clockwise_key(b);
    sa.cmp(&sb)
        .then_with(|| ka.total_cmp(&kb))
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::pt;

    fn port(name: &str, x: Real, y: Real, orientation: Real) -> Port {
        Port::new(name, pt(x, y), orientation, 0.5)
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut set = PortSet::new();
        set.add(port("o1", 0.0, 0.0, 180.0)).unwrap();
        let err = set.add(port("o1", 1.0, 0.0, 0.0)).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicatePort {
                port: "o1".to_string()
            }
        );
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn side_classification() {
        assert_eq!(Side::of(0.0), Side::East);
        assert_eq!(Side::of(90.0), Side::North);
        assert_eq!(Side::of(180.0), Side::West);
        assert_eq!(Side::of(-90.0), Side::South);
        assert_eq!(Side::of(330.0), Side::East);
    }

    #[test]
    fn clockwise_walk() {
        let set = PortSet::from_ports([
            port("e_low", 10.0, -1.0, 0.0),
            port("w_high", 0.0, 1.0, 180.0),
            port("s_left", 2.0, -5.0, 270.0),
            port("n_right", 8.0, 5.0, 90.0),
            port("w_low", 0.0, -1.0, 180.0),
            port("e_high", 10.0, 1.0, 0.0),
            port("n_left", 2.0, 5.0, 90.0),
            port("s_right", 8.0, -5.0, 270.0),
        ])
        .unwrap();
        let sorted = set.sorted_clockwise();
        let order: Vec<&str> = sorted
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(
            order,
            [
                "w_low", "w_high", "n_left", "n_right", "e_high", "e_low", "s_right", "s_left"
            ]
        );
    }

    #[test]
    fn ties_break_by_name() {
        let set =
            PortSet::from_ports([port("b", 0.0, 0.0, 180.0), port("a", 0.0, 0.0, 180.0)]).unwrap();
        let sorted = set.sorted_clockwise();
        assert_eq!(sorted.names(), ["a", "b"]);
    }

    #[test]
    fn transformed_port_follows_placement() {
        let p = port("o1", 1.0, 0.0, 0.0);
        let t = Transform {
            rotation: 90.0,
            ..Transform::translate(5.0, 0.0)
        };
        let moved = p.transformed(&t);
        assert_eq!(moved.center, pt(5.0, 1.0));
        assert_eq!(moved.orientation, 90.0);
    }
}
