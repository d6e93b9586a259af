//! Port extension: attach a sub-component to selected ports.

use std::fmt;
use std::sync::Arc;

use pf_cache::{Arg, Args, fingerprint};
use pf_components::Session;
use pf_core::Transform;
use pf_graph::{Component, ComponentBuilder, Port, SignalKind};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{ComposeError, ComposeResult};

type PortPredicate = dyn Fn(&Port) -> bool + Send + Sync;

/// Which ports of a component to extend.
#[derive(Clone, Default)]
pub enum PortSelect {
    #[default]
    All,
    Names(Vec<String>),
    Kind(SignalKind),
    /// Arbitrary filter. Only `label` takes part in the fingerprint, so two
    /// predicates must not share a label unless they select the same ports.
    Where {
        label: String,
        predicate: Arc<PortPredicate>,
    },
}

impl PortSelect {
    pub fn where_fn(
        label: impl Into<String>,
        predicate: impl Fn(&Port) -> bool + Send + Sync + 'static,
    ) -> Self {
        PortSelect::Where {
            label: label.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, port: &Port) -> bool {
        match self {
            PortSelect::All => true,
            PortSelect::Names(names) => names.iter().any(|n| *n == port.name),
            PortSelect::Kind(kind) => port.kind == *kind,
            PortSelect::Where { predicate, .. } => predicate(port),
        }
    }

    /// Stable description used as the cache key.
    pub fn label(&self) -> String {
        match self {
            PortSelect::All => "all".to_string(),
            PortSelect::Names(names) => {
                let mut sorted = names.clone();
                sorted.sort();
                sorted.dedup();
                format!("names:{}", sorted.join(","))
            }
            PortSelect::Kind(kind) => format!("kind:{kind}"),
            PortSelect::Where { label, .. } => format!("where:{label}"),
        }
    }
}

impl fmt::Debug for PortSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// How to build the piece attached to each port.
///
/// The generator is called with `width_param` set to the port's width;
/// `dock_port` is placed on the original port and `exposed_port` becomes
/// the new boundary port.
#[derive(Debug, Clone)]
pub struct SubFactory {
    pub generator: String,
    pub args: Args,
    pub width_param: String,
    pub dock_port: String,
    pub exposed_port: String,
}

impl SubFactory {
    /// Linear taper whose wide end matches the port.
    pub fn taper() -> Self {
        Self {
            generator: "taper".to_string(),
            args: Args::new(),
            width_param: "width2".to_string(),
            dock_port: "o2".to_string(),
            exposed_port: "o1".to_string(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.args.insert(key, value);
        self
    }

    fn key(&self) -> Arg {
        let mut map = self.args.named().clone();
        if !self.args.positional().is_empty() {
            map.insert("$positional".to_string(), Arg::List(self.args.positional().to_vec()));
        }
        Arg::Map(
            [
                ("generator".to_string(), Arg::from(self.generator.as_str())),
                ("args".to_string(), Arg::Map(map)),
                ("width_param".to_string(), Arg::from(self.width_param.as_str())),
                ("dock_port".to_string(), Arg::from(self.dock_port.as_str())),
                ("exposed_port".to_string(), Arg::from(self.exposed_port.as_str())),
            ]
            .into_iter()
            .collect(),
        )
    }
}

/// Attach `sub` to every port of `component` matched by `select`.
///
/// The result references `component` and one sub-component per selected
/// port. Each extended port keeps its name and now sits at the
/// sub-component's exposed end; unselected ports pass through. Ports come
/// out in clockwise order, and the set of port names never changes.
pub fn extend_ports(
    session: &Session,
    component: &Arc<Component>,
    sub: &SubFactory,
    select: &PortSelect,
) -> ComposeResult<Arc<Component>> {
    if let PortSelect::Names(names) = select {
        if let Some(missing) = names.iter().find(|n| !component.ports().contains(n)) {
            return Err(ComposeError::UnknownPortSelection {
                component: component.name().to_string(),
                port: missing.clone(),
            });
        }
    }

    let key = Args::new()
        .with("component", Arc::clone(component))
        .with("sub", sub.key())
        .with("select", select.label());
    let fp = fingerprint("extend_ports", &key)?;
    let name = format!("{}_extend_ports_{}", component.name(), fp.short());

    session.cached(fp, &name, || {
        let mut b = ComponentBuilder::new(name.as_str());
        b.add_ref(Arc::clone(component), Transform::identity())?;

        let mut extended = 0usize;
        for p in component.ports() {
            if !select.matches(p) {
                b.add_port(p.clone())?;
                continue;
            }
            let args = sub.args.clone().with(sub.width_param.as_str(), p.width);
            let piece = session.build(&sub.generator, args)?;
            let dock = piece.require_port(&sub.dock_port)?;
            let t = Transform::connect(&dock.center, dock.orientation, &p.center, p.orientation, false);
            let exposed = piece.require_port(&sub.exposed_port)?.transformed(&t);
            b.add_ref(piece, t)?;
            b.add_port(exposed.renamed(p.name.as_str()))?;
            extended += 1;
        }
        b.sort_ports_clockwise();
        debug!(component = %component.name(), sub = %sub.generator, extended, "extend_ports");

        b.set_setting(
            "component",
            Value::Object(component.get_settings().clone().into_iter().collect()),
        );
        b.set_setting("extension", json!(sub.generator));
        b.set_setting(
            "extension_settings",
            Value::Object(sub.args.to_settings().into_iter().collect()),
        );
        b.set_setting("select", json!(select.label()));
        b.merge_provenance(component.provenance());
        Ok(b)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_ignore_name_order() {
        let a = PortSelect::Names(vec!["o2".into(), "o1".into()]);
        let b = PortSelect::Names(vec!["o1".into(), "o2".into(), "o1".into()]);
        assert_eq!(a.label(), b.label());
        assert_eq!(PortSelect::default().label(), "all");
        assert_eq!(PortSelect::Kind(SignalKind::Electrical).label(), "kind:electrical");
    }

    #[test]
    fn selection_by_predicate() {
        let east = PortSelect::where_fn("east", |p: &Port| p.orientation == 0.0);
        let p = Port::new("o2", pf_core::pt(1.0, 0.0), 0.0, 0.5);
        assert!(east.matches(&p));
        assert!(!east.matches(&p.transformed(&Transform::rotate(90.0))));
        assert_eq!(format!("{east:?}"), "where:east");
    }

    #[test]
    fn taper_extension_moves_ports_outward() {
        let s = Session::in_memory();
        let wg = s.build("straight", Args::new().with("width", 1.0)).unwrap();
        let ext = extend_ports(&s, &wg, &SubFactory::taper(), &PortSelect::All).unwrap();

        let o1 = ext.port("o1").unwrap();
        let o2 = ext.port("o2").unwrap();
        assert!((o1.center - pf_core::pt(-10.0, 0.0)).norm() < 1e-9);
        assert_eq!(o1.orientation, 180.0);
        assert!((o2.center - pf_core::pt(20.0, 0.0)).norm() < 1e-9);
        assert_eq!(o2.orientation, 0.0);
        assert_eq!(o1.width, 0.5);
        // one shared taper, docked at both ends
        assert_eq!(ext.references().len(), 3);
    }
}
