//! Container combinator: wrap a component, keeping its contract.

use std::sync::Arc;

use pf_cache::{Arg, Args, fingerprint};
use pf_components::{Params, Session};
use pf_graph::{Component, ComponentBuilder, PortSet};
use serde_json::Value;
use tracing::debug;

use crate::error::{ComposeError, ComposeResult};

type ContainerBody =
    dyn Fn(&Session, &Arc<Component>, &Params) -> ComposeResult<ComponentBuilder> + Send + Sync;

/// A wrapping operation: declared defaults plus a body that lays out the
/// new component around the source.
///
/// The body only produces contents; `containerize` applies the port,
/// settings and provenance rules and caches the result. Bodies create their
/// builder with `params.name()`, the final name of the result.
#[derive(Clone)]
pub struct ContainerFn {
    pub id: String,
    pub defaults: Args,
    body: Arc<ContainerBody>,
}

impl ContainerFn {
    pub fn new<F>(id: impl Into<String>, defaults: Args, body: F) -> Self
    where
        F: Fn(&Session, &Arc<Component>, &Params) -> ComposeResult<ComponentBuilder>
            + Send
            + Sync
            + 'static,
    {
        Self {
            id: id.into(),
            defaults,
            body: Arc::new(body),
        }
    }
}

impl std::fmt::Debug for ContainerFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerFn")
            .field("id", &self.id)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

/// Caller overrides applied on top of the container's own behaviour.
///
/// `ports` replaces the result's ports only when it is `Some` and non-empty.
#[derive(Debug, Clone, Default)]
pub struct ContainerOverrides {
    pub ports: Option<PortSet>,
    pub name: Option<String>,
}

/// Find the component to wrap and strip it from `args`.
///
/// Order: explicit `source`, then named `component`, then the first
/// positional component argument.
fn take_source(
    source: Option<&Arc<Component>>,
    args: &mut Args,
    combinator: &str,
) -> ComposeResult<Arc<Component>> {
    if let Some(s) = source {
        args.remove("component");
        return Ok(Arc::clone(s));
    }
    if let Some(Arg::Built(c)) = args.get("component") {
        let c = Arc::clone(c);
        args.remove("component");
        return Ok(c);
    }
    let position = args
        .positional()
        .iter()
        .position(|a| matches!(a, Arg::Built(_)));
    if let Some(Arg::Built(c)) = position.and_then(|i| args.remove_positional(i)) {
        return Ok(c);
    }
    Err(ComposeError::MissingSource {
        combinator: combinator.to_string(),
    })
}

/// Wrap a source component with `container`.
///
/// - settings are the container defaults overlaid with `args` (supplied
///   values win, so they record the parameters actually used), plus
///   `component` holding the source's settings
/// - ports: a non-empty `overrides.ports` wins, else ports the body declared,
///   else a copy of the source's ports
/// - source provenance is copied where the result has no value of its own
///
/// Cached under the container id, its arguments, the source and the
/// overrides; the default name is `{source}_{id}_{short fingerprint}`.
pub fn containerize(
    session: &Session,
    source: Option<&Arc<Component>>,
    container: &ContainerFn,
    args: Args,
    overrides: &ContainerOverrides,
) -> ComposeResult<Arc<Component>> {
    let mut args = session.resolve(&args)?;
    let source = take_source(source, &mut args, &container.id)?;
    let params_args = args.merged_over(&container.defaults);

    let mut key = params_args.clone().with("component", Arc::clone(&source));
    if let Some(ports) = overrides.ports.as_ref().filter(|p| !p.is_empty()) {
        key.insert(
            "$ports",
            Arg::List(ports.iter().cloned().map(Arg::Port).collect()),
        );
    }
    if let Some(name) = &overrides.name {
        key.insert("$name", name.as_str());
    }
    let fp = fingerprint(&container.id, &key)?;
    let name = overrides
        .name
        .clone()
        .unwrap_or_else(|| format!("{}_{}_{}", source.name(), container.id, fp.short()));

    session.cached(fp, &name, || {
        debug!(container = %container.id, source = %source.name(), name = %name, "containerize");
        let params = Params::new(container.id.clone(), params_args).named(name.as_str());
        let mut b = (container.body)(session, &source, &params)?;

        match overrides.ports.as_ref().filter(|p| !p.is_empty()) {
            Some(ports) => b.replace_ports(ports.clone()),
            None if b.ports().is_empty() => b.replace_ports(source.ports().clone()),
            None => {}
        }

        let derived = std::mem::take(b.settings_mut());
        let mut settings = params.args().to_settings();
        settings.extend(derived);
        settings.insert(
            "component".to_string(),
            Value::Object(source.get_settings().clone().into_iter().collect()),
        );
        *b.settings_mut() = settings;
        b.merge_provenance(source.provenance());
        Ok(b)
    })
}

/// Higher-order form: a builder that wraps whatever component arrives in
/// its arguments (named `component` or first positional).
pub fn container(
    c: ContainerFn,
) -> impl Fn(&Session, Args) -> ComposeResult<Arc<Component>> + Send + Sync {
    move |session: &Session, args: Args| {
        containerize(session, None, &c, args, &ContainerOverrides::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::{Transform, pt};
    use pf_graph::Port;

    fn passthrough() -> ContainerFn {
        ContainerFn::new("wrap", Args::new().with("tag", "a"), |_s, source, p| {
            let mut b = ComponentBuilder::new(p.name());
            b.add_ref(Arc::clone(source), Transform::identity())?;
            Ok(b)
        })
    }

    #[test]
    fn source_from_named_positional_or_missing() {
        let s = Session::in_memory();
        let wg = s.build("straight", Args::new()).unwrap();
        let c = passthrough();

        let named = containerize(
            &s,
            None,
            &c,
            Args::new().with("component", wg.clone()),
            &ContainerOverrides::default(),
        )
        .unwrap();
        let positional = containerize(
            &s,
            None,
            &c,
            Args::new().with_positional(wg.clone()),
            &ContainerOverrides::default(),
        )
        .unwrap();
        assert!(Arc::ptr_eq(&named, &positional));

        let err = containerize(&s, None, &c, Args::new(), &ContainerOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ComposeError::MissingSource { ref combinator } if combinator == "wrap"));
    }

    #[test]
    fn override_ports_and_name() {
        let s = Session::in_memory();
        let wg = s.build("straight", Args::new()).unwrap();
        let ports = PortSet::from_ports([Port::new("in", pt(0.0, 0.0), 180.0, 0.5)]).unwrap();
        let out = containerize(
            &s,
            Some(&wg),
            &passthrough(),
            Args::new(),
            &ContainerOverrides {
                ports: Some(ports),
                name: Some("wrapped_wg".to_string()),
            },
        )
        .unwrap();
        assert_eq!(out.name(), "wrapped_wg");
        assert_eq!(out.ports().names(), ["in"]);

        // an empty override is ignored
        let inherited = containerize(
            &s,
            Some(&wg),
            &passthrough(),
            Args::new(),
            &ContainerOverrides {
                ports: Some(PortSet::new()),
                name: None,
            },
        )
        .unwrap();
        assert_eq!(inherited.ports(), wg.ports());
    }
}
