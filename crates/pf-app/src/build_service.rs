//! Build a generator and run the requested combinators over it.

use std::path::PathBuf;
use std::sync::Arc;

use pf_cache::{Arg, Args, ArtifactStore, CacheStats};
use pf_components::Session;
use pf_compose::{ContainerOverrides, PortSelect, SubFactory, add_padding, containerize, extend_ports};
use pf_core::pt;
use pf_graph::{Component, SignalKind};
use pf_routing::{ArraySpec, RoutingStrategy, route_to_array};
use serde_json::Value;
use tracing::info;

use crate::config::LayoutConfig;
use crate::error::{AppError, AppResult};

/// Parse one `key=value` setting. The value is read as a YAML scalar or
/// flow sequence, so `10`, `true`, `[1, 0]` and `strip` all work; an empty
/// value is null.
pub fn parse_setting(raw: &str) -> AppResult<(String, Arg)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| AppError::InvalidInput(format!("expected key=value, got '{raw}'")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::InvalidInput(format!("empty key in '{raw}'")));
    }
    let value = value.trim();
    let parsed: Value = if value.is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(value)
            .map_err(|e| AppError::InvalidInput(format!("bad value for '{key}': {e}")))?
    };
    Ok((key.to_string(), Arg::from(parsed)))
}

/// Parse every setting into one argument set. Later keys win.
pub fn parse_settings<S: AsRef<str>>(raw: &[S]) -> AppResult<Args> {
    let mut args = Args::new();
    for item in raw {
        let (key, value) = parse_setting(item.as_ref())?;
        args.insert(key, value);
    }
    Ok(args)
}

/// Routing to a periodic array. Unset fields come from the config's array.
#[derive(Debug, Clone, Default)]
pub struct RouteRequest {
    pub count: Option<usize>,
    pub pitch: Option<f64>,
    pub origin: Option<(f64, f64)>,
    pub orientation: Option<f64>,
    pub strategy: Option<RoutingStrategy>,
}

impl RouteRequest {
    fn array(&self, config: &LayoutConfig) -> ArraySpec {
        let base = &config.array;
        let origin = self
            .origin
            .map(|(x, y)| pt(x, y))
            .unwrap_or(base.origin);
        ArraySpec::new(
            origin,
            self.pitch.unwrap_or(base.pitch),
            self.count.unwrap_or(base.count),
            self.orientation.unwrap_or(base.orientation),
        )
        .with_mode_width(base.mode_width)
        .with_kind(base.kind)
        .with_layer(base.layer)
    }
}

/// Request to build one component.
///
/// Steps run in a fixed order: generator, optical port tapers, padding,
/// array routing, save.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub generator: String,
    pub args: Args,
    /// Taper every optical port.
    pub tapers: bool,
    pub pad: bool,
    pub route: Option<RouteRequest>,
    /// Save the result and its dependencies here.
    pub out: Option<PathBuf>,
}

impl BuildRequest {
    pub fn new(generator: impl Into<String>, args: Args) -> Self {
        Self {
            generator: generator.into(),
            args,
            tapers: false,
            pad: false,
            route: None,
            out: None,
        }
    }
}

/// Response from a build.
#[derive(Debug, Clone)]
pub struct BuildResponse {
    pub component: Arc<Component>,
    /// Names written to the store, leaves first. Empty when nothing was saved.
    pub saved: Vec<String>,
    pub stats: CacheStats,
}

/// Registered generator ids, sorted.
pub fn list_generators(session: &Session) -> Vec<String> {
    session.library().ids().into_iter().map(str::to_string).collect()
}

/// Default arguments of `generator_id`, as settings.
pub fn generator_defaults(session: &Session, generator_id: &str) -> AppResult<pf_graph::Settings> {
    Ok(session.library().get(generator_id)?.defaults().to_settings())
}

/// Run `request` against `session`.
pub fn build(
    session: &Session,
    request: &BuildRequest,
    config: &LayoutConfig,
) -> AppResult<BuildResponse> {
    let mut component = session.build(&request.generator, request.args.clone())?;

    if request.tapers {
        component = extend_ports(
            session,
            &component,
            &SubFactory::taper(),
            &PortSelect::Kind(SignalKind::Optical),
        )?;
    }

    if request.pad {
        component = containerize(
            session,
            Some(&component),
            &add_padding(),
            Args::new(),
            &ContainerOverrides::default(),
        )?;
    }

    if let Some(route) = &request.route {
        let array = route.array(config);
        let strategy = route.strategy.unwrap_or(config.strategy);
        component = route_to_array(session, &component, &array, strategy, &config.router)?;
    }

    let saved = match &request.out {
        Some(dir) => {
            let store = ArtifactStore::new(dir.clone())?;
            store.save_tree(session.kernel(), &component)?
        }
        None => Vec::new(),
    };

    let stats = session.cache().stats();
    info!(
        component = %component.name(),
        ports = component.ports().len(),
        saved = saved.len(),
        hits = stats.hits,
        builds = stats.builds,
        "build finished"
    );
    Ok(BuildResponse {
        component,
        saved,
        stats,
    })
}
