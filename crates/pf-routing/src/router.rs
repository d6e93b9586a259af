//! `route_to_array`: connect a component's ports to an external array.

use std::sync::Arc;

use pf_cache::{Arg, Args, CacheError, fingerprint};
use pf_components::Session;
use pf_core::Transform;
use pf_graph::{Component, ComponentBuilder, Port};
use rayon::prelude::*;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::array::ArraySpec;
use crate::collision::check_clearance;
use crate::error::{RouteError, RouteResult};
use crate::plan::plan_routes;
use crate::strategy::{RouteConfig, RoutingStrategy};

fn json_arg<T: serde::Serialize>(value: &T) -> RouteResult<Arg> {
    Ok(Arg::from(serde_json::to_value(value).map_err(CacheError::from)?))
}

/// Route every port of `component` to `array`, in the slot order of
/// [`plan_routes`](crate::plan_routes).
///
/// The result references `component` and one realized route per port and
/// exposes one port per array slot, `slot0`, `slot1`, ..., facing away from
/// the component. Source ports are not re-exposed.
///
/// Cached under the component, the array, the strategy and the config.
pub fn route_to_array(
    session: &Session,
    component: &Arc<Component>,
    array: &ArraySpec,
    strategy: RoutingStrategy,
    config: &RouteConfig,
) -> RouteResult<Arc<Component>> {
    let key = Args::new()
        .with("component", Arc::clone(component))
        .with("array", json_arg(array)?)
        .with("strategy", strategy.as_str())
        .with("config", json_arg(config)?);
    let fp = fingerprint("route_to_array", &key)?;
    let name = format!("{}_route_to_array_{}", component.name(), fp.short());

    session.cached(fp, &name, || {
        let routes = plan_routes(component, array, strategy, config)?;
        check_clearance(&routes, config.separation, config.arc_segments)?;
        info!(
            component = %component.name(),
            strategy = %strategy,
            routes = routes.len(),
            slots = array.count,
            "routing to array"
        );

        let realized = routes
            .par_iter()
            .map(|r| r.realize(session, config.arc_segments))
            .collect::<RouteResult<Vec<_>>>()?;

        let mut b = ComponentBuilder::new(name.as_str());
        b.add_ref(Arc::clone(component), Transform::identity())?;
        for (route, piece) in routes.iter().zip(realized) {
            debug!(port = %route.port, slot = route.slot, length = route.length(), "route");
            b.add_ref(piece, route.placement())?;
        }
        for (k, at) in array.slots().into_iter().enumerate() {
            b.add_port(
                Port::new(format!("slot{k}"), at, array.travel(), array.mode_width)
                    .with_kind(array.kind)
                    .with_layer(array.layer),
            )?;
        }

        b.set_setting(
            "component",
            Value::Object(component.get_settings().clone().into_iter().collect()),
        );
        b.set_setting("array", serde_json::to_value(array).map_err(CacheError::from)?);
        b.set_setting("strategy", json!(strategy.as_str()));
        b.set_setting("config", serde_json::to_value(config).map_err(CacheError::from)?);
        b.set_setting(
            "route_lengths",
            Value::Array(routes.iter().map(|r| json!(r.length())).collect()),
        );
        b.set_setting(
            "assignment",
            Value::Object(
                routes
                    .iter()
                    .map(|r| (r.port.clone(), json!(r.slot)))
                    .collect(),
            ),
        );
        b.merge_provenance(component.provenance());
        Ok::<_, RouteError>(b)
    })
}
