//! Integration tests for pf-routing.

use std::sync::Arc;

use pf_cache::Args;
use pf_components::Session;
use pf_core::{Point, pt};
use pf_graph::{Component, ComponentBuilder, Port};
use pf_routing::{
    ArraySpec, PathElement, RouteConfig, RouteError, RoutingStrategy, check_clearance,
    plan_routes, route_to_array,
};
use proptest::prelude::*;
use serde_json::json;

/// Component with east-facing ports at the given points, in order.
fn emitter(s: &Session, name: &str, ports: &[(f64, f64)], width: f64) -> Arc<Component> {
    let mut b = ComponentBuilder::new(name);
    for (i, (x, y)) in ports.iter().enumerate() {
        b.add_port(Port::new(format!("o{}", i + 1), pt(*x, *y), 0.0, width))
            .unwrap();
    }
    b.set_provenance("test", json!("routing"));
    Arc::new(b.build(s.kernel()).unwrap())
}

/// Slots on the line x = 100, stepping +y, facing back west.
fn east_array(pitch: f64, count: usize) -> ArraySpec {
    ArraySpec::new(pt(100.0, 0.0), pitch, count, 180.0)
}

fn close(a: Point, b: Point) -> bool {
    (a - b).norm() < 1e-6
}

#[test]
fn two_ports_direct_land_on_first_slots() {
    let s = Session::in_memory();
    let c = emitter(&s, "pair", &[(0.0, 0.0), (0.0, 10.0)], 0.5);
    let array = east_array(5.0, 4);
    let config = RouteConfig::default();

    let routes = plan_routes(&c, &array, RoutingStrategy::Direct, &config).unwrap();
    assert_eq!(routes.len(), 2);
    for (k, r) in routes.iter().enumerate() {
        let (end, heading) = r.end();
        assert!(close(end, array.slot(k)), "route {k} ended at {end}");
        assert!(pf_core::angle_difference(heading, 0.0) < 1e-9);
        assert_eq!(r.slot, k);
    }
    assert_eq!(routes[0].elements, [PathElement::Straight { length: 100.0 }]);
    assert!(check_clearance(&routes, config.separation, config.arc_segments).is_ok());

    let routed = route_to_array(&s, &c, &array, RoutingStrategy::Direct, &config).unwrap();
    let names: Vec<&str> = routed.ports().names();
    assert_eq!(names, ["slot0", "slot1", "slot2", "slot3"]);
    assert_eq!(routed.port("slot1").unwrap().center, pt(100.0, 5.0));
    assert_eq!(routed.port("slot1").unwrap().orientation, 0.0);
    // the source plus one reference per route
    assert_eq!(routed.references().len(), 3);
    assert!(Arc::ptr_eq(&routed.references()[0].target, &c));

    let settings = routed.get_settings();
    assert_eq!(settings["strategy"], json!("direct"));
    assert_eq!(settings["route_lengths"].as_array().map(Vec::len), Some(2));
    assert_eq!(settings["assignment"]["o2"], json!(1));
    assert_eq!(routed.provenance()["test"], json!("routing"));

    let again = route_to_array(&s, &c, &array, RoutingStrategy::Direct, &config).unwrap();
    assert!(Arc::ptr_eq(&routed, &again));
}

#[test]
fn realized_routes_end_on_slots() {
    let s = Session::in_memory();
    let c = emitter(&s, "pair", &[(0.0, 0.0), (0.0, 10.0)], 0.5);
    let array = east_array(5.0, 4);
    let routed =
        route_to_array(&s, &c, &array, RoutingStrategy::Direct, &RouteConfig::default()).unwrap();
    for (k, r) in routed.references()[1..].iter().enumerate() {
        let o2 = r.port("o2").unwrap();
        assert!(close(o2.center, array.slot(k)));
    }
}

#[test]
fn array_too_small_boundary() {
    let s = Session::in_memory();
    let c = emitter(&s, "trio", &[(0.0, 0.0), (0.0, 10.0), (0.0, 20.0)], 0.5);
    let config = RouteConfig::default();

    let err = plan_routes(&c, &east_array(10.0, 2), RoutingStrategy::Direct, &config).unwrap_err();
    assert!(matches!(err, RouteError::ArrayTooSmall { ports: 3, slots: 2 }));

    let routes = plan_routes(&c, &east_array(8.0, 3), RoutingStrategy::Direct, &config).unwrap();
    assert_eq!(routes.len(), 3);
    for r in &routes {
        if let Some(radius) = r.min_radius() {
            assert!(radius >= config.min_bend_radius);
        }
    }
}

#[test]
fn assignment_ignores_port_insertion_order() {
    let s = Session::in_memory();
    let ascending = emitter(&s, "ascending", &[(0.0, 0.0), (0.0, 10.0), (0.0, 20.0)], 0.5);
    let mut b = ComponentBuilder::new("descending");
    for (name, y) in [("o3", 20.0), ("o1", 0.0), ("o2", 10.0)] {
        b.add_port(Port::new(name, pt(0.0, y), 0.0, 0.5)).unwrap();
    }
    let descending = Arc::new(b.build(s.kernel()).unwrap());

    let config = RouteConfig::default();
    let array = east_array(5.0, 3);
    for strategy in [RoutingStrategy::Direct, RoutingStrategy::Staggered, RoutingStrategy::Looped] {
        let a = plan_routes(&ascending, &array, strategy, &config).unwrap();
        let b = plan_routes(&descending, &array, strategy, &config).unwrap();
        assert_eq!(a, b, "{strategy:?}");
        let order: Vec<&str> = a.iter().map(|r| r.port.as_str()).collect();
        assert_eq!(order, ["o1", "o2", "o3"]);
    }

    // neighbours along the array axis never swap slots, so nothing crosses
    let routed = route_to_array(&s, &descending, &array, RoutingStrategy::Direct, &config).unwrap();
    assert_eq!(routed.get_settings()["assignment"]["o3"], json!(2));
}

#[test]
fn overlapping_leads_collide() {
    let s = Session::in_memory();
    // o2 sits behind o1 on the same line, so its lead runs over o1
    let c = emitter(&s, "shadowed", &[(0.0, 0.0), (-20.0, 0.0)], 0.5);
    let err = route_to_array(
        &s,
        &c,
        &east_array(5.0, 2),
        RoutingStrategy::Direct,
        &RouteConfig::default(),
    )
    .unwrap_err();
    match err {
        RouteError::RouteCollision {
            port,
            other,
            clearance,
            ..
        } => {
            assert_eq!((port.as_str(), other.as_str()), ("o1", "o2"));
            assert!(clearance < 0.1);
        }
        other => panic!("expected a collision, got {other}"),
    }
    // nothing was cached under the failed build
    assert!(
        s.cache()
            .components()
            .iter()
            .all(|c| !c.name().starts_with("shadowed_route_to_array"))
    );
}

#[test]
fn short_approach_reports_fitting_radius() {
    let s = Session::in_memory();
    let c = emitter(&s, "near", &[(80.0, 15.0)], 0.5);
    let err = plan_routes(
        &c,
        &east_array(5.0, 1),
        RoutingStrategy::Direct,
        &RouteConfig::default(),
    )
    .unwrap_err();
    // 20 um to the array, 10 of them lead: a 15 um jog fits radius 5 at most
    assert!(matches!(
        err,
        RouteError::BendRadiusViolation { ref port, slot: 0, radius, .. } if port == "o1" && radius == 5.0
    ));

    let tight = RouteConfig {
        bend_radius: 4.0,
        ..RouteConfig::default()
    };
    let far = emitter(&s, "far", &[(0.0, 15.0)], 0.5);
    assert!(matches!(
        plan_routes(&far, &east_array(5.0, 1), RoutingStrategy::Direct, &tight),
        Err(RouteError::BendRadiusViolation { radius, min_radius, .. }) if radius == 4.0 && min_radius == 5.0
    ));
}

#[test]
fn ports_must_face_the_array() {
    let s = Session::in_memory();
    let wg = s.build("straight", Args::new()).unwrap();
    // o1 faces west, away from the array
    let err = plan_routes(
        &wg,
        &east_array(5.0, 2),
        RoutingStrategy::Direct,
        &RouteConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RouteError::UnroutablePort { ref port, .. } if port == "o1"));

    let past = emitter(&s, "past", &[(120.0, 0.0)], 0.5);
    assert!(matches!(
        plan_routes(&past, &east_array(5.0, 1), RoutingStrategy::Direct, &RouteConfig::default()),
        Err(RouteError::UnroutablePort { .. })
    ));
}

#[test]
fn looped_fans_out_dense_ports() {
    let s = Session::in_memory();
    let c = emitter(&s, "dense", &[(0.0, 0.0), (0.0, 3.0), (0.0, 6.0), (0.0, 9.0)], 0.5);
    let array = east_array(5.0, 4);
    let config = RouteConfig::default();

    let routes = plan_routes(&c, &array, RoutingStrategy::Looped, &config).unwrap();
    let bands: Vec<Option<usize>> = routes.iter().map(|r| r.band).collect();
    // the outermost mover jogs first
    assert_eq!(bands, [None, Some(2), Some(1), Some(0)]);
    assert!(check_clearance(&routes, config.separation, config.arc_segments).is_ok());
    for (k, r) in routes.iter().enumerate() {
        assert!(close(r.end().0, array.slot(k)));
    }

    let routed = route_to_array(&s, &c, &array, RoutingStrategy::Looped, &config).unwrap();
    assert_eq!(routed.get_settings()["strategy"], json!("looped"));
}

#[test]
fn staggered_pushes_odd_ordinals_to_far_band() {
    let s = Session::in_memory();
    let c = emitter(
        &s,
        "wide",
        &[(0.0, 0.0), (0.0, 10.0), (0.0, 20.0), (0.0, 30.0)],
        0.5,
    );
    let config = RouteConfig::default();
    let routes = plan_routes(&c, &east_array(12.0, 4), RoutingStrategy::Staggered, &config).unwrap();
    let bands: Vec<Option<usize>> = routes.iter().map(|r| r.band).collect();
    assert_eq!(bands, [None, Some(1), Some(0), Some(1)]);

    let lead = |i: usize| match routes[i].elements[0] {
        PathElement::Straight { length } => length,
        ref e => panic!("route {i} starts with {e:?}"),
    };
    // near band depth (a 4 um jog at radius 10 spans 12 um) plus separation
    assert!((lead(1) - lead(2) - 14.0).abs() < 1e-9);
    assert!(check_clearance(&routes, config.separation, config.arc_segments).is_ok());
}

#[test]
fn width_mismatch_inserts_taper() {
    let s = Session::in_memory();
    let c = emitter(&s, "wide_port", &[(0.0, 0.0)], 1.2);
    let array = east_array(5.0, 1);
    let config = RouteConfig::default();
    let routes = plan_routes(&c, &array, RoutingStrategy::Direct, &config).unwrap();
    assert_eq!(
        routes[0].elements[0],
        PathElement::Taper {
            width_start: 1.2,
            width_end: 0.5,
            length: 10.0
        }
    );
    assert_eq!(routes[0].end_width(), 0.5);
    assert!((routes[0].length() - 100.0).abs() < 1e-9);

    let routed = route_to_array(&s, &c, &array, RoutingStrategy::Direct, &config).unwrap();
    let route = &routed.references()[1];
    assert_eq!(route.port("o1").unwrap().width, 1.2);
    assert_eq!(route.port("o2").unwrap().width, 0.5);
}

#[test]
fn planning_is_deterministic() {
    let s = Session::in_memory();
    let c = emitter(&s, "dense", &[(0.0, 0.0), (0.0, 3.0), (0.0, 6.0), (0.0, 9.0)], 0.5);
    let array = east_array(5.0, 6);
    let config = RouteConfig::default();
    let a = plan_routes(&c, &array, RoutingStrategy::Looped, &config).unwrap();
    let b = plan_routes(&c, &array, RoutingStrategy::Looped, &config).unwrap();
    assert_eq!(a, b);
}

proptest! {
    #[test]
    fn single_port_always_lands_on_slot(y in -40.0f64..40.0, radius in 5.0f64..20.0) {
        let s = Session::in_memory();
        let c = emitter(&s, "one", &[(0.0, y)], 0.5);
        let array = east_array(5.0, 1);
        let config = RouteConfig { bend_radius: radius, ..RouteConfig::default() };
        let routes = plan_routes(&c, &array, RoutingStrategy::Direct, &config).unwrap();
        let (end, heading) = routes[0].end();
        prop_assert!(close(end, array.slot(0)));
        prop_assert!(pf_core::angle_difference(heading, 0.0) < 1e-9);
        if let Some(r) = routes[0].min_radius() {
            prop_assert!(r >= config.min_bend_radius);
        }
    }
}
