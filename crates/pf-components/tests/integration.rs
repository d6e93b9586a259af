//! Integration tests for pf-components.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pf_cache::{Args, GeneratorCall};
use pf_components::{ComponentError, FnGenerator, Library, Session};
use pf_core::pt;
use pf_graph::{ComponentBuilder, Port, SignalKind};
use pf_kernel::{Layer, MemoryKernel};
use serde_json::json;

#[test]
fn straight_ports_and_settings() {
    let s = Session::in_memory();
    let wg = s
        .build("straight", Args::new().with("length", 25.0).with("width", 0.6))
        .unwrap();
    let ports = wg.get_ports();
    assert_eq!(ports[0].name, "o1");
    assert_eq!(ports[0].orientation, 180.0);
    assert_eq!(ports[1].center, pt(25.0, 0.0));
    assert_eq!(ports[1].width, 0.6);
    assert_eq!(wg.get_settings()["length"], json!(25.0));
    assert_eq!(wg.get_settings()["path_length"], json!(25.0));
    assert_eq!(wg.provenance()["generator"], json!("straight"));
    assert!(wg.fingerprint().is_some());
}

#[test]
fn bend_ends_exactly_on_quarter_turn() {
    let s = Session::in_memory();
    let bend = s
        .build("bend_circular", Args::new().with("radius", 5.0))
        .unwrap();
    let o2 = bend.port("o2").unwrap();
    assert_eq!(o2.center, pt(5.0, 5.0));
    assert_eq!(o2.orientation, 90.0);
}

#[test]
fn mmi_1x2_is_hierarchical() {
    let s = Session::in_memory();
    let mmi = s.build("mmi", Args::new()).unwrap();
    let names: Vec<String> = mmi.get_ports().into_iter().map(|p| p.name).collect();
    assert_eq!(names, ["o1", "o2", "o3"]);

    let o1 = mmi.port("o1").unwrap();
    assert_eq!(o1.center, pt(-10.0, 0.0));
    assert_eq!(o1.orientation, 180.0);
    let o2 = mmi.port("o2").unwrap();
    let o3 = mmi.port("o3").unwrap();
    assert_eq!(o2.orientation, 0.0);
    assert!(o2.center.y > o3.center.y);
    assert_eq!(o2.center.x, 15.5);

    // three taper references share one cached taper
    assert_eq!(mmi.references().len(), 3);
    let first = &mmi.references()[0].target;
    assert!(mmi.references().iter().all(|r| Arc::ptr_eq(&r.target, first)));
}

#[test]
fn mmi_rejects_overfull_body() {
    let s = Session::in_memory();
    let err = s
        .build("mmi", Args::new().with("outputs", 4))
        .unwrap_err();
    assert!(matches!(err, ComponentError::InvalidParam { ref param, .. } if param == "width_mmi"));
    assert!(s.cache().is_empty());
}

#[test]
fn pad_has_four_electrical_ports() {
    let s = Session::in_memory();
    let pad = s.build("pad", Args::new()).unwrap();
    let ports = pad.get_ports();
    assert_eq!(ports.len(), 4);
    assert!(ports.iter().all(|p| p.kind == SignalKind::Electrical));
    assert!(ports.iter().all(|p| p.layer == Layer::M3));
    assert_eq!(pad.port("e2").unwrap().center, pt(0.0, 50.0));
}

#[test]
fn unknown_generator() {
    let s = Session::in_memory();
    assert!(matches!(
        s.build("ring_single", Args::new()),
        Err(ComponentError::UnknownGenerator { .. })
    ));
}

#[test]
fn invalid_params_are_not_cached() {
    let s = Session::in_memory();
    let err = s
        .build("straight", Args::new().with("width", -1.0))
        .unwrap_err();
    assert!(matches!(err, ComponentError::InvalidParam { .. }));
    assert!(s.cache().is_empty());
}

#[test]
fn custom_generator_runs_once_across_threads() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut lib = Library::standard();
    lib.register(FnGenerator::new(
        "marker",
        Args::new().with("size", 1.0),
        move |_session, params| {
            counter.fetch_add(1, Ordering::SeqCst);
            let size = params.positive("size")?;
            let mut b = ComponentBuilder::new(params.name());
            b.add_port(
                Port::new("center", pt(0.0, 0.0), 0.0, size).with_kind(SignalKind::Placement),
            )?;
            Ok(b)
        },
    ));
    let s = Session::new(Arc::new(MemoryKernel::new()), lib);

    let batch: Vec<GeneratorCall> = (0..32)
        .map(|i| GeneratorCall::new("marker", Args::new().with("size", (i % 2 + 1) as f64)))
        .collect();
    let results = s.build_many(&batch);
    assert!(results.iter().all(Result::is_ok));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(s.cache().len(), 2);
}

#[test]
fn nested_pending_component_is_resolved() {
    let mut lib = Library::standard();
    lib.register(FnGenerator::new("wrap", Args::new(), |_session, params| {
        let inner = params.component("component")?;
        let mut b = ComponentBuilder::new(params.name());
        b.add_ref(inner, pf_core::Transform::identity())?;
        Ok(b)
    }));
    let s = Session::new(Arc::new(MemoryKernel::new()), lib);

    let pending = GeneratorCall::new("straight", Args::new().with("length", 4.0));
    let built = s.build_call(&pending).unwrap();
    let via_pending = s
        .build("wrap", Args::new().with("component", pending))
        .unwrap();
    let via_built = s
        .build("wrap", Args::new().with("component", built.clone()))
        .unwrap();

    assert!(Arc::ptr_eq(&via_pending, &via_built));
    assert!(Arc::ptr_eq(&via_pending.references()[0].target, &built));
    assert_eq!(
        via_pending.get_settings()["component"],
        json!(built.name())
    );
}

#[test]
fn explicit_name_collision_is_reported() {
    let s = Session::in_memory();
    s.build_named("straight", Args::new(), "wg").unwrap();
    let err = s
        .build_named("straight", Args::new().with("length", 1.0), "wg")
        .unwrap_err();
    assert!(matches!(
        err,
        ComponentError::Cache(pf_cache::CacheError::NameCollision { .. })
    ));
}

#[test]
fn named_build_is_distinct_from_anonymous_one() {
    let s = Session::in_memory();
    let anonymous = s.build("straight", Args::new()).unwrap();
    let named = s.build_named("straight", Args::new(), "my_wg").unwrap();

    assert_eq!(named.name(), "my_wg");
    assert!(!Arc::ptr_eq(&anonymous, &named));
    assert_ne!(anonymous.fingerprint(), named.fingerprint());
    assert_eq!(anonymous.get_ports(), named.get_ports());

    // neither build disturbs the other's cache entry
    let again = s.build("straight", Args::new()).unwrap();
    assert!(Arc::ptr_eq(&again, &anonymous));
    assert_ne!(again.name(), "my_wg");
    let named_again = s.build_named("straight", Args::new(), "my_wg").unwrap();
    assert!(Arc::ptr_eq(&named_again, &named));
}
