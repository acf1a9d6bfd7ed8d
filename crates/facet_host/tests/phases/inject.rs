//! Resolution, lifetimes, suppression and field injection.

use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

use facet_host::{HostError, InjectError, InterfaceDecl, Introspect, Lifetime, TypeDecl, Value};
use pretty_assertions::assert_eq;

use crate::common::{labels, service, things, type_label};

#[test]
fn resolve_all_returns_one_view_per_type_in_order() {
    let rt = things();
    service(&rt, "A", &["IThing"]);
    service(&rt, "B", &["IThing"]);

    let views = rt.resolve_all("IThing").unwrap();
    assert_eq!(labels(&views), vec!["A", "B"]);
    assert!(!views[0].same_as(&views[1]));
    assert!(views.iter().all(|v| v.interface() == rt.name("IThing")));
}

#[test]
fn transient_resolutions_are_distinct() {
    let rt = things();
    service(&rt, "A", &["IThing"]);

    let first = rt.resolve("IThing").unwrap();
    let second = rt.resolve("IThing").unwrap();
    assert!(!first.same_as(&second));
    assert_eq!(rt.lifetime("A"), Some(Lifetime::Transient));
}

#[test]
fn singleton_registered_first_is_reused() {
    let rt = things();
    service(&rt, "T1", &["ISharedThing"]);
    service(&rt, "T2", &["IThing"]);

    let first = rt.resolve("IThing").unwrap();
    let second = rt.resolve("IThing").unwrap();
    assert_eq!(type_label(first.instance()), "T1");
    assert!(first.same_as(&second));
    assert_eq!(rt.lifetime("T1"), Some(Lifetime::Singleton));
}

#[test]
fn constructed_singleton_overtakes_earlier_transient() {
    let rt = things();
    service(&rt, "T2", &["IThing"]);
    service(&rt, "T1", &["ISharedThing"]);

    // T1 is not constructed yet, so registration order decides.
    let first = rt.resolve("IThing").unwrap();
    assert_eq!(type_label(first.instance()), "T2");

    let shared = rt.resolve("ISharedThing").unwrap();
    let second = rt.resolve("IThing").unwrap();
    let third = rt.resolve("IThing").unwrap();
    assert!(second.same_as(&shared));
    assert!(third.same_as(&shared));
}

#[test]
fn suppression_law() {
    let rt = things();
    service(&rt, "Only", &["IThing"]);
    assert!(rt.resolve("IThing").is_ok());

    assert!(rt.suppress("Only"));
    assert!(!rt.suppress("Only"));
    assert_eq!(
        rt.resolve("IThing").unwrap_err(),
        HostError::Inject(InjectError::NoViableImplementation {
            interface: "IThing".to_owned()
        })
    );
    assert!(rt.resolve_all("IThing").unwrap().is_empty());
    // The registration is kept.
    assert_eq!(rt.container().candidates(rt.name("IThing")).len(), 1);
}

#[test]
fn suppressed_singleton_is_skipped_even_when_cached() {
    let rt = things();
    service(&rt, "Shared", &["ISharedThing"]);
    service(&rt, "Plain", &["IThing"]);
    rt.resolve("ISharedThing").unwrap();

    rt.suppress("Shared");
    let view = rt.resolve("IThing").unwrap();
    assert_eq!(type_label(view.instance()), "Plain");
    assert_eq!(labels(&rt.resolve_all("IThing").unwrap()), vec!["Plain"]);
}

#[test]
fn accessors_are_installed_on_first_registration() {
    let rt = things();
    assert!(!rt.can_resolve("IThing"));
    assert!(!rt.can_resolve("IThing[]"));

    service(&rt, "A", &["IThing"]);
    assert!(rt.can_resolve("IThing"));
    assert!(rt.can_resolve("IThing[]"));
    // A derived interface gets its own pair.
    service(&rt, "S", &["ISharedThing"]);
    assert!(rt.can_resolve("ISharedThing[]"));

    assert_eq!(
        rt.resolve_key("INothing").unwrap_err(),
        HostError::Inject(InjectError::UnresolvableKey {
            key: "INothing".to_owned()
        })
    );
}

#[test]
fn plural_injection_holds_every_surviving_implementation() {
    let rt = things();
    rt.define_interface("IConsumer", &InterfaceDecl::new().inherit("IDependency"))
        .unwrap();
    service(&rt, "A", &["IThing"]);
    service(&rt, "B", &["IThing"]);
    service(&rt, "C", &["IThing"]);
    rt.suppress("B");
    rt.declare_type(
        TypeDecl::new("Consumer")
            .implement("IConsumer")
            .inject("things", "IThing[]")
            .inject("first", "IThing"),
    )
    .unwrap();

    let consumer = rt.resolve("IConsumer").unwrap();
    let things = consumer.instance().field(rt.name("things")).unwrap();
    let kinds: Vec<&str> = things
        .as_list()
        .unwrap()
        .iter()
        .map(|v| type_label(v.as_view().unwrap().instance()))
        .collect();
    assert_eq!(kinds, vec!["A", "C"]);

    let first = consumer.instance().field(rt.name("first")).unwrap();
    assert_eq!(type_label(first.as_view().unwrap().instance()), "A");
}

#[test]
fn singleton_dependency_is_shared_between_consumers() {
    let rt = things();
    service(&rt, "Shared", &["ISharedThing"]);
    rt.declare_type(TypeDecl::new("Left").inject("dep", "IThing"))
        .unwrap();
    rt.declare_type(TypeDecl::new("Right").inject("dep", "ISharedThing"))
        .unwrap();

    let dep = rt.name("dep");
    let left = rt.instantiate("Left").unwrap().field(dep).unwrap();
    let right = rt.instantiate("Right").unwrap().field(dep).unwrap();
    assert!(left
        .as_view()
        .unwrap()
        .same_as(right.as_view().unwrap()));
}

#[test]
fn self_injecting_singleton_is_a_cycle() {
    let rt = things();
    rt.declare_type(
        TypeDecl::new("Loop")
            .implement("ISharedThing")
            .inject("me", "ISharedThing"),
    )
    .unwrap();

    let expected = HostError::Inject(InjectError::DependencyCycle {
        type_name: "Loop".to_owned(),
    });
    assert_eq!(rt.resolve("ISharedThing").unwrap_err(), expected);
    assert_eq!(rt.resolve("IThing").unwrap_err(), expected);
}

#[test]
fn self_injecting_transient_is_a_cycle() {
    let rt = things();
    rt.declare_type(TypeDecl::new("Loop").implement("IThing").inject("me", "IThing"))
        .unwrap();

    let expected = HostError::Inject(InjectError::DependencyCycle {
        type_name: "Loop".to_owned(),
    });
    assert_eq!(rt.resolve("IThing").unwrap_err(), expected);
    assert_eq!(rt.instantiate("Loop").unwrap_err(), expected);
    assert_eq!(rt.resolve_all("IThing").unwrap_err(), expected);
}

#[test]
fn singletons_built_on_two_threads_do_not_wait_on_each_other() {
    // IX -> [TX, S2] and IY -> [TY, S1]: each singleton is a candidate of the
    // interface the other one injects while both are mid-construction.
    let rt = things();
    for (name, parent) in [
        ("IX", "IDependency"),
        ("IY", "IDependency"),
        ("IS1", "ISingleton"),
        ("IS2", "ISingleton"),
    ] {
        rt.define_interface(name, &InterfaceDecl::new().inherit(parent))
            .unwrap();
    }
    let meet = Arc::new(Barrier::new(2));
    let singleton = |name: &str, own: &str, also: &str, needs: &str| {
        let meet = Arc::clone(&meet);
        TypeDecl::new(name)
            .implement(own)
            .implement(also)
            .inject("dep", needs)
            .init(move |_| {
                meet.wait();
                Ok(())
            })
    };
    service(&rt, "TX", &["IX"]);
    service(&rt, "TY", &["IY"]);
    rt.declare_type(singleton("S1", "IS1", "IY", "IX")).unwrap();
    rt.declare_type(singleton("S2", "IS2", "IX", "IY")).unwrap();

    let rt = Arc::new(rt);
    let (done_tx, done_rx) = mpsc::channel();
    for interface in ["IS1", "IS2"] {
        let rt = Arc::clone(&rt);
        let done_tx = done_tx.clone();
        thread::spawn(move || {
            let dep = rt.name("dep");
            let built = rt.resolve(interface).map(|view| {
                let injected = view.instance().field(dep).is_some_and(|v| v.as_view().is_some());
                (type_label(view.instance()), injected)
            });
            let _ = done_tx.send(built);
        });
    }
    drop(done_tx);

    let mut built: Vec<_> = (0..2)
        .map(|_| {
            done_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("both singletons finish construction")
                .unwrap()
        })
        .collect();
    built.sort_unstable();
    assert_eq!(built, vec![("S1", true), ("S2", true)]);
}

#[test]
fn abstract_and_non_di_types_are_not_registered() {
    let rt = things();
    rt.declare_type(TypeDecl::new("Base").implement("IThing").abstract_type())
        .unwrap();
    rt.declare_type(TypeDecl::new("Loose")).unwrap();

    assert_eq!(rt.lifetime("Base"), None);
    assert_eq!(rt.lifetime("Loose"), None);
    assert!(!rt.can_resolve("IThing"));

    // A concrete subtype of the abstract base registers normally.
    rt.declare_type(TypeDecl::new("Impl").extends("Base")).unwrap();
    let view = rt.resolve("IThing").unwrap();
    assert_eq!(type_label(view.instance()), "Impl");
}

#[test]
fn resolved_value_round_trips_through_fields() {
    let rt = things();
    service(&rt, "A", &["IThing"]);

    let value: Value = rt.resolve_key("IThing").unwrap().into();
    let view = value.as_view().unwrap();
    assert_eq!(view.interface(), rt.name("IThing"));
    assert!(view.is_a(rt.type_target("A")));
}
