//! Deferred singletons and `finalize_registration`.

use facet_host::{HostError, InjectError, InterfaceDecl, Introspect, TypeDecl};
use pretty_assertions::assert_eq;

use crate::common::{service, things, type_label};

#[test]
fn injecting_deferred_singletons_wait_for_finalize() {
    let rt = things();
    rt.declare_type(
        TypeDecl::new("First")
            .deferred_singleton()
            .inject("thing", "IThing"),
    )
    .unwrap();
    rt.declare_type(
        TypeDecl::new("Second")
            .deferred_singleton()
            .inject("things", "IThing[]"),
    )
    .unwrap();
    // The dependency is declared after its consumers.
    service(&rt, "Thing", &["IThing"]);

    assert!(rt.singleton("First").is_none());
    assert!(!rt.is_finalized());

    let built = rt.finalize_registration().unwrap();
    let order: Vec<&str> = built.iter().map(type_label).collect();
    assert_eq!(order, vec!["First", "Second"]);
    assert!(rt.is_finalized());

    let first = rt.singleton("First").unwrap();
    assert!(first.ptr_eq(&built[0]));
    let thing = first.field(rt.name("thing")).unwrap();
    assert_eq!(type_label(thing.as_view().unwrap().instance()), "Thing");
}

#[test]
fn plain_deferred_singleton_is_built_at_declaration() {
    let rt = things();
    rt.declare_type(TypeDecl::new("Clock").deferred_singleton())
        .unwrap();

    let clock = rt.singleton("Clock").unwrap();
    assert!(rt.finalize_registration().unwrap().is_empty());
    assert!(rt.singleton("Clock").unwrap().ptr_eq(&clock));
}

#[test]
fn finalize_runs_once() {
    let rt = things();
    rt.finalize_registration().unwrap();
    assert_eq!(
        rt.finalize_registration().unwrap_err(),
        HostError::Inject(InjectError::AlreadyFinalized)
    );
}

#[test]
fn declared_after_finalize_is_built_immediately() {
    let rt = things();
    service(&rt, "Thing", &["IThing"]);
    rt.finalize_registration().unwrap();

    rt.declare_type(
        TypeDecl::new("Late")
            .deferred_singleton()
            .inject("thing", "IThing"),
    )
    .unwrap();
    let late = rt.singleton("Late").unwrap();
    assert!(late.field(rt.name("thing")).is_some());
}

#[test]
fn injectable_deferred_singleton_has_one_instance() {
    let rt = things();
    rt.define_interface("IService", &InterfaceDecl::new().inherit("ISingleton"))
        .unwrap();
    service(&rt, "Thing", &["IThing"]);
    rt.declare_type(
        TypeDecl::new("Service")
            .implement("IService")
            .deferred_singleton()
            .inject("thing", "IThing"),
    )
    .unwrap();

    let built = rt.finalize_registration().unwrap();
    let resolved = rt.resolve("IService").unwrap();
    assert!(resolved.same_as(&built[0]));
    assert!(rt.singleton("Service").unwrap().same_as(&resolved));
}

#[test]
fn missing_dependency_surfaces_from_finalize() {
    let rt = things();
    rt.declare_type(
        TypeDecl::new("Needy")
            .deferred_singleton()
            .inject("thing", "IMissing"),
    )
    .unwrap();

    assert_eq!(
        rt.finalize_registration().unwrap_err(),
        HostError::Inject(InjectError::UnresolvableKey {
            key: "IMissing".to_owned()
        })
    );
    assert!(rt.singleton("Needy").is_none());
}
