//! Shared setup for phase tests.

use facet_host::{init_tracing, CapabilityView, Instance, InterfaceDecl, Runtime, TypeDecl};

/// A fresh runtime, with tracing enabled if `RUST_LOG` is set.
pub fn runtime() -> Runtime {
    init_tracing();
    Runtime::new().unwrap()
}

/// A runtime with `IThing: IDependency` and
/// `ISharedThing: IThing + ISingleton`.
pub fn things() -> Runtime {
    let rt = runtime();
    rt.define_interface("IThing", &InterfaceDecl::new().inherit("IDependency"))
        .unwrap();
    rt.define_interface(
        "ISharedThing",
        &InterfaceDecl::new().inherit("IThing").inherit("ISingleton"),
    )
    .unwrap();
    rt
}

/// Declare a member-less type implementing `interfaces`.
pub fn service(rt: &Runtime, name: &str, interfaces: &[&str]) {
    let decl = interfaces
        .iter()
        .fold(TypeDecl::new(name), |decl, iface| decl.implement(iface));
    rt.declare_type(decl).unwrap();
}

pub fn type_label(instance: &Instance) -> &'static str {
    instance.type_def().label()
}

/// The concrete type label behind each view.
pub fn labels(views: &[CapabilityView]) -> Vec<&'static str> {
    views.iter().map(|v| type_label(v.instance())).collect()
}
