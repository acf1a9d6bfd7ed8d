//! Casting, capability views, properties and events.

use facet_host::{
    CastTarget, Instance, InterfaceDecl, Introspect, ObjectError, Runtime, TypeDecl, Value,
};
use pretty_assertions::assert_eq;

use crate::common::runtime;

/// `IBase { m }`, `IDerived: IBase { d }`, and `X: IDerived`.
fn base_derived() -> Runtime {
    let rt = runtime();
    rt.define_interface("IBase", &InterfaceDecl::new().method("m"))
        .unwrap();
    rt.define_interface("IDerived", &InterfaceDecl::new().inherit("IBase").method("d"))
        .unwrap();
    rt.declare_type(
        TypeDecl::new("X")
            .implement("IDerived")
            .method("m", |_, _| Ok(Value::from("m")))
            .method("d", |_, _| Ok(Value::from("d"))),
    )
    .unwrap();
    rt
}

/// `IValue { value, read-only size }`, `IClickable { event clicked }`,
/// and `Button` implementing both with handlers kept in a field.
fn button() -> (Runtime, Instance) {
    let rt = runtime();
    rt.define_interface(
        "IValue",
        &InterfaceDecl::new().property("value").read_only_property("size"),
    )
    .unwrap();
    rt.define_interface("IClickable", &InterfaceDecl::new().event("clicked"))
        .unwrap();

    let handlers = rt.name("handlers");
    let current = move |this: &Instance| -> Vec<Value> {
        this.field(handlers)
            .and_then(|v| v.as_list().map(<[Value]>::to_vec))
            .unwrap_or_default()
    };
    rt.declare_type(
        TypeDecl::new("Button")
            .implement("IValue")
            .implement("IClickable")
            .field_property("value")
            .method("getSize", |_, _| Ok(Value::Int(2)))
            .method("onClicked", move |this, args| {
                let mut list = current(this);
                list.push(args.first().cloned().unwrap_or_default());
                this.set_field(handlers, Value::list(list));
                Ok(Value::Void)
            })
            .method("unClicked", move |this, args| {
                let target = args.first().cloned().unwrap_or_default();
                let list = current(this).into_iter().filter(|h| *h != target).collect();
                this.set_field(handlers, Value::list(list));
                Ok(Value::Void)
            })
            .method("click", move |this, _| {
                let list = current(this);
                for handler in &list {
                    if let Some(callback) = handler.as_callback() {
                        callback.call(&[])?;
                    }
                }
                Ok(Value::Int(i64::try_from(list.len()).unwrap_or(-1)))
            }),
    )
    .unwrap();

    let instance = rt.instantiate("Button").unwrap();
    (rt, instance)
}

#[test]
fn derived_interface_scenario() {
    let rt = base_derived();
    let x = rt.instantiate("X").unwrap();

    assert!(x.is_a(rt.interface_target("IBase")));
    assert!(x.is_a(rt.interface_target("IDerived")));

    let base = x.cast_to_interface(rt.name("IBase")).unwrap();
    assert!(!base.has_member(rt.name("d")));
    assert!(matches!(
        base.call(rt.name("d"), &[]),
        Err(ObjectError::UnknownMember { .. })
    ));

    let derived = x.cast_to_interface(rt.name("IDerived")).unwrap();
    assert_eq!(derived.call(rt.name("m"), &[]), Ok(Value::from("m")));
    assert_eq!(derived.call(rt.name("d"), &[]), Ok(Value::from("d")));
}

#[test]
fn cast_round_trip_returns_the_instance() {
    let rt = base_derived();
    let x = rt.instantiate("X").unwrap();

    for &interface in x.type_def().closure() {
        let view = x.cast_to(CastTarget::Interface(interface)).unwrap();
        let back = view.cast_to(rt.type_target("X")).unwrap();
        assert!(back.same_as(&x));
        assert!(back.as_instance().unwrap().ptr_eq(&x));
    }
}

#[test]
fn casts_that_do_not_apply_are_none() {
    let rt = base_derived();
    rt.define_interface("IOther", &InterfaceDecl::new()).unwrap();
    let x = rt.instantiate("X").unwrap();

    assert!(x.cast_to(rt.interface_target("IOther")).is_none());
    assert!(x.cast_to(rt.interface_target("INeverDefined")).is_none());
    assert!(x.cast_to(rt.type_target("Y")).is_none());
    assert!(!x.is_a(rt.interface_target("IOther")));
}

#[test]
fn view_recasts_to_sibling_interface() {
    let (rt, button) = button();
    let value = button.cast_to_interface(rt.name("IValue")).unwrap();

    let clickable = value.cast_to(rt.interface_target("IClickable")).unwrap();
    let clickable = clickable.into_view().unwrap();
    assert_eq!(clickable.interface(), rt.name("IClickable"));
    assert!(clickable.same_as(&value));
    assert!(!clickable.has_member(rt.name("value")));
}

#[test]
fn views_are_shared_while_alive() {
    let (rt, button) = button();
    let first = button.cast_to_interface(rt.name("IValue")).unwrap();
    let second = button.cast_to_interface(rt.name("IValue")).unwrap();
    assert!(first.ptr_eq(&second));
}

#[test]
fn property_accessor_laws() {
    let (rt, button) = button();
    let view = button.cast_to_interface(rt.name("IValue")).unwrap();
    let value = rt.name("value");
    let size = rt.name("size");

    for v in [Value::Int(7), Value::from("seven"), Value::Bool(true)] {
        assert_eq!(view.property(value, &[v.clone()]), Ok(Value::Void));
        assert_eq!(view.property(value, &[]), Ok(v));
    }

    assert_eq!(
        view.property(value, &[Value::Int(1), Value::Int(2)]),
        Err(ObjectError::InvalidPropertyArity {
            interface: "IValue".to_owned(),
            property: "value".to_owned(),
            count: 2,
        })
    );
    assert_eq!(view.get(size), Ok(Value::Int(2)));
    assert_eq!(
        view.set(size, 9_i64),
        Err(ObjectError::ReadOnlyPropertyWrite {
            interface: "IValue".to_owned(),
            property: "size".to_owned(),
        })
    );
    assert!(matches!(
        view.call(value, &[]),
        Err(ObjectError::NotCallable { .. })
    ));
}

#[test]
fn events_subscribe_and_unsubscribe() {
    let (rt, button) = button();
    let view = button.cast_to_interface(rt.name("IClickable")).unwrap();
    let clicked = rt.name("clicked");
    let click = rt.name("click");

    let counter = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let seen = std::sync::Arc::clone(&counter);
    let handler = Value::func(move |_| {
        seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(Value::Void)
    });

    view.subscribe(clicked, handler.clone()).unwrap();
    assert_eq!(button.call(click, &[]), Ok(Value::Int(1)));
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);

    view.unsubscribe(clicked, handler).unwrap();
    assert_eq!(button.call(click, &[]), Ok(Value::Int(0)));
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);

    assert!(matches!(
        view.subscribe(rt.name("pressed"), Value::Void),
        Err(ObjectError::UnknownMember { .. })
    ));
}

#[test]
fn subtype_inherits_members_and_interfaces() {
    let rt = base_derived();
    rt.define_interface("IExtra", &InterfaceDecl::new().method("extra"))
        .unwrap();
    rt.declare_type(
        TypeDecl::new("Y")
            .extends("X")
            .implement("IExtra")
            .method("extra", |_, _| Ok(Value::Int(1)))
            .method("m", |_, _| Ok(Value::from("overridden"))),
    )
    .unwrap();

    let y = rt.instantiate("Y").unwrap();
    assert!(y.is_a(rt.type_target("X")));
    assert!(y.is_a(rt.type_target("Y")));
    assert!(y.is_a(rt.interface_target("IDerived")));
    assert!(y.is_a(rt.interface_target("IBase")));

    let derived = y.cast_to_interface(rt.name("IDerived")).unwrap();
    assert_eq!(derived.call(rt.name("m"), &[]), Ok(Value::from("overridden")));
    assert_eq!(derived.call(rt.name("d"), &[]), Ok(Value::from("d")));

    let as_x = y.cast_to(rt.type_target("X")).unwrap();
    assert!(as_x.same_as(&y));

    let x = rt.instantiate("X").unwrap();
    assert!(!x.is_a(rt.type_target("Y")));
}

#[test]
fn superclass_initializer_runs_first() {
    let rt = runtime();
    let log = rt.name("log");
    let append = move |this: &Instance, entry: &'static str| {
        let mut entries = this
            .field(log)
            .and_then(|v| v.as_list().map(<[Value]>::to_vec))
            .unwrap_or_default();
        entries.push(Value::from(entry));
        this.set_field(log, Value::list(entries));
    };

    rt.declare_type(TypeDecl::new("Parent").init(move |this| {
        append(this, "parent");
        Ok(())
    }))
    .unwrap();
    rt.declare_type(TypeDecl::new("Child").extends("Parent").init(move |this| {
        append(this, "child");
        Ok(())
    }))
    .unwrap();

    let child = rt.instantiate("Child").unwrap();
    assert_eq!(
        child.field(log),
        Some(Value::list(vec![Value::from("parent"), Value::from("child")]))
    );
}
