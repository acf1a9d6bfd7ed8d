//! Shared setup for unit tests.

use std::sync::Arc;

use facet_ir::{Name, SharedInterner};
use facet_types::{check_conformance, InterfaceConfig, InterfaceRegistry, PropertySpec};

use crate::{field_getter, field_setter, method, Instance, ObjectError, TypeDef, TypeParts, Value};

/// Registry with:
/// - `IBase { baseMethod }`
/// - `IFull: IBase { method, event changed, property value, read-only size }`
/// - `ISibling { sibling }`
pub(crate) struct Fixture {
    pub interner: SharedInterner,
    pub registry: InterfaceRegistry,
}

impl Fixture {
    pub fn new() -> Self {
        let interner = SharedInterner::new();
        let mut registry = InterfaceRegistry::new(interner.clone());
        let n = |s: &str| interner.intern(s);

        registry
            .define(n("IBase"), InterfaceConfig::new().method(n("baseMethod")))
            .unwrap();
        registry
            .define(
                n("IFull"),
                InterfaceConfig::new()
                    .inherit(n("IBase"))
                    .method(n("method"))
                    .event(n("changed"))
                    .property(n("value"))
                    .property(PropertySpec::read_only(n("size"))),
            )
            .unwrap();
        registry
            .define(n("ISibling"), InterfaceConfig::new().method(n("sibling")))
            .unwrap();

        Fixture { interner, registry }
    }

    pub fn n(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Check, close and bind `parts`, inheriting from `superclass`.
    pub fn declare(&self, mut parts: TypeParts, superclass: Option<&Arc<TypeDef>>) -> Arc<TypeDef> {
        if let Some(sup) = superclass {
            parts.inherit_from(sup);
        }
        check_conformance(&self.registry, parts.name, &parts.implement, &parts.members).unwrap();
        let closure = self.registry.closure(&parts.implement);
        TypeDef::new(parts, superclass, closure, &self.interner)
    }

    /// `Widget: IFull + ISibling`. Handlers subscribed to `changed` live in
    /// the `handlers` field, and `fire` calls each with its argument.
    pub fn widget_parts(&self) -> TypeParts {
        let mut parts = TypeParts::new(self.n("Widget"));
        parts.implement = vec![self.n("IFull"), self.n("ISibling")];

        let handlers = self.n("handlers");
        let value = self.n("value");
        let m = &mut parts.members;
        m.insert(self.n("baseMethod"), method(|_, _| Ok(Value::from("base"))));
        m.insert(
            self.n("method"),
            method(|_, args| Ok(Value::Int(i64::try_from(args.len()).unwrap_or(-1)))),
        );
        m.insert(self.n("sibling"), method(|_, _| Ok(Value::from("sibling"))));
        m.insert(self.n("getValue"), field_getter(value));
        m.insert(self.n("setValue"), field_setter(value));
        m.insert(self.n("getSize"), method(|_, _| Ok(Value::Int(3))));
        m.insert(
            self.n("onChanged"),
            method(move |this, args| {
                let mut list = handler_list(this, handlers);
                list.extend(args.first().cloned());
                this.set_field(handlers, Value::list(list));
                Ok(Value::Void)
            }),
        );
        m.insert(
            self.n("unChanged"),
            method(move |this, args| {
                let mut list = handler_list(this, handlers);
                if let Some(handler) = args.first() {
                    list.retain(|h| h != handler);
                }
                this.set_field(handlers, Value::list(list));
                Ok(Value::Void)
            }),
        );
        m.insert(
            self.n("fire"),
            method(move |this, args| {
                for handler in handler_list(this, handlers) {
                    let Value::Func(cb) = handler else {
                        return Err(ObjectError::custom("handler is not a function"));
                    };
                    cb.call(args)?;
                }
                Ok(Value::Void)
            }),
        );
        parts
    }

    pub fn widget(&self) -> Arc<TypeDef> {
        self.declare(self.widget_parts(), None)
    }
}

fn handler_list(this: &Instance, field: Name) -> Vec<Value> {
    this.field(field)
        .and_then(|v| v.as_list().map(<[Value]>::to_vec))
        .unwrap_or_default()
}
