//! String-keyed declaration builders.
//!
//! Declarations name everything with plain strings; the runtime interns
//! them when the declaration is submitted.

use std::fmt;
use std::sync::Arc;

use facet_ir::{Name, StringInterner};
use facet_object::{
    field_getter, field_setter, Directives, InitFn, Injection, Instance, MethodFn, ObjectError,
    TypeParts, Value,
};
use facet_types::{getter_name, setter_name, InterfaceConfig, PropertySpec};

/// An interface declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceDecl {
    inherit: Vec<String>,
    methods: Vec<String>,
    properties: Vec<(String, bool)>,
    events: Vec<String>,
}

impl InterfaceDecl {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn inherit(mut self, parent: &str) -> Self {
        self.inherit.push(parent.to_owned());
        self
    }

    #[must_use]
    pub fn method(mut self, method: &str) -> Self {
        self.methods.push(method.to_owned());
        self
    }

    /// A read/write property.
    #[must_use]
    pub fn property(mut self, property: &str) -> Self {
        self.properties.push((property.to_owned(), false));
        self
    }

    #[must_use]
    pub fn read_only_property(mut self, property: &str) -> Self {
        self.properties.push((property.to_owned(), true));
        self
    }

    #[must_use]
    pub fn event(mut self, event: &str) -> Self {
        self.events.push(event.to_owned());
        self
    }

    pub(crate) fn lower(&self, interner: &StringInterner) -> InterfaceConfig {
        let mut config = InterfaceConfig::new();
        for parent in &self.inherit {
            config = config.inherit(interner.intern(parent));
        }
        for method in &self.methods {
            config = config.method(interner.intern(method));
        }
        for (property, read_only) in &self.properties {
            let name = interner.intern(property);
            config = config.property(if *read_only {
                PropertySpec::read_only(name)
            } else {
                PropertySpec::new(name)
            });
        }
        for event in &self.events {
            config = config.event(interner.intern(event));
        }
        config
    }
}

/// A concrete type declaration.
///
/// ```ignore
/// let console = TypeDecl::new("Console")
///     .implement("ILogger")
///     .field_property("level")
///     .method("log", |_this, args| Ok(Value::Int(args.len() as i64)))
///     .inject("sinks", "ISink[]");
/// runtime.declare_type(console)?;
/// ```
pub struct TypeDecl {
    name: String,
    extends: Option<String>,
    implement: Vec<String>,
    members: Vec<(String, MethodFn)>,
    field_properties: Vec<String>,
    init: Vec<InitFn>,
    inject: Vec<(String, String)>,
    suppress: Option<String>,
    is_abstract: bool,
    deferred_singleton: bool,
}

impl TypeDecl {
    pub fn new(name: &str) -> Self {
        TypeDecl {
            name: name.to_owned(),
            extends: None,
            implement: Vec::new(),
            members: Vec::new(),
            field_properties: Vec::new(),
            init: Vec::new(),
            inject: Vec::new(),
            suppress: None,
            is_abstract: false,
            deferred_singleton: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inherit members, interfaces, initializers and injections from an
    /// already declared type.
    #[must_use]
    pub fn extends(mut self, superclass: &str) -> Self {
        self.extends = Some(superclass.to_owned());
        self
    }

    #[must_use]
    pub fn implement(mut self, interface: &str) -> Self {
        self.implement.push(interface.to_owned());
        self
    }

    #[must_use]
    pub fn method<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, ObjectError> + Send + Sync + 'static,
    {
        self.members.push((name.to_owned(), facet_object::method(f)));
        self
    }

    /// A `get<P>` / `set<P>` pair over the field named `property`.
    #[must_use]
    pub fn field_property(mut self, property: &str) -> Self {
        self.field_properties.push(property.to_owned());
        self
    }

    /// An initializer. Several may be added; they run in order, after the
    /// superclass initializers.
    #[must_use]
    pub fn init<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance) -> Result<(), ObjectError> + Send + Sync + 'static,
    {
        self.init.push(Arc::new(f));
        self
    }

    /// Fill `field` with the resolution of `key` (`I` or `I[]`) on
    /// construction.
    #[must_use]
    pub fn inject(mut self, field: &str, key: &str) -> Self {
        self.inject.push((field.to_owned(), key.to_owned()));
        self
    }

    /// Exclude `type_name` from resolution once this type is declared.
    #[must_use]
    pub fn suppress(mut self, type_name: &str) -> Self {
        self.suppress = Some(type_name.to_owned());
        self
    }

    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub fn deferred_singleton(mut self) -> Self {
        self.deferred_singleton = true;
        self
    }

    /// Intern every name. Returns the parts and the superclass name.
    pub(crate) fn lower(self, interner: &StringInterner) -> (TypeParts, Option<Name>) {
        let mut parts = TypeParts::new(interner.intern(&self.name));
        parts.implement = self.implement.iter().map(|i| interner.intern(i)).collect();

        for property in &self.field_properties {
            let field = interner.intern(property);
            parts
                .members
                .insert(getter_name(interner, field), field_getter(field));
            parts
                .members
                .insert(setter_name(interner, field), field_setter(field));
        }
        // Explicit members win over generated accessors.
        for (name, f) in self.members {
            parts.members.insert(interner.intern(&name), f);
        }

        parts.init = self.init;
        parts.inject = self
            .inject
            .iter()
            .map(|(field, key)| Injection {
                field: interner.intern(field),
                key: interner.intern(key),
            })
            .collect();
        parts.directives = Directives {
            suppress: self.suppress.as_deref().map(|s| interner.intern(s)),
            is_abstract: self.is_abstract,
            deferred_singleton: self.deferred_singleton,
        };

        let extends = self.extends.as_deref().map(|s| interner.intern(s));
        (parts, extends)
    }
}

impl fmt::Debug for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDecl")
            .field("name", &self.name)
            .field("extends", &self.extends)
            .field("implement", &self.implement)
            .field(
                "members",
                &self.members.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("field_properties", &self.field_properties)
            .field("init", &self.init.len())
            .field("inject", &self.inject)
            .field("directives", &(&self.suppress, self.is_abstract, self.deferred_singleton))
            .finish()
    }
}
