//! Concrete type definitions.
//!
//! A [`TypeDef`] is created once, when its type is declared, and never
//! changes afterwards. Declaration merges the superclass, the caller checks
//! conformance on the merged parts, and [`TypeDef::new`] binds the result
//! against the interface closure.
//!
//! # Binding tables
//!
//! For every interface in the closure the definition precomputes an
//! [`InterfaceBinding`]: member name → bound callable, with accessor and
//! subscription names already derived. Casting an instance therefore never
//! touches the interface registry.

mod binding;

use std::fmt;
use std::sync::Arc;

use facet_ir::{Name, SharedInterner};
use facet_types::{InterfaceDef, MemberTable};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{Instance, ObjectError, Value};

pub use binding::InterfaceBinding;
pub(crate) use binding::Binding;

/// Signature of a member implementation. Receives the instance it was
/// called on and the call arguments.
pub type MethodFn = Arc<dyn Fn(&Instance, &[Value]) -> Result<Value, ObjectError> + Send + Sync>;

/// Signature of an initializer, run once per constructed instance.
pub type InitFn = Arc<dyn Fn(&Instance) -> Result<(), ObjectError> + Send + Sync>;

/// Wrap a closure as a [`MethodFn`].
pub fn method<F>(f: F) -> MethodFn
where
    F: Fn(&Instance, &[Value]) -> Result<Value, ObjectError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A getter over a field. Reads `Void` while the field is unset.
pub fn field_getter(field: Name) -> MethodFn {
    Arc::new(move |this: &Instance, _args: &[Value]| Ok(this.field(field).unwrap_or_default()))
}

/// A setter over a field. Writes its first argument, or `Void`.
pub fn field_setter(field: Name) -> MethodFn {
    Arc::new(move |this: &Instance, args: &[Value]| {
        this.set_field(field, args.first().cloned().unwrap_or_default());
        Ok(Value::Void)
    })
}

/// The member table of a concrete type.
#[derive(Clone, Default)]
pub struct Members(FxHashMap<Name, MethodFn>);

impl Members {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a member.
    pub fn insert(&mut self, name: Name, f: MethodFn) {
        self.0.insert(name, f);
    }

    #[inline]
    pub fn get(&self, name: Name) -> Option<&MethodFn> {
        self.0.get(&name)
    }

    #[inline]
    pub fn contains(&self, name: Name) -> bool {
        self.0.contains_key(&name)
    }

    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy in every member of `parent` this table does not override.
    pub fn inherit(&mut self, parent: &Members) {
        for (&name, f) in &parent.0 {
            self.0.entry(name).or_insert_with(|| Arc::clone(f));
        }
    }
}

impl MemberTable for Members {
    fn has_member(&self, name: Name) -> bool {
        self.contains(name)
    }
}

impl fmt::Debug for Members {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// A field filled by the container when an instance is constructed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Injection {
    /// Field that receives the resolved value.
    pub field: Name,
    /// Resolution key: an interface name, or an interface name with the
    /// collection suffix.
    pub key: Name,
}

/// Per-type declaration directives. Not inherited by subtypes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Directives {
    /// Type to exclude from resolution when this type is declared.
    pub suppress: Option<Name>,
    /// Abstract types never take part in resolution and cannot be
    /// constructed.
    pub is_abstract: bool,
    /// Construct one instance once registration is finished.
    pub deferred_singleton: bool,
}

/// Raw declaration of a type, before binding.
#[derive(Clone, Default)]
pub struct TypeParts {
    pub name: Name,
    /// Declared interfaces, own first.
    pub implement: Vec<Name>,
    pub members: Members,
    /// Initializers, superclass first.
    pub init: Vec<InitFn>,
    pub inject: Vec<Injection>,
    pub directives: Directives,
}

impl TypeParts {
    pub fn new(name: Name) -> Self {
        TypeParts {
            name,
            ..Self::default()
        }
    }

    /// Merge everything a subtype inherits from `superclass`.
    ///
    /// Own members and injections override inherited ones with the same
    /// name. Declared interfaces are unioned. The superclass initializers
    /// run before the subtype's own.
    pub fn inherit_from(&mut self, superclass: &TypeDef) {
        self.members.inherit(&superclass.members);

        for &iface in &superclass.declared {
            if !self.implement.contains(&iface) {
                self.implement.push(iface);
            }
        }

        let mut init = superclass.init.clone();
        init.append(&mut self.init);
        self.init = init;

        let mut inject: Vec<Injection> = superclass
            .inject
            .iter()
            .filter(|inherited| self.inject.iter().all(|own| own.field != inherited.field))
            .copied()
            .collect();
        inject.append(&mut self.inject);
        self.inject = inject;
    }
}

impl fmt::Debug for TypeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeParts")
            .field("name", &self.name)
            .field("implement", &self.implement)
            .field("members", &self.members)
            .field("init", &self.init.len())
            .field("inject", &self.inject)
            .field("directives", &self.directives)
            .finish()
    }
}

/// A declared concrete type.
pub struct TypeDef {
    name: Name,
    label: &'static str,
    superclass: Option<Arc<TypeDef>>,
    declared: Vec<Name>,
    members: Members,
    /// Interface closure in declaration order: each declared interface,
    /// then its ancestors, deduplicated.
    closure: Vec<Name>,
    bindings: FxHashMap<Name, Arc<InterfaceBinding>>,
    /// Own name followed by the superclass chain.
    ancestry: SmallVec<[Name; 4]>,
    init: Vec<InitFn>,
    inject: Vec<Injection>,
    directives: Directives,
    interner: SharedInterner,
}

impl TypeDef {
    /// Bind merged parts against their interface closure.
    ///
    /// `closure` must be the registry closure of `parts.implement`, and
    /// `parts` must already have passed conformance checking.
    pub fn new(
        parts: TypeParts,
        superclass: Option<&Arc<TypeDef>>,
        closure: Vec<Arc<InterfaceDef>>,
        interner: &SharedInterner,
    ) -> Arc<TypeDef> {
        let mut ancestry = SmallVec::new();
        ancestry.push(parts.name);
        if let Some(sup) = superclass {
            ancestry.extend(sup.ancestry.iter().copied());
        }

        let order: Vec<Name> = closure.iter().map(|def| def.name).collect();
        let bindings = closure
            .into_iter()
            .map(|def| {
                let name = def.name;
                let binding = InterfaceBinding::bind(def, &parts.members, interner);
                (name, Arc::new(binding))
            })
            .collect();

        let label = interner.lookup(parts.name);
        tracing::debug!(
            type_name = label,
            interfaces = order.len(),
            members = parts.members.len(),
            "type bound"
        );

        Arc::new(TypeDef {
            name: parts.name,
            label,
            superclass: superclass.cloned(),
            declared: parts.implement,
            members: parts.members,
            closure: order,
            bindings,
            ancestry,
            init: parts.init,
            inject: parts.inject,
            directives: parts.directives,
            interner: interner.clone(),
        })
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    /// The type name as a string.
    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn superclass(&self) -> Option<&Arc<TypeDef>> {
        self.superclass.as_ref()
    }

    /// Declared interfaces, including inherited declarations.
    pub fn declared(&self) -> &[Name] {
        &self.declared
    }

    pub fn members(&self) -> &Members {
        &self.members
    }

    /// Every interface this type implements, declared ones first.
    pub fn closure(&self) -> &[Name] {
        &self.closure
    }

    /// Check if `interface` is in the closure.
    #[inline]
    pub fn implements(&self, interface: Name) -> bool {
        self.bindings.contains_key(&interface)
    }

    /// The binding table for one interface of the closure.
    pub fn binding(&self, interface: Name) -> Option<&Arc<InterfaceBinding>> {
        self.bindings.get(&interface)
    }

    /// The definition of one interface of the closure.
    pub fn interface(&self, interface: Name) -> Option<&Arc<InterfaceDef>> {
        self.binding(interface).map(|b| b.interface())
    }

    /// Own name followed by the superclass chain.
    pub fn ancestry(&self) -> &[Name] {
        &self.ancestry
    }

    /// Check if this type is `type_name` or a subtype of it.
    #[inline]
    pub fn is_subtype_of(&self, type_name: Name) -> bool {
        self.ancestry.contains(&type_name)
    }

    pub fn inject(&self) -> &[Injection] {
        &self.inject
    }

    pub fn directives(&self) -> Directives {
        self.directives
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.directives.is_abstract
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Allocate an instance and run the initializer chain on it.
    ///
    /// Does not check `is_abstract`; that is the caller's policy.
    pub fn construct(self: &Arc<Self>) -> Result<Instance, ObjectError> {
        let instance = Instance::new(Arc::clone(self));
        for init in &self.init {
            init(&instance)?;
        }
        tracing::debug!(type_name = self.label, id = instance.id(), "instance constructed");
        Ok(instance)
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("name", &self.label)
            .field("declared", &self.declared)
            .field("closure", &self.closure)
            .field("ancestry", &self.ancestry)
            .field("directives", &self.directives)
            .finish_non_exhaustive()
    }
}
