//! Capability views: one instance seen through one interface.

use std::fmt;
use std::sync::{Arc, Weak};

use facet_ir::Name;

use crate::type_def::Binding;
use crate::{Instance, InterfaceBinding, ObjectError, Value};

pub(crate) struct ViewInner {
    instance: Instance,
    binding: Arc<InterfaceBinding>,
}

/// A narrowed handle exposing only one interface's members.
///
/// Obtained from [`Instance::cast_to_interface`]. Clones share identity.
#[derive(Clone)]
pub struct CapabilityView(Arc<ViewInner>);

impl CapabilityView {
    pub(crate) fn bind(instance: Instance, binding: Arc<InterfaceBinding>) -> Self {
        CapabilityView(Arc::new(ViewInner { instance, binding }))
    }

    pub(crate) fn from_inner(inner: Arc<ViewInner>) -> Self {
        CapabilityView(inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<ViewInner> {
        Arc::downgrade(&self.0)
    }

    /// The interface this view was bound for.
    #[inline]
    pub fn interface(&self) -> Name {
        self.0.binding.interface().name
    }

    pub fn binding(&self) -> &Arc<InterfaceBinding> {
        &self.0.binding
    }

    /// The underlying instance.
    #[inline]
    pub fn instance(&self) -> &Instance {
        &self.0.instance
    }

    /// Check if this view exposes `name` as a method, subscription member or
    /// property.
    pub fn has_member(&self, name: Name) -> bool {
        self.0.binding.has_member(name)
    }

    /// Identity comparison of views.
    #[inline]
    pub fn ptr_eq(&self, other: &CapabilityView) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn unknown(&self, member: Name) -> ObjectError {
        ObjectError::UnknownMember {
            owner: self.0.binding.label().to_owned(),
            member: self.0.binding.render(member),
        }
    }

    /// Call a method of the interface.
    pub fn call(&self, method: Name, args: &[Value]) -> Result<Value, ObjectError> {
        match self.0.binding.member(method) {
            Some(Binding::Method(f)) => f(&self.0.instance, args),
            Some(Binding::Property { .. }) => Err(ObjectError::NotCallable {
                owner: self.0.binding.label().to_owned(),
                member: self.0.binding.render(method),
            }),
            None => Err(self.unknown(method)),
        }
    }

    /// The property accessor: no arguments reads, one argument writes.
    ///
    /// Two or more arguments fail with `InvalidPropertyArity`, and a write
    /// to a read-only property fails with `ReadOnlyPropertyWrite`. A write
    /// returns `Void`.
    pub fn property(&self, name: Name, args: &[Value]) -> Result<Value, ObjectError> {
        let Some(Binding::Property {
            read_only,
            getter,
            setter,
        }) = self.0.binding.member(name)
        else {
            return Err(self.unknown(name));
        };

        match args {
            [] => getter(&self.0.instance, &[]),
            [_] if *read_only => Err(ObjectError::ReadOnlyPropertyWrite {
                interface: self.0.binding.label().to_owned(),
                property: self.0.binding.render(name),
            }),
            [_] => match setter {
                Some(set) => set(&self.0.instance, args).map(|_| Value::Void),
                None => Err(self.unknown(name)),
            },
            _ => Err(ObjectError::InvalidPropertyArity {
                interface: self.0.binding.label().to_owned(),
                property: self.0.binding.render(name),
                count: args.len(),
            }),
        }
    }

    /// Read a property.
    pub fn get(&self, name: Name) -> Result<Value, ObjectError> {
        self.property(name, &[])
    }

    /// Write a property.
    pub fn set(&self, name: Name, value: impl Into<Value>) -> Result<(), ObjectError> {
        self.property(name, &[value.into()]).map(drop)
    }

    /// Attach `handler` to `event` through the `on<Event>` member.
    pub fn subscribe(&self, event: Name, handler: impl Into<Value>) -> Result<Value, ObjectError> {
        let (on, _) = self
            .0
            .binding
            .event_members(event)
            .ok_or_else(|| self.unknown(event))?;
        self.call(on, &[handler.into()])
    }

    /// Detach `handler` from `event` through the `un<Event>` member.
    pub fn unsubscribe(
        &self,
        event: Name,
        handler: impl Into<Value>,
    ) -> Result<Value, ObjectError> {
        let (_, un) = self
            .0
            .binding
            .event_members(event)
            .ok_or_else(|| self.unknown(event))?;
        self.call(un, &[handler.into()])
    }
}

impl PartialEq for CapabilityView {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for CapabilityView {}

impl fmt::Debug for CapabilityView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} as {}", self.0.instance, self.0.binding.label())
    }
}
