//! Uniform casting over instances and views.

use facet_ir::Name;

use crate::{CapabilityView, Instance};

/// What to cast to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CastTarget {
    /// Project onto an interface view.
    Interface(Name),
    /// Narrow to a concrete type or one of its supertypes.
    Type(Name),
}

/// The result of a cast: the instance itself, or a view over it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Subject {
    Instance(Instance),
    View(CapabilityView),
}

impl Subject {
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Subject::Instance(instance) => Some(instance),
            Subject::View(_) => None,
        }
    }

    pub fn as_view(&self) -> Option<&CapabilityView> {
        match self {
            Subject::View(view) => Some(view),
            Subject::Instance(_) => None,
        }
    }

    pub fn into_view(self) -> Option<CapabilityView> {
        match self {
            Subject::View(view) => Some(view),
            Subject::Instance(_) => None,
        }
    }

    pub fn into_instance(self) -> Option<Instance> {
        match self {
            Subject::Instance(instance) => Some(instance),
            Subject::View(_) => None,
        }
    }
}

impl From<Instance> for Subject {
    fn from(instance: Instance) -> Self {
        Subject::Instance(instance)
    }
}

impl From<CapabilityView> for Subject {
    fn from(view: CapabilityView) -> Self {
        Subject::View(view)
    }
}

/// Casting and identity checks shared by instances and views.
///
/// Everything is answered by the underlying instance, so a view can be
/// re-cast to a sibling interface or back to its concrete type.
pub trait Introspect {
    /// The instance every query is answered by.
    fn underlying(&self) -> &Instance;

    /// Cast to an interface view or narrow to a type. Mismatches are `None`.
    fn cast_to(&self, target: CastTarget) -> Option<Subject> {
        let instance = self.underlying();
        match target {
            CastTarget::Interface(name) => instance.cast_to_interface(name).map(Subject::View),
            CastTarget::Type(name) => instance.cast_to_type(name).map(Subject::Instance),
        }
    }

    /// Check if `cast_to(target)` would succeed.
    fn is_a(&self, target: CastTarget) -> bool {
        let instance = self.underlying();
        match target {
            CastTarget::Interface(name) => instance.implements(name),
            CastTarget::Type(name) => instance.is_instance_of(name),
        }
    }

    /// Check if both sides resolve to the same underlying instance.
    fn same_as(&self, other: &dyn Introspect) -> bool {
        self.underlying().ptr_eq(other.underlying())
    }
}

impl Introspect for Instance {
    fn underlying(&self) -> &Instance {
        self
    }
}

impl Introspect for CapabilityView {
    fn underlying(&self) -> &Instance {
        self.instance()
    }
}

impl Introspect for Subject {
    fn underlying(&self) -> &Instance {
        match self {
            Subject::Instance(instance) => instance,
            Subject::View(view) => view.instance(),
        }
    }
}
