//! Object instances.
//!
//! An [`Instance`] is a shared handle. Clones refer to the same object, and
//! equality is identity.
//!
//! # View cache
//!
//! Each instance keeps interface name → `Weak` view. A view holds its
//! instance strongly, the cache holds the view weakly, so there is no
//! reference cycle. Repeated casts return the same view while anyone holds
//! it, and a fresh one after the last holder drops it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use facet_ir::Name;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::view::ViewInner;
use crate::{CapabilityView, ObjectError, TypeDef, Value};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct InstanceInner {
    id: u64,
    ty: Arc<TypeDef>,
    fields: Mutex<FxHashMap<Name, Value>>,
    views: Mutex<FxHashMap<Name, Weak<ViewInner>>>,
}

/// A live object.
#[derive(Clone)]
pub struct Instance(Arc<InstanceInner>);

impl Instance {
    /// Allocate an instance without running initializers.
    ///
    /// Most callers want [`TypeDef::construct`].
    pub fn new(ty: Arc<TypeDef>) -> Self {
        Instance(Arc::new(InstanceInner {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            ty,
            fields: Mutex::new(FxHashMap::default()),
            views: Mutex::new(FxHashMap::default()),
        }))
    }

    /// Process-unique id.
    #[inline]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[inline]
    pub fn type_def(&self) -> &Arc<TypeDef> {
        &self.0.ty
    }

    #[inline]
    pub fn type_name(&self) -> Name {
        self.0.ty.name()
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    // === Fields ===

    /// Read a field.
    pub fn field(&self, name: Name) -> Option<Value> {
        self.0.fields.lock().get(&name).cloned()
    }

    /// Write a field, returning the previous value.
    pub fn set_field(&self, name: Name, value: Value) -> Option<Value> {
        self.0.fields.lock().insert(name, value)
    }

    // === Members ===

    #[inline]
    pub fn has_member(&self, name: Name) -> bool {
        self.0.ty.members().contains(name)
    }

    /// Call a member of the concrete type.
    pub fn call(&self, name: Name, args: &[Value]) -> Result<Value, ObjectError> {
        let Some(f) = self.0.ty.members().get(name) else {
            return Err(ObjectError::UnknownMember {
                owner: self.0.ty.label().to_owned(),
                member: self.0.ty.interner().lookup(name).to_owned(),
            });
        };
        f(self, args)
    }

    // === Casting ===

    /// Check if `interface` is in this instance's interface closure.
    #[inline]
    pub fn implements(&self, interface: Name) -> bool {
        self.0.ty.implements(interface)
    }

    /// Check if this instance's type is `type_name` or a subtype of it.
    #[inline]
    pub fn is_instance_of(&self, type_name: Name) -> bool {
        self.0.ty.is_subtype_of(type_name)
    }

    /// Project this instance onto one of its interfaces.
    ///
    /// Returns `None` if the interface is not in the closure, which includes
    /// every name that was never defined as an interface.
    pub fn cast_to_interface(&self, interface: Name) -> Option<CapabilityView> {
        let binding = self.0.ty.binding(interface)?;

        let mut views = self.0.views.lock();
        if let Some(live) = views.get(&interface).and_then(Weak::upgrade) {
            return Some(CapabilityView::from_inner(live));
        }

        let view = CapabilityView::bind(self.clone(), Arc::clone(binding));
        views.insert(interface, view.downgrade());
        tracing::trace!(
            type_name = self.0.ty.label(),
            interface = binding.label(),
            id = self.0.id,
            "view synthesized"
        );
        Some(view)
    }

    /// Identity narrowing: this instance, if its type is `type_name` or a
    /// subtype of it.
    pub fn cast_to_type(&self, type_name: Name) -> Option<Instance> {
        self.is_instance_of(type_name).then(|| self.clone())
    }

    /// Check if a cast to `interface` would currently return a cached view.
    pub fn has_live_view(&self, interface: Name) -> bool {
        self.0
            .views
            .lock()
            .get(&interface)
            .is_some_and(|weak| weak.strong_count() > 0)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Instance {}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.0.ty.label(), self.0.id)
    }
}
