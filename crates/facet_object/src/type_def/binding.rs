//! Per-interface binding tables.

use std::fmt;
use std::sync::Arc;

use facet_ir::{Name, SharedInterner};
use facet_types::{getter_name, setter_name, subscribe_name, unsubscribe_name, InterfaceDef};
use rustc_hash::FxHashMap;

use super::{Members, MethodFn};

#[derive(Clone)]
pub(crate) enum Binding {
    Method(MethodFn),
    Property {
        read_only: bool,
        getter: MethodFn,
        setter: Option<MethodFn>,
    },
}

/// One interface bound against one concrete type.
///
/// Shared by every view of that interface over instances of the type.
pub struct InterfaceBinding {
    interface: Arc<InterfaceDef>,
    label: &'static str,
    /// Methods, `on`/`un` subscription pairs and properties, keyed by the
    /// name a view exposes them under.
    members: FxHashMap<Name, Binding>,
    /// Event name → (subscribe, unsubscribe) member names.
    events: FxHashMap<Name, (Name, Name)>,
    interner: SharedInterner,
}

impl InterfaceBinding {
    pub(crate) fn bind(
        interface: Arc<InterfaceDef>,
        members: &Members,
        interner: &SharedInterner,
    ) -> Self {
        let mut bound = FxHashMap::default();
        let mut events = FxHashMap::default();

        let bind_method = |bound: &mut FxHashMap<Name, Binding>, name: Name| {
            if let Some(f) = members.get(name) {
                bound.insert(name, Binding::Method(Arc::clone(f)));
            }
        };

        for &name in &interface.methods {
            bind_method(&mut bound, name);
        }

        for &event in &interface.events {
            let on = subscribe_name(interner, event);
            let un = unsubscribe_name(interner, event);
            bind_method(&mut bound, on);
            bind_method(&mut bound, un);
            events.insert(event, (on, un));
        }

        for property in &interface.properties {
            let Some(getter) = members.get(getter_name(interner, property.name)) else {
                continue;
            };
            let setter = if property.read_only {
                None
            } else {
                members.get(setter_name(interner, property.name)).cloned()
            };
            bound.insert(
                property.name,
                Binding::Property {
                    read_only: property.read_only,
                    getter: Arc::clone(getter),
                    setter,
                },
            );
        }

        InterfaceBinding {
            label: interner.lookup(interface.name),
            interface,
            members: bound,
            events,
            interner: interner.clone(),
        }
    }

    /// The bound interface.
    pub fn interface(&self) -> &Arc<InterfaceDef> {
        &self.interface
    }

    /// The interface name as a string.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Check if a view of this binding exposes `name`.
    pub fn has_member(&self, name: Name) -> bool {
        self.members.contains_key(&name)
    }

    /// The (subscribe, unsubscribe) member names for `event`.
    pub fn event_members(&self, event: Name) -> Option<(Name, Name)> {
        self.events.get(&event).copied()
    }

    pub(crate) fn member(&self, name: Name) -> Option<&Binding> {
        self.members.get(&name)
    }

    pub(crate) fn render(&self, name: Name) -> String {
        self.interner.lookup(name).to_owned()
    }
}

impl fmt::Debug for InterfaceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceBinding")
            .field("interface", &self.label)
            .field("members", &self.members.len())
            .finish_non_exhaustive()
    }
}
