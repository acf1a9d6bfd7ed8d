//! Registry for interface definitions.
//!
//! The `InterfaceRegistry` stores interface definitions and answers ancestry
//! queries over them.
//!
//! # Design
//!
//! - Definitions stored once in a `Vec<Arc<InterfaceDef>>`, in definition order
//! - Name → definition index for lookup
//! - Parents must exist at definition time, so the inheritance graph is a DAG
//!   by construction and no walk needs cycle protection
//! - Effective member sets and the ancestor list are folded from the direct
//!   parents' already computed ones, so they are never recomputed after
//!   definition and ancestry queries never walk the graph

use std::ops::ControlFlow;
use std::sync::Arc;

use facet_ir::{Name, SharedInterner};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::{Markers, PropertySpec, RegistryError};

/// Declared contents of a new interface.
///
/// Members listed here are the interface's own; inherited members are added
/// by [`InterfaceRegistry::define`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceConfig {
    pub inherit: SmallVec<[Name; 2]>,
    pub methods: Vec<Name>,
    pub properties: Vec<PropertySpec>,
    pub events: Vec<Name>,
}

impl InterfaceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn inherit(mut self, parent: Name) -> Self {
        self.inherit.push(parent);
        self
    }

    #[must_use]
    pub fn method(mut self, method: Name) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn property(mut self, property: impl Into<PropertySpec>) -> Self {
        self.properties.push(property.into());
        self
    }

    #[must_use]
    pub fn event(mut self, event: Name) -> Self {
        self.events.push(event);
        self
    }
}

/// A registered interface with its effective member sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceDef {
    /// The interface name.
    pub name: Name,

    /// Direct parents, in declaration order, without duplicates.
    pub parents: SmallVec<[Name; 2]>,

    /// Own methods followed by every ancestor's, deduplicated by name.
    pub methods: Vec<Name>,

    /// Own properties followed by every ancestor's, deduplicated by name.
    pub properties: Vec<PropertySpec>,

    /// Own events followed by every ancestor's, deduplicated by name.
    pub events: Vec<Name>,

    /// Every strict ancestor, deduplicated, in `each_parent` order.
    pub ancestors: Vec<Name>,
}

impl InterfaceDef {
    /// An interface with no required members, used purely as a tag.
    pub fn is_marker(&self) -> bool {
        self.methods.is_empty() && self.properties.is_empty() && self.events.is_empty()
    }

    #[inline]
    pub fn has_method(&self, name: Name) -> bool {
        self.methods.contains(&name)
    }

    pub fn property(&self, name: Name) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }

    #[inline]
    pub fn has_event(&self, name: Name) -> bool {
        self.events.contains(&name)
    }
}

/// Registry for interface definitions.
#[derive(Clone, Debug)]
pub struct InterfaceRegistry {
    /// All registered definitions, in definition order.
    interfaces: Vec<Arc<InterfaceDef>>,

    /// Name → definition index.
    by_name: FxHashMap<Name, usize>,

    /// Used only to render names into error messages and trace fields.
    interner: SharedInterner,
}

fn dedup_names(names: impl IntoIterator<Item = Name>) -> Vec<Name> {
    let mut seen = FxHashSet::default();
    names.into_iter().filter(|n| seen.insert(*n)).collect()
}

impl InterfaceRegistry {
    /// Create a new empty registry.
    pub fn new(interner: SharedInterner) -> Self {
        InterfaceRegistry {
            interfaces: Vec::new(),
            by_name: FxHashMap::default(),
            interner,
        }
    }

    /// Create a registry seeded with the two marker interfaces, the singleton
    /// marker inheriting from the dependency marker.
    pub fn with_markers(interner: SharedInterner, markers: Markers) -> Result<Self, RegistryError> {
        let mut registry = Self::new(interner);
        registry.define(markers.dependency, InterfaceConfig::new())?;
        registry.define(
            markers.singleton,
            InterfaceConfig::new().inherit(markers.dependency),
        )?;
        Ok(registry)
    }

    /// The interner names are rendered with.
    #[inline]
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    fn render(&self, name: Name) -> String {
        self.interner.lookup(name).to_owned()
    }

    fn unknown(&self, name: Name) -> RegistryError {
        RegistryError::UnknownInterface {
            name: self.render(name),
        }
    }

    // === Definition ===

    /// Register a new interface.
    ///
    /// Fails if `name` is taken or any parent is not yet registered. Nothing
    /// is registered on failure.
    #[tracing::instrument(level = "debug", skip_all, fields(interface = self.interner.lookup(name)))]
    pub fn define(
        &mut self,
        name: Name,
        config: InterfaceConfig,
    ) -> Result<Arc<InterfaceDef>, RegistryError> {
        if self.contains(name) {
            return Err(RegistryError::DuplicateInterface {
                name: self.render(name),
            });
        }

        let mut parents: SmallVec<[Name; 2]> = SmallVec::new();
        for &parent in &config.inherit {
            if !self.contains(parent) {
                return Err(RegistryError::UnknownParent {
                    interface: self.render(name),
                    parent: self.render(parent),
                });
            }
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }

        // Own declarations first, then each parent's effective sets.
        let mut methods = config.methods;
        let mut properties = config.properties;
        let mut events = config.events;
        let mut ancestors = Vec::new();
        for parent in parents.iter().filter_map(|&p| self.get(p)) {
            methods.extend(parent.methods.iter().copied());
            properties.extend(parent.properties.iter().copied());
            events.extend(parent.events.iter().copied());
            ancestors.push(parent.name);
            ancestors.extend(parent.ancestors.iter().copied());
        }

        let def = Arc::new(InterfaceDef {
            name,
            parents,
            methods: dedup_names(methods),
            properties: PropertySpec::normalize(properties),
            events: dedup_names(events),
            ancestors: dedup_names(ancestors),
        });

        tracing::debug!(
            methods = def.methods.len(),
            properties = def.properties.len(),
            events = def.events.len(),
            "interface defined"
        );

        self.by_name.insert(name, self.interfaces.len());
        self.interfaces.push(Arc::clone(&def));
        Ok(def)
    }

    // === Lookup ===

    /// Look up an interface by name.
    #[inline]
    pub fn get(&self, name: Name) -> Option<&Arc<InterfaceDef>> {
        self.by_name
            .get(&name)
            .and_then(|&i| self.interfaces.get(i))
    }

    /// Check if an interface with the given name exists.
    #[inline]
    pub fn contains(&self, name: Name) -> bool {
        self.by_name.contains_key(&name)
    }

    /// Look up an interface, failing with `UnknownInterface`.
    pub fn require(&self, name: Name) -> Result<&Arc<InterfaceDef>, RegistryError> {
        self.get(name).ok_or_else(|| self.unknown(name))
    }

    // === Ancestry ===

    /// Visit the transitive parent closure depth-first, pre-order.
    ///
    /// The visitor stops the walk by returning `ControlFlow::Break`. A parent
    /// reachable along several paths is visited once per path. Unknown names
    /// have no parents.
    pub fn each_parent<F>(&self, name: Name, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(Name) -> ControlFlow<()>,
    {
        self.walk_parents(name, &mut visit)
    }

    fn walk_parents(&self, name: Name, visit: &mut dyn FnMut(Name) -> ControlFlow<()>) -> ControlFlow<()> {
        let Some(def) = self.get(name) else {
            return ControlFlow::Continue(());
        };
        for &parent in &def.parents {
            visit(parent)?;
            self.walk_parents(parent, visit)?;
        }
        ControlFlow::Continue(())
    }

    /// The ancestor closure of `name`, deduplicated, in `each_parent` order.
    /// Does not include `name` itself. Unknown names have no ancestors.
    pub fn ancestors(&self, name: Name) -> &[Name] {
        self.get(name)
            .map(|def| def.ancestors.as_slice())
            .unwrap_or(&[])
    }

    /// Check if `ancestor` is a strict ancestor of `target`.
    ///
    /// An interface is not its own ancestor.
    pub fn is_derived_from(&self, target: Name, ancestor: Name) -> Result<bool, RegistryError> {
        self.require(target)?;
        self.require(ancestor)?;
        Ok(self.inherits(target, ancestor))
    }

    /// Reflexive, infallible form of [`is_derived_from`](Self::is_derived_from).
    /// Unknown names derive from nothing.
    pub fn is_or_derives(&self, target: Name, ancestor: Name) -> bool {
        self.contains(target) && (target == ancestor || self.inherits(target, ancestor))
    }

    fn inherits(&self, target: Name, ancestor: Name) -> bool {
        self.ancestors(target).contains(&ancestor)
    }

    /// The closure of a list of declared interfaces: each declared name
    /// followed by its ancestors, deduplicated, unknown names skipped.
    pub fn closure(&self, declared: &[Name]) -> Vec<Arc<InterfaceDef>> {
        let mut seen = FxHashSet::default();
        let mut result = Vec::new();
        for &name in declared {
            if !self.contains(name) {
                continue;
            }
            for member in std::iter::once(name).chain(self.ancestors(name).iter().copied()) {
                if seen.insert(member) {
                    if let Some(def) = self.get(member) {
                        result.push(Arc::clone(def));
                    }
                }
            }
        }
        result
    }

    // === Iteration ===

    /// Iterate over all definitions in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<InterfaceDef>> {
        self.interfaces.iter()
    }

    /// Get the number of registered interfaces.
    #[inline]
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

/// Shared, lockable registry handle.
///
/// Written during the registration phase, read-mostly afterwards, so it sits
/// behind a readers-biased `RwLock`.
#[derive(Clone, Debug)]
pub struct SharedRegistry(Arc<RwLock<InterfaceRegistry>>);

impl SharedRegistry {
    pub fn new(registry: InterfaceRegistry) -> Self {
        SharedRegistry(Arc::new(RwLock::new(registry)))
    }

    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, InterfaceRegistry> {
        self.0.read()
    }

    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, InterfaceRegistry> {
        self.0.write()
    }
}
