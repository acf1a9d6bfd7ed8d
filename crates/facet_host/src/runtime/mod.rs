//! The process-scoped runtime.
//!
//! # Declaring a type
//!
//! `declare_type` runs the class-definition pipeline:
//!
//! 1. Reject a duplicate name and look up the superclass
//! 2. Merge the superclass's members, interfaces, initializers and injections
//! 3. Check conformance and build the interface closure
//! 4. Bind the type and insert it into the type table
//! 5. Register it with the container
//! 6. Apply the suppression directive
//! 7. Schedule it if it is a deferred singleton
//!
//! A type the container rejects is removed from the table again, and its
//! suppression directive never takes effect. A deferred
//! singleton whose construction fails stays declared; the error is returned.
//!
//! # Instantiating
//!
//! Construction runs the initializer chain, then fills every injection
//! field through the container's accessor surface.

use std::ops::ControlFlow;
use std::sync::Arc;

use facet_inject::{
    Activator, Container, DeferredSingletons, InjectError, Lifetime, Resolved, Scheduled,
};
use facet_ir::{Name, SharedInterner};
use facet_object::{CapabilityView, CastTarget, Instance, TypeDef};
use facet_types::{
    check_conformance, InterfaceDef, InterfaceRegistry, Markers, RegistryError, SharedRegistry,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{HostError, InterfaceDecl, RuntimeConfig, TypeDecl};

/// Interfaces, types, the container and the deferred singletons of one
/// process.
pub struct Runtime {
    config: RuntimeConfig,
    interner: SharedInterner,
    registry: SharedRegistry,
    types: RwLock<FxHashMap<Name, Arc<TypeDef>>>,
    container: Container,
    deferred: DeferredSingletons,
}

impl Runtime {
    /// A runtime with the standard marker names and `[]` collection suffix.
    pub fn new() -> Result<Self, HostError> {
        Self::with_config(RuntimeConfig::default())
    }

    /// Fails if the two marker names are equal.
    pub fn with_config(config: RuntimeConfig) -> Result<Self, HostError> {
        let interner = SharedInterner::new();
        let markers = Markers::named(
            &interner,
            &config.dependency_marker,
            &config.singleton_marker,
        );
        let registry = SharedRegistry::new(InterfaceRegistry::with_markers(
            interner.clone(),
            markers,
        )?);
        let container = Container::new(
            interner.clone(),
            registry.clone(),
            markers,
            &config.collection_suffix,
        );
        Ok(Runtime {
            config,
            interner,
            registry,
            types: RwLock::new(FxHashMap::default()),
            container,
            deferred: DeferredSingletons::new(),
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn markers(&self) -> Markers {
        self.container.markers()
    }

    /// Intern `s`.
    #[inline]
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// The name of `s` if it was ever interned. Queries go through this so
    /// that asking about an unknown string does not intern it.
    #[inline]
    fn known(&self, s: &str) -> Option<Name> {
        self.interner.get(s)
    }

    /// Shorthand for `CastTarget::Interface(name(interface))`.
    pub fn interface_target(&self, interface: &str) -> CastTarget {
        CastTarget::Interface(self.name(interface))
    }

    /// Shorthand for `CastTarget::Type(name(type_name))`.
    pub fn type_target(&self, type_name: &str) -> CastTarget {
        CastTarget::Type(self.name(type_name))
    }

    // === Interfaces ===

    pub fn define_interface(
        &self,
        name: &str,
        decl: &InterfaceDecl,
    ) -> Result<Arc<InterfaceDef>, HostError> {
        let config = decl.lower(&self.interner);
        let def = self.registry.write().define(self.name(name), config)?;
        Ok(def)
    }

    /// Check if `ancestor` is a strict ancestor of `target`.
    pub fn is_derived_from(&self, target: &str, ancestor: &str) -> Result<bool, HostError> {
        let require = |name: &str| {
            self.known(name).ok_or_else(|| RegistryError::UnknownInterface {
                name: name.to_owned(),
            })
        };
        let (target, ancestor) = (require(target)?, require(ancestor)?);
        Ok(self.registry.read().is_derived_from(target, ancestor)?)
    }

    /// Walk the parents of `name` depth-first, pre-order, until the visitor
    /// breaks.
    pub fn each_parent<F>(&self, name: &str, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        let Some(name) = self.known(name) else {
            return ControlFlow::Continue(());
        };
        let registry = self.registry.read();
        registry.each_parent(name, |parent| {
            visit(self.interner.lookup(parent))
        })
    }

    // === Types ===

    /// Declare a concrete type.
    #[tracing::instrument(level = "debug", skip_all, fields(type_name = decl.name()))]
    pub fn declare_type(&self, decl: TypeDecl) -> Result<Name, HostError> {
        let (mut parts, extends) = decl.lower(&self.interner);
        let name = parts.name;

        if self.types.read().contains_key(&name) {
            return Err(self.duplicate(name));
        }
        let superclass = extends
            .map(|sup| {
                self.type_def(sup).ok_or_else(|| InjectError::UnknownType {
                    type_name: self.interner.lookup(sup).to_owned(),
                })
            })
            .transpose()?;

        if let Some(sup) = &superclass {
            parts.inherit_from(sup);
        }

        let closure = {
            let registry = self.registry.read();
            check_conformance(&registry, name, &parts.implement, &parts.members)?;
            registry.closure(&parts.implement)
        };
        let def = TypeDef::new(parts, superclass.as_ref(), closure, &self.interner);

        {
            let mut types = self.types.write();
            if types.contains_key(&name) {
                return Err(self.duplicate(name));
            }
            types.insert(name, Arc::clone(&def));
        }

        if let Err(err) = self.container.register_type(&def) {
            self.types.write().remove(&name);
            return Err(err.into());
        }
        if let Some(suppressed) = def.directives().suppress {
            self.container.suppress(suppressed);
        }

        if def.directives().deferred_singleton {
            let scheduled = self.deferred.schedule(&def, &self.container, self)?;
            if let Scheduled::Constructed(instance) = scheduled {
                tracing::debug!(instance = ?instance, "deferred singleton constructed");
            }
        }
        Ok(name)
    }

    fn duplicate(&self, name: Name) -> HostError {
        HostError::DuplicateType {
            type_name: self.interner.lookup(name).to_owned(),
        }
    }

    pub fn type_def(&self, type_name: Name) -> Option<Arc<TypeDef>> {
        self.types.read().get(&type_name).cloned()
    }

    /// Look up a declared type by its string name.
    pub fn find_type(&self, type_name: &str) -> Option<Arc<TypeDef>> {
        self.interner
            .get(type_name)
            .and_then(|name| self.type_def(name))
    }

    /// The lifetime the container gave a type, if it takes part in
    /// injection.
    pub fn lifetime(&self, type_name: &str) -> Option<Lifetime> {
        self.container.lifetime(self.known(type_name)?)
    }

    /// Construct an instance of a declared type.
    pub fn instantiate(&self, type_name: &str) -> Result<Instance, HostError> {
        let name = self.known(type_name).ok_or_else(|| InjectError::UnknownType {
            type_name: type_name.to_owned(),
        })?;
        Ok(Activator::instantiate(self, name)?)
    }

    // === Resolution ===

    pub fn resolve(&self, interface: &str) -> Result<CapabilityView, HostError> {
        let name = self
            .known(interface)
            .ok_or_else(|| InjectError::NoViableImplementation {
                interface: interface.to_owned(),
            })?;
        Ok(self.container.resolve(name, self)?)
    }

    pub fn resolve_all(&self, interface: &str) -> Result<Vec<CapabilityView>, HostError> {
        match self.known(interface) {
            Some(name) => Ok(self.container.resolve_all(name, self)?),
            None => Ok(Vec::new()),
        }
    }

    /// Resolve `I` or `I[]`.
    pub fn resolve_key(&self, key: &str) -> Result<Resolved, HostError> {
        let name = self
            .known(key)
            .ok_or_else(|| InjectError::UnresolvableKey {
                key: key.to_owned(),
            })?;
        Ok(self.container.resolve_key(name, self)?)
    }

    pub fn can_resolve(&self, key: &str) -> bool {
        self.known(key)
            .is_some_and(|name| self.container.can_resolve(name))
    }

    /// Exclude a type from resolution. It may not be declared yet.
    pub fn suppress(&self, type_name: &str) -> bool {
        self.container.suppress(self.name(type_name))
    }

    /// End the registration phase and construct every queued deferred
    /// singleton, in declaration order.
    pub fn finalize_registration(&self) -> Result<Vec<Instance>, HostError> {
        Ok(self.deferred.finalize(&self.container, self)?)
    }

    pub fn is_finalized(&self) -> bool {
        self.deferred.is_finalized()
    }

    /// The class-level instance of a deferred singleton, once constructed.
    pub fn singleton(&self, type_name: &str) -> Option<Instance> {
        self.deferred.instance(self.known(type_name)?)
    }
}

impl Activator for Runtime {
    fn instantiate(&self, type_name: Name) -> Result<Instance, InjectError> {
        let def = self
            .type_def(type_name)
            .ok_or_else(|| InjectError::UnknownType {
                type_name: self.interner.lookup(type_name).to_owned(),
            })?;
        if def.is_abstract() {
            return Err(InjectError::AbstractType {
                type_name: def.label().to_owned(),
            });
        }

        let instance = def.construct().map_err(|source| InjectError::Construction {
            type_name: def.label().to_owned(),
            source,
        })?;
        for injection in def.inject() {
            let resolved = self.container.resolve_key(injection.key, self)?;
            instance.set_field(injection.field, resolved.into());
        }
        Ok(instance)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("interfaces", &self.registry.read().len())
            .field("types", &self.types.read().len())
            .field("container", &self.container)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}
