//! Dependency resolution container.
//!
//! Maps interface names to the concrete types registered against them and
//! turns a request for an interface into a view over a live instance.
//!
//! # Registration
//!
//! A type takes part in injection iff its interface closure contains the
//! dependency marker and it is not abstract. It is registered against every
//! closure interface derived from that marker, markers excluded. Its
//! lifetime is decided once: singleton iff some closure interface is or
//! derives from the singleton marker.
//!
//! # Resolution
//!
//! `resolve` runs two passes over the non-suppressed configs of an
//! interface, in registration order:
//!
//! 1. The first singleton that already has an instance wins
//! 2. Otherwise the first config wins, constructing if needed
//!
//! Configs are cloned out of the lock before anything is constructed, so an
//! activator may resolve recursively. A type requested again on the thread
//! that is still activating it fails with `DependencyCycle`.

mod activation;
mod singleton;
mod surface;

use facet_ir::{Name, SharedInterner};
use facet_object::{CapabilityView, Instance, TypeDef, Value};
use facet_types::{Markers, SharedRegistry};
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{InjectError, Lookup};
use activation::ActivationStacks;
use singleton::SingletonCache;
use surface::ResolutionSurface;

pub use surface::Accessor;

/// How many instances of a type the container hands out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// A fresh instance per resolution.
    Transient,
    /// One instance, constructed on first resolution and shared.
    Singleton,
}

/// One (interface, type) registration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DependencyConfig {
    pub type_name: Name,
    pub lifetime: Lifetime,
}

impl DependencyConfig {
    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.lifetime == Lifetime::Singleton
    }
}

/// Constructs instances of registered types by name.
///
/// Implemented by the host, which owns the type table and runs
/// initializers and field injection.
pub trait Activator {
    fn instantiate(&self, type_name: Name) -> Result<Instance, InjectError>;
}

impl<F> Activator for F
where
    F: Fn(Name) -> Result<Instance, InjectError>,
{
    fn instantiate(&self, type_name: Name) -> Result<Instance, InjectError> {
        self(type_name)
    }
}

/// The result of resolving a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    One(CapabilityView),
    Many(Vec<CapabilityView>),
}

impl Resolved {
    pub fn into_one(self) -> Option<CapabilityView> {
        match self {
            Resolved::One(view) => Some(view),
            Resolved::Many(_) => None,
        }
    }

    pub fn into_many(self) -> Option<Vec<CapabilityView>> {
        match self {
            Resolved::Many(views) => Some(views),
            Resolved::One(_) => None,
        }
    }
}

impl From<Resolved> for Value {
    fn from(resolved: Resolved) -> Self {
        match resolved {
            Resolved::One(view) => Value::View(view),
            Resolved::Many(views) => Value::list(views.into_iter().map(Value::View).collect()),
        }
    }
}

/// Dependency resolution container.
///
/// Every method takes `&self`; state sits behind locks that are never held
/// across an activator call, except a singleton slot's build lock during
/// its own first construction.
pub struct Container {
    interner: SharedInterner,
    registry: SharedRegistry,
    markers: Markers,
    configs: RwLock<Lookup<Name, DependencyConfig>>,
    lifetimes: RwLock<FxHashMap<Name, Lifetime>>,
    suppressed: RwLock<FxHashSet<Name>>,
    surface: RwLock<ResolutionSurface>,
    singletons: SingletonCache,
    activations: ActivationStacks,
}

impl Container {
    /// Create a container over `registry`, which must already define both
    /// markers.
    pub fn new(
        interner: SharedInterner,
        registry: SharedRegistry,
        markers: Markers,
        collection_suffix: &str,
    ) -> Self {
        Container {
            interner,
            registry,
            markers,
            configs: RwLock::new(Lookup::new()),
            lifetimes: RwLock::new(FxHashMap::default()),
            suppressed: RwLock::new(FxHashSet::default()),
            surface: RwLock::new(ResolutionSurface::new(collection_suffix)),
            singletons: SingletonCache::default(),
            activations: ActivationStacks::default(),
        }
    }

    pub fn markers(&self) -> Markers {
        self.markers
    }

    fn render(&self, name: Name) -> String {
        self.interner.lookup(name).to_owned()
    }

    // === Registration ===

    /// Record that `type_name` implements `interface`.
    ///
    /// The first registration for an interface installs its singular and
    /// plural accessors.
    pub fn register(&self, interface: Name, type_name: Name, lifetime: Lifetime) {
        self.configs.write().add(
            interface,
            DependencyConfig {
                type_name,
                lifetime,
            },
        );
        let installed = self.surface.write().install(&self.interner, interface);
        tracing::debug!(
            interface = self.interner.lookup(interface),
            type_name = self.interner.lookup(type_name),
            ?lifetime,
            installed,
            "dependency registered"
        );
    }

    /// Register a declared type against every qualifying interface of its
    /// closure.
    ///
    /// Returns `None` for types that do not take part in injection.
    #[tracing::instrument(level = "debug", skip_all, fields(type_name = def.label()))]
    pub fn register_type(&self, def: &TypeDef) -> Result<Option<Lifetime>, InjectError> {
        let (lifetime, qualifying) = {
            let registry = self.registry.read();
            let closure = def.closure();
            if def.is_abstract() || !closure.contains(&self.markers.dependency) {
                return Ok(None);
            }

            let lifetime = if closure
                .iter()
                .any(|&iface| registry.is_or_derives(iface, self.markers.singleton))
            {
                Lifetime::Singleton
            } else {
                Lifetime::Transient
            };

            let qualifying: Vec<Name> = closure
                .iter()
                .copied()
                .filter(|&iface| {
                    !self.markers.is_marker(iface)
                        && registry.is_or_derives(iface, self.markers.dependency)
                })
                .collect();
            (lifetime, qualifying)
        };

        if qualifying.is_empty() {
            return Err(InjectError::NotInjectable {
                type_name: def.label().to_owned(),
                marker: self.render(self.markers.dependency),
            });
        }

        for iface in qualifying {
            self.register(iface, def.name(), lifetime);
        }
        self.lifetimes.write().insert(def.name(), lifetime);
        Ok(Some(lifetime))
    }

    /// The lifetime a registered type was given.
    pub fn lifetime(&self, type_name: Name) -> Option<Lifetime> {
        self.lifetimes.read().get(&type_name).copied()
    }

    /// Exclude a type from resolution. Idempotent, and cannot be undone.
    pub fn suppress(&self, type_name: Name) -> bool {
        let added = self.suppressed.write().insert(type_name);
        if added {
            tracing::debug!(type_name = self.interner.lookup(type_name), "type suppressed");
        }
        added
    }

    pub fn is_suppressed(&self, type_name: Name) -> bool {
        self.suppressed.read().contains(&type_name)
    }

    // === Queries ===

    /// Every config registered for `interface`, suppressed ones included.
    pub fn candidates(&self, interface: Name) -> Vec<DependencyConfig> {
        self.configs.read().get(&interface).to_vec()
    }

    /// Non-suppressed configs, in registration order.
    fn surviving(&self, interface: Name) -> Vec<DependencyConfig> {
        let suppressed = self.suppressed.read();
        self.configs
            .read()
            .get(&interface)
            .iter()
            .filter(|config| !suppressed.contains(&config.type_name))
            .copied()
            .collect()
    }

    /// Check if an accessor is installed under `key`.
    pub fn can_resolve(&self, key: Name) -> bool {
        self.surface.read().contains(key)
    }

    /// The accessor installed under `key`.
    pub fn accessor(&self, key: Name) -> Option<Accessor> {
        self.surface.read().get(key)
    }

    /// The plural key for `interface`.
    pub fn plural_key(&self, interface: Name) -> Name {
        self.surface.read().plural_key(&self.interner, interface)
    }

    /// The cached singleton instance of `type_name`, if constructed.
    pub fn singleton_instance(&self, type_name: Name) -> Option<Instance> {
        self.singletons.peek(type_name)
    }

    /// The singleton instance of `type_name`, constructed through
    /// `activator` if its slot is empty.
    pub fn singleton(
        &self,
        type_name: Name,
        activator: &dyn Activator,
    ) -> Result<Instance, InjectError> {
        self.singletons.get_or_construct(
            type_name,
            self.interner.lookup(type_name),
            || self.activate(type_name, activator),
        )
    }

    /// Fill the singleton slot of `type_name` with an instance built
    /// elsewhere. Returns `false` if the slot was already filled.
    pub fn seed_singleton(&self, type_name: Name, instance: Instance) -> bool {
        let seeded = self.singletons.seed(type_name, instance);
        tracing::debug!(
            type_name = self.interner.lookup(type_name),
            seeded,
            "singleton seeded"
        );
        seeded
    }

    // === Resolution ===

    fn activate(&self, type_name: Name, activator: &dyn Activator) -> Result<Instance, InjectError> {
        let Some(_activation) = self.activations.enter(type_name) else {
            return Err(InjectError::DependencyCycle {
                type_name: self.render(type_name),
            });
        };
        activator.instantiate(type_name)
    }

    fn instance_for(
        &self,
        config: DependencyConfig,
        activator: &dyn Activator,
    ) -> Result<Instance, InjectError> {
        match config.lifetime {
            Lifetime::Transient => self.activate(config.type_name, activator),
            Lifetime::Singleton => self.singleton(config.type_name, activator),
        }
    }

    fn view(&self, instance: &Instance, interface: Name) -> Result<CapabilityView, InjectError> {
        instance
            .cast_to_interface(interface)
            .ok_or_else(|| InjectError::ActivationMismatch {
                type_name: instance.type_def().label().to_owned(),
                interface: self.render(interface),
            })
    }

    /// Resolve one implementation of `interface`.
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(interface = self.interner.lookup(interface))
    )]
    pub fn resolve(
        &self,
        interface: Name,
        activator: &dyn Activator,
    ) -> Result<CapabilityView, InjectError> {
        let candidates = self.surviving(interface);

        for config in candidates.iter().filter(|c| c.is_singleton()) {
            if let Some(instance) = self.singletons.peek(config.type_name) {
                tracing::trace!(
                    type_name = self.interner.lookup(config.type_name),
                    "resolved cached singleton"
                );
                return self.view(&instance, interface);
            }
        }

        let Some(&first) = candidates.first() else {
            return Err(InjectError::NoViableImplementation {
                interface: self.render(interface),
            });
        };
        tracing::trace!(
            type_name = self.interner.lookup(first.type_name),
            lifetime = ?first.lifetime,
            "resolved first candidate"
        );
        let instance = self.instance_for(first, activator)?;
        self.view(&instance, interface)
    }

    /// Resolve every surviving implementation of `interface`, in
    /// registration order. Empty if there are none.
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(interface = self.interner.lookup(interface))
    )]
    pub fn resolve_all(
        &self,
        interface: Name,
        activator: &dyn Activator,
    ) -> Result<Vec<CapabilityView>, InjectError> {
        let candidates = self.surviving(interface);
        tracing::trace!(count = candidates.len(), "resolving all candidates");
        candidates
            .into_iter()
            .map(|config| {
                let instance = self.instance_for(config, activator)?;
                self.view(&instance, interface)
            })
            .collect()
    }

    /// Resolve an injection key through the accessor surface.
    pub fn resolve_key(
        &self,
        key: Name,
        activator: &dyn Activator,
    ) -> Result<Resolved, InjectError> {
        let accessor = self
            .accessor(key)
            .ok_or_else(|| InjectError::UnresolvableKey {
                key: self.render(key),
            })?;
        match accessor {
            Accessor::One(interface) => self.resolve(interface, activator).map(Resolved::One),
            Accessor::Many(interface) => self
                .resolve_all(interface, activator)
                .map(Resolved::Many),
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("configs", &self.configs.read().len())
            .field("suppressed", &self.suppressed.read().len())
            .finish_non_exhaustive()
    }
}
