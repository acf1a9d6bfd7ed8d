//! Deferred singletons.
//!
//! A type flagged `deferred_singleton` gets exactly one instance. If the
//! type injects dependencies, construction waits until registration is
//! finalized, because the implementations it needs may not be declared yet.
//! Types without injections, and types declared after finalization, are
//! constructed on the spot.

use facet_ir::Name;
use facet_object::{Instance, TypeDef};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{Activator, Container, InjectError, Lifetime};

/// What happened to a deferred-singleton declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scheduled {
    /// Constructed at declaration time.
    Constructed(Instance),
    /// Waiting for [`DeferredSingletons::finalize`].
    Queued,
}

#[derive(Default)]
struct State {
    queue: Vec<Name>,
    finalized: bool,
}

/// Scheduler and store for deferred singletons.
#[derive(Default)]
pub struct DeferredSingletons {
    state: Mutex<State>,
    /// Type name → its one instance.
    instances: Mutex<FxHashMap<Name, Instance>>,
}

impl DeferredSingletons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a type flagged `deferred_singleton` at declaration time.
    #[tracing::instrument(level = "debug", skip_all, fields(type_name = def.label()))]
    pub fn schedule(
        &self,
        def: &TypeDef,
        container: &Container,
        activator: &dyn Activator,
    ) -> Result<Scheduled, InjectError> {
        {
            let mut state = self.state.lock();
            if !state.finalized && !def.inject().is_empty() {
                state.queue.push(def.name());
                tracing::debug!(queued = state.queue.len(), "deferred until finalize");
                return Ok(Scheduled::Queued);
            }
        }
        self.construct(def.name(), container, activator)
            .map(Scheduled::Constructed)
    }

    /// Construct every queued type, in declaration order.
    ///
    /// Runs once; a second call fails with `AlreadyFinalized`. If a
    /// construction fails, the remaining queue is dropped and the error is
    /// returned.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn finalize(
        &self,
        container: &Container,
        activator: &dyn Activator,
    ) -> Result<Vec<Instance>, InjectError> {
        let queue = {
            let mut state = self.state.lock();
            if state.finalized {
                return Err(InjectError::AlreadyFinalized);
            }
            state.finalized = true;
            std::mem::take(&mut state.queue)
        };

        tracing::debug!(count = queue.len(), "constructing deferred singletons");
        queue
            .into_iter()
            .map(|type_name| self.construct(type_name, container, activator))
            .collect()
    }

    /// Construct the one instance of `type_name`.
    ///
    /// A type the container treats as a singleton goes through its slot, so
    /// a deferred singleton that is also injectable has exactly one
    /// instance.
    fn construct(
        &self,
        type_name: Name,
        container: &Container,
        activator: &dyn Activator,
    ) -> Result<Instance, InjectError> {
        let instance = if container.lifetime(type_name) == Some(Lifetime::Singleton) {
            container.singleton(type_name, activator)?
        } else {
            activator.instantiate(type_name)?
        };

        self.instances.lock().insert(type_name, instance.clone());
        Ok(instance)
    }

    pub fn is_finalized(&self) -> bool {
        self.state.lock().finalized
    }

    /// Types waiting for finalize, in declaration order.
    pub fn pending(&self) -> Vec<Name> {
        self.state.lock().queue.clone()
    }

    /// The instance of a deferred singleton, once constructed.
    pub fn instance(&self, type_name: Name) -> Option<Instance> {
        self.instances.lock().get(&type_name).cloned()
    }
}

impl std::fmt::Debug for DeferredSingletons {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DeferredSingletons")
            .field("pending", &state.queue.len())
            .field("finalized", &state.finalized)
            .finish_non_exhaustive()
    }
}
