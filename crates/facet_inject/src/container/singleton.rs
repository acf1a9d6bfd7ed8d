//! Singleton slots.
//!
//! One slot per singleton type, created on first use and never evicted.
//! A slot keeps its state behind a short-lived mutex, so reading it never
//! waits on a construction. First construction runs under a separate
//! reentrant build lock: a concurrent builder waits for the instance
//! instead of building a second one, and the same thread re-entering a
//! slot that is still `Constructing` is a dependency cycle.

use std::sync::Arc;

use facet_ir::Name;
use facet_object::Instance;
use parking_lot::{Mutex, ReentrantMutex};
use rustc_hash::FxHashMap;

use crate::InjectError;

#[derive(Default)]
enum SlotState {
    #[default]
    Empty,
    Constructing,
    Ready(Instance),
}

#[derive(Default)]
struct Slot {
    state: Mutex<SlotState>,
    build: ReentrantMutex<()>,
}

impl Slot {
    fn ready(&self) -> Option<Instance> {
        match &*self.state.lock() {
            SlotState::Ready(instance) => Some(instance.clone()),
            SlotState::Empty | SlotState::Constructing => None,
        }
    }
}

#[derive(Default)]
pub(crate) struct SingletonCache {
    slots: Mutex<FxHashMap<Name, Arc<Slot>>>,
}

impl SingletonCache {
    fn slot(&self, type_name: Name) -> Arc<Slot> {
        Arc::clone(self.slots.lock().entry(type_name).or_default())
    }

    /// The cached instance, if construction has finished. Never blocks on a
    /// construction in progress.
    pub fn peek(&self, type_name: Name) -> Option<Instance> {
        let slot = self.slots.lock().get(&type_name).cloned()?;
        slot.ready()
    }

    /// Return the cached instance, or build it with `construct`.
    ///
    /// A failed construction leaves the slot empty. `label` names the type
    /// in a cycle error.
    pub fn get_or_construct(
        &self,
        type_name: Name,
        label: &str,
        construct: impl FnOnce() -> Result<Instance, InjectError>,
    ) -> Result<Instance, InjectError> {
        let slot = self.slot(type_name);
        if let Some(instance) = slot.ready() {
            return Ok(instance);
        }

        let _build = slot.build.lock();
        {
            let mut state = slot.state.lock();
            match &*state {
                SlotState::Ready(instance) => return Ok(instance.clone()),
                SlotState::Constructing => {
                    return Err(InjectError::DependencyCycle {
                        type_name: label.to_owned(),
                    })
                }
                SlotState::Empty => *state = SlotState::Constructing,
            }
        }

        let result = construct();
        *slot.state.lock() = match &result {
            Ok(instance) => SlotState::Ready(instance.clone()),
            Err(_) => SlotState::Empty,
        };
        result
    }

    /// Fill an empty slot from outside. Returns `false` and leaves the slot
    /// untouched if it is not empty.
    pub fn seed(&self, type_name: Name, instance: Instance) -> bool {
        let slot = self.slot(type_name);
        let mut state = slot.state.lock();
        if !matches!(&*state, SlotState::Empty) {
            return false;
        }
        *state = SlotState::Ready(instance);
        true
    }
}
