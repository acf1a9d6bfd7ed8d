//! Types currently being activated, per thread.
//!
//! A type that is requested again on the same thread before its activation
//! returns can only recurse forever, whatever its lifetime.

use std::thread::{self, ThreadId};

use facet_ir::Name;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[derive(Default)]
pub(crate) struct ActivationStacks {
    stacks: Mutex<FxHashMap<ThreadId, SmallVec<[Name; 8]>>>,
}

/// Pops its type off the owning thread's stack when dropped.
pub(crate) struct Activation<'a> {
    stacks: &'a ActivationStacks,
    thread: ThreadId,
}

impl ActivationStacks {
    /// Push `type_name` onto the calling thread's stack, or `None` if it is
    /// already there.
    pub fn enter(&self, type_name: Name) -> Option<Activation<'_>> {
        let thread = thread::current().id();
        let mut stacks = self.stacks.lock();
        let stack = stacks.entry(thread).or_default();
        if stack.contains(&type_name) {
            return None;
        }
        stack.push(type_name);
        Some(Activation {
            stacks: self,
            thread,
        })
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        let thread = thread::current().id();
        self.stacks.lock().get(&thread).map_or(0, SmallVec::len)
    }
}

impl Drop for Activation<'_> {
    fn drop(&mut self) {
        let mut stacks = self.stacks.stacks.lock();
        if let Some(stack) = stacks.get_mut(&self.thread) {
            stack.pop();
            if stack.is_empty() {
                stacks.remove(&self.thread);
            }
        }
    }
}
