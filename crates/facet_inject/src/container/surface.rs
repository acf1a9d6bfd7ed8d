//! The resolution surface: keys that injection can ask for.
//!
//! Each registered interface `I` installs two keys, `I` for one
//! implementation and `I` + collection suffix for all of them.

use facet_ir::{Name, StringInterner};
use rustc_hash::FxHashMap;

/// What a key resolves to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Accessor {
    /// One view of the interface.
    One(Name),
    /// Every surviving implementation of the interface.
    Many(Name),
}

#[derive(Debug)]
pub(crate) struct ResolutionSurface {
    accessors: FxHashMap<Name, Accessor>,
    collection_suffix: String,
}

impl ResolutionSurface {
    pub fn new(collection_suffix: impl Into<String>) -> Self {
        ResolutionSurface {
            accessors: FxHashMap::default(),
            collection_suffix: collection_suffix.into(),
        }
    }

    /// The plural key for `interface`.
    pub fn plural_key(&self, interner: &StringInterner, interface: Name) -> Name {
        let base = interner.lookup(interface);
        interner.intern_owned(format!("{base}{}", self.collection_suffix))
    }

    /// Install both accessors for `interface` unless already present.
    /// Returns whether anything was installed.
    pub fn install(&mut self, interner: &StringInterner, interface: Name) -> bool {
        if self.accessors.contains_key(&interface) {
            return false;
        }
        let plural = self.plural_key(interner, interface);
        self.accessors.insert(interface, Accessor::One(interface));
        self.accessors.entry(plural).or_insert(Accessor::Many(interface));
        true
    }

    pub fn get(&self, key: Name) -> Option<Accessor> {
        self.accessors.get(&key).copied()
    }

    pub fn contains(&self, key: Name) -> bool {
        self.accessors.contains_key(&key)
    }
}
