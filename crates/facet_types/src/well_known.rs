//! Built-in marker interfaces.
//!
//! The container tags lifetime policy with two member-less interfaces:
//! a base "injectable dependency" marker and a "singleton" marker derived
//! from it. Their names are interned once so every ancestry check compares
//! `Name` values instead of strings.

use facet_ir::{Name, StringInterner};

/// Pre-interned names of the two marker interfaces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Markers {
    /// Base marker: implementors are injectable, transient by default.
    pub dependency: Name,
    /// Derived marker: implementors are constructed once and shared.
    pub singleton: Name,
}

impl Markers {
    /// Default marker name for injectable types.
    pub const DEPENDENCY: &'static str = "IDependency";
    /// Default marker name for singleton types.
    pub const SINGLETON: &'static str = "ISingleton";

    /// Markers with the default names.
    pub fn standard(interner: &StringInterner) -> Self {
        Self::named(interner, Self::DEPENDENCY, Self::SINGLETON)
    }

    /// Markers with custom names.
    pub fn named(interner: &StringInterner, dependency: &str, singleton: &str) -> Self {
        Markers {
            dependency: interner.intern(dependency),
            singleton: interner.intern(singleton),
        }
    }

    /// Check if `name` is one of the two markers.
    #[inline]
    pub fn is_marker(&self, name: Name) -> bool {
        name == self.dependency || name == self.singleton
    }
}
