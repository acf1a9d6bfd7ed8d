//! Property declarations.

use facet_ir::Name;
use rustc_hash::FxHashSet;

/// A property required by an interface.
///
/// Implementations expose a property `p` through a `getP` member and, unless
/// the property is read-only, a `setP` member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertySpec {
    pub name: Name,
    pub read_only: bool,
}

impl PropertySpec {
    /// A read/write property. This is what a bare property name declares.
    pub const fn new(name: Name) -> Self {
        PropertySpec {
            name,
            read_only: false,
        }
    }

    /// A property with a getter only.
    pub const fn read_only(name: Name) -> Self {
        PropertySpec {
            name,
            read_only: true,
        }
    }

    /// Deduplicate specs by name. The first occurrence wins, including its
    /// `read_only` flag.
    pub fn normalize(specs: impl IntoIterator<Item = PropertySpec>) -> Vec<PropertySpec> {
        let mut seen = FxHashSet::default();
        specs
            .into_iter()
            .filter(|spec| seen.insert(spec.name))
            .collect()
    }
}

impl From<Name> for PropertySpec {
    fn from(name: Name) -> Self {
        PropertySpec::new(name)
    }
}
