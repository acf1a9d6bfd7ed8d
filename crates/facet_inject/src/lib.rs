//! Facet dependency injection.
//!
//! - [`Container`]: interface name → registered implementations, with
//!   suppression, singleton slots and the `I` / `I[]` accessor surface
//! - [`DeferredSingletons`]: one-instance types whose construction waits
//!   for the end of registration
//! - [`Lookup`]: the ordered multimap configs are stored in
//!
//! Construction itself is delegated to an [`Activator`], implemented by
//! the host that owns the type table.

mod container;
mod deferred;
mod error;
mod lookup;

pub use container::{Accessor, Activator, Container, DependencyConfig, Lifetime, Resolved};
pub use deferred::{DeferredSingletons, Scheduled};
pub use error::InjectError;
pub use lookup::Lookup;
