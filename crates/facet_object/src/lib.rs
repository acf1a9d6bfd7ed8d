//! Facet object model.
//!
//! A small host object system for interface contracts:
//!
//! - [`TypeDef`]: a declared concrete type with its member table, interface
//!   closure and precomputed per-interface binding tables
//! - [`Instance`]: a shared object handle with field storage and a weak
//!   view cache
//! - [`CapabilityView`]: an instance narrowed to one interface
//! - [`Introspect`]: `cast_to` / `is_a` / `same_as`, implemented uniformly
//!   by instances, views and cast results
//!
//! All handles are `Send + Sync`. Locks guard field storage and the view
//! cache only, and are released before any member implementation runs.

mod error;
mod instance;
mod introspect;
mod type_def;
mod value;
mod view;

pub use error::ObjectError;
pub use instance::Instance;
pub use introspect::{CastTarget, Introspect, Subject};
pub use type_def::{
    field_getter, field_setter, method, Directives, InitFn, Injection, InterfaceBinding, Members,
    MethodFn, TypeDef, TypeParts,
};
pub use value::{Callback, CallbackFn, Value};
pub use view::CapabilityView;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
mod test_fixture;
