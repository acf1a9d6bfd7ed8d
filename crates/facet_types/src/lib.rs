//! Interface contracts for facet.
//!
//! This crate owns the data model that both casting and dependency
//! resolution depend on:
//!
//! - [`InterfaceRegistry`]: interface definitions keyed by [`Name`], with
//!   effective member sets folded from every ancestor at definition time
//! - [`Markers`]: the two built-in marker interfaces that drive lifetime
//!   policy in the container
//! - [`check_conformance`]: the one-shot check a concrete type must pass
//!   when it is declared
//!
//! Definitions are immutable once registered and are shared as
//! `Arc<InterfaceDef>`, so downstream crates may hold them without keeping
//! the registry locked.
//!
//! [`Name`]: facet_ir::Name

mod accessor;
mod conformance;
mod error;
mod property;
mod registry;
mod well_known;

pub use accessor::{capitalize, getter_name, setter_name, subscribe_name, unsubscribe_name};
pub use conformance::{check_conformance, ConformanceError, MemberKind, MemberTable, MissingMember};
pub use error::RegistryError;
pub use property::PropertySpec;
pub use registry::{InterfaceConfig, InterfaceDef, InterfaceRegistry, SharedRegistry};
pub use well_known::Markers;
