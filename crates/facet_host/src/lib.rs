//! Facet host runtime.
//!
//! [`Runtime`] is the one context object a process creates. It owns the
//! shared interner, the interface registry, the table of declared types,
//! the dependency container and the deferred-singleton scheduler, and it is
//! the [`Activator`] the container constructs through.
//!
//! # Lifecycle
//!
//! 1. Define interfaces with [`Runtime::define_interface`]
//! 2. Declare concrete types with [`Runtime::declare_type`]
//! 3. Call [`Runtime::finalize_registration`] once everything is loaded
//! 4. Resolve and cast freely
//!
//! [`Activator`]: facet_inject::Activator

mod config;
mod decl;
mod error;
mod runtime;

pub use config::RuntimeConfig;
pub use decl::{InterfaceDecl, TypeDecl};
pub use error::HostError;
pub use runtime::Runtime;

pub use facet_inject::{InjectError, Lifetime, Resolved};
pub use facet_ir::Name;
pub use facet_object::{
    CapabilityView, CastTarget, Instance, Introspect, ObjectError, Subject, TypeDef, Value,
};
pub use facet_types::{ConformanceError, MissingMember, RegistryError};

static TRACING_INIT: std::sync::Once = std::sync::Once::new();

/// Initialize tracing from `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, and only the first call installs
/// a subscriber. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=facet_inject=trace cargo test -p facet_host
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
