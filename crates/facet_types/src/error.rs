//! Registry errors.
//!
//! Names are rendered to owned strings when the error is built, so an error
//! can outlive the registry and be displayed without an interner.

/// Errors raised while defining or querying interfaces.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// An interface with this name is already registered.
    #[error("interface \"{name}\" already defined")]
    DuplicateInterface { name: String },

    /// A query named an interface that was never defined.
    #[error("interface \"{name}\" is not defined")]
    UnknownInterface { name: String },

    /// A definition inherits from an interface that is not yet registered.
    #[error("interface \"{interface}\" cannot inherit from \"{parent}\": parent is not defined")]
    UnknownParent { interface: String, parent: String },
}
