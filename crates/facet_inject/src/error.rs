//! Errors raised by registration and resolution.

use facet_object::ObjectError;

/// Errors from the dependency container and the deferred scheduler.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InjectError {
    /// The type carries the dependency marker but no interface derived
    /// from it.
    #[error(
        "\"{type_name}\" is marked injectable but implements no interface derived from \"{marker}\""
    )]
    NotInjectable { type_name: String, marker: String },

    /// Every registered implementation is suppressed, or none exists.
    #[error("no viable implementation of \"{interface}\"")]
    NoViableImplementation { interface: String },

    /// No accessor was ever installed for this key.
    #[error("\"{key}\" cannot be resolved")]
    UnresolvableKey { key: String },

    #[error("unknown type \"{type_name}\"")]
    UnknownType { type_name: String },

    #[error("\"{type_name}\" is abstract and cannot be instantiated")]
    AbstractType { type_name: String },

    /// A type was requested again on the thread still constructing it.
    #[error("dependency cycle: \"{type_name}\" was requested while being constructed")]
    DependencyCycle { type_name: String },

    /// The activator returned an instance that cannot be viewed through the
    /// requested interface.
    #[error("activated \"{type_name}\" does not implement \"{interface}\"")]
    ActivationMismatch { type_name: String, interface: String },

    #[error("registration was already finalized")]
    AlreadyFinalized,

    /// An initializer or injected member failed.
    #[error("construction of \"{type_name}\" failed: {source}")]
    Construction {
        type_name: String,
        #[source]
        source: ObjectError,
    },
}
