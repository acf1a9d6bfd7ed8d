//! Host errors.

use facet_inject::InjectError;
use facet_object::ObjectError;
use facet_types::{ConformanceError, RegistryError};

/// Everything the runtime can fail with.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Conformance(#[from] ConformanceError),

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Inject(#[from] InjectError),

    /// A type with this name was already declared.
    #[error("type \"{type_name}\" is already declared")]
    DuplicateType { type_name: String },
}
