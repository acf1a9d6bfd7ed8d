//! Errors raised while calling through objects and views.

/// Errors from member calls and property accessors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    /// A property accessor was called with two or more arguments.
    #[error("\"{interface}.{property}\" property cannot be called with {count} arguments")]
    InvalidPropertyArity {
        interface: String,
        property: String,
        count: usize,
    },

    /// A value was written to a read-only property.
    #[error("\"{interface}.{property}\" property is read-only and cannot be set")]
    ReadOnlyPropertyWrite { interface: String, property: String },

    /// The object or view has no member with this name.
    #[error("\"{owner}\" has no member \"{member}\"")]
    UnknownMember { owner: String, member: String },

    /// The member exists but cannot be called this way, e.g. calling a
    /// property as a method.
    #[error("\"{owner}.{member}\" is not callable as a method")]
    NotCallable { owner: String, member: String },

    /// Raised by user method bodies.
    #[error("{0}")]
    Custom(String),
}

impl ObjectError {
    /// Create a custom error from a user method.
    pub fn custom(message: impl Into<String>) -> Self {
        ObjectError::Custom(message.into())
    }
}
