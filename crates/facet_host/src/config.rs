//! Runtime configuration.

/// Names the runtime is built around.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Appended to an interface name to form its plural accessor key.
    pub collection_suffix: String,
    /// Marker interface that opts a type into injection.
    pub dependency_marker: String,
    /// Marker interface that makes an injectable type a singleton. Always
    /// derives from the dependency marker.
    pub singleton_marker: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            collection_suffix: "[]".to_owned(),
            dependency_marker: "IDependency".to_owned(),
            singleton_marker: "ISingleton".to_owned(),
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn with_collection_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.collection_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn with_markers(
        mut self,
        dependency: impl Into<String>,
        singleton: impl Into<String>,
    ) -> Self {
        self.dependency_marker = dependency.into();
        self.singleton_marker = singleton.into();
        self
    }
}
