/// Errors that can occur in the build configuration surface.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required configuration property was read before being set.
    #[error("required configuration value absent: {name}")]
    MissingProperty {
        /// Property name as it appears in the authoring surface.
        name: &'static str,
    },

    /// Failed to parse the build configuration TOML.
    #[error("failed to parse build configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A declared plugin spec string could not be understood.
    #[error("invalid plugin spec '{spec}': {reason}")]
    DescriptorParse { spec: String, reason: String },

    /// Plugin dependency resolution failed in the external resolver.
    ///
    /// The underlying failure is passed through unchanged; the registry
    /// gate is left unset so a later call may retry resolution.
    #[error(transparent)]
    Resolution(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an external resolver failure for propagation through
    /// [`resolved_with`](crate::PluginDependencyRegistry::resolved_with).
    pub fn resolution<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Resolution(Box::new(source))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
