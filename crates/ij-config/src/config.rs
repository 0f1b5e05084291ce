//! The build configuration object.
//!
//! [`BuildProps`] is the declarative authoring surface, deserialized from a
//! TOML document; [`PluginBuild`] is the runtime object the build tasks
//! read, wrapping the props with the repository list and the dependency
//! registry.
//!
//! # Example TOML
//!
//! ```toml
//! version = "IU-2022.1.1"
//! plugin_name = "my-plugin"
//! sandbox_dir = "build/idea-sandbox"
//! plugins = ["java", "org.intellij.scala:2022.1.14@nightly"]
//!
//! [[repositories]]
//! type = "maven"
//! url = "https://repo.example.com/plugins"
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use crate::dependency::{PluginDependencyRegistry, PluginDescriptor};
use crate::error::{Error, Result};
use crate::repository::{PluginRepository, RepositoryList};
use crate::version::PlatformVersion;

/// Default base URL for platform (not plugin) artifacts.
pub const DEFAULT_PLATFORM_REPOSITORY_URL: &str =
    "https://cache-redirector.jetbrains.com/www.jetbrains.com/intellij-repository";

fn default_platform_repository() -> String {
    DEFAULT_PLATFORM_REPOSITORY_URL.to_string()
}

/// Declarative build properties, as authored.
///
/// Every field has a documented default so a minimal configuration only
/// needs `version`. Booleans are knobs read by downstream tasks; this crate
/// only declares them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildProps {
    /// Target platform version, optionally type-prefixed (`IU-2022.1.1`).
    /// Required; the only property with no default.
    pub version: Option<String>,
    /// Platform type used when `version` carries no type prefix.
    #[serde(rename = "type")]
    pub platform_type: Option<String>,
    /// Name of the plugin artifact being assembled.
    pub plugin_name: Option<String>,
    /// Directory the sandbox builder will populate for `runIde`-style tasks.
    pub sandbox_dir: Option<PathBuf>,
    /// Whether platform sources are fetched alongside binaries.
    pub download_sources: bool,
    /// Whether compiled classes are instrumented with nullability checks
    /// and form bindings.
    pub instrument_code: bool,
    /// Whether the since/until build range in the plugin manifest is
    /// rewritten to match the target platform.
    pub update_since_until_build: bool,
    /// Whether the until-build is pinned to the same branch as since-build.
    pub same_since_until_build: bool,
    /// Base URL platform artifacts are fetched from.
    pub platform_repository: String,
    /// Declared plugin dependencies; spec strings or structured tables.
    pub plugins: Vec<PluginDescriptor>,
    /// Explicit plugin repositories; empty means "marketplace default".
    pub repositories: Vec<PluginRepository>,
}

impl Default for BuildProps {
    fn default() -> Self {
        Self {
            version: None,
            platform_type: None,
            plugin_name: None,
            sandbox_dir: None,
            download_sources: true,
            instrument_code: true,
            update_since_until_build: true,
            same_since_until_build: false,
            platform_repository: default_platform_repository(),
            plugins: Vec::new(),
            repositories: Vec::new(),
        }
    }
}

impl BuildProps {
    /// Parse an authored TOML document.
    pub fn parse(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }
}

/// The assembled build configuration read by build tasks.
///
/// Owns the repository list and the dependency registry for the lifetime of
/// the build; both are internally synchronized, so tasks may read from
/// worker threads.
#[derive(Debug)]
pub struct PluginBuild {
    props: BuildProps,
    repositories: RepositoryList,
    dependencies: PluginDependencyRegistry,
}

impl PluginBuild {
    /// Assemble the runtime configuration from authored properties.
    ///
    /// Declared repositories are registered in order; declared plugins are
    /// registered as unresolved dependency descriptors.
    pub fn from_props(props: BuildProps) -> Self {
        let repositories = RepositoryList::new();
        for repository in &props.repositories {
            repositories.register(repository.clone());
        }

        let dependencies = PluginDependencyRegistry::new();
        for descriptor in &props.plugins {
            dependencies.register(descriptor.clone());
        }

        Self {
            props,
            repositories,
            dependencies,
        }
    }

    /// Parse an authored TOML document and assemble the configuration.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(Self::from_props(BuildProps::parse(toml_str)?))
    }

    /// The declared properties.
    pub fn props(&self) -> &BuildProps {
        &self.props
    }

    /// The raw declared version string.
    ///
    /// # Errors
    ///
    /// [`Error::MissingProperty`] if the author never set `version`; this
    /// surfaces immediately rather than deferring to the download step.
    pub fn version_raw(&self) -> Result<&str> {
        self.props
            .version
            .as_deref()
            .ok_or(Error::MissingProperty { name: "version" })
    }

    /// The declared version split into type and build number.
    pub fn platform_version(&self) -> Result<PlatformVersion> {
        Ok(PlatformVersion::parse(
            self.version_raw()?,
            self.props.platform_type.as_deref(),
        ))
    }

    /// The build number the platform downloader should match.
    pub fn version_number(&self) -> Result<String> {
        Ok(self.platform_version()?.number)
    }

    /// The product type code the platform downloader should match.
    pub fn version_type(&self) -> Result<String> {
        Ok(self.platform_version()?.platform_type)
    }

    /// Plugin repositories in lookup order, defaulting per
    /// [`RepositoryList::effective`].
    pub fn effective_repositories(&self) -> Vec<PluginRepository> {
        self.repositories.effective()
    }

    /// Register a plugin repository. Only meaningful before the first
    /// effective-repositories read.
    pub fn register_repository(&self, repository: PluginRepository) {
        self.repositories.register(repository);
    }

    /// The plugin dependency registry.
    pub fn dependencies(&self) -> &PluginDependencyRegistry {
        &self.dependencies
    }
}
