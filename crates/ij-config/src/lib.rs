//! Build configuration surface for IntelliJ-platform plugin assembly.
//!
//! This crate holds the declarative parameters of a plugin build (target
//! platform version, plugin dependencies, repositories, sandbox paths) and
//! the small amount of logic around them: splitting a composite version
//! string into a product type and build number, defaulting the plugin
//! repository list on first read, and gating the expensive plugin
//! dependency resolution so it runs at most once per build.
//!
//! Fetching platform and plugin archives, sandbox construction, and the
//! dependency resolution itself live elsewhere; this crate only supplies
//! the configuration they read and the policy of when resolution is
//! considered done.

pub mod config;
pub mod dependency;
pub mod error;
pub mod repository;
pub mod version;

pub use config::{BuildProps, DEFAULT_PLATFORM_REPOSITORY_URL, PluginBuild};
pub use dependency::{PluginDependencyRegistry, PluginDescriptor};
pub use error::{Error, Result};
pub use repository::{MARKETPLACE_REPOSITORY_URL, PluginRepository, RepositoryList};
pub use version::{DEFAULT_PLATFORM_TYPE, PlatformVersion};
