//! Plugin repository sources and the effective-list resolver.
//!
//! Repositories are consulted in registration order by the downloader when
//! it looks for a declared plugin. When the build author registers none,
//! the first read of the effective list installs the JetBrains Marketplace
//! as the single default source; explicit registration before that read
//! suppresses the default entirely.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Default URL for the JetBrains Marketplace Maven repository.
pub const MARKETPLACE_REPOSITORY_URL: &str =
    "https://cache-redirector.jetbrains.com/plugins.jetbrains.com/maven";

/// A source plugin archives may be fetched from.
///
/// Order of registration determines lookup precedence downstream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PluginRepository {
    /// The JetBrains Marketplace. `url` overrides the default endpoint.
    Marketplace {
        #[serde(default)]
        url: Option<String>,
    },
    /// A custom Maven repository.
    Maven { url: String },
    /// A custom XML plugin listing (an `updatePlugins.xml`-style index).
    Custom { url: String },
}

impl PluginRepository {
    /// Marketplace source with the default endpoint.
    pub fn marketplace() -> Self {
        Self::Marketplace { url: None }
    }

    /// The URL the downloader should fetch from.
    pub fn url(&self) -> &str {
        match self {
            Self::Marketplace { url } => url.as_deref().unwrap_or(MARKETPLACE_REPOSITORY_URL),
            Self::Maven { url } | Self::Custom { url } => url,
        }
    }
}

/// Ordered collection of plugin repositories with marketplace defaulting.
///
/// Registration happens during configuration authoring; reads happen from
/// build tasks, possibly on other threads, so the list is mutex-guarded and
/// the one-time default population uses the same single-initialization
/// discipline as the dependency registry gate.
#[derive(Debug, Default)]
pub struct RepositoryList {
    entries: Mutex<Vec<PluginRepository>>,
}

impl RepositoryList {
    /// Create an empty repository list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a repository source. Registering after the first
    /// [`effective`](Self::effective) read is permitted but not expected;
    /// callers should finish registration before resolution begins.
    pub fn register(&self, repository: PluginRepository) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(repository);
    }

    /// The repositories the downloader should consult, in order.
    ///
    /// An empty list is populated with the single marketplace default
    /// before returning, so "no explicit configuration" and "explicit
    /// configuration" read uniformly from here on. Idempotent: the default
    /// is installed at most once.
    pub fn effective(&self) -> Vec<PluginRepository> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.is_empty() {
            tracing::debug!("no plugin repositories configured, defaulting to marketplace");
            entries.push(PluginRepository::marketplace());
        }
        entries.clone()
    }
}
