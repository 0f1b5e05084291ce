//! Plugin dependency descriptors and the gated resolution registry.
//!
//! Declaring a plugin dependency is cheap and happens repeatedly while a
//! build script is evaluated; resolving the declared set against the build
//! system's dependency graph is expensive and must happen at most once.
//! [`PluginDependencyRegistry`] separates the two: descriptors accumulate
//! through [`register`](PluginDependencyRegistry::register), and the first
//! caller that needs the resolved view supplies the trigger that performs
//! the real resolution, flipping a one-way gate on success.

use std::sync::Mutex;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Identifies one plugin dependency.
///
/// The three forms drive different resolution paths downstream: marketplace
/// dependencies are fetched from a configured repository, bundled plugins
/// ship inside the platform distribution, and project references point at
/// another project in the same build producing a plugin artifact.
///
/// Deserializes from either a spec string (`"id:version@channel"`, bare
/// bundled name) or a structured table; see [`PluginDescriptor::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PluginDescriptor {
    /// A marketplace plugin pinned to a version, optionally on a release
    /// channel other than the stable one.
    Marketplace {
        id: String,
        version: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel: Option<String>,
    },
    /// A plugin bundled with the platform distribution, referenced by name.
    Bundled { name: String },
    /// Another project in the same build that produces a plugin artifact.
    Project { project: String },
}

impl PluginDescriptor {
    /// Marketplace descriptor without a channel.
    pub fn marketplace(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Marketplace {
            id: id.into(),
            version: version.into(),
            channel: None,
        }
    }

    /// Bundled-plugin descriptor.
    pub fn bundled(name: impl Into<String>) -> Self {
        Self::Bundled { name: name.into() }
    }

    /// In-build project reference descriptor.
    pub fn project(path: impl Into<String>) -> Self {
        Self::Project {
            project: path.into(),
        }
    }

    /// Parse a declared plugin spec string.
    ///
    /// - `"org.intellij.scala:2022.1.14"` — marketplace id and version
    /// - `"org.intellij.scala:2022.1.14@nightly"` — with a release channel
    /// - `"java"` — bundled plugin name
    ///
    /// Project references have no string form; they are declared
    /// structurally. An empty id, version, or channel segment is an error.
    pub fn parse(spec: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::DescriptorParse {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let Some((id, rest)) = spec.split_once(':') else {
            if spec.is_empty() {
                return Err(malformed("empty spec"));
            }
            return Ok(Self::bundled(spec));
        };

        if id.is_empty() {
            return Err(malformed("empty plugin id"));
        }

        let (version, channel) = match rest.split_once('@') {
            Some((version, channel)) => {
                if channel.is_empty() {
                    return Err(malformed("empty channel"));
                }
                (version, Some(channel.to_string()))
            }
            None => (rest, None),
        };
        if version.is_empty() {
            return Err(malformed("empty version"));
        }

        Ok(Self::Marketplace {
            id: id.to_string(),
            version: version.to_string(),
            channel,
        })
    }
}

impl<'de> Deserialize<'de> for PluginDescriptor {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Spec(String),
            Marketplace {
                id: String,
                version: String,
                #[serde(default)]
                channel: Option<String>,
            },
            Bundled {
                name: String,
            },
            Project {
                project: String,
            },
        }

        match Raw::deserialize(deserializer)? {
            Raw::Spec(spec) => PluginDescriptor::parse(&spec).map_err(serde::de::Error::custom),
            Raw::Marketplace {
                id,
                version,
                channel,
            } => Ok(Self::Marketplace {
                id,
                version,
                channel,
            }),
            Raw::Bundled { name } => Ok(Self::Bundled { name }),
            Raw::Project { project } => Ok(Self::Project { project }),
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    /// One-way gate; flips false -> true exactly once, on trigger success.
    resolved: bool,
    /// Insertion-ordered set of declared descriptors.
    descriptors: Vec<PluginDescriptor>,
}

/// Registry of declared plugin dependencies with a one-shot resolution gate.
///
/// Lives as long as the owning configuration object. Created empty;
/// descriptors are added by the build author or by collaborators translating
/// declared plugin specs. The first caller of
/// [`resolved_with`](Self::resolved_with) performs the external resolution;
/// everyone after observes the gate and skips it.
#[derive(Debug, Default)]
pub struct PluginDependencyRegistry {
    state: Mutex<RegistryState>,
}

impl PluginDependencyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a dependency. Duplicate descriptors collapse (set
    /// semantics); insertion order of first occurrences is kept.
    /// Permitted in any gate state.
    pub fn register(&self, descriptor: PluginDescriptor) {
        let mut state = self.lock();
        if !state.descriptors.contains(&descriptor) {
            state.descriptors.push(descriptor);
        }
    }

    /// Whether the resolution gate has been set.
    pub fn is_resolved(&self) -> bool {
        self.lock().resolved
    }

    /// The declared-but-unresolved descriptors.
    ///
    /// Empty once the gate is set: at that point the declarations have been
    /// consumed by resolution and the resolved view is the meaningful one.
    /// Never flips the gate.
    pub fn unresolved(&self) -> Vec<PluginDescriptor> {
        let state = self.lock();
        if state.resolved {
            Vec::new()
        } else {
            state.descriptors.clone()
        }
    }

    /// The resolved descriptors, resolving first if nobody has yet.
    ///
    /// If the gate is unset, `trigger` is invoked to perform the real
    /// dependency-graph resolution, and the gate is set only once it
    /// returns success; a trigger failure propagates to the caller and
    /// leaves the registry fully retryable. The registry lock is held
    /// across the trigger, so concurrent callers serialize: exactly one
    /// invokes the trigger, late arrivals wait for it to finish and then
    /// read the resolved set.
    pub fn resolved_with<F>(&self, trigger: F) -> Result<Vec<PluginDescriptor>>
    where
        F: FnOnce() -> Result<()>,
    {
        let mut state = self.lock();
        if !state.resolved {
            tracing::debug!(
                declared = state.descriptors.len(),
                "resolving plugin dependencies"
            );
            trigger()?;
            state.resolved = true;
        }
        Ok(state.descriptors.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        // A panic in a trigger leaves the gate unset, which is exactly the
        // retryable state, so recovering from poisoning is sound.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
