//! Platform version descriptor parsing.
//!
//! A declared platform version may carry a product-type prefix, e.g.
//! `IU-2022.1.1` targets the Ultimate edition build `2022.1.1`. The prefix
//! is two or three uppercase letters followed by a hyphen; anything else is
//! treated as a bare build number and falls back to the configured default
//! type (Community edition if none was configured).
//!
//! The accepted product codes are an open, externally maintained list, so
//! the parser matches the lexical pattern only and leaves validation against
//! real platform builds to the component that downloads them.

use std::sync::OnceLock;

use regex::Regex;

/// Product type used when neither the version string nor the configuration
/// declares one (IntelliJ IDEA Community edition).
pub const DEFAULT_PLATFORM_TYPE: &str = "IC";

/// A platform version split into its product type and build number.
///
/// Always derived from a raw version string; never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformVersion {
    /// Short product code, e.g. `IC`, `IU`, `CL`.
    pub platform_type: String,
    /// Build number or version, e.g. `2022.1.1` or `LATEST-EAP-SNAPSHOT`.
    pub number: String,
}

impl PlatformVersion {
    /// Parse a raw version string into a type/number pair.
    ///
    /// If `raw` matches `^[A-Z]{2,3}-.+$` the letter prefix becomes the
    /// platform type and the remainder the build number. Otherwise the
    /// whole string is the build number and the type is `default_type`
    /// (or [`DEFAULT_PLATFORM_TYPE`] when `None`).
    ///
    /// This function never fails: a malformed version string is simply an
    /// untyped one. Whether the resulting build number exists is checked
    /// downstream when a matching platform artifact is selected.
    pub fn parse(raw: &str, default_type: Option<&str>) -> Self {
        if let Some(captures) = typed_version_pattern().captures(raw) {
            return Self {
                platform_type: captures[1].to_string(),
                number: captures[2].to_string(),
            };
        }
        Self {
            platform_type: default_type.unwrap_or(DEFAULT_PLATFORM_TYPE).to_string(),
            number: raw.to_string(),
        }
    }
}

impl std::fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.platform_type, self.number)
    }
}

/// Anchored pattern for a typed version: 2-3 uppercase letters, a hyphen,
/// then the build number.
fn typed_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Z]{2,3})-(.+)$").expect("valid pattern"))
}
