use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Lowercase DNS subdomain: dot-separated RFC 1123 labels.
static PREFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("label prefix pattern must compile")
});

/// Validated label key prefix (the part before `/` in `prefix/name`).
///
/// Constructed only through validation, so a `LabelPrefix` in hand is always
/// usable as the prefix of a Kubernetes label key.
///
/// # Examples
/// ```
/// use decorator_model::LabelPrefix;
///
/// let prefix: LabelPrefix = "decorator.example.com".parse().unwrap();
/// assert_eq!(prefix.key("region"), "decorator.example.com/region");
/// assert!("Decorator_Example".parse::<LabelPrefix>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
#[serde(into = "String")]
pub struct LabelPrefix(String);

impl LabelPrefix {
    /// Validate and wrap a prefix.
    pub fn new(s: impl Into<String>) -> Result<Self, ModelError> {
        Self::try_from(s.into())
    }

    /// Returns `true` if `s` is an acceptable prefix.
    pub fn is_valid(s: &str) -> bool {
        PREFIX_PATTERN.is_match(s)
    }

    /// Returns the underlying prefix string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a label key `{prefix}/{name}`.
    pub fn key(&self, name: &str) -> String {
        format!("{}/{}", self.0, name)
    }

    /// The leading part every key under this prefix starts with (`{prefix}/`).
    pub fn key_prefix(&self) -> String {
        format!("{}/", self.0)
    }

    /// Nest `self` under `parent`: `tags` + `decorator.example.com` gives
    /// `tags.decorator.example.com`.
    pub fn nested_under(&self, parent: &LabelPrefix) -> LabelPrefix {
        // Two valid subdomains joined by a dot are a valid subdomain.
        LabelPrefix(format!("{}.{}", self.0, parent.0))
    }
}

impl fmt::Display for LabelPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LabelPrefix {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for LabelPrefix {
    type Error = ModelError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&s) {
            Ok(LabelPrefix(s))
        } else {
            Err(ModelError::InvalidPrefix(s))
        }
    }
}

impl From<LabelPrefix> for String {
    fn from(p: LabelPrefix) -> Self {
        p.0
    }
}
