// identifiers, managed namespace and the no-drop exemption rule
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// A derived, namespace-prefixed resource name. Two resources are the same iff
/// their identifiers are byte-equal.
pub type ResourceId = String;

pub const INDEX_PREFIX: &str = "sds-";
pub const RAW_SUFFIX: &str = "-raw";

/// Reference no-drop policy: `-f-` tagged, earned-media and slack resources are
/// never proposed for deletion.
pub const DEFAULT_NO_DROP_PATTERN: &str = r"^(.+-f-.+|.+-earned_media|.+-slack)$";

static DEFAULT_NO_DROP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_NO_DROP_PATTERN).expect("reference no-drop pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Index,
    Alias,
}

impl ResourceKind {
    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::Index => "indices",
            ResourceKind::Alias => "aliases",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Index => f.write_str("index"),
            ResourceKind::Alias => f.write_str("alias"),
        }
    }
}

/// The slice of the cluster this monitor is responsible for: everything under the
/// prefix, minus `-raw` enrichment inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn admits(&self, id: &str) -> bool {
        id.starts_with(&self.prefix) && !id.ends_with(RAW_SUFFIX)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(INDEX_PREFIX)
    }
}

#[derive(Debug, Clone)]
pub struct ExemptionPolicy {
    pattern: Regex,
}

impl ExemptionPolicy {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn is_exempt(&self, id: &str) -> bool {
        self.pattern.is_match(id)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for ExemptionPolicy {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_NO_DROP.clone(),
        }
    }
}
