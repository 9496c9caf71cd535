// fixture records, as decoded from one fixture file
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::error::{ReconcileError, ReconcileResult};
use crate::mapping::naming::normalize_separators;

/// One configuration unit. Identity lives at `native.slug`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FixtureRecord {
    #[serde(default)]
    pub native: NativeSection,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, alias = "dataSources")]
    pub data_sources: Vec<DataSource>,
    #[serde(default)]
    pub aliases: Vec<AliasSpec>,
    /// File the record was decoded from; empty for records built in memory.
    #[serde(skip)]
    pub origin: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NativeSection {
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DataSource {
    #[serde(default)]
    pub slug: String,
    #[serde(default, alias = "indexSuffix")]
    pub index_suffix: String,
    #[serde(default)]
    pub endpoints: Option<Vec<serde_yaml::Value>>,
    #[serde(default)]
    pub projects: Option<Vec<serde_yaml::Value>>,
}

impl DataSource {
    /// A data source with neither endpoints nor projects is configured but empty.
    pub fn has_targets(&self) -> bool {
        let endpoints = self.endpoints.as_ref().is_some_and(|v| !v.is_empty());
        let projects = self.projects.as_ref().is_some_and(|v| !v.is_empty());
        endpoints || projects
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AliasSpec {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub views: Vec<ViewSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ViewSpec {
    #[serde(default)]
    pub name: String,
}

impl FixtureRecord {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            native: NativeSection { slug: slug.into() },
            ..Self::default()
        }
    }

    pub fn slug(&self) -> &str {
        &self.native.slug
    }

    /// Identity used for naming and duplicate detection (`/` folded to `-`).
    pub fn owner_slug(&self) -> String {
        normalize_separators(&self.native.slug)
    }

    pub fn with_origin(mut self, origin: impl AsRef<Path>) -> Self {
        self.origin = origin.as_ref().to_path_buf();
        self
    }

    pub fn validate(&self) -> ReconcileResult<()> {
        if self.native.slug.trim().is_empty() {
            return Err(ReconcileError::MissingSlug {
                path: self.origin.clone(),
            });
        }
        Ok(())
    }
}
