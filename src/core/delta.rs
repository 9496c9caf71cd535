// classified differences between desired and actual state
use serde::Serialize;

use crate::core::types::{ResourceId, ResourceKind};

/// A resource present under its short-form name while its full-form name is expected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RenamePair {
    pub from: ResourceId,
    pub to: ResourceId,
}

impl RenamePair {
    pub fn new(from: impl Into<ResourceId>, to: impl Into<ResourceId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDiff {
    pub kind: ResourceKind,
    pub missing: Vec<ResourceId>,
    pub extra: Vec<ResourceId>,
    pub renamed: Vec<RenamePair>,
    /// Actual-only names held back by the exemption pattern. Not findings.
    #[serde(skip)]
    pub exempted: Vec<ResourceId>,
}

impl ResourceDiff {
    pub fn empty(kind: ResourceKind) -> Self {
        Self {
            kind,
            missing: Vec::new(),
            extra: Vec::new(),
            renamed: Vec::new(),
            exempted: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.renamed.is_empty()
    }

    pub fn finding_count(&self) -> usize {
        self.missing.len() + self.extra.len() + self.renamed.len()
    }
}

/// Advisory output of one run. Every list is sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub indices: ResourceDiff,
    pub aliases: ResourceDiff,
}

impl ReconciliationReport {
    pub fn new(indices: ResourceDiff, aliases: ResourceDiff) -> Self {
        Self { indices, aliases }
    }

    pub fn missing_indices(&self) -> &[ResourceId] {
        &self.indices.missing
    }

    pub fn extra_indices(&self) -> &[ResourceId] {
        &self.indices.extra
    }

    pub fn renamed_indices(&self) -> &[RenamePair] {
        &self.indices.renamed
    }

    pub fn missing_aliases(&self) -> &[ResourceId] {
        &self.aliases.missing
    }

    pub fn extra_aliases(&self) -> &[ResourceId] {
        &self.aliases.extra
    }

    pub fn is_clean(&self) -> bool {
        self.indices.is_clean() && self.aliases.is_clean()
    }

    pub fn finding_count(&self) -> usize {
        self.indices.finding_count() + self.aliases.finding_count()
    }
}
