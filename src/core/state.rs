// desired (from fixtures) and actual (from the cluster) resource sets
use std::collections::{HashMap, HashSet};

use crate::core::types::{Namespace, ResourceId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    pub indices: HashSet<ResourceId>,
    pub aliases: HashSet<ResourceId>,
    pub(crate) short_to_full: HashMap<ResourceId, ResourceId>,
    pub(crate) full_to_short: HashMap<ResourceId, ResourceId>,
}

impl DesiredState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.aliases.is_empty()
    }
}

/// Snapshot reported by the cluster, already restricted to the managed namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActualState {
    pub indices: HashSet<String>,
    pub aliases: HashSet<String>,
}

impl ActualState {
    /// Build from raw cluster listings; names outside `namespace` are ignored.
    pub fn from_listing<I, A>(namespace: &Namespace, indices: I, aliases: A) -> Self
    where
        I: IntoIterator<Item = String>,
        A: IntoIterator<Item = String>,
    {
        Self {
            indices: indices.into_iter().filter(|i| namespace.admits(i)).collect(),
            aliases: aliases.into_iter().filter(|a| namespace.admits(a)).collect(),
        }
    }
}
