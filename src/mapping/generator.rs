/*
Inputs:

    enabled fixture records (already validated, duplicate-free)

    the managed namespace

Outputs:

    DesiredState: indices, aliases, short <-> full rename map

Responsibilities:

    Derive identifiers through mapping::naming

    Drop degenerate and out-of-namespace identifiers

    Produce the same state for the same fixtures regardless of record order
    (set insertion; rename conflicts resolved first-come in input order)
*/
use crate::core::fixture::{AliasSpec, DataSource, FixtureRecord};
use crate::core::state::DesiredState;
use crate::core::types::{Namespace, RAW_SUFFIX};
use crate::mapping::naming::{
    self, BITERGIA_PREFIX, PATTERN_PREFIX, alias_from_id, alias_to_id, view_id,
};

/// Data source slugs that never produce a managed index.
pub const SKIPPED_DATA_SOURCES: &[&str] = &["earned_media"];

pub struct DesiredStateBuilder {
    namespace: Namespace,
    state: DesiredState,
}

impl DesiredStateBuilder {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            state: DesiredState::new(),
        }
    }

    pub fn add_fixtures<'a>(&mut self, fixtures: impl IntoIterator<Item = &'a FixtureRecord>) {
        for fx in fixtures {
            self.add_fixture(fx);
        }
    }

    pub fn add_fixture(&mut self, fx: &FixtureRecord) {
        if fx.disabled {
            return;
        }
        let owner = fx.owner_slug();

        for ds in &fx.data_sources {
            self.add_data_source(&owner, ds);
        }
        for alias in &fx.aliases {
            self.add_alias(alias);
        }
    }

    fn add_data_source(&mut self, owner: &str, ds: &DataSource) {
        if SKIPPED_DATA_SOURCES.contains(&ds.slug.as_str()) {
            return;
        }
        // configured but empty
        if !ds.has_targets() {
            return;
        }

        let full = naming::full_slug(&ds.slug, &ds.index_suffix);
        let Some(index) = naming::index_id(owner, &full) else {
            tracing::debug!(owner, data_source = %ds.slug, "dropping degenerate index identifier");
            return;
        };
        if !self.namespace.admits(&index) {
            tracing::debug!(index = %index, "index outside managed namespace");
            return;
        }
        self.state.indices.insert(index);

        if let Some((short, full)) = naming::rename_pair(owner, &ds.slug, &ds.index_suffix) {
            if let Err(conflict) = self.state.record_rename(short, full) {
                tracing::warn!(
                    key = %conflict.key,
                    existing = %conflict.existing,
                    rejected = %conflict.rejected,
                    "conflicting rename pairing ignored"
                );
            }
        }
    }

    fn add_alias(&mut self, alias: &AliasSpec) {
        // the source index of an alias must exist too
        let from_is_foreign = alias.from.starts_with(PATTERN_PREFIX)
            || alias.from.starts_with(BITERGIA_PREFIX)
            || alias.from.ends_with(RAW_SUFFIX);
        if !from_is_foreign {
            match alias_from_id(&alias.from) {
                Some(id) if self.namespace.admits(&id) => {
                    self.state.indices.insert(id);
                }
                Some(id) => tracing::debug!(index = %id, "alias source outside managed namespace"),
                None => tracing::debug!(from = %alias.from, "dropping degenerate alias source"),
            }
        }

        let targets = alias
            .to
            .iter()
            .filter_map(|to| alias_to_id(to))
            .chain(alias.views.iter().filter_map(|v| view_id(&v.name)));
        for id in targets {
            if self.namespace.admits(&id) {
                self.state.aliases.insert(id);
            } else {
                tracing::debug!(alias = %id, "alias outside managed namespace");
            }
        }
    }

    pub fn build(self) -> DesiredState {
        for (short, full) in self.state.iter_renames() {
            tracing::debug!(short, full, "index expected under a renamed form");
        }
        tracing::info!(
            indices = self.state.indices.len(),
            aliases = self.state.aliases.len(),
            renames = self.state.rename_len(),
            "desired state built"
        );
        self.state
    }
}

pub fn build_desired_state(fixtures: &[FixtureRecord], namespace: &Namespace) -> DesiredState {
    let mut builder = DesiredStateBuilder::new(namespace.clone());
    builder.add_fixtures(fixtures);
    builder.build()
}
