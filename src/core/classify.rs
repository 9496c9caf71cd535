// three-way classification: missing / extra / rename candidate
use std::collections::{HashMap, HashSet};

use crate::core::delta::{ReconciliationReport, RenamePair, ResourceDiff};
use crate::core::state::{ActualState, DesiredState};
use crate::core::types::{ExemptionPolicy, ResourceId, ResourceKind};

/// Classify `desired` against `actual`.
///
/// - desired-only names whose short form (via `full_to_short`) exists in `actual`
///   become rename candidates `short -> full`; the rest are missing.
/// - actual-only names not consumed by a rename are extra, unless `exempt` protects them.
///
/// Output lists are sorted, so the result depends only on the inputs.
pub fn reconcile(
    kind: ResourceKind,
    desired: &HashSet<ResourceId>,
    actual: &HashSet<String>,
    full_to_short: Option<&HashMap<ResourceId, ResourceId>>,
    exempt: &ExemptionPolicy,
) -> ResourceDiff {
    let mut diff = ResourceDiff::empty(kind);

    //sorted up front: which full form claims a shared short form must not depend on hash order
    let mut absent: Vec<&ResourceId> = desired.iter().filter(|id| !actual.contains(*id)).collect();
    absent.sort_unstable();

    let mut consumed: HashSet<&str> = HashSet::new();
    for full in absent {
        let short = full_to_short.and_then(|m| m.get(full));
        match short {
            Some(short)
                if actual.contains(short)
                    && !desired.contains(short)
                    && !consumed.contains(short.as_str()) =>
            {
                consumed.insert(short.as_str());
                diff.renamed.push(RenamePair::new(short.clone(), full.clone()));
            }
            _ => diff.missing.push(full.clone()),
        }
    }

    for id in actual.iter().filter(|id| !desired.contains(*id)) {
        if consumed.contains(id.as_str()) {
            continue;
        }
        if exempt.is_exempt(id) {
            diff.exempted.push(id.clone());
        } else {
            diff.extra.push(id.clone());
        }
    }

    diff.missing.sort_unstable();
    diff.extra.sort_unstable();
    diff.exempted.sort_unstable();
    diff.renamed.sort_unstable();
    diff
}

impl DesiredState {
    pub fn reconcile_indices(&self, actual: &ActualState, exempt: &ExemptionPolicy) -> ResourceDiff {
        reconcile(
            ResourceKind::Index,
            &self.indices,
            &actual.indices,
            Some(&self.full_to_short),
            exempt,
        )
    }

    //aliases have no short/full concept
    pub fn reconcile_aliases(&self, actual: &ActualState, exempt: &ExemptionPolicy) -> ResourceDiff {
        reconcile(ResourceKind::Alias, &self.aliases, &actual.aliases, None, exempt)
    }

    pub fn reconcile(&self, actual: &ActualState, exempt: &ExemptionPolicy) -> ReconciliationReport {
        let indices = self.reconcile_indices(actual, exempt);
        let aliases = self.reconcile_aliases(actual, exempt);

        tracing::debug!(
            missing_indices = indices.missing.len(),
            extra_indices = indices.extra.len(),
            renamed_indices = indices.renamed.len(),
            exempted_indices = indices.exempted.len(),
            missing_aliases = aliases.missing.len(),
            extra_aliases = aliases.extra.len(),
            exempted_aliases = aliases.exempted.len(),
            "reconciled desired state against cluster"
        );

        ReconciliationReport::new(indices, aliases)
    }
}
