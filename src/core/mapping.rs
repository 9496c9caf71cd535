// short-form <-> full-form index map used for rename detection
use crate::core::state::DesiredState;
use crate::core::types::ResourceId;

/// A second, different pairing was offered for a form that is already mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameConflict {
    pub key: ResourceId,
    pub existing: ResourceId,
    pub rejected: ResourceId,
}

impl DesiredState {
    //store a short -> full pairing in both directions
    //1. short == full is never stored (nothing was renamed).
    //2. identical re-insertion is idempotent.
    //3. a full form maps to exactly one short form and vice versa; the first pairing wins.
    pub fn record_rename(
        &mut self,
        short: ResourceId,
        full: ResourceId,
    ) -> Result<(), RenameConflict> {
        if short == full {
            return Ok(());
        }

        if let Some(old_short) = self.full_to_short.get(&full) {
            if *old_short == short {
                return Ok(());
            }
            return Err(RenameConflict {
                key: full,
                existing: old_short.clone(),
                rejected: short,
            });
        }

        if let Some(old_full) = self.short_to_full.get(&short) {
            return Err(RenameConflict {
                key: short,
                existing: old_full.clone(),
                rejected: full,
            });
        }

        self.short_to_full.insert(short.clone(), full.clone());
        self.full_to_short.insert(full, short);
        Ok(())
    }

    pub fn short_form(&self, full: &str) -> Option<&str> {
        self.full_to_short.get(full).map(String::as_str)
    }

    pub fn rename_len(&self) -> usize {
        self.full_to_short.len()
    }

    //for reports, sorted by short form
    pub fn iter_renames(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        let mut pairs: Vec<(&str, &str)> = self
            .short_to_full
            .iter()
            .map(|(s, f)| (s.as_str(), f.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs.into_iter()
    }
}
