// name derivation: fixture slugs -> canonical index/alias identifiers
//
// Rules are pure string rewrites. Anything already carrying one of the managed
// prefixes is left as-is, so a derived identifier is a fixed point of its rule.

use crate::core::types::{INDEX_PREFIX, ResourceId};

pub const BITERGIA_PREFIX: &str = "bitergia-";
pub const PATTERN_PREFIX: &str = "pattern:";
pub const POSTPROCESS_PREFIX: &str = "postprocess-";
pub const POSTPROCESS_INDEX_PREFIX: &str = "postprocess-sds-";

pub fn normalize_separators(s: &str) -> String {
    s.replace('/', "-")
}

/// `true` when an identifier carries no name beyond the namespace prefix
/// (`""`, `"sds-"`, `"sds--"`, ...).
pub fn is_degenerate(id: &str) -> bool {
    id.strip_prefix(INDEX_PREFIX)
        .unwrap_or(id)
        .chars()
        .all(|c| c == '-')
}

fn keep_if_meaningful(id: String) -> Option<ResourceId> {
    if is_degenerate(&id) { None } else { Some(id) }
}

/// `slug + indexSuffix`, separators normalized.
pub fn full_slug(data_source_slug: &str, index_suffix: &str) -> String {
    normalize_separators(&format!("{data_source_slug}{index_suffix}"))
}

/// `sds-<owner>-<data source slug>`; used for both the full and the short form.
pub fn index_id(owner_slug: &str, data_source_slug: &str) -> Option<ResourceId> {
    keep_if_meaningful(normalize_separators(&format!(
        "{INDEX_PREFIX}{owner_slug}-{data_source_slug}"
    )))
}

/// Short/full pair for a data source, only when the suffix makes them differ.
pub fn rename_pair(
    owner_slug: &str,
    data_source_slug: &str,
    index_suffix: &str,
) -> Option<(ResourceId, ResourceId)> {
    let full = full_slug(data_source_slug, index_suffix);
    let short = normalize_separators(data_source_slug);
    if short == full {
        return None;
    }
    Some((index_id(owner_slug, &short)?, index_id(owner_slug, &full)?))
}

pub fn alias_from_id(from: &str) -> Option<ResourceId> {
    // glob expressions, never separator-normalized
    if from.starts_with(PATTERN_PREFIX) {
        return Some(from.to_string());
    }
    let id = if from.starts_with(BITERGIA_PREFIX)
        || from.starts_with(POSTPROCESS_PREFIX)
        || from.starts_with(INDEX_PREFIX)
    {
        from.to_string()
    } else {
        format!("{INDEX_PREFIX}{from}")
    };
    keep_if_meaningful(normalize_separators(&id))
}

pub fn alias_to_id(to: &str) -> Option<ResourceId> {
    let id = if to.starts_with(POSTPROCESS_INDEX_PREFIX) || to.starts_with(INDEX_PREFIX) {
        to.to_string()
    } else if to.starts_with("postprocess") {
        format!(
            "{POSTPROCESS_INDEX_PREFIX}{}",
            to.strip_prefix("postprocess/").unwrap_or(to)
        )
    } else {
        format!("{INDEX_PREFIX}{to}")
    };
    keep_if_meaningful(normalize_separators(&id))
}

pub fn view_id(name: &str) -> Option<ResourceId> {
    let id = if name.starts_with(INDEX_PREFIX) {
        name.to_string()
    } else {
        format!("{INDEX_PREFIX}{name}")
    };
    keep_if_meaningful(normalize_separators(&id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_id_joins_owner_and_full_slug_and_normalizes() {
        let full = full_slug("git", "/for-merge");
        assert_eq!(full, "git-for-merge");
        assert_eq!(
            index_id("acme-widgets", &full).as_deref(),
            Some("sds-acme-widgets-git-for-merge")
        );
        assert_eq!(index_id("acme/widgets", "git").as_deref(), Some("sds-acme-widgets-git"));
    }

    ///a data source whose derived identifier is only the namespace prefix is dropped
    #[test]
    fn degenerate_identifiers_are_dropped() {
        assert!(is_degenerate(""));
        assert!(is_degenerate("sds-"));
        assert!(is_degenerate("sds--"));
        assert!(!is_degenerate("sds-a"));

        assert_eq!(index_id("", ""), None);
        assert_eq!(alias_from_id(""), None);
        assert_eq!(alias_to_id(""), None);
        assert_eq!(view_id("/"), None);
    }

    #[test]
    fn rename_pair_only_when_suffix_changes_the_slug() {
        assert_eq!(rename_pair("acme", "git", ""), None);
        assert_eq!(
            rename_pair("acme", "git", "-old"),
            Some(("sds-acme-git".to_string(), "sds-acme-git-old".to_string()))
        );
    }

    #[test]
    fn alias_from_keeps_foreign_prefixes_and_never_touches_patterns() {
        assert_eq!(alias_from_id("acme/git").as_deref(), Some("sds-acme-git"));
        assert_eq!(alias_from_id("bitergia-git/x").as_deref(), Some("bitergia-git-x"));
        assert_eq!(
            alias_from_id("postprocess-acme/git").as_deref(),
            Some("postprocess-acme-git")
        );
        assert_eq!(
            alias_from_id("pattern:sds-acme/*").as_deref(),
            Some("pattern:sds-acme/*")
        );
    }

    #[test]
    fn alias_to_rewrites_postprocess_targets() {
        assert_eq!(
            alias_to_id("postprocess/acme/git").as_deref(),
            Some("postprocess-sds-acme-git")
        );
        assert_eq!(alias_to_id("acme/git").as_deref(), Some("sds-acme-git"));
        assert_eq!(view_id("acme/view").as_deref(), Some("sds-acme-view"));
    }

    #[test]
    fn derived_identifiers_are_fixed_points() {
        for raw in ["acme/git", "bitergia-x", "postprocess-y", "pattern:sds-*"] {
            let once = alias_from_id(raw).unwrap();
            assert_eq!(alias_from_id(&once).as_deref(), Some(once.as_str()));
        }
        for raw in ["acme/git", "postprocess/acme/git"] {
            let once = alias_to_id(raw).unwrap();
            assert_eq!(alias_to_id(&once).as_deref(), Some(once.as_str()));
        }
        let once = view_id("acme/view").unwrap();
        assert_eq!(view_id(&once).as_deref(), Some(once.as_str()));
    }
}
