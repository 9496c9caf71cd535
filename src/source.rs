//! Fixture discovery and YAML decoding.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::error::{ReconcileError, ReconcileResult};
use crate::core::fixture::FixtureRecord;
use crate::core::ingest::FixtureSource;

/// `*.y*ml`, case-insensitive (`.yaml`, `.yml`, `.YAML`, ...).
fn is_fixture_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| ext.starts_with('y') && ext.ends_with("ml"))
}

/// Every fixture file under `root`, sorted by path.
pub fn discover_fixtures(root: &Path) -> ReconcileResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|source| ReconcileError::Discovery {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_fixture_file(entry.path()) {
            found.push(entry.into_path());
        }
    }
    tracing::debug!(root = %root.display(), files = found.len(), "fixture files discovered");
    Ok(found)
}

pub fn parse_fixture(text: &str, path: &Path) -> ReconcileResult<FixtureRecord> {
    let record: FixtureRecord =
        serde_yaml::from_str(text).map_err(|source| ReconcileError::FixtureDecode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(record.with_origin(path))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFixtureSource;

impl FixtureSource for YamlFixtureSource {
    fn load_fixture(&self, path: &Path) -> ReconcileResult<FixtureRecord> {
        let text = fs::read_to_string(path).map_err(|source| ReconcileError::FixtureRead {
            path: path.to_path_buf(),
            source,
        })?;
        parse_fixture(&text, path)
    }
}
