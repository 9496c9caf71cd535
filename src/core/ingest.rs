// bounded-parallel fixture ingestion + identity validation
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use crate::core::error::{ReconcileError, ReconcileResult};
use crate::core::fixture::FixtureRecord;

/// Produces one decoded fixture per path.
pub trait FixtureSource: Sync {
    fn load_fixture(&self, path: &Path) -> ReconcileResult<FixtureRecord>;
}

pub fn available_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

pub struct FixtureIngestor<'a, S: FixtureSource> {
    source: &'a S,
    workers: usize,
}

type Parsed = (usize, ReconcileResult<FixtureRecord>);

impl<'a, S: FixtureSource> FixtureIngestor<'a, S> {
    pub fn new(source: &'a S, workers: usize) -> Self {
        Self {
            source,
            workers: workers.max(1),
        }
    }

    /// Load every path and return the enabled records in input order.
    ///
    /// Fails on the first (in input order) load/validation error, on an empty
    /// enabled set, and on two enabled records sharing an identity slug.
    pub fn ingest(&self, paths: &[PathBuf]) -> ReconcileResult<Vec<FixtureRecord>> {
        let work: Vec<&Path> = paths
            .iter()
            .map(PathBuf::as_path)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();

        tracing::info!(files = work.len(), workers = self.workers, "ingesting fixtures");

        let mut parsed = self.parse_all(&work);
        parsed.sort_unstable_by_key(|(seq, _)| *seq);

        let mut enabled = Vec::with_capacity(parsed.len());
        for (_, result) in parsed {
            let fx = result?;
            if fx.disabled {
                tracing::debug!(slug = fx.slug(), path = %fx.origin.display(), "fixture disabled");
                continue;
            }
            enabled.push(fx);
        }

        if enabled.is_empty() {
            return Err(ReconcileError::NoFixtures);
        }
        check_unique_slugs(&enabled)?;

        tracing::info!(enabled = enabled.len(), "fixtures ingested");
        Ok(enabled)
    }

    //fan out at most `workers` parsers, fan in through one channel.
    //exactly one result is received per spawned worker; after the first failure no
    //new work is dispatched, in-flight workers are still drained.
    fn parse_all(&self, work: &[&Path]) -> Vec<Parsed> {
        let source = self.source;
        let mut parsed: Vec<Parsed> = Vec::with_capacity(work.len());

        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<Parsed>();
            let mut in_flight = 0usize;
            let mut failed = false;

            let mut collect = |in_flight: &mut usize, failed: &mut bool| {
                if let Ok((seq, result)) = rx.recv() {
                    if let Err(err) = &result {
                        tracing::error!(path = %work[seq].display(), "fixture rejected: {err}");
                        *failed = true;
                    }
                    parsed.push((seq, result));
                }
                *in_flight -= 1;
            };

            for (seq, &path) in work.iter().enumerate() {
                if in_flight == self.workers {
                    collect(&mut in_flight, &mut failed);
                }
                if failed {
                    break;
                }

                let tx = tx.clone();
                scope.spawn(move || {
                    // a worker must send exactly once, even if the loader panics
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        source
                            .load_fixture(path)
                            .and_then(|fx| fx.validate().map(|()| fx))
                    }))
                    .unwrap_or_else(|_| {
                        Err(ReconcileError::LoaderPanic {
                            path: path.to_path_buf(),
                        })
                    });
                    // receiver outlives every worker inside the scope
                    let _ = tx.send((seq, result));
                });
                in_flight += 1;
            }
            drop(tx);

            while in_flight > 0 {
                collect(&mut in_flight, &mut failed);
            }
        });

        parsed
    }
}

fn check_unique_slugs(fixtures: &[FixtureRecord]) -> ReconcileResult<()> {
    let mut seen: HashMap<String, &FixtureRecord> = HashMap::with_capacity(fixtures.len());
    for fx in fixtures {
        let slug = fx.owner_slug();
        if let Some(first) = seen.get(&slug) {
            return Err(ReconcileError::DuplicateSlug {
                slug,
                first: first.origin.clone(),
                second: fx.origin.clone(),
            });
        }
        seen.insert(slug, fx);
    }
    Ok(())
}
