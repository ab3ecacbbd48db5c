use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::ProgressBar;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::artwork::{normalize, Row};
use crate::database::ArtworkStore;
use crate::error::{DocumentError, DocumentFailure};
use crate::ingest::scanner;
use crate::utils::config::IngestConfig;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub processed: usize,
    pub errors: usize,
}

/// Logs the first few failures in full and only counts the rest.
struct FailureLog {
    shown: usize,
    limit: usize,
}

impl FailureLog {
    fn new(limit: usize) -> Self {
        Self { shown: 0, limit }
    }

    fn record(&mut self, report: &mut IngestReport, failure: DocumentFailure) {
        report.errors += 1;
        if self.shown < self.limit {
            error!("Error processing {:?}: {}", failure.source, failure.error);
            self.shown += 1;
            if self.shown == self.limit {
                warn!("Error detail limit reached; further failures are only counted");
            }
        }
    }
}

/// Loads every document directly inside `dir` into the store.
///
/// Only an unreadable input directory fails the call; per-document problems
/// are counted in the returned report.
pub fn ingest_directory(
    dir: &Path,
    store: &mut ArtworkStore,
    config: &IngestConfig,
    progress: &ProgressBar,
) -> Result<IngestReport> {
    let documents = scanner::list_documents(dir, &config.extension)?;
    info!("Processing {} artwork files from {:?}", documents.len(), dir);
    Ok(ingest_paths(documents, store, config, progress))
}

pub(crate) fn ingest_paths(
    documents: Vec<PathBuf>,
    store: &mut ArtworkStore,
    config: &IngestConfig,
    progress: &ProgressBar,
) -> IngestReport {
    let total = documents.len();
    progress.set_length(total as u64);

    let mut report = IngestReport::default();
    let mut failures = FailureLog::new(config.max_error_details);

    for path in documents {
        match load_document(&path) {
            Ok(row) => store.stage(path, row),
            Err(error) => failures.record(&mut report, DocumentFailure { source: path, error }),
        }
        progress.inc(1);

        if store.should_flush() {
            commit(store, &mut report, &mut failures);
            let seen = report.processed + report.errors;
            info!(
                "Processed {}/{} artworks ({:.1}%), {} errors",
                report.processed,
                total,
                seen as f64 / total.max(1) as f64 * 100.0,
                report.errors
            );
        }
    }

    commit(store, &mut report, &mut failures);
    progress.finish_and_clear();
    info!(
        "Processing complete! {} artworks processed, {} errors",
        report.processed, report.errors
    );
    report
}

fn load_document(path: &Path) -> Result<Row, DocumentError> {
    let bytes = fs::read(path)?;
    let document: Value = serde_json::from_slice(&bytes)?;
    Ok(normalize(&document)?)
}

fn commit(store: &mut ArtworkStore, report: &mut IngestReport, failures: &mut FailureLog) {
    let pending = store.pending();
    match store.flush() {
        Ok(outcome) => {
            report.processed += outcome.written;
            for failure in outcome.failures {
                failures.record(
                    report,
                    DocumentFailure {
                        source: failure.source,
                        error: failure.error.into(),
                    },
                );
            }
        }
        Err(e) => {
            error!("Failed to commit batch of {} artworks: {}", pending, e);
            report.errors += pending;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use serde_json::json;
    use tempfile::TempDir;

    fn config(commit_interval: usize) -> IngestConfig {
        IngestConfig {
            commit_interval,
            ..IngestConfig::default()
        }
    }

    fn write_docs(dir: &Path) {
        let docs = [
            json!({"id": 42, "title": "Study in Blue", "color": {"h": 210, "l": 50, "s": 80}, "category_ids": ["1", "7"]}),
            json!({"id": 7, "title": "Haystacks", "thumbnail": {"width": 3000, "height": 2250}}),
            json!({"id": 11, "title": "Water Lilies", "is_public_domain": true, "term_titles": ["water", "lily"]}),
            json!({"id": 19, "title": "Paris Street; Rainy Day", "date_start": 1877}),
        ];
        for doc in docs {
            fs::write(dir.join(format!("{}.json", doc["id"])), doc.to_string()).unwrap();
        }
    }

    fn run(dir: &Path, store: &mut ArtworkStore, interval: usize) -> IngestReport {
        ingest_directory(dir, store, &config(interval), &ProgressBar::hidden()).unwrap()
    }

    #[test]
    fn test_ingest_twice_is_idempotent() -> Result<()> {
        let input = TempDir::new()?;
        write_docs(input.path());
        let db = TempDir::new()?;
        let mut store = ArtworkStore::open(&db.path().join("a.db"), 3)?;

        let first = run(input.path(), &mut store, 3);
        assert_eq!(first, IngestReport { processed: 4, errors: 0 });
        let once = store.snapshot();

        let second = run(input.path(), &mut store, 3);
        assert_eq!(second, first);
        assert_eq!(store.snapshot(), once);
        Ok(())
    }

    #[test]
    fn test_order_does_not_matter() -> Result<()> {
        let input = TempDir::new()?;
        write_docs(input.path());
        let mut paths = scanner::list_documents(input.path(), "json")?;
        paths.sort();

        let db = TempDir::new()?;
        let mut forward = ArtworkStore::open(&db.path().join("forward.db"), 2)?;
        let mut backward = ArtworkStore::open(&db.path().join("backward.db"), 2)?;

        let progress = ProgressBar::hidden();
        ingest_paths(paths.clone(), &mut forward, &config(2), &progress);
        paths.reverse();
        ingest_paths(paths, &mut backward, &config(2), &progress);

        assert_eq!(forward.snapshot(), backward.snapshot());
        Ok(())
    }

    #[test]
    fn test_malformed_documents_are_contained() -> Result<()> {
        let input = TempDir::new()?;
        write_docs(input.path());
        fs::write(input.path().join("bad-encoding.json"), [0xff, 0xfe, 0x7b, 0x7d])?;
        fs::write(input.path().join("truncated.json"), r#"{"id": 5, "title": "#)?;
        fs::write(input.path().join("list.json"), "[1, 2]")?;

        let db = TempDir::new()?;
        let mut store = ArtworkStore::open(&db.path().join("a.db"), 2)?;
        let report = run(input.path(), &mut store, 2);

        assert_eq!(report, IngestReport { processed: 4, errors: 3 });
        assert_eq!(store.count()?, 4);
        for id in [42, 7, 11, 19] {
            assert!(store.get(id)?.is_some(), "artwork {} missing", id);
        }
        Ok(())
    }

    #[test]
    fn test_document_without_id_counts_as_error() -> Result<()> {
        let input = TempDir::new()?;
        write_docs(input.path());
        fs::write(input.path().join("anonymous.json"), r#"{"title": "Anonymous"}"#)?;

        let db = TempDir::new()?;
        let mut store = ArtworkStore::open(&db.path().join("a.db"), 100)?;
        let report = run(input.path(), &mut store, 100);

        assert_eq!(report, IngestReport { processed: 4, errors: 1 });
        Ok(())
    }

    #[test]
    fn test_failure_detail_is_capped_but_all_counted() -> Result<()> {
        let mut report = IngestReport::default();
        let mut failures = FailureLog::new(1);
        for name in ["a.json", "b.json", "c.json"] {
            failures.record(
                &mut report,
                DocumentFailure {
                    source: PathBuf::from(name),
                    error: StoreError::MissingId.into(),
                },
            );
        }
        assert_eq!(failures.shown, 1);
        assert_eq!(report.errors, 3);

        let input = TempDir::new()?;
        write_docs(input.path());
        for name in ["x.json", "y.json", "z.json"] {
            fs::write(input.path().join(name), "not json")?;
        }
        let db = TempDir::new()?;
        let mut store = ArtworkStore::open(&db.path().join("a.db"), 2)?;
        let capped = IngestConfig {
            commit_interval: 2,
            max_error_details: 1,
            ..IngestConfig::default()
        };
        let report = ingest_directory(input.path(), &mut store, &capped, &ProgressBar::hidden())?;
        assert_eq!(report, IngestReport { processed: 4, errors: 3 });
        Ok(())
    }

    #[test]
    fn test_failed_commit_keeps_earlier_batches() -> Result<()> {
        let db = TempDir::new()?;
        let mut store = ArtworkStore::open(&db.path().join("a.db"), 2)?;
        let mut report = IngestReport::default();
        let mut failures = FailureLog::new(5);

        for doc in [json!({"id": 1, "title": "Morning"}), json!({"id": 2, "title": "Noon"})] {
            store.stage(PathBuf::from(format!("{}.json", doc["id"])), normalize(&doc)?);
        }
        commit(&mut store, &mut report, &mut failures);
        assert_eq!(report, IngestReport { processed: 2, errors: 0 });

        store.execute_raw("ALTER TABLE artworks RENAME TO artworks_aside")?;
        for doc in [json!({"id": 3, "title": "Dusk"}), json!({"id": 4, "title": "Night"})] {
            store.stage(PathBuf::from(format!("{}.json", doc["id"])), normalize(&doc)?);
        }
        commit(&mut store, &mut report, &mut failures);
        assert_eq!(report, IngestReport { processed: 2, errors: 2 });
        assert_eq!(store.pending(), 0);

        store.execute_raw("ALTER TABLE artworks_aside RENAME TO artworks")?;
        assert_eq!(store.count()?, 2);
        assert!(store.get(1)?.is_some());
        assert!(store.get(3)?.is_none());
        Ok(())
    }

    #[test]
    fn test_missing_input_directory_aborts() -> Result<()> {
        let db = TempDir::new()?;
        let mut store = ArtworkStore::open(&db.path().join("a.db"), 10)?;
        let result = ingest_directory(
            &db.path().join("nowhere"),
            &mut store,
            &config(10),
            &ProgressBar::hidden(),
        );
        assert!(result.is_err());
        Ok(())
    }
}
