use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::error;
use walkdir::WalkDir;

use crate::curate::manifest::EnrichedCollection;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionCoverage {
    pub name: String,
    pub total: usize,
    pub with_description: usize,
    pub missing_titles: Vec<String>,
}

impl CollectionCoverage {
    pub fn missing(&self) -> usize {
        self.total - self.with_description
    }

    pub fn percent(&self) -> f64 {
        percent(self.with_description, self.total)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageReport {
    pub collections: Vec<CollectionCoverage>,
}

impl CoverageReport {
    pub fn total(&self) -> usize {
        self.collections.iter().map(|c| c.total).sum()
    }

    pub fn with_description(&self) -> usize {
        self.collections.iter().map(|c| c.with_description).sum()
    }

    pub fn missing(&self) -> usize {
        self.total() - self.with_description()
    }

    pub fn percent(&self) -> f64 {
        percent(self.with_description(), self.total())
    }

    pub fn is_complete(&self) -> bool {
        self.missing() == 0
    }

    /// Collections with gaps, lowest coverage first.
    pub fn worst(&self) -> Vec<&CollectionCoverage> {
        let mut gaps: Vec<_> = self.collections.iter().filter(|c| c.missing() > 0).collect();
        gaps.sort_by(|a, b| a.percent().total_cmp(&b.percent()));
        gaps
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn description_coverage(collections: &[(String, EnrichedCollection)]) -> CoverageReport {
    let collections = collections
        .iter()
        .map(|(name, collection)| {
            let mut with_description = 0;
            let mut missing_titles = Vec::new();
            for artwork in &collection.artworks {
                let described = artwork
                    .description
                    .as_deref()
                    .map_or(false, |d| !d.trim().is_empty());
                if described {
                    with_description += 1;
                } else {
                    missing_titles.push(
                        artwork.title.clone().unwrap_or_else(|| "Unknown Title".to_string()),
                    );
                }
            }
            CollectionCoverage {
                name: name.clone(),
                total: collection.artworks.len(),
                with_description,
                missing_titles,
            }
        })
        .collect();
    CoverageReport { collections }
}

/// Reads every `<dir>/<name>/collection.json`, sorted by name. Files that fail
/// to parse are logged and skipped.
pub fn load_collections(dir: &Path) -> Result<Vec<(String, EnrichedCollection)>> {
    fs::read_dir(dir).with_context(|| format!("Collections directory not found: {:?}", dir))?;

    let mut collections = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "collection.json")
    {
        let name = entry
            .path()
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let parsed = fs::read_to_string(entry.path())
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str(&s).map_err(anyhow::Error::from));
        match parsed {
            Ok(collection) => collections.push((name, collection)),
            Err(e) => error!("Error processing {:?}: {}", entry.path(), e),
        }
    }
    Ok(collections)
}
