//! Collection manifests: building them from the store, resolving their ids
//! into display metadata, and the master index the desktop app reads.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::curate::filter::is_acceptable;
use crate::database::{ArtworkStore, ArtworkSummary, CandidateQuery};
use crate::utils::config::{CollectionsConfig, FilterConfig};

// Keys the enriched output owns; a stale copy in `extra` would duplicate them.
const ENRICHED_KEYS: &[&str] = &[
    "artwork_ids",
    "artwork_count",
    "artworks",
    "failed",
    "image_base_url",
];

/// A named, ordered selection of artwork ids. Unknown keys are carried through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionManifest {
    pub collection_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date_range: String,
    pub artwork_ids: Vec<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedArtwork {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCollection {
    pub collection_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date_range: String,
    #[serde(default)]
    pub artwork_ids: Vec<i64>,
    #[serde(default)]
    pub artwork_count: usize,
    #[serde(default)]
    pub artworks: Vec<EnrichedArtwork>,
    /// Manifest ids that could not be resolved against the store.
    #[serde(default)]
    pub failed: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date_range: String,
    pub artwork_count: usize,
    pub thumbnail_artworks: Vec<EnrichedArtwork>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionsIndex {
    pub collections: Vec<IndexEntry>,
    pub total_collections: usize,
    pub total_artworks: usize,
    pub created_date: String,
    pub version: String,
}

/// Descriptive fields for a manifest produced by [`build_manifest`].
#[derive(Debug, Clone, Default)]
pub struct ManifestMeta {
    pub collection_id: String,
    pub title: String,
    pub description: String,
    pub date_range: String,
}

/// Picks up to `filter.target_count` acceptable artworks from the store.
pub fn build_manifest(
    store: &ArtworkStore,
    query: &CandidateQuery,
    filter: &FilterConfig,
    meta: ManifestMeta,
) -> Result<CollectionManifest> {
    let candidates = store.candidates(query)?;
    let checked = candidates.len();

    let mut artwork_ids = Vec::new();
    for record in &candidates {
        if artwork_ids.len() >= filter.target_count {
            break;
        }
        let verdict = is_acceptable(record, filter);
        match record.id() {
            Some(id) if verdict.accepted => artwork_ids.push(id),
            id => debug!("Skipping artwork {:?}: {}", id, verdict.reason),
        }
    }

    info!(
        "Collection {}: selected {} of {} candidates",
        meta.collection_id,
        artwork_ids.len(),
        checked
    );

    Ok(CollectionManifest {
        collection_id: meta.collection_id,
        title: meta.title,
        description: meta.description,
        date_range: meta.date_range,
        artwork_ids,
        extra: Map::new(),
    })
}

/// Resolves every manifest id against the store, keeping manifest order.
/// Ids the store does not know end up in `failed`.
pub fn enrich(
    manifest: &CollectionManifest,
    store: &ArtworkStore,
    config: &CollectionsConfig,
) -> Result<EnrichedCollection> {
    let summaries = store.fetch_summaries(&manifest.artwork_ids)?;
    let total = manifest.artwork_ids.len();

    let mut artworks = Vec::with_capacity(total);
    let mut failed = Vec::new();
    for (i, id) in manifest.artwork_ids.iter().enumerate() {
        match summaries.get(id) {
            Some(summary) => artworks.push(enriched_artwork(summary, config)),
            None => {
                warn!("[{}/{}] Artwork ID {} not found in database", i + 1, total, id);
                failed.push(*id);
            }
        }
    }

    let mut extra = manifest.extra.clone();
    extra.retain(|key, _| !ENRICHED_KEYS.contains(&key.as_str()));

    info!(
        "Collection {}: {} artworks resolved, {} failed",
        manifest.collection_id,
        artworks.len(),
        failed.len()
    );

    Ok(EnrichedCollection {
        collection_id: manifest.collection_id.clone(),
        title: manifest.title.clone(),
        description: manifest.description.clone(),
        date_range: manifest.date_range.clone(),
        artwork_ids: manifest.artwork_ids.clone(),
        artwork_count: artworks.len(),
        artworks,
        failed,
        image_base_url: config.hosted_image_base.as_deref().map(with_trailing_slash),
        extra,
    })
}

fn enriched_artwork(summary: &ArtworkSummary, config: &CollectionsConfig) -> EnrichedArtwork {
    EnrichedArtwork {
        id: summary.id,
        title: summary.title.clone(),
        artist: summary.artist_display.clone(),
        date: summary.date_display.clone(),
        medium: summary.medium_display.clone(),
        image_id: summary.image_id.clone(),
        image_url: summary.image_id.as_deref().map(|id| iiif_url(config, id)),
        hosted_image_url: config
            .hosted_image_base
            .as_deref()
            .map(|base| format!("{}{}.jpg", with_trailing_slash(base), summary.id)),
        description: Some(summary.description.clone().unwrap_or_default()),
        short_description: Some(summary.short_description.clone().unwrap_or_default()),
    }
}

pub fn iiif_url(config: &CollectionsConfig, image_id: &str) -> String {
    format!(
        "{}/{}/full/{}/0/default.jpg",
        config.iiif_base.trim_end_matches('/'),
        image_id,
        config.image_size
    )
}

fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    }
}

pub fn build_index(
    collections: &[EnrichedCollection],
    created_date: NaiveDate,
    config: &CollectionsConfig,
) -> CollectionsIndex {
    let entries: Vec<IndexEntry> = collections
        .iter()
        .map(|c| IndexEntry {
            id: c.collection_id.clone(),
            title: c.title.clone(),
            description: c.description.clone(),
            date_range: c.date_range.clone(),
            artwork_count: c.artwork_count,
            thumbnail_artworks: c.artworks.iter().take(config.thumbnail_count).cloned().collect(),
        })
        .collect();

    CollectionsIndex {
        total_collections: entries.len(),
        total_artworks: collections.iter().map(|c| c.artwork_count).sum(),
        collections: entries,
        created_date: created_date.format("%Y-%m-%d").to_string(),
        version: config.index_version.clone(),
    }
}

pub fn load_manifest(path: &Path) -> Result<CollectionManifest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse manifest {:?}", path))
}

pub fn save_manifest(path: &Path, manifest: &CollectionManifest) -> Result<()> {
    write_json(path, manifest)
}

/// Writes `<out_dir>/collections/<collection_id>/collection.json`.
pub fn write_collection(out_dir: &Path, collection: &EnrichedCollection) -> Result<PathBuf> {
    let id = collection.collection_id.as_str();
    if !is_safe_collection_id(id) {
        bail!("Collection id {:?} is not usable as a directory name", id);
    }
    let path = out_dir
        .join("collections")
        .join(&collection.collection_id)
        .join("collection.json");
    write_json(&path, collection)?;
    Ok(path)
}

// One plain path component: no separators, no `.`/`..`, nothing absolute.
fn is_safe_collection_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', ':'])
        && !id.contains('\0')
}

pub fn write_index(out_dir: &Path, index: &CollectionsIndex) -> Result<PathBuf> {
    let path = out_dir.join("collections_index.json");
    write_json(&path, index)?;
    Ok(path)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}
