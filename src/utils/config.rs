use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "artwall.toml";

/// Everything the entry points need, passed in explicitly. Every field has a
/// default so an empty (or absent) file is a valid configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub filter: FilterConfig,
    pub collections: CollectionsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("artworks.db"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IngestConfig {
    /// Rows per transaction; progress is reported at the same cadence.
    pub commit_interval: usize,
    /// How many failures are logged in full before they are only counted.
    pub max_error_details: usize,
    pub extension: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            commit_interval: 1000,
            max_error_details: 5,
            extension: "json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FilterConfig {
    pub require_public_domain: bool,
    /// Empty means every department is acceptable.
    pub preferred_departments: Vec<String>,
    pub exclude_keywords: Vec<String>,
    /// Empty disables the medium check.
    pub medium_keywords: Vec<String>,
    pub preferred_aspect_ratios: Vec<(u32, u32)>,
    pub aspect_ratio_tolerance: f64,
    pub min_image_width: u32,
    pub min_image_height: u32,
    pub target_count: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            require_public_domain: true,
            preferred_departments: Vec::new(),
            exclude_keywords: [
                "fragment",
                "fragments",
                "study for",
                "sketch for",
                "detail of",
                "copy after",
                "attributed to",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            medium_keywords: [
                "oil on canvas",
                "oil on panel",
                "oil on board",
                "tempera on panel",
                "acrylic on canvas",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            preferred_aspect_ratios: vec![(16, 10), (16, 9), (4, 3), (3, 2), (5, 4)],
            aspect_ratio_tolerance: 0.4,
            min_image_width: 800,
            min_image_height: 600,
            target_count: 48,
        }
    }
}

impl FilterConfig {
    /// The same settings restricted to `departments`; an empty list keeps the
    /// configured preference.
    pub fn with_departments(&self, departments: &[String]) -> Self {
        let mut filter = self.clone();
        if !departments.is_empty() {
            filter.preferred_departments = departments.to_vec();
        }
        filter
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CollectionsConfig {
    pub iiif_base: String,
    pub image_size: String,
    /// Where downloaded images are re-hosted, e.g. a raw GitHub URL ending in `/`.
    pub hosted_image_base: Option<String>,
    pub thumbnail_count: usize,
    pub index_version: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            iiif_base: "https://www.artic.edu/iiif/2".to_string(),
            image_size: "843,".to_string(),
            hosted_image_base: None,
            thumbnail_count: 4,
            index_version: "1.0".to_string(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Loads `path` if it exists, otherwise falls back to the defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        let config = load_config(path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    } else {
        info!("No configuration at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.ingest.commit_interval == 0 {
        bail!("ingest.commit_interval must be > 0");
    }
    let tolerance = config.filter.aspect_ratio_tolerance;
    if tolerance.is_nan() || tolerance < 0.0 {
        bail!("filter.aspect_ratio_tolerance must be >= 0");
    }
    if config
        .filter
        .preferred_aspect_ratios
        .iter()
        .any(|&(w, h)| w == 0 || h == 0)
    {
        bail!("filter.preferred_aspect_ratios entries must be non-zero");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("artwall.toml");
        fs::write(
            &path,
            r#"
[database]
path = "/tmp/chicago.db"

[filter]
preferred_departments = ["Painting and Sculpture of Europe"]
preferred_aspect_ratios = [[16, 9]]

[collections]
hosted_image_base = "https://raw.githubusercontent.com/someone/ArtWall-Collections/main/images/"
"#,
        )?;

        let config = load_config(&path)?;
        assert_eq!(config.database.path, PathBuf::from("/tmp/chicago.db"));
        assert_eq!(config.ingest.commit_interval, 1000);
        assert_eq!(config.filter.preferred_departments.len(), 1);
        assert_eq!(config.filter.preferred_aspect_ratios, vec![(16, 9)]);
        assert!(config.filter.exclude_keywords.contains(&"study for".to_string()));
        assert_eq!(config.collections.image_size, "843,");
        assert!(config.collections.hosted_image_base.is_some());
        Ok(())
    }

    #[test]
    fn test_missing_file_uses_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let config = load_or_default(&dir.path().join("absent.toml"))?;
        assert_eq!(config.database.path, PathBuf::from("artworks.db"));
        assert_eq!(config.filter.target_count, 48);
        Ok(())
    }

    #[test]
    fn test_rejects_zero_commit_interval() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("artwall.toml");
        fs::write(&path, "[ingest]\ncommit_interval = 0\n")?;
        assert!(load_config(&path).is_err());
        Ok(())
    }
}
