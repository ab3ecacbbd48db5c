use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;
use walkdir::WalkDir;

use crate::curate::filter::{ratio_suitable, Verdict};
use crate::utils::config::FilterConfig;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Checks a local image against the minimum size and preferred aspect ratios.
pub fn check_image_file(path: &Path, config: &FilterConfig) -> Result<Verdict> {
    let (width, height) = image::image_dimensions(path)
        .with_context(|| format!("Cannot analyze image {:?}", path))?;
    Ok(check_dimensions(width, height, config))
}

pub fn check_dimensions(width: u32, height: u32, config: &FilterConfig) -> Verdict {
    if width < config.min_image_width || height < config.min_image_height {
        return Verdict::reject(format!("Image too small: {}x{}", width, height));
    }

    let ratio = width as f64 / height as f64;
    if !ratio_suitable(ratio, config) {
        return Verdict::reject(format!("Aspect ratio not suitable: {:.2}", ratio));
    }

    Verdict::accept(format!("Good quality: {}x{}, ratio: {:.2}", width, height, ratio))
}

/// Runs [`check_image_file`] over the images directly inside `dir`.
/// Unreadable images are rejected rather than aborting the scan.
pub fn vet_directory(dir: &Path, config: &FilterConfig) -> Result<Vec<(PathBuf, Verdict)>> {
    std::fs::read_dir(dir).with_context(|| format!("Failed to open image directory {:?}", dir))?;

    let mut results = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }

        let verdict = check_image_file(entry.path(), config)
            .unwrap_or_else(|e| Verdict::reject(format!("{:#}", e)));
        results.push((entry.into_path(), verdict));
    }
    Ok(results)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::TempDir;

    #[test]
    fn test_check_dimensions() {
        let config = FilterConfig::default();
        assert!(check_dimensions(1920, 1080, &config).accepted);
        assert_eq!(check_dimensions(640, 480, &config).reason, "Image too small: 640x480");
        assert_eq!(
            check_dimensions(900, 1800, &config).reason,
            "Aspect ratio not suitable: 0.50"
        );
    }

    #[test]
    fn test_vet_directory() -> Result<()> {
        let dir = TempDir::new()?;
        RgbImage::new(1600, 1000).save(dir.path().join("a_wide.png"))?;
        RgbImage::new(400, 300).save(dir.path().join("b_small.png"))?;
        std::fs::write(dir.path().join("c_broken.jpg"), b"not an image")?;
        std::fs::write(dir.path().join("notes.txt"), b"skip me")?;

        let results = vet_directory(dir.path(), &FilterConfig::default())?;
        let verdicts: Vec<bool> = results.iter().map(|(_, v)| v.accepted).collect();
        assert_eq!(verdicts, vec![true, false, false]);
        assert!(results[2].1.reason.contains("Cannot analyze image"));
        Ok(())
    }
}
