use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Lists the artwork documents directly inside `root`, in directory order.
///
/// Subdirectories are not descended into and hidden files are skipped.
pub fn list_documents(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    fs::read_dir(root).with_context(|| format!("Failed to open input directory {:?}", root))?;

    let mut documents = Vec::new();
    let walker = WalkDir::new(root).min_depth(1).max_depth(1).into_iter();

    for entry in walker.filter_entry(|e| !is_hidden(e)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("Failed to list input directory {:?}", root));
            }
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", root, e);
                continue;
            }
        };
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            documents.push(entry.into_path());
        }
    }
    Ok(documents)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name()
         .to_str()
         .map(|s| s.starts_with('.'))
         .unwrap_or(false)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
