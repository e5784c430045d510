//! Parallel file discovery for evidence streams and markup templates.
//!
//! Performance optimizations:
//! - Early directory pruning via `WalkDir::filter_entry` (O(1) subtree skip)
//! - Parallel entry processing via Rayon's `par_bridge`
//!
//! Results are sorted so that downstream ingestion order is stable.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories never descended into.
const EXCLUDED_DIRS: &[&str] = &["target", ".git", "node_modules", "build", ".idea"];

/// Extensions of evidence stream files (JSON Lines).
pub const EVIDENCE_EXTENSIONS: &[&str] = &["jsonl", "ndjson"];

/// Default template extensions scanned for bindings.
pub const DEFAULT_MARKUP_EXTENSIONS: &[&str] = &["xhtml"];

/// Template directory, relative to the project root, used when none is
/// configured.
pub const DEFAULT_MARKUP_DIR: &str = "src/main/webapp";

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.file_type().is_dir()
        && entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Gathers every file under `root` whose extension is in `extensions`.
///
/// A `root` that is itself a matching file is returned as the only entry.
pub fn gather_files(root: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(if has_extension(root, extensions) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let excludes: HashSet<&str> = EXCLUDED_DIRS.iter().copied().collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if path.is_file() && has_extension(path, extensions) {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to gather files from {}", root.display()))?;

    files.sort();
    Ok(files)
}

/// Evidence files (`.jsonl`, `.ndjson`) under `root`.
pub fn gather_evidence_files(root: &Path) -> Result<Vec<PathBuf>> {
    gather_files(root, EVIDENCE_EXTENSIONS)
}

/// Markup templates under `root` with the given extensions.
pub fn gather_markup_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let exts: Vec<&str> = extensions.iter().map(String::as_str).collect();
    gather_files(root, &exts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir(name: &str) -> PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "usagegraph_scan_{}_{}_{}",
            name,
            std::process::id(),
            id
        ));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_gather_sorted_and_filtered() {
        let dir = temp_dir("filter");
        fs::create_dir_all(dir.join("web/pages")).unwrap();
        fs::create_dir_all(dir.join("target")).unwrap();
        fs::write(dir.join("web/pages/b.xhtml"), "").unwrap();
        fs::write(dir.join("web/a.xhtml"), "").unwrap();
        fs::write(dir.join("web/style.css"), "").unwrap();
        fs::write(dir.join("target/skipped.xhtml"), "").unwrap();

        let files = gather_markup_files(&dir, &["xhtml".to_string()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("web/a.xhtml"));
        assert!(files[1].ends_with("web/pages/b.xhtml"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_single_file_root() {
        let dir = temp_dir("single");
        let file = dir.join("events.jsonl");
        fs::write(&file, "").unwrap();

        assert_eq!(gather_evidence_files(&file).unwrap(), vec![file.clone()]);
        assert!(gather_evidence_files(&dir.join("missing")).is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
