use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix of the per-asset sidecar files that never leave the project
pub const SIDECAR_METADATA_SUFFIX: &str = ".meta";

/// Check if a file is a sidecar metadata file
pub fn is_sidecar_metadata(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(SIDECAR_METADATA_SUFFIX))
        .unwrap_or(false)
}

/// Kind of filesystem object found at a copy source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Directory,
    Missing,
    Unsupported,
}

/// Classify a copy source without following it any further than the OS does
pub fn classify_source(path: &Path) -> SourceKind {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => SourceKind::File,
        Ok(metadata) if metadata.is_dir() => SourceKind::Directory,
        Ok(_) => SourceKind::Unsupported,
        Err(_) if fs::symlink_metadata(path).is_ok() => SourceKind::Unsupported,
        Err(_) => SourceKind::Missing,
    }
}

/// Copy a single file, overwriting the destination.
/// The destination's parent directory must already exist.
pub fn copy_file_overwrite<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<u64> {
    let src_path = source.as_ref();
    let dest_path = destination.as_ref();

    fs::copy(src_path, dest_path)
        .with_context(|| format!("Failed to copy file from {:?} to {:?}", src_path, dest_path))
}

/// Recursively mirror `source_dir` into `dest_dir`, leaving out sidecar metadata files.
///
/// Every file is copied on its own; one failure is recorded and the walk goes on.
pub fn mirror_directory<P: AsRef<Path>, Q: AsRef<Path>>(source_dir: P, dest_dir: Q) -> Vec<CopyResult> {
    let source_dir = source_dir.as_ref();
    let dest_dir = dest_dir.as_ref();
    let mut results = Vec::new();

    if let Err(e) = fs::create_dir_all(dest_dir) {
        results.push(CopyResult::Error {
            source: source_dir.to_path_buf(),
            destination: dest_dir.to_path_buf(),
            error: format!("Failed to create directory {:?}: {}", dest_dir, e),
        });
        return results;
    }

    for entry in WalkDir::new(source_dir).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let source = e.path().unwrap_or(source_dir).to_path_buf();
                let destination = mirrored_path(source_dir, dest_dir, &source);
                results.push(CopyResult::Error {
                    source,
                    destination,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let path = entry.path();
        let dest_path = mirrored_path(source_dir, dest_dir, path);

        if entry.file_type().is_dir() {
            if let Err(e) = fs::create_dir_all(&dest_path) {
                results.push(CopyResult::Error {
                    source: path.to_path_buf(),
                    destination: dest_path,
                    error: format!("Failed to create directory: {}", e),
                });
            }
            continue;
        }

        if is_sidecar_metadata(path) {
            results.push(CopyResult::Skipped {
                source: path.to_path_buf(),
                destination: dest_path,
                reason: "Sidecar metadata file".to_string(),
            });
            continue;
        }

        // Symlinks count only when they resolve to a regular file.
        if !path.is_file() {
            results.push(CopyResult::Skipped {
                source: path.to_path_buf(),
                destination: dest_path,
                reason: "Not a regular file".to_string(),
            });
            continue;
        }

        match copy_file_overwrite(path, &dest_path) {
            Ok(_) => results.push(CopyResult::Success {
                source: path.to_path_buf(),
                destination: dest_path,
            }),
            Err(e) => results.push(CopyResult::Error {
                source: path.to_path_buf(),
                destination: dest_path,
                error: format!("{:#}", e),
            }),
        }
    }

    results
}

/// Map a path under `source_dir` onto the same relative location under `dest_dir`
fn mirrored_path(source_dir: &Path, dest_dir: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(source_dir) {
        Ok(relative) => dest_dir.join(relative),
        Err(_) => dest_dir.to_path_buf(),
    }
}

/// Result of a single file copy
#[derive(Debug, Clone)]
pub enum CopyResult {
    Success {
        source: PathBuf,
        destination: PathBuf,
    },
    Skipped {
        source: PathBuf,
        destination: PathBuf,
        reason: String,
    },
    Error {
        source: PathBuf,
        destination: PathBuf,
        error: String,
    },
}

impl CopyResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CopyResult::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CopyResult::Error { .. })
    }
}
