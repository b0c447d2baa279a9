use crate::models::CopyEntry;
use crate::utils::{classify_source, copy_file_overwrite, mirror_directory, CopyResult, SourceKind};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Copy every entry of `batch` into `destination_root`.
///
/// Never fails: per-entry problems end up in the returned report.
pub fn copy_artifacts<P: AsRef<Path>>(destination_root: P, batch: &[CopyEntry]) -> CopyReport {
    copy_artifacts_with_progress(destination_root, batch, |_| {})
}

/// Same as [`copy_artifacts`], calling `on_progress` with the completed fraction
/// after each top-level entry.
pub fn copy_artifacts_with_progress<P, F>(
    destination_root: P,
    batch: &[CopyEntry],
    mut on_progress: F,
) -> CopyReport
where
    P: AsRef<Path>,
    F: FnMut(f32),
{
    let destination_root = destination_root.as_ref();
    info!(
        "Copying {} entries into {}",
        batch.len(),
        destination_root.display()
    );

    let total = batch.len();
    let mut entries = Vec::with_capacity(total);

    for (index, entry) in batch.iter().enumerate() {
        let report = copy_entry(destination_root, index, entry);
        log_entry(&report);
        entries.push(report);
        on_progress((index + 1) as f32 / total as f32);
    }

    let report = CopyReport { entries };
    info!(
        "Artifact copy completed. Copied: {}, Skipped: {}, Failed: {}",
        report.copied_count(),
        report.skipped_count(),
        report.failed_count()
    );
    report
}

/// Process one top-level entry
fn copy_entry(destination_root: &Path, index: usize, entry: &CopyEntry) -> EntryReport {
    let destination = destination_root.join(&entry.dst_path);

    let outcome = if entry.is_empty() {
        EntryOutcome::Skipped(SkipReason::EmptyPath)
    } else {
        let source = Path::new(&entry.src_path);
        match classify_source(source) {
            SourceKind::File => copy_single_file(source, &destination),
            SourceKind::Directory => summarize_mirror(mirror_directory(source, &destination)),
            SourceKind::Missing => EntryOutcome::Skipped(SkipReason::SourceMissing),
            SourceKind::Unsupported => EntryOutcome::Skipped(SkipReason::UnsupportedSource),
        }
    };

    EntryReport {
        index,
        entry: entry.clone(),
        destination,
        outcome,
    }
}

fn copy_single_file(source: &Path, destination: &Path) -> EntryOutcome {
    match copy_file_overwrite(source, destination) {
        Ok(_) => EntryOutcome::Copied { files: 1 },
        Err(e) => EntryOutcome::Failed {
            copied: 0,
            errors: vec![CopyError {
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
                error: format!("{:#}", e),
            }],
        },
    }
}

/// Fold the per-file results of a directory mirror into one entry outcome
fn summarize_mirror(results: Vec<CopyResult>) -> EntryOutcome {
    let mut copied = 0;
    let mut errors = Vec::new();

    for result in results {
        match result {
            CopyResult::Success { .. } => copied += 1,
            CopyResult::Skipped {
                source,
                reason,
                ..
            } => {
                debug!("Skipped {}: {}", source.display(), reason);
            }
            CopyResult::Error {
                source,
                destination,
                error,
            } => errors.push(CopyError {
                source,
                destination,
                error,
            }),
        }
    }

    if errors.is_empty() {
        EntryOutcome::Copied { files: copied }
    } else {
        EntryOutcome::Failed { copied, errors }
    }
}

fn log_entry(report: &EntryReport) {
    match &report.outcome {
        EntryOutcome::Copied { files } => info!(
            "Copied {} -> {} ({} file(s))",
            report.entry.src_path,
            report.destination.display(),
            files
        ),
        EntryOutcome::Skipped(reason) => debug!(
            "Skipped copy entry #{} ({:?} -> {:?}): {}",
            report.index, report.entry.src_path, report.entry.dst_path, reason
        ),
        EntryOutcome::Failed { errors, .. } => {
            for error in errors {
                warn!(
                    "Failed to copy {} to {}: {}",
                    error.source.display(),
                    error.destination.display(),
                    error.error
                );
            }
        }
    }
}

/// Why an entry was not copied at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    EmptyPath,
    SourceMissing,
    UnsupportedSource,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::EmptyPath => "source or destination path is empty",
            SkipReason::SourceMissing => "source does not exist",
            SkipReason::UnsupportedSource => "source is neither a file nor a directory",
        };
        f.write_str(reason)
    }
}

/// Terminal state of a copy entry
#[derive(Debug, Clone)]
pub enum EntryOutcome {
    Copied { files: usize },
    Skipped(SkipReason),
    /// At least one file failed; `copied` files made it anyway
    Failed { copied: usize, errors: Vec<CopyError> },
}

impl EntryOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self, EntryOutcome::Copied { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, EntryOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EntryOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct EntryReport {
    pub index: usize,
    pub entry: CopyEntry,
    pub destination: PathBuf,
    pub outcome: EntryOutcome,
}

#[derive(Debug, Clone)]
pub struct CopyError {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub error: String,
}

/// Report structure for an artifact copy batch
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    pub entries: Vec<EntryReport>,
}

impl CopyReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn copied_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_copied()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_skipped()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failed()).count()
    }

    /// Total number of individual files written
    pub fn files_copied(&self) -> usize {
        self.entries
            .iter()
            .map(|e| match &e.outcome {
                EntryOutcome::Copied { files } => *files,
                EntryOutcome::Failed { copied, .. } => *copied,
                EntryOutcome::Skipped(_) => 0,
            })
            .sum()
    }

    pub fn errors(&self) -> impl Iterator<Item = &CopyError> {
        self.entries.iter().flat_map(|e| match &e.outcome {
            EntryOutcome::Failed { errors, .. } => errors.as_slice(),
            _ => &[][..],
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    pub fn success_rate(&self) -> f64 {
        let attempted = self.copied_count() + self.failed_count();
        if attempted == 0 {
            0.0
        } else {
            self.copied_count() as f64 / attempted as f64
        }
    }
}
