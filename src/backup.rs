use crate::errors::{AppError, AppResult};
use crate::models::{BackupOutcome, ConflictDecision, NodeKind, ShelfItem};
use crate::storage::Storage;
use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Decides what happens when a single node fails to copy. Invoked
/// synchronously, at most once per failing node; the engine holds no locks and
/// performs no I/O while waiting on the decision.
pub trait ConflictHandler {
    fn resolve(&mut self, path: &Path, error: &str, kind: NodeKind) -> ConflictDecision;
}

impl<F> ConflictHandler for F
where
    F: FnMut(&Path, &str, NodeKind) -> ConflictDecision,
{
    fn resolve(&mut self, path: &Path, error: &str, kind: NodeKind) -> ConflictDecision {
        self(path, error, kind)
    }
}

/// Best-effort handler: every failing node is skipped.
pub fn skip_all() -> impl ConflictHandler {
    |_: &Path, _: &str, _: NodeKind| ConflictDecision::Skip
}

/// Fail-fast handler: the first failing node cancels the run.
pub fn abort_all() -> impl ConflictHandler {
    |_: &Path, _: &str, _: NodeKind| ConflictDecision::Abort
}

enum Walk {
    Done,
    Aborted,
}

type CopyFn = Box<dyn Fn(&Path, &Path) -> io::Result<u64>>;

/// Recursive point-in-time copy of a directory tree into a timestamped
/// destination. Per-node failures are resolved through the injected
/// `ConflictHandler`; an abort leaves already-written nodes in place (no
/// rollback).
pub struct BackupEngine {
    copy_file: CopyFn,
}

impl Default for BackupEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupEngine {
    pub fn new() -> Self {
        Self {
            copy_file: Box::new(|from, to| fs::copy(from, to)),
        }
    }

    /// Replaces the per-file copy primitive, for failure injection in tests or
    /// progress instrumentation.
    pub fn with_copier(copy_file: impl Fn(&Path, &Path) -> io::Result<u64> + 'static) -> Self {
        Self {
            copy_file: Box::new(copy_file),
        }
    }

    /// Copies `source` into `dest_base/<kind>/<yyyyMMdd_HHmmss>`. Two runs
    /// within the same second share a destination; collisions are not
    /// de-duplicated.
    pub fn run(
        &self,
        source: &Path,
        dest_base: &Path,
        kind: &str,
        handler: &mut dyn ConflictHandler,
    ) -> AppResult<BackupOutcome> {
        if !source.is_dir() {
            return Err(AppError::SourceNotFound(
                source.to_string_lossy().to_string(),
            ));
        }

        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let destination = dest_base.join(kind).join(&stamp);
        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            kind,
            "starting backup"
        );

        match self.copy_tree(source, &destination, handler) {
            Walk::Done => {
                tracing::info!(destination = %destination.display(), "backup completed");
                Ok(BackupOutcome::Completed { destination })
            }
            Walk::Aborted => {
                tracing::warn!(
                    destination = %destination.display(),
                    "backup canceled; partial destination left in place"
                );
                Ok(BackupOutcome::Canceled { destination })
            }
        }
    }

    /// Depth-first: files in this directory first, then subdirectories. A
    /// folder-level failure covers the whole subtree under it.
    fn copy_tree(
        &self,
        source: &Path,
        destination: &Path,
        handler: &mut dyn ConflictHandler,
    ) -> Walk {
        if let Err(error) = fs::create_dir_all(destination) {
            return decide(handler, source, &error, NodeKind::Folder);
        }
        let entries = match fs::read_dir(source) {
            Ok(entries) => entries,
            Err(error) => return decide(handler, source, &error, NodeKind::Folder),
        };

        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => return decide(handler, source, &error, NodeKind::Folder),
            };
            let target = destination.join(entry.file_name());
            if entry.path().is_dir() {
                dirs.push((entry.path(), target));
            } else {
                files.push((entry.path(), target));
            }
        }

        for (file, target) in files {
            if let Err(error) = (self.copy_file)(&file, &target) {
                tracing::warn!(path = %file.display(), error = %error, "file copy failed");
                match handler.resolve(&file, &error.to_string(), NodeKind::File) {
                    ConflictDecision::Skip => continue,
                    ConflictDecision::Abort => return Walk::Aborted,
                }
            }
        }

        for (dir, target) in dirs {
            if let Walk::Aborted = self.copy_tree(&dir, &target, handler) {
                return Walk::Aborted;
            }
        }

        Walk::Done
    }
}

fn decide(
    handler: &mut dyn ConflictHandler,
    path: &Path,
    error: &io::Error,
    kind: NodeKind,
) -> Walk {
    tracing::warn!(path = %path.display(), error = %error, kind = kind.as_str(), "folder access failed");
    match handler.resolve(path, &error.to_string(), kind) {
        ConflictDecision::Skip => Walk::Done,
        ConflictDecision::Abort => Walk::Aborted,
    }
}

/// Backs up one of an item's folders under the per-item layout
/// `<root>/<title>/Backups/<kind>/<timestamp>`. The surrounding application
/// passes "AppData" for the build folder and "UserData" for the data folder;
/// the engine treats the label as an opaque path segment.
pub fn backup_item_folder(
    engine: &BackupEngine,
    storage: &Storage,
    item: &ShelfItem,
    source: &Path,
    kind: &str,
    handler: &mut dyn ConflictHandler,
) -> AppResult<BackupOutcome> {
    // Checked before resolving the base folder, which creates directories; a
    // bad source must leave no writes behind.
    if !source.is_dir() {
        return Err(AppError::SourceNotFound(
            source.to_string_lossy().to_string(),
        ));
    }
    let base: PathBuf = storage.backup_base_folder(item)?;
    engine.run(source, &base, kind, handler)
}
