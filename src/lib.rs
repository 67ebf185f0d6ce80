pub mod backup;
pub mod errors;
pub mod filter;
pub mod models;
pub mod reorder;
pub mod storage;
pub mod store;

pub use backup::{abort_all, backup_item_folder, skip_all, BackupEngine, ConflictHandler};
pub use errors::{AppError, AppResult};
pub use models::{
    AppSettings, BackupOutcome, ConflictDecision, FieldEdit, ItemStatus, NodeKind, ShelfItem,
};
pub use storage::Storage;
pub use store::{ItemStore, StoreObserver};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Sets up daily-rolling file logging under `<data_dir>/logs`, filtered by
/// `RUST_LOG` (default `info`). Call once at startup; subsequent calls fail.
pub fn init_tracing(data_dir: &Path) -> AppResult<()> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "shelf.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}
