use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "New Software";

pub const DEFAULT_LEFT_COLUMN_WIDTH: f64 = 360.0;
pub const DEFAULT_WINDOW_LEFT: f64 = 100.0;
pub const DEFAULT_WINDOW_TOP: f64 = 100.0;
pub const DEFAULT_WINDOW_WIDTH: f64 = 1400.0;
pub const DEFAULT_WINDOW_HEIGHT: f64 = 900.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    #[default]
    InDevelopment,
    InTesting,
    Deployed,
    Archived,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InDevelopment => "In development",
            Self::InTesting => "In testing",
            Self::Deployed => "Deployed",
            Self::Archived => "Archived",
        }
    }
}

/// One catalogued software entry. Identity is `id`, assigned once at creation;
/// display order is owned by the containing sequence, not the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShelfItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub notes: String,
    pub image_path: String,
    pub executable_path: String,
    pub build_folder: String,
    pub data_folder: String,
    pub status: ItemStatus,
}

impl Default for ShelfItem {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            notes: String::new(),
            image_path: String::new(),
            executable_path: String::new(),
            build_folder: String::new(),
            data_folder: String::new(),
            status: ItemStatus::default(),
        }
    }
}

impl ShelfItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A single user-visible field edit. Every variant is save-worthy; transient
/// UI state (selection) goes through `ItemStore::set_selected` and never
/// touches disk.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Title(String),
    Description(String),
    Notes(String),
    ImagePath(String),
    ExecutablePath(String),
    BuildFolder(String),
    DataFolder(String),
    Status(ItemStatus),
}

impl FieldEdit {
    /// Applies the edit in place; returns false when the stored value was
    /// already equal.
    pub(crate) fn apply(self, item: &mut ShelfItem) -> bool {
        fn assign(slot: &mut String, value: String) -> bool {
            if *slot == value {
                return false;
            }
            *slot = value;
            true
        }

        match self {
            Self::Title(value) => assign(&mut item.title, value),
            Self::Description(value) => assign(&mut item.description, value),
            Self::Notes(value) => assign(&mut item.notes, value),
            Self::ImagePath(value) => assign(&mut item.image_path, value),
            Self::ExecutablePath(value) => assign(&mut item.executable_path, value),
            Self::BuildFolder(value) => assign(&mut item.build_folder, value),
            Self::DataFolder(value) => assign(&mut item.data_folder, value),
            Self::Status(value) => {
                if item.status == value {
                    return false;
                }
                item.status = value;
                true
            }
        }
    }
}

/// Window/layout geometry plus the optional backup-root override.
///
/// Geometry fields may hold NaN in memory ("no saved position"); they are
/// sanitized to fixed defaults before every write so the persisted file never
/// contains a non-finite number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub backups_root: String,
    pub left_column_width: f64,
    pub window_left: f64,
    pub window_top: f64,
    pub window_width: f64,
    pub window_height: f64,
    pub is_maximized: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            backups_root: String::new(),
            left_column_width: DEFAULT_LEFT_COLUMN_WIDTH,
            window_left: f64::NAN,
            window_top: f64::NAN,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            is_maximized: false,
        }
    }
}

impl AppSettings {
    pub fn sanitized(&self) -> Self {
        Self {
            backups_root: self.backups_root.clone(),
            left_column_width: sanitize(self.left_column_width, DEFAULT_LEFT_COLUMN_WIDTH),
            window_left: sanitize(self.window_left, DEFAULT_WINDOW_LEFT),
            window_top: sanitize(self.window_top, DEFAULT_WINDOW_TOP),
            window_width: sanitize(self.window_width, DEFAULT_WINDOW_WIDTH),
            window_height: sanitize(self.window_height, DEFAULT_WINDOW_HEIGHT),
            is_maximized: self.is_maximized,
        }
    }
}

fn sanitize(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    Skip,
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    Completed { destination: PathBuf },
    Canceled { destination: PathBuf },
}

impl BackupOutcome {
    pub fn destination(&self) -> &Path {
        match self {
            Self::Completed { destination } | Self::Canceled { destination } => destination,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}
