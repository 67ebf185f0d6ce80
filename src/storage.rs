use crate::errors::{AppError, AppResult};
use crate::models::{AppSettings, ShelfItem};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const ITEMS_FILE: &str = "items.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const BACKUPS_DIR: &str = "Backups";

/// Flat-file persistence for the item list and settings. Writes are whole-file
/// replacements; loads degrade to defaults instead of failing.
#[derive(Debug, Clone)]
pub struct Storage {
    base_folder: PathBuf,
    items_file: PathBuf,
    settings_file: PathBuf,
}

impl Storage {
    pub fn new(base_folder: impl Into<PathBuf>) -> AppResult<Self> {
        let base_folder = base_folder.into();
        fs::create_dir_all(&base_folder)
            .map_err(|error| AppError::Persistence(error.to_string()))?;
        Ok(Self {
            items_file: base_folder.join(ITEMS_FILE),
            settings_file: base_folder.join(SETTINGS_FILE),
            base_folder,
        })
    }

    pub fn base_folder(&self) -> &Path {
        &self.base_folder
    }

    /// Loads the full item list. A missing file is seeded with an empty list;
    /// an unreadable or corrupt file yields an empty list with a warning.
    pub fn load_items(&self) -> Vec<ShelfItem> {
        if !self.items_file.exists() {
            if let Err(error) = self.save_items(&[]) {
                tracing::warn!(error = %error, "failed to seed empty item list");
            }
            return Vec::new();
        }

        let raw = match fs::read_to_string(&self.items_file) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(error = %error, "item list unreadable; starting empty");
                return Vec::new();
            }
        };
        let items: Vec<ShelfItem> = match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!(error = %error, "item list malformed; starting empty");
                return Vec::new();
            }
        };
        dedupe_by_id(items)
    }

    pub fn save_items(&self, items: &[ShelfItem]) -> AppResult<()> {
        let json = serde_json::to_string_pretty(items)?;
        fs::write(&self.items_file, json).map_err(|error| AppError::Persistence(error.to_string()))
    }

    /// Loads settings with the same degrade-to-default policy as `load_items`.
    /// The first load seeds a defaults file on disk.
    pub fn load_settings(&self) -> AppSettings {
        if !self.settings_file.exists() {
            let settings = AppSettings::default();
            if let Err(error) = self.save_settings(&settings) {
                tracing::warn!(error = %error, "failed to seed default settings");
            }
            return settings;
        }

        let raw = match fs::read_to_string(&self.settings_file) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(error = %error, "settings unreadable; using defaults");
                return AppSettings::default();
            }
        };
        match serde_json::from_str::<AppSettings>(&raw) {
            // JSON cannot encode NaN, but an overflowing literal like 1e999
            // parses to infinity; sanitize so it never reaches memory.
            Ok(settings) => settings.sanitized(),
            Err(error) => {
                tracing::warn!(error = %error, "settings malformed; using defaults");
                AppSettings::default()
            }
        }
    }

    /// Sanitizes geometry before writing so the file never holds a non-finite
    /// number, which serde_json cannot round-trip.
    pub fn save_settings(&self, settings: &AppSettings) -> AppResult<()> {
        let json = serde_json::to_string_pretty(&settings.sanitized())?;
        fs::write(&self.settings_file, json)
            .map_err(|error| AppError::Persistence(error.to_string()))
    }

    /// Resolves `<backups_root-or-base>/<item title>/Backups`, creating it.
    pub fn backup_base_folder(&self, item: &ShelfItem) -> AppResult<PathBuf> {
        let settings = self.load_settings();
        let root = if settings.backups_root.trim().is_empty() {
            self.base_folder.clone()
        } else {
            PathBuf::from(&settings.backups_root)
        };
        let dest = root.join(&item.title).join(BACKUPS_DIR);
        fs::create_dir_all(&dest).map_err(|error| AppError::Io(error.to_string()))?;
        Ok(dest)
    }
}

fn dedupe_by_id(items: Vec<ShelfItem>) -> Vec<ShelfItem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(item.id.clone()) {
            unique.push(item);
        } else {
            tracing::warn!(id = %item.id, title = %item.title, "dropping duplicate item id on load");
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ItemStatus, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_LEFT, DEFAULT_WINDOW_TOP,
        DEFAULT_WINDOW_WIDTH,
    };

    fn temp_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().expect("temp storage root");
        let storage = Storage::new(dir.path()).expect("storage");
        (dir, storage)
    }

    #[test]
    fn first_load_seeds_empty_files() {
        let (dir, storage) = temp_storage();
        assert!(storage.load_items().is_empty());
        let _ = storage.load_settings();
        assert!(dir.path().join(ITEMS_FILE).exists());
        assert!(dir.path().join(SETTINGS_FILE).exists());
    }

    #[test]
    fn items_roundtrip_preserves_order_and_fields() {
        let (_dir, storage) = temp_storage();
        let mut first = ShelfItem::new("Zulu");
        first.status = ItemStatus::Deployed;
        first.notes = "release build".to_string();
        let second = ShelfItem::new("Alpha");

        storage
            .save_items(&[first.clone(), second.clone()])
            .expect("save");
        let loaded = storage.load_items();
        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn corrupt_item_list_degrades_to_empty() {
        let (dir, storage) = temp_storage();
        fs::write(dir.path().join(ITEMS_FILE), "{not json").expect("write corrupt");
        assert!(storage.load_items().is_empty());
    }

    #[test]
    fn duplicate_ids_are_dropped_on_load() {
        let (dir, storage) = temp_storage();
        let item = ShelfItem::new("Tool");
        let mut copy = item.clone();
        copy.title = "Tool copy".to_string();
        let json = serde_json::to_string_pretty(&[item.clone(), copy]).expect("serialize");
        fs::write(dir.path().join(ITEMS_FILE), json).expect("write");

        let loaded = storage.load_items();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "Tool");
    }

    #[test]
    fn non_finite_settings_never_reach_disk() {
        let (dir, storage) = temp_storage();
        let mut settings = AppSettings::default();
        settings.window_width = f64::NAN;
        settings.window_left = f64::NEG_INFINITY;
        storage.save_settings(&settings).expect("save");

        let raw = fs::read_to_string(dir.path().join(SETTINGS_FILE)).expect("read");
        assert!(!raw.contains("null"));
        let loaded = storage.load_settings();
        assert_eq!(loaded.window_width, DEFAULT_WINDOW_WIDTH);
        assert_eq!(loaded.window_left, DEFAULT_WINDOW_LEFT);
        assert_eq!(loaded.window_top, DEFAULT_WINDOW_TOP);
    }

    #[test]
    fn overflowing_geometry_literals_are_sanitized_on_load() {
        let (dir, storage) = temp_storage();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"backupsRoot":"","leftColumnWidth":360.0,"windowLeft":50.0,"windowTop":60.0,"windowWidth":1e999,"windowHeight":-1e999,"isMaximized":false}"#,
        )
        .expect("write hand-edited settings");

        let loaded = storage.load_settings();
        assert_eq!(loaded.window_width, DEFAULT_WINDOW_WIDTH);
        assert_eq!(loaded.window_height, DEFAULT_WINDOW_HEIGHT);
        assert_eq!(loaded.window_left, 50.0);
        assert_eq!(loaded.window_top, 60.0);
    }

    #[test]
    fn backup_base_honours_root_override() {
        let (dir, storage) = temp_storage();
        let item = ShelfItem::new("My Tool");

        let base = storage.backup_base_folder(&item).expect("default base");
        assert_eq!(base, dir.path().join("My Tool").join(BACKUPS_DIR));
        assert!(base.is_dir());

        let override_root = dir.path().join("elsewhere");
        let mut settings = storage.load_settings();
        settings.backups_root = override_root.to_string_lossy().to_string();
        storage.save_settings(&settings).expect("save settings");

        let base = storage.backup_base_folder(&item).expect("override base");
        assert_eq!(base, override_root.join("My Tool").join(BACKUPS_DIR));
    }
}
