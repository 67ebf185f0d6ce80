use crate::errors::{AppError, AppResult};
use crate::filter;
use crate::models::{FieldEdit, ShelfItem};
use crate::storage::Storage;
use std::collections::HashSet;

/// Notified after every effecting mutation and after filter changes, once the
/// visible projection has been recomputed.
pub trait StoreObserver {
    fn items_changed(&self, store: &ItemStore);
}

/// Canonical ordered item sequence. Every mutation persists through the
/// backing `Storage` and synchronously re-derives the filtered projection, so
/// a read immediately after a mutation always sees a consistent view.
///
/// A save failure is returned to the caller but leaves the already-mutated
/// in-memory sequence intact.
pub struct ItemStore {
    storage: Storage,
    items: Vec<ShelfItem>,
    filter_text: String,
    visible: Vec<ShelfItem>,
    selected_id: Option<String>,
    observers: Vec<Box<dyn StoreObserver>>,
}

impl ItemStore {
    /// Loads the persisted sequence; a failed load degrades to an empty store.
    pub fn new(storage: Storage) -> Self {
        let items = storage.load_items();
        let mut store = Self {
            storage,
            items,
            filter_text: String::new(),
            visible: Vec::new(),
            selected_id: None,
            observers: Vec::new(),
        };
        store.visible = filter::view(&store.items, &store.filter_text);
        store
    }

    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn items(&self) -> &[ShelfItem] {
        &self.items
    }

    pub fn visible(&self) -> &[ShelfItem] {
        &self.visible
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ShelfItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Appends a fresh default item, selects it, and returns its id.
    pub fn add(&mut self) -> AppResult<String> {
        self.add_item(ShelfItem::default())
    }

    pub fn add_item(&mut self, item: ShelfItem) -> AppResult<String> {
        if self.items.iter().any(|existing| existing.id == item.id) {
            return Err(AppError::Internal(format!("duplicate item id: {}", item.id)));
        }
        let id = item.id.clone();
        self.items.push(item);
        self.selected_id = Some(id.clone());
        let persisted = self.persist();
        self.refresh();
        persisted.map(|()| id)
    }

    /// Removes the item if present. An absent id is a valid silent outcome.
    pub fn remove(&mut self, id: &str) -> AppResult<bool> {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return Ok(false);
        };
        self.items.remove(index);
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        let persisted = self.persist();
        self.refresh();
        persisted.map(|()| true)
    }

    /// Applies a field edit; persists only when the value actually changed.
    pub fn set_field(&mut self, id: &str, edit: FieldEdit) -> AppResult<bool> {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return Ok(false);
        };
        if !edit.apply(item) {
            return Ok(false);
        }
        let persisted = self.persist();
        self.refresh();
        persisted.map(|()| true)
    }

    /// Transient selection; never persisted. Selecting an unknown id clears
    /// the selection.
    pub fn set_selected(&mut self, id: Option<&str>) {
        self.selected_id = match id {
            Some(id) if self.items.iter().any(|item| item.id == id) => Some(id.to_string()),
            _ => None,
        };
    }

    pub fn selected(&self) -> Option<&ShelfItem> {
        let id = self.selected_id.as_deref()?;
        self.get(id)
    }

    /// Adopts a whole new sequence in one step (reorder commit). Returns
    /// `Ok(false)` without persisting when the sequence is unchanged.
    pub fn replace_all(&mut self, items: Vec<ShelfItem>) -> AppResult<bool> {
        let mut seen: HashSet<&str> = HashSet::new();
        if let Some(duplicate) = items.iter().find(|item| !seen.insert(item.id.as_str())) {
            return Err(AppError::Internal(format!(
                "duplicate item id: {}",
                duplicate.id
            )));
        }
        if self.items == items {
            return Ok(false);
        }
        self.items = items;
        if let Some(selected) = self.selected_id.as_deref() {
            if !self.items.iter().any(|item| item.id == selected) {
                self.selected_id = None;
            }
        }
        let persisted = self.persist();
        self.refresh();
        persisted.map(|()| true)
    }

    /// Discards the in-memory sequence and re-reads from storage (the
    /// cancel-edit path). Selection falls back to the first item.
    pub fn reload(&mut self) {
        self.items = self.storage.load_items();
        self.selected_id = self.items.first().map(|item| item.id.clone());
        self.refresh();
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.filter_text == text {
            return;
        }
        self.filter_text = text;
        self.refresh();
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    fn persist(&self) -> AppResult<()> {
        self.storage.save_items(&self.items).map_err(|error| {
            tracing::warn!(error = %error, "item save failed; in-memory sequence retained");
            error
        })
    }

    fn refresh(&mut self) {
        self.visible = filter::view(&self.items, &self.filter_text);
        for observer in &self.observers {
            observer.items_changed(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemStatus;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingObserver {
        calls: Rc<Cell<usize>>,
    }

    impl StoreObserver for CountingObserver {
        fn items_changed(&self, _store: &ItemStore) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    fn temp_store() -> (tempfile::TempDir, ItemStore) {
        let dir = tempfile::tempdir().expect("temp store root");
        let storage = Storage::new(dir.path()).expect("storage");
        (dir, ItemStore::new(storage))
    }

    #[test]
    fn add_persists_and_selects() {
        let (_dir, mut store) = temp_store();
        let id = store.add().expect("add");
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected().map(|item| item.id.as_str()), Some(id.as_str()));

        let reopened = ItemStore::new(store.storage().clone());
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.items()[0].id, id);
        assert!(reopened.selected().is_none());
    }

    #[test]
    fn remove_twice_is_safe() {
        let (_dir, mut store) = temp_store();
        let id = store.add().expect("add");
        assert!(store.remove(&id).expect("first remove"));
        assert!(!store.remove(&id).expect("second remove is a no-op"));
        assert!(store.is_empty());
    }

    #[test]
    fn set_field_skips_persist_for_unchanged_values() {
        let (_dir, mut store) = temp_store();
        let id = store.add().expect("add");

        assert!(store
            .set_field(&id, FieldEdit::Title("Editor".to_string()))
            .expect("edit"));
        assert!(!store
            .set_field(&id, FieldEdit::Title("Editor".to_string()))
            .expect("repeat edit"));
        assert!(!store
            .set_field("missing", FieldEdit::Status(ItemStatus::Deployed))
            .expect("absent id"));

        let reopened = ItemStore::new(store.storage().clone());
        assert_eq!(reopened.items()[0].title, "Editor");
    }

    #[test]
    fn selection_is_transient() {
        let (_dir, mut store) = temp_store();
        let id = store.add().expect("add");
        store.set_selected(Some(&id));
        assert!(store.selected().is_some());
        store.set_selected(Some("not-a-real-id"));
        assert!(store.selected().is_none());
    }

    #[test]
    fn replace_all_rejects_duplicates_and_detects_no_change() {
        let (_dir, mut store) = temp_store();
        store.add().expect("add");
        let current = store.items().to_vec();

        assert!(!store.replace_all(current.clone()).expect("identical sequence"));

        let duplicated = vec![current[0].clone(), current[0].clone()];
        let error = store.replace_all(duplicated).expect_err("duplicate ids");
        assert!(error.to_string().contains("INTERNAL"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn reload_discards_memory_in_favour_of_disk() {
        let (_dir, mut store) = temp_store();
        let id = store.add().expect("add");
        store
            .set_field(&id, FieldEdit::Title("Persisted".to_string()))
            .expect("edit");

        // A second adapter writes a diverging list behind the store's back.
        let other = ShelfItem::new("From disk");
        store
            .storage()
            .clone()
            .save_items(&[other.clone()])
            .expect("external write");

        store.reload();
        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].id, other.id);
        assert_eq!(store.selected().map(|item| item.id.as_str()), Some(other.id.as_str()));
    }

    #[test]
    fn mutations_refresh_view_and_notify_once() {
        let (_dir, mut store) = temp_store();
        let calls = Rc::new(Cell::new(0));
        store.subscribe(Box::new(CountingObserver { calls: Rc::clone(&calls) }));

        let id = store.add().expect("add");
        assert_eq!(calls.get(), 1);
        assert_eq!(store.visible().len(), 1);

        store.set_filter("zzz");
        assert_eq!(calls.get(), 2);
        assert!(store.visible().is_empty());

        store
            .set_field(&id, FieldEdit::Notes("zzz marker".to_string()))
            .expect("edit");
        assert_eq!(calls.get(), 3);
        assert_eq!(store.visible().len(), 1);
    }
}
