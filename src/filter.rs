use crate::models::ShelfItem;

/// Case-insensitive substring match over the user-searchable fields. An empty
/// needle matches everything.
pub fn matches(item: &ShelfItem, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_ascii_lowercase();
    [
        item.title.as_str(),
        item.description.as_str(),
        item.notes.as_str(),
        item.executable_path.as_str(),
    ]
    .iter()
    .any(|field| field.to_ascii_lowercase().contains(&needle))
}

/// Order-preserving projection of `items` onto the entries matching `needle`.
/// Pure and stable; never mutates or persists.
pub fn view(items: &[ShelfItem], needle: &str) -> Vec<ShelfItem> {
    items
        .iter()
        .filter(|item| matches(item, needle))
        .cloned()
        .collect()
}
