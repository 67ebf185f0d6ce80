//! Index-permutation operations over the full (unfiltered) sequence. Each
//! effecting operation commits through a single `replace_all`, so a reorder is
//! one persist regardless of intermediate steps. `Ok(false)` means no-op:
//! absent id, boundary hit, or an already-current position.

use crate::errors::AppResult;
use crate::store::ItemStore;

pub fn move_up(store: &mut ItemStore, id: &str) -> AppResult<bool> {
    shift(store, id, -1)
}

pub fn move_down(store: &mut ItemStore, id: &str) -> AppResult<bool> {
    shift(store, id, 1)
}

pub fn move_to_top(store: &mut ItemStore, id: &str) -> AppResult<bool> {
    move_to_position(store, id, 1)
}

pub fn move_to_bottom(store: &mut ItemStore, id: &str) -> AppResult<bool> {
    let last = store.len();
    move_to_position(store, id, last)
}

/// Relocates `id` to a one-based position, clamped into `[1, len]`.
pub fn move_to_position(store: &mut ItemStore, id: &str, position: usize) -> AppResult<bool> {
    let items = store.items();
    if items.is_empty() {
        return Ok(false);
    }
    let Some(index) = items.iter().position(|item| item.id == id) else {
        return Ok(false);
    };
    let target = position.clamp(1, items.len()) - 1;
    if target == index {
        return Ok(false);
    }

    let mut next = items.to_vec();
    let item = next.remove(index);
    next.insert(target, item);
    store.replace_all(next)
}

/// Drag-drop reorder: removes the dragged item, then reinserts it at the
/// target's index measured after the removal. The exact placement (including
/// the index shift a forward drag causes) is load-bearing for callers, so the
/// target index must not be captured before the removal.
pub fn move_before_or_after(
    store: &mut ItemStore,
    dragged_id: &str,
    target_id: &str,
) -> AppResult<bool> {
    if dragged_id == target_id {
        return Ok(false);
    }
    let items = store.items();
    let Some(from) = items.iter().position(|item| item.id == dragged_id) else {
        return Ok(false);
    };
    if !items.iter().any(|item| item.id == target_id) {
        return Ok(false);
    }

    let mut next = items.to_vec();
    let dragged = next.remove(from);
    let Some(to) = next.iter().position(|item| item.id == target_id) else {
        return Ok(false);
    };
    next.insert(to, dragged);
    store.replace_all(next)
}

fn shift(store: &mut ItemStore, id: &str, delta: isize) -> AppResult<bool> {
    let items = store.items();
    let Some(index) = items.iter().position(|item| item.id == id) else {
        return Ok(false);
    };
    let target = index as isize + delta;
    if target < 0 || target >= items.len() as isize {
        return Ok(false);
    }

    let mut next = items.to_vec();
    let item = next.remove(index);
    next.insert(target as usize, item);
    store.replace_all(next)
}
