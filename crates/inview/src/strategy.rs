//! Notification strategies
//!
//! Each returns whether the handler was notified, which is what drives
//! one-shot teardown.

use crate::handler::ReactiveCell;

/// Bring a reactive cell in line with the element's visibility
///
/// Writes only when the cell disagrees.
pub fn sync_cell(cell: &dyn ReactiveCell, in_view: bool) -> bool {
    if cell.get() == in_view {
        return false;
    }
    cell.set(in_view);
    true
}

/// Next recorded state for a callback binding, or None if nothing changed
///
/// An element never evaluated before counts as out of view, so the first
/// in-view observation fires and a first out-of-view one does not.
pub fn transition(previous: Option<bool>, in_view: bool) -> Option<bool> {
    let was_in_view = previous.unwrap_or(false);
    (was_in_view != in_view).then_some(in_view)
}
