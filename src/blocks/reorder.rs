//! Drag-to-reorder for ordered collections.
//!
//! A drag moves the dragged element immediately every time it passes over
//! another position, then keeps tracking it at its new place.

/// Remove the element at `from` and insert it at `to`.
///
/// Returns `false` (leaving `items` untouched) when either index is out of
/// range or they are equal.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Tracks the element being dragged by key `K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState<K> {
    dragged: Option<K>,
}

impl<K> Default for DragState<K> {
    fn default() -> Self {
        Self { dragged: None }
    }
}

impl<K: Clone + PartialEq> DragState<K> {
    pub fn start(&mut self, key: K) {
        self.dragged = Some(key);
    }

    pub fn dragged(&self) -> Option<&K> {
        self.dragged.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Point the drag at the element's new key after a move.
    pub fn retarget(&mut self, key: K) {
        if self.dragged.is_some() {
            self.dragged = Some(key);
        }
    }

    /// Always clears, whether or not anything moved.
    pub fn end(&mut self) -> Option<K> {
        self.dragged.take()
    }
}

/// Index-tracked drag over a plain list.
impl DragState<usize> {
    /// Move the dragged element over `target`; returns whether anything moved.
    pub fn over<T>(&mut self, items: &mut Vec<T>, target: usize) -> bool {
        let Some(from) = self.dragged else {
            return false;
        };
        if !move_item(items, from, target) {
            return false;
        }
        self.dragged = Some(target);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_item_forward_and_back() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        assert!(move_item(&mut items, 0, 2));
        assert_eq!(items, ['b', 'c', 'a', 'd']);
        assert!(move_item(&mut items, 2, 0));
        assert_eq!(items, ['a', 'b', 'c', 'd']);
    }

    #[test]
    fn test_move_item_rejects_bad_indices() {
        let mut items = vec![1, 2];
        assert!(!move_item(&mut items, 0, 0));
        assert!(!move_item(&mut items, 0, 2));
        assert!(!move_item(&mut items, 5, 0));
        assert_eq!(items, [1, 2]);
    }

    #[test]
    fn test_drag_follows_item() {
        let mut items = vec!["x", "y", "z"];
        let mut drag = DragState::default();
        drag.start(0);
        assert!(drag.over(&mut items, 1));
        assert_eq!(items, ["y", "x", "z"]);
        assert_eq!(drag.dragged(), Some(&1));
        assert!(drag.over(&mut items, 2));
        assert_eq!(items, ["y", "z", "x"]);
        assert!(!drag.over(&mut items, 2));
        assert_eq!(drag.end(), Some(2));
        assert!(!drag.is_dragging());
        assert!(!drag.over(&mut items, 0));
    }

    #[test]
    fn test_end_without_start_is_harmless() {
        let mut drag: DragState<String> = DragState::default();
        assert_eq!(drag.end(), None);
        drag.retarget("x".into());
        assert!(!drag.is_dragging());
    }
}
