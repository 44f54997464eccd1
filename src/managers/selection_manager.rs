//! Selection and navigation state of the dashboard.
//!
//! Tracks the current group, the keyboard highlight and the hovered row,
//! the bookmark being renamed, and the multi-select set. Indexes refer to
//! the currently filtered list and are clamped whenever it changes shape.

use std::collections::HashSet;

use crate::types::bookmark::Bookmark;

/// Index of the row actions apply to: hover wins over the keyboard highlight.
/// Out-of-range indexes yield `None`.
pub fn resolve_active(hovered: Option<usize>, highlighted: Option<usize>, len: usize) -> Option<usize> {
    let index = hovered.or(highlighted)?;
    (index < len).then_some(index)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionManager {
    selected_group: Option<String>,
    highlighted: Option<usize>,
    hovered: Option<usize>,
    renaming: Option<String>,
    /// `Some` exactly while selection mode is active.
    selection: Option<HashSet<String>>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_group(&self) -> Option<&str> {
        self.selected_group.as_deref()
    }

    /// Switches group: resets the highlight and leaves selection mode.
    pub fn select_group(&mut self, group_id: impl Into<String>) {
        self.selected_group = Some(group_id.into());
        self.highlighted = None;
        self.exit_selection();
    }

    /// Puts back a previously selected group without touching other state.
    pub fn restore_group(&mut self, group_id: Option<String>) {
        self.selected_group = group_id;
    }

    /// Falls back to `first` when no group is selected or the selected one is gone.
    pub fn ensure_group<'a>(&mut self, mut known: impl Iterator<Item = &'a str>, first: Option<&str>) {
        let current_known = self
            .selected_group
            .as_deref()
            .is_some_and(|current| known.any(|id| id == current));
        if !current_known {
            self.selected_group = first.map(str::to_string);
            self.highlighted = None;
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn set_highlight(&mut self, index: Option<usize>, len: usize) {
        self.highlighted = index.filter(|i| *i < len);
    }

    /// Called on search text changes and after adding a bookmark.
    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    pub fn highlight_next(&mut self, len: usize) {
        self.highlighted = match (len, self.highlighted) {
            (0, _) => None,
            (_, None) => Some(0),
            (_, Some(i)) => Some((i + 1).min(len - 1)),
        };
    }

    /// Moving up from the first row clears the highlight.
    pub fn highlight_previous(&mut self, len: usize) {
        self.highlighted = match self.highlighted {
            Some(i) if i > 0 && len > 0 => Some((i - 1).min(len - 1)),
            _ => None,
        };
    }

    pub fn set_hover(&mut self, index: Option<usize>) {
        self.hovered = index;
    }

    pub fn active_index(&self, len: usize) -> Option<usize> {
        resolve_active(self.hovered, self.highlighted, len)
    }

    /// Pulls indexes back inside a list of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        let bound = |index: Option<usize>| match index {
            Some(_) if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => None,
        };
        self.highlighted = bound(self.highlighted);
        self.hovered = self.hovered.filter(|i| *i < len);
    }

    pub fn renaming(&self) -> Option<&str> {
        self.renaming.as_deref()
    }

    pub fn start_rename(&mut self, id: impl Into<String>) {
        self.renaming = Some(id.into());
    }

    /// Ends inline editing and returns the id that was being renamed.
    pub fn finish_rename(&mut self) -> Option<String> {
        self.renaming.take()
    }

    pub fn in_selection_mode(&self) -> bool {
        self.selection.is_some()
    }

    /// Enters selection mode, optionally seeding it with one id.
    pub fn enter_selection(&mut self, seed: Option<String>) {
        let set = self.selection.get_or_insert_with(HashSet::new);
        if let Some(id) = seed {
            set.clear();
            set.insert(id);
        }
    }

    /// Leaves selection mode; the flag and the set go together.
    pub fn exit_selection(&mut self) {
        self.selection = None;
    }

    /// Flips membership of `id`. Ignored outside selection mode.
    pub fn toggle(&mut self, id: &str) {
        if let Some(set) = self.selection.as_mut() {
            if !set.remove(id) {
                set.insert(id.to_string());
            }
        }
    }

    /// Replaces the selection with every id of the filtered list.
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        if let Some(set) = self.selection.as_mut() {
            *set = ids.into_iter().map(str::to_string).collect();
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.as_ref().is_some_and(|set| set.contains(id))
    }

    pub fn selected_count(&self) -> usize {
        self.selection.as_ref().map_or(0, HashSet::len)
    }

    /// Selected ids in the order they appear in `list`.
    pub fn selected_in(&self, list: &[Bookmark]) -> Vec<String> {
        match &self.selection {
            Some(set) => list
                .iter()
                .filter(|b| set.contains(&b.id))
                .map(|b| b.id.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Raw selected ids, including ones no longer in any list.
    pub fn selected_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .selection
            .as_ref()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }
}
