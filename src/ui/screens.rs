use std::collections::BTreeSet;

use crate::query::LocationFilter;

/// Clamp `selected + offset` into `0..len`.
fn offset_index(selected: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let moved = selected as isize + offset;
    moved.clamp(0, len as isize - 1) as usize
}

/// Multi-select overlay for the industry filter. Changes are staged here and
/// only applied when the user confirms.
pub(crate) struct IndustryPicker {
    pub(crate) options: Vec<String>,
    pub(crate) checked: BTreeSet<String>,
    pub(crate) selected: usize,
}

impl IndustryPicker {
    pub(crate) fn new(options: Vec<String>, checked: BTreeSet<String>) -> Self {
        Self {
            options,
            checked,
            selected: 0,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = offset_index(self.selected, offset, self.options.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.options.len().saturating_sub(1);
    }

    pub(crate) fn is_checked(&self, index: usize) -> bool {
        self.options
            .get(index)
            .is_some_and(|industry| self.checked.contains(industry))
    }

    pub(crate) fn toggle_current(&mut self) {
        if let Some(industry) = self.options.get(self.selected) {
            if !self.checked.remove(industry) {
                self.checked.insert(industry.clone());
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.checked.clear();
    }
}

/// Single-select overlay for the location filter, with "All Locations" on top.
pub(crate) struct LocationPicker {
    pub(crate) options: Vec<LocationFilter>,
    pub(crate) selected: usize,
}

impl LocationPicker {
    pub(crate) fn new(locations: Vec<String>, current: &LocationFilter) -> Self {
        let options: Vec<LocationFilter> = std::iter::once(LocationFilter::All)
            .chain(locations.into_iter().map(LocationFilter::Exact))
            .collect();
        let selected = options.iter().position(|o| o == current).unwrap_or(0);
        Self { options, selected }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = offset_index(self.selected, offset, self.options.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.options.len().saturating_sub(1);
    }

    pub(crate) fn current(&self) -> LocationFilter {
        self.options
            .get(self.selected)
            .cloned()
            .unwrap_or_default()
    }
}

/// Move a card-grid cursor by whole rows or single cells, staying inside
/// `len` items laid out `columns` wide.
pub(crate) fn grid_move(selected: usize, len: usize, columns: usize, dx: isize, dy: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let columns = columns.max(1) as isize;
    let target = selected as isize + dx + dy * columns;
    if target < 0 || target >= len as isize {
        selected.min(len - 1)
    } else {
        target as usize
    }
}
