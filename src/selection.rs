//! Highlighted entry of a menu.

use crate::error::MenuError;

/// The highlight over a menu's entries.
///
/// The last entry is always the exit/back entry, whose choice id is 0.
/// Everything else is numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionModel {
    items: Vec<String>,
    selected: usize,
}

impl SelectionModel {
    pub fn new(items: Vec<String>) -> Result<Self, MenuError> {
        if items.is_empty() {
            return Err(MenuError::EmptyMenu);
        }
        Ok(SelectionModel { items, selected: 0 })
    }

    fn last_index(&self) -> usize {
        self.items.len() - 1
    }

    /// Moves the highlight up, wrapping from the first entry to the last.
    pub fn move_up(&mut self) {
        self.selected = if self.selected == 0 {
            self.last_index()
        } else {
            self.selected - 1
        };
    }

    /// Moves the highlight down, wrapping from the last entry to the first.
    pub fn move_down(&mut self) {
        self.selected = if self.selected == self.last_index() {
            0
        } else {
            self.selected + 1
        };
    }

    /// Puts the highlight on `index`; out of range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn current_label(&self) -> &str {
        &self.items[self.selected]
    }

    pub fn current_choice_id(&self) -> usize {
        if self.selected == self.last_index() {
            0
        } else {
            self.selected + 1
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}
