//! Letter shortcuts for menu entries.
//!
//! Each entry of the menu on screen gets a letter, `a` for the first,
//! `b` for the second, and so on. Pressing the letter acts like moving
//! the highlight there and pressing Enter. `x` always means exit/back.

use std::collections::BTreeMap;

use crate::error::MenuError;

/// The shortcut that leaves the current menu.
pub const EXIT_ZONE: char = 'x';

/// What a shortcut selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneTarget {
    /// Position in the option list.
    Item(usize),
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickZone {
    pub id: char,
    pub label: String,
    pub target: ZoneTarget,
    pub active: bool,
}

/// Shortcuts for one menu invocation.
#[derive(Debug, Default)]
pub struct ClickZoneRegistry {
    zones: BTreeMap<char, ClickZone>,
}

impl ClickZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `a`, `b`, `c`... to `items` in order, plus [`EXIT_ZONE`].
    ///
    /// Previous bindings are dropped first. Letters are handed out only
    /// while they sort before the exit letter, so items from the 24th on
    /// have no shortcut.
    pub fn assign(&mut self, items: &[String], exit_label: &str) -> Result<(), MenuError> {
        self.clear();
        if items.is_empty() {
            return Err(MenuError::EmptyMenu);
        }

        for (index, (item, id)) in items.iter().zip('a'..EXIT_ZONE).enumerate() {
            self.register(id, item, ZoneTarget::Item(index))?;
        }
        self.register(EXIT_ZONE, exit_label, ZoneTarget::Exit)
    }

    /// Adds one shortcut. Ids must be ASCII letters and unique.
    pub fn register(&mut self, id: char, label: &str, target: ZoneTarget) -> Result<(), MenuError> {
        let id = id.to_ascii_lowercase();
        let reserved = id == EXIT_ZONE && target != ZoneTarget::Exit;
        if !id.is_ascii_alphabetic() || reserved || self.zones.contains_key(&id) {
            return Err(MenuError::ZoneCollision(id));
        }
        self.zones.insert(
            id,
            ClickZone {
                id,
                label: label.to_string(),
                target,
                active: true,
            },
        );
        Ok(())
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }

    /// Finds the active zone for a key, ignoring case.
    pub fn lookup(&self, id: char) -> Option<&ClickZone> {
        self.zones
            .get(&id.to_ascii_lowercase())
            .filter(|zone| zone.active)
    }

    /// The shortcut bound to an item position, if any.
    pub fn shortcut_for(&self, index: usize) -> Option<char> {
        self.zones
            .values()
            .find(|zone| zone.active && zone.target == ZoneTarget::Item(index))
            .map(|zone| zone.id)
    }

    /// Enables or disables a zone. Returns false for an unknown id.
    #[cfg(test)]
    pub fn set_active(&mut self, id: char, active: bool) -> bool {
        match self.zones.get_mut(&id.to_ascii_lowercase()) {
            Some(zone) => {
                zone.active = active;
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &ClickZone> {
        self.zones.values()
    }
}
