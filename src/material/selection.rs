//! Per-slot shell checkboxes.

use bevy::prelude::*;

use super::slots::MaterialSlots;

/// One checkbox in the selection list.
#[derive(Clone, Debug)]
pub struct SelectionEntry {
    /// Slot index on the mesh.
    pub slot: usize,
    pub name: String,
    /// `None` for empty slots, which can never be selected.
    pub material: Option<Handle<StandardMaterial>>,
    pub enabled: bool,
}

/// Which material slots receive shells.
///
/// Mirrors the slot order of [`MaterialSlots`] as of the last
/// [`sync_selection`]; it is never refreshed implicitly.
#[derive(Component, Clone, Debug, Default)]
pub struct MaterialSelection {
    entries: Vec<SelectionEntry>,
}

/// Rebuilds the selection from the mesh slots with every entry enabled.
pub fn sync_selection(slots: &MaterialSlots) -> MaterialSelection {
    let entries = slots
        .slots
        .iter()
        .enumerate()
        .map(|(slot, entry)| SelectionEntry {
            slot,
            name: entry.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            material: entry.as_ref().map(|s| s.material.clone()),
            enabled: true,
        })
        .collect();

    MaterialSelection { entries }
}

impl MaterialSelection {
    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sets the checkbox of `slot`. Returns `false` if the slot is unknown.
    pub fn set_enabled(&mut self, slot: usize, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.slot == slot) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Enables exactly the given slots.
    pub fn enable_only(&mut self, slots: &[usize]) {
        for entry in &mut self.entries {
            entry.enabled = slots.contains(&entry.slot);
        }
    }

    /// Enabled entries that hold a material, in slot order.
    pub fn checked(&self) -> impl Iterator<Item = (usize, &str, &Handle<StandardMaterial>)> + '_ {
        self.entries.iter().filter(|e| e.enabled).filter_map(|e| {
            e.material
                .as_ref()
                .map(|material| (e.slot, e.name.as_str(), material))
        })
    }

    pub fn checked_count(&self) -> usize {
        self.checked().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots() -> MaterialSlots {
        MaterialSlots::new()
            .with_slot("Body", Handle::default())
            .with_empty_slot()
            .with_slot("Hair", Handle::default())
    }

    #[test]
    fn test_sync_mirrors_slots() {
        let selection = sync_selection(&slots());
        assert_eq!(selection.len(), 3);
        assert!(selection.entries().iter().all(|e| e.enabled));
        assert_eq!(selection.entries()[2].name, "Hair");
        assert!(selection.entries()[1].material.is_none());
    }

    #[test]
    fn test_empty_slots_are_never_checked() {
        let selection = sync_selection(&slots());
        let checked: Vec<usize> = selection.checked().map(|(slot, _, _)| slot).collect();
        assert_eq!(checked, vec![0, 2]);
    }

    #[test]
    fn test_toggle() {
        let mut selection = sync_selection(&slots());
        assert!(selection.set_enabled(0, false));
        assert!(!selection.set_enabled(9, false));
        assert_eq!(selection.checked_count(), 1);

        selection.enable_only(&[]);
        assert_eq!(selection.checked_count(), 0);
    }

    #[test]
    fn test_selection_is_not_refreshed_implicitly() {
        let mut mesh_slots = slots();
        let selection = sync_selection(&mesh_slots);
        mesh_slots.push(crate::material::MaterialSlot::new("Extra", Handle::default()));

        assert_eq!(selection.len(), 3);
        assert_eq!(sync_selection(&mesh_slots).len(), 4);
    }
}
