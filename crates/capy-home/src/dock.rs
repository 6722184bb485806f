//! Fixed-size dock slots with change detection.

use crate::types::ApplicationEntry;

/// Number of dock slots.
pub const DOCK_CAPACITY: usize = 6;

/// A slot whose visible content changed.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotChange {
    pub slot: usize,
    /// New occupant, `None` for an emptied slot.
    pub entry: Option<ApplicationEntry>,
}

/// The dock as currently shown. Slot positions are stable across refreshes.
#[derive(Clone, Debug, Default)]
pub struct DockSlots {
    slots: [Option<ApplicationEntry>; DOCK_CAPACITY],
}

impl DockSlots {
    pub fn slots(&self) -> &[Option<ApplicationEntry>] {
        &self.slots
    }

    pub fn get(&self, slot: usize) -> Option<&ApplicationEntry> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Show `ranked` in slot order and report the slots that visibly changed.
    ///
    /// A slot counts as changed only when its (package, component, label)
    /// differs. Entries beyond the capacity are ignored, missing ones leave
    /// their slot empty.
    pub fn apply(&mut self, ranked: &[ApplicationEntry]) -> Vec<SlotChange> {
        let mut changes = Vec::new();

        for (slot, current) in self.slots.iter_mut().enumerate() {
            let next = ranked.get(slot);

            let unchanged = match (current.as_ref(), next) {
                (None, None) => true,
                (Some(shown), Some(next)) => shown.same_presentation(next),
                _ => false,
            };

            // Keep flags and icon fresh even when nothing visible changed
            *current = next.cloned();

            if !unchanged {
                changes.push(SlotChange {
                    slot,
                    entry: current.clone(),
                });
            }
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppId, IconHandle};

    fn entry(package: &str, label: &str) -> ApplicationEntry {
        ApplicationEntry {
            id: AppId::new(package, "Main"),
            label: label.to_string(),
            icon: IconHandle::Default,
            disabled: false,
            sticky: false,
        }
    }

    fn changed_slots(changes: &[SlotChange]) -> Vec<usize> {
        changes.iter().map(|c| c.slot).collect()
    }

    #[test]
    fn test_first_fill_reports_occupied_slots() {
        let mut dock = DockSlots::default();
        let changes = dock.apply(&[entry("a", "A"), entry("b", "B")]);
        assert_eq!(changed_slots(&changes), vec![0, 1]);
        assert_eq!(dock.get(1).unwrap().label, "B");
        assert!(dock.get(2).is_none());
    }

    #[test]
    fn test_identical_ranking_is_silent() {
        let mut dock = DockSlots::default();
        let ranked = vec![entry("a", "A"), entry("b", "B")];
        dock.apply(&ranked);

        let mut refreshed = ranked.clone();
        refreshed[0].sticky = true;
        refreshed[0].icon = IconHandle::Path("/tmp/a.png".into());
        assert!(dock.apply(&refreshed).is_empty());
        assert!(dock.get(0).unwrap().sticky);
    }

    #[test]
    fn test_label_change_is_reported() {
        let mut dock = DockSlots::default();
        dock.apply(&[entry("a", "A")]);
        let changes = dock.apply(&[entry("a", "A renamed")]);
        assert_eq!(changed_slots(&changes), vec![0]);
    }

    #[test]
    fn test_swaps_and_empties() {
        let mut dock = DockSlots::default();
        dock.apply(&[entry("a", "A"), entry("b", "B"), entry("c", "C")]);

        let changes = dock.apply(&[entry("b", "B"), entry("a", "A")]);
        assert_eq!(changed_slots(&changes), vec![0, 1, 2]);
        assert_eq!(changes[2].entry, None);
    }

    #[test]
    fn test_overflow_is_ignored() {
        let mut dock = DockSlots::default();
        let ranked: Vec<_> = (0..10).map(|i| entry(&i.to_string(), "X")).collect();
        let changes = dock.apply(&ranked);
        assert_eq!(changes.len(), DOCK_CAPACITY);
        assert_eq!(dock.slots().iter().flatten().count(), DOCK_CAPACITY);
    }
}
