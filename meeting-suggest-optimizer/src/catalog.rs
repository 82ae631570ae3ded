use alloc::collections::btree_map::Entry;
use alloc::collections::BTreeMap;
use core::fmt::{self, Display};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::policy::SlotPriority;

/// Position of a slot in its [`SlotCatalog`]. Only meaningful for the catalog that handed it out.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotIndex(pub u32);

impl SlotIndex {
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub index: SlotIndex,
    pub time: Timestamp,
    pub owner_priority: SlotPriority,
}

/// The owner's proposed slots, in the order they were proposed.
#[derive(Debug, Clone, Default)]
pub struct SlotCatalog {
    slots: Vec<Slot>,
    by_time: BTreeMap<Timestamp, SlotIndex>,
}

impl SlotCatalog {
    pub fn new<I>(rows: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = (Timestamp, SlotPriority)>,
    {
        let mut catalog = Self::default();
        for (position, (time, owner_priority)) in rows.into_iter().enumerate() {
            let index =
                SlotIndex(u32::try_from(position).map_err(|_| InputError::TooManySlots(position))?);
            match catalog.by_time.entry(time) {
                Entry::Occupied(_) => return Err(InputError::DuplicateSlot { time }),
                Entry::Vacant(entry) => {
                    entry.insert(index);
                }
            }
            catalog.slots.push(Slot {
                index,
                time,
                owner_priority,
            });
        }
        Ok(catalog)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: SlotIndex) -> Option<&Slot> {
        self.slots.get(index.as_usize())
    }

    #[must_use]
    pub fn index_of(&self, time: Timestamp) -> Option<SlotIndex> {
        self.by_time.get(&time).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::at;

    #[test]
    fn keeps_input_order() {
        let catalog = SlotCatalog::new([
            (at(15), SlotPriority::Available),
            (at(9), SlotPriority::Prioritized),
            (at(12), SlotPriority::Available),
        ])
        .unwrap();

        let times: Vec<Timestamp> = catalog.iter().map(|slot| slot.time).collect();
        assert_eq!(times, vec![at(15), at(9), at(12)]);
        assert_eq!(catalog.index_of(at(9)), Some(SlotIndex(1)));
        assert_eq!(
            catalog.get(SlotIndex(1)).map(|slot| slot.owner_priority),
            Some(SlotPriority::Prioritized)
        );
        assert_eq!(catalog.index_of(at(10)), None);
        assert_eq!(catalog.get(SlotIndex(3)), None);
    }

    #[test]
    fn rejects_duplicate_times() {
        let error = SlotCatalog::new([
            (at(9), SlotPriority::Available),
            (at(10), SlotPriority::Available),
            (at(9), SlotPriority::Prioritized),
        ])
        .unwrap_err();

        assert_eq!(error, InputError::DuplicateSlot { time: at(9) });
    }

    #[test]
    fn empty_catalog_is_fine() {
        let catalog = SlotCatalog::new([]).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }
}
