//! The slot table of a structure array.

use std::sync::RwLock;

use itertools::Itertools;
use log::trace;

use crate::record::Record;

/// State of one element of a structure array.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Loaded(Record),
    /// Not read yet; holds the element index.
    Unloaded(usize),
}

impl Slot {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Slot::Loaded(_))
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            Slot::Loaded(record) => Some(record),
            Slot::Unloaded(_) => None,
        }
    }
}

/// Fixed-size table of element slots.
///
/// [`SlotTable::fill`] is the only place a slot changes state, and it only
/// ever moves a slot from `Unloaded` to `Loaded`.
pub(crate) struct SlotTable {
    len: usize,
    slots: RwLock<Vec<Slot>>,
}

impl SlotTable {
    pub fn loaded(records: Vec<Record>) -> SlotTable {
        SlotTable {
            len: records.len(),
            slots: RwLock::new(records.into_iter().map(Slot::Loaded).collect()),
        }
    }

    pub fn unloaded(len: usize) -> SlotTable {
        SlotTable {
            len,
            slots: RwLock::new((0..len).map(Slot::Unloaded).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn get(&self, index: usize) -> Option<Record> {
        self.slots.read().expect("read lock")[index]
            .record()
            .cloned()
    }

    /// Returns the unloaded positions among `indices`, deduplicated, in the
    /// order of their first occurrence.
    pub fn missing(&self, indices: &[usize]) -> Vec<usize> {
        let slots = self.slots.read().expect("read lock");
        indices
            .iter()
            .copied()
            .filter(|&i| !slots[i].is_loaded())
            .unique()
            .collect()
    }

    /// Moves the slots at `indices` to `Loaded` with the matching `records`.
    ///
    /// A slot that is already loaded keeps its record.
    pub fn fill(&self, indices: &[usize], records: &[Record]) {
        let mut slots = self.slots.write().expect("write lock");
        for (&index, record) in indices.iter().zip(records) {
            let slot = &mut slots[index];
            if !slot.is_loaded() {
                trace!("slot {index} loaded from {}", record.path());
                *slot = Slot::Loaded(record.clone());
            }
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.slots
            .read()
            .expect("read lock")
            .iter()
            .filter(|slot| slot.is_loaded())
            .count()
    }

    pub fn snapshot(&self) -> Vec<Slot> {
        self.slots.read().expect("read lock").clone()
    }
}
