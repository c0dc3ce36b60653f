//! Adjacency bookkeeping: node id -> neighbour id -> edge multiplicity.

use crate::types::ElementId;
use indexmap::IndexMap;

/// Outbound slots of one node.
pub type Neighbors = IndexMap<ElementId, usize>;

/// Every stored node has an entry (possibly empty). A slot holds the number of
/// edges recorded from the owning node to the neighbour and is dropped when it
/// reaches zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdjacencyIndex {
    slots: IndexMap<ElementId, Neighbors>,
}

impl AdjacencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_node(&self, id: &ElementId) -> bool {
        self.slots.contains_key(id)
    }

    pub fn contains(&self, source: &ElementId, target: &ElementId) -> bool {
        self.count(source, target) > 0
    }

    pub fn count(&self, source: &ElementId, target: &ElementId) -> usize {
        self.slots
            .get(source)
            .and_then(|n| n.get(target))
            .copied()
            .unwrap_or(0)
    }

    pub fn neighbors(&self, id: &ElementId) -> Option<&Neighbors> {
        self.slots.get(id)
    }

    /// Ids holding a slot that points at `id`.
    pub fn inbound(&self, id: &ElementId) -> Vec<ElementId> {
        self.slots
            .iter()
            .filter(|(_, n)| n.contains_key(id))
            .map(|(source, _)| source.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ElementId, &Neighbors)> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total number of non-empty slots.
    pub fn slot_count(&self) -> usize {
        self.slots.values().map(|n| n.len()).sum()
    }

    /// Creates an empty entry for `id`. Returns false when one already exists.
    pub(crate) fn register(&mut self, id: ElementId) -> bool {
        if self.slots.contains_key(&id) {
            return false;
        }
        self.slots.insert(id, Neighbors::new());
        true
    }

    pub(crate) fn unregister(&mut self, id: &ElementId) -> Option<Neighbors> {
        self.slots.shift_remove(id)
    }

    /// Counts one more edge when `multiple`, otherwise marks the slot as present.
    pub(crate) fn record(&mut self, source: &ElementId, target: &ElementId, multiple: bool) {
        let slot = self
            .slots
            .entry(source.clone())
            .or_default()
            .entry(target.clone())
            .or_insert(0);
        if multiple {
            *slot += 1;
        } else {
            *slot = 1;
        }
    }

    /// Returns false when there was no slot to decrement.
    pub(crate) fn release(&mut self, source: &ElementId, target: &ElementId) -> bool {
        let Some(neighbors) = self.slots.get_mut(source) else {
            return false;
        };
        match neighbors.get_mut(target) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                neighbors.shift_remove(target);
                true
            }
            None => false,
        }
    }

    pub(crate) fn drop_slot(&mut self, source: &ElementId, target: &ElementId) {
        if let Some(neighbors) = self.slots.get_mut(source) {
            neighbors.shift_remove(target);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}
