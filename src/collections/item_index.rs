//! Reverse index from item keys to the keys of their groups.
//!
//! The index is ordered and deduplicated by the same [`Comparer`] the groups
//! use for their items, so "same item key" means the same thing for the
//! grouped list as for every one of its groups.

use crate::comparer::Comparer;

/// Sorted `(item key, group key)` pairs, searched with the item comparer.
pub(crate) struct ItemIndex<IK, GK> {
    entries: Vec<(IK, GK)>,
    comparer: Comparer<IK>,
}

impl<IK, GK> ItemIndex<IK, GK> {
    pub(crate) const fn new(comparer: Comparer<IK>) -> Self {
        Self {
            entries: Vec::new(),
            comparer,
        }
    }

    fn search(&self, item_key: &IK) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(candidate, _)| self.comparer.compare(candidate, item_key))
    }

    pub(crate) fn contains_key(&self, item_key: &IK) -> bool {
        self.search(item_key).is_ok()
    }

    pub(crate) fn get(&self, item_key: &IK) -> Option<&GK> {
        self.search(item_key)
            .ok()
            .map(|index| &self.entries[index].1)
    }

    /// Records `item_key`. Returns `false`, leaving the index unchanged, if
    /// an equal key is already present.
    pub(crate) fn insert(&mut self, item_key: IK, group_key: GK) -> bool {
        match self.search(&item_key) {
            Ok(_) => false,
            Err(index) => {
                self.entries.insert(index, (item_key, group_key));
                true
            }
        }
    }

    pub(crate) fn remove(&mut self, item_key: &IK) -> Option<GK> {
        let index = self.search(item_key).ok()?;
        Some(self.entries.remove(index).1)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
