//! Observable list of groups keyed by a derived group key.
//!
//! This module provides [`ObservableGroupedList`], which partitions items
//! into [`ObservableGroup`]s by a caller-supplied key selector, owns the
//! lifecycle of those groups and re-emits their change events as its own.
//!
//! # Overview
//!
//! - `add` derives the group key of the item, finds or creates the group and
//!   delegates the insertion to it.
//! - `remove` finds the owning group through a reverse index (item key to
//!   group key), delegates the removal and drops the group once it is empty.
//!   The index is ordered by the item comparer, so item keys are unique across
//!   groups in exactly the sense they are unique within one.
//! - `replace_with` reconciles the item set against a target collection with
//!   plain set differences.
//!
//! Events arrive as [`GroupedChange`]: group-level changes when groups appear
//! or disappear, and item-level changes forwarded verbatim from the group.
//!
//! # Index Semantics
//!
//! The index of an item-level change is the item's position inside its group,
//! not a position in the flattened item space. Consumers that need a global
//! position must add the lengths of the preceding groups themselves.
//!
//! # Examples
//!
//! ```rust
//! use observable_collections::collections::ObservableGroupedList;
//!
//! let mut people = ObservableGroupedList::new(|name: &&str| name.chars().next().unwrap_or(' '));
//! people.add(1, "Ann").unwrap();
//! people.add(2, "Bob").unwrap();
//!
//! let letters: Vec<&char> = people.group_keys().collect();
//! assert_eq!(letters, vec![&'A', &'B']);
//!
//! assert!(people.remove(&1));
//! let letters: Vec<&char> = people.group_keys().collect();
//! assert_eq!(letters, vec![&'B']);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use super::group::ObservableGroup;
use super::item_index::ItemIndex;
use super::sorted_list::ObservableSortedList;
use crate::comparer::Comparer;
use crate::error::CollectionError;
use crate::notification::{
    ChangeKind, CollectionChange, Notifier, Property, PropertyHandler, SubscriptionId,
};

/// Values compared by `replace_with`.
#[cfg(feature = "fxhash")]
type ValueSet<'a, V> = rustc_hash::FxHashSet<&'a V>;

#[cfg(not(feature = "fxhash"))]
type ValueSet<'a, V> = std::collections::HashSet<&'a V>;

// =============================================================================
// Grouped Change
// =============================================================================

/// A change reported by an [`ObservableGroupedList`].
#[derive(Debug)]
pub enum GroupedChange<'a, GK, IK, V> {
    /// A group was created, removed, or all groups were cleared.
    Group(CollectionChange<'a, ObservableGroup<GK, IK, V>>),
    /// An item changed inside the group identified by `group_key`.
    ///
    /// `change` is the group's own notification; its index is local to the
    /// group.
    Item {
        /// Key of the group that raised the change.
        group_key: &'a GK,
        /// The group's notification, unchanged.
        change: CollectionChange<'a, V>,
    },
}

impl<GK, IK, V> Clone for GroupedChange<'_, GK, IK, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<GK, IK, V> Copy for GroupedChange<'_, GK, IK, V> {}

impl<'a, GK, IK, V> GroupedChange<'a, GK, IK, V> {
    /// Returns the kind of the underlying change.
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        match self {
            Self::Group(change) => change.kind(),
            Self::Item { change, .. } => change.kind(),
        }
    }

    /// Returns the index of the underlying change.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Group(change) => change.index(),
            Self::Item { change, .. } => change.index(),
        }
    }

    /// Returns `true` for group-level changes.
    #[must_use]
    pub const fn is_group_change(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// Returns the key of the affected group, when the change names one.
    ///
    /// Group-level `Remove` by position and `Reset` carry no group.
    #[must_use]
    pub fn group_key(&self) -> Option<&'a GK> {
        match self {
            Self::Group(change) => change.value().map(ObservableGroup::key),
            Self::Item { group_key, .. } => Some(*group_key),
        }
    }
}

/// Handler type for [`GroupedChange`]s.
pub type GroupedHandler<GK, IK, V> = dyn FnMut(&GroupedChange<'_, GK, IK, V>);

type Dispatcher<GK, IK, V> = Rc<RefCell<Notifier<GroupedHandler<GK, IK, V>>>>;

// =============================================================================
// ObservableGroupedList Definition
// =============================================================================

/// A sorted list of [`ObservableGroup`]s maintained from a flat item set.
///
/// Invariants:
///
/// 1. every group holds at least one item;
/// 2. every item sits in the group whose key its value selects;
/// 3. item keys are unique across all groups.
///
/// The list is single-threaded: it is neither `Send` nor `Sync`.
pub struct ObservableGroupedList<GK, IK, V> {
    groups: ObservableSortedList<GK, ObservableGroup<GK, IK, V>>,
    key_selector: Box<dyn Fn(&V) -> GK>,
    item_comparer: Comparer<IK>,
    item_index: ItemIndex<IK, GK>,
    /// Position of the last group touched; re-validated on every use.
    last_affected: Option<usize>,
    dispatcher: Dispatcher<GK, IK, V>,
}

static_assertions::assert_not_impl_any!(ObservableGroupedList<char, i32, String>: Send, Sync);

impl<GK, IK, V> ObservableGroupedList<GK, IK, V>
where
    GK: Ord + Clone + 'static,
    IK: Ord + Clone + 'static,
    V: 'static,
{
    /// Creates an empty grouped list with natural group and item order.
    pub fn new<F>(key_selector: F) -> Self
    where
        F: Fn(&V) -> GK + 'static,
    {
        Self::with_comparers(key_selector, Comparer::natural(), Comparer::natural())
    }

    /// Creates a grouped list seeded with `entries`, in natural order.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if `entries` repeats an item
    /// key.
    pub fn try_from_entries<F, I>(key_selector: F, entries: I) -> Result<Self, CollectionError>
    where
        F: Fn(&V) -> GK + 'static,
        I: IntoIterator<Item = (IK, V)>,
    {
        Self::try_from_entries_with_comparers(
            key_selector,
            entries,
            Comparer::natural(),
            Comparer::natural(),
        )
    }
}

impl<GK, IK, V> ObservableGroupedList<GK, IK, V>
where
    GK: Clone + 'static,
    IK: Clone + 'static,
    V: 'static,
{
    /// Creates an empty grouped list.
    ///
    /// `group_comparer` orders the groups; `item_comparer` is shared by every
    /// group to order its items.
    pub fn with_comparers<F>(
        key_selector: F,
        group_comparer: Comparer<GK>,
        item_comparer: Comparer<IK>,
    ) -> Self
    where
        F: Fn(&V) -> GK + 'static,
    {
        let dispatcher: Dispatcher<GK, IK, V> = Rc::new(RefCell::new(Notifier::new()));
        let mut groups: ObservableSortedList<GK, ObservableGroup<GK, IK, V>> =
            ObservableSortedList::with_comparer(group_comparer);

        let forward_to = Rc::downgrade(&dispatcher);
        groups.subscribe(move |change| {
            if let Some(dispatcher) = forward_to.upgrade() {
                dispatcher
                    .borrow_mut()
                    .notify(|handler| handler(&GroupedChange::Group(*change)));
            }
        });

        Self {
            groups,
            key_selector: Box::new(key_selector),
            item_index: ItemIndex::new(item_comparer.clone()),
            item_comparer,
            last_affected: None,
            dispatcher,
        }
    }

    /// Creates a grouped list seeded with `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if `entries` repeats an item
    /// key.
    pub fn try_from_entries_with_comparers<F, I>(
        key_selector: F,
        entries: I,
        group_comparer: Comparer<GK>,
        item_comparer: Comparer<IK>,
    ) -> Result<Self, CollectionError>
    where
        F: Fn(&V) -> GK + 'static,
        I: IntoIterator<Item = (IK, V)>,
    {
        let mut list = Self::with_comparers(key_selector, group_comparer, item_comparer);
        for (item_key, value) in entries {
            list.add(item_key, value)?;
        }
        Ok(list)
    }

    // =========================================================================
    // Group Lookup
    // =========================================================================

    /// Returns the position of the group keyed `group_key`, trying the
    /// last-touched position first.
    fn find_group(&mut self, group_key: &GK) -> Option<usize> {
        if let Some(hint) = self.last_affected
            && self
                .groups
                .key_at(hint)
                .is_some_and(|candidate| self.groups.comparer().equals(candidate, group_key))
        {
            return Some(hint);
        }
        let index = self.groups.index_of_key(group_key)?;
        self.last_affected = Some(index);
        Some(index)
    }

    /// Inserts a new empty group wired to this list's dispatcher.
    fn create_group(&mut self, group_key: GK) -> Result<usize, CollectionError> {
        let mut group =
            ObservableGroup::with_comparer(group_key.clone(), self.item_comparer.clone());

        let forward_to = Rc::downgrade(&self.dispatcher);
        let forwarded_key = group_key.clone();
        let id = group.subscribe(move |change| {
            if let Some(dispatcher) = forward_to.upgrade() {
                dispatcher.borrow_mut().notify(|handler| {
                    handler(&GroupedChange::Item {
                        group_key: &forwarded_key,
                        change: *change,
                    });
                });
            }
        });
        group.install_forwarding(id);

        let index = self.groups.insert_entry(group_key, group)?;
        tracing::debug!(index, groups = self.groups.len(), "group created");
        Ok(index)
    }

    fn group_at_mut(
        &mut self,
        index: usize,
    ) -> Result<&mut ObservableGroup<GK, IK, V>, CollectionError> {
        let length = self.groups.len();
        self.groups
            .value_at_mut(index)
            .ok_or(CollectionError::IndexOutOfRange { index, length })
    }

    /// Severs the group at `index` from this list and forgets its items.
    ///
    /// The group itself stays in place; the caller removes it.
    fn detach_group_at(&mut self, index: usize) -> Option<usize> {
        let group = self.groups.value_at_mut(index)?;
        group.detach();
        for item_key in group.keys() {
            self.item_index.remove(item_key);
        }
        self.last_affected = None;
        Some(group.len())
    }

    // =========================================================================
    // Item Mutation
    // =========================================================================

    /// Adds an item to the group its value selects, creating the group if
    /// needed.
    ///
    /// Emits a group-level `Add` first when a group is created, then the
    /// group's item-level `Add`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if a key equal to `item_key`
    /// under the item comparer is present in any group. Nothing is created or
    /// emitted in that case.
    pub fn add(&mut self, item_key: IK, value: V) -> Result<(), CollectionError> {
        if self.item_index.contains_key(&item_key) {
            return Err(CollectionError::DuplicateKey);
        }
        let group_key = (self.key_selector)(&value);
        let index = match self.find_group(&group_key) {
            Some(index) => index,
            None => self.create_group(group_key.clone())?,
        };

        self.group_at_mut(index)?.add(item_key.clone(), value)?;
        self.item_index.insert(item_key, group_key);
        self.last_affected = Some(index);
        Ok(())
    }

    /// Removes an item from its group, and the group once it is empty.
    ///
    /// Returns `false`, and emits nothing, if `item_key` is unknown.
    pub fn remove(&mut self, item_key: &IK) -> bool {
        let Some(group_key) = self.item_index.get(item_key).cloned() else {
            return false;
        };
        let Some(index) = self.find_group(&group_key) else {
            return false;
        };
        let Ok(group) = self.group_at_mut(index) else {
            return false;
        };

        let removed = group.remove(item_key);
        let emptied = group.is_empty();
        if removed {
            self.item_index.remove(item_key);
        }
        if emptied {
            self.detach_group_at(index);
            self.groups.remove(&group_key);
            tracing::debug!(index, groups = self.groups.len(), "empty group removed");
        }
        removed
    }

    /// Replaces the item set with `items`.
    ///
    /// Items are compared by value; duplicates in `items` are collapsed.
    /// Current items missing from `items` are removed first, then items not
    /// currently present are added under the key `item_key_selector` gives
    /// them. Items present on both sides are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if two additions have keys
    /// equal under the item comparer, or an addition's key equals the key of
    /// an item that is kept. The list is not modified in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use observable_collections::collections::ObservableGroupedList;
    ///
    /// let mut letters =
    ///     ObservableGroupedList::try_from_entries(|_: &char| 0, [('x', 'x'), ('y', 'y')]).unwrap();
    /// letters.replace_with(['y', 'z'], |value| *value).unwrap();
    ///
    /// let values: Vec<&char> = letters.item_values().collect();
    /// assert_eq!(values, vec![&'y', &'z']);
    /// ```
    pub fn replace_with<I, S>(
        &mut self,
        items: I,
        item_key_selector: S,
    ) -> Result<(), CollectionError>
    where
        I: IntoIterator<Item = V>,
        S: Fn(&V) -> IK,
        V: Eq + Hash,
    {
        let target: Vec<V> = items.into_iter().collect();

        let (removals, addition_keys) = {
            let wanted: ValueSet<'_, V> = target.iter().collect();
            let present: ValueSet<'_, V> = self.item_values().collect();

            let removals: Vec<IK> = self
                .items()
                .filter(|(_, value)| !wanted.contains(value))
                .map(|(item_key, _)| item_key.clone())
                .collect();
            let mut removed = ItemIndex::new(self.item_comparer.clone());
            for item_key in &removals {
                removed.insert(item_key.clone(), ());
            }

            let mut seen: ValueSet<'_, V> = ValueSet::default();
            let mut claimed = ItemIndex::new(self.item_comparer.clone());
            let mut addition_keys: Vec<Option<IK>> = Vec::with_capacity(target.len());
            for value in &target {
                if present.contains(value) || !seen.insert(value) {
                    addition_keys.push(None);
                    continue;
                }
                let item_key = item_key_selector(value);
                let kept =
                    self.item_index.contains_key(&item_key) && !removed.contains_key(&item_key);
                if kept || !claimed.insert(item_key.clone(), ()) {
                    return Err(CollectionError::DuplicateKey);
                }
                addition_keys.push(Some(item_key));
            }
            (removals, addition_keys)
        };

        let removed = removals.len();
        for item_key in &removals {
            self.remove(item_key);
        }
        let mut added = 0_usize;
        for (value, item_key) in target.into_iter().zip(addition_keys) {
            if let Some(item_key) = item_key {
                self.add(item_key, value)?;
                added += 1;
            }
        }
        tracing::debug!(removed, added, items = self.item_count(), "items replaced");
        Ok(())
    }

    // =========================================================================
    // Group Mutation
    // =========================================================================

    /// Removes the group keyed `group_key` together with its items.
    ///
    /// Emits a single group-level `Remove` carrying the group. Returns
    /// `false` if no such group exists.
    pub fn remove_group(&mut self, group_key: &GK) -> bool {
        let Some(index) = self.groups.index_of_key(group_key) else {
            return false;
        };
        let released = self.detach_group_at(index);
        self.groups.remove(group_key);
        tracing::debug!(index, released, groups = self.groups.len(), "group removed");
        true
    }

    /// Removes the group at `index` together with its items.
    ///
    /// Emits a single group-level `Remove` without a value.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfRange`] if `index` is not a group
    /// position.
    pub fn remove_group_at(&mut self, index: usize) -> Result<(), CollectionError> {
        let length = self.groups.len();
        if index >= length {
            return Err(CollectionError::IndexOutOfRange { index, length });
        }
        let released = self.detach_group_at(index);
        self.groups.remove_at(index)?;
        tracing::debug!(index, released, groups = self.groups.len(), "group removed by position");
        Ok(())
    }

    /// Removes every group and emits a single group-level `Reset`.
    pub fn clear(&mut self) {
        for index in 0..self.groups.len() {
            if let Some(group) = self.groups.value_at_mut(index) {
                group.detach();
            }
        }
        self.item_index.clear();
        self.last_affected = None;
        self.groups.clear();
    }

    // =========================================================================
    // Item Views
    // =========================================================================

    /// Returns `true` if any group holds `item_key`.
    #[must_use]
    pub fn contains_key(&self, item_key: &IK) -> bool {
        self.item_index.contains_key(item_key)
    }

    /// Returns the value stored under `item_key`.
    #[must_use]
    pub fn get(&self, item_key: &IK) -> Option<&V> {
        let group_key = self.item_index.get(item_key)?;
        self.groups.get(group_key)?.get(item_key)
    }

    /// Returns the key of the group holding `item_key`.
    #[must_use]
    pub fn group_key_of(&self, item_key: &IK) -> Option<&GK> {
        self.item_index.get(item_key)
    }

    /// Returns the number of items across all groups.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_index.len()
    }

    /// Returns the item keys, group by group, each group in item order.
    pub fn item_keys(&self) -> impl Iterator<Item = &IK> {
        self.groups.values().flat_map(|group| group.keys())
    }

    /// Returns the item values in the order of [`item_keys`](Self::item_keys).
    pub fn item_values(&self) -> impl Iterator<Item = &V> {
        self.groups.values().flat_map(|group| group.values())
    }

    /// Returns the flattened item space as `(item key, value)` pairs.
    pub fn items(&self) -> impl Iterator<Item = (&IK, &V)> {
        self.groups.values().flat_map(|group| group.iter())
    }

    /// Copies the flattened item space into a map.
    #[must_use]
    pub fn item_map(&self) -> HashMap<IK, V>
    where
        IK: Hash + Eq,
        V: Clone,
    {
        self.items()
            .map(|(item_key, value)| (item_key.clone(), value.clone()))
            .collect()
    }

    // =========================================================================
    // Group Views
    // =========================================================================

    /// Returns the group keys in group order.
    pub fn group_keys(&self) -> impl DoubleEndedIterator<Item = &GK> + ExactSizeIterator {
        self.groups.keys()
    }

    /// Returns the groups in group order.
    pub fn groups(
        &self,
    ) -> impl DoubleEndedIterator<Item = &ObservableGroup<GK, IK, V>> + ExactSizeIterator {
        self.groups.values()
    }

    /// Returns the group keyed `group_key`.
    #[must_use]
    pub fn group(&self, group_key: &GK) -> Option<&ObservableGroup<GK, IK, V>> {
        self.groups.get(group_key)
    }

    /// Returns the group at position `index`.
    #[must_use]
    pub fn group_at(&self, index: usize) -> Option<&ObservableGroup<GK, IK, V>> {
        self.groups.value_at(index)
    }

    /// Returns the number of groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if there are no groups, and so no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the comparer that orders the groups.
    #[must_use]
    pub const fn group_comparer(&self) -> &Comparer<GK> {
        self.groups.comparer()
    }

    /// Returns the comparer shared by all groups for their items.
    #[must_use]
    pub const fn item_comparer(&self) -> &Comparer<IK> {
        &self.item_comparer
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Registers a handler for group-level and item-level changes.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&GroupedChange<'_, GK, IK, V>) + 'static,
    {
        self.dispatcher.borrow_mut().subscribe(Box::new(handler))
    }

    /// Removes a change handler. Returns `false` if `id` is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher.borrow_mut().unsubscribe(id)
    }

    /// Registers a handler for [`Property`] changes of the grouped list.
    ///
    /// Both properties are signalled before every group-level and item-level
    /// change.
    pub fn subscribe_property_changed<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(Property) + 'static,
    {
        let handler: Box<PropertyHandler> = Box::new(handler);
        self.dispatcher
            .borrow_mut()
            .subscribe_property_changed(handler)
    }

    /// Removes a property handler. Returns `false` if `id` is unknown.
    pub fn unsubscribe_property_changed(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher
            .borrow_mut()
            .unsubscribe_property_changed(id)
    }
}

impl<GK, IK, V> fmt::Debug for ObservableGroupedList<GK, IK, V>
where
    GK: fmt::Debug,
    IK: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_map()
            .entries(self.groups.iter())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
