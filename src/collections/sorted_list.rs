//! Observable sorted key-value list.
//!
//! This module provides [`ObservableSortedList`], a key-unique map kept in
//! comparer order with positional access, which raises a
//! [`CollectionChange`] on every mutation.
//!
//! # Overview
//!
//! Entries live in a single `Vec<(K, V)>` sorted by the injected
//! [`Comparer`]. Lookups and insertion positions use binary search;
//! insertion and deletion shift the tail of the vector.
//!
//! | Operation      | Complexity |
//! |----------------|------------|
//! | `get`          | O(log N)   |
//! | `contains_key` | O(log N)   |
//! | `add`          | O(N)       |
//! | `remove`       | O(N)       |
//! | `remove_at`    | O(N)       |
//! | `get_index`    | O(1)       |
//! | `clear`        | O(N)       |
//!
//! # Examples
//!
//! ```rust
//! use observable_collections::collections::ObservableSortedList;
//! use observable_collections::notification::CollectionChange;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let removed = Rc::new(RefCell::new(Vec::new()));
//!
//! let mut list = ObservableSortedList::new();
//! list.add("Cid", 'C').unwrap();
//! list.add("Ann", 'A').unwrap();
//! list.add("Bob", 'B').unwrap();
//!
//! let sink = Rc::clone(&removed);
//! list.subscribe(move |change| {
//!     if let CollectionChange::Remove { value, index } = change {
//!         sink.borrow_mut().push((value.copied(), *index));
//!     }
//! });
//!
//! assert!(list.remove(&"Bob"));
//! let keys: Vec<&&str> = list.keys().collect();
//! assert_eq!(keys, vec![&"Ann", &"Cid"]);
//! assert_eq!(*removed.borrow(), vec![(Some('B'), 1)]);
//! ```

use std::fmt;
use std::iter::FusedIterator;

use crate::comparer::Comparer;
use crate::error::CollectionError;
use crate::notification::{
    CollectionChange, CollectionHandler, Notifier, Property, SubscriptionId,
};

// =============================================================================
// ObservableSortedList Definition
// =============================================================================

/// A sorted, key-unique map that notifies subscribers of every change.
///
/// Keys are ordered by a [`Comparer`], the key type's natural order unless
/// another one is supplied. Every successful `add`, `remove`, `remove_at` and
/// `clear` emits exactly one [`CollectionChange`], preceded by
/// [`Property::Count`] and [`Property::Items`] signals.
///
/// The list is single-threaded: it is neither `Send` nor `Sync`.
pub struct ObservableSortedList<K, V> {
    entries: Vec<(K, V)>,
    comparer: Comparer<K>,
    notifier: Notifier<CollectionHandler<V>>,
}

static_assertions::assert_not_impl_any!(ObservableSortedList<i32, i32>: Send, Sync);
static_assertions::assert_not_impl_any!(ObservableSortedList<String, String>: Send, Sync);

impl<K: Ord + 'static, V> ObservableSortedList<K, V> {
    /// Creates an empty list ordered by the key type's natural order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use observable_collections::collections::ObservableSortedList;
    ///
    /// let list: ObservableSortedList<i32, String> = ObservableSortedList::new();
    /// assert!(list.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparer(Comparer::natural())
    }

    /// Creates an empty list with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparer(capacity, Comparer::natural())
    }

    /// Creates a list from a source mapping, in natural key order.
    ///
    /// Seeding emits no notifications.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if `entries` repeats a key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use observable_collections::collections::ObservableSortedList;
    ///
    /// let list = ObservableSortedList::try_from_entries([(3, "c"), (1, "a"), (2, "b")]).unwrap();
    /// let values: Vec<&&str> = list.values().collect();
    /// assert_eq!(values, vec![&"a", &"b", &"c"]);
    ///
    /// assert!(ObservableSortedList::try_from_entries([(1, "a"), (1, "b")]).is_err());
    /// ```
    pub fn try_from_entries<I>(entries: I) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::try_from_entries_with_comparer(entries, Comparer::natural())
    }
}

impl<K, V> ObservableSortedList<K, V> {
    /// Creates an empty list ordered by `comparer`.
    #[must_use]
    pub fn with_comparer(comparer: Comparer<K>) -> Self {
        Self::with_capacity_and_comparer(0, comparer)
    }

    /// Creates an empty list ordered by `comparer` with room for `capacity`
    /// entries.
    #[must_use]
    pub fn with_capacity_and_comparer(capacity: usize, comparer: Comparer<K>) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            comparer,
            notifier: Notifier::new(),
        }
    }

    /// Creates a list from a source mapping ordered by `comparer`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if two keys of `entries`
    /// compare equal under `comparer`.
    pub fn try_from_entries_with_comparer<I>(
        entries: I,
        comparer: Comparer<K>,
    ) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut entries: Vec<(K, V)> = entries.into_iter().collect();
        entries.sort_by(|(left, _), (right, _)| comparer.compare(left, right));
        if entries
            .windows(2)
            .any(|pair| comparer.equals(&pair[0].0, &pair[1].0))
        {
            return Err(CollectionError::DuplicateKey);
        }
        Ok(Self {
            entries,
            comparer,
            notifier: Notifier::new(),
        })
    }

    // =========================================================================
    // Size
    // =========================================================================

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the list holds no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries the list can hold without reallocating.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Releases unused capacity.
    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
    }

    /// Returns the comparer that orders this list.
    #[inline]
    #[must_use]
    pub const fn comparer(&self) -> &Comparer<K> {
        &self.comparer
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    fn search(&self, key: &K) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(candidate, _)| self.comparer.compare(candidate, key))
    }

    /// Returns the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use observable_collections::collections::ObservableSortedList;
    ///
    /// let list = ObservableSortedList::try_from_entries([("one", 1)]).unwrap();
    /// assert_eq!(list.get(&"one"), Some(&1));
    /// assert_eq!(list.get(&"two"), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.search(key).ok().map(|index| &self.entries[index].1)
    }

    /// Returns the value stored under `key`, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::KeyNotFound`] if `key` is not present.
    pub fn try_get(&self, key: &K) -> Result<&V, CollectionError> {
        self.get(key).ok_or(CollectionError::KeyNotFound)
    }

    pub(crate) fn value_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.entries.get_mut(index).map(|(_, value)| value)
    }

    /// Returns `true` if an entry with `key` exists.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_ok()
    }

    /// Returns the sorted position of `key`.
    #[must_use]
    pub fn index_of_key(&self, key: &K) -> Option<usize> {
        self.search(key).ok()
    }

    /// Returns the entry at sorted position `index`.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get(index).map(|(key, value)| (key, value))
    }

    /// Returns the key at sorted position `index`.
    #[must_use]
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.entries.get(index).map(|(key, _)| key)
    }

    /// Returns the value at sorted position `index`.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&V> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.get_index(0)
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.entries.last().map(|(key, value)| (key, value))
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Returns an iterator over the entries in ascending key order.
    ///
    /// Each call starts a fresh pass; iteration never mutates the list.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values in key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.entries.iter().map(|(_, value)| value)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Inserts `value` under `key` at its sorted position.
    ///
    /// Emits [`CollectionChange::Add`] with the resulting index.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if `key` is already present.
    /// The list is left untouched and nothing is emitted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use observable_collections::collections::ObservableSortedList;
    /// use observable_collections::error::CollectionError;
    ///
    /// let mut list = ObservableSortedList::new();
    /// assert_eq!(list.add(1, "one"), Ok(()));
    /// assert_eq!(list.add(1, "uno"), Err(CollectionError::DuplicateKey));
    /// assert_eq!(list.get(&1), Some(&"one"));
    /// ```
    pub fn add(&mut self, key: K, value: V) -> Result<(), CollectionError> {
        self.insert_entry(key, value).map(|_| ())
    }

    /// `add`, returning the position of the new entry.
    pub(crate) fn insert_entry(&mut self, key: K, value: V) -> Result<usize, CollectionError> {
        let index = match self.search(&key) {
            Ok(_) => return Err(CollectionError::DuplicateKey),
            Err(index) => index,
        };
        self.entries.insert(index, (key, value));
        tracing::trace!(index, length = self.entries.len(), "entry added");

        let value = &self.entries[index].1;
        self.notifier
            .notify(|handler| handler(&CollectionChange::Add { value, index }));
        Ok(index)
    }

    /// Removes the entry stored under `key`.
    ///
    /// Returns `false`, and emits nothing, when `key` is absent. Otherwise
    /// emits [`CollectionChange::Remove`] carrying the removed value and its
    /// prior index.
    pub fn remove(&mut self, key: &K) -> bool {
        let Ok(index) = self.search(key) else {
            return false;
        };
        let (_, removed) = self.entries.remove(index);
        tracing::trace!(index, length = self.entries.len(), "entry removed");

        self.notifier.notify(|handler| {
            handler(&CollectionChange::Remove {
                value: Some(&removed),
                index,
            });
        });
        true
    }

    /// Removes the entry at sorted position `index`.
    ///
    /// Emits [`CollectionChange::Remove`] without a value.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> Result<(), CollectionError> {
        let length = self.entries.len();
        if index >= length {
            return Err(CollectionError::IndexOutOfRange { index, length });
        }
        self.entries.remove(index);
        tracing::trace!(index, length = self.entries.len(), "entry removed by position");

        self.notifier.notify(|handler| {
            handler(&CollectionChange::Remove { value: None, index });
        });
        Ok(())
    }

    /// Removes every entry and emits a single [`CollectionChange::Reset`].
    pub fn clear(&mut self) {
        let cleared = self.entries.len();
        self.entries.clear();
        tracing::trace!(cleared, "list cleared");

        self.notifier
            .notify(|handler| handler(&CollectionChange::Reset));
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Registers a handler for structural changes.
    ///
    /// Handlers run synchronously, in registration order, after the storage
    /// update of every mutation.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&CollectionChange<'_, V>) + 'static,
    {
        self.notifier.subscribe(Box::new(handler))
    }

    /// Removes a structural handler. Returns `false` if `id` is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Registers a handler for [`Property`] changes.
    pub fn subscribe_property_changed<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(Property) + 'static,
    {
        self.notifier.subscribe_property_changed(Box::new(handler))
    }

    /// Removes a property handler. Returns `false` if `id` is unknown.
    pub fn unsubscribe_property_changed(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe_property_changed(id)
    }

    /// Returns the number of structural handlers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }
}

impl<K, V: PartialEq> ObservableSortedList<K, V> {
    /// Returns `true` if some entry holds `value`. Linear scan.
    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool {
        self.index_of_value(value).is_some()
    }

    /// Returns the position of the first entry holding `value`.
    #[must_use]
    pub fn index_of_value(&self, value: &V) -> Option<usize> {
        self.entries
            .iter()
            .position(|(_, candidate)| candidate == value)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the entries of an [`ObservableSortedList`].
#[derive(Clone)]
pub struct Iter<'a, K, V> {
    inner: std::slice::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, value)| (key, value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a ObservableSortedList<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K: Ord + 'static, V> Default for ObservableSortedList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares entries only; comparers and subscriptions are not part of
/// equality.
impl<K: PartialEq, V: PartialEq> PartialEq for ObservableSortedList<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq> Eq for ObservableSortedList<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ObservableSortedList<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for ObservableSortedList<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for ObservableSortedList<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct ObservableSortedListVisitor<K, V> {
    key_marker: std::marker::PhantomData<K>,
    value_marker: std::marker::PhantomData<V>,
}

#[cfg(feature = "serde")]
impl<K, V> ObservableSortedListVisitor<K, V> {
    const fn new() -> Self {
        Self {
            key_marker: std::marker::PhantomData,
            value_marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for ObservableSortedListVisitor<K, V>
where
    K: serde::Deserialize<'de> + Ord + 'static,
    V: serde::Deserialize<'de>,
{
    type Value = ObservableSortedList<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map with unique keys")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(entry) = access.next_entry()? {
            entries.push(entry);
        }
        ObservableSortedList::try_from_entries(entries).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for ObservableSortedList<K, V>
where
    K: serde::Deserialize<'de> + Ord + 'static,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(ObservableSortedListVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
