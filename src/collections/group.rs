//! A named sorted sub-list.
//!
//! [`ObservableGroup`] is an [`ObservableSortedList`] tagged with a group
//! identity. It dereferences to the list, so it exposes exactly the list's
//! operations plus [`key`](ObservableGroup::key) and
//! [`set_key`](ObservableGroup::set_key).

use std::fmt;
use std::ops::{Deref, DerefMut};

use super::sorted_list::ObservableSortedList;
use crate::comparer::Comparer;
use crate::error::CollectionError;
use crate::notification::SubscriptionId;

/// A sorted list of items that share a group identity.
///
/// # Examples
///
/// ```rust
/// use observable_collections::collections::ObservableGroup;
///
/// let mut group = ObservableGroup::new('A');
/// group.add(2, "Alf").unwrap();
/// group.add(1, "Ann").unwrap();
///
/// assert_eq!(group.key(), &'A');
/// assert_eq!(group.value_at(0), Some(&"Ann"));
/// ```
///
/// # Identity
///
/// The identity can be reassigned with [`set_key`](Self::set_key). A grouped
/// list only hands out shared references to its groups, so it never sees its
/// groups re-keyed; a standalone group is not re-sorted anywhere either.
pub struct ObservableGroup<GK, IK, V> {
    key: GK,
    items: ObservableSortedList<IK, V>,
    /// Handler installed by an owning grouped list.
    forwarding: Option<SubscriptionId>,
}

impl<GK, IK: Ord + 'static, V> ObservableGroup<GK, IK, V> {
    /// Creates an empty group with natural item order.
    #[must_use]
    pub fn new(key: GK) -> Self {
        Self::with_comparer(key, Comparer::natural())
    }
}

impl<GK, IK, V> ObservableGroup<GK, IK, V> {
    /// Creates an empty group whose items are ordered by `comparer`.
    #[must_use]
    pub fn with_comparer(key: GK, comparer: Comparer<IK>) -> Self {
        Self {
            key,
            items: ObservableSortedList::with_comparer(comparer),
            forwarding: None,
        }
    }

    /// Creates a group seeded with `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if `entries` repeats an item
    /// key.
    pub fn try_from_entries<I>(
        key: GK,
        entries: I,
        comparer: Comparer<IK>,
    ) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = (IK, V)>,
    {
        Ok(Self {
            key,
            items: ObservableSortedList::try_from_entries_with_comparer(entries, comparer)?,
            forwarding: None,
        })
    }

    /// Returns the group identity.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> &GK {
        &self.key
    }

    /// Replaces the group identity and returns the previous one.
    pub fn set_key(&mut self, key: GK) -> GK {
        std::mem::replace(&mut self.key, key)
    }

    /// Consumes the group and returns its items.
    #[must_use]
    pub fn into_inner(self) -> ObservableSortedList<IK, V> {
        self.items
    }

    pub(crate) fn install_forwarding(&mut self, id: SubscriptionId) {
        self.forwarding = Some(id);
    }

    /// Removes the grouped-list handler, if one is installed.
    pub(crate) fn detach(&mut self) {
        if let Some(id) = self.forwarding.take() {
            self.items.unsubscribe(id);
        }
    }
}

impl<GK, IK, V> Deref for ObservableGroup<GK, IK, V> {
    type Target = ObservableSortedList<IK, V>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<GK, IK, V> DerefMut for ObservableGroup<GK, IK, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}

impl<GK: PartialEq, IK: PartialEq, V: PartialEq> PartialEq for ObservableGroup<GK, IK, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.items == other.items
    }
}

impl<GK: fmt::Debug, IK: fmt::Debug, V: fmt::Debug> fmt::Debug for ObservableGroup<GK, IK, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ObservableGroup")
            .field("key", &self.key)
            .field("items", &self.items)
            .finish()
    }
}

#[cfg(feature = "serde")]
impl<GK, IK, V> serde::Serialize for ObservableGroup<GK, IK, V>
where
    GK: serde::Serialize,
    IK: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ObservableGroup", 2)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("items", &self.items)?;
        state.end()
    }
}
