//! Change notifications.
//!
//! Containers report every structural change through a
//! [`CollectionChange`] and, before it, two [`Property`] signals for the
//! element count and the element set. Handlers are plain closures registered
//! on the container and identified by a [`SubscriptionId`].
//!
//! # Dispatch
//!
//! Dispatch is synchronous: handlers run inside the mutating call, in
//! registration order, after storage has been updated. Handlers only receive
//! shared references to the changed data and have no access to the container,
//! so reentrant mutation cannot be expressed.
//!
//! # Examples
//!
//! ```rust
//! use observable_collections::collections::ObservableSortedList;
//! use observable_collections::notification::{ChangeKind, Property};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let properties = Rc::new(RefCell::new(Vec::new()));
//!
//! let mut list = ObservableSortedList::new();
//! let sink = Rc::clone(&seen);
//! list.subscribe(move |change| sink.borrow_mut().push((change.kind(), change.index())));
//! let sink = Rc::clone(&properties);
//! list.subscribe_property_changed(move |property| sink.borrow_mut().push(property));
//!
//! list.add("b", 2).unwrap();
//! list.add("a", 1).unwrap();
//!
//! assert_eq!(
//!     *seen.borrow(),
//!     vec![(ChangeKind::Add, Some(0)), (ChangeKind::Add, Some(0))]
//! );
//! assert_eq!(properties.borrow().len(), 4);
//! assert_eq!(properties.borrow()[0], Property::Count);
//! ```

use smallvec::SmallVec;
use std::fmt;

// =============================================================================
// Event Types
// =============================================================================

/// Token returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// The discriminant of a [`CollectionChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// An element was inserted.
    Add,
    /// An element was removed.
    Remove,
    /// The container was emptied at once.
    Reset,
}

/// A structural change to a sorted container.
///
/// Indices are positions in the container's sorted order: the new position
/// for `Add`, the prior position for `Remove`.
#[derive(Debug, PartialEq, Eq)]
pub enum CollectionChange<'a, T> {
    /// `value` now sits at `index`.
    Add {
        /// The inserted value.
        value: &'a T,
        /// Position after insertion.
        index: usize,
    },
    /// The element at `index` was removed.
    ///
    /// `value` is `None` for position-based removal.
    Remove {
        /// The removed value, when removal was by key.
        value: Option<&'a T>,
        /// Position before removal.
        index: usize,
    },
    /// All elements were removed.
    Reset,
}

impl<T> Clone for CollectionChange<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CollectionChange<'_, T> {}

impl<'a, T> CollectionChange<'a, T> {
    /// Returns the kind of this change.
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        match self {
            Self::Add { .. } => ChangeKind::Add,
            Self::Remove { .. } => ChangeKind::Remove,
            Self::Reset => ChangeKind::Reset,
        }
    }

    /// Returns the affected position, if any.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Add { index, .. } | Self::Remove { index, .. } => Some(*index),
            Self::Reset => None,
        }
    }

    /// Returns the affected value, if the change carries one.
    #[must_use]
    pub const fn value(&self) -> Option<&'a T> {
        match self {
            Self::Add { value, .. } => Some(*value),
            Self::Remove { value, .. } => *value,
            Self::Reset => None,
        }
    }
}

/// Observable properties that change together with the structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// The element count.
    Count,
    /// The element set, as seen through positional access.
    Items,
}

impl Property {
    /// The conventional binding name of the property.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Count => "Count",
            Self::Items => "Item[]",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Handler type for structural changes of a container of `T`.
pub type CollectionHandler<T> = dyn FnMut(&CollectionChange<'_, T>);

/// Handler type for property changes.
pub type PropertyHandler = dyn FnMut(Property);

// =============================================================================
// Registry
// =============================================================================

/// Ordered set of boxed handlers keyed by subscription id.
pub(crate) struct HandlerRegistry<H: ?Sized> {
    next_id: u64,
    handlers: SmallVec<[(SubscriptionId, Box<H>); 2]>,
}

impl<H: ?Sized> HandlerRegistry<H> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            handlers: SmallVec::new(),
        }
    }

    pub(crate) fn insert(&mut self, handler: Box<H>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        self.handlers
            .iter()
            .position(|(candidate, _)| *candidate == id)
            .map(|position| self.handlers.remove(position))
            .is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }

    pub(crate) fn handlers_mut(&mut self) -> impl Iterator<Item = &mut H> {
        self.handlers.iter_mut().map(|(_, handler)| &mut **handler)
    }
}

/// The two channels of an observable container.
///
/// `H` is the structural handler type; property handlers are shared by all
/// containers.
pub(crate) struct Notifier<H: ?Sized> {
    changes: HandlerRegistry<H>,
    properties: HandlerRegistry<PropertyHandler>,
}

impl<H: ?Sized> Notifier<H> {
    pub(crate) fn new() -> Self {
        Self {
            changes: HandlerRegistry::new(),
            properties: HandlerRegistry::new(),
        }
    }

    pub(crate) fn subscribe(&mut self, handler: Box<H>) -> SubscriptionId {
        self.changes.insert(handler)
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.changes.remove(id)
    }

    pub(crate) fn subscribe_property_changed(
        &mut self,
        handler: Box<PropertyHandler>,
    ) -> SubscriptionId {
        self.properties.insert(handler)
    }

    pub(crate) fn unsubscribe_property_changed(&mut self, id: SubscriptionId) -> bool {
        self.properties.remove(id)
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.changes.len()
    }

    /// Signals `Count` then `Items`, then hands every structural handler to
    /// `dispatch`.
    pub(crate) fn notify<F>(&mut self, mut dispatch: F)
    where
        F: FnMut(&mut H),
    {
        for property in [Property::Count, Property::Items] {
            for handler in self.properties.handlers_mut() {
                handler(property);
            }
        }
        for handler in self.changes.handlers_mut() {
            dispatch(handler);
        }
    }
}

impl<H: ?Sized> Default for Notifier<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> fmt::Debug for Notifier<H> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Notifier")
            .field("changes", &self.changes.len())
            .field("properties", &self.properties.len())
            .finish()
    }
}
