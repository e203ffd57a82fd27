//! # observable-collections
//!
//! Observable, sorted, associative containers for data binding.
//!
//! ## Overview
//!
//! - **Sorted list**: a key-unique map kept in comparer order, with
//!   positional access and a change notification for every mutation
//! - **Group**: a sorted list tagged with a group identity
//! - **Grouped list**: groups built from a flat item set by a key selector,
//!   created on the first item and removed with the last, whose item events
//!   are re-emitted by the grouped list
//!
//! Notifications are synchronous and single-threaded. Every structural change
//! is reported as a [`notification::CollectionChange`] preceded by
//! [`notification::Property`] signals for the count and the element set.
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for sorted lists, `Serialize` for groups
//! - `fxhash`: use `rustc_hash::FxHashSet` for the value sets compared by
//!   `ObservableGroupedList::replace_with`
//!
//! ## Example
//!
//! ```rust
//! use observable_collections::prelude::*;
//!
//! let mut list = ObservableSortedList::new();
//! list.add("Bob", 'B').unwrap();
//! list.add("Ann", 'A').unwrap();
//!
//! assert_eq!(list.add("Ann", 'X'), Err(CollectionError::DuplicateKey));
//! let keys: Vec<&&str> = list.keys().collect();
//! assert_eq!(keys, vec![&"Ann", &"Bob"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use observable_collections::prelude::*;
/// ```
pub mod prelude {
    pub use crate::collections::*;
    pub use crate::comparer::Comparer;
    pub use crate::error::CollectionError;
    pub use crate::notification::{ChangeKind, CollectionChange, Property, SubscriptionId};
}

pub mod collections;
pub mod comparer;
pub mod error;
pub mod notification;
