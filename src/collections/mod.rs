//! Observable sorted containers.
//!
//! - [`ObservableSortedList`]: key-unique sorted map with positional access
//! - [`ObservableGroup`]: a sorted list tagged with a group identity
//! - [`ObservableGroupedList`]: groups maintained from a flat item set
//!
//! # Ownership
//!
//! Containers own their storage outright. A grouped list owns its groups and
//! only lends them out by shared reference; the handler it installs on each
//! group is removed before the group is dropped.
//!
//! # Examples
//!
//! ## `ObservableSortedList`
//!
//! ```rust
//! use observable_collections::collections::ObservableSortedList;
//!
//! let mut list = ObservableSortedList::new();
//! list.add(3, "three").unwrap();
//! list.add(1, "one").unwrap();
//!
//! assert_eq!(list.get_index(0), Some((&1, &"one")));
//! list.remove_at(0).unwrap();
//! assert_eq!(list.len(), 1);
//! ```
//!
//! ## `ObservableGroupedList`
//!
//! ```rust
//! use observable_collections::collections::ObservableGroupedList;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let mut by_parity = ObservableGroupedList::new(|number: &u32| number % 2 == 0);
//! let sink = Rc::clone(&log);
//! by_parity.subscribe(move |change| {
//!     sink.borrow_mut().push((change.is_group_change(), change.kind(), change.index()));
//! });
//!
//! by_parity.add("two", 2).unwrap();
//! by_parity.add("four", 4).unwrap();
//!
//! // The group `true` was created once; its two items are reported with
//! // positions local to the group.
//! assert_eq!(log.borrow().len(), 3);
//! assert!(log.borrow()[0].0);
//! assert_eq!(log.borrow()[2].2, Some(0));
//! ```

mod group;
mod grouped_list;
mod item_index;
mod sorted_list;

pub use group::ObservableGroup;
pub use grouped_list::GroupedChange;
pub use grouped_list::GroupedHandler;
pub use grouped_list::ObservableGroupedList;
pub use sorted_list::Iter;
pub use sorted_list::ObservableSortedList;
