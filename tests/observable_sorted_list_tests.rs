//! Integration tests for ObservableSortedList.
//!
//! Covers ordering, positional access, error paths and the notification
//! contract: one structural change per successful mutation, preceded by the
//! `Count` and `Item[]` property signals.

use observable_collections::prelude::*;
use rstest::{fixture, rstest};
use std::cell::RefCell;
use std::rc::Rc;

type Events = Rc<RefCell<Vec<(ChangeKind, Option<char>, Option<usize>)>>>;

#[fixture]
fn empty() -> ObservableSortedList<&'static str, char> {
    ObservableSortedList::new()
}

#[fixture]
fn people() -> ObservableSortedList<&'static str, char> {
    ObservableSortedList::try_from_entries([("Bob", 'B'), ("Cid", 'C'), ("Ann", 'A')]).unwrap()
}

fn observe(list: &mut ObservableSortedList<&'static str, char>) -> Events {
    let events: Events = Rc::default();
    let sink = Rc::clone(&events);
    list.subscribe(move |change| {
        sink.borrow_mut()
            .push((change.kind(), change.value().copied(), change.index()));
    });
    events
}

// =============================================================================
// Ordering
// =============================================================================

#[rstest]
fn test_add_then_remove_by_key(mut empty: ObservableSortedList<&'static str, char>) {
    empty.add("Ann", 'A').unwrap();
    empty.add("Bob", 'B').unwrap();
    empty.add("Cid", 'C').unwrap();
    let keys: Vec<&&str> = empty.keys().collect();
    assert_eq!(keys, vec![&"Ann", &"Bob", &"Cid"]);

    let events = observe(&mut empty);
    assert!(empty.remove(&"Bob"));

    let keys: Vec<&&str> = empty.keys().collect();
    assert_eq!(keys, vec![&"Ann", &"Cid"]);
    assert_eq!(
        *events.borrow(),
        vec![(ChangeKind::Remove, Some('B'), Some(1))]
    );
}

#[rstest]
#[case(vec![3, 1, 2])]
#[case(vec![1, 2, 3])]
#[case(vec![3, 2, 1])]
fn test_insertion_order_does_not_matter(#[case] keys: Vec<i32>) {
    let mut list = ObservableSortedList::new();
    for key in keys {
        list.add(key, key * 10).unwrap();
    }
    let entries: Vec<(&i32, &i32)> = list.iter().collect();
    assert_eq!(entries, vec![(&1, &10), (&2, &20), (&3, &30)]);
}

#[rstest]
fn test_custom_comparer_orders_and_dedups() {
    let case_insensitive =
        Comparer::from_fn(|left: &String, right: &String| {
            left.to_lowercase().cmp(&right.to_lowercase())
        });
    let mut list = ObservableSortedList::with_comparer(case_insensitive);
    list.add("bob".to_string(), 2).unwrap();
    list.add("Ann".to_string(), 1).unwrap();

    assert_eq!(
        list.add("BOB".to_string(), 3),
        Err(CollectionError::DuplicateKey)
    );
    assert_eq!(list.get(&"BOB".to_string()), Some(&2));
    assert_eq!(list.key_at(0).map(String::as_str), Some("Ann"));
}

#[rstest]
fn test_reversed_comparer() {
    let list = ObservableSortedList::try_from_entries_with_comparer(
        [(1, 'a'), (3, 'c'), (2, 'b')],
        Comparer::natural().reversed(),
    )
    .unwrap();
    let values: String = list.values().collect();
    assert_eq!(values, "cba");
    assert_eq!(list.first(), Some((&3, &'c')));
    assert_eq!(list.last(), Some((&1, &'a')));
}

#[rstest]
fn test_iteration_is_double_ended(people: ObservableSortedList<&'static str, char>) {
    let backwards: Vec<char> = people.iter().rev().map(|(_, value)| *value).collect();
    assert_eq!(backwards, vec!['C', 'B', 'A']);
    assert_eq!(people.iter().len(), 3);
    assert_eq!((&people).into_iter().count(), 3);
}

// =============================================================================
// Lookup
// =============================================================================

#[rstest]
fn test_positional_lookup(people: ObservableSortedList<&'static str, char>) {
    assert_eq!(people.get_index(1), Some((&"Bob", &'B')));
    assert_eq!(people.key_at(2), Some(&"Cid"));
    assert_eq!(people.value_at(0), Some(&'A'));
    assert_eq!(people.get_index(3), None);
}

#[rstest]
fn test_index_of(people: ObservableSortedList<&'static str, char>) {
    assert_eq!(people.index_of_key(&"Cid"), Some(2));
    assert_eq!(people.index_of_key(&"Dan"), None);
    assert_eq!(people.index_of_value(&'B'), Some(1));
    assert!(people.contains_value(&'A'));
    assert!(!people.contains_value(&'Z'));
}

#[rstest]
fn test_try_get(people: ObservableSortedList<&'static str, char>) {
    assert_eq!(people.try_get(&"Ann"), Ok(&'A'));
    assert_eq!(people.try_get(&"Zed"), Err(CollectionError::KeyNotFound));
    assert!(people.contains_key(&"Bob"));
    assert!(!people.contains_key(&"Zed"));
}

#[rstest]
fn test_empty_list(empty: ObservableSortedList<&'static str, char>) {
    assert!(empty.is_empty());
    assert_eq!(empty.len(), 0);
    assert_eq!(empty.first(), None);
    assert_eq!(empty.last(), None);
    assert_eq!(empty.iter().next(), None);
}

// =============================================================================
// Error Paths
// =============================================================================

#[rstest]
fn test_duplicate_seed_is_rejected() {
    let result = ObservableSortedList::try_from_entries([(1, 'a'), (2, 'b'), (1, 'c')]);
    assert_eq!(result.err(), Some(CollectionError::DuplicateKey));
}

#[rstest]
#[case(3)]
#[case(100)]
fn test_remove_at_out_of_range(
    mut people: ObservableSortedList<&'static str, char>,
    #[case] index: usize,
) {
    let events = observe(&mut people);
    assert_eq!(
        people.remove_at(index),
        Err(CollectionError::IndexOutOfRange { index, length: 3 })
    );
    assert_eq!(people.len(), 3);
    assert!(events.borrow().is_empty());
}

#[rstest]
fn test_failed_add_leaves_list_unchanged(mut people: ObservableSortedList<&'static str, char>) {
    let before: Vec<(&str, char)> = people.iter().map(|(key, value)| (*key, *value)).collect();
    let events = observe(&mut people);

    assert_eq!(people.add("Bob", 'X'), Err(CollectionError::DuplicateKey));

    let after: Vec<(&str, char)> = people.iter().map(|(key, value)| (*key, *value)).collect();
    assert_eq!(before, after);
    assert!(events.borrow().is_empty());
}

// =============================================================================
// Notifications
// =============================================================================

#[rstest]
fn test_one_event_per_mutation(mut empty: ObservableSortedList<&'static str, char>) {
    let events = observe(&mut empty);

    empty.add("Bob", 'B').unwrap();
    empty.add("Ann", 'A').unwrap();
    empty.add("Cid", 'C').unwrap();
    empty.remove_at(1).unwrap();
    assert!(empty.remove(&"Cid"));
    empty.clear();

    assert_eq!(
        *events.borrow(),
        vec![
            (ChangeKind::Add, Some('B'), Some(0)),
            (ChangeKind::Add, Some('A'), Some(0)),
            (ChangeKind::Add, Some('C'), Some(2)),
            (ChangeKind::Remove, None, Some(1)),
            (ChangeKind::Remove, Some('C'), Some(1)),
            (ChangeKind::Reset, None, None),
        ]
    );
}

#[rstest]
fn test_handler_sees_updated_storage(mut people: ObservableSortedList<&'static str, char>) {
    // Handlers cannot borrow the list, so they record what the change says
    // and the test checks it against the list afterwards.
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    people.subscribe(move |change| {
        if let CollectionChange::Add { value, index } = change {
            *sink.borrow_mut() = Some((**value, *index));
        }
    });

    people.add("Bea", 'b').unwrap();
    let (value, index) = seen.borrow().unwrap();
    assert_eq!(people.value_at(index), Some(&value));
}

#[rstest]
fn test_property_signals_precede_each_change(
    mut people: ObservableSortedList<&'static str, char>,
) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    people.subscribe_property_changed(move |property| {
        sink.borrow_mut().push(property.name().to_string());
    });
    let sink = Rc::clone(&log);
    people.subscribe(move |change| {
        sink.borrow_mut().push(format!("{:?}", change.kind()));
    });

    people.add("Dan", 'D').unwrap();
    people.clear();

    assert_eq!(
        *log.borrow(),
        vec!["Count", "Item[]", "Add", "Count", "Item[]", "Reset"]
    );
}

#[rstest]
fn test_failed_operations_are_silent(mut people: ObservableSortedList<&'static str, char>) {
    let properties = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&properties);
    people.subscribe_property_changed(move |_| *sink.borrow_mut() += 1);
    let events = observe(&mut people);

    let _ = people.add("Ann", 'x');
    let _ = people.remove_at(9);
    assert!(!people.remove(&"Zed"));

    assert_eq!(*properties.borrow(), 0);
    assert!(events.borrow().is_empty());
}

#[rstest]
fn test_unsubscribe_stops_delivery(mut people: ObservableSortedList<&'static str, char>) {
    let events = observe(&mut people);
    let property_calls = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&property_calls);
    let property_id = people.subscribe_property_changed(move |_| *sink.borrow_mut() += 1);

    people.add("Dan", 'D').unwrap();
    assert!(people.unsubscribe_property_changed(property_id));
    assert!(!people.unsubscribe_property_changed(property_id));
    people.add("Eve", 'E').unwrap();

    assert_eq!(*property_calls.borrow(), 2);
    assert_eq!(events.borrow().len(), 2);
}

#[rstest]
fn test_handlers_run_in_registration_order(mut empty: ObservableSortedList<&'static str, char>) {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut ids = Vec::new();
    for name in ["first", "second", "third"] {
        let sink = Rc::clone(&order);
        ids.push(empty.subscribe(move |_| sink.borrow_mut().push(name)));
    }
    assert_eq!(empty.subscriber_count(), 3);

    empty.add("Ann", 'A').unwrap();
    assert!(empty.unsubscribe(ids[1]));
    empty.add("Bob", 'B').unwrap();

    assert_eq!(
        *order.borrow(),
        vec!["first", "second", "third", "first", "third"]
    );
}

#[rstest]
fn test_clear_on_empty_still_resets(mut empty: ObservableSortedList<&'static str, char>) {
    let events = observe(&mut empty);
    empty.clear();
    assert_eq!(*events.borrow(), vec![(ChangeKind::Reset, None, None)]);
}

// =============================================================================
// Capacity and Formatting
// =============================================================================

#[rstest]
fn test_capacity() {
    let mut list: ObservableSortedList<i32, i32> = ObservableSortedList::with_capacity(64);
    assert!(list.capacity() >= 64);
    list.add(1, 1).unwrap();
    list.shrink_to_fit();
    assert!(list.capacity() >= 1);
    assert_eq!(list.len(), 1);
}

#[rstest]
fn test_formatting(people: ObservableSortedList<&'static str, char>) {
    assert_eq!(people.to_string(), "{Ann: A, Bob: B, Cid: C}");
    assert_eq!(
        format!("{people:?}"),
        r#"{"Ann": 'A', "Bob": 'B', "Cid": 'C'}"#
    );
}

#[rstest]
fn test_default_is_empty() {
    let list: ObservableSortedList<u8, u8> = ObservableSortedList::default();
    assert!(list.is_empty());
}
