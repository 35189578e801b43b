#![cfg(feature = "multimap")]
//! Example-based tests for OrderedMultiMap.

use rbmap::map::OrderedMultiMap;
use rstest::{fixture, rstest};

#[fixture]
fn events() -> OrderedMultiMap<u32, &'static str> {
    let mut map = OrderedMultiMap::new();
    map.insert(10, "boot");
    map.insert(20, "login");
    map.insert(10, "mount");
    map.insert(30, "logout");
    map.insert(20, "sync");
    map
}

#[rstest]
fn test_iteration_groups_equal_keys(events: OrderedMultiMap<u32, &'static str>) {
    let entries: Vec<(u32, &str)> = events.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(
        entries,
        vec![
            (10, "boot"),
            (10, "mount"),
            (20, "login"),
            (20, "sync"),
            (30, "logout"),
        ]
    );
    assert_eq!(events.len(), 5);
}

#[rstest]
fn test_equal_range_of_absent_key_is_empty(events: OrderedMultiMap<u32, &'static str>) {
    assert_eq!(events.equal_range(&15).count(), 0);
    assert_eq!(events.equal_range(&99).count(), 0);
    assert!(!events.contains_key(&15));
}

#[rstest]
fn test_first_of_and_last_of_bracket_the_group(events: OrderedMultiMap<u32, &'static str>) {
    let first = events.first_of(&20);
    let last = events.last_of(&20);
    assert_eq!(first.value(), Ok(&"login"));
    assert_eq!(last.value(), Ok(&"sync"));
    assert!(first.peek_next() == last);
}

#[rstest]
fn test_remove_all_then_insert_again(mut events: OrderedMultiMap<u32, &'static str>) {
    assert_eq!(events.remove_all(&10), vec!["boot", "mount"]);
    assert_eq!(events.count(&10), 0);
    events.insert(10, "reboot");
    assert_eq!(events.count(&10), 1);
    assert_eq!(events.begin().value(), Ok(&"reboot"));
    assert!(events.as_tree().verify().is_ok());
}

#[rstest]
fn test_erase_by_position_removes_only_that_entry(
    mut events: OrderedMultiMap<u32, &'static str>,
) {
    let position = events.first_of(&20).position();
    assert_eq!(events.erase(position), Ok((20, "login")));
    assert_eq!(events.equal_range(&20).map(|(_, v)| *v).collect::<Vec<_>>(), vec!["sync"]);
    assert!(events.erase(position).is_err());
}

#[rstest]
fn test_clone_and_equality(events: OrderedMultiMap<u32, &'static str>) {
    let mut copy = events.clone();
    assert_eq!(copy, events);
    copy.insert(10, "extra");
    assert_ne!(copy, events);
    assert_eq!(events.count(&10), 2);
}

#[rstest]
fn test_into_iter_drains_in_order(events: OrderedMultiMap<u32, &'static str>) {
    let keys: Vec<u32> = events.into_iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec![10, 10, 20, 20, 30]);
}
