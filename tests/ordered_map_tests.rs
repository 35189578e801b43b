#![cfg(feature = "map")]
//! Example-based tests for OrderedMap.

use rbmap::error::{InvalidIteratorError, IteratorErrorKind, KeyNotFoundError, MapError};
use rbmap::map::OrderedMap;
use rstest::{fixture, rstest};

// =============================================================================
// Fixtures
// =============================================================================

#[fixture]
fn letters() -> OrderedMap<i32, String> {
    let mut map = OrderedMap::new();
    map.insert(1, "a".to_string());
    map.insert(2, "b".to_string());
    map.insert(3, "c".to_string());
    map
}

fn entries(map: &OrderedMap<i32, String>) -> Vec<(i32, String)> {
    map.iter().map(|(key, value)| (*key, value.clone())).collect()
}

// =============================================================================
// Construction Tests
// =============================================================================

#[rstest]
fn test_new_map_is_empty() {
    let map: OrderedMap<i32, String> = OrderedMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert!(map.begin() == map.end());
}

#[rstest]
fn test_default_equals_new() {
    assert_eq!(OrderedMap::<i32, i32>::default(), OrderedMap::new());
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[rstest]
fn test_insert_then_erase_middle_key(mut letters: OrderedMap<i32, String>) {
    assert_eq!(
        entries(&letters),
        vec![(1, "a".to_string()), (2, "b".to_string()), (3, "c".to_string())]
    );

    let position = letters.find(&2).position();
    letters.erase(position).unwrap();

    assert_eq!(entries(&letters), vec![(1, "a".to_string()), (3, "c".to_string())]);
    assert_eq!(letters.at(&2), Err(KeyNotFoundError { key: 2 }));
}

#[rstest]
fn test_insert_or_assign_overwrites_without_growing() {
    let mut map = OrderedMap::new();
    map.insert_or_assign(5, "x");
    assert_eq!(map.len(), 1);
    map.insert_or_assign(5, "y");
    assert_eq!(map.len(), 1);
    assert_eq!(map.at(&5), Ok(&"y"));
}

// =============================================================================
// Keyed Access Tests
// =============================================================================

#[rstest]
fn test_at_after_insert_and_after_erase(mut letters: OrderedMap<i32, String>) {
    assert_eq!(letters.at(&3), Ok(&"c".to_string()));
    letters.remove(&3);
    let error = letters.at(&3).unwrap_err();
    assert_eq!(error.key, 3);
    assert_eq!(error.to_string(), "key not found: 3");
}

#[rstest]
fn test_at_never_mutates(letters: OrderedMap<i32, String>) {
    let before = letters.clone();
    let _ = letters.at(&10);
    assert_eq!(letters, before);
}

#[rstest]
fn test_get_or_insert_default_on_existing_key_is_stable(mut letters: OrderedMap<i32, String>) {
    let first: *const String = letters.get_or_insert_default(1);
    let second: *const String = letters.get_or_insert_default(1);
    assert!(std::ptr::eq(first, second));
    assert_eq!(letters.len(), 3);
    assert_eq!(letters.at(&1), Ok(&"a".to_string()));
}

#[rstest]
fn test_get_or_insert_default_on_missing_key_adds_one(mut letters: OrderedMap<i32, String>) {
    assert!(letters.get_or_insert_default(9).is_empty());
    assert!(letters.contains(&9));
    assert_eq!(letters.len(), 4);
}

#[rstest]
fn test_errors_unify_under_map_error(mut letters: OrderedMap<i32, String>) {
    fn take_first(map: &mut OrderedMap<i32, String>) -> Result<String, MapError<i32>> {
        let value = map.at(&1)?.clone();
        let position = map.find(&1).position();
        map.erase(position)?;
        map.erase(position)?;
        Ok(value)
    }

    assert_eq!(
        take_first(&mut letters),
        Err(MapError::InvalidIterator(InvalidIteratorError::new(
            IteratorErrorKind::Stale
        )))
    );
    let mut empty = OrderedMap::new();
    assert_eq!(
        take_first(&mut empty),
        Err(MapError::KeyNotFound(KeyNotFoundError { key: 1 }))
    );
}

// =============================================================================
// Insert Tests
// =============================================================================

#[rstest]
fn test_insert_reports_existing_position(mut letters: OrderedMap<i32, String>) {
    let existing = letters.find(&2).position();
    let (position, inserted) = letters.insert(2, "other".to_string());
    assert!(!inserted);
    assert_eq!(position, existing);
    assert_eq!(letters.at(&2), Ok(&"b".to_string()));
}

#[rstest]
fn test_insert_many_preserves_argument_order() {
    let mut map = OrderedMap::new();
    map.insert(20, 'x');
    let results = map.insert_many([(30, 'a'), (10, 'b'), (20, 'c'), (10, 'd')]);

    let flags: Vec<bool> = results.iter().map(|(_, inserted)| *inserted).collect();
    assert_eq!(flags, vec![true, true, false, false]);

    let keys: Vec<i32> = results
        .iter()
        .map(|(position, _)| *map.get_at(*position).unwrap().0)
        .collect();
    assert_eq!(keys, vec![30, 10, 20, 10]);
    assert_eq!(map.at(&20), Ok(&'x'));
}

// =============================================================================
// Erase Tests
// =============================================================================

#[rstest]
fn test_erase_end_position_fails(mut letters: OrderedMap<i32, String>) {
    let end = letters.end().position();
    assert_eq!(
        letters.erase(end).unwrap_err().kind,
        IteratorErrorKind::End
    );
}

#[rstest]
fn test_erase_position_from_other_map_fails(mut letters: OrderedMap<i32, String>) {
    let other = letters.clone();
    let foreign = other.find(&1).position();
    assert_eq!(
        letters.erase(foreign).unwrap_err().kind,
        IteratorErrorKind::Foreign
    );
    assert_eq!(letters.len(), 3);
}

#[rstest]
fn test_erase_every_key_leaves_fresh_map(mut letters: OrderedMap<i32, String>) {
    for key in [2, 1, 3] {
        let position = letters.find(&key).position();
        letters.erase(position).unwrap();
    }
    assert!(letters.is_empty());
    assert_eq!(letters, OrderedMap::new());
    assert!(letters.as_tree().verify().is_ok());
}

// =============================================================================
// Cursor Tests
// =============================================================================

#[rstest]
fn test_single_entry_begin_is_not_end() {
    let map = OrderedMap::from([(7, "seven")]);
    let mut cursor = map.begin();
    assert!(cursor != map.end());
    cursor.move_next();
    assert!(cursor == map.end());
}

#[rstest]
fn test_end_wraps_to_begin_and_back(letters: OrderedMap<i32, String>) {
    let mut cursor = letters.end();
    cursor.move_next();
    assert!(cursor == letters.begin());
    cursor.move_prev();
    assert!(cursor.is_end());
    cursor.move_prev();
    assert_eq!(cursor.key(), Ok(&3));
}

#[rstest]
fn test_len_matches_traversal_steps(letters: OrderedMap<i32, String>) {
    let mut steps = 0;
    let mut cursor = letters.begin();
    while cursor != letters.end() {
        steps += 1;
        cursor.move_next();
    }
    assert_eq!(steps, letters.len());
}

#[rstest]
#[case(0, Some(1), Some(1))]
#[case(2, Some(2), Some(3))]
#[case(3, Some(3), None)]
#[case(4, None, None)]
fn test_bounds(
    letters: OrderedMap<i32, String>,
    #[case] key: i32,
    #[case] lower: Option<i32>,
    #[case] upper: Option<i32>,
) {
    assert_eq!(letters.lower_bound(&key).key().ok().copied(), lower);
    assert_eq!(letters.upper_bound(&key).key().ok().copied(), upper);
}

// =============================================================================
// Merge and Copy Tests
// =============================================================================

#[rstest]
fn test_merge_leaves_other_untouched(mut letters: OrderedMap<i32, String>) {
    let other = OrderedMap::from([(3, "z".to_string()), (4, "d".to_string())]);
    let other_before = other.clone();
    letters.merge(&other);

    assert_eq!(other, other_before);
    assert_eq!(letters.len(), 4);
    assert_eq!(letters.at(&3), Ok(&"c".to_string()));
    assert_eq!(letters.at(&4), Ok(&"d".to_string()));
}

#[rstest]
fn test_clone_is_independent(letters: OrderedMap<i32, String>) {
    let mut copy = letters.clone();
    assert_eq!(entries(&copy), entries(&letters));

    copy.insert(4, "d".to_string());
    copy.remove(&1);
    *copy.at_mut(&2).unwrap() = "B".to_string();

    assert_eq!(
        entries(&letters),
        vec![(1, "a".to_string()), (2, "b".to_string()), (3, "c".to_string())]
    );
}

#[rstest]
fn test_take_moves_contents(mut letters: OrderedMap<i32, String>) {
    let moved = std::mem::take(&mut letters);
    assert!(letters.is_empty());
    assert_eq!(moved.len(), 3);
    letters.insert(1, "again".to_string());
    assert_eq!(letters.len(), 1);
}

// =============================================================================
// Formatting Tests
// =============================================================================

#[rstest]
fn test_debug_and_display(letters: OrderedMap<i32, String>) {
    assert_eq!(format!("{letters:?}"), r#"{1: "a", 2: "b", 3: "c"}"#);
    assert_eq!(format!("{letters}"), "{1: a, 2: b, 3: c}");
}
