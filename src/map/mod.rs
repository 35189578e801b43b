//! Ordered maps layered over [`RedBlackTree`].
//!
//! - [`OrderedMap`]: unique keys, enforced by a lookup before every insert
//! - [`OrderedMultiMap`]: equal keys kept side by side in insertion order
//!
//! Both delegate all structural work to the tree and hand out the tree's
//! [`Cursor`] and [`Position`] types unchanged.
//!
//! # Examples
//!
//! ```rust
//! use rbmap::map::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! map.insert(3, "c");
//! map.insert(1, "a");
//! map.insert(2, "b");
//!
//! let entries: Vec<(&i32, &&str)> = map.iter().collect();
//! assert_eq!(entries, vec![(&1, &"a"), (&2, &"b"), (&3, &"c")]);
//!
//! let position = map.find(&2).position();
//! map.erase(position).unwrap();
//! assert!(map.at(&2).is_err());
//! ```

#[cfg(feature = "multimap")]
mod multimap;

#[cfg(feature = "multimap")]
pub use multimap::EqualRange;
#[cfg(feature = "multimap")]
pub use multimap::OrderedMultiMap;

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::error::{InvalidIteratorError, KeyNotFoundError};
use crate::tree::{Cursor, IntoIter, Iter, IterMut, Keys, Position, RedBlackTree, Values, ValuesMut};

// =============================================================================
// OrderedMap Definition
// =============================================================================

/// An ordered map with unique keys.
///
/// Uniqueness is enforced here, not in the tree: [`Self::insert`] looks the
/// key up first and only reaches the tree's duplicate-tolerant insert when
/// the key is absent.
///
/// # Time Complexity
///
/// | Operation                 | Complexity |
/// |---------------------------|------------|
/// | `at` / `get` / `contains` | O(log N)   |
/// | `insert`                  | O(log N)   |
/// | `insert_or_assign`        | O(log N)   |
/// | `erase` / `remove`        | O(log N)   |
/// | `merge`                   | O(M log N) |
/// | `len` / `is_empty`        | O(1)       |
///
/// # Examples
///
/// ```rust
/// use rbmap::map::OrderedMap;
///
/// let mut map = OrderedMap::from([(1, "a"), (2, "b")]);
/// assert_eq!(map.at(&1), Ok(&"a"));
///
/// let (_, inserted) = map.insert(1, "z");
/// assert!(!inserted);
/// assert_eq!(map.at(&1), Ok(&"a"));
/// ```
pub struct OrderedMap<K, V> {
    tree: RedBlackTree<K, V>,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::map::OrderedMap;
    ///
    /// let map: OrderedMap<i32, String> = OrderedMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: RedBlackTree::new(),
        }
    }

    /// Returns the number of entries.
    ///
    /// Equal to the number of steps from `begin()` to `end()`.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Upper bound on the number of entries a map of this type can hold.
    #[inline]
    #[must_use]
    pub const fn max_len() -> usize {
        RedBlackTree::<K, V>::max_len()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Exchanges the contents of two maps in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// The underlying tree.
    #[inline]
    #[must_use]
    pub const fn as_tree(&self) -> &RedBlackTree<K, V> {
        &self.tree
    }

    /// Cursor at the smallest key, or at the end if the map is empty.
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, K, V> {
        self.tree.begin()
    }

    /// Cursor at the end state.
    #[must_use]
    pub fn end(&self) -> Cursor<'_, K, V> {
        self.tree.end()
    }

    /// Cursor at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIteratorError`] if the position is stale, foreign or
    /// detached.
    pub fn cursor_at(&self, position: Position) -> Result<Cursor<'_, K, V>, InvalidIteratorError> {
        self.tree.cursor_at(position)
    }

    /// Entry at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIteratorError`] if the position names no live entry.
    pub fn get_at(&self, position: Position) -> Result<(&K, &V), InvalidIteratorError> {
        self.tree.get_at(position)
    }

    /// Mutable value at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIteratorError`] if the position names no live entry.
    pub fn get_at_mut(&mut self, position: Position) -> Result<&mut V, InvalidIteratorError> {
        self.tree.get_at_mut(position)
    }

    /// Removes the entry at `position` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIteratorError`] if `position` is the end position, was
    /// produced by another map, or names an entry that is already gone.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::map::OrderedMap;
    ///
    /// let mut map = OrderedMap::from([(1, "a"), (2, "b")]);
    /// let position = map.find(&1).position();
    /// assert_eq!(map.erase(position), Ok((1, "a")));
    /// assert!(map.erase(map.end().position()).is_err());
    /// ```
    pub fn erase(&mut self, position: Position) -> Result<(K, V), InvalidIteratorError> {
        self.tree.erase(position)
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.tree.first()
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.tree.last()
    }

    /// Iterates over entries in key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// Iterates over entries in key order with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.tree.iter_mut()
    }

    /// Iterates over keys in order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        self.tree.keys()
    }

    /// Iterates over values in key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        self.tree.values()
    }

    /// Iterates over values in key order, mutably.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        self.tree.values_mut()
    }
}

impl<K: Ord, V> OrderedMap<K, V> {
    /// Returns a reference to the value for `key`.
    ///
    /// Never mutates the map.
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFoundError`] carrying a copy of `key` if it is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::map::OrderedMap;
    ///
    /// let map = OrderedMap::from([(1, "one")]);
    /// assert_eq!(map.at(&1), Ok(&"one"));
    /// assert_eq!(map.at(&2).unwrap_err().key, 2);
    /// ```
    pub fn at(&self, key: &K) -> Result<&V, KeyNotFoundError<K>>
    where
        K: Clone,
    {
        self.tree
            .get(key)
            .ok_or_else(|| KeyNotFoundError { key: key.clone() })
    }

    /// Mutable counterpart of [`Self::at`].
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFoundError`] carrying a copy of `key` if it is absent.
    pub fn at_mut(&mut self, key: &K) -> Result<&mut V, KeyNotFoundError<K>>
    where
        K: Clone,
    {
        self.tree
            .get_mut(key)
            .ok_or_else(|| KeyNotFoundError { key: key.clone() })
    }

    /// Returns the value for `key`, inserting `V::default()` first if the key
    /// is absent. Never fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::map::OrderedMap;
    ///
    /// let mut counts: OrderedMap<&str, u32> = OrderedMap::new();
    /// *counts.get_or_insert_default("apple") += 1;
    /// *counts.get_or_insert_default("apple") += 1;
    /// assert_eq!(counts.at(&"apple"), Ok(&2));
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let id = match self.tree.find_node(&key) {
            Some(id) => id,
            None => self.tree.insert_node(key, V::default()),
        };
        &mut self.tree.node_mut(id).value
    }

    /// Inserts `value` under `key` unless the key is already present.
    ///
    /// Returns the position of the entry for `key` and whether an insertion
    /// took place. When the key exists the stored value is left untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// let (position, inserted) = map.insert(1, "a");
    /// assert!(inserted);
    /// assert_eq!(map.get_at(position), Ok((&1, &"a")));
    ///
    /// let (again, inserted) = map.insert(1, "b");
    /// assert!(!inserted);
    /// assert_eq!(again, position);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (Position, bool) {
        if let Some(id) = self.tree.find_node(&key) {
            return (self.tree.position_of(id), false);
        }
        let id = self.tree.insert_node(key, value);
        (self.tree.position_of(id), true)
    }

    /// Inserts `value` under `key`, overwriting the stored value if the key
    /// is already present.
    ///
    /// The returned flag is always `true`, for a fresh insertion and for an
    /// overwrite alike, so it cannot tell the two apart. Check
    /// [`Self::contains`] beforehand, or use [`Self::insert`], when the
    /// difference matters.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert!(map.insert_or_assign(5, "x").1);
    /// assert!(map.insert_or_assign(5, "y").1);
    /// assert_eq!(map.at(&5), Ok(&"y"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (Position, bool) {
        let id = match self.tree.find_node(&key) {
            Some(id) => {
                self.tree.node_mut(id).value = value;
                id
            }
            None => self.tree.insert_node(key, value),
        };
        (self.tree.position_of(id), true)
    }

    /// Applies [`Self::insert`] to every pair in order and returns the
    /// per-pair results in the same order.
    ///
    /// A later pair whose key appeared earlier is not inserted and reports the
    /// position of the earlier entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::map::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// let results = map.insert_many([(1, 'a'), (2, 'b'), (1, 'c')]);
    /// let flags: Vec<bool> = results.iter().map(|(_, inserted)| *inserted).collect();
    /// assert_eq!(flags, vec![true, true, false]);
    /// assert_eq!(results[2].0, results[0].0);
    /// ```
    pub fn insert_many<I>(&mut self, pairs: I) -> Vec<(Position, bool)>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .map(|(key, value)| self.insert(key, value))
            .collect()
    }

    /// Copies into `self` every entry of `other` whose key `self` lacks.
    ///
    /// `other` is left unchanged and entries already in `self` win.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::map::OrderedMap;
    ///
    /// let mut target = OrderedMap::from([(1, "mine"), (2, "mine")]);
    /// let source = OrderedMap::from([(2, "theirs"), (3, "theirs")]);
    /// target.merge(&source);
    ///
    /// assert_eq!(target.at(&2), Ok(&"mine"));
    /// assert_eq!(target.at(&3), Ok(&"theirs"));
    /// assert_eq!(source.len(), 2);
    /// ```
    pub fn merge(&mut self, other: &Self)
    where
        K: Clone,
        V: Clone,
    {
        let before = self.len();
        for (key, value) in other {
            if !self.contains(key) {
                self.tree.insert_node(key.clone(), value.clone());
            }
        }
        debug!(
            offered = other.len(),
            merged = self.len() - before,
            "merged ordered map"
        );
    }

    /// Returns `true` if the map has an entry for `key`.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains_key(key)
    }

    /// Returns the value for `key`, if any.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key)
    }

    /// Returns the value for `key` mutably, if any.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get_mut(key)
    }

    /// Removes the entry for `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(key).map(|(_, value)| value)
    }

    /// Cursor at the entry for `key`, or at the end.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key)
    }

    /// Cursor at the first entry whose key is `>= key`, or at the end.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.lower_bound(key)
    }

    /// Cursor at the first entry whose key is `> key`, or at the end.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.upper_bound(key)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for OrderedMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for OrderedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

/// Later pairs whose key already appeared are ignored.
impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// Pairs whose key is already present are ignored.
impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V> {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut OrderedMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

/// Hashes the length followed by every entry in key order, so equal maps
/// hash equally regardless of insertion order.
impl<K: Hash, V: Hash> Hash for OrderedMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for OrderedMap<K, V> {
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
impl<K, V> serde::Serialize for OrderedMap<K, V>
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
struct OrderedMapVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for OrderedMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    type Value = OrderedMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        // The first occurrence of a duplicated key wins, as with `insert`.
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for OrderedMap<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IteratorErrorKind;
    use rstest::rstest;

    fn abc() -> OrderedMap<i32, String> {
        OrderedMap::from([
            (1, "a".to_string()),
            (2, "b".to_string()),
            (3, "c".to_string()),
        ])
    }

    #[rstest]
    fn test_display_empty() {
        let map: OrderedMap<i32, String> = OrderedMap::new();
        assert_eq!(format!("{map}"), "{}");
    }

    #[rstest]
    fn test_display_sorted() {
        let map = OrderedMap::from([(3, "three"), (1, "one"), (2, "two")]);
        assert_eq!(format!("{map}"), "{1: one, 2: two, 3: three}");
    }

    #[rstest]
    fn test_insert_rejects_duplicate_and_keeps_value() {
        let mut map = abc();
        let (position, inserted) = map.insert(2, "z".to_string());
        assert!(!inserted);
        assert_eq!(map.get_at(position), Ok((&2, &"b".to_string())));
        assert_eq!(map.len(), 3);
        assert!(map.as_tree().verify().is_ok());
    }

    #[rstest]
    fn test_at_missing_key_carries_key() {
        let map = abc();
        let error = map.at(&9).unwrap_err();
        assert_eq!(error, KeyNotFoundError { key: 9 });
    }

    #[rstest]
    fn test_at_mut_updates_value() {
        let mut map = abc();
        map.at_mut(&1).unwrap().push('!');
        assert_eq!(map.at(&1), Ok(&"a!".to_string()));
        assert!(map.at_mut(&7).is_err());
    }

    #[rstest]
    fn test_get_or_insert_default_creates_once() {
        let mut map: OrderedMap<&str, Vec<i32>> = OrderedMap::new();
        map.get_or_insert_default("xs").push(1);
        map.get_or_insert_default("xs").push(2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.at(&"xs"), Ok(&vec![1, 2]));
    }

    #[rstest]
    fn test_get_or_insert_default_existing_returns_same_slot() {
        let mut map = abc();
        let first: *const String = map.get_or_insert_default(2);
        let second: *const String = map.get_or_insert_default(2);
        assert!(std::ptr::eq(first, second));
        assert_eq!(map.len(), 3);
        assert_eq!(map.at(&2), Ok(&"b".to_string()));
    }

    #[rstest]
    fn test_insert_or_assign_overwrites_in_place() {
        let mut map = abc();
        let before = map.find(&2).position();
        let (after, flag) = map.insert_or_assign(2, "B".to_string());
        assert!(flag);
        assert_eq!(before, after);
        assert_eq!(map.at(&2), Ok(&"B".to_string()));
        assert_eq!(map.len(), 3);
    }

    #[rstest]
    fn test_erase_through_find_position() {
        let mut map = abc();
        let position = map.find(&2).position();
        assert_eq!(map.erase(position), Ok((2, "b".to_string())));
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(
            map.erase(position),
            Err(InvalidIteratorError::new(IteratorErrorKind::Stale))
        );
    }

    #[rstest]
    fn test_erase_end_is_rejected() {
        let mut map = abc();
        let end = map.end().position();
        assert_eq!(
            map.erase(end),
            Err(InvalidIteratorError::new(IteratorErrorKind::End))
        );
        assert_eq!(map.len(), 3);
    }

    #[rstest]
    fn test_merge_is_copy_merge() {
        let mut target = OrderedMap::from([(1, 'x'), (4, 'x')]);
        let source = OrderedMap::from([(1, 'y'), (2, 'y'), (3, 'y')]);
        target.merge(&source);
        assert_eq!(
            target.iter().map(|(&k, &v)| (k, v)).collect::<Vec<_>>(),
            vec![(1, 'x'), (2, 'y'), (3, 'y'), (4, 'x')]
        );
        assert_eq!(source.len(), 3);
        assert_eq!(source.at(&1), Ok(&'y'));
    }

    #[rstest]
    fn test_merge_with_self_clone_is_noop() {
        let mut map = abc();
        let copy = map.clone();
        map.merge(&copy);
        assert_eq!(map, copy);
    }

    #[rstest]
    fn test_from_iter_ignores_later_duplicates() {
        let map: OrderedMap<i32, char> = [(1, 'a'), (1, 'b'), (2, 'c')].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.at(&1), Ok(&'a'));
    }

    #[rstest]
    fn test_remove_returns_value() {
        let mut map = abc();
        assert_eq!(map.remove(&1), Some("a".to_string()));
        assert_eq!(map.remove(&1), None);
    }

    #[rstest]
    fn test_swap_and_clear() {
        let mut left = abc();
        let mut right = OrderedMap::new();
        left.swap(&mut right);
        assert!(left.is_empty());
        assert_eq!(right.len(), 3);
        right.clear();
        assert!(right.is_empty());
        assert_eq!(right, OrderedMap::new());
    }

    #[rstest]
    fn test_bounds_and_first_last() {
        let map = OrderedMap::from([(10, ()), (20, ()), (30, ())]);
        assert_eq!(map.lower_bound(&15).key(), Ok(&20));
        assert_eq!(map.upper_bound(&20).key(), Ok(&30));
        assert!(map.upper_bound(&30).is_end());
        assert_eq!(map.first().map(|(k, _)| *k), Some(10));
        assert_eq!(map.last().map(|(k, _)| *k), Some(30));
    }

    #[rstest]
    fn test_borrowed_lookup() {
        let map = OrderedMap::from([("alpha".to_string(), 1), ("beta".to_string(), 2)]);
        assert!(map.contains("alpha"));
        assert_eq!(map.get("beta"), Some(&2));
        assert!(map.find("gamma").is_end());
    }

    #[rstest]
    fn test_max_len_matches_tree_and_exceeds_len() {
        let map = abc();
        assert_eq!(
            OrderedMap::<i32, String>::max_len(),
            RedBlackTree::<i32, String>::max_len()
        );
        assert!(OrderedMap::<i32, String>::max_len() > map.len());
    }

    #[rstest]
    fn test_hash_ignores_insertion_order() {
        use std::collections::hash_map::DefaultHasher;

        let forward: OrderedMap<i32, i32> = (0..10).map(|k| (k, k)).collect();
        let backward: OrderedMap<i32, i32> = (0..10).rev().map(|k| (k, k)).collect();
        let mut forward_hasher = DefaultHasher::new();
        let mut backward_hasher = DefaultHasher::new();
        forward.hash(&mut forward_hasher);
        backward.hash(&mut backward_hasher);
        assert_eq!(forward, backward);
        assert_eq!(forward_hasher.finish(), backward_hasher.finish());
    }
}
