//! An ordered map that keeps every entry, including equal keys.

use std::borrow::Borrow;
use std::fmt;
use std::iter::FusedIterator;

use tracing::debug;

use crate::error::InvalidIteratorError;
use crate::tree::{Cursor, IntoIter, Iter, Keys, Position, RedBlackTree, Values};

/// An ordered multimap.
///
/// Entries are sorted by key; entries with equal keys sit next to each other
/// in the order they were inserted.
///
/// # Examples
///
/// ```rust
/// use rbmap::map::OrderedMultiMap;
///
/// let mut index = OrderedMultiMap::new();
/// index.insert("fruit", "apple");
/// index.insert("veg", "leek");
/// index.insert("fruit", "pear");
///
/// let fruit: Vec<&&str> = index.equal_range(&"fruit").map(|(_, v)| v).collect();
/// assert_eq!(fruit, vec![&"apple", &"pear"]);
/// assert_eq!(index.count(&"fruit"), 2);
/// ```
pub struct OrderedMultiMap<K, V> {
    tree: RedBlackTree<K, V>,
}

impl<K, V> OrderedMultiMap<K, V> {
    /// Creates an empty multimap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: RedBlackTree::new(),
        }
    }

    /// Total number of entries, counting every duplicate.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Upper bound on the number of entries, duplicates included.
    #[inline]
    #[must_use]
    pub const fn max_len() -> usize {
        RedBlackTree::<K, V>::max_len()
    }

    /// Returns `true` if there are no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// The underlying tree.
    #[inline]
    #[must_use]
    pub const fn as_tree(&self) -> &RedBlackTree<K, V> {
        &self.tree
    }

    /// Cursor at the first entry.
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, K, V> {
        self.tree.begin()
    }

    /// Cursor at the end state.
    #[must_use]
    pub fn end(&self) -> Cursor<'_, K, V> {
        self.tree.end()
    }

    /// Entry at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIteratorError`] if the position names no live entry.
    pub fn get_at(&self, position: Position) -> Result<(&K, &V), InvalidIteratorError> {
        self.tree.get_at(position)
    }

    /// Removes the single entry at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIteratorError`] if the position names no live entry.
    pub fn erase(&mut self, position: Position) -> Result<(K, V), InvalidIteratorError> {
        self.tree.erase(position)
    }

    /// Iterates over every entry in key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// Iterates over keys, repeating duplicated keys.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        self.tree.keys()
    }

    /// Iterates over values in key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        self.tree.values()
    }
}

impl<K: Ord, V> OrderedMultiMap<K, V> {
    /// Adds an entry. Never rejects; an equal key is placed after the
    /// existing ones.
    pub fn insert(&mut self, key: K, value: V) -> Position {
        self.tree.insert(key, value)
    }

    /// Returns `true` if at least one entry has `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains_key(key)
    }

    /// Number of entries whose key equals `key`.
    #[must_use]
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.equal_range(key).count()
    }

    /// Iterates over the entries whose key equals `key`, in insertion order.
    pub fn equal_range<Q>(&self, key: &Q) -> EqualRange<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        EqualRange {
            cursor: self.tree.lower_bound(key),
            stop: self.tree.upper_bound(key),
        }
    }

    /// Cursor at the earliest inserted entry with `key`, or at the end.
    pub fn first_of<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let cursor = self.tree.lower_bound(key);
        match cursor.key() {
            Ok(found) if <K as Borrow<Q>>::borrow(found) == key => cursor,
            _ => self.tree.end(),
        }
    }

    /// Cursor at the latest inserted entry with `key`, or at the end.
    pub fn last_of<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find_last_match(key)
    }

    /// Removes every entry with `key` and returns their values in insertion
    /// order.
    pub fn remove_all<Q>(&mut self, key: &Q) -> Vec<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let positions: Vec<Position> = {
            let mut positions = Vec::new();
            let mut cursor = self.tree.lower_bound(key);
            let stop = self.tree.upper_bound(key);
            while cursor != stop {
                positions.push(cursor.position());
                cursor.move_next();
            }
            positions
        };

        let mut removed = Vec::with_capacity(positions.len());
        for position in positions {
            if let Ok((_, value)) = self.tree.erase(position) {
                removed.push(value);
            }
        }
        debug!(removed = removed.len(), "removed all entries for key");
        removed
    }
}

/// Iterator over the entries sharing one key, produced by
/// [`OrderedMultiMap::equal_range`].
pub struct EqualRange<'a, K, V> {
    cursor: Cursor<'a, K, V>,
    stop: Cursor<'a, K, V>,
}

impl<'a, K, V> Iterator for EqualRange<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == self.stop {
            return None;
        }
        let entry = self.cursor.get().ok()?;
        self.cursor.move_next();
        Some(entry)
    }
}

impl<K, V> FusedIterator for EqualRange<'_, K, V> {}

impl<K, V> Clone for EqualRange<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor,
            stop: self.stop,
        }
    }
}

impl<K, V> Default for OrderedMultiMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for OrderedMultiMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMultiMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            tree: iter.into_iter().collect(),
        }
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedMultiMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.tree.extend(iter);
    }
}

impl<K, V> IntoIterator for OrderedMultiMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMultiMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMultiMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMultiMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMultiMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

// A sequence of pairs, since a JSON-style map cannot hold repeated keys.
#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for OrderedMultiMap<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut sequence = serializer.serialize_seq(Some(self.len()))?;
        for entry in self {
            sequence.serialize_element(&entry)?;
        }
        sequence.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for OrderedMultiMap<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let pairs = Vec::<(K, V)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
