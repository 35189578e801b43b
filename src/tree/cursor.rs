//! Positional access: detached [`Position`] handles and borrowing [`Cursor`]s.
//!
//! A cursor walks the circular sequence formed by the entries in key order
//! followed by a single end state:
//!
//! ```text
//! min -> ... -> max -> end -> min -> ...
//! ```
//!
//! The end state is distinct from every entry, so in a tree holding exactly
//! one entry `begin()` and `end()` still compare unequal.
//!
//! A cursor borrows its tree, which keeps it from outliving a mutation. To
//! carry a location across a mutation (for example to erase what a lookup
//! found) take its [`Position`] and resolve it again with
//! [`RedBlackTree::cursor_at`].

use std::fmt;
use std::ptr;

use super::node::NodeId;
use super::rbtree::{RedBlackTree, TreeId};
use crate::error::{InvalidIteratorError, IteratorErrorKind};

// =============================================================================
// Position
// =============================================================================

/// A detached handle to an entry of a tree, or to its end.
///
/// Positions are `Copy` and hold no borrow. A position stays usable for as
/// long as the entry it names is in the tree; once that entry is erased the
/// position is reported as stale, and a position presented to a tree that did
/// not produce it is reported as foreign. `Position::default()` belongs to no
/// tree at all.
///
/// # Examples
///
/// ```rust
/// use rbmap::tree::RedBlackTree;
/// use rbmap::error::IteratorErrorKind;
///
/// let mut tree = RedBlackTree::new();
/// let position = tree.insert(1, "one");
/// tree.insert(2, "two");
/// assert_eq!(tree.get_at(position), Ok((&1, &"one")));
///
/// tree.erase(position).unwrap();
/// assert_eq!(tree.get_at(position).unwrap_err().kind, IteratorErrorKind::Stale);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Position {
    tree: Option<TreeId>,
    slot: Option<(usize, u32)>,
}

impl Position {
    pub(crate) const fn at(tree: TreeId, id: NodeId, version: u32) -> Self {
        Self {
            tree: Some(tree),
            slot: Some((id.index(), version)),
        }
    }

    pub(crate) const fn end(tree: TreeId) -> Self {
        Self {
            tree: Some(tree),
            slot: None,
        }
    }

    /// Returns `true` for an end position (including a detached one).
    #[inline]
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.slot.is_none()
    }

    #[inline]
    pub(crate) const fn tree(&self) -> Option<TreeId> {
        self.tree
    }

    #[inline]
    pub(crate) const fn slot(&self) -> Option<(usize, u32)> {
        self.slot
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// A bidirectional, wrap-around cursor over a [`RedBlackTree`].
///
/// The tree's minimum and maximum are captured when the cursor is created.
/// Two cursors are equal when they sit on the same node of the same tree, or
/// are both at the end of the same tree.
///
/// # Examples
///
/// ```rust
/// use rbmap::tree::RedBlackTree;
///
/// let tree: RedBlackTree<i32, char> = [(1, 'a'), (2, 'b')].into_iter().collect();
///
/// let mut cursor = tree.begin();
/// assert_eq!(cursor.key(), Ok(&1));
/// cursor.move_next();
/// assert_eq!(cursor.key(), Ok(&2));
/// cursor.move_next();
/// assert!(cursor == tree.end());
/// cursor.move_next();
/// assert!(cursor == tree.begin());
/// ```
pub struct Cursor<'a, K, V> {
    tree: &'a RedBlackTree<K, V>,
    current: Option<NodeId>,
    min: Option<NodeId>,
    max: Option<NodeId>,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn new(tree: &'a RedBlackTree<K, V>, current: Option<NodeId>) -> Self {
        Self {
            tree,
            current,
            min: tree.min_node(),
            max: tree.max_node(),
        }
    }

    /// Returns `true` if the cursor is at the end state.
    #[inline]
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// The entry under the cursor.
    ///
    /// # Errors
    ///
    /// Fails with [`IteratorErrorKind::End`] at the end state.
    pub fn get(&self) -> Result<(&'a K, &'a V), InvalidIteratorError> {
        let tree = self.tree;
        self.current
            .map(|id| {
                let node = tree.node(id);
                (&node.key, &node.value)
            })
            .ok_or(InvalidIteratorError::new(IteratorErrorKind::End))
    }

    /// The key under the cursor.
    ///
    /// # Errors
    ///
    /// Fails with [`IteratorErrorKind::End`] at the end state.
    pub fn key(&self) -> Result<&'a K, InvalidIteratorError> {
        self.get().map(|(key, _)| key)
    }

    /// The value under the cursor.
    ///
    /// # Errors
    ///
    /// Fails with [`IteratorErrorKind::End`] at the end state.
    pub fn value(&self) -> Result<&'a V, InvalidIteratorError> {
        self.get().map(|(_, value)| value)
    }

    /// A detached handle to the cursor's location.
    #[must_use]
    pub fn position(&self) -> Position {
        self.current
            .map_or_else(|| self.tree.end_position(), |id| self.tree.position_of(id))
    }

    /// Advances to the next entry in key order.
    ///
    /// From the maximum the cursor moves to the end state; from the end state
    /// it wraps to the minimum.
    pub fn move_next(&mut self) {
        self.current = match self.current {
            None => self.min,
            Some(id) if Some(id) == self.max => None,
            Some(id) => self.tree.successor(id),
        };
    }

    /// Retreats to the previous entry in key order.
    ///
    /// From the minimum the cursor moves to the end state; from the end state
    /// it wraps to the maximum.
    pub fn move_prev(&mut self) {
        self.current = match self.current {
            None => self.max,
            Some(id) if Some(id) == self.min => None,
            Some(id) => self.tree.predecessor(id),
        };
    }

    /// Returns a copy of this cursor moved one step forward.
    #[must_use]
    pub fn peek_next(&self) -> Self {
        let mut cursor = *self;
        cursor.move_next();
        cursor
    }

    /// Returns a copy of this cursor moved one step back.
    #[must_use]
    pub fn peek_prev(&self) -> Self {
        let mut cursor = *self;
        cursor.move_prev();
        cursor
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.current == other.current
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Ok((key, value)) => formatter
                .debug_struct("Cursor")
                .field("key", key)
                .field("value", value)
                .finish(),
            Err(_) => formatter.write_str("Cursor(end)"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
