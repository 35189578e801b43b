//! The red-black tree engine.
//!
//! [`RedBlackTree`] is a mutable, duplicate-tolerant ordered tree. Keys equal
//! to an existing key are routed to the right on insertion, so equal keys keep
//! their insertion order and the tree can back both unique-key and multi-key
//! containers.
//!
//! - O(log N) insert, erase, find and bound queries
//! - O(1) len and `is_empty`
//! - O(N) clone and clear, both without recursion
//!
//! # Invariants
//!
//! 1. The root is black or the tree is empty
//! 2. No red node has a red child
//! 3. Every path from a node to a null link passes through the same number
//!    of black nodes
//!
//! Insertion restores them with the classical recolor/rotate cases and
//! erasure with the double-black fixup, so all three hold after every
//! operation. [`RedBlackTree::verify`] checks them.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::cursor::{Cursor, Position};
use super::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use super::node::{Arena, Color, Node, NodeId};
use crate::error::{InvalidIteratorError, InvariantViolation, IteratorErrorKind};

/// Identity of a tree instance, stamped into every [`Position`] it hands out.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct TreeId(u64);

impl TreeId {
    fn fresh() -> Self {
        static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);
        Self(NEXT_TREE_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// Where a copied node gets attached during [`Clone`].
#[derive(Clone, Copy)]
enum Attach {
    Root,
    Left(NodeId),
    Right(NodeId),
}

/// A mutable ordered tree balanced with red-black coloring.
///
/// The tree permits duplicate keys. Uniqueness is the business of the layer
/// above it (see `OrderedMap`).
///
/// # Time Complexity
///
/// | Operation                   | Complexity |
/// |-----------------------------|------------|
/// | `insert`                    | O(log N)   |
/// | `erase`                     | O(log N)   |
/// | `find` / `find_last_match`  | O(log N)   |
/// | `lower_bound`/`upper_bound` | O(log N)   |
/// | `first` / `last`            | O(log N)   |
/// | `len` / `is_empty`          | O(1)       |
/// | `clone` / `clear`           | O(N)       |
///
/// # Examples
///
/// ```rust
/// use rbmap::tree::RedBlackTree;
///
/// let mut tree = RedBlackTree::new();
/// tree.insert(2, "b");
/// tree.insert(1, "a");
/// tree.insert(2, "c");
///
/// let entries: Vec<(&i32, &&str)> = tree.iter().collect();
/// assert_eq!(entries, vec![(&1, &"a"), (&2, &"b"), (&2, &"c")]);
/// assert!(tree.verify().is_ok());
/// ```
pub struct RedBlackTree<K, V> {
    arena: Arena<K, V>,
    root: Option<NodeId>,
    length: usize,
    id: TreeId,
}

impl<K, V> RedBlackTree<K, V> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            length: 0,
            id: TreeId::fresh(),
        }
    }

    /// Returns the number of nodes in the tree.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree has no nodes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Upper bound on the number of entries this tree type can hold, set by
    /// the largest arena a `Vec` can allocate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RedBlackTree;
    ///
    /// assert!(RedBlackTree::<u64, u64>::max_len() > RedBlackTree::<u64, [u64; 8]>::max_len());
    /// ```
    #[must_use]
    pub const fn max_len() -> usize {
        Arena::<K, V>::max_slots()
    }

    /// Removes every node.
    ///
    /// Positions taken before the call become stale.
    pub fn clear(&mut self) {
        debug!(length = self.length, "clearing tree");
        self.arena.clear();
        self.root = None;
        self.length = 0;
    }

    /// Exchanges the contents of two trees in O(1).
    ///
    /// Positions follow their nodes: a position taken from `self` before the
    /// swap resolves against `other` afterwards.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    // -------------------------------------------------------------------------
    // Link accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        self.arena.node(id)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.arena.node_mut(id)
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[inline]
    fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).left
    }

    #[inline]
    fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).right
    }

    #[inline]
    fn color(&self, id: NodeId) -> Color {
        self.node(id).color
    }

    #[inline]
    fn set_color(&mut self, id: NodeId, color: Color) {
        self.node_mut(id).color = color;
    }

    /// A null link counts as black.
    #[inline]
    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.is_some_and(|id| self.node(id).is_red())
    }

    // -------------------------------------------------------------------------
    // Min / max and in-order neighbours
    // -------------------------------------------------------------------------

    /// Leftmost node of the whole tree.
    pub(crate) fn min_node(&self) -> Option<NodeId> {
        self.root.map(|root| self.subtree_min(root))
    }

    /// Rightmost node of the whole tree.
    pub(crate) fn max_node(&self) -> Option<NodeId> {
        self.root.map(|root| self.subtree_max(root))
    }

    /// Leftmost node of the subtree rooted at `id`.
    pub(crate) fn subtree_min(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.left(id) {
            id = left;
        }
        id
    }

    /// Rightmost node of the subtree rooted at `id`.
    pub(crate) fn subtree_max(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.right(id) {
            id = right;
        }
        id
    }

    /// In-order successor, or `None` after the maximum.
    pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.right(id) {
            return Some(self.subtree_min(right));
        }
        let mut child = id;
        let mut parent = self.parent(child);
        while let Some(ancestor) = parent {
            if self.right(ancestor) != Some(child) {
                break;
            }
            child = ancestor;
            parent = self.parent(ancestor);
        }
        parent
    }

    /// In-order predecessor, or `None` before the minimum.
    pub(crate) fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.left(id) {
            return Some(self.subtree_max(left));
        }
        let mut child = id;
        let mut parent = self.parent(child);
        while let Some(ancestor) = parent {
            if self.left(ancestor) != Some(child) {
                break;
            }
            child = ancestor;
            parent = self.parent(ancestor);
        }
        parent
    }

    /// Node ids in key order.
    pub(crate) fn in_order_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.length);
        let mut current = self.min_node();
        while let Some(id) = current {
            ids.push(id);
            current = self.successor(id);
        }
        ids
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.min_node().map(|id| {
            let node = self.node(id);
            (&node.key, &node.value)
        })
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.max_node().map(|id| {
            let node = self.node(id);
            (&node.key, &node.value)
        })
    }

    // -------------------------------------------------------------------------
    // Rotations
    // -------------------------------------------------------------------------

    /// Rotates left around `x`: `x`'s right child takes its place and `x`
    /// becomes that child's left child.
    fn left_rotate(&mut self, x: NodeId) {
        let Some(y) = self.right(x) else {
            return;
        };
        trace!(pivot = x.index(), "left rotation");

        let y_left = self.left(y);
        self.node_mut(x).right = y_left;
        if let Some(y_left) = y_left {
            self.node_mut(y_left).parent = Some(x);
        }

        let x_parent = self.parent(x);
        self.node_mut(y).parent = x_parent;
        match x_parent {
            None => self.root = Some(y),
            Some(parent) if self.left(parent) == Some(x) => self.node_mut(parent).left = Some(y),
            Some(parent) => self.node_mut(parent).right = Some(y),
        }

        self.node_mut(y).left = Some(x);
        self.node_mut(x).parent = Some(y);
    }

    /// Rotates right around `x`: mirror image of [`Self::left_rotate`].
    fn right_rotate(&mut self, x: NodeId) {
        let Some(y) = self.left(x) else {
            return;
        };
        trace!(pivot = x.index(), "right rotation");

        let y_right = self.right(y);
        self.node_mut(x).left = y_right;
        if let Some(y_right) = y_right {
            self.node_mut(y_right).parent = Some(x);
        }

        let x_parent = self.parent(x);
        self.node_mut(y).parent = x_parent;
        match x_parent {
            None => self.root = Some(y),
            Some(parent) if self.right(parent) == Some(x) => {
                self.node_mut(parent).right = Some(y);
            }
            Some(parent) => self.node_mut(parent).left = Some(y),
        }

        self.node_mut(y).right = Some(x);
        self.node_mut(x).parent = Some(y);
    }

    // -------------------------------------------------------------------------
    // Insertion
    // -------------------------------------------------------------------------

    /// Restores the invariants after `node` was linked in red.
    fn rebalance(&mut self, mut node: NodeId) {
        while let Some(mut parent) = self.parent(node) {
            if !self.node(parent).is_red() {
                break;
            }
            // A red parent without a parent is the root; it is painted below.
            let Some(grandparent) = self.parent(parent) else {
                break;
            };
            let parent_is_left = self.left(grandparent) == Some(parent);
            let uncle = if parent_is_left {
                self.right(grandparent)
            } else {
                self.left(grandparent)
            };

            if let Some(uncle) = uncle.filter(|&uncle| self.node(uncle).is_red()) {
                trace!(node = node.index(), "rebalance: red uncle, recolor");
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            if parent_is_left {
                if self.right(parent) == Some(node) {
                    trace!(node = node.index(), "rebalance: inner diagonal (left-right)");
                    self.left_rotate(parent);
                    std::mem::swap(&mut node, &mut parent);
                }
                trace!(node = node.index(), "rebalance: outer diagonal (left-left)");
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.right_rotate(grandparent);
            } else {
                if self.left(parent) == Some(node) {
                    trace!(node = node.index(), "rebalance: inner diagonal (right-left)");
                    self.right_rotate(parent);
                    std::mem::swap(&mut node, &mut parent);
                }
                trace!(node = node.index(), "rebalance: outer diagonal (right-right)");
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.left_rotate(grandparent);
            }
            break;
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    // -------------------------------------------------------------------------
    // Erasure
    // -------------------------------------------------------------------------

    /// Puts `replacement` into the slot `old` occupies under its parent.
    fn transplant(&mut self, old: NodeId, replacement: Option<NodeId>) {
        let parent = self.parent(old);
        match parent {
            None => self.root = replacement,
            Some(parent) if self.left(parent) == Some(old) => {
                self.node_mut(parent).left = replacement;
            }
            Some(parent) => self.node_mut(parent).right = replacement,
        }
        if let Some(replacement) = replacement {
            self.node_mut(replacement).parent = parent;
        }
    }

    /// Unlinks `target`, rebalances, and hands back its entry.
    pub(crate) fn remove_node(&mut self, target: NodeId) -> (K, V) {
        let target_left = self.left(target);
        let target_right = self.right(target);
        let mut removed_color = self.color(target);
        let fixup_node;
        let fixup_parent;

        match (target_left, target_right) {
            (None, None) => {
                trace!(node = target.index(), "erase: leaf");
                fixup_node = None;
                fixup_parent = self.parent(target);
                self.transplant(target, None);
            }
            (None, Some(child)) | (Some(child), None) => {
                trace!(node = target.index(), "erase: single child spliced up");
                fixup_node = Some(child);
                fixup_parent = self.parent(target);
                self.transplant(target, Some(child));
            }
            (Some(left), Some(right)) => {
                trace!(node = target.index(), "erase: two children, successor transplant");
                let successor = self.subtree_min(right);
                removed_color = self.color(successor);
                fixup_node = self.right(successor);

                if self.parent(successor) == Some(target) {
                    fixup_parent = Some(successor);
                } else {
                    fixup_parent = self.parent(successor);
                    self.transplant(successor, fixup_node);
                    self.node_mut(successor).right = Some(right);
                    self.node_mut(right).parent = Some(successor);
                }

                self.transplant(target, Some(successor));
                self.node_mut(successor).left = Some(left);
                self.node_mut(left).parent = Some(successor);
                let target_color = self.color(target);
                self.set_color(successor, target_color);
            }
        }

        if removed_color == Color::Black {
            self.erase_fixup(fixup_node, fixup_parent);
        }

        self.length -= 1;
        let node = self.arena.release(target);
        (node.key, node.value)
    }

    /// Resolves the extra black left on `node` (which may be a null link
    /// under `parent`) after a black node was removed.
    fn erase_fixup(&mut self, mut node: Option<NodeId>, mut parent: Option<NodeId>) {
        while node != self.root && !self.is_red(node) {
            let Some(current_parent) = parent else {
                break;
            };

            if node == self.left(current_parent) {
                let Some(mut sibling) = self.right(current_parent) else {
                    break;
                };
                if self.node(sibling).is_red() {
                    trace!(parent = current_parent.index(), "erase fixup: red sibling");
                    self.set_color(sibling, Color::Black);
                    self.set_color(current_parent, Color::Red);
                    self.left_rotate(current_parent);
                    let Some(next_sibling) = self.right(current_parent) else {
                        break;
                    };
                    sibling = next_sibling;
                }

                if !self.is_red(self.left(sibling)) && !self.is_red(self.right(sibling)) {
                    trace!(parent = current_parent.index(), "erase fixup: push black up");
                    self.set_color(sibling, Color::Red);
                    node = Some(current_parent);
                    parent = self.parent(current_parent);
                } else {
                    if !self.is_red(self.right(sibling)) {
                        trace!(parent = current_parent.index(), "erase fixup: near nephew red");
                        if let Some(near) = self.left(sibling) {
                            self.set_color(near, Color::Black);
                        }
                        self.set_color(sibling, Color::Red);
                        self.right_rotate(sibling);
                        let Some(next_sibling) = self.right(current_parent) else {
                            break;
                        };
                        sibling = next_sibling;
                    }
                    trace!(parent = current_parent.index(), "erase fixup: far nephew red");
                    let parent_color = self.color(current_parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(current_parent, Color::Black);
                    if let Some(far) = self.right(sibling) {
                        self.set_color(far, Color::Black);
                    }
                    self.left_rotate(current_parent);
                    node = self.root;
                    parent = None;
                }
            } else {
                let Some(mut sibling) = self.left(current_parent) else {
                    break;
                };
                if self.node(sibling).is_red() {
                    trace!(parent = current_parent.index(), "erase fixup: red sibling");
                    self.set_color(sibling, Color::Black);
                    self.set_color(current_parent, Color::Red);
                    self.right_rotate(current_parent);
                    let Some(next_sibling) = self.left(current_parent) else {
                        break;
                    };
                    sibling = next_sibling;
                }

                if !self.is_red(self.left(sibling)) && !self.is_red(self.right(sibling)) {
                    trace!(parent = current_parent.index(), "erase fixup: push black up");
                    self.set_color(sibling, Color::Red);
                    node = Some(current_parent);
                    parent = self.parent(current_parent);
                } else {
                    if !self.is_red(self.left(sibling)) {
                        trace!(parent = current_parent.index(), "erase fixup: near nephew red");
                        if let Some(near) = self.right(sibling) {
                            self.set_color(near, Color::Black);
                        }
                        self.set_color(sibling, Color::Red);
                        self.left_rotate(sibling);
                        let Some(next_sibling) = self.left(current_parent) else {
                            break;
                        };
                        sibling = next_sibling;
                    }
                    trace!(parent = current_parent.index(), "erase fixup: far nephew red");
                    let parent_color = self.color(current_parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(current_parent, Color::Black);
                    if let Some(far) = self.left(sibling) {
                        self.set_color(far, Color::Black);
                    }
                    self.right_rotate(current_parent);
                    node = self.root;
                    parent = None;
                }
            }
        }

        if let Some(node) = node {
            self.set_color(node, Color::Black);
        }
    }

    /// Removes the entry at `position` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIteratorError`] if `position` is the end position, was
    /// produced by another tree, or names an entry that has been erased.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// let position = tree.insert(1, "one");
    /// assert_eq!(tree.erase(position), Ok((1, "one")));
    /// assert!(tree.erase(position).is_err());
    /// ```
    pub fn erase(&mut self, position: Position) -> Result<(K, V), InvalidIteratorError> {
        let id = self.resolve(position)?;
        Ok(self.remove_node(id))
    }

    // -------------------------------------------------------------------------
    // Positions and cursors
    // -------------------------------------------------------------------------

    pub(crate) fn position_of(&self, id: NodeId) -> Position {
        Position::at(self.id, id, self.arena.version(id))
    }

    /// The position one past the largest key.
    #[must_use]
    pub fn end_position(&self) -> Position {
        Position::end(self.id)
    }

    /// Maps a position to the live node it names.
    pub(crate) fn resolve(&self, position: Position) -> Result<NodeId, InvalidIteratorError> {
        match position.tree() {
            None => return Err(InvalidIteratorError::new(IteratorErrorKind::Detached)),
            Some(tree) if tree != self.id => {
                return Err(InvalidIteratorError::new(IteratorErrorKind::Foreign));
            }
            Some(_) => {}
        }
        let Some((index, version)) = position.slot() else {
            return Err(InvalidIteratorError::new(IteratorErrorKind::End));
        };
        match self.arena.live(index) {
            Some((id, live)) if live == version => Ok(id),
            _ => Err(InvalidIteratorError::new(IteratorErrorKind::Stale)),
        }
    }

    /// Cursor at the smallest key, or at the end if the tree is empty.
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, K, V> {
        Cursor::new(self, self.min_node())
    }

    /// Cursor at the end state.
    #[must_use]
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor::new(self, None)
    }

    /// Cursor at the entry named by `position`. The end position yields the
    /// end cursor.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIteratorError`] if the position is stale or foreign.
    pub fn cursor_at(&self, position: Position) -> Result<Cursor<'_, K, V>, InvalidIteratorError> {
        match self.resolve(position) {
            Ok(id) => Ok(Cursor::new(self, Some(id))),
            Err(error) if error.kind == IteratorErrorKind::End => Ok(self.end()),
            Err(error) => Err(error),
        }
    }

    /// Entry named by `position`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIteratorError`] if the position is the end position,
    /// stale, or foreign.
    pub fn get_at(&self, position: Position) -> Result<(&K, &V), InvalidIteratorError> {
        let node = self.node(self.resolve(position)?);
        Ok((&node.key, &node.value))
    }

    /// Mutable access to the value named by `position`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_at`].
    pub fn get_at_mut(&mut self, position: Position) -> Result<&mut V, InvalidIteratorError> {
        let id = self.resolve(position)?;
        Ok(&mut self.node_mut(id).value)
    }

    // -------------------------------------------------------------------------
    // Iteration
    // -------------------------------------------------------------------------

    /// Iterates over entries in key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Iterates over keys in order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Iterates over values in key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Iterates over entries in key order with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let order = self.in_order_ids();
        let mut rank = vec![usize::MAX; self.arena.slot_count()];
        for (position, id) in order.iter().enumerate() {
            rank[id.index()] = position;
        }

        let mut entries: Vec<Option<(&K, &mut V)>> = Vec::with_capacity(order.len());
        entries.resize_with(order.len(), || None);
        for (id, node) in self.arena.occupied_mut() {
            let Node { key, value, .. } = node;
            entries[rank[id.index()]] = Some((&*key, value));
        }
        IterMut::new(entries.into_iter().flatten().collect())
    }

    /// Iterates over values in key order, mutably.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    // -------------------------------------------------------------------------
    // Deep copy
    // -------------------------------------------------------------------------

    /// Copies the subtree rooted at `source` into `arena`, preserving shape
    /// and colors. Uses an explicit work list instead of recursion.
    fn copy_subtree(&self, source: NodeId, arena: &mut Arena<K, V>) -> Option<NodeId>
    where
        K: Clone,
        V: Clone,
    {
        let mut copied_root = None;
        let mut work: SmallVec<[(NodeId, Attach); 64]> = SmallVec::new();
        work.push((source, Attach::Root));

        while let Some((source, attach)) = work.pop() {
            let original = self.node(source);
            let parent = match attach {
                Attach::Root => None,
                Attach::Left(parent) | Attach::Right(parent) => Some(parent),
            };
            let copy = arena.allocate(Node {
                key: original.key.clone(),
                value: original.value.clone(),
                color: original.color,
                parent,
                left: None,
                right: None,
            });
            match attach {
                Attach::Root => copied_root = Some(copy),
                Attach::Left(parent) => arena.node_mut(parent).left = Some(copy),
                Attach::Right(parent) => arena.node_mut(parent).right = Some(copy),
            }
            if let Some(right) = original.right {
                work.push((right, Attach::Right(copy)));
            }
            if let Some(left) = original.left {
                work.push((left, Attach::Left(copy)));
            }
        }

        copied_root
    }

    // -------------------------------------------------------------------------
    // Verification
    // -------------------------------------------------------------------------

    /// Checks every structural invariant and returns the black height.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn verify(&self) -> Result<usize, InvariantViolation>
    where
        K: Ord,
    {
        let Some(root) = self.root else {
            return if self.length == 0 {
                Ok(0)
            } else {
                Err(InvariantViolation::Length {
                    cached: self.length,
                    counted: 0,
                })
            };
        };
        if self.node(root).is_red() {
            return Err(InvariantViolation::RedRoot);
        }
        if self.parent(root).is_some() {
            return Err(InvariantViolation::ParentLink);
        }

        let black_height = self.verify_subtree(root)?;

        let order = self.in_order_ids();
        let sorted = order
            .windows(2)
            .all(|pair| self.node(pair[0]).key <= self.node(pair[1]).key);
        if !sorted {
            return Err(InvariantViolation::Order);
        }
        let counted = order.len();
        if counted != self.length {
            return Err(InvariantViolation::Length {
                cached: self.length,
                counted,
            });
        }

        Ok(black_height)
    }

    fn verify_subtree(&self, id: NodeId) -> Result<usize, InvariantViolation> {
        let node = self.node(id);
        let mut heights = [0; 2];
        for (slot, child) in [node.left, node.right].into_iter().enumerate() {
            heights[slot] = match child {
                None => 1,
                Some(child) => {
                    if self.parent(child) != Some(id) {
                        return Err(InvariantViolation::ParentLink);
                    }
                    if node.is_red() && self.node(child).is_red() {
                        return Err(InvariantViolation::RedRed);
                    }
                    self.verify_subtree(child)?
                }
            };
        }
        if heights[0] != heights[1] {
            return Err(InvariantViolation::BlackHeight {
                left: heights[0],
                right: heights[1],
            });
        }
        Ok(heights[0] + usize::from(!node.is_red()))
    }
}

impl<K: Ord, V> RedBlackTree<K, V> {
    /// Links a new red node and rebalances. Equal keys go right.
    pub(crate) fn insert_node(&mut self, key: K, value: V) -> NodeId {
        let mut parent = None;
        let mut goes_left = false;
        let mut current = self.root;
        while let Some(id) = current {
            parent = Some(id);
            goes_left = key < self.node(id).key;
            current = if goes_left {
                self.left(id)
            } else {
                self.right(id)
            };
        }

        let id = self.arena.allocate(Node::new_red(key, value, parent));
        match parent {
            None => self.root = Some(id),
            Some(parent) if goes_left => self.node_mut(parent).left = Some(id),
            Some(parent) => self.node_mut(parent).right = Some(id),
        }
        self.length += 1;
        self.rebalance(id);
        id
    }

    /// Inserts an entry, keeping any existing entries with an equal key.
    ///
    /// The new entry is placed after every entry whose key compares equal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// let position = tree.insert(5, "five");
    /// assert_eq!(tree.get_at(position), Ok((&5, &"five")));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Position {
        let id = self.insert_node(key, value);
        self.position_of(id)
    }

    /// First node with an equal key met while descending from the root.
    pub(crate) fn find_node<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(id) = current {
            current = match key.cmp(self.node(id).key.borrow()) {
                Ordering::Less => self.left(id),
                Ordering::Greater => self.right(id),
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Last node, in key order, whose key equals `key`.
    pub(crate) fn find_last_match_node<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut found = None;
        let mut current = self.root;
        while let Some(id) = current {
            let ordering = key.cmp(self.node(id).key.borrow());
            if ordering == Ordering::Equal {
                found = Some(id);
            }
            current = if ordering == Ordering::Less {
                self.left(id)
            } else {
                self.right(id)
            };
        }
        found
    }

    /// First node whose key is not less than `key` (`inclusive`) or greater
    /// than `key` (not `inclusive`).
    fn bound_node<Q>(&self, key: &Q, inclusive: bool) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut result = None;
        let mut current = self.root;
        while let Some(id) = current {
            let qualifies = match key.cmp(self.node(id).key.borrow()) {
                Ordering::Less => true,
                Ordering::Equal => inclusive,
                Ordering::Greater => false,
            };
            if qualifies {
                result = Some(id);
                current = self.left(id);
            } else {
                current = self.right(id);
            }
        }
        result
    }

    /// Cursor at the first node met on descent whose key equals `key`, or at
    /// the end if there is none.
    ///
    /// With duplicate keys this is not necessarily the first of them in key
    /// order; use [`Self::lower_bound`] for that.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor::new(self, self.find_node(key))
    }

    /// Cursor at the last entry in key order whose key equals `key`, or at
    /// the end if there is none.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbmap::tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, 'a');
    /// tree.insert(1, 'b');
    /// tree.insert(2, 'c');
    /// assert_eq!(tree.find_last_match(&1).value(), Ok(&'b'));
    /// ```
    pub fn find_last_match<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor::new(self, self.find_last_match_node(key))
    }

    /// Cursor at the first entry whose key is `>= key`, or at the end.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor::new(self, self.bound_node(key, true))
    }

    /// Cursor at the first entry whose key is `> key`, or at the end.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Cursor::new(self, self.bound_node(key, false))
    }

    /// Returns the value of the first matching entry.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(|id| &self.node(id).value)
    }

    /// Returns the value of the first matching entry, mutably.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find_node(key)?;
        Some(&mut self.node_mut(id).value)
    }

    /// Returns `true` if any entry has a key equal to `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).is_some()
    }

    /// Removes the first matching entry found on descent.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find_node(key)?;
        Some(self.remove_node(id))
    }
}

impl<K, V> Default for RedBlackTree<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for RedBlackTree<K, V> {
    fn clone(&self) -> Self {
        let mut arena = Arena::with_capacity(self.length);
        let root = self
            .root
            .and_then(|root| self.copy_subtree(root, &mut arena));
        Self {
            arena,
            root,
            length: self.length,
            id: TreeId::fresh(),
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RedBlackTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for RedBlackTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert_node(key, value);
        }
    }
}

impl<K, V> IntoIterator for RedBlackTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        let order = self.in_order_ids();
        let entries: Vec<(K, V)> = order
            .into_iter()
            .map(|id| {
                let node = self.arena.release(id);
                (node.key, node.value)
            })
            .collect();
        IntoIter::new(entries)
    }
}

impl<'a, K, V> IntoIterator for &'a RedBlackTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut RedBlackTree<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RedBlackTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
