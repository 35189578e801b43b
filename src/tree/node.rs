//! Node storage for the red-black tree.
//!
//! Nodes live in an [`Arena`] and link to each other through [`NodeId`]
//! indices. The arena is the single owner of every node; `left`/`right`
//! describe the tree shape and `parent` is a back-reference used only for
//! traversal. Each slot carries a version stamp that is bumped whenever its
//! node is released, so a handle taken before an erase can be told apart from
//! a handle to whatever node later reuses the slot.

/// The color of a red-black tree node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Index of a slot in the node arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// A tree node.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) color: Color,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    /// Creates a new red leaf attached under `parent`.
    pub(crate) const fn new_red(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }
}

#[derive(Debug)]
struct Slot<K, V> {
    version: u32,
    node: Option<Node<K, V>>,
}

/// Slot storage with a free list.
#[derive(Debug)]
pub(crate) struct Arena<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Vec<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Stores `node` in a vacant slot, reusing released slots first.
    pub(crate) fn allocate(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.0].node = Some(node);
            id
        } else {
            self.slots.push(Slot {
                version: 0,
                node: Some(node),
            });
            NodeId(self.slots.len() - 1)
        }
    }

    /// Takes the node out of its slot and retires the slot's current version.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<K, V> {
        let slot = &mut self.slots[id.0];
        let Some(node) = slot.node.take() else {
            unreachable!("released vacant arena slot {}", id.0)
        };
        slot.version = slot.version.wrapping_add(1);
        self.free.push(id);
        node
    }

    /// Drops every node without recursion. Versions are retired so that
    /// handles into the old contents are recognized as stale.
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.node.take().is_some() {
                slot.version = slot.version.wrapping_add(1);
            }
            self.free.push(NodeId(index));
        }
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        match self.slots[id.0].node.as_ref() {
            Some(node) => node,
            None => unreachable!("link to vacant arena slot {}", id.0),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match self.slots[id.0].node.as_mut() {
            Some(node) => node,
            None => unreachable!("link to vacant arena slot {}", id.0),
        }
    }

    /// Id and version of a live slot, or `None` if the index is vacant or
    /// out of range.
    pub(crate) fn live(&self, index: usize) -> Option<(NodeId, u32)> {
        self.slots
            .get(index)
            .and_then(|slot| slot.node.as_ref().map(|_| (NodeId(index), slot.version)))
    }

    /// Version stamp of a slot known to be live.
    #[inline]
    pub(crate) fn version(&self, id: NodeId) -> u32 {
        self.slots[id.0].version
    }

    /// Number of slots, live or vacant.
    #[inline]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Most slots a `Vec` of this slot type can hold without its allocation
    /// exceeding `isize::MAX` bytes.
    pub(crate) const fn max_slots() -> usize {
        let slot_size = size_of::<Slot<K, V>>();
        if slot_size == 0 {
            usize::MAX
        } else {
            isize::MAX.unsigned_abs() / slot_size
        }
    }

    /// Every live node paired with its id, in slot order.
    pub(crate) fn occupied_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut Node<K, V>)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.node.as_mut().map(|node| (NodeId(index), node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_allocate_reuses_released_slot() {
        let mut arena: Arena<i32, &str> = Arena::new();
        let first = arena.allocate(Node::new_red(1, "one", None));
        let second = arena.allocate(Node::new_red(2, "two", None));
        assert_ne!(first, second);

        let released = arena.release(first);
        assert_eq!(released.key, 1);

        let third = arena.allocate(Node::new_red(3, "three", None));
        assert_eq!(third, first);
        assert_eq!(arena.node(third).key, 3);
    }

    #[rstest]
    fn test_release_bumps_version() {
        let mut arena: Arena<i32, ()> = Arena::new();
        let id = arena.allocate(Node::new_red(1, (), None));
        let before = arena.live(id.index());
        arena.release(id);
        assert_eq!(arena.live(id.index()), None);

        let reused = arena.allocate(Node::new_red(2, (), None));
        assert_eq!(reused, id);
        assert_ne!(arena.live(reused.index()), before);
    }

    #[rstest]
    fn test_clear_retires_every_slot() {
        let mut arena: Arena<i32, ()> = Arena::new();
        let ids: Vec<NodeId> = (0..4)
            .map(|key| arena.allocate(Node::new_red(key, (), None)))
            .collect();
        let versions: Vec<Option<(NodeId, u32)>> =
            ids.iter().map(|id| arena.live(id.index())).collect();

        arena.clear();

        for id in &ids {
            assert_eq!(arena.live(id.index()), None);
        }
        let reused = arena.allocate(Node::new_red(9, (), None));
        assert_eq!(reused, ids[0]);
        assert_ne!(arena.live(reused.index()), versions[0]);
        assert_eq!(arena.slot_count(), 4);
    }

    #[rstest]
    fn test_max_slots_shrinks_with_slot_size() {
        let small = Arena::<u8, ()>::max_slots();
        let large = Arena::<u8, [u64; 32]>::max_slots();
        assert!(large < small);
        assert!(large > 0);
        assert_eq!(small, isize::MAX.unsigned_abs() / size_of::<Slot<u8, ()>>());
    }

    #[rstest]
    fn test_new_node_is_red_leaf() {
        let node: Node<i32, ()> = Node::new_red(1, (), None);
        assert!(node.is_red());
        assert!(node.left.is_none());
        assert!(node.right.is_none());
    }
}
