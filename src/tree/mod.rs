//! The red-black tree engine and its cursor protocol.
//!
//! - [`RedBlackTree`]: arena-backed, duplicate-tolerant ordered tree
//! - [`Cursor`]: bidirectional, wrap-around cursor borrowing a tree
//! - [`Position`]: detached, validated handle to an entry or to the end
//!
//! # Examples
//!
//! ```rust
//! use rbmap::tree::RedBlackTree;
//!
//! let mut tree = RedBlackTree::new();
//! for key in [5, 3, 8, 1, 4] {
//!     tree.insert(key, key * 100);
//! }
//!
//! // Erase through a position taken from a lookup
//! let position = tree.lower_bound(&4).position();
//! assert_eq!(tree.erase(position), Ok((4, 400)));
//!
//! let keys: Vec<&i32> = tree.keys().collect();
//! assert_eq!(keys, vec![&1, &3, &5, &8]);
//! assert!(tree.verify().is_ok());
//! ```

mod cursor;
mod iter;
mod node;
mod rbtree;

pub use cursor::Cursor;
pub use cursor::Position;
pub use iter::IntoIter;
pub use iter::Iter;
pub use iter::IterMut;
pub use iter::Keys;
pub use iter::Values;
pub use iter::ValuesMut;
pub use rbtree::RedBlackTree;

// Static assertions on the auto traits of handles, cursors and iterators
static_assertions::assert_impl_all!(Position: Copy, Send, Sync, Default, std::hash::Hash);
static_assertions::assert_impl_all!(RedBlackTree<i32, String>: Send, Sync, Clone, Default);
static_assertions::assert_impl_all!(Cursor<'static, i32, String>: Copy, Eq);
static_assertions::assert_not_impl_any!(Cursor<'static, i32, String>: Default);
static_assertions::assert_impl_all!(
    ValuesMut<'static, i32, String>: DoubleEndedIterator, ExactSizeIterator, std::iter::FusedIterator
);
