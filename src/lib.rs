//! # rbmap
//!
//! Mutable ordered containers backed by a red-black tree.
//!
//! ## Overview
//!
//! - **Tree engine**: [`tree::RedBlackTree`], a duplicate-tolerant
//!   red-black tree with O(log N) insert, erase and bound queries
//! - **Cursor protocol**: [`tree::Cursor`] walks entries in key order and
//!   wraps around through a single end state; [`tree::Position`] is a
//!   detached handle that survives unrelated mutations
//! - **Ordered map**: [`map::OrderedMap`], unique keys with keyed and
//!   positional access
//! - **Ordered multimap**: [`map::OrderedMultiMap`], equal keys kept in
//!   insertion order
//!
//! ## Feature Flags
//!
//! - `map`: the `OrderedMap` container (default)
//! - `multimap`: the `OrderedMultiMap` container (default)
//! - `serde`: `Serialize`/`Deserialize` for the map containers
//! - `full`: enable all features
//!
//! ## Logging
//!
//! Structural events (rotations, erase cases, bulk operations) are emitted
//! through [`tracing`] at `trace` and `debug` level. The crate installs no
//! subscriber.
//!
//! ## Example
//!
//! ```rust
//! use rbmap::prelude::*;
//!
//! let mut map = OrderedMap::new();
//! map.insert(2, "two");
//! map.insert(1, "one");
//!
//! let mut cursor = map.begin();
//! assert_eq!(cursor.key(), Ok(&1));
//! cursor.move_next();
//! cursor.move_next();
//! assert!(cursor.is_end());
//! cursor.move_next();
//! assert_eq!(cursor.key(), Ok(&1));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// ```rust
/// use rbmap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::*;
    pub use crate::tree::*;

    #[cfg(feature = "map")]
    pub use crate::map::*;
}

pub mod error;
pub mod tree;

#[cfg(feature = "map")]
pub mod map;
