//! Error types for the tree and map layers.
//!
//! Failures are local and immediate: every fallible operation returns a
//! [`Result`] carrying one of the types below, and nothing is retried.

use std::fmt;

/// Returned by [`OrderedMap::at`](crate::map::OrderedMap::at) when the key is absent.
///
/// The missing key is carried along for diagnostics.
///
/// # Examples
///
/// ```rust
/// use rbmap::error::KeyNotFoundError;
///
/// let error = KeyNotFoundError { key: 7 };
/// assert_eq!(format!("{error}"), "key not found: 7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNotFoundError<K> {
    /// The key that was looked up.
    pub key: K,
}

impl<K: fmt::Debug> fmt::Display for KeyNotFoundError<K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "key not found: {:?}", self.key)
    }
}

impl<K: fmt::Debug> std::error::Error for KeyNotFoundError<K> {}

/// Why a position or cursor could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IteratorErrorKind {
    /// The position was default-constructed and belongs to no tree.
    Detached,
    /// The position is the end state and names no entry.
    End,
    /// The entry the position named has been erased.
    Stale,
    /// The position was produced by a different tree.
    Foreign,
}

/// Returned when dereferencing or erasing through a position that names no
/// live entry of the tree.
///
/// # Examples
///
/// ```rust
/// use rbmap::error::{InvalidIteratorError, IteratorErrorKind};
///
/// let error = InvalidIteratorError::new(IteratorErrorKind::End);
/// assert_eq!(format!("{error}"), "invalid iterator: position is the end of the sequence");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidIteratorError {
    /// The reason the position was rejected.
    pub kind: IteratorErrorKind,
}

impl InvalidIteratorError {
    /// Creates an error of the given kind.
    #[inline]
    #[must_use]
    pub const fn new(kind: IteratorErrorKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for InvalidIteratorError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.kind {
            IteratorErrorKind::Detached => "position is not attached to a tree",
            IteratorErrorKind::End => "position is the end of the sequence",
            IteratorErrorKind::Stale => "entry at position has been erased",
            IteratorErrorKind::Foreign => "position belongs to another tree",
        };
        write!(formatter, "invalid iterator: {reason}")
    }
}

impl std::error::Error for InvalidIteratorError {}

/// Errors raised by the map layer.
///
/// Both leaf errors convert into this type, so callers mixing keyed and
/// positional access can use `?` against a single error type.
///
/// # Examples
///
/// ```rust
/// use rbmap::error::{MapError, KeyNotFoundError};
///
/// let error: MapError<i32> = KeyNotFoundError { key: 3 }.into();
/// assert!(matches!(error, MapError::KeyNotFound(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError<K> {
    /// A keyed lookup found nothing.
    KeyNotFound(KeyNotFoundError<K>),
    /// A positional access used an unusable position.
    InvalidIterator(InvalidIteratorError),
}

impl<K: fmt::Debug> fmt::Display for MapError<K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound(error) => write!(formatter, "{error}"),
            Self::InvalidIterator(error) => write!(formatter, "{error}"),
        }
    }
}

impl<K: fmt::Debug> std::error::Error for MapError<K> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::KeyNotFound(_) => None,
            Self::InvalidIterator(error) => Some(error),
        }
    }
}

impl<K> From<KeyNotFoundError<K>> for MapError<K> {
    fn from(error: KeyNotFoundError<K>) -> Self {
        Self::KeyNotFound(error)
    }
}

impl<K> From<InvalidIteratorError> for MapError<K> {
    fn from(error: InvalidIteratorError) -> Self {
        Self::InvalidIterator(error)
    }
}

/// A red-black or ordering invariant that does not hold.
///
/// Produced by [`RedBlackTree::verify`](crate::tree::RedBlackTree::verify).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantViolation {
    /// The root node is red.
    RedRoot,
    /// A red node has a red child.
    RedRed,
    /// Two paths from the same node reach a null link through different
    /// numbers of black nodes.
    BlackHeight {
        /// Black count on the left side.
        left: usize,
        /// Black count on the right side.
        right: usize,
    },
    /// In-order traversal is not sorted by key.
    Order,
    /// A child's parent link does not point at the node that owns it.
    ParentLink,
    /// The cached length disagrees with the number of reachable nodes.
    Length {
        /// The cached length.
        cached: usize,
        /// The number of nodes reached from the root.
        counted: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedRoot => write!(formatter, "root node is red"),
            Self::RedRed => write!(formatter, "red node has a red child"),
            Self::BlackHeight { left, right } => write!(
                formatter,
                "black height mismatch: left path has {left}, right path has {right}"
            ),
            Self::Order => write!(formatter, "in-order traversal is not sorted"),
            Self::ParentLink => write!(formatter, "parent link does not match owning node"),
            Self::Length { cached, counted } => write!(
                formatter,
                "length mismatch: cached {cached}, counted {counted}"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}
