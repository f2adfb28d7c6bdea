//! An ordered map and set backed by a red-black tree.
//!
//! The tree owns every node through raw, heap allocated links. The "nil"
//! child, the parent of the root and the end of an in-order walk are all the
//! same absent marker, `None`, which is never written to and always reads as
//! [`Color::Black`].
//!
//! ```
//! use rbmap::Map;
//!
//! let mut map = Map::new();
//! for k in [10, 20, 5, 15, 25, 1, 30] {
//!     map.insert(k, k * 10);
//! }
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 5, 10, 15, 20, 25, 30]);
//! assert!(map.as_tree().validate().is_ok());
//! ```
mod compare;
mod cursor;
mod iter;
mod map;
mod node;
mod root;
mod set;
mod tree;
mod validate;

use std::{marker::PhantomData, ptr::NonNull};

pub use compare::{Comparator, Natural, Reversed};
pub use cursor::{Cursor, CursorMut};
pub use iter::tree::{IntoIter, IntoKeys, IntoValues, Iter, IterMut, Keys, Range, Values, ValuesMut};
pub use validate::Violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red = 0,
    Black = 1,
}

impl From<Color> for usize {
    fn from(color: Color) -> usize {
        color as usize
    }
}

impl From<usize> for Color {
    fn from(color: usize) -> Color {
        match color {
            0 => Color::Red,
            _ => Color::Black,
        }
    }
}

/// A link to a node; `None` is the absent marker.
pub(crate) type NodePtr<K, V> = Option<NonNull<Node<K, V>>>;

/// Accessors that treat the absent marker as a black leaf with no links.
pub(crate) trait NodePtrExt: Copy {
    fn color(self) -> Color;
    fn is_black(self) -> bool;
    fn is_red(self) -> bool;
    fn left(self) -> Self;
    fn right(self) -> Self;
    fn parent(self) -> Self;
    fn set_left(self, left: Self);
    fn set_right(self, right: Self);
    fn set_parent(self, parent: Self);
    fn set_color(self, color: Color);
}

impl<K, V> NodePtrExt for NodePtr<K, V> {
    #[inline(always)]
    fn color(self) -> Color {
        self.map_or(Color::Black, |v| unsafe { v.as_ref() }.color())
    }

    #[inline(always)]
    fn is_black(self) -> bool {
        self.color() == Color::Black
    }

    #[inline(always)]
    fn is_red(self) -> bool {
        self.color() == Color::Red
    }

    #[inline(always)]
    fn left(self) -> Self {
        self.and_then(|v| unsafe { v.as_ref() }.left)
    }

    #[inline(always)]
    fn right(self) -> Self {
        self.and_then(|v| unsafe { v.as_ref() }.right)
    }

    #[inline(always)]
    fn parent(self) -> Self {
        self.and_then(|v| unsafe { v.as_ref() }.parent())
    }

    #[inline(always)]
    fn set_left(self, left: Self) {
        if let Some(mut node) = self {
            unsafe { node.as_mut() }.left = left;
        }
    }

    #[inline(always)]
    fn set_right(self, right: Self) {
        if let Some(mut node) = self {
            unsafe { node.as_mut() }.right = right;
        }
    }

    #[inline(always)]
    fn set_parent(self, parent: Self) {
        if let Some(mut node) = self {
            unsafe { node.as_mut() }.set_parent(parent);
        }
    }

    #[inline(always)]
    fn set_color(self, color: Color) {
        if let Some(mut node) = self {
            unsafe { node.as_mut() }.set_color(color);
        }
    }
}

pub(crate) struct Node<K, V> {
    // The parent pointer with the color in the lowest bit. `*const` keeps
    // `Node` covariant in `K` and `V`.
    pub(crate) parent_color: *const Node<K, V>,
    pub(crate) left: NodePtr<K, V>,
    pub(crate) right: NodePtr<K, V>,
    pub(crate) key: K,
    pub(crate) value: V,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// The structural half of a tree: links, rotations and rebalancing. It knows
/// nothing about ordering.
pub(crate) struct Root<K, V> {
    root: NodePtr<K, V>,
}

/// A red-black tree mapping `K` to `V`, ordered by the comparator `C`.
///
/// Keys are unique: inserting a key that compares equal to a present one
/// leaves the tree untouched.
pub struct Tree<K, V, C = Natural> {
    root: Root<K, V>,
    len: usize,
    comparator: C,
    _marker: PhantomData<Box<(K, V)>>,
}

// The tree owns its nodes outright, like a `Box`.
unsafe impl<K: Send, V: Send, C: Send> Send for Tree<K, V, C> {}
unsafe impl<K: Sync, V: Sync, C: Sync> Sync for Tree<K, V, C> {}

/// An ordered map with cursor positions, bound queries and range erasure.
pub struct Map<K, V, C = Natural> {
    tree: Tree<K, V, C>,
}

/// An ordered set of unique keys.
pub struct Set<T, C = Natural> {
    tree: Tree<T, (), C>,
}
