use std::{borrow::Borrow, fmt, marker::PhantomData};

use crate::{Comparator, Node, NodePtr, Tree};

/// A read-only position in a tree: at an entry, or at the end.
///
/// The end sits after the last entry. Moving back from the end lands on the
/// last entry; moving forward from the end, or back from the first entry, is a
/// contract violation that trips a debug assertion and otherwise leaves the
/// cursor at the end.
pub struct Cursor<'a, K, V> {
    current: NodePtr<K, V>,
    root: NodePtr<K, V>,
    _marker: PhantomData<&'a (K, V)>,
}

/// A position in a tree that can edit values and remove entries.
///
/// Holding one borrows the tree mutably, so no other handle can observe a
/// node while it is being unlinked.
pub struct CursorMut<'a, K, V, C> {
    current: NodePtr<K, V>,
    tree: &'a mut Tree<K, V, C>,
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    /// Same position, not same contents.
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.key_value()).finish()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for CursorMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.key_value()).finish()
    }
}

fn step_next<K, V>(current: NodePtr<K, V>) -> NodePtr<K, V> {
    debug_assert!(current.is_some(), "cursor moved past the end");
    current.and_then(|node| unsafe { node.as_ref() }.next())
}

fn step_prev<K, V>(current: NodePtr<K, V>, root: NodePtr<K, V>) -> NodePtr<K, V> {
    match current {
        None => {
            debug_assert!(root.is_some(), "cursor moved before the start");
            root.map(Node::maximum)
        }
        Some(node) => {
            let prev = unsafe { node.as_ref() }.prev();
            debug_assert!(prev.is_some(), "cursor moved before the start");
            prev
        }
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn new(current: NodePtr<K, V>, root: NodePtr<K, V>) -> Self {
        Cursor {
            current,
            root,
            _marker: PhantomData,
        }
    }

    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    pub fn key(&self) -> Option<&'a K> {
        self.key_value().map(|(k, _)| k)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.key_value().map(|(_, v)| v)
    }

    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.current.map(|n| {
            let n = unsafe { n.as_ref() };
            (&n.key, &n.value)
        })
    }

    /// Moves to the in-order successor; the last entry moves to the end.
    pub fn move_next(&mut self) {
        self.current = step_next(self.current);
    }

    /// Moves to the in-order predecessor; the end moves to the last entry.
    pub fn move_prev(&mut self) {
        self.current = step_prev(self.current, self.root);
    }
}

impl<'a, K, V, C> CursorMut<'a, K, V, C> {
    pub(crate) fn new(current: NodePtr<K, V>, tree: &'a mut Tree<K, V, C>) -> Self {
        CursorMut { current, tree }
    }

    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    pub fn key(&self) -> Option<&K> {
        self.key_value().map(|(k, _)| k)
    }

    pub fn value(&self) -> Option<&V> {
        self.key_value().map(|(_, v)| v)
    }

    pub fn key_value(&self) -> Option<(&K, &V)> {
        self.current.map(|n| {
            let n = unsafe { n.as_ref() };
            (&n.key, &n.value)
        })
    }

    /// The value under the cursor. Keys stay immutable: changing one could
    /// break the ordering.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.current.map(|mut n| &mut unsafe { n.as_mut() }.value)
    }

    /// Like [`CursorMut::value_mut`], for as long as the tree stays borrowed.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        self.current.map(|mut n| &mut unsafe { n.as_mut() }.value)
    }

    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.current, self.tree.root.root())
    }

    pub fn move_next(&mut self) {
        self.current = step_next(self.current);
    }

    pub fn move_prev(&mut self) {
        self.current = step_prev(self.current, self.tree.root.root());
    }

    /// Removes the entry under the cursor and moves to its successor. At the
    /// end this does nothing.
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let node = self.current?;
        // Erasure relinks nodes but never moves entries between them, so the
        // successor stays valid.
        self.current = unsafe { node.as_ref() }.next();
        Some(self.tree.remove_node(node))
    }
}

impl<K, V, C> Tree<K, V, C> {
    /// A cursor at the first entry, or at the end when empty.
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.root.first(), self.root.root())
    }

    /// A cursor at the last entry, or at the end when empty.
    pub fn cursor_back(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.root.last(), self.root.root())
    }

    pub fn cursor_end(&self) -> Cursor<'_, K, V> {
        Cursor::new(None, self.root.root())
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, K, V, C> {
        CursorMut::new(self.root.first(), self)
    }

    /// A cursor at `key`, or at the end if it is absent.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        Cursor::new(self.find_node(key), self.root.root())
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        CursorMut::new(self.find_node(key), self)
    }

    /// A cursor at the first entry whose key is not less than `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        Cursor::new(self.lower_bound_node(key), self.root.root())
    }

    /// A cursor at the first entry whose key is greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        Cursor::new(self.upper_bound_node(key), self.root.root())
    }

    pub fn lower_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        CursorMut::new(self.lower_bound_node(key), self)
    }

    /// `(lower_bound(key), upper_bound(key))`: the cursors bracket the entry
    /// for `key`, and are equal when it is absent.
    pub fn equal_range<Q>(&self, key: &Q) -> (Cursor<'_, K, V>, Cursor<'_, K, V>)
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        (self.lower_bound(key), self.upper_bound(key))
    }
}
