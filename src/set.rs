use std::{
    borrow::Borrow,
    fmt::{self, Debug},
    ops::RangeBounds,
};

use crate::{Comparator, Cursor, Keys, Natural, Set, Tree};

impl<T> Set<T, Natural> {
    /// Makes a new, empty `Set` ordered by [`Ord`].
    pub const fn new() -> Self {
        Set { tree: Tree::new() }
    }
}

impl<T, C: Default> Default for Set<T, C> {
    fn default() -> Self {
        Set {
            tree: Tree::default(),
        }
    }
}

impl<T, C> Set<T, C> {
    pub const fn with_comparator(comparator: C) -> Self {
        Set {
            tree: Tree::with_comparator(comparator),
        }
    }

    pub fn as_tree(&self) -> &Tree<T, (), C> {
        &self.tree
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn first(&self) -> Option<&T> {
        self.tree.first_key_value().map(|(k, _)| k)
    }

    pub fn last(&self) -> Option<&T> {
        self.tree.last_key_value().map(|(k, _)| k)
    }

    pub fn pop_first(&mut self) -> Option<T> {
        self.tree.pop_first().map(|kv| kv.0)
    }

    pub fn pop_last(&mut self) -> Option<T> {
        self.tree.pop_last().map(|kv| kv.0)
    }

    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Gets an iterator that visits the elements in ascending order.
    pub fn iter(&self) -> Keys<'_, T, ()> {
        self.tree.keys()
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.tree.retain(|k, _| f(k));
    }
}

impl<T, C: Comparator<T>> Set<T, C> {
    /// Adds `value` unless an equal one is present. Returns whether it went in.
    pub fn insert(&mut self, value: T) -> bool {
        self.tree.insert(value, ())
    }
}

impl<T, C> Set<T, C> {
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.contains_key(value)
    }

    /// The stored element equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.get_key_value(value).map(|(k, _)| k)
    }

    /// Removes `value` and returns whether it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.remove(value).is_some()
    }

    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.remove_entry(value).map(|(k, _)| k)
    }

    /// A cursor at the first element not less than `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> Cursor<'_, T, ()>
    where
        T: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.lower_bound(value)
    }

    /// A cursor at the first element greater than `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> Cursor<'_, T, ()>
    where
        T: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.upper_bound(value)
    }

    /// The elements within `range`, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::Set;
    ///
    /// let set: Set<u32> = (1..=9).collect();
    /// assert!(set.range(4..7).copied().eq([4, 5, 6]));
    /// assert!(set.range(7..4).next().is_none());
    /// ```
    pub fn range<Q, R>(&self, range: R) -> impl DoubleEndedIterator<Item = &T>
    where
        T: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
        R: RangeBounds<Q>,
    {
        self.tree.range(range).map(|(k, _)| k)
    }
}

impl<T: Clone, C: Clone> Clone for Set<T, C> {
    fn clone(&self) -> Self {
        Set {
            tree: self.tree.clone(),
        }
    }
}

impl<T: PartialEq, C> PartialEq for Set<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<T: Eq, C> Eq for Set<T, C> {}

impl<T: Debug, C> Debug for Set<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
