use std::{
    borrow::Borrow,
    fmt::{self, Debug},
    ops::{Index, RangeBounds},
};

use crate::{
    Comparator, Cursor, CursorMut, Iter, IterMut, Keys, Map, Natural, Range, Tree, Values,
    ValuesMut,
};

impl<K, V> Map<K, V, Natural> {
    /// Makes a new, empty `Map` ordered by [`Ord`].
    pub const fn new() -> Self {
        Map { tree: Tree::new() }
    }
}

impl<K, V, C: Default> Default for Map<K, V, C> {
    fn default() -> Self {
        Map {
            tree: Tree::default(),
        }
    }
}

impl<K, V, C> Map<K, V, C> {
    pub const fn with_comparator(comparator: C) -> Self {
        Map {
            tree: Tree::with_comparator(comparator),
        }
    }

    pub fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// The tree underneath, for structural queries such as
    /// [`Tree::validate`] or [`Tree::height`].
    pub fn as_tree(&self) -> &Tree<K, V, C> {
        &self.tree
    }

    pub fn into_tree(self) -> Tree<K, V, C> {
        self.tree
    }

    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first_key_value()
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last_key_value()
    }

    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first()
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last()
    }

    /// The position of the first entry; equal to [`Map::end`] when empty.
    pub fn begin(&self) -> Cursor<'_, K, V> {
        self.tree.cursor_front()
    }

    /// The position past the last entry.
    pub fn end(&self) -> Cursor<'_, K, V> {
        self.tree.cursor_end()
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V, C> {
        self.tree.cursor_front_mut()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.tree.iter_mut()
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        self.tree.keys()
    }

    pub fn values(&self) -> Values<'_, K, V> {
        self.tree.values()
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        self.tree.values_mut()
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.tree.retain(f);
    }
}

impl<K, V, C: Comparator<K>> Map<K, V, C> {
    /// Inserts `key` with `value` if no equal key is present.
    ///
    /// Returns a cursor at the entry for `key` and whether it is new. On a
    /// duplicate the map is unchanged, the cursor points at the original
    /// entry and `key` and `value` are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::Map;
    ///
    /// let mut map = Map::new();
    /// assert_eq!(map.insert(37, "a").1, true);
    ///
    /// let (cursor, inserted) = map.insert(37, "b");
    /// assert_eq!(inserted, false);
    /// assert_eq!(cursor.value(), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (CursorMut<'_, K, V, C>, bool) {
        let (node, inserted) = self.tree.insert_node(key, value);
        (CursorMut::new(Some(node), &mut self.tree), inserted)
    }

    /// The value for `key`, inserting `default()` first if it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::Map;
    ///
    /// let mut counts = Map::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_with(word, || 0) += 1;
    /// }
    /// assert_eq!(counts["a"], 2);
    /// assert_eq!(counts["b"], 1);
    /// ```
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let found = self.tree.find_node(&key);
        let mut node = match found {
            Some(node) => node,
            None => self.tree.insert_node(key, default()).0,
        };
        &mut unsafe { node.as_mut() }.value
    }

    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }
}

impl<K, V, C> Map<K, V, C> {
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.contains_key(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.get(key)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.get_key_value(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.get_mut(key)
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.remove(key)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.remove_entry(key)
    }

    /// Erases the entry for `key` and returns how many went: 0 or 1.
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        usize::from(self.tree.remove_entry(key).is_some())
    }

    /// Erases every entry whose key falls in `range` and returns how many
    /// went.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::Map;
    ///
    /// let mut map: Map<i32, ()> = (0..10).map(|k| (k, ())).collect();
    /// assert_eq!(map.erase_range(2..5), 3);
    /// assert_eq!(map.erase_range(8..), 2);
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [0, 1, 5, 6, 7]);
    /// ```
    pub fn erase_range<Q, R>(&mut self, range: R) -> usize
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
        R: RangeBounds<Q>,
    {
        let (mut current, end) = self.tree.range_nodes(&range);
        let mut erased = 0;
        while let Some(node) = current {
            if current == end {
                break;
            }
            // The successor, and `end`, outlive the erasure of `node`.
            current = unsafe { node.as_ref() }.next();
            drop(self.tree.remove_node(node));
            erased += 1;
        }
        log::debug!("erased {erased} entries by range");
        erased
    }

    /// A cursor at `key`, or [`Map::end`] if it is absent.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.find(key)
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.find_mut(key)
    }

    /// A cursor at the first entry whose key is not less than `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.lower_bound(key)
    }

    /// A cursor at the first entry whose key is greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.upper_bound(key)
    }

    pub fn equal_range<Q>(&self, key: &Q) -> (Cursor<'_, K, V>, Cursor<'_, K, V>)
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.tree.equal_range(key)
    }

    pub fn range<Q, R>(&self, range: R) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
        R: RangeBounds<Q>,
    {
        self.tree.range(range)
    }
}

impl<K, Q, V, C> Index<&Q> for Map<K, V, C>
where
    K: Borrow<Q>,
    C: Comparator<Q>,
    Q: ?Sized,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the `Map`.
    #[inline]
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for Map<K, V, C> {
    fn clone(&self) -> Self {
        Map {
            tree: self.tree.clone(),
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for Map<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, V: Eq, C> Eq for Map<K, V, C> {}

impl<K: Debug, V: Debug, C> Debug for Map<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tree.fmt(f)
    }
}
