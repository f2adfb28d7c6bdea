use std::{
    borrow::Borrow,
    iter::FusedIterator,
    marker::PhantomData,
    ops::{Bound, RangeBounds},
};

use crate::{Comparator, NodePtr, Tree};

impl<K, V, C> Tree<K, V, C> {
    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::Tree;
    ///
    /// let mut a = Tree::new();
    /// a.insert(2, "b");
    /// a.insert(1, "a");
    ///
    /// let entries: Vec<_> = a.iter().collect();
    /// assert_eq!(entries, [(&1, &"a"), (&2, &"b")]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            front: self.root.first(),
            back: self.root.last(),
            len: self.len,
            _marker: PhantomData,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            front: self.root.first(),
            back: self.root.last(),
            len: self.len,
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the tree, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Gets a mutable iterator over the values of the tree, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::Tree;
    ///
    /// let mut a = Tree::new();
    /// a.insert(1, String::from("hello"));
    /// a.insert(2, String::from("goodbye"));
    ///
    /// for value in a.values_mut() {
    ///     value.push_str("!");
    /// }
    ///
    /// let values: Vec<String> = a.values().cloned().collect();
    /// assert_eq!(values, [String::from("hello!"),
    ///                     String::from("goodbye!")]);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Creates a consuming iterator visiting all the keys, in sorted order.
    #[inline]
    pub fn into_keys(self) -> IntoKeys<K, V, C> {
        IntoKeys {
            inner: self.into_iter(),
        }
    }

    /// Creates a consuming iterator visiting all the values, in order by key.
    #[inline]
    pub fn into_values(self) -> IntoValues<K, V, C> {
        IntoValues {
            inner: self.into_iter(),
        }
    }

    /// Retains only the entries for which `f` returns `true`, visiting them
    /// in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::Tree;
    ///
    /// let mut tree: Tree<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// // Keep only the elements with even-numbered keys.
    /// tree.retain(|&k, _| k % 2 == 0);
    /// assert!(tree.into_iter().eq(vec![(0, 0), (2, 20), (4, 40), (6, 60)]));
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut current = self.root.first();
        while let Some(mut node) = current {
            let node_ref = unsafe { node.as_mut() };
            // Grab the successor first: it survives the erasure of `node`.
            current = node_ref.next();
            if !f(&node_ref.key, &mut node_ref.value) {
                self.remove_node(node);
            }
        }
    }

    /// The half-open node span `[front, end)` covered by `range`. An empty
    /// span comes back as `(end, end)`.
    pub(crate) fn range_nodes<Q, R>(&self, range: &R) -> (NodePtr<K, V>, NodePtr<K, V>)
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
        R: RangeBounds<Q>,
    {
        let front = match range.start_bound() {
            Bound::Included(k) => self.lower_bound_node(k),
            Bound::Excluded(k) => self.upper_bound_node(k),
            Bound::Unbounded => self.root.first(),
        };
        let end = match range.end_bound() {
            Bound::Included(k) => self.upper_bound_node(k),
            Bound::Excluded(k) => self.lower_bound_node(k),
            Bound::Unbounded => None,
        };
        match (front, end) {
            (None, _) => (end, end),
            (Some(f), Some(e)) => {
                let (f, e) = unsafe { (f.as_ref(), e.as_ref()) };
                if self.comparator.less(f.key.borrow(), e.key.borrow()) {
                    (front, end)
                } else {
                    (end, end)
                }
            }
            (Some(_), None) => (front, end),
        }
    }

    /// Gets an iterator over the entries whose keys fall in `range`.
    ///
    /// A range whose start lies after its end is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::Tree;
    ///
    /// let tree: Tree<i32, ()> = (0..10).map(|x| (x, ())).collect();
    /// let keys: Vec<_> = tree.range(3..6).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [3, 4, 5]);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
        R: RangeBounds<Q>,
    {
        let (front, end) = self.range_nodes(&range);
        if front == end {
            return Range {
                front: None,
                back: None,
                _marker: PhantomData,
            };
        }
        let back = match end {
            Some(end) => unsafe { end.as_ref() }.prev(),
            None => self.root.last(),
        };
        Range {
            front,
            back,
            _marker: PhantomData,
        }
    }
}

pub struct Iter<'a, K, V> {
    front: NodePtr<K, V>,
    back: NodePtr<K, V>,
    len: usize,
    _marker: PhantomData<&'a (K, V)>,
}

impl<'a, K, V, C> IntoIterator for &'a Tree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        self.front.map(|n| {
            let n = unsafe { n.as_ref() };
            self.len -= 1;
            self.front = n.next();
            (&n.key, &n.value)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<(&'a K, &'a V)> {
        self.next_back()
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        if self.len == 0 {
            return None;
        }
        self.back.map(|n| {
            let n = unsafe { n.as_ref() };
            self.len -= 1;
            self.back = n.prev();
            (&n.key, &n.value)
        })
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            front: self.front,
            back: self.back,
            len: self.len,
            _marker: PhantomData,
        }
    }
}

pub struct IterMut<'a, K, V> {
    front: NodePtr<K, V>,
    back: NodePtr<K, V>,
    len: usize,
    _marker: PhantomData<&'a mut (K, V)>,
}

impl<'a, K, V, C> IntoIterator for &'a mut Tree<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<(&'a K, &'a mut V)> {
        if self.len == 0 {
            return None;
        }
        self.front.map(|mut n| {
            let n = unsafe { n.as_mut() };
            self.len -= 1;
            self.front = n.next();
            (&n.key, &mut n.value)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<(&'a K, &'a mut V)> {
        self.next_back()
    }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a mut V)> {
        if self.len == 0 {
            return None;
        }
        self.back.map(|mut n| {
            let n = unsafe { n.as_mut() };
            self.len -= 1;
            self.back = n.prev();
            (&n.key, &mut n.value)
        })
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An owning iterator over the entries of a `Tree`, sorted by key.
pub struct IntoIter<K, V, C>(Tree<K, V, C>);

impl<K, V, C> IntoIterator for Tree<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C>;

    fn into_iter(self) -> IntoIter<K, V, C> {
        IntoIter(self)
    }
}

impl<K, V, C> Iterator for IntoIter<K, V, C> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.0.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len, Some(self.0.len))
    }

    fn last(mut self) -> Option<(K, V)> {
        self.next_back()
    }
}

impl<K, V, C> DoubleEndedIterator for IntoIter<K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.pop_last()
    }
}

impl<K, V, C> ExactSizeIterator for IntoIter<K, V, C> {
    fn len(&self) -> usize {
        self.0.len
    }
}

impl<K, V, C> FusedIterator for IntoIter<K, V, C> {}

/// An iterator over the entries of a `Tree` within a key range.
///
/// This `struct` is created by the [`range`] method on [`Tree`].
///
/// [`range`]: Tree::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V> {
    // Both ends inclusive; `None` once exhausted.
    front: NodePtr<K, V>,
    back: NodePtr<K, V>,
    _marker: PhantomData<&'a (K, V)>,
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let n = self.front?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.front = unsafe { n.as_ref() }.next();
        }
        let n = unsafe { n.as_ref() };
        Some((&n.key, &n.value))
    }
}

impl<'a, K, V> DoubleEndedIterator for Range<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        let n = self.back?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.back = unsafe { n.as_ref() }.prev();
        }
        let n = unsafe { n.as_ref() };
        Some((&n.key, &n.value))
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Range {
            front: self.front,
            back: self.back,
            _marker: PhantomData,
        }
    }
}

/// An iterator over the keys of a `Tree`.
///
/// This `struct` is created by the [`keys`] method on [`Tree`]. See its
/// documentation for more.
///
/// [`keys`]: Tree::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `Tree`.
///
/// This `struct` is created by the [`values`] method on [`Tree`].
///
/// [`values`]: Tree::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

/// An owning iterator over the keys of a `Tree`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoKeys<K, V, C> {
    inner: IntoIter<K, V, C>,
}

/// An owning iterator over the values of a `Tree`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoValues<K, V, C> {
    inner: IntoIter<K, V, C>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a K> {
        self.next_back()
    }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a V> {
        self.next_back()
    }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for ValuesMut<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a mut V> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

impl<K, V, C> Iterator for IntoKeys<K, V, C> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for IntoKeys<K, V, C> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V, C> ExactSizeIterator for IntoKeys<K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for IntoKeys<K, V, C> {}

impl<K, V, C> Iterator for IntoValues<K, V, C> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for IntoValues<K, V, C> {
    fn next_back(&mut self) -> Option<V> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V, C> ExactSizeIterator for IntoValues<K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for IntoValues<K, V, C> {}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for Tree<K, V, C> {
    /// Inserts every pair; pairs whose key is already present are dropped.
    #[inline]
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        iter.into_iter().for_each(move |(k, v)| {
            self.insert(k, v);
        });
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for Tree<K, V, C> {
    /// Constructs a `Tree<K, V>` from an iterator of key-value pairs.
    ///
    /// If the iterator produces any pairs with equal keys, the first one
    /// wins and the others are dropped.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Tree<K, V, C> {
        let mut tree = Tree::default();
        tree.extend(iter);
        tree
    }
}

#[cfg(test)]
mod test {
    use crate::{Reversed, Set, Tree};
    use pretty_assertions::assert_eq;

    fn numbered(n: usize) -> Tree<usize, String> {
        (0..n).map(|i| (i, i.to_string())).collect()
    }

    #[test]
    fn iter_empty() {
        let tree = Tree::<usize, ()>::new();
        assert_eq!(None, tree.iter().next());
        assert_eq!(None, tree.iter().next_back());
        assert_eq!(0, tree.iter().len());
    }

    #[test]
    fn iter() {
        let mut tree = Tree::new();
        let zero = "zero".to_string();
        let forty_two = "forty_two".to_string();
        let hundo = "hundo".to_string();

        tree.insert(100, hundo.clone());
        tree.insert(0, zero.clone());
        tree.insert(42, forty_two.clone());

        let mut iter = tree.iter();
        assert_eq!(3, iter.len());
        assert_eq!(Some((&0, &zero)), iter.next());
        assert_eq!(Some((&42, &forty_two)), iter.next());
        assert_eq!(Some((&100, &hundo)), iter.next());
        assert_eq!(None, iter.next());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn iter_rev_insert() {
        let mut tree = Tree::new();
        for i in (0..128).rev() {
            tree.insert(i, ());
        }
        let mut iter = tree.iter();
        for i in 0..128 {
            assert_eq!(Some((&i, &())), iter.next());
        }
        assert_eq!(None, iter.next());
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let tree = numbered(5);
        let mut iter = tree.keys();
        assert_eq!(Some(&0), iter.next());
        assert_eq!(Some(&4), iter.next_back());
        assert_eq!(Some(&1), iter.next());
        assert_eq!(Some(&3), iter.next_back());
        assert_eq!(Some(&2), iter.next());
        assert_eq!(None, iter.next_back());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn min_and_max_follow_ord_not_the_comparator() {
        let mut tree = Tree::with_comparator(Reversed);
        for k in [3, 1, 2] {
            tree.insert(k, ());
        }
        assert_eq!(vec![3, 2, 1], tree.keys().copied().collect::<Vec<_>>());
        assert_eq!(Some(&1), tree.keys().min());
        assert_eq!(Some(&3), tree.keys().max());

        let set: Set<i32, Reversed> = [3, 1, 2].into_iter().collect();
        assert_eq!(Some(&1), set.iter().min());
        assert_eq!(Some(&3), set.iter().max());
    }

    #[test]
    fn iterators_are_covariant() {
        fn shorten_iter<'a>(
            iter: crate::Iter<'a, &'static str, &'static str>,
        ) -> crate::Iter<'a, &'a str, &'a str> {
            iter
        }
        fn shorten_range<'a>(
            range: crate::Range<'a, &'static str, ()>,
        ) -> crate::Range<'a, &'a str, ()> {
            range
        }

        let mut tree = Tree::new();
        tree.insert("a", "x");
        assert_eq!(1, shorten_iter(tree.iter()).count());
        let units: Tree<&'static str, ()> = [("a", ())].into_iter().collect();
        assert_eq!(1, shorten_range(units.range::<&str, _>(..)).count());
    }

    #[test]
    fn iter_mut_edits_values() {
        let mut tree = numbered(4);
        for (k, v) in tree.iter_mut() {
            v.push_str(&k.to_string());
        }
        let values: Vec<&str> = tree.values().map(String::as_str).collect();
        assert_eq!(vec!["00", "11", "22", "33"], values);
    }

    #[test]
    fn walk_matches_len() {
        let mut tree = numbered(300);
        for k in (0..300).step_by(3) {
            tree.remove(&k);
        }
        assert_eq!(tree.len(), tree.iter().count());
        assert_eq!(tree.len(), tree.iter().rev().count());
    }

    #[test]
    fn into_iter_both_ends() {
        let tree = numbered(4);
        let mut iter = tree.into_iter();
        assert_eq!(4, iter.len());
        assert_eq!(Some((0, "0".to_string())), iter.next());
        assert_eq!(Some((3, "3".to_string())), iter.next_back());
        assert_eq!(vec![1, 2], iter.map(|(k, _)| k).collect::<Vec<_>>());
    }

    #[test]
    fn into_keys_and_values() {
        assert_eq!(vec![0, 1, 2], numbered(3).into_keys().collect::<Vec<_>>());
        assert_eq!(
            vec!["2", "1", "0"],
            numbered(3).into_values().rev().collect::<Vec<_>>()
        );
    }

    #[test]
    fn ranges() {
        fn keys(range: crate::Range<'_, usize, String>) -> Vec<usize> {
            range.map(|(k, _)| *k).collect()
        }

        let tree = numbered(10);
        assert_eq!(vec![3, 4, 5], keys(tree.range(3..6)));
        assert_eq!(vec![3, 4, 5, 6], keys(tree.range(3..=6)));
        assert_eq!(vec![0, 1], keys(tree.range(..2)));
        assert_eq!(vec![8, 9], keys(tree.range(8..)));
        assert_eq!(Vec::<usize>::new(), keys(tree.range(6..3)));
        assert_eq!(Vec::<usize>::new(), keys(tree.range(4..4)));
        assert_eq!(Vec::<usize>::new(), keys(tree.range(20..)));
        assert_eq!(vec![5, 4, 3], tree.range(3..6).rev().map(|(k, _)| *k).collect::<Vec<_>>());
    }

    #[test]
    fn retain_keeps_matching() {
        let mut tree = numbered(20);
        tree.retain(|k, _| k % 3 == 0);
        assert_eq!(vec![0, 3, 6, 9, 12, 15, 18], tree.keys().copied().collect::<Vec<_>>());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn extend_skips_present_keys() {
        let mut tree = numbered(2);
        tree.extend(vec![(1, "one".to_string()), (2, "two".to_string())]);
        assert_eq!(3, tree.len());
        assert_eq!(Some(&"1".to_string()), tree.get(&1));
        assert_eq!(Some(&"two".to_string()), tree.get(&2));
    }
}
