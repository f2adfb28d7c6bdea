use crate::{Comparator, IntoIter, Iter, IterMut, Map, Tree};

impl<K, V, C> IntoIterator for Map<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C>;

    fn into_iter(self) -> IntoIter<K, V, C> {
        self.tree.into_iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a Map<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut Map<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for Map<K, V, C> {
    #[inline]
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.tree.extend(iter);
    }
}

impl<'a, K: Copy + 'a, V: Copy + 'a, C: Comparator<K>> Extend<(&'a K, &'a V)> for Map<K, V, C> {
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.tree.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for Map<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Map {
            tree: Tree::from_iter(iter),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Map<K, V>
where
    K: Ord,
{
    /// ```
    /// use rbmap::Map;
    ///
    /// let map1 = Map::from([(1, 2), (3, 4)]);
    /// let map2: Map<_, _> = [(1, 2), (3, 4)].into();
    /// assert_eq!(map1, map2);
    /// ```
    fn from(arr: [(K, V); N]) -> Self {
        Map::from_iter(arr)
    }
}

#[cfg(test)]
mod test {
    use crate::Map;
    use pretty_assertions::assert_eq;

    #[test]
    fn for_loops() {
        let mut map = Map::from([(1, 10), (2, 20)]);
        for (_, v) in &mut map {
            *v += 1;
        }
        let mut seen = Vec::new();
        for (k, v) in &map {
            seen.push((*k, *v));
        }
        assert_eq!(vec![(1, 11), (2, 21)], seen);
        assert_eq!(vec![(1, 11), (2, 21)], map.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn extend_by_reference() {
        let mut map = Map::from([(1, 'a')]);
        let more = [(1, 'x'), (2, 'b')];
        map.extend(more.iter().map(|(k, v)| (k, v)));
        assert_eq!(Map::from([(1, 'a'), (2, 'b')]), map);
    }
}
