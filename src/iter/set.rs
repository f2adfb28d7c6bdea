use crate::{Comparator, IntoKeys, Keys, Set, Tree};

impl<T, C: Comparator<T> + Default> FromIterator<T> for Set<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Set<T, C> {
        let mut tree = Tree::default();
        for k in iter {
            tree.insert(k, ());
        }

        Self { tree }
    }
}

impl<T, C: Comparator<T>> Extend<T> for Set<T, C> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(move |elem| {
            self.insert(elem);
        });
    }
}

impl<T, C> IntoIterator for Set<T, C> {
    type Item = T;
    type IntoIter = IntoKeys<T, (), C>;

    fn into_iter(self) -> IntoKeys<T, (), C> {
        self.tree.into_keys()
    }
}

impl<'a, T, C> IntoIterator for &'a Set<T, C> {
    type Item = &'a T;
    type IntoIter = Keys<'a, T, ()>;

    fn into_iter(self) -> Keys<'a, T, ()> {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use crate::Set;
    use pretty_assertions::assert_eq;

    #[test]
    fn collect_drops_duplicates() {
        let set: Set<char> = "mississippi".chars().collect();
        assert_eq!(vec!['i', 'm', 'p', 's'], set.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn borrowed_loop() {
        let set: Set<u8> = [3, 1, 2].into_iter().collect();
        let mut total = 0;
        for x in &set {
            total = total * 10 + x;
        }
        assert_eq!(123, total);
    }
}
