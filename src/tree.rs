use std::{
    borrow::Borrow,
    cmp::Ordering::*,
    fmt::{self, Debug},
    marker::PhantomData,
    ptr::NonNull,
};

use crate::{Color, Comparator, Natural, Node, NodePtr, NodePtrExt, Root, Side, Tree};

impl<K, V> Tree<K, V, Natural> {
    /// Makes a new, empty `Tree` ordered by [`Ord`].
    pub const fn new() -> Self {
        Tree::with_comparator(Natural)
    }
}

impl<K, V, C: Default> Default for Tree<K, V, C> {
    fn default() -> Self {
        Tree::with_comparator(C::default())
    }
}

impl<K, V, C> Drop for Tree<K, V, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<K, V, C> Tree<K, V, C> {
    /// Makes a new, empty `Tree` ordered by `comparator`.
    pub const fn with_comparator(comparator: C) -> Self {
        Tree {
            root: Root::new(),
            len: 0,
            comparator,
            _marker: PhantomData,
        }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.teardown();
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.root.first().map(|e| {
            let e = unsafe { e.as_ref() };
            (&e.key, &e.value)
        })
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.root.last().map(|e| {
            let e = unsafe { e.as_ref() };
            (&e.key, &e.value)
        })
    }

    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let node = self.root.first()?;
        Some(self.remove_node(node))
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let node = self.root.last()?;
        Some(self.remove_node(node))
    }

    /// Number of nodes on the longest path from the root down, zero when empty.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root.first();
        while let Some(node) = current {
            let node = unsafe { node.as_ref() };
            if node.left.is_none() && node.right.is_none() {
                height = height.max(node.depth() + 1);
            }
            current = node.next();
        }
        height
    }

    /// Pre-order `(key, color, depth)` triples: two trees with equal shapes
    /// are the same tree, node for node.
    pub fn shape(&self) -> Vec<(&K, Color, usize)> {
        let mut shape = Vec::with_capacity(self.len);
        let Some(top) = self.root.root() else {
            return shape;
        };
        let mut current = Some(top);
        while let Some(node) = current {
            let node = unsafe { node.as_ref() };
            shape.push((&node.key, node.color(), node.depth()));
            current = node.next_preorder(top);
        }
        shape
    }

    /// Unlinks `node`, rebalances and hands back its contents.
    pub(crate) fn remove_node(&mut self, node: NonNull<Node<K, V>>) -> (K, V) {
        self.root.erase(node);
        self.len -= 1;
        // SAFETY: the node is out of the tree and only this call knew of it.
        let node = unsafe { Node::own_back(node) };
        (node.key, node.value)
    }

    /// Frees every node without rebalancing, walking down to a leaf, freeing
    /// it and climbing back through the parent link. Only the links
    /// themselves are used as the work list.
    fn teardown(&mut self) {
        if self.len > 0 {
            log::trace!("tearing down {} nodes", self.len);
        }
        let mut current = self.root.take();
        self.len = 0;
        while let Some(node) = current {
            let node_ref = unsafe { node.as_ref() };
            if node_ref.left.is_some() {
                current = node_ref.left;
                continue;
            }
            if node_ref.right.is_some() {
                current = node_ref.right;
                continue;
            }
            current = node_ref.parent();
            // Detach the leaf so its parent becomes a leaf in turn.
            if current.left() == Some(node) {
                current.set_left(None);
            } else {
                current.set_right(None);
            }
            drop(unsafe { Node::own_back(node) });
        }
    }
}

impl<K, V, C: Comparator<K>> Tree<K, V, C> {
    /// Inserts `key` with `value` unless an equal key is present, in which
    /// case nothing changes and both are dropped. Returns whether the entry
    /// went in.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.insert_node(key, value).1
    }

    /// The node holding `key` and whether it is new.
    pub(crate) fn insert_node(&mut self, key: K, value: V) -> (NonNull<Node<K, V>>, bool) {
        let mut parent = None;
        let mut side = Side::Left;
        let mut link = self.root.root();
        while let Some(candidate) = link {
            let candidate_ref = unsafe { candidate.as_ref() };
            parent = link;
            match self.comparator.compare(&key, &candidate_ref.key) {
                Equal => return (candidate, false),
                Greater => {
                    side = Side::Right;
                    link = candidate_ref.right;
                }
                Less => {
                    side = Side::Left;
                    link = candidate_ref.left;
                }
            }
        }

        // Allocate before touching any link.
        let node = Node::leak(key, value);
        self.root.link(node, parent, side);
        self.root.insert_rebalance(node);
        self.len += 1;
        (node, true)
    }
}

// Lookups by any borrowed form the comparator understands.
impl<K, V, C> Tree<K, V, C> {
    pub(crate) fn find_node<Q>(&self, key: &Q) -> NodePtr<K, V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        let mut node = self.root.root();
        while let Some(candidate) = node {
            let candidate = unsafe { candidate.as_ref() };
            match self.comparator.compare(key, candidate.key.borrow()) {
                Equal => break,
                Greater => node = candidate.right,
                Less => node = candidate.left,
            }
        }
        node
    }

    /// First node whose key is not less than `key`.
    pub(crate) fn lower_bound_node<Q>(&self, key: &Q) -> NodePtr<K, V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        let mut bound = None;
        let mut node = self.root.root();
        while let Some(candidate) = node {
            let candidate_ref = unsafe { candidate.as_ref() };
            if self.comparator.less(candidate_ref.key.borrow(), key) {
                node = candidate_ref.right;
            } else {
                bound = node;
                node = candidate_ref.left;
            }
        }
        bound
    }

    /// First node whose key is greater than `key`.
    pub(crate) fn upper_bound_node<Q>(&self, key: &Q) -> NodePtr<K, V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        let mut bound = None;
        let mut node = self.root.root();
        while let Some(candidate) = node {
            let candidate_ref = unsafe { candidate.as_ref() };
            if self.comparator.less(key, candidate_ref.key.borrow()) {
                bound = node;
                node = candidate_ref.left;
            } else {
                node = candidate_ref.right;
            }
        }
        bound
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.find_node(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.find_node(key).map(|e| {
            let e = unsafe { e.as_ref() };
            (&e.key, &e.value)
        })
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.find_node(key)
            .map(|mut e| &mut unsafe { e.as_mut() }.value)
    }

    /// Removes `key` and returns its value; absent keys are a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        let node = self.find_node(key)?;
        Some(self.remove_node(node))
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for Tree<K, V, C> {
    /// Copies node for node, colors included, walking the source in
    /// pre-order through its parent links.
    fn clone(&self) -> Self {
        let mut tree = Tree::with_comparator(self.comparator.clone());
        let Some(src_top) = self.root.root() else {
            return tree;
        };
        log::trace!("deep copying {} nodes", self.len);

        let copy_of = |src: NonNull<Node<K, V>>, parent: NodePtr<K, V>| {
            let src = unsafe { src.as_ref() };
            let mut node = Node::leak(src.key.clone(), src.value.clone());
            unsafe { node.as_mut() }.set_parent_and_color(parent, src.color());
            node
        };

        let dst_top = copy_of(src_top, None);
        // The copy must own what has been built so far should a clone panic.
        tree.root.root = Some(dst_top);
        tree.len = 1;

        let (mut src, mut dst) = (src_top, dst_top);
        loop {
            let src_ref = unsafe { src.as_ref() };
            let dst_ptr = Some(dst);
            match (src_ref.left, dst_ptr.left(), src_ref.right, dst_ptr.right()) {
                (Some(left), None, _, _) => {
                    let copy = copy_of(left, dst_ptr);
                    dst_ptr.set_left(Some(copy));
                    tree.len += 1;
                    (src, dst) = (left, copy);
                }
                (_, _, Some(right), None) => {
                    let copy = copy_of(right, dst_ptr);
                    dst_ptr.set_right(Some(copy));
                    tree.len += 1;
                    (src, dst) = (right, copy);
                }
                // Both subtrees are done: climb.
                _ => {
                    if src == src_top {
                        break;
                    }
                    match (src_ref.parent(), dst_ptr.parent()) {
                        (Some(sp), Some(dp)) => (src, dst) = (sp, dp),
                        _ => break,
                    }
                }
            }
        }

        debug_assert_eq!(self.len, tree.len);
        tree
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for Tree<K, V, C> {
    /// Same length and the same entries in order. Shapes may differ.
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for Tree<K, V, C> {}

impl<K: Debug, V: Debug, C> Debug for Tree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Reversed;

    use pretty_assertions::assert_eq;

    fn keys<V, C>(tree: &Tree<usize, V, C>) -> Vec<usize> {
        tree.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn tree_ctor_works() {
        let tree = Tree::<usize, String>::new();
        assert_eq!(None, tree.first_key_value());
        assert_eq!(false, tree.contains_key(&42));
        assert_eq!(0, tree.len());
        assert_eq!(true, tree.is_empty());
        assert_eq!(0, tree.height());
    }

    #[test]
    fn contains_many() {
        let mut tree = Tree::<usize, String>::new();
        assert_eq!(true, tree.insert(42, "forty two".to_string()));
        assert_eq!(1, tree.len());
        assert_eq!(true, tree.insert(0, "zero".to_string()));
        assert_eq!(true, tree.insert(100, "hundo".to_string()));
        assert_eq!(3, tree.len());

        assert_eq!(true, tree.contains_key(&42));
        assert_eq!(true, tree.contains_key(&0));
        assert_eq!(true, tree.contains_key(&100));
        assert_eq!(false, tree.contains_key(&1));
        assert_eq!(false, tree.contains_key(&1000));
    }

    #[test]
    fn first_and_last() {
        let mut tree = Tree::<usize, String>::new();
        assert_eq!(None, tree.first_key_value());
        assert_eq!(None, tree.last_key_value());

        let forty_two = "forty two".to_string();
        tree.insert(42, forty_two.clone());
        assert_eq!(Some((&42, &forty_two)), tree.first_key_value());
        assert_eq!(Some((&42, &forty_two)), tree.last_key_value());

        let zero = "zero".to_string();
        let hundo = "hundo".to_string();
        tree.insert(0, zero.clone());
        tree.insert(100, hundo.clone());

        assert_eq!(Some((&0, &zero)), tree.first_key_value());
        assert_eq!(Some((&100, &hundo)), tree.last_key_value());
    }

    #[test]
    fn insert_multiple_values() {
        let data: Vec<(usize, String)> = (0..100).map(|i| (i, format!("{i}"))).collect();
        let mut tree = Tree::<usize, String>::new();
        for (k, v) in data.iter() {
            tree.insert(*k, v.to_string());
        }

        assert_eq!(data.len(), tree.len());
        for (k, v) in data.iter() {
            assert_eq!(true, tree.contains_key(k));
            assert_eq!(Some((k, v)), tree.get_key_value(k));
        }
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn insert_same_key_is_rejected() {
        let mut tree = Tree::<usize, String>::new();
        let forty_two = "forty two".to_string();
        assert_eq!(true, tree.insert(42, forty_two.clone()));
        let shape = format!("{:?}", tree.shape());
        assert_eq!(false, tree.insert(42, "42".to_string()));
        assert_eq!(1, tree.len());
        assert_eq!(Some(&forty_two), tree.get(&42));
        assert_eq!(shape, format!("{:?}", tree.shape()));
    }

    #[test]
    fn insert_node_points_at_the_original_on_duplicates() {
        let mut tree = Tree::<usize, &str>::new();
        let (first, inserted) = tree.insert_node(7, "seven");
        assert!(inserted);
        let (again, inserted) = tree.insert_node(7, "SEVEN");
        assert!(!inserted);
        assert_eq!(first, again);
        assert_eq!(Some(&"seven"), tree.get(&7));
    }

    #[test]
    fn borrowed_lookups() {
        let mut tree = Tree::new();
        tree.insert("forty two".to_string(), 42);
        assert_eq!(Some(&42), tree.get("forty two"));
        assert_eq!(true, tree.contains_key("forty two"));
        *tree.get_mut("forty two").unwrap() += 1;
        assert_eq!(Some(43), tree.remove("forty two"));
        assert_eq!(None, tree.remove("forty two"));
    }

    #[test]
    fn pop_first() {
        let mut tree = Tree::<usize, String>::new();
        assert_eq!(None, tree.pop_first());

        let forty_two = "forty two".to_string();
        tree.insert(42, forty_two.clone());
        assert_eq!(Some((42, forty_two.clone())), tree.pop_first());
        assert_eq!(0, tree.len());
        assert_eq!(false, tree.contains_key(&42));

        let zero = "zero".to_string();
        let hundo = "hundo".to_string();
        tree.insert(42, forty_two.clone());
        tree.insert(0, zero.clone());
        tree.insert(100, hundo.clone());

        assert_eq!(Some((0, zero.clone())), tree.pop_first());
        assert_eq!(2, tree.len());
        assert_eq!(Some((100, hundo.clone())), tree.pop_last());
        assert_eq!(1, tree.len());
        assert_eq!(Some((42, forty_two.clone())), tree.pop_first());
        assert_eq!(0, tree.len());
        assert_eq!(None, tree.pop_last());
    }

    #[test]
    fn remove_absent_is_a_noop() {
        let mut tree = Tree::<usize, ()>::new();
        assert_eq!(None, tree.remove(&7));
        assert_eq!(0, tree.len());

        for k in 0..10 {
            tree.insert(k, ());
        }
        assert_eq!(None, tree.remove(&70));
        assert_eq!(10, tree.len());
        assert_eq!((0..10).collect::<Vec<_>>(), keys(&tree));
    }

    #[test]
    fn ascending_then_erase_seven() {
        let mut tree = Tree::<usize, ()>::new();
        for k in 1..=20 {
            tree.insert(k, ());
            assert!(tree.validate().is_ok());
        }
        assert_eq!(Some(()), tree.remove(&7));
        assert!(tree.validate().is_ok());
        let bound = 2.0 * ((tree.len() + 1) as f64).log2();
        assert!((tree.height() as f64) <= bound);
        let expected: Vec<usize> = (1..=20).filter(|k| *k != 7).collect();
        assert_eq!(expected, keys(&tree));
    }

    #[test]
    fn clear_and_reuse() {
        let mut tree = Tree::<usize, String>::new();
        for k in 0..64 {
            tree.insert(k, k.to_string());
        }
        tree.clear();
        assert_eq!(0, tree.len());
        assert_eq!(None, tree.first_key_value());
        tree.insert(1, "one".to_string());
        assert_eq!(vec![1], keys(&tree));
    }

    #[test]
    fn clone_copies_shape_and_colors() {
        let mut tree = Tree::<usize, String>::new();
        for k in [10, 20, 5, 15, 25, 1, 30, 12, 13, 14] {
            tree.insert(k, k.to_string());
        }
        tree.remove(&20);
        let copy = tree.clone();
        assert_eq!(tree.len(), copy.len());
        assert_eq!(tree.shape(), copy.shape());
        assert_eq!(tree, copy);
        assert!(copy.validate().is_ok());
    }

    #[test]
    fn clone_is_independent() {
        let mut tree = Tree::<usize, ()>::new();
        for k in 0..32 {
            tree.insert(k, ());
        }
        let mut copy = tree.clone();
        copy.remove(&3);
        copy.insert(100, ());
        assert_eq!((0..32).collect::<Vec<_>>(), keys(&tree));
        assert_eq!(32, tree.len());
        assert_ne!(tree, copy);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn degenerate_chain_clones_and_drops_iteratively() {
        // A right spine far deeper than any balanced tree: recursion on the
        // height would overflow the stack here.
        const N: usize = 200_000;
        let mut tree = Tree::<usize, ()>::new();
        let mut tail: NodePtr<usize, ()> = None;
        for k in 0..N {
            let node = Some(Node::leak(k, ()));
            node.set_color(Color::Black);
            node.set_parent(tail);
            match tail {
                None => tree.root.root = node,
                Some(_) => tail.set_right(node),
            }
            tail = node;
        }
        tree.len = N;

        let copy = tree.clone();
        assert_eq!(N, copy.len());
        assert!(copy.keys().copied().eq(0..N));
        assert_eq!(Some((&(N - 1), &())), copy.last_key_value());
        drop(tree);
        assert!(copy.iter().rev().map(|(k, _)| *k).eq((0..N).rev()));
        drop(copy);
    }

    #[test]
    fn tree_is_covariant() {
        fn shorten<'a>(tree: Tree<&'static str, &'static str>) -> Tree<&'a str, &'a str> {
            tree
        }
        let mut tree = Tree::new();
        tree.insert("k", "v");
        assert_eq!(Some(&"v"), shorten(tree).get("k"));
    }

    #[test]
    fn equality_ignores_shape() {
        let mut a = Tree::<usize, ()>::new();
        let mut b = Tree::<usize, ()>::new();
        for k in 0..16 {
            a.insert(k, ());
        }
        for k in (0..16).rev() {
            b.insert(k, ());
        }
        assert_ne!(a.shape(), b.shape());
        assert_eq!(a, b);
        b.remove(&0);
        assert_ne!(a, b);
    }

    #[test]
    fn custom_comparator_orders_descending() {
        let mut tree = Tree::with_comparator(Reversed);
        for k in [3usize, 1, 4, 1, 5, 9, 2, 6] {
            tree.insert(k, ());
        }
        assert_eq!(vec![9, 6, 5, 4, 3, 2, 1], keys(&tree));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn debug_is_a_map() {
        let mut tree = Tree::<usize, &str>::new();
        tree.insert(2, "b");
        tree.insert(1, "a");
        assert_eq!(r#"{1: "a", 2: "b"}"#, format!("{tree:?}"));
    }
}
