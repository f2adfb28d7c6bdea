use std::{
    fmt::Debug,
    ptr::{self, NonNull},
};

use super::{Color, Node, NodePtr};

// Storage.
impl<K, V> Node<K, V> {
    /// A detached red leaf: no parent, no children.
    pub(crate) fn new(key: K, value: V) -> Self {
        Node {
            parent_color: ptr::null(),
            left: None,
            right: None,
            key,
            value,
        }
    }

    /// Moves a fresh leaf onto the heap. The node leaks unless it is handed
    /// back through [`Node::own_back`].
    pub(crate) fn leak(key: K, value: V) -> NonNull<Node<K, V>> {
        NonNull::from(Box::leak(Box::new(Node::new(key, value))))
    }

    /// # Safety
    ///
    /// `node` must come from [`Node::leak`], must be unlinked from its tree,
    /// and must not be used afterwards.
    pub(crate) unsafe fn own_back(node: NonNull<Node<K, V>>) -> Box<Node<K, V>> {
        unsafe { Box::from_raw(node.as_ptr()) }
    }
}

// Color and parent, packed in one word.
impl<K, V> Node<K, V> {
    #[inline(always)]
    pub(crate) fn color(&self) -> Color {
        Color::from(self.parent_color.addr() & 1)
    }

    #[inline(always)]
    pub(crate) fn parent(&self) -> NodePtr<K, V> {
        NonNull::new(self.parent_color.map_addr(|p| p & !1).cast_mut())
    }

    #[inline(always)]
    pub(crate) fn set_parent_and_color(&mut self, parent: NodePtr<K, V>, color: Color) {
        let parent = parent.map_or(ptr::null(), |p| p.as_ptr().cast_const());
        self.parent_color = parent.map_addr(|p| p | usize::from(color));
    }

    #[inline(always)]
    pub(crate) fn set_parent(&mut self, parent: NodePtr<K, V>) {
        self.set_parent_and_color(parent, self.color());
    }

    #[inline(always)]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.set_parent_and_color(self.parent(), color);
    }
}

// Traversal.
impl<K, V> Node<K, V> {
    #[inline]
    pub(crate) fn minimum(mut node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
        // SAFETY: every link reachable from a live node is live.
        while let Some(left) = unsafe { node.as_ref() }.left {
            node = left;
        }
        node
    }

    #[inline]
    pub(crate) fn maximum(mut node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
        while let Some(right) = unsafe { node.as_ref() }.right {
            node = right;
        }
        node
    }

    /// The in-order successor, or `None` past the maximum.
    #[inline]
    pub(crate) fn next(&self) -> NodePtr<K, V> {
        // If we have a right-hand child, go down and then left as far as we
        // can.
        if let Some(right) = self.right {
            return Some(Node::minimum(right));
        }
        // No right-hand children. Everything down and left is smaller than us,
        // so any 'next' node must be in the general direction of our parent.
        // Go up until we leave a left-hand child; that child's parent is next.
        let mut node_ref = self;
        loop {
            let parent = node_ref.parent()?;
            // SAFETY: parent links of a live node are live.
            let parent_ref = unsafe { parent.as_ref() };
            if parent_ref.right != Some(NonNull::from(node_ref)) {
                return Some(parent);
            }
            node_ref = parent_ref;
        }
    }

    /// The in-order predecessor, or `None` before the minimum.
    #[inline]
    pub(crate) fn prev(&self) -> NodePtr<K, V> {
        if let Some(left) = self.left {
            return Some(Node::maximum(left));
        }
        let mut node_ref = self;
        loop {
            let parent = node_ref.parent()?;
            let parent_ref = unsafe { parent.as_ref() };
            if parent_ref.left != Some(NonNull::from(node_ref)) {
                return Some(parent);
            }
            node_ref = parent_ref;
        }
    }

    /// Node after `self` in a pre-order walk of the subtree rooted at `top`.
    pub(crate) fn next_preorder(&self, top: NonNull<Node<K, V>>) -> NodePtr<K, V> {
        if let Some(left) = self.left {
            return Some(left);
        }
        if let Some(right) = self.right {
            return Some(right);
        }
        // A leaf: climb until we come out of a left subtree whose parent
        // still has a right subtree to visit.
        let mut node = NonNull::from(self);
        while node != top {
            let parent = unsafe { node.as_ref() }.parent()?;
            let parent_ref = unsafe { parent.as_ref() };
            if parent_ref.left == Some(node) && parent_ref.right.is_some() {
                return parent_ref.right;
            }
            node = parent;
        }
        None
    }

    /// Number of links between `self` and the root.
    pub(crate) fn depth(&self) -> usize {
        let mut depth = 0;
        let mut parent = self.parent();
        while let Some(p) = parent {
            depth += 1;
            parent = unsafe { p.as_ref() }.parent();
        }
        depth
    }
}

impl<K, V> Debug for Node<K, V>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{:?}::({:?},{:?})",
            self.color(),
            self.key,
            self.value
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    // Link nodes (parent to child) and set the child's parent pointer. The
    // colors don't matter for traversal.
    macro_rules! link {
        ($parent:expr, $child:expr, left) => {
            $parent.left = Some(NonNull::from(&mut *$child));
            $child.set_parent_and_color(Some(NonNull::from(&mut *$parent)), Color::Red);
        };
        ($parent:expr, $child:expr, right) => {
            $parent.right = Some(NonNull::from(&mut *$child));
            $child.set_parent_and_color(Some(NonNull::from(&mut *$parent)), Color::Black);
        };
    }

    type TestNode = Node<i32, &'static str>;

    fn keys_from(start: &TestNode, step: fn(&TestNode) -> NodePtr<i32, &'static str>) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut current = step(start);
        while let Some(node) = current {
            let node = unsafe { node.as_ref() };
            keys.push(node.key);
            current = step(node);
        }
        keys
    }

    #[test]
    fn fresh_node_is_a_red_leaf() {
        let node = Node::new(1, "value");
        assert_eq!(Color::Red, node.color());
        assert_eq!(None, node.parent());
        assert_eq!(None, node.left);
        assert_eq!(None, node.right);
        assert_eq!(None, node.next());
        assert_eq!(None, node.prev());
        assert_eq!(0, node.depth());
    }

    #[test]
    fn color_and_parent_share_a_word() {
        let mut parent = Node::new(10, "parent");
        let mut child = Node::new(5, "child");
        let parent_ptr = Some(NonNull::from(&mut parent));

        child.set_parent_and_color(parent_ptr, Color::Black);
        assert_eq!(Color::Black, child.color());
        assert_eq!(parent_ptr, child.parent());

        child.set_color(Color::Red);
        assert_eq!(Color::Red, child.color());
        assert_eq!(parent_ptr, child.parent());

        child.set_parent(None);
        assert_eq!(Color::Red, child.color());
        assert_eq!(None, child.parent());
    }

    #[test]
    fn leak_and_own_back() {
        let node = Node::leak(String::from("k"), 42);
        let node = unsafe { Node::own_back(node) };
        assert_eq!("k", node.key);
        assert_eq!(42, node.value);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn walks_a_linked_tree() {
        //        7
        //      /   \
        //     3     10
        //    / \      \
        //   1   5      12
        let mut n7 = Node::new(7, "root");
        let mut n3 = Node::new(3, "left_child_7");
        let mut n10 = Node::new(10, "right_child_7");
        let mut n1 = Node::new(1, "left_child_3");
        let mut n5 = Node::new(5, "right_child_3");
        let mut n12 = Node::new(12, "right_child_10");

        link!(&mut n10, &mut n12, right);
        link!(&mut n3, &mut n1, left);
        link!(&mut n3, &mut n5, right);
        link!(&mut n7, &mut n3, left);
        link!(&mut n7, &mut n10, right);

        assert_eq!(vec![3, 5, 7, 10, 12], keys_from(&n1, Node::next));
        assert_eq!(vec![7, 10, 12], keys_from(&n5, Node::next));
        assert_eq!(Vec::<i32>::new(), keys_from(&n12, Node::next));
        assert_eq!(vec![10, 7, 5, 3, 1], keys_from(&n12, Node::prev));
        assert_eq!(vec![3, 1], keys_from(&n5, Node::prev));
        assert_eq!(Vec::<i32>::new(), keys_from(&n1, Node::prev));

        let top = NonNull::from(&n7);
        assert_eq!(1, unsafe { Node::minimum(top).as_ref() }.key);
        assert_eq!(12, unsafe { Node::maximum(top).as_ref() }.key);
        assert_eq!(2, n5.depth());

        let mut preorder = vec![n7.key];
        let mut current = n7.next_preorder(top);
        while let Some(node) = current {
            let node = unsafe { node.as_ref() };
            preorder.push(node.key);
            current = node.next_preorder(top);
        }
        assert_eq!(vec![7, 3, 1, 5, 10, 12], preorder);
    }
}
