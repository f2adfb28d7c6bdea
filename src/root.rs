use std::ptr::NonNull;

use super::{Color, Node, NodePtr, NodePtrExt, Root, Side};

impl<K, V> Root<K, V> {
    pub(crate) const fn new() -> Self {
        Root { root: None }
    }

    #[inline]
    pub(crate) fn root(&self) -> NodePtr<K, V> {
        self.root
    }

    /// Forgets every node without freeing it; the caller takes over.
    #[inline]
    pub(crate) fn take(&mut self) -> NodePtr<K, V> {
        self.root.take()
    }

    #[inline]
    pub(crate) fn first(&self) -> NodePtr<K, V> {
        self.root.map(Node::minimum)
    }

    #[inline]
    pub(crate) fn last(&self) -> NodePtr<K, V> {
        self.root.map(Node::maximum)
    }

    /// Hangs the detached leaf `node` under `parent` on `side`, or makes it the
    /// root when there is no parent. The leaf is painted red; call
    /// [`Root::insert_rebalance`] next.
    pub(crate) fn link(&mut self, mut node: NonNull<Node<K, V>>, parent: NodePtr<K, V>, side: Side) {
        // SAFETY: node is a fresh leaf no one else can see yet.
        unsafe { node.as_mut() }.set_parent_and_color(parent, Color::Red);
        match (parent, side) {
            (None, _) => self.root = Some(node),
            (parent, Side::Left) => parent.set_left(Some(node)),
            (parent, Side::Right) => parent.set_right(Some(node)),
        }
    }

    /// Restores the red-black properties after `node` was linked as a red leaf.
    pub(crate) fn insert_rebalance(&mut self, node: NonNull<Node<K, V>>) {
        let mut node: NodePtr<K, V> = Some(node);

        loop {
            /*
             * Loop invariant: node is red.
             */
            let mut parent = node.parent();
            if parent.is_none() {
                /*
                 * The inserted node is root. Either this is the
                 * first node, or we recursed at Case 1 below.
                 */
                break;
            }

            /*
             * If there is a black parent, we are done.
             * Otherwise two consecutive reds must be fixed.
             * A red parent is never the root, so gparent exists.
             */
            if parent.is_black() {
                break;
            }
            let gparent = parent.parent();

            if parent == gparent.left() {
                let uncle = gparent.right();
                if uncle.is_red() {
                    /*
                     * Case 1 - node's uncle is red (color flips).
                     *
                     *       G            g
                     *      / \          / \
                     *     p   u  -->   P   U
                     *    /            /
                     *   n            n
                     *
                     * g's parent might be red, so go on at g.
                     */
                    parent.set_color(Color::Black);
                    uncle.set_color(Color::Black);
                    gparent.set_color(Color::Red);
                    node = gparent;
                    continue;
                }

                if node == parent.right() {
                    /*
                     * Case 2 - node's uncle is black and node is
                     * the parent's right child (left rotate at parent).
                     *
                     *      G             G
                     *     / \           / \
                     *    p   U  -->    n   U
                     *     \           /
                     *      n         p
                     *
                     * This falls into Case 3 with the roles swapped.
                     */
                    self.rotate_left(parent);
                    node = parent;
                    parent = node.parent();
                }

                /*
                 * Case 3 - node's uncle is black and node is
                 * the parent's left child (right rotate at gparent).
                 *
                 *        G           P
                 *       / \         / \
                 *      p   U  -->  n   g
                 *     /                 \
                 *    n                   U
                 */
                parent.set_color(Color::Black);
                gparent.set_color(Color::Red);
                self.rotate_right(gparent);
                break;
            } else {
                let uncle = gparent.left();
                if uncle.is_red() {
                    /* Case 1 - color flips */
                    parent.set_color(Color::Black);
                    uncle.set_color(Color::Black);
                    gparent.set_color(Color::Red);
                    node = gparent;
                    continue;
                }

                if node == parent.left() {
                    /* Case 2 - right rotate at parent */
                    self.rotate_right(parent);
                    node = parent;
                    parent = node.parent();
                }

                /* Case 3 - left rotate at gparent */
                parent.set_color(Color::Black);
                gparent.set_color(Color::Red);
                self.rotate_left(gparent);
                break;
            }
        }

        self.root.set_color(Color::Black);
    }

    /// Unlinks `node` and rebalances. The node is not freed.
    pub(crate) fn erase(&mut self, node: NonNull<Node<K, V>>) {
        let z: NodePtr<K, V> = Some(node);
        // The color that vacated a slot, the node now in that slot (maybe
        // absent) and that slot's parent.
        let mut vacated = z.color();
        let x;
        let x_parent;

        if z.left().is_none() {
            /*
             * Case 1: at most a right child.
             *
             *    (z)          (r)
             *      \    ->
             *      (r)
             */
            x = z.right();
            x_parent = z.parent();
            self.transplant(z, x);
        } else if z.right().is_none() {
            /* Still case 1, but this time the child is on the left */
            x = z.left();
            x_parent = z.parent();
            self.transplant(z, x);
        } else {
            let y = z.right().map(Node::minimum);
            vacated = y.color();
            x = y.right();

            if y.parent() == z {
                /*
                 * Case 2: z's successor is its right child
                 *
                 *    (z)          (y)
                 *    / \          / \
                 *  (a) (y)  ->  (a) (x)
                 *        \
                 *        (x)
                 */
                x_parent = y;
            } else {
                /*
                 * Case 3: z's successor is leftmost under
                 * z's right child subtree
                 *
                 *    (z)          (y)
                 *    / \          / \
                 *  (a) (b)  ->  (a) (b)
                 *      /            /
                 *    (p)          (p)
                 *    /            /
                 *  (y)          (x)
                 *    \
                 *    (x)
                 */
                x_parent = y.parent();
                self.transplant(y, x);
                y.set_right(z.right());
                z.right().set_parent(y);
            }

            self.transplant(z, y);
            y.set_left(z.left());
            z.left().set_parent(y);
            y.set_color(z.color());
        }

        // Removing red cannot change any black height.
        if vacated == Color::Black {
            self.erase_rebalance(x, x_parent);
        }
    }
}

// Private
impl<K, V> Root<K, V> {
    /// `node` carries an extra black; push it up until it can be absorbed.
    fn erase_rebalance(&mut self, mut node: NodePtr<K, V>, mut parent: NodePtr<K, V>) {
        /*
         * Loop invariants:
         * - node is black (possibly absent)
         * - node is not the root, so parent is present
         * - All leaf paths going through node have a black count
         *   that is 1 lower than other leaf paths through parent.
         */
        while node != self.root && node.is_black() {
            if node == parent.left() {
                let mut sibling = parent.right();
                if sibling.is_red() {
                    /*
                     * Case 1 - left rotate at parent
                     *
                     *     P               S
                     *    / \             / \
                     *   N   s    -->    p   Sr
                     *      / \         / \
                     *     Sl  Sr      N   Sl
                     */
                    sibling.set_color(Color::Black);
                    parent.set_color(Color::Red);
                    self.rotate_left(parent);
                    sibling = parent.right();
                }
                if sibling.left().is_black() && sibling.right().is_black() {
                    /*
                     * Case 2 - sibling color flip
                     * (p could be either color here)
                     *
                     *    (p)           (p)
                     *    / \           / \
                     *   N   S    -->  N   s
                     *      / \           / \
                     *     Sl  Sr        Sl  Sr
                     *
                     * The defect moves up to p.
                     */
                    sibling.set_color(Color::Red);
                    node = parent;
                    parent = node.parent();
                    continue;
                }
                if sibling.right().is_black() {
                    /*
                     * Case 3 - right rotate at sibling
                     *
                     *   (p)           (p)
                     *   / \           / \
                     *  N   S    -->  N   Sl
                     *     / \             \
                     *    sl  Sr            s
                     *                       \
                     *                        Sr
                     */
                    sibling.left().set_color(Color::Black);
                    sibling.set_color(Color::Red);
                    self.rotate_right(sibling);
                    sibling = parent.right();
                }
                /*
                 * Case 4 - left rotate at parent + color flips
                 *
                 *      (p)             (s)
                 *      / \             / \
                 *     N   S     -->   P   Sr
                 *        / \         / \
                 *      (sl) sr      N  (sl)
                 */
                sibling.set_color(parent.color());
                parent.set_color(Color::Black);
                sibling.right().set_color(Color::Black);
                self.rotate_left(parent);
                node = self.root;
                parent = None;
            } else {
                let mut sibling = parent.left();
                if sibling.is_red() {
                    /* Case 1 - right rotate at parent */
                    sibling.set_color(Color::Black);
                    parent.set_color(Color::Red);
                    self.rotate_right(parent);
                    sibling = parent.left();
                }
                if sibling.left().is_black() && sibling.right().is_black() {
                    /* Case 2 - sibling color flip */
                    sibling.set_color(Color::Red);
                    node = parent;
                    parent = node.parent();
                    continue;
                }
                if sibling.left().is_black() {
                    /* Case 3 - left rotate at sibling */
                    sibling.right().set_color(Color::Black);
                    sibling.set_color(Color::Red);
                    self.rotate_left(sibling);
                    sibling = parent.left();
                }
                /* Case 4 - right rotate at parent + color flips */
                sibling.set_color(parent.color());
                parent.set_color(Color::Black);
                sibling.left().set_color(Color::Black);
                self.rotate_right(parent);
                node = self.root;
                parent = None;
            }
        }
        node.set_color(Color::Black);
    }
}

impl<K, V> Root<K, V> {
    /// ```text
    ///     x                y
    ///    / \              / \
    ///   a   y     -->    x   c
    ///      / \          / \
    ///     b   c        a   b
    /// ```
    ///
    /// `x` must have a right child.
    pub(crate) fn rotate_left(&mut self, x: NodePtr<K, V>) {
        let y = x.right();
        debug_assert!(y.is_some(), "rotate_left without a right child");
        if y.is_none() {
            return;
        }
        let b = y.left();
        x.set_right(b);
        b.set_parent(x);
        self.transplant(x, y);
        y.set_left(x);
        x.set_parent(y);
    }

    /// Mirror of [`Root::rotate_left`]; `x` must have a left child.
    pub(crate) fn rotate_right(&mut self, x: NodePtr<K, V>) {
        let y = x.left();
        debug_assert!(y.is_some(), "rotate_right without a left child");
        if y.is_none() {
            return;
        }
        let b = y.right();
        x.set_left(b);
        b.set_parent(x);
        self.transplant(x, y);
        y.set_right(x);
        x.set_parent(y);
    }

    /// Puts `new` in `old`'s slot under `old`'s parent. `old` keeps its own
    /// links.
    fn transplant(&mut self, old: NodePtr<K, V>, new: NodePtr<K, V>) {
        let parent = old.parent();
        self.change_child(old, new, parent);
        new.set_parent(parent);
    }

    fn change_child(&mut self, old: NodePtr<K, V>, new: NodePtr<K, V>, parent: NodePtr<K, V>) {
        if parent.is_none() {
            self.root = new;
        } else if parent.left() == old {
            parent.set_left(new);
        } else {
            parent.set_right(new);
        }
    }
}
