use std::{error::Error, fmt};

use crate::{Color, Comparator, Node, NodePtrExt, Tree};

/// A broken red-black or search tree property, as reported by
/// [`Tree::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// An in-order neighbour is not strictly greater than the node before it.
    Unordered,
    /// The root is red.
    RedRoot,
    /// A red node has a red parent.
    RedRed,
    /// Two paths from the root down to an absent child cross a different
    /// number of black nodes.
    BlackHeight { expected: usize, found: usize },
    /// A child does not point back at its parent.
    BrokenParent,
    /// The cached length disagrees with the number of reachable nodes.
    LenMismatch { expected: usize, found: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Unordered => write!(f, "keys are not in strictly ascending order"),
            Violation::RedRoot => write!(f, "the root is red"),
            Violation::RedRed => write!(f, "a red node has a red parent"),
            Violation::BlackHeight { expected, found } => {
                write!(f, "black height {found} where {expected} was expected")
            }
            Violation::BrokenParent => write!(f, "a child does not link back to its parent"),
            Violation::LenMismatch { expected, found } => {
                write!(f, "length is {expected} but {found} nodes are reachable")
            }
        }
    }
}

impl Error for Violation {}

impl<K, V, C: Comparator<K>> Tree<K, V, C> {
    /// Checks every structural property and returns the black height: the
    /// number of black nodes on any path from the root to an absent child.
    ///
    /// Runs in `O(n log n)`; meant for tests and debugging.
    pub fn validate(&self) -> Result<usize, Violation> {
        let Some(top) = self.root.root() else {
            return match self.len {
                0 => Ok(0),
                len => Err(Violation::LenMismatch { expected: len, found: 0 }),
            };
        };
        if Some(top).is_red() {
            return Err(Violation::RedRoot);
        }
        if Some(top).parent().is_some() {
            return Err(Violation::BrokenParent);
        }

        let mut black_height = None;
        let mut count = 0;
        let mut previous: Option<&Node<K, V>> = None;
        let mut current = self.root.first();
        while let Some(node) = current {
            let node_ptr = Some(node);
            let node_ref = unsafe { node.as_ref() };
            count += 1;

            if let Some(previous) = previous {
                if !self.comparator.less(&previous.key, &node_ref.key) {
                    return Err(Violation::Unordered);
                }
            }
            if (node_ptr.left().is_some() && node_ptr.left().parent() != node_ptr)
                || (node_ptr.right().is_some() && node_ptr.right().parent() != node_ptr)
            {
                return Err(Violation::BrokenParent);
            }
            if node_ptr.is_red() && node_ptr.parent().is_red() {
                return Err(Violation::RedRed);
            }
            if node_ref.left.is_none() || node_ref.right.is_none() {
                let found = blacks_above(node_ref);
                match black_height {
                    None => black_height = Some(found),
                    Some(expected) if expected != found => {
                        return Err(Violation::BlackHeight { expected, found });
                    }
                    Some(_) => {}
                }
            }

            previous = Some(node_ref);
            current = node_ref.next();
        }

        if count != self.len {
            return Err(Violation::LenMismatch { expected: self.len, found: count });
        }
        Ok(black_height.unwrap_or(0))
    }
}

/// Black nodes from `node` up to the root, both included.
fn blacks_above<K, V>(node: &Node<K, V>) -> usize {
    let mut blacks = usize::from(node.color() == Color::Black);
    let mut parent = node.parent();
    while let Some(p) = parent {
        let p = unsafe { p.as_ref() };
        blacks += usize::from(p.color() == Color::Black);
        parent = p.parent();
    }
    blacks
}
