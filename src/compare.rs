use std::cmp::Ordering::{self, *};

/// A strict weak ordering over `T`, fixed for the lifetime of a tree.
///
/// `less` must be pure: the same two arguments always yield the same answer,
/// `less(a, a)` is false, and the relation is transitive. Two keys for which
/// neither `less(a, b)` nor `less(b, a)` holds are the same key as far as the
/// tree is concerned.
///
/// # Examples
///
/// ```
/// use rbmap::Map;
///
/// let mut map = Map::with_comparator(|a: &i32, b: &i32| a > b);
/// map.insert(1, "a");
/// map.insert(3, "c");
/// map.insert(2, "b");
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
pub trait Comparator<T: ?Sized> {
    fn less(&self, a: &T, b: &T) -> bool;

    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        if self.less(a, b) {
            Less
        } else if self.less(b, a) {
            Greater
        } else {
            Equal
        }
    }
}

/// Ascending order as given by [`Ord`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Natural;

/// Descending order as given by [`Ord`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reversed;

impl<T: Ord + ?Sized> Comparator<T> for Natural {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }

    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T: Ord + ?Sized> Comparator<T> for Reversed {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        b < a
    }

    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        b.cmp(a)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}
