//! Shared key ordering.
//!
//! [`Comparer`] is the injected total order used by every container for
//! lookup, insertion position, uniqueness and enumeration order. It is
//! reference counted so that a grouped list can hand the same item order to
//! every group it creates.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A cloneable total-order function over keys.
///
/// # Examples
///
/// ```rust
/// use observable_collections::comparer::Comparer;
/// use std::cmp::Ordering;
///
/// let natural = Comparer::<i32>::natural();
/// assert_eq!(natural.compare(&1, &2), Ordering::Less);
///
/// let by_length = Comparer::from_fn(|left: &String, right: &String| left.len().cmp(&right.len()));
/// assert!(by_length.equals(&"ab".to_string(), &"cd".to_string()));
/// ```
pub struct Comparer<K> {
    function: Rc<dyn Fn(&K, &K) -> Ordering>,
}

impl<K> Comparer<K> {
    /// Creates a comparer from an ordering function.
    ///
    /// The function must be a total order; containers rely on it for both
    /// sorting and key equality.
    pub fn from_fn<F>(function: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + 'static,
    {
        Self {
            function: Rc::new(function),
        }
    }

    /// Compares two keys.
    #[inline]
    pub fn compare(&self, left: &K, right: &K) -> Ordering {
        (self.function)(left, right)
    }

    /// Returns `true` if the two keys compare equal.
    #[inline]
    pub fn equals(&self, left: &K, right: &K) -> bool {
        self.compare(left, right) == Ordering::Equal
    }
}

impl<K: 'static> Comparer<K> {
    /// Returns a comparer with the opposite order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let inner = Rc::clone(&self.function);
        Self::from_fn(move |left, right| inner(right, left))
    }
}

impl<K: Ord + 'static> Comparer<K> {
    /// The key type's natural order.
    #[must_use]
    pub fn natural() -> Self {
        Self::from_fn(K::cmp)
    }
}

impl<K> Clone for Comparer<K> {
    fn clone(&self) -> Self {
        Self {
            function: Rc::clone(&self.function),
        }
    }
}

impl<K: Ord + 'static> Default for Comparer<K> {
    fn default() -> Self {
        Self::natural()
    }
}

impl<K> fmt::Debug for Comparer<K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Comparer")
    }
}
