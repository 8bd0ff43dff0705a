//! Semigroup trait used to accumulate validation failures
//!
//! Column checks never stop at the first failing column. Each check yields its
//! own list of violations, and those lists are merged with [`Semigroup::combine`]
//! so a rejected frame reports every broken column at once.
//!
//! # Examples
//!
//! ```
//! use safe_frame::Semigroup;
//!
//! let left = vec!["id: missing"];
//! let right = vec!["weight: nulls"];
//! assert_eq!(left.combine(right), vec!["id: missing", "weight: nulls"]);
//! ```

/// A type that supports an associative binary operation
///
/// # Laws
///
/// ```text
/// a.combine(b).combine(c) == a.combine(b.combine(c))
/// ```
pub trait Semigroup: Sized {
    /// Combine this value with another value associatively
    fn combine(self, other: Self) -> Self;
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_vec_semigroup_keeps_order() {
        let v1 = vec!["a", "b"];
        let v2 = vec!["c"];
        assert_eq!(v1.combine(v2), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_vec_semigroup_empty() {
        let v1: Vec<i32> = vec![];
        assert_eq!(v1.combine(vec![1]), vec![1]);
    }

    proptest! {
        #[test]
        fn prop_vec_associative(
            a in prop::collection::vec(any::<u8>(), 0..8),
            b in prop::collection::vec(any::<u8>(), 0..8),
            c in prop::collection::vec(any::<u8>(), 0..8),
        ) {
            let left = a.clone().combine(b.clone()).combine(c.clone());
            let right = a.combine(b.combine(c));
            prop_assert_eq!(left, right);
        }
    }
}
