//! Non-empty vector used to carry validation failures
//!
//! A rejected frame always has at least one reason. [`NonEmptyVec`] makes that
//! a type-level fact, so [`SchemaValidationError::first`](crate::SchemaValidationError::first)
//! never needs to return an `Option`.
//!
//! # Examples
//!
//! ```
//! use safe_frame::NonEmptyVec;
//!
//! let labels = NonEmptyVec::new("id", vec!["weight"]);
//! assert_eq!(labels.head(), &"id");
//! assert_eq!(labels.len(), 2);
//! ```

use crate::Semigroup;

/// A vector guaranteed to contain at least one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyVec<T> {
    head: T,
    tail: Vec<T>,
}

impl<T> NonEmptyVec<T> {
    /// Create a non-empty vector from a head element and a tail.
    pub fn new(head: T, tail: Vec<T>) -> Self {
        Self { head, tail }
    }

    /// Create a non-empty vector holding one element.
    pub fn singleton(value: T) -> Self {
        Self::new(value, Vec::new())
    }

    /// Create a non-empty vector from a `Vec`, or `None` when it is empty.
    ///
    /// ```
    /// use safe_frame::NonEmptyVec;
    ///
    /// assert!(NonEmptyVec::from_vec(vec![1, 2]).is_some());
    /// assert!(NonEmptyVec::from_vec(Vec::<i32>::new()).is_none());
    /// ```
    pub fn from_vec(mut vec: Vec<T>) -> Option<Self> {
        if vec.is_empty() {
            None
        } else {
            let head = vec.remove(0);
            Some(Self::new(head, vec))
        }
    }

    /// The first element.
    pub fn head(&self) -> &T {
        &self.head
    }

    /// Everything after the first element.
    pub fn tail(&self) -> &[T] {
        &self.tail
    }

    /// Number of elements, at least one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    /// Iterate over all elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.head).chain(self.tail.iter())
    }

    /// Convert into a plain `Vec`.
    pub fn into_vec(self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        out.push(self.head);
        out.extend(self.tail);
        out
    }
}

impl<T> Semigroup for NonEmptyVec<T> {
    fn combine(mut self, other: Self) -> Self {
        self.tail.push(other.head);
        self.tail.extend(other.tail);
        self
    }
}

impl<T> IntoIterator for NonEmptyVec<T> {
    type Item = T;
    type IntoIter = std::iter::Chain<std::iter::Once<T>, std::vec::IntoIter<T>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self.head).chain(self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_splits_head() {
        let nev = NonEmptyVec::from_vec(vec!["id", "weight", "kind"]).unwrap();
        assert_eq!(nev.head(), &"id");
        assert_eq!(nev.tail(), &["weight", "kind"]);
    }

    #[test]
    fn test_from_empty_vec() {
        assert!(NonEmptyVec::from_vec(Vec::<u8>::new()).is_none());
    }

    #[test]
    fn test_combine_preserves_order() {
        let a = NonEmptyVec::new(1, vec![2]);
        let b = NonEmptyVec::singleton(3);
        assert_eq!(a.combine(b).into_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_iter_matches_into_iter() {
        let nev = NonEmptyVec::new('a', vec!['b', 'c']);
        let borrowed: Vec<char> = nev.iter().copied().collect();
        let owned: Vec<char> = nev.into_iter().collect();
        assert_eq!(borrowed, owned);
    }
}
