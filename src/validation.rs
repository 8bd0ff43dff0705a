//! Validation type for accumulating column failures
//!
//! [`Validation`] is shaped like `Result`, but combining two failures merges
//! their errors instead of keeping only the first. The schema engine runs one
//! check per declared column and folds the outcomes with [`Validation::all_vec`],
//! which is why a rejected frame can name every broken column at once.
//!
//! # Examples
//!
//! ```
//! use safe_frame::Validation;
//!
//! let checks = vec![
//!     Validation::<&str, Vec<&str>>::success("id"),
//!     Validation::failure(vec!["weight: missing"]),
//!     Validation::failure(vec!["kind: nulls"]),
//! ];
//!
//! assert_eq!(
//!     Validation::all_vec(checks),
//!     Validation::Failure(vec!["weight: missing", "kind: nulls"]),
//! );
//! ```

use crate::Semigroup;

/// A validation that either succeeds with a value or fails with accumulated errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T, E> {
    /// Successful validation with a value
    Success(T),
    /// Failed validation with accumulated errors
    Failure(E),
}

impl<T, E> Validation<T, E> {
    /// Create a successful validation
    #[inline]
    pub fn success(value: T) -> Self {
        Validation::Success(value)
    }

    /// Create a failed validation
    #[inline]
    pub fn failure(error: E) -> Self {
        Validation::Failure(error)
    }

    /// Convert this validation to a Result
    #[inline]
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Validation::Success(value) => Ok(value),
            Validation::Failure(error) => Err(error),
        }
    }

    /// Transform the success value if present
    #[inline]
    pub fn map<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Validation::Success(value) => Validation::Success(f(value)),
            Validation::Failure(error) => Validation::Failure(error),
        }
    }
}

impl<T, E: Semigroup> Validation<T, E> {
    /// Combine two validations, accumulating errors when both fail
    ///
    /// ```
    /// use safe_frame::Validation;
    ///
    /// let nulls = Validation::<(), _>::failure(vec!["nulls"]);
    /// let dupes = Validation::<(), _>::failure(vec!["duplicates"]);
    /// assert_eq!(nulls.and(dupes), Validation::Failure(vec!["nulls", "duplicates"]));
    /// ```
    pub fn and<U>(self, other: Validation<U, E>) -> Validation<(T, U), E> {
        match (self, other) {
            (Validation::Success(a), Validation::Success(b)) => Validation::Success((a, b)),
            (Validation::Failure(e1), Validation::Failure(e2)) => {
                Validation::Failure(e1.combine(e2))
            }
            (Validation::Failure(e), _) => Validation::Failure(e),
            (_, Validation::Failure(e)) => Validation::Failure(e),
        }
    }

    /// Chain a dependent validation
    ///
    /// The function only runs when this validation succeeded. Used where a
    /// later check is meaningless without the earlier one, such as checking
    /// nulls in a column that could not be cast.
    #[inline]
    pub fn and_then<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> Validation<U, E>,
    {
        match self {
            Validation::Success(value) => f(value),
            Validation::Failure(error) => Validation::Failure(error),
        }
    }

    /// Combine all validations in a Vec, accumulating every failure
    pub fn all_vec(validations: Vec<Validation<T, E>>) -> Validation<Vec<T>, E> {
        let mut successes = Vec::new();
        let mut failure: Option<E> = None;

        for validation in validations {
            match validation {
                Validation::Success(value) => successes.push(value),
                Validation::Failure(error) => {
                    failure = Some(match failure {
                        Some(acc) => acc.combine(error),
                        None => error,
                    });
                }
            }
        }

        match failure {
            None => Validation::Success(successes),
            Some(error) => Validation::Failure(error),
        }
    }
}
