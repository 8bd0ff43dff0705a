//! Error types
//!
//! [`SchemaValidationError`] is the one way a frame can be rejected. It always
//! carries at least one [`Violation`], each naming the column label and the
//! [`Constraint`] that failed. [`Error`] wraps it together with the failures
//! that can happen outside validation, such as an Arrow kernel error inside a
//! transform.

use std::fmt;

use arrow::datatypes::DataType;
use arrow::error::ArrowError;

use crate::dtype::DType;
use crate::{NonEmptyVec, Semigroup};

/// The rule a column broke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// The schema declares the column but the frame does not contain it
    MissingColumn,
    /// The column has the wrong type and could not be coerced
    TypeMismatch {
        /// Type the schema requires
        expected: DType,
        /// Arrow type found in the frame
        actual: DataType,
        /// Why the cast failed, when coercion was attempted
        reason: Option<String>,
    },
    /// A non-nullable column contains nulls
    NullValues {
        /// Number of null cells
        count: usize,
    },
    /// A unique column contains repeated values
    Duplicates {
        /// Rendered duplicated values, first few only
        values: Vec<String>,
    },
    /// A strict schema met a column it does not declare
    UndeclaredColumn,
    /// The same label appears more than once in one schema
    DuplicateLabel,
    /// A declared label has no rule in the declaration's schema
    NotInSchema {
        /// Attribute name of the declaration holding the label
        attribute: String,
    },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::MissingColumn => write!(f, "column is missing"),
            Constraint::TypeMismatch {
                expected,
                actual,
                reason,
            } => {
                write!(f, "expected {}, found {}", expected, actual)?;
                if let Some(reason) = reason {
                    write!(f, " ({})", reason)?;
                }
                Ok(())
            }
            Constraint::NullValues { count } => {
                write!(f, "{} null value(s) in a non-nullable column", count)
            }
            Constraint::Duplicates { values } => {
                write!(f, "duplicate values [{}] in a unique column", values.join(", "))
            }
            Constraint::UndeclaredColumn => write!(f, "column is not declared by a strict schema"),
            Constraint::DuplicateLabel => write!(f, "label is declared more than once"),
            Constraint::NotInSchema { attribute } => {
                write!(f, "declared by attribute '{}' but absent from the schema", attribute)
            }
        }
    }
}

/// One failed check on one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Column label
    pub column: String,
    /// Constraint that failed
    pub constraint: Constraint,
}

impl Violation {
    /// A violation of `constraint` on `column`
    pub fn new(column: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            column: column.into(),
            constraint,
        }
    }

    /// `column` is absent from the frame
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::new(column, Constraint::MissingColumn)
    }

    /// `column` holds `count` nulls
    pub fn null_values(column: impl Into<String>, count: usize) -> Self {
        Self::new(column, Constraint::NullValues { count })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column '{}': {}", self.column, self.constraint)
    }
}

/// A frame did not conform to its schema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("schema validation failed: {}", join_violations(.violations))]
pub struct SchemaValidationError {
    violations: NonEmptyVec<Violation>,
}

fn join_violations(violations: &NonEmptyVec<Violation>) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SchemaValidationError {
    /// Wrap one or more violations
    pub fn new(violations: NonEmptyVec<Violation>) -> Self {
        Self { violations }
    }

    /// Build from a list of violations, `None` when the list is empty
    pub fn from_violations(violations: Vec<Violation>) -> Option<Self> {
        NonEmptyVec::from_vec(violations).map(Self::new)
    }

    /// The first violation found
    pub fn first(&self) -> &Violation {
        self.violations.head()
    }

    /// Label of the first failing column
    pub fn column(&self) -> &str {
        &self.first().column
    }

    /// Constraint of the first violation
    pub fn constraint(&self) -> &Constraint {
        &self.first().constraint
    }

    /// All violations in the order they were found
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// First violation reported for `column`
    pub fn find(&self, column: &str) -> Option<&Violation> {
        self.violations.iter().find(|v| v.column == column)
    }

    /// Number of violations, at least one
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Take the violations out of the error
    pub fn into_violations(self) -> NonEmptyVec<Violation> {
        self.violations
    }
}

impl From<Violation> for SchemaValidationError {
    fn from(violation: Violation) -> Self {
        Self::new(NonEmptyVec::singleton(violation))
    }
}

impl Semigroup for SchemaValidationError {
    fn combine(self, other: Self) -> Self {
        Self::new(self.violations.combine(other.violations))
    }
}

/// Errors returned by frame operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The data does not conform to the declaration's schema
    #[error(transparent)]
    Validation(#[from] SchemaValidationError),
    /// An Arrow kernel failed
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    /// An operation referenced a column the frame does not have
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}

impl Error {
    /// The validation failure, if this error is one
    pub fn as_validation(&self) -> Option<&SchemaValidationError> {
        match self {
            Error::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for frame operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_column_and_constraint() {
        let err = SchemaValidationError::from(Violation::missing_column("weight"));
        let display = err.to_string();
        assert!(display.contains("weight"));
        assert!(display.contains("missing"));
    }

    #[test]
    fn test_type_mismatch_display_includes_reason() {
        let constraint = Constraint::TypeMismatch {
            expected: DType::Float64,
            actual: DataType::Utf8,
            reason: Some("cannot parse 'abc'".into()),
        };
        let display = constraint.to_string();
        assert!(display.contains("float64"));
        assert!(display.contains("Utf8"));
        assert!(display.contains("abc"));
    }

    #[test]
    fn test_combine_accumulates() {
        let a = SchemaValidationError::from(Violation::missing_column("id"));
        let b = SchemaValidationError::from(Violation::null_values("weight", 2));
        let combined = a.combine(b);

        assert_eq!(combined.len(), 2);
        assert_eq!(combined.column(), "id");
        assert_eq!(
            combined.find("weight").map(|v| &v.constraint),
            Some(&Constraint::NullValues { count: 2 })
        );
    }

    #[test]
    fn test_from_empty_violations() {
        assert!(SchemaValidationError::from_violations(vec![]).is_none());
    }

    #[test]
    fn test_error_wraps_validation() {
        let err: Error = SchemaValidationError::from(Violation::missing_column("id")).into();
        assert_eq!(err.as_validation().map(|e| e.column()), Some("id"));
        assert!(err.to_string().starts_with("schema validation failed"));
    }
}
