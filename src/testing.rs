//! Assertion helpers for tests of frame-validating code
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, StringArray};
//! use arrow::record_batch::RecordBatch;
//! use safe_frame::{assert_valid, assert_violation, Column, Constraint, DType, Schema};
//!
//! let schema = Schema::builder()
//!     .column("id", Column::new(DType::Utf8).unique())
//!     .build();
//!
//! let ok = RecordBatch::try_from_iter([
//!     ("id", Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef),
//! ]).unwrap();
//! let batch = assert_valid!(schema.validate(&ok));
//! assert_eq!(batch.num_rows(), 2);
//!
//! let repeated = RecordBatch::try_from_iter([
//!     ("id", Arc::new(StringArray::from(vec!["a", "a"])) as ArrayRef),
//! ]).unwrap();
//! assert_violation!(schema.validate(&repeated), "id", Constraint::Duplicates { .. });
//! ```

use crate::error::{Error, SchemaValidationError};

/// Errors that may carry schema violations
///
/// Lets [`assert_violation!`](crate::assert_violation) accept both the crate
/// [`Error`] and a bare [`SchemaValidationError`].
pub trait ViolationSource: std::fmt::Display {
    /// The violations, if this error came from validation
    fn validation_error(&self) -> Option<&SchemaValidationError>;
}

impl ViolationSource for Error {
    fn validation_error(&self) -> Option<&SchemaValidationError> {
        self.as_validation()
    }
}

impl ViolationSource for SchemaValidationError {
    fn validation_error(&self) -> Option<&SchemaValidationError> {
        Some(self)
    }
}

/// Assert that a result is `Ok` and evaluate to the value inside.
///
/// Panics with the rendered violations otherwise.
#[macro_export]
macro_rules! assert_valid {
    ($result:expr) => {
        match $result {
            ::std::result::Result::Ok(value) => value,
            ::std::result::Result::Err(err) => {
                panic!("Expected valid data, got: {}", err);
            }
        }
    };
}

/// Assert that a result failed with a violation on `column` matching a
/// [`Constraint`](crate::Constraint) pattern.
///
/// Other violations in the same error are ignored.
#[macro_export]
macro_rules! assert_violation {
    ($result:expr, $column:expr, $constraint:pat) => {{
        let column: &str = $column;
        match $result {
            ::std::result::Result::Ok(_) => {
                panic!("Expected a violation on column '{}', got Ok", column);
            }
            ::std::result::Result::Err(err) => {
                let source = $crate::testing::ViolationSource::validation_error(&err)
                    .unwrap_or_else(|| panic!("Expected a validation error, got: {}", err));
                match source.find(column) {
                    ::std::option::Option::Some(violation) => assert!(
                        matches!(violation.constraint, $constraint),
                        "Column '{}' violated {}, expected {}",
                        column,
                        violation.constraint,
                        stringify!($constraint)
                    ),
                    ::std::option::Option::None => {
                        panic!("No violation on column '{}' in: {}", column, source);
                    }
                }
            }
        }
    }};
}

/// Assert that a [`Validation`](crate::Validation) succeeds.
#[macro_export]
macro_rules! assert_success {
    ($validation:expr) => {
        match $validation {
            $crate::Validation::Success(_) => {}
            $crate::Validation::Failure(e) => {
                panic!("Expected Success, got Failure: {:?}", e);
            }
        }
    };
}

/// Assert that a [`Validation`](crate::Validation) fails.
#[macro_export]
macro_rules! assert_failure {
    ($validation:expr) => {
        match $validation {
            $crate::Validation::Failure(_) => {}
            $crate::Validation::Success(v) => {
                panic!("Expected Failure, got Success: {:?}", v);
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for crate::DType {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop::sample::select(crate::DType::ALL.to_vec()).boxed()
    }
}

#[cfg(feature = "proptest")]
impl Arbitrary for crate::Column {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (any::<crate::DType>(), any::<bool>(), any::<bool>())
            .prop_map(|(dtype, nullable, unique)| {
                let mut column = crate::Column::new(dtype);
                if nullable {
                    column = column.nullable();
                }
                if unique {
                    column = column.unique();
                }
                column
            })
            .boxed()
    }
}
