//! # safe-frame
//!
//! Schema-validated Arrow record batches.
//!
//! A dataset shape is declared once: a [`columns!`] struct names the columns,
//! and its [`ColumnDeclaration`] implementation says what each column must
//! hold. A [`ValidatedFrame`] wraps a [`RecordBatch`](arrow::record_batch::RecordBatch)
//! that was checked against that schema when it was built. Code receiving a
//! `ValidatedFrame<D>` can rely on the columns of `D` being present, typed,
//! null-free where required and unique where required.
//!
//! Validation reports every broken rule at once rather than the first one,
//! using the accumulating [`Validation`] type.
//!
//! ## Quick Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Float64Array, Int64Array};
//! use arrow::record_batch::RecordBatch;
//! use safe_frame::prelude::*;
//!
//! columns! {
//!     pub struct ParcelColumns {
//!         id => "id",
//!         weight => "weight",
//!     }
//! }
//!
//! impl ColumnDeclaration for ParcelColumns {
//!     fn get_data_schema(&self) -> Schema {
//!         Schema::builder()
//!             .column(&self.id, Column::new(DType::Utf8).unique())
//!             .column(&self.weight, Column::new(DType::Float64).nullable())
//!             .coerce(true)
//!             .build()
//!     }
//! }
//!
//! type Parcels = ValidatedFrame<ParcelColumns>;
//!
//! // Integer ids are coerced to strings.
//! let raw = RecordBatch::try_from_iter([
//!     ("id", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
//!     ("weight", Arc::new(Float64Array::from(vec![Some(10.0), None, Some(30.0)])) as ArrayRef),
//! ]).unwrap();
//! let parcels = Parcels::new(raw).unwrap();
//! assert_eq!(parcels.data().schema().field(0).data_type(), &DType::Utf8.arrow_type());
//!
//! // Repeated ids are rejected, naming the column.
//! let raw = RecordBatch::try_from_iter([
//!     ("id", Arc::new(Int64Array::from(vec![1, 1])) as ArrayRef),
//!     ("weight", Arc::new(Float64Array::from(vec![1.0, 2.0])) as ArrayRef),
//! ]).unwrap();
//! let err = Parcels::new(raw).unwrap_err();
//! assert_eq!(err.as_validation().unwrap().column(), "id");
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod columns;
pub mod dtype;
pub mod error;
pub mod frame;
pub mod merge;
pub mod nonempty;
pub mod schema;
pub mod semigroup;
pub mod testing;
pub mod transform;
pub mod validation;

// Re-exports
pub use columns::{ColumnDeclaration, ColumnNames};
pub use dtype::DType;
pub use error::{Constraint, Error, Result, SchemaValidationError, Violation};
pub use frame::{FrameBuilder, ValidatedFrame};
pub use merge::{prefix_pair, MergeContainer};
pub use nonempty::NonEmptyVec;
pub use schema::{validate_and_coerce, Column, ColumnRule, Schema, SchemaBuilder};
pub use semigroup::Semigroup;
pub use transform::{Concat, GroupedPipeline, Identity, Pipeline, Transform};
pub use validation::Validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::columns;
    pub use crate::columns::{ColumnDeclaration, ColumnNames};
    pub use crate::dtype::DType;
    pub use crate::error::{Constraint, Error, SchemaValidationError, Violation};
    pub use crate::frame::ValidatedFrame;
    pub use crate::merge::MergeContainer;
    pub use crate::schema::{Column, Schema};
    pub use crate::transform::{from_fn, Pipeline, Transform};
}
