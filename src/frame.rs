//! The validated container
//!
//! A [`ValidatedFrame<D>`] is a record batch that has passed the schema of
//! the column declaration `D`. It is validated exactly once, when built, and
//! is read-only afterwards. Every operation that produces different data
//! returns a new frame, validated again.
//!
//! ```
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
//! let raw = RecordBatch::try_from_iter([
//!     ("id", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
//!     ("weight", Arc::new(Float64Array::from(vec![10.0, 20.0, 30.0])) as ArrayRef),
//! ]).unwrap();
//!
//! let parcels = ValidatedFrame::<ParcelColumns>::new(raw).unwrap();
//! assert_eq!(parcels.num_rows(), 3);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::compute::take;
use arrow::datatypes::{Field, Schema as ArrowSchema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::columns::ColumnDeclaration;
use crate::error::{Error, Result};
use crate::schema::{cell_keys, missing_count, take_indices, Schema};
use crate::transform::Transform;

/// A record batch validated against the schema of `D`
#[derive(Debug, Clone)]
pub struct ValidatedFrame<D: ColumnDeclaration> {
    data: RecordBatch,
    columns: D,
    schema: Arc<Schema>,
}

impl<D: ColumnDeclaration> ValidatedFrame<D> {
    /// Validate `data` against the default declaration of `D`
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] when the declaration is inconsistent with its own
    /// schema or when `data` does not conform.
    pub fn new(data: RecordBatch) -> Result<Self> {
        Self::with_columns(data, D::default())
    }

    /// Validate `data` against an explicit declaration instance
    pub fn with_columns(data: RecordBatch, columns: D) -> Result<Self> {
        columns.check_consistency()?;
        let schema = Arc::new(columns.data_schema());
        let data = schema.validate(&data)?;
        Ok(Self {
            data,
            columns,
            schema,
        })
    }

    /// Wrap `data` without validating it
    ///
    /// Logs a warning: nothing about the returned frame is guaranteed.
    pub fn unchecked(data: RecordBatch, columns: D) -> Self {
        tracing::warn!(
            frame = std::any::type_name::<Self>(),
            rows = data.num_rows(),
            "data check skipped"
        );
        let schema = Arc::new(columns.data_schema());
        Self {
            data,
            columns,
            schema,
        }
    }

    /// Configure construction step by step
    pub fn builder(data: RecordBatch) -> FrameBuilder<'static, D> {
        FrameBuilder {
            data,
            columns: None,
            transform: None,
            skip_check: false,
        }
    }

    /// Transform `data` if a transform is given, then validate it
    ///
    /// `columns` defaults to [`default_columns`](Self::default_columns).
    pub fn from_frame(
        data: RecordBatch,
        columns: Option<D>,
        transform: Option<&dyn Transform>,
    ) -> Result<Self> {
        let data = match transform {
            Some(transform) => transform.apply(data)?,
            None => data,
        };
        Self::with_columns(data, columns.unwrap_or_else(Self::default_columns))
    }

    /// The declaration `new` validates against
    pub fn default_columns() -> D {
        D::default()
    }

    /// The validated batch
    pub fn data(&self) -> &RecordBatch {
        &self.data
    }

    /// Take the validated batch out of the frame
    pub fn into_data(self) -> RecordBatch {
        self.data
    }

    /// The declaration this frame was validated against
    pub fn columns(&self) -> &D {
        &self.columns
    }

    /// Shortcut for [`columns`](Self::columns)
    pub fn c(&self) -> &D {
        &self.columns
    }

    /// The schema resolved from the declaration at construction
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows in the batch
    pub fn num_rows(&self) -> usize {
        self.data.num_rows()
    }

    /// A new frame with the same declaration and different data
    pub fn new_data(&self, data: RecordBatch) -> Result<Self> {
        Self::with_columns(data, self.columns.clone())
    }

    /// Apply `transform` to the data and validate the result
    pub fn transform(&self, transform: &dyn Transform) -> Result<Self> {
        Self::from_frame(
            self.data.clone(),
            Some(self.columns.clone()),
            Some(transform),
        )
    }

    /// Prefix every column of the data and every label of the declaration
    pub fn prefix_columns(&self, prefix: &str) -> Result<Self> {
        let schema = self.data.schema();
        let fields: Vec<Field> = schema
            .fields()
            .iter()
            .map(|field| {
                let name = format!("{}{}", prefix, field.name());
                field.as_ref().clone().with_name(name)
            })
            .collect();
        let renamed = RecordBatch::try_new_with_options(
            Arc::new(ArrowSchema::new_with_metadata(fields, schema.metadata().clone())),
            self.data.columns().to_vec(),
            &RecordBatchOptions::new().with_row_count(Some(self.data.num_rows())),
        )?;
        Self::with_columns(renamed, self.columns.set_prefix(prefix))
    }

    /// Drop every column the declaration does not name
    pub fn truncate_columns(&self) -> Result<Self> {
        let schema = self.data.schema();
        let indices = self
            .columns
            .get_names()
            .into_iter()
            .map(|label| schema.index_of(&label).map_err(|_| Error::UnknownColumn(label)))
            .collect::<Result<Vec<_>>>()?;
        self.new_data(self.data.project(&indices)?)
    }

    /// Fraction of present cells in each of `labels`
    ///
    /// Nulls and float `NaN` count as absent. An empty frame yields `NaN` for
    /// every label.
    pub fn values_presence<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<(String, f64)>> {
        let rows = self.data.num_rows();
        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                let column = self.column(label)?;
                let present = rows - missing_count(column.as_ref());
                Ok((label.to_string(), present as f64 / rows as f64))
            })
            .collect()
    }

    /// Distinct values of one column in order of first appearance
    ///
    /// `0.0` and `-0.0` are one value. Missing cells (null or `NaN`) are one
    /// value too, kept once at the first missing row.
    pub fn unique(&self, label: &str) -> Result<ArrayRef> {
        let column = self.column(label)?;
        let mut seen = HashSet::new();
        let rows = cell_keys(column)?
            .into_iter()
            .enumerate()
            .filter_map(|(row, key)| seen.insert(key).then_some(row));
        Ok(take(column.as_ref(), &take_indices(rows), None)?)
    }

    fn column(&self, label: &str) -> Result<&ArrayRef> {
        self.data
            .column_by_name(label)
            .ok_or_else(|| Error::UnknownColumn(label.to_string()))
    }
}

/// Builder returned by [`ValidatedFrame::builder`]
pub struct FrameBuilder<'t, D> {
    data: RecordBatch,
    columns: Option<D>,
    transform: Option<&'t dyn Transform>,
    skip_check: bool,
}

impl<'t, D: ColumnDeclaration> FrameBuilder<'t, D> {
    /// Validate against `columns` instead of `D::default()`
    pub fn columns(mut self, columns: D) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Apply `transform` to the data before validating
    pub fn transform<'u>(self, transform: &'u dyn Transform) -> FrameBuilder<'u, D> {
        FrameBuilder {
            data: self.data,
            columns: self.columns,
            transform: Some(transform),
            skip_check: self.skip_check,
        }
    }

    /// Store the data without validating it
    pub fn skip_check(mut self, skip_check: bool) -> Self {
        self.skip_check = skip_check;
        self
    }

    /// Transform, then validate unless the check is skipped
    pub fn build(self) -> Result<ValidatedFrame<D>> {
        let data = match self.transform {
            Some(transform) => transform.apply(self.data)?,
            None => self.data,
        };
        let columns = self.columns.unwrap_or_default();
        if self.skip_check {
            Ok(ValidatedFrame::unchecked(data, columns))
        } else {
            ValidatedFrame::with_columns(data, columns)
        }
    }
}

impl<D: std::fmt::Debug> std::fmt::Debug for FrameBuilder<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuilder")
            .field("rows", &self.data.num_rows())
            .field("columns", &self.columns)
            .field("transform", &self.transform.map(|t| t.name()))
            .field("skip_check", &self.skip_check)
            .finish()
    }
}
