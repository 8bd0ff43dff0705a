//! Frame transformations
//!
//! A [`Transform`] turns one record batch into another. Transforms run on raw
//! data before validation ([`ValidatedFrame::from_frame`](crate::ValidatedFrame::from_frame))
//! or on validated data, in which case the result is validated again
//! ([`ValidatedFrame::transform`](crate::ValidatedFrame::transform)).
//!
//! Composites:
//!
//! - [`Pipeline`] runs steps in order and stops once a step yields no rows
//! - [`GroupedPipeline`] runs a transform per group of rows sharing a key
//! - [`Concat`] runs several transforms on the same input and stacks the rows
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array};
//! use arrow::compute::filter_record_batch;
//! use arrow::compute::kernels::cmp::gt;
//! use arrow::record_batch::RecordBatch;
//! use safe_frame::transform::{from_fn, Pipeline, Transform};
//!
//! let drop_small = from_fn("drop_small", |batch: RecordBatch| {
//!     let threshold = Int64Array::new_scalar(1);
//!     let mask = gt(batch.column(0), &threshold)?;
//!     Ok(filter_record_batch(&batch, &mask)?)
//! });
//! let pipeline = Pipeline::new().then(drop_small);
//!
//! let batch = RecordBatch::try_from_iter([
//!     ("n", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
//! ]).unwrap();
//! assert_eq!(pipeline.apply(batch).unwrap().num_rows(), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use arrow::compute::{concat_batches, take_record_batch};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::columns::ColumnDeclaration;
use crate::error::{Error, Result};
use crate::schema::{cell_keys, take_indices};

/// A function from one record batch to another
pub trait Transform {
    /// Apply the transformation
    fn apply(&self, data: RecordBatch) -> Result<RecordBatch>;

    /// Name used in pipeline logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn apply(&self, data: RecordBatch) -> Result<RecordBatch> {
        (**self).apply(data)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: Transform + ?Sized> Transform for &T {
    fn apply(&self, data: RecordBatch) -> Result<RecordBatch> {
        (**self).apply(data)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    fn apply(&self, data: RecordBatch) -> Result<RecordBatch> {
        Ok(data)
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// A named closure used as a transform
///
/// Created by [`from_fn`].
pub struct FnTransform<F> {
    name: String,
    f: F,
}

impl<F> fmt::Debug for FnTransform<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransform")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Wrap a closure as a [`Transform`]
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnTransform<F>
where
    F: Fn(RecordBatch) -> Result<RecordBatch>,
{
    FnTransform {
        name: name.into(),
        f,
    }
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(RecordBatch) -> Result<RecordBatch>,
{
    fn apply(&self, data: RecordBatch) -> Result<RecordBatch> {
        (self.f)(data)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A transform bound to a column declaration
///
/// The closure receives the declaration, so it can address columns by their
/// (possibly prefixed) labels instead of hard-coded strings.
pub struct WithColumns<D, F> {
    columns: D,
    f: F,
}

impl<D: fmt::Debug, F> fmt::Debug for WithColumns<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithColumns")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl<D, F> WithColumns<D, F>
where
    D: ColumnDeclaration,
    F: Fn(&D, RecordBatch) -> Result<RecordBatch>,
{
    /// Bind `f` to `columns`
    pub fn new(columns: D, f: F) -> Self {
        Self { columns, f }
    }

    /// The bound declaration
    pub fn columns(&self) -> &D {
        &self.columns
    }

    /// Shortcut for [`columns`](Self::columns)
    pub fn c(&self) -> &D {
        &self.columns
    }
}

impl<D, F> Transform for WithColumns<D, F>
where
    D: ColumnDeclaration,
    F: Fn(&D, RecordBatch) -> Result<RecordBatch>,
{
    fn apply(&self, data: RecordBatch) -> Result<RecordBatch> {
        (self.f)(&self.columns, data)
    }
}

/// Steps applied in order
///
/// Stops early once a step returns an empty batch. With `verbose(true)` the
/// shape before the first step and after every step is logged at `info`.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Transform>>,
    verbose: bool,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.steps.iter().map(|s| s.name()).collect();
        f.debug_struct("Pipeline")
            .field("steps", &names)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Pipeline {
    /// A pipeline with no steps
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn then(mut self, step: impl Transform + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Log the shape of the data around every step
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Transform for Pipeline {
    fn apply(&self, mut data: RecordBatch) -> Result<RecordBatch> {
        if self.verbose {
            tracing::info!(
                rows = data.num_rows(),
                columns = data.num_columns(),
                "pipeline start"
            );
        }
        for step in &self.steps {
            data = step.apply(data)?;
            if self.verbose {
                tracing::info!(
                    step = step.name(),
                    rows = data.num_rows(),
                    columns = data.num_columns(),
                    "pipeline step done"
                );
            }
            if data.num_rows() == 0 {
                break;
            }
        }
        Ok(data)
    }

    fn name(&self) -> &str {
        "pipeline"
    }
}

/// A transform applied to each group of rows sharing a value in one column
///
/// Groups are processed in ascending order of their key value, so integer
/// keys sort numerically and strings lexically. Rows whose key is null (or
/// float `NaN`) belong to no group and are dropped. Group outputs are
/// concatenated.
pub struct GroupedPipeline {
    group: String,
    transform: Box<dyn Transform>,
}

impl fmt::Debug for GroupedPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedPipeline")
            .field("group", &self.group)
            .field("transform", &self.transform.name())
            .finish()
    }
}

impl GroupedPipeline {
    /// Group by `group` and apply `steps`, wrapped in a [`Pipeline`] when
    /// there is more than one
    pub fn new(group: impl Into<String>, mut steps: Vec<Box<dyn Transform>>) -> Self {
        let transform: Box<dyn Transform> = match steps.len() {
            0 => Box::new(Identity),
            1 => steps.remove(0),
            _ => Box::new(Pipeline {
                steps,
                verbose: false,
            }),
        };
        Self {
            group: group.into(),
            transform,
        }
    }

    /// Label of the grouping column
    pub fn group(&self) -> &str {
        &self.group
    }
}

impl Transform for GroupedPipeline {
    fn apply(&self, data: RecordBatch) -> Result<RecordBatch> {
        let index = data
            .schema()
            .index_of(&self.group)
            .map_err(|_| Error::UnknownColumn(self.group.clone()))?;
        let keys = cell_keys(data.column(index))?;

        let mut groups: BTreeMap<_, Vec<usize>> = BTreeMap::new();
        for (row, key) in keys.into_iter().enumerate() {
            let Some(key) = key else { continue };
            groups.entry(key).or_default().push(row);
        }
        tracing::debug!(group = %self.group, groups = groups.len(), "grouped frame");

        let mut parts = Vec::with_capacity(groups.len());
        for rows in groups.into_values() {
            let part = take_record_batch(&data, &take_indices(rows))?;
            parts.push(self.transform.apply(part)?);
        }
        stack(data.schema(), parts)
    }

    fn name(&self) -> &str {
        "grouped_pipeline"
    }
}

/// Several transforms applied to the same input, rows stacked in order
#[derive(Default)]
pub struct Concat {
    transforms: Vec<Box<dyn Transform>>,
}

impl fmt::Debug for Concat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.transforms.iter().map(|t| t.name()).collect();
        f.debug_struct("Concat").field("transforms", &names).finish()
    }
}

impl Concat {
    /// A concatenation of nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transform whose output is appended after the previous ones
    pub fn with(mut self, transform: impl Transform + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }
}

impl Transform for Concat {
    fn apply(&self, data: RecordBatch) -> Result<RecordBatch> {
        let parts = self
            .transforms
            .iter()
            .map(|t| t.apply(data.clone()))
            .collect::<Result<Vec<_>>>()?;
        stack(data.schema(), parts)
    }

    fn name(&self) -> &str {
        "concat"
    }
}

/// Concatenate `parts`, falling back to an empty batch of `schema`
fn stack(schema: SchemaRef, parts: Vec<RecordBatch>) -> Result<RecordBatch> {
    match parts.first() {
        None => Ok(RecordBatch::new_empty(schema)),
        Some(first) => Ok(concat_batches(&first.schema(), &parts)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Int64Array, StringArray};
    use arrow::compute::filter_record_batch;
    use arrow::datatypes::Int64Type;
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn sample() -> RecordBatch {
        RecordBatch::try_from_iter([
            (
                "kind",
                Arc::new(StringArray::from(vec![Some("a"), Some("b"), None, Some("a")])) as ArrayRef,
            ),
            (
                "n",
                Arc::new(Int64Array::from(vec![1, 2, 3, 4])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    fn ints(batch: &RecordBatch, column: usize) -> Vec<i64> {
        batch
            .column(column)
            .as_primitive::<Int64Type>()
            .values()
            .to_vec()
    }

    fn first_row() -> FnTransform<impl Fn(RecordBatch) -> Result<RecordBatch>> {
        from_fn("first_row", |batch: RecordBatch| Ok(batch.slice(0, batch.num_rows().min(1))))
    }

    fn empty() -> FnTransform<impl Fn(RecordBatch) -> Result<RecordBatch>> {
        from_fn("empty", |batch: RecordBatch| Ok(batch.slice(0, 0)))
    }

    #[test]
    fn test_identity() {
        let batch = sample();
        assert_eq!(Identity.apply(batch.clone()).unwrap(), batch);
    }

    #[test]
    fn test_pipeline_runs_steps_in_order() {
        let double = from_fn("double", |batch: RecordBatch| {
            let doubled: Int64Array = batch
                .column(1)
                .as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map(|x| x * 2))
                .collect();
            let mut columns = batch.columns().to_vec();
            columns[1] = Arc::new(doubled);
            Ok(RecordBatch::try_new(batch.schema(), columns)?)
        });
        let pipeline = Pipeline::new().then(double).then(first_row());

        let out = pipeline.apply(sample()).unwrap();
        assert_eq!(ints(&out, 1), vec![2]);
        assert_eq!(pipeline.len(), 2);
    }

    #[test]
    fn test_pipeline_stops_on_empty_output() {
        let fail = from_fn("fail", |_batch: RecordBatch| {
            Err(Error::UnknownColumn("never reached".into()))
        });
        let pipeline = Pipeline::new().then(empty()).then(fail);

        let out = pipeline.apply(sample()).unwrap();
        assert_eq!(out.num_rows(), 0);
    }

    #[traced_test]
    #[test]
    fn test_verbose_pipeline_logs_shapes() {
        let pipeline = Pipeline::new().then(first_row()).verbose(true);
        pipeline.apply(sample()).unwrap();

        assert!(logs_contain("pipeline start"));
        assert!(logs_contain("first_row"));
    }

    #[test]
    fn test_grouped_pipeline_applies_per_group() {
        let grouped = GroupedPipeline::new("kind", vec![Box::new(first_row()) as Box<dyn Transform>]);

        let out = grouped.apply(sample()).unwrap();
        // groups "a" then "b"; the null key row is dropped
        assert_eq!(ints(&out, 1), vec![1, 2]);
        let kinds = out.column(0).as_string::<i32>();
        assert_eq!(kinds.value(0), "a");
        assert_eq!(kinds.value(1), "b");
    }

    #[test]
    fn test_grouped_pipeline_orders_groups_by_key_value() {
        let batch = RecordBatch::try_from_iter([
            (
                "shelf",
                Arc::new(Int64Array::from(vec![10, 9, 10, 2])) as ArrayRef,
            ),
            (
                "n",
                Arc::new(Int64Array::from(vec![1, 2, 3, 4])) as ArrayRef,
            ),
        ])
        .unwrap();
        let grouped = GroupedPipeline::new("shelf", vec![Box::new(first_row()) as Box<dyn Transform>]);

        let out = grouped.apply(batch).unwrap();
        assert_eq!(ints(&out, 0), vec![2, 9, 10]);
        assert_eq!(ints(&out, 1), vec![4, 2, 1]);
    }

    #[test]
    fn test_grouped_pipeline_unknown_column() {
        let grouped = GroupedPipeline::new("missing", vec![]);
        match grouped.apply(sample()) {
            Err(Error::UnknownColumn(name)) => assert_eq!(name, "missing"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_concat_stacks_outputs() {
        let only_large = from_fn("only_large", |batch: RecordBatch| {
            let mask: BooleanArray = batch
                .column(1)
                .as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map(|x| x > 2))
                .collect();
            Ok(filter_record_batch(&batch, &mask)?)
        });
        let concat = Concat::new().with(first_row()).with(only_large);

        let out = concat.apply(sample()).unwrap();
        assert_eq!(ints(&out, 1), vec![1, 3, 4]);
        assert_eq!(out.column(0).null_count(), 1);
    }

    #[test]
    fn test_empty_concat_keeps_schema() {
        let batch = sample();
        let out = Concat::new().apply(batch.clone()).unwrap();
        assert_eq!(out.num_rows(), 0);
        assert_eq!(out.schema(), batch.schema());
    }
}
