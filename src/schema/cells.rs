//! Cell-level helpers shared by the checks and frame operations
//!
//! Equality and ordering of cells go through Arrow's row format, so keys
//! compare by value in the column's natural order. Float columns are
//! canonicalized first: `-0.0` equals `0.0`, and `NaN` is a missing value
//! like null.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, UInt64Array};
use arrow::datatypes::Float64Type;
use arrow::error::ArrowError;
use arrow::row::{OwnedRow, RowConverter, SortField};

/// Missing cells: nulls, plus `NaN` in Float64 columns
pub(crate) fn missing_count(array: &dyn Array) -> usize {
    let nan = array.as_primitive_opt::<Float64Type>().map_or(0, |floats| {
        floats.iter().flatten().filter(|value| value.is_nan()).count()
    });
    array.null_count() + nan
}

/// Comparable key of every cell, `None` for missing cells
///
/// Keys are equal when the values are equal and sort like the values.
pub(crate) fn cell_keys(array: &ArrayRef) -> Result<Vec<Option<OwnedRow>>, ArrowError> {
    let array = canonical(array);
    let converter = RowConverter::new(vec![SortField::new(array.data_type().clone())])?;
    let rows = converter.convert_columns(std::slice::from_ref(&array))?;
    Ok((0..array.len())
        .map(|i| array.is_valid(i).then(|| rows.row(i).owned()))
        .collect())
}

/// Indices for `take` kernels
pub(crate) fn take_indices(rows: impl IntoIterator<Item = usize>) -> UInt64Array {
    // usize is at most 64 bits wide on every target arrow supports
    UInt64Array::from_iter_values(rows.into_iter().map(|row| row as u64))
}

fn canonical(array: &ArrayRef) -> ArrayRef {
    match array.as_primitive_opt::<Float64Type>() {
        Some(floats) => {
            let canonical: Float64Array = floats
                .iter()
                .map(|value| {
                    value
                        .filter(|v| !v.is_nan())
                        .map(|v| if v == 0.0 { 0.0 } else { v })
                })
                .collect();
            Arc::new(canonical)
        }
        None => Arc::clone(array),
    }
}
