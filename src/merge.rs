//! Results of combining two validated frames
//!
//! A [`MergeContainer`] keeps the combined batch next to the declarations of
//! both sides, so labels can still be looked up by attribute after the merge.
//! The combined batch itself is not validated.

use std::sync::Arc;

use arrow::datatypes::Schema as ArrowSchema;
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::columns::ColumnDeclaration;
use crate::error::Result;
use crate::frame::ValidatedFrame;

/// A merged batch plus the declarations of its two inputs
#[derive(Debug, Clone)]
pub struct MergeContainer<L, R> {
    data: RecordBatch,
    left: L,
    right: R,
}

impl<L, R> MergeContainer<L, R> {
    /// Wrap an already merged batch
    pub fn new(data: RecordBatch, left: L, right: R) -> Self {
        Self { data, left, right }
    }

    /// The merged batch
    pub fn data(&self) -> &RecordBatch {
        &self.data
    }

    /// Take the merged batch out of the container
    pub fn into_data(self) -> RecordBatch {
        self.data
    }

    /// Declaration of the left input
    pub fn left(&self) -> &L {
        &self.left
    }

    /// Shortcut for [`left`](Self::left)
    pub fn l(&self) -> &L {
        &self.left
    }

    /// Declaration of the right input
    pub fn right(&self) -> &R {
        &self.right
    }

    /// Shortcut for [`right`](Self::right)
    pub fn r(&self) -> &R {
        &self.right
    }
}

impl<L: ColumnDeclaration, R: ColumnDeclaration> MergeContainer<L, R> {
    /// Place the columns of two frames with the same row count side by side
    ///
    /// Each side is prefixed first when its prefix is non-empty, see
    /// [`prefix_pair`]. Clashing labels are an error.
    pub fn side_by_side(
        left: &ValidatedFrame<L>,
        right: &ValidatedFrame<R>,
        prefix: (&str, &str),
    ) -> Result<Self> {
        let (left, right) = prefix_pair(left, right, prefix)?;
        if left.num_rows() != right.num_rows() {
            return Err(ArrowError::InvalidArgumentError(format!(
                "cannot merge {} rows with {} rows",
                left.num_rows(),
                right.num_rows()
            ))
            .into());
        }

        let fields: Vec<_> = left
            .data()
            .schema()
            .fields()
            .iter()
            .chain(right.data().schema().fields().iter())
            .cloned()
            .collect();
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name() == field.name()) {
                return Err(ArrowError::SchemaError(format!(
                    "column '{}' exists on both sides",
                    field.name()
                ))
                .into());
            }
        }

        let mut columns = left.data().columns().to_vec();
        columns.extend_from_slice(right.data().columns());
        let data = RecordBatch::try_new_with_options(
            Arc::new(ArrowSchema::new(fields)),
            columns,
            &RecordBatchOptions::new().with_row_count(Some(left.num_rows())),
        )?;
        tracing::debug!(
            rows = data.num_rows(),
            columns = data.num_columns(),
            "frames merged"
        );
        Ok(Self::new(data, left.columns().clone(), right.columns().clone()))
    }
}

/// Prefix the columns of each frame whose prefix is non-empty
pub fn prefix_pair<L: ColumnDeclaration, R: ColumnDeclaration>(
    left: &ValidatedFrame<L>,
    right: &ValidatedFrame<R>,
    prefix: (&str, &str),
) -> Result<(ValidatedFrame<L>, ValidatedFrame<R>)> {
    let left = if prefix.0.is_empty() {
        left.clone()
    } else {
        left.prefix_columns(prefix.0)?
    };
    let right = if prefix.1.is_empty() {
        right.clone()
    } else {
        right.prefix_columns(prefix.1)?
    };
    Ok((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema::Schema;
    use crate::{Column, DType};
    use arrow::array::{ArrayRef, Float64Array, StringArray};

    crate::columns! {
        struct Stations {
            id => "id",
            name => "name",
        }
    }

    impl ColumnDeclaration for Stations {
        fn get_data_schema(&self) -> Schema {
            Schema::builder()
                .column(&self.id, Column::new(DType::Utf8).unique())
                .column(&self.name, Column::new(DType::Utf8))
                .build()
        }
    }

    crate::columns! {
        struct Readings {
            id => "id",
            value => "value",
        }
    }

    impl ColumnDeclaration for Readings {
        fn get_data_schema(&self) -> Schema {
            Schema::builder()
                .column(&self.id, Column::new(DType::Utf8))
                .column(&self.value, Column::new(DType::Float64).nullable())
                .build()
        }
    }

    fn stations() -> ValidatedFrame<Stations> {
        let raw = RecordBatch::try_from_iter([
            ("id", Arc::new(StringArray::from(vec!["s1", "s2"])) as ArrayRef),
            ("name", Arc::new(StringArray::from(vec!["North", "South"])) as ArrayRef),
        ])
        .unwrap();
        ValidatedFrame::new(raw).unwrap()
    }

    fn readings(values: Vec<Option<f64>>) -> ValidatedFrame<Readings> {
        let ids: Vec<String> = (0..values.len()).map(|i| format!("s{}", i + 1)).collect();
        let raw = RecordBatch::try_from_iter([
            ("id", Arc::new(StringArray::from(ids)) as ArrayRef),
            ("value", Arc::new(Float64Array::from(values)) as ArrayRef),
        ])
        .unwrap();
        ValidatedFrame::new(raw).unwrap()
    }

    #[test]
    fn test_prefix_pair_skips_empty_prefix() {
        let (left, right) = prefix_pair(&stations(), &readings(vec![Some(1.0)]), ("", "r_")).unwrap();
        assert_eq!(left.c().id, "id");
        assert_eq!(right.c().id, "r_id");
        assert_eq!(right.data().schema().field(1).name(), "r_value");
    }

    #[test]
    fn test_side_by_side_keeps_both_declarations() {
        let merged =
            MergeContainer::side_by_side(&stations(), &readings(vec![Some(1.5), None]), ("st_", "rd_"))
                .unwrap();
        assert_eq!(merged.data().num_columns(), 4);
        assert_eq!(merged.l().name, "st_name");
        assert_eq!(merged.r().value, "rd_value");
        assert!(merged.data().column_by_name(&merged.right().value).is_some());
    }

    #[test]
    fn test_side_by_side_rejects_label_clash() {
        let err = MergeContainer::side_by_side(&stations(), &readings(vec![None, None]), ("", ""))
            .unwrap_err();
        assert!(matches!(err, Error::Arrow(ArrowError::SchemaError(_))));
    }

    #[test]
    fn test_side_by_side_rejects_row_mismatch() {
        let err = MergeContainer::side_by_side(&stations(), &readings(vec![None]), ("a_", "b_"))
            .unwrap_err();
        assert!(matches!(err, Error::Arrow(ArrowError::InvalidArgumentError(_))));
    }
}
