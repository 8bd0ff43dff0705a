//! Validation and coercion of a record batch against a [`Schema`]
//!
//! Every rule is checked independently and failures are accumulated, so the
//! returned error names every column that broke the schema. Within one column
//! the checks run in order: presence, type (with optional cast), then nulls
//! and uniqueness together. A column that is missing or cannot be cast is not
//! checked further.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use arrow::compute::{can_cast_types, cast_with_options, CastOptions};
use arrow::datatypes::{FieldRef, Schema as ArrowSchema};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::row::OwnedRow;
use arrow::util::display::{ArrayFormatter, FormatOptions};

use super::cells::{cell_keys, missing_count};
use super::{ColumnRule, Schema};
use crate::error::{Constraint, Result, SchemaValidationError, Violation};
use crate::Validation;

/// Duplicated values listed in a [`Constraint::Duplicates`] violation
const MAX_REPORTED_DUPLICATES: usize = 5;

/// A column that passed its rule, possibly replaced by a cast copy
#[derive(Debug)]
struct Conformed {
    index: usize,
    array: ArrayRef,
}

type Check = Validation<Option<Conformed>, SchemaValidationError>;

/// Validate `raw` against `schema` and return the coerced batch
///
/// The input is never modified. Columns that already have the expected type
/// are shared with the output; cast columns replace the originals in place,
/// keeping column order. Columns the schema does not declare are kept as-is
/// unless the schema is strict.
///
/// # Errors
///
/// [`Error::Validation`](crate::Error::Validation) listing every violation
/// found.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arrow::array::{ArrayRef, Int64Array};
/// use arrow::record_batch::RecordBatch;
/// use safe_frame::{validate_and_coerce, Column, DType, Schema};
///
/// let schema = Schema::builder()
///     .column("id", Column::new(DType::Utf8).unique())
///     .coerce(true)
///     .build();
/// let raw = RecordBatch::try_from_iter([
///     ("id", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
/// ]).unwrap();
///
/// let validated = validate_and_coerce(&raw, &schema).unwrap();
/// assert_eq!(validated.schema().field(0).data_type(), &arrow::datatypes::DataType::Utf8);
/// ```
pub fn validate_and_coerce(raw: &RecordBatch, schema: &Schema) -> Result<RecordBatch> {
    let span = tracing::debug_span!(
        "validate_and_coerce",
        rows = raw.num_rows(),
        columns = raw.num_columns()
    );
    let _enter = span.enter();

    let mut checks: Vec<Check> = Vec::with_capacity(schema.rules().len() + 2);
    checks.push(check_labels(schema));
    if schema.is_strict() {
        checks.push(check_undeclared(raw, schema));
    }
    for rule in schema.rules() {
        checks.push(check_column(raw, rule, schema.coerces()));
    }

    let conformed = match Validation::all_vec(checks).into_result() {
        Ok(conformed) => conformed,
        Err(err) => {
            tracing::debug!(violations = err.len(), "frame rejected");
            return Err(err.into());
        }
    };

    let batch = rebuild(raw, conformed.into_iter().flatten().collect())?;
    tracing::debug!("frame validated");
    Ok(batch)
}

fn check_labels(schema: &Schema) -> Check {
    let violations = schema
        .duplicate_labels()
        .into_iter()
        .map(|label| Violation::new(label, Constraint::DuplicateLabel))
        .collect();
    match SchemaValidationError::from_violations(violations) {
        Some(err) => Validation::failure(err),
        None => Validation::success(None),
    }
}

fn check_undeclared(raw: &RecordBatch, schema: &Schema) -> Check {
    let violations = raw
        .schema()
        .fields()
        .iter()
        .filter(|field| schema.column(field.name()).is_none())
        .map(|field| Violation::new(field.name().as_str(), Constraint::UndeclaredColumn))
        .collect();
    match SchemaValidationError::from_violations(violations) {
        Some(err) => Validation::failure(err),
        None => Validation::success(None),
    }
}

fn check_column(raw: &RecordBatch, rule: &ColumnRule, coerce: bool) -> Check {
    let index = match raw.schema().index_of(rule.label()) {
        Ok(index) => index,
        Err(_) => return Validation::failure(Violation::missing_column(rule.label()).into()),
    };

    conform_type(rule, raw.column(index), coerce).and_then(|array| {
        check_nulls(rule, &array)
            .and(check_unique(rule, &array))
            .map(|_| Some(Conformed { index, array }))
    })
}

fn conform_type(
    rule: &ColumnRule,
    array: &ArrayRef,
    coerce: bool,
) -> Validation<ArrayRef, SchemaValidationError> {
    let dtype = rule.column().dtype();
    let expected = dtype.arrow_type();
    let actual = array.data_type();
    if actual == &expected {
        return Validation::success(Arc::clone(array));
    }

    let mismatch = |reason: Option<String>| {
        Validation::failure(
            Violation::new(
                rule.label(),
                Constraint::TypeMismatch {
                    expected: dtype,
                    actual: actual.clone(),
                    reason,
                },
            )
            .into(),
        )
    };

    if !coerce || !can_cast_types(actual, &expected) {
        return mismatch(None);
    }

    // An unparsable cell must fail the cast rather than turn into a null.
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    match cast_with_options(array.as_ref(), &expected, &options) {
        Ok(cast) => {
            tracing::trace!(column = rule.label(), from = %actual, to = %dtype, "coerced column");
            Validation::success(cast)
        }
        Err(err) => mismatch(Some(err.to_string())),
    }
}

fn check_nulls(rule: &ColumnRule, array: &ArrayRef) -> Validation<(), SchemaValidationError> {
    let count = missing_count(array.as_ref());
    if rule.column().is_nullable() || count == 0 {
        Validation::success(())
    } else {
        Validation::failure(Violation::null_values(rule.label(), count).into())
    }
}

fn check_unique(rule: &ColumnRule, array: &ArrayRef) -> Validation<(), SchemaValidationError> {
    if !rule.column().is_unique() {
        return Validation::success(());
    }

    match duplicated_values(array) {
        Ok(duplicated) if duplicated.is_empty() => Validation::success(()),
        Ok(duplicated) => Validation::failure(
            Violation::new(rule.label(), Constraint::Duplicates { values: duplicated }).into(),
        ),
        Err(err) => Validation::failure(
            Violation::new(
                rule.label(),
                Constraint::TypeMismatch {
                    expected: rule.column().dtype(),
                    actual: array.data_type().clone(),
                    reason: Some(err.to_string()),
                },
            )
            .into(),
        ),
    }
}

/// Rendered values that occur more than once, in order of their second occurrence
///
/// Missing cells are never duplicates of each other.
fn duplicated_values(array: &ArrayRef) -> std::result::Result<Vec<String>, ArrowError> {
    let keys = cell_keys(array)?;
    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array.as_ref(), &options)?;

    let mut seen: HashMap<OwnedRow, usize> = HashMap::new();
    let mut duplicated = Vec::new();
    for (row, key) in keys.into_iter().enumerate() {
        let Some(key) = key else { continue };
        let count = seen.entry(key).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicated.push(formatter.value(row).to_string());
            if duplicated.len() == MAX_REPORTED_DUPLICATES {
                break;
            }
        }
    }
    Ok(duplicated)
}

fn rebuild(raw: &RecordBatch, conformed: Vec<Conformed>) -> Result<RecordBatch> {
    let unchanged = conformed
        .iter()
        .all(|c| Arc::ptr_eq(&c.array, raw.column(c.index)));
    if unchanged {
        return Ok(raw.clone());
    }

    let raw_schema = raw.schema();
    let mut fields: Vec<FieldRef> = raw_schema.fields().iter().cloned().collect();
    let mut columns: Vec<ArrayRef> = raw.columns().to_vec();
    for Conformed { index, array } in conformed {
        if fields[index].data_type() != array.data_type() {
            let field = fields[index].as_ref().clone().with_data_type(array.data_type().clone());
            fields[index] = Arc::new(field);
        }
        columns[index] = array;
    }

    let schema = ArrowSchema::new_with_metadata(fields, raw_schema.metadata().clone());
    let options = RecordBatchOptions::new().with_row_count(Some(raw.num_rows()));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(schema),
        columns,
        &options,
    )?)
}
