//! Property-based tests for schema validation

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use proptest::prelude::*;
use safe_frame::{validate_and_coerce, Column, Constraint, DType, Error, Schema};

fn schema(coerce: bool) -> Schema {
    Schema::builder()
        .column("id", Column::new(DType::Utf8).unique())
        .column("weight", Column::new(DType::Float64).nullable())
        .coerce(coerce)
        .build()
}

fn distinct_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z]{1,8}", 0..40).prop_map(|ids| ids.into_iter().collect())
}

fn batch(ids: &[String], weights: Vec<Option<f64>>) -> RecordBatch {
    RecordBatch::try_from_iter([
        ("id", Arc::new(StringArray::from(ids.to_vec())) as ArrayRef),
        ("weight", Arc::new(Float64Array::from(weights)) as ArrayRef),
    ])
    .unwrap()
}

fn violation_on(result: safe_frame::Result<RecordBatch>, column: &str) -> Option<Constraint> {
    match result {
        Err(Error::Validation(err)) => err.find(column).map(|v| v.constraint.clone()),
        _ => None,
    }
}

proptest! {
    #[test]
    fn prop_conforming_batch_is_returned_as_is(
        ids in distinct_ids(),
        seed in prop::collection::vec(prop::option::of(-1e9f64..1e9), 40),
    ) {
        let weights = seed[..ids.len()].to_vec();
        let raw = batch(&ids, weights);

        let validated = validate_and_coerce(&raw, &schema(false)).unwrap();
        prop_assert_eq!(validated, raw);
    }

    #[test]
    fn prop_missing_column_is_named(ids in distinct_ids()) {
        let raw = RecordBatch::try_from_iter([
            ("id", Arc::new(StringArray::from(ids)) as ArrayRef),
        ])
        .unwrap();

        prop_assert_eq!(
            violation_on(validate_and_coerce(&raw, &schema(true)), "weight"),
            Some(Constraint::MissingColumn)
        );
    }

    #[test]
    fn prop_nulls_in_required_column_are_counted(
        ids in prop::collection::vec(prop::option::of("[a-z]{1,8}"), 1..40),
    ) {
        let nulls = ids.iter().filter(|id| id.is_none()).count();
        let raw = RecordBatch::try_from_iter([
            ("id", Arc::new(StringArray::from(ids.clone())) as ArrayRef),
            ("weight", Arc::new(Float64Array::from(vec![1.0; ids.len()])) as ArrayRef),
        ])
        .unwrap();

        let result = validate_and_coerce(&raw, &schema(true));
        if nulls == 0 {
            prop_assert!(!matches!(
                violation_on(result, "id"),
                Some(Constraint::NullValues { .. })
            ), "no-null input must not report NullValues");
        } else {
            prop_assert_eq!(
                violation_on(result, "id"),
                Some(Constraint::NullValues { count: nulls })
            );
        }
    }

    #[test]
    fn prop_repeated_id_is_a_duplicate(
        mut ids in distinct_ids().prop_filter("needs a row", |ids| !ids.is_empty()),
        pick in any::<prop::sample::Index>(),
    ) {
        let repeated = ids[pick.index(ids.len())].clone();
        ids.push(repeated.clone());
        let raw = batch(&ids, vec![None; ids.len()]);

        match violation_on(validate_and_coerce(&raw, &schema(true)), "id") {
            Some(Constraint::Duplicates { values }) => prop_assert_eq!(values, vec![repeated]),
            other => prop_assert!(false, "expected duplicates, got {:?}", other),
        }
    }

    #[test]
    fn prop_coercion_is_idempotent(
        values in prop::collection::hash_set(any::<i64>(), 0..40),
    ) {
        let values: Vec<i64> = values.into_iter().collect();
        let weights: Vec<i64> = values.iter().map(|v| v / 2).collect();
        let raw = RecordBatch::try_from_iter([
            ("id", Arc::new(Int64Array::from(values)) as ArrayRef),
            ("weight", Arc::new(Int64Array::from(weights)) as ArrayRef),
        ])
        .unwrap();

        let once = validate_and_coerce(&raw, &schema(true)).unwrap();
        let twice = validate_and_coerce(&once, &schema(true)).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert!(Arc::ptr_eq(once.column(0), twice.column(0)));
    }

    #[test]
    fn prop_string_ids_survive_coercion_distinct(
        values in prop::collection::hash_set(any::<i64>(), 0..40),
    ) {
        let raw = RecordBatch::try_from_iter([
            ("id", Arc::new(Int64Array::from(values.iter().copied().collect::<Vec<_>>())) as ArrayRef),
            ("weight", Arc::new(Float64Array::from(vec![0.5; values.len()])) as ArrayRef),
        ])
        .unwrap();

        let validated = validate_and_coerce(&raw, &schema(true)).unwrap();
        let ids: HashSet<String> = validated
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .iter()
            .flatten()
            .map(str::to_string)
            .collect();
        let expected: HashSet<String> = values.iter().map(i64::to_string).collect();
        prop_assert_eq!(ids, expected);
    }
}
