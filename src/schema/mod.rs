//! Column rules and the schema they form
//!
//! A [`Schema`] is an ordered list of column rules (label, dtype, nullability,
//! uniqueness) plus two frame-wide switches:
//!
//! - `coerce`: cast a column of the wrong type instead of rejecting it
//! - `strict`: reject frames carrying columns the schema does not declare
//!
//! Uniqueness and nullability are never coerced; breaking them always rejects
//! the frame.
//!
//! # Example
//!
//! ```
//! use safe_frame::{Column, DType, Schema};
//!
//! let schema = Schema::builder()
//!     .column("id", Column::new(DType::Utf8).unique())
//!     .column("weight", Column::new(DType::Float64).nullable())
//!     .coerce(true)
//!     .build();
//!
//! assert_eq!(schema.labels(), vec!["id", "weight"]);
//! assert!(schema.coerces());
//! ```

mod cells;
mod engine;

pub use engine::validate_and_coerce;
pub(crate) use cells::{cell_keys, missing_count, take_indices};

use arrow::record_batch::RecordBatch;

use crate::dtype::DType;
use crate::error::Result;

/// Constraints on a single column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    dtype: DType,
    nullable: bool,
    unique: bool,
}

impl Column {
    /// A non-nullable, non-unique column of `dtype`
    pub fn new(dtype: DType) -> Self {
        Self {
            dtype,
            nullable: false,
            unique: false,
        }
    }

    /// Allow missing cells: nulls, and `NaN` in float columns
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Require every present value to appear once
    ///
    /// `0.0` and `-0.0` are the same value; missing cells are never duplicates.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Required type
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Whether nulls are allowed
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether non-null values must be distinct
    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

/// A column rule bound to its label
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnRule {
    label: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    column: Column,
}

impl ColumnRule {
    /// Column label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Constraints on the column
    pub fn column(&self) -> &Column {
        &self.column
    }
}

/// Structural description of a frame's columns plus a coercion policy
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schema {
    columns: Vec<ColumnRule>,
    coerce: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    strict: bool,
}

impl Schema {
    /// Start an empty schema with coercion and strictness off
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Rules in declaration order
    pub fn rules(&self) -> &[ColumnRule] {
        &self.columns
    }

    /// Rule for `label`, the first one if the label is repeated
    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|rule| rule.label == label)
            .map(|rule| &rule.column)
    }

    /// Labels in declaration order
    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|rule| rule.label.as_str()).collect()
    }

    /// Label to dtype pairs in declaration order
    pub fn dtypes(&self) -> Vec<(&str, DType)> {
        self.columns
            .iter()
            .map(|rule| (rule.label.as_str(), rule.column.dtype))
            .collect()
    }

    /// Labels that appear more than once, each reported once
    pub fn duplicate_labels(&self) -> Vec<&str> {
        let mut duplicates: Vec<&str> = Vec::new();
        for (i, rule) in self.columns.iter().enumerate() {
            let repeated = self.columns[..i].iter().any(|r| r.label == rule.label);
            if repeated && !duplicates.contains(&rule.label.as_str()) {
                duplicates.push(&rule.label);
            }
        }
        duplicates
    }

    /// Whether mistyped columns are cast
    pub fn coerces(&self) -> bool {
        self.coerce
    }

    /// Whether undeclared columns are rejected
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Validate `batch` and return the coerced copy
    ///
    /// See [`validate_and_coerce`].
    pub fn validate(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        validate_and_coerce(batch, self)
    }

    /// Serialize the schema as JSON
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Builder for [`Schema`]
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    columns: Vec<ColumnRule>,
    coerce: bool,
    strict: bool,
}

impl SchemaBuilder {
    /// Append a rule for `label`
    pub fn column(mut self, label: impl Into<String>, column: Column) -> Self {
        self.columns.push(ColumnRule {
            label: label.into(),
            column,
        });
        self
    }

    /// Cast mistyped columns instead of rejecting them
    pub fn coerce(mut self, coerce: bool) -> Self {
        self.coerce = coerce;
        self
    }

    /// Reject columns the schema does not declare
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Finish the schema
    pub fn build(self) -> Schema {
        Schema {
            columns: self.columns,
            coerce: self.coerce,
            strict: self.strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel_schema() -> Schema {
        Schema::builder()
            .column("id", Column::new(DType::Utf8).unique())
            .column("weight", Column::new(DType::Float64).nullable())
            .coerce(true)
            .build()
    }

    #[test]
    fn test_column_defaults() {
        let column = Column::new(DType::Int64);
        assert!(!column.is_nullable());
        assert!(!column.is_unique());
        assert_eq!(column.dtype(), DType::Int64);
    }

    #[test]
    fn test_builder_keeps_order_and_flags() {
        let schema = parcel_schema();
        assert_eq!(
            schema.dtypes(),
            vec![("id", DType::Utf8), ("weight", DType::Float64)]
        );
        assert!(schema.coerces());
        assert!(!schema.is_strict());
        assert!(schema.column("id").is_some_and(|c| c.is_unique()));
        assert!(schema.column("missing").is_none());
    }

    #[test]
    fn test_duplicate_labels_reported_once() {
        let schema = Schema::builder()
            .column("a", Column::new(DType::Utf8))
            .column("b", Column::new(DType::Utf8))
            .column("a", Column::new(DType::Int64))
            .column("a", Column::new(DType::Int64))
            .build();
        assert_eq!(schema.duplicate_labels(), vec!["a"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_schema_json_round_trip() {
        let schema = parcel_schema();
        let json = schema.to_json().unwrap();
        assert_eq!(json["columns"][0]["label"], "id");
        assert_eq!(json["columns"][0]["dtype"], "utf8");
        assert_eq!(json["columns"][1]["nullable"], true);

        let back: Schema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }
}
