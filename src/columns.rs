//! Column declarations
//!
//! A declaration names the columns of one dataset shape. The [`columns!`](crate::columns!)
//! macro generates a struct with one `String` field per attribute; its
//! `Default` holds the declared labels. Implementing [`ColumnDeclaration`] on
//! that struct supplies the schema, built from the struct's own labels so that
//! a prefixed copy produces a prefixed schema.
//!
//! # Example
//!
//! ```
//! use safe_frame::{columns, Column, ColumnDeclaration, DType, Schema};
//!
//! columns! {
//!     /// Columns of a parcel manifest.
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
//! let columns = ParcelColumns::default();
//! assert_eq!(columns.get_names(), vec!["id", "weight"]);
//! assert_eq!(columns.set_prefix("in_").get_names(), vec!["in_id", "in_weight"]);
//! ```

use std::fmt;

use arrow::record_batch::RecordBatch;

use crate::dtype::DType;
use crate::error::{Constraint, Result, SchemaValidationError, Violation};
use crate::schema::Schema;

/// Attribute to label mapping of a declaration
///
/// Implemented by [`columns!`](crate::columns!); implementing it by hand is
/// only needed for declarations whose labels are computed at runtime.
pub trait ColumnNames {
    /// `(attribute, label)` pairs in declaration order
    fn dump_column_names(&self) -> Vec<(&'static str, &str)>;

    /// A copy with every label passed through `f`
    fn map_labels(&self, f: &dyn Fn(&str) -> String) -> Self
    where
        Self: Sized;
}

/// A named set of columns plus the schema they must satisfy
pub trait ColumnDeclaration: ColumnNames + Clone + Default + fmt::Debug + Send + Sync + 'static {
    /// Build the schema for this declaration's labels
    fn get_data_schema(&self) -> Schema;

    /// The schema callers should validate against
    ///
    /// [`ValidatedFrame`](crate::ValidatedFrame) resolves it once per frame.
    fn data_schema(&self) -> Schema {
        self.get_data_schema()
    }

    /// Label to dtype pairs of the schema
    fn types(&self) -> Vec<(String, DType)> {
        self.data_schema()
            .dtypes()
            .into_iter()
            .map(|(label, dtype)| (label.to_string(), dtype))
            .collect()
    }

    /// Attribute names
    fn columns(&self) -> Vec<&'static str> {
        self.dump_column_names()
            .into_iter()
            .map(|(attribute, _)| attribute)
            .collect()
    }

    /// Column labels
    fn get_names(&self) -> Vec<String> {
        self.dump_column_names()
            .into_iter()
            .map(|(_, label)| label.to_string())
            .collect()
    }

    /// A copy whose labels all start with `prefix`
    fn set_prefix(&self, prefix: &str) -> Self {
        self.map_labels(&|label| format!("{}{}", prefix, label))
    }

    /// Labels of this declaration that also appear in `names`
    fn intersection<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        self.get_names()
            .into_iter()
            .filter(|label| names.iter().any(|name| name.as_ref() == label.as_str()))
            .collect()
    }

    /// Check that the schema covers every declared label exactly once
    ///
    /// Reports declared labels without a rule and labels repeated in the
    /// schema. Rules for labels the declaration does not name are allowed.
    fn check_consistency(&self) -> std::result::Result<(), SchemaValidationError> {
        let schema = self.data_schema();
        let mut violations: Vec<Violation> = self
            .dump_column_names()
            .into_iter()
            .filter(|(_, label)| schema.column(label).is_none())
            .map(|(attribute, label)| {
                Violation::new(
                    label,
                    Constraint::NotInSchema {
                        attribute: attribute.to_string(),
                    },
                )
            })
            .collect();
        violations.extend(
            schema
                .duplicate_labels()
                .into_iter()
                .map(|label| Violation::new(label, Constraint::DuplicateLabel)),
        );
        match SchemaValidationError::from_violations(violations) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Validate `data` against this declaration's schema
    fn validate_data(&self, data: &RecordBatch) -> Result<RecordBatch> {
        self.data_schema().validate(data)
    }

    /// Column names plus the serialized schema under `"data_schema"`
    #[cfg(feature = "serde")]
    fn dump_dict(&self) -> serde_json::Result<serde_json::Value> {
        let mut dict = serde_json::Map::new();
        for (attribute, label) in self.dump_column_names() {
            dict.insert(attribute.to_string(), serde_json::Value::from(label));
        }
        dict.insert("data_schema".to_string(), self.data_schema().to_json()?);
        Ok(serde_json::Value::Object(dict))
    }
}

/// Declare a set of columns
///
/// Generates a struct with one public `String` field per attribute, a
/// `Default` holding the given labels, and a [`ColumnNames`] implementation.
/// The schema is supplied separately by implementing [`ColumnDeclaration`].
///
/// ```
/// safe_frame::columns! {
///     pub struct Readings {
///         sensor => "Sensor ID",
///         value => "Value",
///     }
/// }
///
/// let readings = Readings::default();
/// assert_eq!(readings.sensor, "Sensor ID");
/// ```
#[macro_export]
macro_rules! columns {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident => $label:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: ::std::string::String,
            )*
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self {
                    $( $field: ::std::string::String::from($label), )*
                }
            }
        }

        impl $crate::ColumnNames for $name {
            fn dump_column_names(&self) -> ::std::vec::Vec<(&'static str, &str)> {
                ::std::vec![ $( (::std::stringify!($field), self.$field.as_str()), )* ]
            }

            fn map_labels(&self, f: &dyn ::std::ops::Fn(&str) -> ::std::string::String) -> Self {
                Self {
                    $( $field: f(&self.$field), )*
                }
            }
        }
    };
}
