//! Column data types a schema can require
//!
//! Each [`DType`] maps to exactly one Arrow [`DataType`]. The schema engine
//! compares the Arrow type of an input column against [`DType::arrow_type`]
//! and casts when coercion is enabled.

use std::fmt;

use arrow::datatypes::DataType;

/// Expected primitive type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DType {
    /// UTF-8 string
    Utf8,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point
    Float64,
    /// Boolean
    Boolean,
    /// Days since the Unix epoch
    Date32,
}

impl DType {
    /// Every dtype, in declaration order
    pub const ALL: [DType; 5] = [
        DType::Utf8,
        DType::Int64,
        DType::Float64,
        DType::Boolean,
        DType::Date32,
    ];

    /// Arrow type a validated column of this dtype carries
    pub fn arrow_type(&self) -> DataType {
        match self {
            DType::Utf8 => DataType::Utf8,
            DType::Int64 => DataType::Int64,
            DType::Float64 => DataType::Float64,
            DType::Boolean => DataType::Boolean,
            DType::Date32 => DataType::Date32,
        }
    }

    /// The dtype matching an Arrow type, if any
    pub fn from_arrow(data_type: &DataType) -> Option<Self> {
        match data_type {
            DataType::Utf8 => Some(DType::Utf8),
            DataType::Int64 => Some(DType::Int64),
            DataType::Float64 => Some(DType::Float64),
            DataType::Boolean => Some(DType::Boolean),
            DataType::Date32 => Some(DType::Date32),
            _ => None,
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            DType::Utf8 => "utf8",
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Boolean => "boolean",
            DType::Date32 => "date32",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
