use std::fmt;

use polars::prelude::{CategoricalOrdering, DataType};
use serde::Serialize;

/// Physical column type of a record table.
///
/// One-to-one with the polars dtypes the crate accepts; any other dtype is
/// reported as a mismatch during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    Text,
    /// Low-cardinality text (dictionary encoded).
    Categorical,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Boolean,
}

impl StorageType {
    pub fn to_dtype(&self) -> DataType {
        match self {
            StorageType::Text => DataType::String,
            StorageType::Categorical => DataType::Categorical(None, CategoricalOrdering::Physical),
            StorageType::Int8 => DataType::Int8,
            StorageType::Int16 => DataType::Int16,
            StorageType::Int32 => DataType::Int32,
            StorageType::Int64 => DataType::Int64,
            StorageType::Float32 => DataType::Float32,
            StorageType::Float64 => DataType::Float64,
            StorageType::Boolean => DataType::Boolean,
        }
    }

    pub fn from_dtype(dtype: &DataType) -> Option<Self> {
        match dtype {
            DataType::String => Some(StorageType::Text),
            DataType::Categorical(_, _) => Some(StorageType::Categorical),
            DataType::Int8 => Some(StorageType::Int8),
            DataType::Int16 => Some(StorageType::Int16),
            DataType::Int32 => Some(StorageType::Int32),
            DataType::Int64 => Some(StorageType::Int64),
            DataType::Float32 => Some(StorageType::Float32),
            DataType::Float64 => Some(StorageType::Float64),
            DataType::Boolean => Some(StorageType::Boolean),
            _ => None,
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, StorageType::Text | StorageType::Categorical)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            StorageType::Int8 | StorageType::Int16 | StorageType::Int32 | StorageType::Int64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, StorageType::Float32 | StorageType::Float64)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Text => "text",
            StorageType::Categorical => "categorical",
            StorageType::Int8 => "int8",
            StorageType::Int16 => "int16",
            StorageType::Int32 => "int32",
            StorageType::Int64 => "int64",
            StorageType::Float32 => "float32",
            StorageType::Float64 => "float64",
            StorageType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
