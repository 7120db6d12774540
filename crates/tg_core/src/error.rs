use thiserror::Error;

use crate::schema::StorageType;

/// Errors raised by the pitch, schema and collection layers.
///
/// Every operation is all-or-nothing: an error leaves its inputs untouched.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A record type declares a field that cannot be reduced to one storage type,
    /// or overrides a field it never declared.
    #[error("Schema definition error in `{record}`: {reason}")]
    SchemaDefinition { record: &'static str, reason: String },

    #[error("Missing column: {column}")]
    MissingColumn { column: String },

    #[error("Type mismatch for column `{column}`: expected {expected}, found {found}")]
    TypeMismatch { column: String, expected: StorageType, found: String },

    #[error("Incompatible collection: {0}")]
    IncompatibleCollection(String),

    #[error("Structural invariant violated: {0}")]
    StructuralInvariant(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous lookup: {count} records match {filters}")]
    Ambiguous { count: usize, filters: String },

    #[error("Collection is empty")]
    EmptyCollection,

    #[error("Duplicate id `{id}` in {record} table")]
    DuplicateId { record: &'static str, id: String },

    #[error("Null value in required column `{column}` at row {row}")]
    NullValue { column: String, row: usize },

    #[error("Invalid pitch: {0}")]
    InvalidPitch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl CoreError {
    /// Whether the failure comes from the input table rather than a type definition.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoreError::MissingColumn { .. }
                | CoreError::TypeMismatch { .. }
                | CoreError::StructuralInvariant(_)
                | CoreError::DuplicateId { .. }
                | CoreError::NullValue { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_distinguished() {
        assert!(CoreError::MissingColumn { column: "x".into() }.is_input_error());
        assert!(CoreError::NullValue { column: "x".into(), row: 3 }.is_input_error());
        assert!(CoreError::StructuralInvariant("two partitions".into()).is_input_error());
        assert!(CoreError::DuplicateId { record: "team", id: "t1".into() }.is_input_error());

        let definition = CoreError::SchemaDefinition { record: "team", reason: "bad".into() };
        assert!(!definition.is_input_error());
        assert!(!CoreError::EmptyCollection.is_input_error());
        assert!(!CoreError::Config("unknown profile".into()).is_input_error());
    }

    #[test]
    fn test_input_error_from_failed_construction() {
        use crate::records::{Records, Team};

        let df = crate::records::records_to_table::<Team>(&[]).unwrap().drop("name").unwrap();
        let err = Records::<Team>::new(df).unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(err.to_string(), "Missing column: name");
    }
}
