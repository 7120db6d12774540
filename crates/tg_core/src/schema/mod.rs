//! Record schemas
//!
//! Every record type declares its fields with a value type ([`FieldType`]).
//! The required column schema is derived from those declarations:
//!
//! | Declared | Storage |
//! |----------|---------|
//! | `Text` | `text` |
//! | `Integer` | `int32` |
//! | `Float` | `float64` |
//! | `Boolean` | `boolean` |
//!
//! `Optional(T)` and `Union([T, Null])` unwrap to `T`. A union that mixes
//! primitives has no single storage type and is a definition error, as is an
//! override naming a field the record never declared.
//!
//! Validation is strict: a table column must carry exactly the required
//! storage type. Nothing is coerced.

mod storage;

use polars::prelude::DataFrame;
use serde::Serialize;

use crate::error::{CoreError, Result};

pub use storage::StorageType;

/// Declared value type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    /// Only meaningful inside a `Union`.
    Null,
    Optional(&'static FieldType),
    Union(&'static [FieldType]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDecl {
    pub name: &'static str,
    pub ty: FieldType,
}

impl FieldDecl {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemaColumn {
    pub name: &'static str,
    pub storage: StorageType,
    pub nullable: bool,
}

/// Required columns of one record type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    record: &'static str,
    columns: Vec<SchemaColumn>,
}

impl Schema {
    /// Derive the schema of `record` from its field declarations and overrides.
    pub fn derive(
        record: &'static str,
        fields: &[FieldDecl],
        overrides: &[(&'static str, StorageType)],
    ) -> Result<Self> {
        let definition_error = |reason: String| CoreError::SchemaDefinition { record, reason };

        let mut columns: Vec<SchemaColumn> = Vec::with_capacity(fields.len());
        for field in fields {
            if columns.iter().any(|c| c.name == field.name) {
                return Err(definition_error(format!("field `{}` declared twice", field.name)));
            }
            let (storage, nullable) = reduce(&field.ty)
                .map_err(|reason| definition_error(format!("field `{}`: {}", field.name, reason)))?;
            columns.push(SchemaColumn { name: field.name, storage, nullable });
        }

        for (name, storage) in overrides {
            let column = columns.iter_mut().find(|c| c.name == *name).ok_or_else(|| {
                definition_error(format!("override for undeclared field `{}`", name))
            })?;
            column.storage = *storage;
        }

        Ok(Self { record, columns })
    }

    pub fn record(&self) -> &'static str {
        self.record
    }

    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&SchemaColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn storage(&self, name: &str) -> Option<StorageType> {
        self.get(name).map(|c| c.storage)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Reduce a declared type to `(storage, nullable)`.
fn reduce(ty: &FieldType) -> std::result::Result<(StorageType, bool), String> {
    match ty {
        FieldType::Text => Ok((StorageType::Text, false)),
        FieldType::Integer => Ok((StorageType::Int32, false)),
        FieldType::Float => Ok((StorageType::Float64, false)),
        FieldType::Boolean => Ok((StorageType::Boolean, false)),
        FieldType::Null => Err("null is not a storable type".to_string()),
        FieldType::Optional(inner) => reduce(inner).map(|(storage, _)| (storage, true)),
        FieldType::Union(members) => {
            let has_null = members.iter().any(|m| matches!(m, FieldType::Null));
            let mut reduced: Option<StorageType> = None;
            let mut nullable = has_null;
            for member in members.iter().filter(|m| !matches!(m, FieldType::Null)) {
                let (storage, member_nullable) = reduce(member)?;
                nullable |= member_nullable;
                match reduced {
                    None => reduced = Some(storage),
                    Some(existing) if existing == storage => {}
                    Some(existing) => {
                        return Err(format!(
                            "union of {} and {} has no single storage type",
                            existing, storage
                        ))
                    }
                }
            }
            reduced
                .map(|storage| (storage, nullable))
                .ok_or_else(|| "union has no storable member".to_string())
        }
    }
}

/// Check that `df` carries every column of `schema` with exactly the required type.
///
/// Extra columns are allowed.
pub fn validate_schema(df: &DataFrame, schema: &Schema) -> Result<()> {
    for required in schema.columns() {
        let Ok(column) = df.column(required.name) else {
            return Err(CoreError::MissingColumn { column: required.name.to_string() });
        };
        let dtype = column.dtype();
        match StorageType::from_dtype(dtype) {
            Some(found) if found == required.storage => {}
            Some(found) => {
                return Err(CoreError::TypeMismatch {
                    column: required.name.to_string(),
                    expected: required.storage,
                    found: found.to_string(),
                })
            }
            None => {
                return Err(CoreError::TypeMismatch {
                    column: required.name.to_string(),
                    expected: required.storage,
                    found: dtype.to_string(),
                })
            }
        }
    }
    Ok(())
}
