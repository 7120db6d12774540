//! Table construction and concatenation.

use std::collections::HashSet;

use polars::prelude::{Column, DataFrame, DataType, NamedFrom, PlSmallStr, Series};

use super::entity::Record;
use super::view::FieldValue;
use crate::error::{CoreError, Result};
use crate::schema::{SchemaColumn, StorageType};

/// Build a schema-conforming table from record instances.
///
/// An empty slice yields an empty table that still carries every column.
pub fn records_to_table<R: Record>(records: &[R]) -> Result<DataFrame> {
    let schema = R::schema()?;
    let rows: Vec<Vec<FieldValue>> = records.iter().map(Record::values).collect();

    let mut columns = Vec::with_capacity(schema.len());
    for (position, spec) in schema.columns().iter().enumerate() {
        let cells = rows.iter().map(|row| &row[position]);
        columns.push(Column::from(build_series(spec, cells)?));
    }
    Ok(DataFrame::new(columns)?)
}

fn build_series<'a>(
    spec: &SchemaColumn,
    cells: impl Iterator<Item = &'a FieldValue>,
) -> Result<Series> {
    let name = PlSmallStr::from(spec.name);
    let mismatch = |cell: &FieldValue| CoreError::TypeMismatch {
        column: spec.name.to_string(),
        expected: spec.storage,
        found: format!("value {}", cell),
    };

    let series = if spec.storage.is_textual() {
        let values = cells
            .map(|cell| match cell {
                FieldValue::Text(s) => Ok(Some(s.clone())),
                FieldValue::Null => Ok(None),
                other => Err(mismatch(other)),
            })
            .collect::<Result<Vec<Option<String>>>>()?;
        Series::new(name, values)
    } else if spec.storage.is_integer() {
        let values = cells
            .map(|cell| match cell {
                FieldValue::Int(v) => Ok(Some(*v)),
                FieldValue::Null => Ok(None),
                other => Err(mismatch(other)),
            })
            .collect::<Result<Vec<Option<i64>>>>()?;
        Series::new(name, values)
    } else if spec.storage.is_float() {
        let values = cells
            .map(|cell| match cell {
                FieldValue::Float(v) => Ok(Some(*v)),
                FieldValue::Null => Ok(None),
                other => Err(mismatch(other)),
            })
            .collect::<Result<Vec<Option<f64>>>>()?;
        Series::new(name, values)
    } else {
        let values = cells
            .map(|cell| match cell {
                FieldValue::Bool(v) => Ok(Some(*v)),
                FieldValue::Null => Ok(None),
                other => Err(mismatch(other)),
            })
            .collect::<Result<Vec<Option<bool>>>>()?;
        Series::new(name, values)
    };

    // strict: a value that does not fit a narrow storage type must not become null
    series.strict_cast(&spec.storage.to_dtype()).map_err(|err| CoreError::TypeMismatch {
        column: spec.name.to_string(),
        expected: spec.storage,
        found: format!("value out of range ({})", err),
    })
}

/// Row-wise concatenation, `first` rows before `second` rows.
///
/// Both tables must carry the same set of columns; `second` is reordered to
/// `first`'s column order before stacking. Categorical columns are decoded
/// before stacking and re-encoded afterwards, so tables built independently
/// (separate dictionaries) can be joined.
pub(crate) fn concat_tables(first: &DataFrame, second: &DataFrame) -> Result<DataFrame> {
    let first_names = column_names(first);
    let second_names = column_names(second);
    let first_set: HashSet<&String> = first_names.iter().collect();
    let second_set: HashSet<&String> = second_names.iter().collect();
    if first_set != second_set {
        return Err(CoreError::IncompatibleCollection(format!(
            "column layouts differ: [{}] vs [{}]",
            first_names.join(", "),
            second_names.join(", ")
        )));
    }
    let second = if first_names == second_names {
        second.clone()
    } else {
        second.select(first_names.iter().map(String::as_str))?
    };

    let categorical: Vec<&String> = first_names
        .iter()
        .filter(|name| is_categorical(first, name) || is_categorical(&second, name))
        .collect();

    let mut stacked = decode_categoricals(first, &categorical)?;
    stacked.vstack_mut(&decode_categoricals(&second, &categorical)?)?;
    for name in &categorical {
        let encoded = stacked
            .column(name)?
            .as_materialized_series()
            .cast(&StorageType::Categorical.to_dtype())?;
        stacked.with_column(encoded)?;
    }
    Ok(stacked)
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|name| name.to_string()).collect()
}

fn is_categorical(df: &DataFrame, name: &str) -> bool {
    df.column(name).map(|c| matches!(c.dtype(), DataType::Categorical(_, _))).unwrap_or(false)
}

fn decode_categoricals(df: &DataFrame, names: &[&String]) -> Result<DataFrame> {
    let mut decoded = df.clone();
    for name in names {
        let column = decoded.column(name)?.as_materialized_series().cast(&DataType::String)?;
        decoded.with_column(column)?;
    }
    Ok(decoded)
}
