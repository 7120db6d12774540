//! Row access over a validated table.
//!
//! `TableView` materializes the schema columns once (categoricals decoded to
//! text, integers widened to `i64`, floats to `f64`) so rows can be read
//! without per-cell dtype dispatch.

use std::fmt;

use polars::prelude::{Column, DataFrame, DataType};

use crate::error::{CoreError, Result};
use crate::schema::{Schema, StorageType};

/// A single cell value, used for equality filters and table building.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Text(v.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Equality filters: `(column, value)` pairs, all of which must hold.
pub type Filters<'a> = [(&'a str, FieldValue)];

pub(crate) fn describe_filters(filters: &Filters<'_>) -> String {
    if filters.is_empty() {
        return "no filters".to_string();
    }
    filters.iter().map(|(name, value)| format!("{}={}", name, value)).collect::<Vec<_>>().join(", ")
}

/// Decoded values of one column.
#[derive(Debug, Clone)]
pub enum ColumnValues {
    Text(Vec<Option<String>>),
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
}

impl ColumnValues {
    pub fn from_column(column: &Column, storage: StorageType) -> Result<Self> {
        let series = column.as_materialized_series();
        let values = if storage.is_textual() {
            let decoded = series.cast(&DataType::String)?;
            ColumnValues::Text(decoded.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
        } else if storage.is_integer() {
            let widened = series.cast(&DataType::Int64)?;
            ColumnValues::Int(widened.i64()?.into_iter().collect())
        } else if storage.is_float() {
            let widened = series.cast(&DataType::Float64)?;
            ColumnValues::Float(widened.f64()?.into_iter().collect())
        } else {
            ColumnValues::Bool(series.bool()?.into_iter().collect())
        };
        Ok(values)
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Text(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> FieldValue {
        match self {
            ColumnValues::Text(v) => v[index].clone().into(),
            ColumnValues::Int(v) => v[index].into(),
            ColumnValues::Float(v) => v[index].into(),
            ColumnValues::Bool(v) => v[index].into(),
        }
    }

    /// Cell equality; nulls only match `FieldValue::Null`, ints never match floats.
    fn matches(&self, index: usize, value: &FieldValue) -> bool {
        match (self, value) {
            (_, FieldValue::Null) => self.get(index) == FieldValue::Null,
            (ColumnValues::Text(v), FieldValue::Text(s)) => v[index].as_deref() == Some(s.as_str()),
            (ColumnValues::Int(v), FieldValue::Int(i)) => v[index] == Some(*i),
            (ColumnValues::Float(v), FieldValue::Float(f)) => v[index] == Some(*f),
            (ColumnValues::Bool(v), FieldValue::Bool(b)) => v[index] == Some(*b),
            _ => false,
        }
    }

    /// All values as text, failing on the first null.
    pub fn require_texts(&self, column: &str) -> Result<Vec<String>> {
        match self {
            ColumnValues::Text(values) => values
                .iter()
                .enumerate()
                .map(|(row, v)| v.clone().ok_or_else(|| null_value(column, row)))
                .collect(),
            _ => Err(kind_mismatch(column, StorageType::Text, self)),
        }
    }

    pub fn require_floats(&self, column: &str) -> Result<Vec<f64>> {
        match self {
            ColumnValues::Float(values) => values
                .iter()
                .enumerate()
                .map(|(row, v)| v.ok_or_else(|| null_value(column, row)))
                .collect(),
            _ => Err(kind_mismatch(column, StorageType::Float64, self)),
        }
    }

    pub fn require_ints(&self, column: &str) -> Result<Vec<i64>> {
        match self {
            ColumnValues::Int(values) => values
                .iter()
                .enumerate()
                .map(|(row, v)| v.ok_or_else(|| null_value(column, row)))
                .collect(),
            _ => Err(kind_mismatch(column, StorageType::Int64, self)),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ColumnValues::Text(_) => "text",
            ColumnValues::Int(_) => "integer",
            ColumnValues::Float(_) => "float",
            ColumnValues::Bool(_) => "boolean",
        }
    }
}

fn null_value(column: &str, row: usize) -> CoreError {
    CoreError::NullValue { column: column.to_string(), row }
}

fn kind_mismatch(column: &str, expected: StorageType, found: &ColumnValues) -> CoreError {
    CoreError::TypeMismatch {
        column: column.to_string(),
        expected,
        found: found.kind_name().to_string(),
    }
}

/// Decoded schema columns of a table.
#[derive(Debug, Clone)]
pub struct TableView {
    columns: Vec<(&'static str, ColumnValues)>,
    height: usize,
}

impl TableView {
    /// Decode the columns named by `schema`. The table must already be validated.
    pub fn new(df: &DataFrame, schema: &Schema) -> Result<Self> {
        let specs: Vec<(&'static str, StorageType)> =
            schema.columns().iter().map(|c| (c.name, c.storage)).collect();
        Self::with_columns(df, &specs)
    }

    pub fn with_columns(df: &DataFrame, columns: &[(&'static str, StorageType)]) -> Result<Self> {
        let mut decoded = Vec::with_capacity(columns.len());
        for (name, storage) in columns {
            let column = df
                .column(name)
                .map_err(|_| CoreError::MissingColumn { column: name.to_string() })?;
            decoded.push((*name, ColumnValues::from_column(column, *storage)?));
        }
        Ok(Self { columns: decoded, height: df.height() })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn column(&self, name: &str) -> Result<&ColumnValues> {
        self.columns
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, values)| values)
            .ok_or_else(|| CoreError::MissingColumn { column: name.to_string() })
    }

    pub fn row(&self, index: usize) -> Row<'_> {
        Row { view: self, index }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.height).map(move |index| self.row(index))
    }

    /// Row mask for `filters`; an unknown filter column fails with `MissingColumn`.
    pub fn mask(&self, filters: &Filters<'_>) -> Result<Vec<bool>> {
        let mut mask = vec![true; self.height];
        for (name, value) in filters {
            let column = self.column(name)?;
            for (index, keep) in mask.iter_mut().enumerate() {
                *keep = *keep && column.matches(index, value);
            }
        }
        Ok(mask)
    }
}

/// One row of a [`TableView`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    view: &'a TableView,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self, column: &str) -> Result<FieldValue> {
        Ok(self.view.column(column)?.get(self.index))
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>> {
        match self.view.column(column)? {
            ColumnValues::Text(values) => Ok(values[self.index].clone()),
            other => Err(kind_mismatch(column, StorageType::Text, other)),
        }
    }

    pub fn text(&self, column: &str) -> Result<String> {
        self.opt_text(column)?.ok_or_else(|| null_value(column, self.index))
    }

    pub fn opt_int(&self, column: &str) -> Result<Option<i64>> {
        match self.view.column(column)? {
            ColumnValues::Int(values) => Ok(values[self.index]),
            other => Err(kind_mismatch(column, StorageType::Int64, other)),
        }
    }

    pub fn int(&self, column: &str) -> Result<i64> {
        self.opt_int(column)?.ok_or_else(|| null_value(column, self.index))
    }

    pub fn opt_int32(&self, column: &str) -> Result<Option<i32>> {
        self.opt_int(column)?
            .map(|v| {
                i32::try_from(v).map_err(|_| CoreError::TypeMismatch {
                    column: column.to_string(),
                    expected: StorageType::Int32,
                    found: format!("out-of-range value {}", v),
                })
            })
            .transpose()
    }

    pub fn int32(&self, column: &str) -> Result<i32> {
        self.opt_int32(column)?.ok_or_else(|| null_value(column, self.index))
    }

    pub fn opt_float(&self, column: &str) -> Result<Option<f64>> {
        match self.view.column(column)? {
            ColumnValues::Float(values) => Ok(values[self.index]),
            other => Err(kind_mismatch(column, StorageType::Float64, other)),
        }
    }

    pub fn float(&self, column: &str) -> Result<f64> {
        self.opt_float(column)?.ok_or_else(|| null_value(column, self.index))
    }

    pub fn opt_boolean(&self, column: &str) -> Result<Option<bool>> {
        match self.view.column(column)? {
            ColumnValues::Bool(values) => Ok(values[self.index]),
            other => Err(kind_mismatch(column, StorageType::Boolean, other)),
        }
    }

    pub fn boolean(&self, column: &str) -> Result<bool> {
        self.opt_boolean(column)?.ok_or_else(|| null_value(column, self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, DataFrame};

    fn view() -> TableView {
        let df = DataFrame::new(vec![
            Column::new("name".into(), &[Some("a"), None, Some("c")]),
            Column::new("n".into(), &[Some(1i8), Some(2), None]),
            Column::new("v".into(), &[0.5f32, 1.5, 2.5]),
            Column::new("flag".into(), &[true, false, true]),
        ])
        .unwrap();
        TableView::with_columns(
            &df,
            &[
                ("name", StorageType::Text),
                ("n", StorageType::Int8),
                ("v", StorageType::Float32),
                ("flag", StorageType::Boolean),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_row_accessors_widen_values() {
        let view = view();
        let row = view.row(0);
        assert_eq!(row.text("name").unwrap(), "a");
        assert_eq!(row.int("n").unwrap(), 1);
        assert_eq!(row.int32("n").unwrap(), 1);
        assert_eq!(row.float("v").unwrap(), 0.5);
        assert!(row.boolean("flag").unwrap());
        assert_eq!(row.value("n").unwrap(), FieldValue::Int(1));
    }

    #[test]
    fn test_null_in_required_accessor() {
        let view = view();
        assert_eq!(view.row(1).opt_text("name").unwrap(), None);
        assert!(matches!(view.row(1).text("name"), Err(CoreError::NullValue { row: 1, .. })));
        assert!(matches!(view.row(2).int("n"), Err(CoreError::NullValue { .. })));
    }

    #[test]
    fn test_wrong_accessor_kind() {
        let view = view();
        assert!(matches!(view.row(0).float("name"), Err(CoreError::TypeMismatch { .. })));
        assert!(matches!(view.row(0).text("missing"), Err(CoreError::MissingColumn { .. })));
    }

    #[test]
    fn test_mask_combines_filters() {
        let view = view();
        let mask = view.mask(&[("flag", true.into())]).unwrap();
        assert_eq!(mask, vec![true, false, true]);

        let mask = view.mask(&[("flag", true.into()), ("name", "c".into())]).unwrap();
        assert_eq!(mask, vec![false, false, true]);

        let mask = view.mask(&[("name", FieldValue::Null)]).unwrap();
        assert_eq!(mask, vec![false, true, false]);

        // ints never equal floats
        let mask = view.mask(&[("n", FieldValue::Float(1.0))]).unwrap();
        assert_eq!(mask, vec![false, false, false]);

        assert!(view.mask(&[("nope", 1i64.into())]).is_err());
    }

    #[test]
    fn test_require_helpers() {
        let view = view();
        assert!(view.column("name").unwrap().require_texts("name").is_err());
        assert_eq!(view.column("v").unwrap().require_floats("v").unwrap(), vec![0.5, 1.5, 2.5]);
        assert!(view.column("v").unwrap().require_ints("v").is_err());
    }

    #[test]
    fn test_describe_filters() {
        assert_eq!(describe_filters(&[]), "no filters");
        assert_eq!(
            describe_filters(&[("type_", "shot".into()), ("part", 2i64.into())]),
            "type_=\"shot\", part=2"
        );
    }
}
