//! Tabular boundary between host rows and endpoint payloads.
//!
//! The host hands the adapter rows of named columns and expects rows of
//! named columns back. `Table` keeps column order explicit and stores every
//! cell as a JSON value, which is what the endpoint wire format uses anyway.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::error::VertexError;

/// Reserved row-identifier column injected by the host; stripped before any
/// value reaches the endpoint.
pub const ROW_ID_COLUMN: &str = "__row_id";

/// A table of named columns with one JSON value per cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a one-column table, one row per value.
    pub fn single_column<S: Into<String>>(name: S, values: Vec<Value>) -> Self {
        Self {
            columns: vec![name.into()],
            rows: values.into_iter().map(|v| vec![v]).collect(),
        }
    }

    /// Expand a list of JSON objects into a table whose columns are the
    /// union of the objects' field names. Cells absent from a record are
    /// filled with null.
    pub fn from_records(records: &[Value]) -> Result<Self, VertexError> {
        let mut names = BTreeSet::new();
        let mut objects = Vec::with_capacity(records.len());
        for record in records {
            let obj = record.as_object().ok_or_else(|| {
                VertexError::ParseError(format!("expected a JSON object per row, got: {record}"))
            })?;
            names.extend(obj.keys().cloned());
            objects.push(obj);
        }
        let columns: Vec<String> = names.into_iter().collect();
        let rows = objects
            .iter()
            .map(|obj| {
                columns
                    .iter()
                    .map(|c| obj.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Ok(Self { columns, rows })
    }

    /// Append a row. The row width must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), VertexError> {
        if row.len() != self.columns.len() {
            return Err(VertexError::ParseError(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or(Value::Null))
                .collect(),
        )
    }

    /// Remove a column and its cells. No-op when the column is absent.
    pub fn drop_column(&mut self, name: &str) {
        let Some(idx) = self.columns.iter().position(|c| c == name) else {
            return;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
    }

    /// One JSON object per row, keyed by column name.
    pub fn to_instances(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                for (c, v) in self.columns.iter().zip(row) {
                    obj.insert(c.clone(), v.clone());
                }
                Value::Object(obj)
            })
            .collect()
    }

    /// One JSON array per row, cells in column order. Custom containers take
    /// untyped tensors rather than named fields.
    pub fn to_value_rows(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| Value::Array(row.clone()))
            .collect()
    }
}
