use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::ColumnError;

/// One cell of a query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(x) => Some(*x),
            Value::Null | Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Rows returned by one aggregation query, in query order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Name-addressable view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    pub fn iter(self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.columns
            .iter()
            .map(|c| c.as_str())
            .zip(self.values.iter())
    }
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect())
    }

    /// Appends a row. Short rows are padded with nulls, extra cells dropped.
    pub fn push_row(&mut self, mut values: Vec<Value>) {
        values.resize(self.columns.len(), Value::Null);
        self.rows.push(values);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        self.rows.iter().map(|values| Record {
            columns: &self.columns,
            values,
        })
    }

    pub fn f64_column(&self, column: &str) -> Result<Vec<f64>, ColumnError> {
        let idx = self.require(column)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, values)| {
                values[idx].as_f64().ok_or_else(|| ColumnError::NotNumeric {
                    column: column.to_string(),
                    row,
                })
            })
            .collect()
    }

    pub fn text_column(&self, column: &str) -> Result<Vec<String>, ColumnError> {
        let idx = self.require(column)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, values)| match &values[idx] {
                Value::Text(s) => Ok(s.clone()),
                // Integer seasons (e.g. `2019`) still label a row.
                Value::Integer(n) => Ok(n.to_string()),
                _ => Err(ColumnError::NotText {
                    column: column.to_string(),
                    row,
                }),
            })
            .collect()
    }

    /// Replaces `column` with `values`, appending it when absent.
    pub fn set_f64_column(&mut self, column: &str, values: Vec<f64>) -> Result<(), ColumnError> {
        if values.len() != self.rows.len() {
            return Err(ColumnError::Length {
                column: column.to_string(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        let idx = match self.column_index(column) {
            Some(idx) => idx,
            None => {
                self.columns.push(column.to_string());
                for row in &mut self.rows {
                    row.push(Value::Null);
                }
                self.columns.len() - 1
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = Value::Real(value);
        }
        Ok(())
    }

    pub fn to_json_records(&self) -> Vec<JsonValue> {
        self.records()
            .map(|record| {
                let mut obj = Map::new();
                for (name, value) in record.iter() {
                    obj.insert(
                        name.to_string(),
                        serde_json::to_value(value).unwrap_or(JsonValue::Null),
                    );
                }
                JsonValue::Object(obj)
            })
            .collect()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    fn require(&self, column: &str) -> Result<usize, ColumnError> {
        self.column_index(column)
            .ok_or_else(|| ColumnError::Missing(column.to_string()))
    }
}
