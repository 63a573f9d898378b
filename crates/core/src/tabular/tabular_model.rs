//! Tabular results shared by the CSV writer and the spreadsheet sync.

use serde_json::{Map, Number, Value};

use crate::errors::{Result, ValidationError};

/// One flattened entity, keyed by column name. Key order is insertion order.
pub type Record = Map<String, Value>;

/// How a column's cells are converted before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Any non-null cell becomes a string.
    Text,
    /// Numbers and numeric strings become numbers; anything else becomes null.
    Number,
    /// Like [`Coercion::Number`], then divided by 100.
    Percent,
    /// `true`/`false` (or their usual spellings); anything else becomes null.
    TriStateBool,
}

/// Rows with a fixed column set. Absent values are `Value::Null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from rows that must all match the column count.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Build a table whose row width is fixed by the column array.
    pub fn from_fixed_rows<const N: usize, I>(columns: [&str; N], rows: I) -> Self
    where
        I: IntoIterator<Item = [Value; N]>,
    {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows.into_iter().map(Vec::from).collect(),
        }
    }

    /// Build a table from records. Columns are the union of all keys in the
    /// order first seen, so a key missing from some record becomes a null
    /// cell rather than a missing column.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let records: Vec<Record> = records.into_iter().collect();
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|column| record.remove(column).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ValidationError::RowWidth {
                row: self.rows.len(),
                found: row.len(),
                expected: self.columns.len(),
            }
            .into());
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

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    /// Remove the named columns when present.
    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();
        if keep.iter().all(|k| *k) {
            return;
        }

        let retain = |cells: Vec<Value>| -> Vec<Value> {
            cells
                .into_iter()
                .zip(keep.iter())
                .filter_map(|(cell, k)| k.then_some(cell))
                .collect()
        };

        let columns = std::mem::take(&mut self.columns);
        self.columns = columns
            .into_iter()
            .zip(keep.iter())
            .filter_map(|(c, k)| k.then_some(c))
            .collect();
        let rows = std::mem::take(&mut self.rows);
        self.rows = rows.into_iter().map(retain).collect();
    }

    /// Convert every cell of a column. Returns `false` when the column is absent.
    pub fn coerce_column(&mut self, name: &str, coercion: Coercion) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            let cell = std::mem::take(&mut row[index]);
            row[index] = coerce_value(cell, coercion);
        }
        true
    }

    /// Header row followed by data rows, as uploaded to a worksheet.
    pub fn to_values(&self) -> Vec<Vec<Value>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(
            self.columns
                .iter()
                .map(|c| Value::String(c.clone()))
                .collect(),
        );
        values.extend(self.rows.iter().cloned());
        values
    }
}

/// Apply a single coercion to one cell.
pub fn coerce_value(value: Value, coercion: Coercion) -> Value {
    match coercion {
        Coercion::Text => match value {
            Value::Null => Value::Null,
            Value::String(s) => Value::String(s),
            other => Value::String(render_cell(&other)),
        },
        Coercion::Number => number_value(parse_number(&value)),
        Coercion::Percent => number_value(parse_number(&value).map(|n| n / 100.0)),
        Coercion::TriStateBool => match parse_bool(&value) {
            Some(b) => Value::Bool(b),
            None => Value::Null,
        },
    }
}

/// Text form of a cell as written to CSV. Null is the empty string.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn number_value(n: Option<f64>) -> Value {
    n.and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 1.0 => Some(true),
            Some(x) if x == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "1" | "1.0" => Some(true),
            "false" | "f" | "no" | "0" | "0.0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
