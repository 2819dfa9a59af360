//! In-memory tabular data
//!
//! A [`Table`] is an ordered list of typed columns and rows of [`Value`]s.
//! It is what the CSV reader produces, what the store holds, and what the
//! aggregation queries return.

use std::fmt;

/// A single cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            // Whole floats keep a trailing ".0" so they read back as floats
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Infer a column type from raw CSV fields
    ///
    /// Empty fields are ignored. A column with only empty fields is `Float`,
    /// mirroring how an all-missing column is usually treated.
    pub fn infer<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let mut all_int = true;
        let mut seen = false;

        for field in fields.into_iter().filter(|f| !f.is_empty()) {
            seen = true;
            if all_int && field.parse::<i64>().is_ok() {
                continue;
            }
            all_int = false;
            if field.parse::<f64>().is_err() {
                return ColumnType::Text;
            }
        }

        if seen && all_int {
            ColumnType::Integer
        } else {
            ColumnType::Float
        }
    }

    /// Convert a raw field into a value of this type
    ///
    /// The field must have been part of the data the type was inferred from.
    pub fn parse(&self, field: &str) -> Value {
        if field.is_empty() {
            return Value::Null;
        }
        match self {
            ColumnType::Integer => field
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(field.to_string())),
            ColumnType::Float => field
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::Text(field.to_string())),
            ColumnType::Text => Value::Text(field.to_string()),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "REAL",
            ColumnType::Text => "TEXT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from raw string records, inferring column types
    ///
    /// Every record must have one field per header.
    pub fn from_records(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let columns: Vec<Column> = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let ty = ColumnType::infer(records.iter().map(|r| r[idx].as_str()));
                Column::new(name, ty)
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .zip(record)
                    .map(|(col, field)| col.ty.parse(field))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of a column by name, ignoring ASCII case
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|idx| &self.columns[idx])
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
}
