use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::Path;

use crate::error::LoadError;

/// One table cell. `Null` marks data a source never reported (outer-join
/// gaps); it is distinct from a true zero metric and stays distinct until a
/// consumer decides otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view with `Null` reading as absent. `Str` never converts
    /// here; coercion happens in the normalizer, not at read time.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Canonical text rendering: what filters compare and CSV export emits.
    /// `Null` renders empty.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// Cells never hold NaN: the normalizer maps unparseable numerics to 0/0.0,
// so float equality is total here.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Int(i) => {
                state.write_u8(1);
                i.hash(state);
            }
            Value::Float(f) => {
                state.write_u8(2);
                f.to_bits().hash(state);
            }
            Value::Str(s) => {
                state.write_u8(3);
                s.hash(state);
            }
        }
    }
}

/// Minimal column-ordered table. Column names are unique; rows always have
/// exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
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

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let col = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Rows are padded with `Null` / truncated to the column count, so a
    /// ragged source line cannot desynchronize the table.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Renames a column in place. No-op when `from` is absent; when `to`
    /// already exists the `from` column is dropped instead, keeping the
    /// existing column authoritative.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        let Some(idx) = self.column_index(from) else {
            return;
        };
        if self.has_column(to) {
            self.drop_column_at(idx);
        } else {
            self.columns[idx] = to.to_string();
        }
    }

    pub fn drop_column(&mut self, name: &str) {
        if let Some(idx) = self.column_index(name) {
            self.drop_column_at(idx);
        }
    }

    fn drop_column_at(&mut self, idx: usize) {
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
    }

    /// Applies `f` to every cell of `name`. No-op for an absent column.
    pub fn map_column(&mut self, name: &str, f: impl Fn(&Value) -> Value) {
        let Some(idx) = self.column_index(name) else {
            return;
        };
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
    }

    /// Copy restricted to the named columns, in the order given. Absent
    /// names are skipped rather than erroring, so a projection over a
    /// partially-present identity set stays usable.
    pub fn project(&self, names: &[String]) -> Table {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|n| self.column_index(n))
            .collect();
        let mut out = Table::new(indices.iter().map(|&i| self.columns[i].clone()).collect());
        for row in &self.rows {
            out.rows.push(indices.iter().map(|&i| row[i].clone()).collect());
        }
        out
    }

    /// Copy keeping only rows the predicate accepts. Columns are unchanged;
    /// the source table is never mutated after load.
    pub fn filter_rows(&self, pred: impl Fn(&[Value]) -> bool) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| pred(r)).cloned().collect(),
        }
    }
}

/// Reads a delimited file into a table of raw `Str` cells. Header and cell
/// cleanup is the normalizer's job, not the reader's.
pub fn read_csv(path: &Path) -> Result<Table, LoadError> {
    let wrap = |source: csv::Error| LoadError::Csv {
        file: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(wrap)?;
    let headers: Vec<String> = rdr
        .headers()
        .map_err(wrap)?
        .iter()
        .map(str::to_string)
        .collect();
    let mut table = Table::new(headers);
    for record in rdr.records() {
        let record = record.map_err(wrap)?;
        table.push_row(record.iter().map(|c| Value::Str(c.to_string())).collect());
    }
    Ok(table)
}

/// Writes the table as CSV: header row first, cells via `Value::render`
/// (raw numerics, `Null` as empty field).
pub fn write_csv<W: io::Write>(table: &Table, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|v| v.render()))?;
    }
    wtr.flush()?;
    Ok(())
}
