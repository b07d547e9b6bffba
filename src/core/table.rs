use super::error::DataError;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::io::Read;

/// Tokens read as a missing cell, in addition to the empty string.
const MISSING_TOKENS: &[&str] = &["nan", "NaN", "NA", "N/A", "null", "NULL", "None", "NaT"];

/// A single typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    /// Type a raw CSV cell: empty or NA-like is missing, a finite float is a
    /// number, everything else is text.
    pub fn parse(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed) {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Integral numeric value, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    /// String form used for category matching and axis labels.
    pub fn label(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            Value::Number(_) => Some(self.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Missing => serializer.serialize_none(),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
        }
    }
}

/// An immutable, rectangular table of typed cells.
///
/// Every transformation returns a new table; the receiver is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, DataError> {
        let name = name.into();
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(DataError::unavailable(
                &name,
                format!(
                    "row {} has {} fields, expected {}",
                    idx + 1,
                    row.len(),
                    columns.len()
                ),
            ));
        }
        Ok(ResultTable {
            name,
            columns,
            rows,
        })
    }

    /// Read a headed CSV document. Ragged or unreadable input is `DataUnavailable`.
    pub fn read_csv<R: Read>(name: &str, reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let columns: Vec<String> = rdr
            .headers()
            .map_err(|e| DataError::unavailable(name, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(DataError::unavailable(name, "missing header row"));
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| DataError::unavailable(name, e))?;
            rows.push(record.iter().map(Value::parse).collect());
        }
        Self::new(name, columns, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
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

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, column: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Numeric view of one column; non-numeric cells are `None`.
    pub fn numbers(&self, column: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|row| row[idx].as_f64()).collect())
    }

    /// Sorted distinct labels of a column, ignoring missing cells.
    pub fn distinct_labels(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row[idx].label())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Copy of the rows matching `keep`.
    pub fn filter_rows(&self, keep: impl Fn(&[Value]) -> bool) -> ResultTable {
        ResultTable {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// Copy with every cell of `column` replaced by `f(cell)`. Unknown columns
    /// leave the copy unchanged.
    pub fn map_column(&self, column: &str, f: impl Fn(&Value) -> Value) -> ResultTable {
        let mut out = self.clone();
        if let Some(idx) = self.column_index(column) {
            for row in &mut out.rows {
                row[idx] = f(&row[idx]);
            }
        }
        out
    }

    /// Copy with `column` set to `values`, appended when it does not exist yet.
    pub fn with_column(&self, column: &str, values: Vec<Value>) -> Result<ResultTable, DataError> {
        if values.len() != self.rows.len() {
            return Err(DataError::unavailable(
                &self.name,
                format!(
                    "column '{}' has {} values for {} rows",
                    column,
                    values.len(),
                    self.rows.len()
                ),
            ));
        }
        let mut out = self.clone();
        match self.column_index(column) {
            Some(idx) => {
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                out.columns.push(column.to_string());
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(out)
    }

    /// Rows of `self` followed by rows of `other`, aligned by column name.
    /// Columns only one side has are filled with missing cells on the other.
    pub fn concat(&self, other: &ResultTable) -> ResultTable {
        let mut columns = self.columns.clone();
        for c in &other.columns {
            if !columns.contains(c) {
                columns.push(c.clone());
            }
        }
        let align = |table: &ResultTable| -> Vec<Vec<Value>> {
            let positions: Vec<Option<usize>> =
                columns.iter().map(|c| table.column_index(c)).collect();
            table
                .rows
                .iter()
                .map(|row| {
                    positions
                        .iter()
                        .map(|p| p.map_or(Value::Missing, |i| row[i].clone()))
                        .collect()
                })
                .collect()
        };
        let mut rows = align(self);
        rows.extend(align(other));
        ResultTable {
            name: self.name.clone(),
            columns,
            rows,
        }
    }

    /// Stable ascending sort on one column; missing cells sort last.
    pub fn sorted_by(&self, column: &str) -> ResultTable {
        let mut out = self.clone();
        if let Some(idx) = self.column_index(column) {
            out.rows.sort_by(|a, b| compare_cells(&a[idx], &b[idx]));
        }
        out
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| {
                        (
                            c.clone(),
                            serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
                        )
                    })
                    .collect()
            })
            .collect()
    }
}

fn compare_cells(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Value::Missing, Value::Missing) => Ordering::Equal,
        (Value::Missing, _) => Ordering::Greater,
        (_, Value::Missing) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (x, y) => x.to_string().cmp(&y.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultTable {
        ResultTable::read_csv(
            "sample",
            "tier,dau,note\nfree,10,\npro,20,x\n,NaN,y\n".as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn parse_types_cells() {
        assert_eq!(Value::parse(""), Value::Missing);
        assert_eq!(Value::parse("nan"), Value::Missing);
        assert_eq!(Value::parse("2024.0"), Value::Number(2024.0));
        assert_eq!(Value::parse(" pro "), Value::Text("pro".to_string()));
        assert_eq!(Value::parse("inf"), Value::Text("inf".to_string()));
    }

    #[test]
    fn read_csv_keeps_shape() {
        let table = sample();
        assert_eq!(table.columns(), &["tier", "dau", "note"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.numbers("dau").unwrap(), vec![Some(10.0), Some(20.0), None]);
    }

    #[test]
    fn ragged_csv_is_unavailable() {
        let err = ResultTable::read_csv("bad", "a,b\n1,2\n3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(Value::Number(2024.0).to_string(), "2024");
        assert_eq!(Value::Number(0.25).to_string(), "0.25");
    }

    #[test]
    fn distinct_labels_are_sorted_and_skip_missing() {
        assert_eq!(sample().distinct_labels("tier"), vec!["free", "pro"]);
    }

    #[test]
    fn concat_aligns_columns_by_name() {
        let left = ResultTable::read_csv("l", "a,b\n1,2\n".as_bytes()).unwrap();
        let right = ResultTable::read_csv("r", "b,c\n3,4\n".as_bytes()).unwrap();
        let joined = left.concat(&right);
        assert_eq!(joined.columns(), &["a", "b", "c"]);
        assert_eq!(joined.numbers("b").unwrap(), vec![Some(2.0), Some(3.0)]);
        assert_eq!(joined.numbers("a").unwrap(), vec![Some(1.0), None]);
    }

    #[test]
    fn sorted_by_puts_missing_last() {
        let sorted = sample().sorted_by("dau");
        assert_eq!(sorted.numbers("dau").unwrap(), vec![Some(10.0), Some(20.0), None]);
        let by_tier = sample().sorted_by("tier");
        assert_eq!(by_tier.column("tier").unwrap()[2], &Value::Missing);
    }

    #[test]
    fn transformations_leave_source_untouched() {
        let table = sample();
        let before = table.clone();
        let _ = table.map_column("tier", |_| Value::Text("x".into()));
        let _ = table.filter_rows(|_| false);
        assert_eq!(table, before);
    }

    #[test]
    fn records_serialize_missing_as_null() {
        let records = sample().to_records();
        assert_eq!(records[0]["note"], serde_json::Value::Null);
        assert_eq!(records[1]["tier"], serde_json::json!("pro"));
    }
}
