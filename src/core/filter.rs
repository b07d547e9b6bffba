//! Pure row filters over result tables.
//!
//! Every function here is total: unknown columns or empty inputs produce a
//! (possibly empty) table, never an error, and inputs are never modified.

use super::table::{ResultTable, Value};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Rows whose `date_col` lies within the inclusive `[start, end]` range.
///
/// With both bounds absent the input is returned as-is, including rows with an
/// undefined date. With either bound present, undefined dates are excluded.
pub fn by_date_range(
    table: &ResultTable,
    date_col: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ResultTable {
    if start.is_none() && end.is_none() {
        return table.clone();
    }
    let Some(idx) = table.column_index(date_col) else {
        return table.filter_rows(|_| false);
    };
    table.filter_rows(|row| match row[idx].as_date() {
        Some(d) => start.map_or(true, |s| d >= s) && end.map_or(true, |e| d <= e),
        None => false,
    })
}

/// Rows whose `col` value is in `selected`. An empty selection means no filter.
pub fn by_category(table: &ResultTable, col: &str, selected: &BTreeSet<String>) -> ResultTable {
    if selected.is_empty() {
        return table.clone();
    }
    let Some(idx) = table.column_index(col) else {
        return table.filter_rows(|_| false);
    };
    table.filter_rows(|row| row[idx].label().is_some_and(|l| selected.contains(&l)))
}

/// `preferred`, or `preferred (2)`, `preferred (3)`... whichever first does
/// not occur as a value of `col`.
pub fn synthetic_label(table: &ResultTable, col: &str, preferred: &str) -> String {
    let existing: BTreeSet<String> = table.distinct_labels(col).into_iter().collect();
    let mut label = preferred.to_string();
    let mut n = 2;
    while existing.contains(&label) {
        label = format!("{} ({})", preferred, n);
        n += 1;
    }
    label
}

/// Per-category rows followed by the overall rows relabelled as `label`.
pub fn with_overall(
    per_category: &ResultTable,
    overall: &ResultTable,
    col: &str,
    label: &str,
) -> ResultTable {
    let relabelled = overall.map_column(col, |_| Value::Text(label.to_string()));
    per_category.concat(&relabelled)
}
