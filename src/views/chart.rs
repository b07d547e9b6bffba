//! Renderer-agnostic chart specifications.
//!
//! A `ChartSpec` is what a view controller hands back to the shell: trace
//! kinds, x/y values, axis titles and formats. The page turns it into a
//! Plotly figure; nothing here knows about colours or layout chrome.

use super::ViewError;
use crate::core::{ResultTable, Value};
use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ChartSpec {
    /// Output target on the page (e.g. `kaq1-trend`)
    pub id: String,
    pub title: String,
    pub traces: Vec<Trace>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Secondary y axis, overlaying the primary on the right
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2_axis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_mode: Option<BarMode>,
    /// Shown in place of the plot when a chart could not be computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    #[schemars(with = "Vec<serde_json::Value>")]
    pub x: Vec<Value>,
    pub y: Vec<Option<f64>>,
    /// Per-point labels drawn on bars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    pub axis: AxisRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceKind {
    Line { markers: bool },
    Bar,
    /// Stacked area; `normalized` stacks each x to a total of 1
    Area { normalized: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AxisRef {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, JsonSchema)]
pub struct Axis {
    pub title: String,
    pub format: AxisFormat,
}

impl Axis {
    pub fn plain(title: impl Into<String>) -> Self {
        Axis {
            title: title.into(),
            format: AxisFormat::Plain,
        }
    }

    pub fn percent(title: impl Into<String>) -> Self {
        Axis {
            title: title.into(),
            format: AxisFormat::Percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AxisFormat {
    #[default]
    Plain,
    /// Fractions shown as whole percentages (0.25 -> 25%)
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    Group,
}

impl ChartSpec {
    /// A chart with no traces.
    pub fn new(id: &str, title: &str) -> Self {
        ChartSpec {
            id: id.to_string(),
            title: title.to_string(),
            traces: Vec::new(),
            x_axis: Axis::default(),
            y_axis: Axis::default(),
            y2_axis: None,
            legend_title: None,
            bar_mode: None,
            notice: None,
        }
    }

    pub fn x_axis(mut self, axis: Axis) -> Self {
        self.x_axis = axis;
        self
    }

    pub fn y_axis(mut self, axis: Axis) -> Self {
        self.y_axis = axis;
        self
    }

    pub fn y2_axis(mut self, axis: Axis) -> Self {
        self.y2_axis = Some(axis);
        self
    }

    pub fn legend(mut self, title: &str) -> Self {
        self.legend_title = Some(title.to_string());
        self
    }

    pub fn bar_mode(mut self, mode: BarMode) -> Self {
        self.bar_mode = Some(mode);
        self
    }

    pub fn trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }

    pub fn traces(mut self, traces: Vec<Trace>) -> Self {
        self.traces.extend(traces);
        self
    }

    pub fn with_notice(mut self, notice: String) -> Self {
        self.notice = Some(notice);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

impl Trace {
    pub fn new(name: impl Into<String>, kind: TraceKind, x: Vec<Value>, y: Vec<Option<f64>>) -> Self {
        Trace {
            name: name.into(),
            kind,
            x,
            y,
            text: None,
            axis: AxisRef::Primary,
        }
    }

    pub fn with_text(mut self, text: Vec<String>) -> Self {
        self.text = Some(text);
        self
    }

    pub fn on_secondary_axis(mut self) -> Self {
        self.axis = AxisRef::Secondary;
        self
    }

    pub fn line(name: impl Into<String>, x: Vec<Value>, y: Vec<Option<f64>>) -> Self {
        Self::new(name, TraceKind::Line { markers: true }, x, y)
    }

    pub fn bar(name: impl Into<String>, x: Vec<Value>, y: Vec<Option<f64>>) -> Self {
        Self::new(name, TraceKind::Bar, x, y)
    }
}

/// One trace of `y_col` against `x_col`, in row order.
pub fn single_series(
    table: &ResultTable,
    x_col: &str,
    y_col: &str,
    name: &str,
    kind: TraceKind,
) -> Result<Trace, ViewError> {
    let x = column_values(table, x_col)?;
    let y = column_numbers(table, y_col)?;
    Ok(Trace::new(name, kind, x, y))
}

/// One trace per distinct `group_col` value, in order of first appearance.
/// Rows with a missing group are dropped.
pub fn series_by_group(
    table: &ResultTable,
    x_col: &str,
    y_col: &str,
    group_col: &str,
    kind: TraceKind,
) -> Result<Vec<Trace>, ViewError> {
    let x_idx = require(table, x_col)?;
    let y_idx = require(table, y_col)?;
    let g_idx = require(table, group_col)?;

    let mut traces: Vec<Trace> = Vec::new();
    for row in table.rows() {
        let Some(group) = row[g_idx].label() else {
            continue;
        };
        let pos = match traces.iter().position(|t| t.name == group) {
            Some(pos) => pos,
            None => {
                traces.push(Trace::new(group, kind, Vec::new(), Vec::new()));
                traces.len() - 1
            }
        };
        traces[pos].x.push(row[x_idx].clone());
        traces[pos].y.push(row[y_idx].as_f64());
    }
    Ok(traces)
}

pub fn require(table: &ResultTable, column: &str) -> Result<usize, ViewError> {
    table
        .column_index(column)
        .ok_or_else(|| ViewError::MissingColumn {
            table: table.name().to_string(),
            column: column.to_string(),
        })
}

pub fn column_values(table: &ResultTable, column: &str) -> Result<Vec<Value>, ViewError> {
    let idx = require(table, column)?;
    Ok(table.rows().map(|row| row[idx].clone()).collect())
}

pub fn column_numbers(table: &ResultTable, column: &str) -> Result<Vec<Option<f64>>, ViewError> {
    let idx = require(table, column)?;
    Ok(table.rows().map(|row| row[idx].as_f64()).collect())
}

/// Fraction as a whole percentage: 0.256 -> "26%".
pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Integer with thousands separators: 1234567.0 -> "1,234,567".
pub fn format_count(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// `events_per_active_user` -> `Events Per Active User`
pub fn title_case(column: &str) -> String {
    column
        .split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_follow_first_appearance() {
        let table = ResultTable::read_csv(
            "t",
            "m,tier,dau\n1,pro,1\n1,free,2\n2,pro,3\n2,,9\n2,free,4\n".as_bytes(),
        )
        .unwrap();
        let traces = series_by_group(&table, "m", "dau", "tier", TraceKind::Bar).unwrap();
        let names: Vec<&str> = traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["pro", "free"]);
        assert_eq!(traces[0].y, vec![Some(1.0), Some(3.0)]);
        assert_eq!(traces[1].y, vec![Some(2.0), Some(4.0)]);
    }

    #[test]
    fn unknown_column_is_reported() {
        let table = ResultTable::read_csv("t", "a\n1\n".as_bytes()).unwrap();
        let err = single_series(&table, "a", "b", "b", TraceKind::Bar).unwrap_err();
        assert_eq!(err.to_string(), "column 'b' not found in t");
    }

    #[test]
    fn percent_format_rounds_to_whole_numbers() {
        assert_eq!(format_percent(0.256), "26%");
        assert_eq!(format_percent(-0.25), "-25%");
        assert_eq!(format_percent(1.0), "100%");
    }

    #[test]
    fn count_format_groups_thousands() {
        assert_eq!(format_count(100.0), "100");
        assert_eq!(format_count(1234567.0), "1,234,567");
        assert_eq!(format_count(-1500.0), "-1,500");
    }

    #[test]
    fn titles_from_column_names() {
        assert_eq!(title_case("events_per_active_user"), "Events Per Active User");
        assert_eq!(title_case("dau"), "Dau");
    }

    #[test]
    fn spec_serializes_trace_kinds_with_tags() {
        let spec = ChartSpec::new("c", "C").trace(Trace::line("a", vec![Value::Number(1.0)], vec![None]));
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["traces"][0]["kind"]["type"], "line");
        assert_eq!(json["traces"][0]["y"][0], serde_json::Value::Null);
        assert!(json.get("notice").is_none());
    }
}
