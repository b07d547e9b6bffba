//! View controllers: pure functions from a user selection and the dataset
//! store to the chart specifications of one tab.

pub mod activation;
pub mod adhoc;
pub mod chart;
pub mod collaboration;
pub mod content;
pub mod device;
pub mod engagement;
pub mod overview;

use crate::core::{
    by_category, by_date_range, parse_date, synthetic_label, with_overall, PartitionedTable,
    ResultTable, Source, SubView, CALENDAR_KEY,
};
use chart::ChartSpec;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub use chart::{format_count, format_percent};

/// Per-chart failures. None of these abort a request; see [`chart_or_empty`].
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("no rows match the selection for {chart}")]
    EmptySelection { chart: String },

    #[error("unknown metric '{metric}'")]
    UnknownMetric { metric: String },

    #[error("invalid date '{value}'")]
    InvalidDate { value: String },

    #[error("column '{column}' not found in {table}")]
    MissingColumn { table: String, column: String },
}

/// Current control values of one tab.
///
/// Dates are kept as entered and parsed per chart, so a malformed bound
/// degrades the affected charts instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub metric: Option<String>,
    /// Empty means every category.
    pub categories: BTreeSet<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub include_overall: bool,
}

impl Selection {
    pub fn metric(mut self, metric: &str) -> Self {
        self.metric = Some(metric.to_string());
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn between(mut self, start: Option<&str>, end: Option<&str>) -> Self {
        self.start = start.map(str::to_string);
        self.end = end.map(str::to_string);
        self
    }

    pub fn overall(mut self, include: bool) -> Self {
        self.include_overall = include;
        self
    }

    /// Parsed date bounds; blank bounds are open.
    pub fn date_range(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>), ViewError> {
        Ok((parse_bound(&self.start)?, parse_bound(&self.end)?))
    }
}

fn parse_bound(bound: &Option<String>) -> Result<Option<NaiveDate>, ViewError> {
    match bound.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| ViewError::InvalidDate {
                value: s.to_string(),
            }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Overview,
    Kaq1,
    Kaq2,
    Kaq3,
    Kaq4,
    Kaq5,
    Aq,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Overview,
        Tab::Kaq1,
        Tab::Kaq2,
        Tab::Kaq3,
        Tab::Kaq4,
        Tab::Kaq5,
        Tab::Aq,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Kaq1 => "kaq1",
            Tab::Kaq2 => "kaq2",
            Tab::Kaq3 => "kaq3",
            Tab::Kaq4 => "kaq4",
            Tab::Kaq5 => "kaq5",
            Tab::Aq => "aq",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Kaq1 => "Engagement by Tier",
            Tab::Kaq2 => "Content Types",
            Tab::Kaq3 => "Activation",
            Tab::Kaq4 => "Device Impact",
            Tab::Kaq5 => "Collaboration",
            Tab::Aq => "Additional Queries",
        }
    }

    /// Sources shown as raw data tables under the tab.
    pub fn sources(self) -> &'static [Source] {
        match self {
            Tab::Overview | Tab::Kaq3 => &[Source::Kaq3],
            Tab::Kaq1 => &[Source::Kaq1],
            Tab::Kaq2 => &[Source::Kaq2],
            Tab::Kaq4 => &[Source::Kaq4],
            Tab::Kaq5 => &[Source::Kaq5],
            Tab::Aq => &[Source::Aq1, Source::Aq2],
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tab: {}", s))
    }
}

/// A selectable metric column and its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub column: &'static str,
    pub label: &'static str,
}

pub const ENGAGEMENT_METRICS: &[Metric] = &[
    Metric {
        column: "dau",
        label: "Daily Active Users",
    },
    Metric {
        column: "events",
        label: "Events",
    },
    Metric {
        column: "events_per_active_user",
        label: "Events per Active User",
    },
];

/// The selected metric, or the first allowed one when none is selected.
pub fn resolve_metric(
    selection: &Selection,
    allowed: &'static [Metric],
) -> Result<&'static Metric, ViewError> {
    match selection.metric.as_deref() {
        None | Some("") => allowed.first().ok_or_else(|| ViewError::UnknownMetric {
            metric: String::new(),
        }),
        Some(metric) => allowed
            .iter()
            .find(|m| m.column == metric)
            .ok_or_else(|| ViewError::UnknownMetric {
                metric: metric.to_string(),
            }),
    }
}

/// Run one chart computation, degrading every failure to an empty chart.
pub fn chart_or_empty(
    id: &str,
    title: &str,
    build: impl FnOnce() -> Result<ChartSpec, ViewError>,
) -> ChartSpec {
    match build() {
        Ok(spec) => {
            if spec.is_empty() {
                log::debug!("{}: no traces", id);
            }
            spec
        }
        Err(ViewError::EmptySelection { chart }) => {
            log::debug!("{}: empty selection", chart);
            ChartSpec::new(id, title)
        }
        Err(e) => {
            log::warn!("{}: {}", id, e);
            ChartSpec::new(id, title).with_notice(e.to_string())
        }
    }
}

/// `table`, or `EmptySelection` when it has no rows.
pub fn non_empty(table: ResultTable, chart: &str) -> Result<ResultTable, ViewError> {
    if table.is_empty() {
        Err(ViewError::EmptySelection {
            chart: chart.to_string(),
        })
    } else {
        Ok(table)
    }
}

/// Monthly rows of the selected categories within the selected dates, in
/// calendar order. With the overall toggle on, the all-category monthly rows
/// follow under `overall_label` (suffixed if a real category already uses it).
pub fn category_trend(
    table: &PartitionedTable,
    selection: &Selection,
    overall_label: &str,
    chart: &str,
) -> Result<ResultTable, ViewError> {
    let (start, end) = selection.date_range()?;
    let col = table.category_column();
    let monthly = table.view(SubView::Monthly);

    let per_category = by_category(
        &by_date_range(monthly, CALENDAR_KEY, start, end),
        col,
        &selection.categories,
    );
    let rows = if selection.include_overall {
        let overall = by_date_range(table.view(SubView::MonthlyOverall), CALENDAR_KEY, start, end);
        let label = synthetic_label(monthly, col, overall_label);
        with_overall(&per_category, &overall, col, &label)
    } else {
        per_category
    };
    non_empty(rows.sorted_by(CALENDAR_KEY), chart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::fixtures;

    #[test]
    fn date_bounds_parse_lazily() {
        let sel = Selection::default().between(Some("2024-02-01"), Some(" "));
        let (start, end) = sel.date_range().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(end, None);

        let bad = Selection::default().between(Some("not a date"), None);
        assert!(matches!(bad.date_range(), Err(ViewError::InvalidDate { .. })));
    }

    #[test]
    fn metric_defaults_to_first_allowed() {
        let m = resolve_metric(&Selection::default(), ENGAGEMENT_METRICS).unwrap();
        assert_eq!(m.column, "dau");
        let m = resolve_metric(&Selection::default().metric("events"), ENGAGEMENT_METRICS).unwrap();
        assert_eq!(m.label, "Events");
        let err = resolve_metric(&Selection::default().metric("revenue"), ENGAGEMENT_METRICS);
        assert!(matches!(err, Err(ViewError::UnknownMetric { .. })));
    }

    #[test]
    fn failures_become_empty_charts() {
        let empty = chart_or_empty("c", "C", || {
            Err(ViewError::EmptySelection { chart: "c".into() })
        });
        assert!(empty.is_empty());
        assert!(empty.notice.is_none());

        let degraded = chart_or_empty("c", "C", || {
            Err(ViewError::UnknownMetric {
                metric: "x".into(),
            })
        });
        assert!(degraded.is_empty());
        assert_eq!(degraded.notice.as_deref(), Some("unknown metric 'x'"));
    }

    #[test]
    fn trend_appends_relabelled_overall_rows() {
        let store = fixtures::store();
        let sel = Selection::default().overall(true);
        let rows = category_trend(store.kaq1(), &sel, "All tiers", "t").unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(
            rows.distinct_labels("subscription_tier"),
            vec!["All tiers", "free", "pro"]
        );
    }

    #[test]
    fn trend_with_nothing_selected_is_empty_selection() {
        let store = fixtures::store();
        let sel = Selection::default().categories(["enterprise"]);
        let err = category_trend(store.kaq1(), &sel, "All tiers", "t").unwrap_err();
        assert!(matches!(err, ViewError::EmptySelection { .. }));
    }

    #[test]
    fn tabs_parse_from_ids() {
        for tab in Tab::ALL {
            assert_eq!(tab.id().parse::<Tab>().unwrap(), tab);
        }
        assert!("kaq6".parse::<Tab>().is_err());
    }
}
