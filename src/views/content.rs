//! Content-type trends, seasonality and yearly comparison (`kaq2`).

use super::chart::{require, series_by_group, Axis, BarMode, ChartSpec, Trace, TraceKind};
use super::{category_trend, chart_or_empty, non_empty, resolve_metric, Selection, ViewError};
use super::ENGAGEMENT_METRICS;
use crate::core::{
    by_category, month_label, DatasetStore, ResultTable, SubView, Value, CALENDAR_KEY,
};
use std::collections::{BTreeMap, BTreeSet};

pub const TREND: &str = "kaq2-trend";
pub const SEASONALITY: &str = "kaq2-seasonality";
pub const YEARLY: &str = "kaq2-yearly";

const CONTENT_TYPE: &str = "content_type";
const OVERALL_LABEL: &str = "all";

pub fn update(selection: &Selection, store: &DatasetStore) -> Vec<ChartSpec> {
    vec![
        chart_or_empty(TREND, "Monthly engagement by content type", || {
            trend(selection, store)
        }),
        chart_or_empty(SEASONALITY, "Average by calendar month", || {
            seasonality(selection, store)
        }),
        chart_or_empty(YEARLY, "Year-over-year comparison", || {
            yearly(selection, store)
        }),
    ]
}

fn trend(selection: &Selection, store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let metric = resolve_metric(selection, ENGAGEMENT_METRICS)?;
    let rows = category_trend(store.kaq2(), selection, OVERALL_LABEL, TREND)?;
    let traces = series_by_group(
        &rows,
        CALENDAR_KEY,
        metric.column,
        CONTENT_TYPE,
        TraceKind::Line { markers: true },
    )?;
    Ok(ChartSpec::new(TREND, "Monthly engagement by content type")
        .x_axis(Axis::plain("Month"))
        .y_axis(Axis::plain(metric.label))
        .legend("Content Type")
        .traces(traces))
}

/// Seasonal profile over every year on record; the date range does not apply.
fn seasonality(selection: &Selection, store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let metric = resolve_metric(selection, ENGAGEMENT_METRICS)?;
    let rows = by_category(
        store.kaq2().view(SubView::Monthly),
        CONTENT_TYPE,
        &selection.categories,
    );
    let rows = non_empty(rows, SEASONALITY)?;
    let profile = seasonal_means(&rows, "month", CONTENT_TYPE, metric.column)?;

    let x: Vec<Value> = profile
        .months
        .iter()
        .filter_map(|m| month_label(*m))
        .map(|label| Value::Text(label.to_string()))
        .collect();
    let traces = profile
        .series
        .into_iter()
        .map(|(name, y)| Trace::line(name, x.clone(), y))
        .collect();

    Ok(ChartSpec::new(SEASONALITY, "Average by calendar month")
        .x_axis(Axis::plain("Month"))
        .y_axis(Axis::plain(format!("Average {}", metric.label)))
        .legend("Content Type")
        .traces(traces))
}

fn yearly(selection: &Selection, store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let metric = resolve_metric(selection, ENGAGEMENT_METRICS)?;
    let rows = by_category(
        store.kaq2().view(SubView::Yearly),
        CONTENT_TYPE,
        &selection.categories,
    );
    let rows = non_empty(rows.sorted_by("year"), YEARLY)?;
    let traces = series_by_group(&rows, CONTENT_TYPE, metric.column, "year", TraceKind::Bar)?;
    Ok(ChartSpec::new(YEARLY, "Year-over-year comparison")
        .x_axis(Axis::plain("Content Type"))
        .y_axis(Axis::plain(metric.label))
        .legend("Year")
        .bar_mode(BarMode::Group)
        .traces(traces))
}

/// Mean of a metric per calendar month and category.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalProfile {
    /// Month numbers present, ascending
    pub months: Vec<u32>,
    /// One series per category, sorted by name, aligned with `months`
    pub series: Vec<(String, Vec<Option<f64>>)>,
}

/// Group rows by (month number, category) and average `metric`, skipping
/// missing values. Rows without a valid month or category are ignored.
pub fn seasonal_means(
    table: &ResultTable,
    month_col: &str,
    category_col: &str,
    metric: &str,
) -> Result<SeasonalProfile, ViewError> {
    let month_idx = require(table, month_col)?;
    let cat_idx = require(table, category_col)?;
    let metric_idx = require(table, metric)?;

    // (sum, count) per category and month
    let mut sums: BTreeMap<String, BTreeMap<u32, (f64, usize)>> = BTreeMap::new();
    let mut months = BTreeSet::new();
    for row in table.rows() {
        let Some(month) = row[month_idx]
            .as_integer()
            .and_then(|m| u32::try_from(m).ok())
            .filter(|m| (1..=12).contains(m))
        else {
            continue;
        };
        let Some(category) = row[cat_idx].label() else {
            continue;
        };
        months.insert(month);
        let entry = sums.entry(category).or_default().entry(month).or_insert((0.0, 0));
        if let Some(v) = row[metric_idx].as_f64() {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    let months: Vec<u32> = months.into_iter().collect();
    let series = sums
        .into_iter()
        .map(|(category, by_month)| {
            let y = months
                .iter()
                .map(|m| match by_month.get(m) {
                    Some((sum, n)) if *n > 0 => Some(sum / *n as f64),
                    _ => None,
                })
                .collect();
            (category, y)
        })
        .collect();
    Ok(SeasonalProfile { months, series })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::fixtures;

    #[test]
    fn mean_of_constant_is_constant() {
        let table = ResultTable::read_csv(
            "t",
            "month,type,dau\n1,page,7\n1,page,7\n2,page,7\n1,page,\n".as_bytes(),
        )
        .unwrap();
        let profile = seasonal_means(&table, "month", "type", "dau").unwrap();
        assert_eq!(profile.months, vec![1, 2]);
        assert_eq!(profile.series, vec![("page".to_string(), vec![Some(7.0), Some(7.0)])]);
    }

    #[test]
    fn seasonality_averages_across_years() {
        let store = fixtures::store();
        let charts = update(&Selection::default().categories(["database"]), &store);
        let season = &charts[1];
        assert_eq!(season.traces.len(), 1);
        assert_eq!(
            season.traces[0].x,
            vec![Value::Text("Jan".into()), Value::Text("Feb".into())]
        );
        // Jan: (7 + 9) / 2
        assert_eq!(season.traces[0].y, vec![Some(8.0), Some(11.0)]);
    }

    #[test]
    fn seasonality_ignores_date_range() {
        let store = fixtures::store();
        let sel = Selection::default().between(Some("2024-02-01"), Some("2024-02-01"));
        let charts = update(&sel, &store);
        assert_eq!(charts[0].traces[0].y.len(), 1);
        assert_eq!(charts[1].traces[0].y.len(), 2);
    }

    #[test]
    fn yearly_bars_have_one_series_per_year() {
        let store = fixtures::store();
        let yearly = &update(&Selection::default(), &store)[2];
        let names: Vec<&str> = yearly.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["2023", "2024"]);
        assert_eq!(yearly.bar_mode, Some(BarMode::Group));
        assert_eq!(yearly.traces[1].y, vec![Some(10.0), Some(20.0)]);
    }

    #[test]
    fn overall_label_is_all() {
        let store = fixtures::store();
        let trend = &update(&Selection::default().overall(true), &store)[0];
        assert!(trend.traces.iter().any(|t| t.name == "all"));
    }
}
