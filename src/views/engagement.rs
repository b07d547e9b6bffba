//! Engagement by subscription tier (`kaq1`).

use super::chart::{series_by_group, Axis, ChartSpec, TraceKind};
use super::{category_trend, chart_or_empty, non_empty, resolve_metric, Selection, ViewError};
use super::{format_count, ENGAGEMENT_METRICS};
use crate::core::{by_category, DatasetStore, SubView, CALENDAR_KEY};

pub const TREND: &str = "kaq1-trend";
pub const TOTAL: &str = "kaq1-total";

const TIER: &str = "subscription_tier";
const OVERALL_LABEL: &str = "All tiers";

pub fn update(selection: &Selection, store: &DatasetStore) -> Vec<ChartSpec> {
    vec![
        chart_or_empty(TREND, "Monthly engagement by subscription tier", || {
            trend(selection, store)
        }),
        chart_or_empty(TOTAL, "Total engagement across the full period", || {
            total(selection, store)
        }),
    ]
}

fn trend(selection: &Selection, store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let metric = resolve_metric(selection, ENGAGEMENT_METRICS)?;
    let rows = category_trend(store.kaq1(), selection, OVERALL_LABEL, TREND)?;
    let traces = series_by_group(
        &rows,
        CALENDAR_KEY,
        metric.column,
        TIER,
        TraceKind::Line { markers: true },
    )?;
    Ok(ChartSpec::new(TREND, "Monthly engagement by subscription tier")
        .x_axis(Axis::plain("Month"))
        .y_axis(Axis::plain(metric.label))
        .legend("Tier")
        .traces(traces))
}

/// All-time totals per tier; the date range does not apply.
fn total(selection: &Selection, store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let metric = resolve_metric(selection, ENGAGEMENT_METRICS)?;
    let totals = by_category(
        store.kaq1().view(SubView::Total),
        TIER,
        &selection.categories,
    );
    let rows = non_empty(totals, TOTAL)?;
    let mut traces = series_by_group(&rows, TIER, metric.column, TIER, TraceKind::Bar)?;
    for trace in &mut traces {
        let text = trace
            .y
            .iter()
            .map(|y| y.map(format_count).unwrap_or_default())
            .collect();
        trace.text = Some(text);
    }
    Ok(ChartSpec::new(TOTAL, "Total engagement across the full period")
        .x_axis(Axis::plain("Tier"))
        .y_axis(Axis::plain(metric.label))
        .legend("Tier")
        .traces(traces))
}
