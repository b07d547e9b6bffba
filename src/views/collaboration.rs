//! Solo vs collaborative work (`kaq5`).

use super::chart::{series_by_group, Axis, BarMode, ChartSpec, TraceKind};
use super::{category_trend, chart_or_empty, Selection, ViewError};
use crate::core::{DatasetStore, CALENDAR_KEY};

pub const SHARE: &str = "kaq5-share";
pub const EVENTS: &str = "kaq5-events";

const WORK_MODE: &str = "work_mode";
const OVERALL_LABEL: &str = "overall";

pub fn update(selection: &Selection, store: &DatasetStore) -> Vec<ChartSpec> {
    vec![
        chart_or_empty(SHARE, "Share of activity by work mode", || {
            share(selection, store)
        }),
        chart_or_empty(EVENTS, "Events by work mode", || events(selection, store)),
    ]
}

/// Stacked to 100% per month. The overall rows are never stacked in, since
/// they already sum the other series.
fn share(selection: &Selection, store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let per_mode = selection.clone().overall(false);
    let rows = category_trend(store.kaq5(), &per_mode, OVERALL_LABEL, SHARE)?;
    let traces = series_by_group(
        &rows,
        CALENDAR_KEY,
        "proportion",
        WORK_MODE,
        TraceKind::Area { normalized: true },
    )?;
    Ok(ChartSpec::new(SHARE, "Share of activity by work mode")
        .x_axis(Axis::plain("Month"))
        .y_axis(Axis::percent("Share"))
        .legend("Work Mode")
        .traces(traces))
}

fn events(selection: &Selection, store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let rows = category_trend(store.kaq5(), selection, OVERALL_LABEL, EVENTS)?;
    let traces = series_by_group(&rows, CALENDAR_KEY, "events", WORK_MODE, TraceKind::Bar)?;
    Ok(ChartSpec::new(EVENTS, "Events by work mode")
        .x_axis(Axis::plain("Month"))
        .y_axis(Axis::plain("Events"))
        .legend("Work Mode")
        .bar_mode(BarMode::Group)
        .traces(traces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::fixtures;
    use crate::views::chart::AxisFormat;

    #[test]
    fn share_excludes_overall_even_when_toggled() {
        let store = fixtures::store();
        let charts = update(&Selection::default().overall(true), &store);
        let share = &charts[0];
        let names: Vec<&str> = share.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["solo", "collaborative"]);
        assert_eq!(share.traces[0].kind, TraceKind::Area { normalized: true });
        assert_eq!(share.y_axis.format, AxisFormat::Percent);

        let events = &charts[1];
        assert_eq!(events.traces.len(), 3);
        assert_eq!(events.traces[2].name, "overall");
        assert_eq!(events.traces[2].y, vec![Some(100.0), Some(100.0)]);
    }

    #[test]
    fn work_mode_filter_applies_to_both_charts() {
        let store = fixtures::store();
        let sel = Selection::default()
            .categories(["solo"])
            .between(Some("2024-02-01"), None);
        let charts = update(&sel, &store);
        assert_eq!(charts[0].traces.len(), 1);
        assert_eq!(charts[0].traces[0].y, vec![Some(0.5)]);
        assert_eq!(charts[1].traces[0].y, vec![Some(50.0)]);
    }
}
