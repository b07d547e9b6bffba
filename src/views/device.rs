//! Device impact on activity and session length (`kaq4`).

use super::chart::{series_by_group, Axis, ChartSpec, TraceKind};
use super::{category_trend, chart_or_empty, Selection, ViewError};
use crate::core::{DatasetStore, CALENDAR_KEY};

pub const ACTIVITY: &str = "kaq4-activity";
pub const DURATION: &str = "kaq4-duration";

const PLATFORM: &str = "platform";
const OVERALL_LABEL: &str = "overall";

pub fn update(selection: &Selection, store: &DatasetStore) -> Vec<ChartSpec> {
    let activity = "Daily active users by platform";
    let duration = "Average session duration by platform";
    vec![
        chart_or_empty(ACTIVITY, activity, || {
            platform_lines(selection, store, ChartSpec::new(ACTIVITY, activity), "dau")
                .map(|c| c.y_axis(Axis::plain("Daily Active Users")))
        }),
        chart_or_empty(DURATION, duration, || {
            platform_lines(
                selection,
                store,
                ChartSpec::new(DURATION, duration),
                "avg_session_duration_sec",
            )
            .map(|c| c.y_axis(Axis::plain("Seconds")))
        }),
    ]
}

fn platform_lines(
    selection: &Selection,
    store: &DatasetStore,
    chart: ChartSpec,
    metric: &str,
) -> Result<ChartSpec, ViewError> {
    let rows = category_trend(store.kaq4(), selection, OVERALL_LABEL, &chart.id)?;
    let traces = series_by_group(
        &rows,
        CALENDAR_KEY,
        metric,
        PLATFORM,
        TraceKind::Line { markers: true },
    )?;
    Ok(chart
        .x_axis(Axis::plain("Month"))
        .legend("Platform")
        .traces(traces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::fixtures;

    #[test]
    fn platform_filter_and_overall() {
        let store = fixtures::store();
        let sel = Selection::default().categories(["mobile"]).overall(true);
        let charts = update(&sel, &store);
        let activity = &charts[0];
        let names: Vec<&str> = activity.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["mobile", "overall"]);
        assert_eq!(activity.traces[0].y, vec![Some(20.0), Some(25.0)]);

        let duration = &charts[1];
        assert_eq!(duration.traces[1].y, vec![Some(180.0), Some(170.0)]);
        assert_eq!(duration.y_axis.title, "Seconds");
    }

    #[test]
    fn no_overall_series_when_toggled_off() {
        let store = fixtures::store();
        let activity = &update(&Selection::default(), &store)[0];
        assert!(activity.traces.iter().all(|t| t.name != "overall"));
    }
}
