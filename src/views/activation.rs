//! New-user activation by signup cohort (`kaq3`).

use super::chart::{
    column_numbers, column_values, single_series, Axis, BarMode, ChartSpec, Trace, TraceKind,
};
use super::{chart_or_empty, non_empty, Selection, ViewError};
use crate::core::{by_date_range, DatasetStore, ResultTable};

pub const RATE: &str = "kaq3-rate";
pub const VOLUME: &str = "kaq3-volume";

const SIGNUP_MONTH: &str = "signup_month";

pub fn update(selection: &Selection, store: &DatasetStore) -> Vec<ChartSpec> {
    vec![
        chart_or_empty(RATE, "7-day activation rate by signup month", || {
            rate(selection, store)
        }),
        chart_or_empty(VOLUME, "New vs activated users", || volume(selection, store)),
    ]
}

/// Cohorts within the selected signup months, oldest first.
fn cohorts(selection: &Selection, store: &DatasetStore, chart: &str) -> Result<ResultTable, ViewError> {
    let (start, end) = selection.date_range()?;
    let rows = by_date_range(store.kaq3(), SIGNUP_MONTH, start, end).sorted_by(SIGNUP_MONTH);
    non_empty(rows, chart)
}

fn rate(selection: &Selection, store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let rows = cohorts(selection, store, RATE)?;
    let trace = single_series(
        &rows,
        SIGNUP_MONTH,
        "activation_rate",
        "Activation rate",
        TraceKind::Line { markers: true },
    )?;
    Ok(ChartSpec::new(RATE, "7-day activation rate by signup month")
        .x_axis(Axis::plain("Signup Month"))
        .y_axis(Axis::percent("Activation Rate"))
        .trace(trace))
}

fn volume(selection: &Selection, store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let rows = cohorts(selection, store, VOLUME)?;
    let x = column_values(&rows, SIGNUP_MONTH)?;
    Ok(ChartSpec::new(VOLUME, "New vs activated users")
        .x_axis(Axis::plain("Signup Month"))
        .y_axis(Axis::plain("Users"))
        .legend("User Type")
        .bar_mode(BarMode::Group)
        .trace(Trace::bar("New users", x.clone(), column_numbers(&rows, "new_users")?))
        .trace(Trace::bar(
            "Activated users",
            x,
            column_numbers(&rows, "activated_users")?,
        )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::chart::AxisFormat;
    use crate::core::store::fixtures;

    #[test]
    fn cohorts_are_sorted_by_signup_month() {
        let store = fixtures::store();
        let charts = update(&Selection::default(), &store);
        let rate = &charts[0];
        assert_eq!(rate.traces[0].y, vec![Some(0.4), Some(0.5), Some(0.0), Some(0.8)]);
        assert_eq!(rate.y_axis.format, AxisFormat::Percent);

        let volume = &charts[1];
        assert_eq!(volume.traces.len(), 2);
        assert_eq!(
            volume.traces[0].y,
            vec![Some(5.0), Some(10.0), Some(0.0), Some(5.0)]
        );
    }

    #[test]
    fn signup_range_limits_cohorts() {
        let store = fixtures::store();
        let sel = Selection::default().between(Some("2024-02-01"), Some("2024-03-01"));
        let rate = &update(&sel, &store)[0];
        assert_eq!(rate.traces[0].y, vec![Some(0.5), Some(0.0)]);
    }

    #[test]
    fn malformed_bound_gives_notice() {
        let store = fixtures::store();
        let sel = Selection::default().between(None, Some("soon"));
        let charts = update(&sel, &store);
        assert_eq!(charts[0].notice.as_deref(), Some("invalid date 'soon'"));
    }
}
