//! Additional queries (`aq1`, `aq2`). These charts take no controls.

use super::chart::{column_numbers, column_values, Axis, BarMode, ChartSpec, Trace};
use super::{chart_or_empty, non_empty, Selection, ViewError};
use crate::core::{DatasetStore, Value};

pub const RANKING: &str = "aq1-ranking";
pub const DAU: &str = "aq2-dau";
pub const CHANGE: &str = "aq2-change";

const MONTH_START: &str = "month_start";

pub fn update(_selection: &Selection, store: &DatasetStore) -> Vec<ChartSpec> {
    vec![
        chart_or_empty(RANKING, "Total events by content type", || ranking(store)),
        chart_or_empty(DAU, "Monthly DAU vs previous month", || dau(store)),
        chart_or_empty(CHANGE, "Month-over-month DAU change", || change(store)),
    ]
}

/// Bars in rank order, labelled with their rank.
fn ranking(store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let rows = non_empty(store.aq1().sorted_by("content_type_rank"), RANKING)?;
    let ranks: Vec<String> = column_values(&rows, "content_type_rank")?
        .iter()
        .map(|rank| match rank {
            Value::Missing => String::new(),
            rank => format!("#{}", rank),
        })
        .collect();
    let trace = Trace::bar(
        "Events",
        column_values(&rows, "content_type")?,
        column_numbers(&rows, "events")?,
    )
    .with_text(ranks);
    Ok(ChartSpec::new(RANKING, "Total events by content type")
        .x_axis(Axis::plain("Content Type"))
        .y_axis(Axis::plain("Events"))
        .trace(trace))
}

fn dau(store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let rows = non_empty(store.aq2().sorted_by(MONTH_START), DAU)?;
    let x = column_values(&rows, MONTH_START)?;
    Ok(ChartSpec::new(DAU, "Monthly DAU vs previous month")
        .x_axis(Axis::plain("Month"))
        .y_axis(Axis::plain("Daily Active Users"))
        .trace(Trace::line(
            "Current month",
            x.clone(),
            column_numbers(&rows, "dau_current_month")?,
        ))
        .trace(Trace::line(
            "Previous month",
            x,
            column_numbers(&rows, "dau_previous_month")?,
        )))
}

/// Absolute change as bars, relative change as a line on a percent axis.
fn change(store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let rows = non_empty(store.aq2().sorted_by(MONTH_START), CHANGE)?;
    let x = column_values(&rows, MONTH_START)?;
    Ok(ChartSpec::new(CHANGE, "Month-over-month DAU change")
        .x_axis(Axis::plain("Month"))
        .y_axis(Axis::plain("Absolute Change"))
        .y2_axis(Axis::percent("Relative Change"))
        .bar_mode(BarMode::Group)
        .trace(Trace::bar(
            "Absolute change",
            x.clone(),
            column_numbers(&rows, "abs_change")?,
        ))
        .trace(
            Trace::line("Relative change", x, column_numbers(&rows, "rel_change")?)
                .on_secondary_axis(),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::fixtures;
    use crate::views::chart::{AxisRef, TraceKind};

    #[test]
    fn ranking_follows_rank_column() {
        let store = fixtures::store();
        let ranking = &update(&Selection::default(), &store)[0];
        let bars = &ranking.traces[0];
        assert_eq!(
            bars.x,
            vec![
                Value::Text("database".into()),
                Value::Text("board".into()),
                Value::Text("page".into())
            ]
        );
        assert_eq!(bars.y, vec![Some(900.0), Some(500.0), Some(300.0)]);
        assert_eq!(
            bars.text,
            Some(vec!["#1".to_string(), "#2".to_string(), "#3".to_string()])
        );
    }

    #[test]
    fn change_chart_uses_secondary_percent_axis() {
        let store = fixtures::store();
        let change = &update(&Selection::default(), &store)[2];
        assert_eq!(change.traces[0].kind, TraceKind::Bar);
        assert_eq!(change.traces[1].axis, AxisRef::Secondary);
        assert_eq!(change.traces[1].y, vec![None, Some(0.2), Some(-0.25)]);
        assert!(change.y2_axis.is_some());
    }

    #[test]
    fn first_month_has_no_previous_dau() {
        let store = fixtures::store();
        let dau = &update(&Selection::default(), &store)[1];
        assert_eq!(dau.traces[1].y[0], None);
        assert_eq!(dau.traces[0].y[0], Some(100.0));
    }
}
