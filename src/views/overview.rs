//! Overview tab: user growth and headline numbers.

use super::chart::{column_numbers, column_values, Axis, ChartSpec, Trace};
use super::{chart_or_empty, format_count, format_percent, non_empty, Selection, ViewError};
use crate::core::{DatasetStore, ResultTable, SubView};
use serde::Serialize;

pub const GROWTH: &str = "overview-growth";

const SIGNUP_MONTH: &str = "signup_month";
const NOT_AVAILABLE: &str = "n/a";

pub fn update(_selection: &Selection, store: &DatasetStore) -> Vec<ChartSpec> {
    vec![chart_or_empty(GROWTH, "Cumulative new users", || growth(store))]
}

fn growth(store: &DatasetStore) -> Result<ChartSpec, ViewError> {
    let rows = non_empty(store.kaq3().sorted_by(SIGNUP_MONTH), GROWTH)?;
    let cumulative = running_total(&column_numbers(&rows, "new_users")?);
    Ok(ChartSpec::new(GROWTH, "Cumulative new users")
        .x_axis(Axis::plain("Signup Month"))
        .y_axis(Axis::plain("Users"))
        .trace(Trace::line(
            "Cumulative new users",
            column_values(&rows, SIGNUP_MONTH)?,
            cumulative,
        )))
}

/// Running sum. A missing value stays missing and does not reset the sum.
pub fn running_total(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut sum = 0.0;
    values
        .iter()
        .map(|v| {
            v.map(|v| {
                sum += v;
                sum
            })
        })
        .collect()
}

/// A headline number shown as a card above the overview chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub id: &'static str,
    pub label: &'static str,
    pub value: String,
}

pub fn kpis(store: &DatasetStore) -> Vec<Kpi> {
    let grand_total = store.kaq1().view(SubView::GrandTotal);
    let kaq3 = store.kaq3().sorted_by(SIGNUP_MONTH);
    let aq2 = store.aq2().sorted_by("month_start");

    let latest_rate = match (
        kaq3.column_index(SIGNUP_MONTH),
        kaq3.column_index("activation_rate"),
    ) {
        (Some(date), Some(rate)) => kaq3
            .rows()
            .filter(|row| row[date].as_date().is_some())
            .last()
            .and_then(|row| row[rate].as_f64()),
        _ => None,
    };

    vec![
        Kpi {
            id: "total-users",
            label: "Total Active Users",
            value: first_number(grand_total, "dau")
                .map_or(NOT_AVAILABLE.to_string(), format_count),
        },
        Kpi {
            id: "total-events",
            label: "Total Events",
            value: first_number(grand_total, "events")
                .map_or(NOT_AVAILABLE.to_string(), format_count),
        },
        Kpi {
            id: "latest-activation",
            label: "Latest Activation Rate",
            value: latest_rate.map_or(NOT_AVAILABLE.to_string(), format_percent),
        },
        Kpi {
            id: "latest-mom-change",
            label: "Latest MoM DAU Change",
            value: last_defined(&aq2, "rel_change")
                .map_or(NOT_AVAILABLE.to_string(), |v| {
                    let sign = if v > 0.0 { "+" } else { "" };
                    format!("{}{}", sign, format_percent(v))
                }),
        },
    ]
}

fn first_number(table: &ResultTable, column: &str) -> Option<f64> {
    table.numbers(column)?.into_iter().flatten().next()
}

fn last_defined(table: &ResultTable, column: &str) -> Option<f64> {
    table.numbers(column)?.into_iter().flatten().last()
}
