//! Fixed row partitions of a time-keyed result table.

use super::calendar::CALENDAR_KEY;
use super::table::{ResultTable, Value};
use chrono::NaiveDate;
use serde::Serialize;

/// Which partition a row belongs to, decided by the presence of its calendar
/// key, year, month and category cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubView {
    /// Calendar key defined, category present.
    Monthly,
    /// Calendar key defined, category absent.
    MonthlyOverall,
    /// Year only, category present.
    Yearly,
    /// Year only, category absent.
    YearlyOverall,
    /// Neither year nor month, category present.
    Total,
    /// Neither year nor month, category absent.
    GrandTotal,
    /// Anything else, e.g. a month without a year.
    Unkeyed,
}

impl SubView {
    pub const ALL: [SubView; 7] = [
        SubView::Monthly,
        SubView::MonthlyOverall,
        SubView::Yearly,
        SubView::YearlyOverall,
        SubView::Total,
        SubView::GrandTotal,
        SubView::Unkeyed,
    ];

    pub fn classify(key: &Value, year: &Value, month: &Value, category: &Value) -> SubView {
        let has_category = !category.is_missing();
        let has_year = year.as_f64().is_some();
        let has_month = month.as_f64().is_some();
        match (key.as_date().is_some(), has_year, has_month, has_category) {
            (true, _, _, true) => SubView::Monthly,
            (true, _, _, false) => SubView::MonthlyOverall,
            (false, true, false, true) => SubView::Yearly,
            (false, true, false, false) => SubView::YearlyOverall,
            (false, false, false, true) => SubView::Total,
            (false, false, false, false) => SubView::GrandTotal,
            _ => SubView::Unkeyed,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SubView::Monthly => "monthly",
            SubView::MonthlyOverall => "monthly overall",
            SubView::Yearly => "yearly",
            SubView::YearlyOverall => "yearly overall",
            SubView::Total => "total",
            SubView::GrandTotal => "grand total",
            SubView::Unkeyed => "unkeyed",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A keyed table together with its sub-views, computed once.
#[derive(Debug, Clone)]
pub struct PartitionedTable {
    table: ResultTable,
    category: String,
    views: [ResultTable; 7],
}

impl PartitionedTable {
    /// Partition a table that already carries a calendar key column.
    pub fn new(table: ResultTable, year_col: &str, month_col: &str, category_col: &str) -> Self {
        let key = table.column_index(CALENDAR_KEY);
        let year = table.column_index(year_col);
        let month = table.column_index(month_col);
        let category = table.column_index(category_col);
        let cell = |row: &[Value], idx: Option<usize>| -> Value {
            idx.map_or(Value::Missing, |i| row[i].clone())
        };

        let views = std::array::from_fn(|i| {
            let view = SubView::ALL[i];
            table.filter_rows(|row| {
                SubView::classify(
                    &cell(row, key),
                    &cell(row, year),
                    &cell(row, month),
                    &cell(row, category),
                ) == view
            })
        });

        PartitionedTable {
            table,
            category: category_col.to_string(),
            views,
        }
    }

    /// The whole table, including the derived key.
    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    pub fn view(&self, view: SubView) -> &ResultTable {
        &self.views[view.index()]
    }

    pub fn category_column(&self) -> &str {
        &self.category
    }

    /// Sorted distinct categories of the per-category monthly rows.
    pub fn categories(&self) -> Vec<String> {
        self.view(SubView::Monthly).distinct_labels(&self.category)
    }

    /// Earliest and latest calendar key over all monthly rows.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let monthly = self
            .view(SubView::Monthly)
            .concat(self.view(SubView::MonthlyOverall));
        date_bounds(&monthly, CALENDAR_KEY)
    }
}

/// Earliest and latest date of a date column.
pub fn date_bounds(table: &ResultTable, column: &str) -> Option<(NaiveDate, NaiveDate)> {
    let dates: Vec<NaiveDate> = table
        .column(column)?
        .into_iter()
        .filter_map(Value::as_date)
        .collect();
    Some((*dates.iter().min()?, *dates.iter().max()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::derive_calendar_key;

    const CSV: &str = "\
year,month,tier,dau
2024,1,free,10
2024,1,,30
2024,,free,100
2024,,,300
,,free,400
,,,1000
,5,free,1
abc,2,pro,2
2024,2,pro,40
";

    fn partitioned() -> PartitionedTable {
        let raw = ResultTable::read_csv("t", CSV.as_bytes()).unwrap();
        PartitionedTable::new(derive_calendar_key(&raw, "year", "month"), "year", "month", "tier")
    }

    #[test]
    fn partitions_are_disjoint_and_exhaustive() {
        let p = partitioned();
        let total: usize = SubView::ALL.iter().map(|v| p.view(*v).len()).sum();
        assert_eq!(total, p.table().len());

        for row in p.table().rows() {
            let key = &row[p.table().column_index(CALENDAR_KEY).unwrap()];
            let matching = SubView::ALL
                .iter()
                .filter(|v| {
                    SubView::classify(key, &row[0], &row[1], &row[2]) == **v
                })
                .count();
            assert_eq!(matching, 1);
        }
    }

    #[test]
    fn rows_land_in_expected_views() {
        let p = partitioned();
        let dau = |v: SubView| p.view(v).numbers("dau").unwrap();
        assert_eq!(dau(SubView::Monthly), vec![Some(10.0), Some(40.0)]);
        assert_eq!(dau(SubView::MonthlyOverall), vec![Some(30.0)]);
        assert_eq!(dau(SubView::Yearly), vec![Some(100.0)]);
        assert_eq!(dau(SubView::YearlyOverall), vec![Some(300.0)]);
        assert_eq!(dau(SubView::Total), vec![Some(400.0)]);
        // non-numeric year is coerced to missing: month without year
        assert_eq!(dau(SubView::Unkeyed), vec![Some(1.0), Some(2.0)]);
        assert_eq!(dau(SubView::GrandTotal), vec![Some(1000.0)]);
    }

    #[test]
    fn categories_and_bounds_come_from_monthly_rows() {
        let p = partitioned();
        assert_eq!(p.categories(), vec!["free", "pro"]);
        assert_eq!(
            p.date_bounds(),
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
            ))
        );
    }
}
