//! The dataset store: every result table, loaded once at start-up.

use super::calendar::{coerce_date, derive_calendar_key};
use super::columns::{
    Aq1Columns, Aq2Columns, ColumnSpec, Kaq1Columns, Kaq2Columns, Kaq3Columns, Kaq4Columns,
    Kaq5Columns, SourceColumns,
};
use super::error::DataError;
use super::partition::{date_bounds, PartitionedTable, SubView};
use super::table::ResultTable;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// A named result source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Kaq1,
    Kaq2,
    Kaq3,
    Kaq4,
    Kaq5,
    Aq1,
    Aq2,
}

impl Source {
    pub const ALL: [Source; 7] = [
        Source::Kaq1,
        Source::Kaq2,
        Source::Kaq3,
        Source::Kaq4,
        Source::Kaq5,
        Source::Aq1,
        Source::Aq2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Source::Kaq1 => "kaq1",
            Source::Kaq2 => "kaq2",
            Source::Kaq3 => "kaq3",
            Source::Kaq4 => "kaq4",
            Source::Kaq5 => "kaq5",
            Source::Aq1 => "aq1",
            Source::Aq2 => "aq2",
        }
    }

    pub fn columns(self) -> &'static [ColumnSpec] {
        match self {
            Source::Kaq1 => Kaq1Columns::columns(),
            Source::Kaq2 => Kaq2Columns::columns(),
            Source::Kaq3 => Kaq3Columns::columns(),
            Source::Kaq4 => Kaq4Columns::columns(),
            Source::Kaq5 => Kaq5Columns::columns(),
            Source::Aq1 => Aq1Columns::columns(),
            Source::Aq2 => Aq2Columns::columns(),
        }
    }

    /// Category column of time-keyed sources; `None` for flat sources.
    pub fn category_column(self) -> Option<&'static str> {
        match self {
            Source::Kaq1 => Some("subscription_tier"),
            Source::Kaq2 => Some("content_type"),
            Source::Kaq4 => Some("platform"),
            Source::Kaq5 => Some("work_mode"),
            Source::Kaq3 | Source::Aq1 | Source::Aq2 => None,
        }
    }

    /// Column holding the time key used for date filtering, if any.
    pub fn date_column(self) -> Option<&'static str> {
        match self {
            Source::Kaq3 => Some("signup_month"),
            Source::Aq2 => Some("month_start"),
            Source::Aq1 => None,
            _ => Some(super::calendar::CALENDAR_KEY),
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.csv", self.name())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|source| source.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown source: {}", s))
    }
}

/// Immutable, process-wide collection of loaded tables and their sub-views.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    kaq1: PartitionedTable,
    kaq2: PartitionedTable,
    kaq3: ResultTable,
    kaq4: PartitionedTable,
    kaq5: PartitionedTable,
    aq1: ResultTable,
    aq2: ResultTable,
}

impl DatasetStore {
    /// Load every source from `<dir>/<name>.csv`.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        log::info!("Loading result tables from {}", dir.display());
        Self::build(|source| {
            let path = dir.join(source.file_name());
            let file = File::open(&path).map_err(|e| {
                DataError::unavailable(source.name(), format!("{}: {}", path.display(), e))
            })?;
            ResultTable::read_csv(source.name(), file)
        })
    }

    /// Assemble the store from raw tables supplied by `read`.
    pub fn build(
        mut read: impl FnMut(Source) -> Result<ResultTable, DataError>,
    ) -> Result<Self, DataError> {
        let mut raw = |source: Source| -> Result<ResultTable, DataError> {
            let table = read(source)?;
            validate_columns(source, &table)?;
            log::info!("Loaded {} ({} rows)", source, table.len());
            Ok(table)
        };

        Ok(DatasetStore {
            kaq1: partition(Source::Kaq1, raw(Source::Kaq1)?),
            kaq2: partition(Source::Kaq2, raw(Source::Kaq2)?),
            kaq3: with_dates(raw(Source::Kaq3)?, "signup_month"),
            kaq4: partition(Source::Kaq4, raw(Source::Kaq4)?),
            kaq5: partition(Source::Kaq5, raw(Source::Kaq5)?),
            aq1: raw(Source::Aq1)?,
            aq2: with_dates(raw(Source::Aq2)?, "month_start"),
        })
    }

    pub fn kaq1(&self) -> &PartitionedTable {
        &self.kaq1
    }

    pub fn kaq2(&self) -> &PartitionedTable {
        &self.kaq2
    }

    pub fn kaq3(&self) -> &ResultTable {
        &self.kaq3
    }

    pub fn kaq4(&self) -> &PartitionedTable {
        &self.kaq4
    }

    pub fn kaq5(&self) -> &PartitionedTable {
        &self.kaq5
    }

    pub fn aq1(&self) -> &ResultTable {
        &self.aq1
    }

    pub fn aq2(&self) -> &ResultTable {
        &self.aq2
    }

    pub fn partitioned(&self, source: Source) -> Option<&PartitionedTable> {
        match source {
            Source::Kaq1 => Some(&self.kaq1),
            Source::Kaq2 => Some(&self.kaq2),
            Source::Kaq4 => Some(&self.kaq4),
            Source::Kaq5 => Some(&self.kaq5),
            Source::Kaq3 | Source::Aq1 | Source::Aq2 => None,
        }
    }

    /// The full table of a source, with derived columns.
    pub fn table(&self, source: Source) -> &ResultTable {
        match source {
            Source::Kaq1 => self.kaq1.table(),
            Source::Kaq2 => self.kaq2.table(),
            Source::Kaq3 => &self.kaq3,
            Source::Kaq4 => self.kaq4.table(),
            Source::Kaq5 => self.kaq5.table(),
            Source::Aq1 => &self.aq1,
            Source::Aq2 => &self.aq2,
        }
    }

    /// Earliest and latest time key of a source.
    pub fn date_bounds(&self, source: Source) -> Option<(NaiveDate, NaiveDate)> {
        match self.partitioned(source) {
            Some(p) => p.date_bounds(),
            None => date_bounds(self.table(source), source.date_column()?),
        }
    }

    /// Row counts per source and sub-view.
    pub fn summary(&self) -> Vec<SourceSummary> {
        Source::ALL
            .into_iter()
            .map(|source| SourceSummary {
                source,
                rows: self.table(source).len(),
                columns: self.table(source).columns().len(),
                views: self.partitioned(source).map(|p| {
                    SubView::ALL
                        .into_iter()
                        .map(|v| (v, p.view(v).len()))
                        .collect()
                }),
                date_bounds: self.date_bounds(source),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub source: Source,
    pub rows: usize,
    pub columns: usize,
    pub views: Option<Vec<(SubView, usize)>>,
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

fn validate_columns(source: Source, table: &ResultTable) -> Result<(), DataError> {
    let missing: Vec<&str> = source
        .columns()
        .iter()
        .map(|c| c.name)
        .filter(|name| !table.has_column(name))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::unavailable(
            source.name(),
            format!("missing columns: {}", missing.join(", ")),
        ))
    }
}

fn partition(source: Source, raw: ResultTable) -> PartitionedTable {
    let keyed = derive_calendar_key(&raw, "year", "month");
    let category = source.category_column().unwrap_or_default();
    let partitioned = PartitionedTable::new(keyed, "year", "month", category);

    for view in SubView::ALL {
        log::debug!("{}: {} {} rows", source, partitioned.view(view).len(), view.name());
    }
    let unkeyed = partitioned.view(SubView::Unkeyed).len();
    if unkeyed > 0 {
        log::debug!(
            "{}: {} rows with malformed year/month excluded from time views",
            source,
            unkeyed
        );
    }
    partitioned
}

fn with_dates(raw: ResultTable, column: &str) -> ResultTable {
    let out = raw.map_column(column, coerce_date);
    let undated = out
        .column(column)
        .map_or(0, |cells| cells.into_iter().filter(|v| v.is_missing()).count());
    if undated > 0 {
        log::debug!("{}: {} rows with unparseable {}", out.name(), undated, column);
    }
    out
}

/// Small in-memory sources shared by view tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const KAQ1: &str = "\
year,month,subscription_tier,dau,events,events_per_active_user
2024.0,1.0,free,10,100,10.0
2024.0,1.0,pro,20,400,20.0
2024.0,2.0,free,30,300,10.0
2024.0,2.0,pro,40,1200,30.0
2024.0,1.0,,30,500,16.0
2024.0,2.0,,70,1500,21.0
,,free,40,400,10.0
,,pro,60,1600,26.0
,,,100,2000,20.0
";

    pub const KAQ2: &str = "\
year,month,content_type,dau,events,events_per_active_user
2023,1,page,5,50,10
2023,1,database,7,70,10
2024,1,page,5,60,12
2024,1,database,9,90,10
2024,2,page,5,40,8
2024,2,database,11,110,10
2024,1,,14,150,10.7
2024,2,,16,150,9.4
2023,,page,5,50,10
2023,,database,7,70,10
2024,,page,10,100,10
2024,,database,20,200,10
,,page,15,150,10
,,database,27,270,10
,,,42,420,10
";

    pub const KAQ3: &str = "\
signup_month,new_users,activated_users,activation_rate
2024-03-01,0,0,0.0
2024-01-01,5,2,0.4
2024-02-01,10,5,0.5
2024-04-01,5,4,0.8
";

    pub const KAQ4: &str = "\
year,month,platform,dau,avg_session_duration_sec
2024,1,desktop,10,300
2024,1,mobile,20,120
2024,2,desktop,15,320
2024,2,mobile,25,110
2024,1,,30,180
2024,2,,40,170
";

    pub const KAQ5: &str = "\
year,month,work_mode,proportion,events
2024,1,solo,0.6,60
2024,1,collaborative,0.4,40
2024,2,solo,0.5,50
2024,2,collaborative,0.5,50
2024,1,,1.0,100
2024,2,,1.0,100
";

    pub const AQ1: &str = "\
content_type,events,content_type_rank
page,300,3
database,900,1
board,500,2
";

    pub const AQ2: &str = "\
month_start,dau_current_month,dau_previous_month,abs_change,rel_change
2024-01-01,100,,,
2024-02-01,120,100,20,0.2
2024-03-01,90,120,-30,-0.25
";

    pub fn csv(source: Source) -> &'static str {
        match source {
            Source::Kaq1 => KAQ1,
            Source::Kaq2 => KAQ2,
            Source::Kaq3 => KAQ3,
            Source::Kaq4 => KAQ4,
            Source::Kaq5 => KAQ5,
            Source::Aq1 => AQ1,
            Source::Aq2 => AQ2,
        }
    }

    pub fn store() -> DatasetStore {
        DatasetStore::build(|source| ResultTable::read_csv(source.name(), csv(source).as_bytes()))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::CALENDAR_KEY;
    use crate::core::table::Value;

    #[test]
    fn build_derives_keys_and_partitions() {
        let store = fixtures::store();
        let kaq1 = store.kaq1();
        assert!(kaq1.table().has_column(CALENDAR_KEY));
        assert_eq!(kaq1.view(SubView::Monthly).len(), 4);
        assert_eq!(kaq1.view(SubView::MonthlyOverall).len(), 2);
        assert_eq!(kaq1.view(SubView::Total).len(), 2);
        assert_eq!(kaq1.view(SubView::GrandTotal).len(), 1);
        assert_eq!(store.kaq2().view(SubView::Yearly).len(), 4);
    }

    #[test]
    fn flat_sources_get_date_columns() {
        let store = fixtures::store();
        let first = store.kaq3().column("signup_month").unwrap()[0].clone();
        assert_eq!(first, Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert_eq!(
            store.date_bounds(Source::Aq2),
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
            ))
        );
    }

    #[test]
    fn missing_column_is_data_unavailable() {
        let err = DatasetStore::build(|source| {
            let csv = match source {
                Source::Kaq1 => "year,month,subscription_tier,dau\n",
                other => fixtures::csv(other),
            };
            ResultTable::read_csv(source.name(), csv.as_bytes())
        })
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("kaq1"), "{}", msg);
        assert!(msg.contains("events_per_active_user"), "{}", msg);
    }

    #[test]
    fn missing_directory_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = DatasetStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { ref name, .. } if name == "kaq1"));
    }

    #[test]
    fn source_names_round_trip_through_from_str() {
        for source in Source::ALL {
            assert_eq!(source.name().parse::<Source>().unwrap(), source);
        }
        assert!("kaq9".parse::<Source>().is_err());
    }

    #[test]
    fn summary_covers_every_source() {
        let summary = fixtures::store().summary();
        assert_eq!(summary.len(), 7);
        let kaq1 = &summary[0];
        let counted: usize = kaq1.views.as_ref().unwrap().iter().map(|(_, n)| n).sum();
        assert_eq!(counted, kaq1.rows);
        assert!(summary[5].views.is_none());
    }
}
