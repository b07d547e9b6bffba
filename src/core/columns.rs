//! Declared column layouts of the result sources.

use chrono::NaiveDate;
use kaqdash_derive::SourceColumns;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
    Date,
}

/// One declared column of a source file.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Cells may be empty; for year/month/category this marks aggregate rows.
    pub nullable: bool,
    pub description: &'static str,
}

/// Column layout of a source, generated by `#[derive(SourceColumns)]`.
pub trait SourceColumns {
    fn columns() -> &'static [ColumnSpec];
}

// The structs below are never instantiated; they exist to declare layouts.

#[allow(dead_code)]
#[derive(SourceColumns)]
pub struct Kaq1Columns {
    /// Calendar year; empty on all-time total rows
    year: Option<i64>,
    /// Calendar month (1-12); empty on yearly and total rows
    month: Option<i64>,
    /// Subscription tier; empty on rows aggregated over all tiers
    subscription_tier: Option<String>,
    /// Daily active users
    dau: f64,
    /// Number of events
    events: f64,
    /// Events divided by active users
    events_per_active_user: f64,
}

#[allow(dead_code)]
#[derive(SourceColumns)]
pub struct Kaq2Columns {
    /// Calendar year; empty on all-time total rows
    year: Option<i64>,
    /// Calendar month (1-12); empty on yearly and total rows
    month: Option<i64>,
    /// Content type; empty on rows aggregated over all types
    content_type: Option<String>,
    /// Daily active users
    dau: f64,
    /// Number of events
    events: f64,
    /// Events divided by active users
    events_per_active_user: f64,
}

#[allow(dead_code)]
#[derive(SourceColumns)]
pub struct Kaq3Columns {
    /// First day of the signup cohort month
    signup_month: NaiveDate,
    /// Users who signed up in the month
    new_users: f64,
    /// Users active within their first 7 days
    activated_users: f64,
    /// activated_users / new_users, as a fraction
    activation_rate: f64,
}

#[allow(dead_code)]
#[derive(SourceColumns)]
pub struct Kaq4Columns {
    /// Calendar year; empty on all-time total rows
    year: Option<i64>,
    /// Calendar month (1-12); empty on yearly and total rows
    month: Option<i64>,
    /// Device platform; empty on rows aggregated over all platforms
    platform: Option<String>,
    /// Daily active users
    dau: f64,
    /// Mean session length in seconds
    avg_session_duration_sec: f64,
}

#[allow(dead_code)]
#[derive(SourceColumns)]
pub struct Kaq5Columns {
    /// Calendar year
    year: Option<i64>,
    /// Calendar month (1-12)
    month: Option<i64>,
    /// Work mode (e.g. solo, collaborative); empty on overall rows
    work_mode: Option<String>,
    /// Share of the month's activity, as a fraction
    proportion: f64,
    /// Number of events
    events: f64,
}

#[allow(dead_code)]
#[derive(SourceColumns)]
pub struct Aq1Columns {
    /// Content type
    content_type: String,
    /// Total events over the whole period
    events: f64,
    /// Rank by events, 1 = most
    content_type_rank: i64,
}

#[allow(dead_code)]
#[derive(SourceColumns)]
pub struct Aq2Columns {
    /// First day of the month
    month_start: NaiveDate,
    /// DAU in the month
    dau_current_month: f64,
    /// DAU in the previous month; empty for the first month
    dau_previous_month: Option<f64>,
    /// dau_current_month - dau_previous_month
    abs_change: Option<f64>,
    /// abs_change / dau_previous_month, as a fraction
    rel_change: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_reads_names_kinds_and_docs() {
        let cols = Kaq3Columns::columns();
        assert_eq!(cols.len(), 4);
        assert_eq!(cols[0].name, "signup_month");
        assert_eq!(cols[0].kind, ColumnKind::Date);
        assert!(!cols[0].nullable);
        assert_eq!(cols[0].description, "First day of the signup cohort month");
    }

    #[test]
    fn optional_fields_are_nullable() {
        let tier = Kaq1Columns::columns()
            .iter()
            .find(|c| c.name == "subscription_tier")
            .unwrap();
        assert!(tier.nullable);
        assert_eq!(tier.kind, ColumnKind::Text);
    }
}
