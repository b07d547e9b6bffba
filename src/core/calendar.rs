//! Calendar key derivation and date coercion.

use super::table::{ResultTable, Value};
use chrono::{NaiveDate, NaiveDateTime};

/// Name of the derived first-of-month column.
pub const CALENDAR_KEY: &str = "year_month";

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short label for a 1-based month number.
pub fn month_label(month: u32) -> Option<&'static str> {
    MONTH_LABELS.get(month.checked_sub(1)? as usize).copied()
}

/// First day of the month for a (year, month) pair. Missing unless both
/// components are integral numbers forming a valid calendar month.
pub fn calendar_key(year: &Value, month: &Value) -> Value {
    let (Some(y), Some(m)) = (year.as_integer(), month.as_integer()) else {
        return Value::Missing;
    };
    let (Ok(y), Ok(m)) = (i32::try_from(y), u32::try_from(m)) else {
        return Value::Missing;
    };
    NaiveDate::from_ymd_opt(y, m, 1).map_or(Value::Missing, Value::Date)
}

/// Numbers stay numbers; anything else becomes missing.
pub fn coerce_numeric(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        _ => Value::Missing,
    }
}

/// Dates stay dates, parseable text becomes a date, anything else is missing.
pub fn coerce_date(value: &Value) -> Value {
    match value {
        Value::Date(_) => value.clone(),
        Value::Text(s) => parse_date(s).map_or(Value::Missing, Value::Date),
        _ => Value::Missing,
    }
}

/// Parse a date or datetime string, keeping the date part.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
        return Some(d);
    }
    // Year-month only
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok()
}

/// Copy of `table` with year and month coerced to numbers and a
/// `year_month` column appended.
pub fn derive_calendar_key(table: &ResultTable, year_col: &str, month_col: &str) -> ResultTable {
    let coerced = table
        .map_column(year_col, coerce_numeric)
        .map_column(month_col, coerce_numeric);

    let keys = match (
        coerced.column_index(year_col),
        coerced.column_index(month_col),
    ) {
        (Some(y), Some(m)) => coerced
            .rows()
            .map(|row| calendar_key(&row[y], &row[m]))
            .collect(),
        _ => vec![Value::Missing; coerced.len()],
    };

    match coerced.with_column(CALENDAR_KEY, keys) {
        Ok(derived) => derived,
        // Key count always matches the row count.
        Err(_) => coerced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn key_defined_only_for_numeric_pairs() {
        let table = ResultTable::read_csv(
            "t",
            "year,month\n2024,1\n2024.0,2.0\n,3\n2024,\nabc,4\n2024,x\n2024,13\n2024,1.5\n"
                .as_bytes(),
        )
        .unwrap();
        let keyed = derive_calendar_key(&table, "year", "month");
        let keys: Vec<Option<NaiveDate>> = keyed
            .column(CALENDAR_KEY)
            .unwrap()
            .into_iter()
            .map(Value::as_date)
            .collect();
        assert_eq!(
            keys,
            vec![
                Some(date(2024, 1, 1)),
                Some(date(2024, 2, 1)),
                None,
                None,
                None,
                None,
                None,
                None
            ]
        );
    }

    #[test]
    fn key_present_iff_components_numeric() {
        let table = ResultTable::read_csv(
            "t",
            "year,month\n2023,12\n,\nfoo,bar\n2023,nan\n".as_bytes(),
        )
        .unwrap();
        let keyed = derive_calendar_key(&table, "year", "month");
        let year = keyed.column("year").unwrap();
        let month = keyed.column("month").unwrap();
        let key = keyed.column(CALENDAR_KEY).unwrap();
        for i in 0..keyed.len() {
            let numeric = year[i].as_f64().is_some() && month[i].as_f64().is_some();
            assert_eq!(key[i].as_date().is_some(), numeric, "row {}", i);
        }
    }

    #[test]
    fn non_numeric_components_are_coerced_to_missing() {
        let table = ResultTable::read_csv("t", "year,month\nfoo,1\n".as_bytes()).unwrap();
        let keyed = derive_calendar_key(&table, "year", "month");
        assert_eq!(keyed.column("year").unwrap()[0], &Value::Missing);
    }

    #[test]
    fn missing_columns_yield_missing_keys() {
        let table = ResultTable::read_csv("t", "a\n1\n".as_bytes()).unwrap();
        let keyed = derive_calendar_key(&table, "year", "month");
        assert_eq!(keyed.column(CALENDAR_KEY).unwrap(), vec![&Value::Missing]);
    }

    #[test]
    fn parse_date_accepts_common_shapes() {
        assert_eq!(parse_date("2024-02-01"), Some(date(2024, 2, 1)));
        assert_eq!(parse_date("2024-02-01T00:00:00"), Some(date(2024, 2, 1)));
        assert_eq!(parse_date("2024-02-01 12:30:00"), Some(date(2024, 2, 1)));
        assert_eq!(parse_date("2024-02"), Some(date(2024, 2, 1)));
        assert_eq!(parse_date("February"), None);
    }

    #[test]
    fn month_labels() {
        assert_eq!(month_label(1), Some("Jan"));
        assert_eq!(month_label(12), Some("Dec"));
        assert_eq!(month_label(0), None);
        assert_eq!(month_label(13), None);
    }
}
