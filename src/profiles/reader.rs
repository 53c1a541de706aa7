//! CSV reader for profile exports (e.g. prepared from ENTSO-E Transparency data).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use super::{PROFILE_COLUMNS, ProfileSet};
use crate::error::ProfileError;

/// Header names recognised as the time column (case-insensitive).
const TIME_COLUMNS: &[&str] = &["time", "timestamp", "datetime", "utc", "snapshot"];

/// Naive timestamp layouts, all interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M",
];

/// Reads and validates a profile CSV file.
///
/// # Errors
///
/// Returns a `ProfileError` if the file cannot be opened, a column is
/// missing, a cell cannot be parsed, or the resulting set is invalid.
pub fn read_csv(path: &Path) -> Result<ProfileSet, ProfileError> {
    let file = File::open(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_reader(file)
}

/// Reads and validates profile CSV data from any reader.
///
/// # Errors
///
/// See [`read_csv`].
pub fn from_reader(reader: impl Read) -> Result<ProfileSet, ProfileError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let time_idx = headers
        .iter()
        .position(|h| TIME_COLUMNS.iter().any(|t| h.eq_ignore_ascii_case(t)))
        .unwrap_or(0);

    let mut column_idx = [0usize; 6];
    for (slot, name) in column_idx.iter_mut().zip(PROFILE_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ProfileError::MissingColumn(name.to_string()))?;
    }

    let mut set = ProfileSet::default();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let raw_time = record.get(time_idx).unwrap_or_default();
        set.timestamps.push(parse_timestamp(raw_time).ok_or_else(|| {
            ProfileError::Timestamp {
                row,
                value: raw_time.to_string(),
            }
        })?);

        let mut values = [0.0f64; 6];
        for ((value, &idx), name) in values.iter_mut().zip(&column_idx).zip(PROFILE_COLUMNS) {
            let raw = record.get(idx).unwrap_or_default();
            *value = raw.parse().map_err(|_| ProfileError::Value {
                row,
                column: name.to_string(),
                value: raw.to_string(),
            })?;
        }

        let [pv, wind_on, wind_off, biomass, hydro, load] = values;
        set.pv.push(pv);
        set.wind_on.push(wind_on);
        set.wind_off.push(wind_off);
        set.biomass.push(biomass);
        set.hydro.push(hydro);
        set.load.push(load);
    }

    set.validate()?;
    Ok(set)
}

/// Parses one timestamp cell.
///
/// Accepts RFC 3339, the naive layouts in [`NAIVE_FORMATS`], and the
/// ENTSO-E interval form `DD.MM.YYYY HH:MM - DD.MM.YYYY HH:MM`, of which the
/// interval start is used.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let start = raw
        .split_once(" - ")
        .map_or(raw, |(start, _)| start.trim());
    // ENTSO-E appends the zone label, e.g. "01.01.2023 00:00 (UTC)".
    let start = start
        .split_once(" (")
        .map_or(start, |(s, _)| s.trim());

    if let Ok(dt) = DateTime::parse_from_rfc3339(start) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(start, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "time,pv_profile,wind_on_profile,wind_off_profile,biomass_profile,hydro_profile,load_profile";

    #[test]
    fn reads_well_formed_csv() {
        let data = format!(
            "{HEADER}\n\
             2023-01-01 00:00:00,0.0,0.4,0.5,0.8,0.4,0.5\n\
             2023-01-01 01:00:00,0.1,0.3,0.6,0.8,0.4,0.5\n"
        );
        let set = from_reader(data.as_bytes());
        assert!(set.is_ok(), "{:?}", set.err());
        let set = set.unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.wind_off, vec![0.5, 0.6]);
        assert_eq!(set.weights(), vec![1.0, 1.0]);
    }

    #[test]
    fn columns_may_appear_in_any_order() {
        let data = "load_profile,hydro_profile,Timestamp,pv_profile,wind_on_profile,wind_off_profile,biomass_profile\n\
                    1.0,0.2,2023-06-01T12:00:00Z,0.9,0.1,0.2,0.7\n";
        let set = from_reader(data.as_bytes()).unwrap();
        assert_eq!(set.pv, vec![0.9]);
        assert_eq!(set.load, vec![1.0]);
        assert_eq!(set.timestamps[0].to_rfc3339(), "2023-06-01T12:00:00+00:00");
    }

    #[test]
    fn missing_column_reported() {
        let data = "time,pv_profile\n2023-01-01 00:00,0.1\n";
        assert!(matches!(
            from_reader(data.as_bytes()),
            Err(ProfileError::MissingColumn(c)) if c == "wind_on_profile"
        ));
    }

    #[test]
    fn bad_value_reports_row() {
        let data = format!(
            "{HEADER}\n\
             2023-01-01 00:00,0.0,0.4,0.5,0.8,0.4,0.5\n\
             2023-01-01 01:00,n/e,0.3,0.6,0.8,0.4,0.5\n"
        );
        match from_reader(data.as_bytes()) {
            Err(ProfileError::Value { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "pv_profile");
            }
            other => panic!("expected Value error, got {other:?}"),
        }
    }

    #[test]
    fn bad_timestamp_reports_row() {
        let data = format!("{HEADER}\nyesterday,0.0,0.4,0.5,0.8,0.4,0.5\n");
        assert!(matches!(
            from_reader(data.as_bytes()),
            Err(ProfileError::Timestamp { row: 1, .. })
        ));
    }

    #[test]
    fn parses_entsoe_interval() {
        let ts = parse_timestamp("01.01.2023 00:15 - 01.01.2023 00:30 (UTC)");
        assert_eq!(
            ts.map(|t| t.to_rfc3339()),
            Some("2023-01-01T00:15:00+00:00".to_string())
        );
    }

    #[test]
    fn offset_timestamps_convert_to_utc() {
        let ts = parse_timestamp("2023-01-01T01:00:00+01:00");
        assert_eq!(
            ts.map(|t| t.to_rfc3339()),
            Some("2023-01-01T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn out_of_range_availability_fails_validation() {
        let data = format!("{HEADER}\n2023-01-01 00:00,1.5,0.4,0.5,0.8,0.4,0.5\n");
        assert!(matches!(
            from_reader(data.as_bytes()),
            Err(ProfileError::OutOfRange { .. })
        ));
    }
}
