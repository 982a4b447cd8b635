//! Temporal values and literal parsing.
//!
//! FEEL temporal constructors carry their payload as text and parse it at
//! evaluation time: `date("2017-03-10")`, `time("00:00:00+08:00")`,
//! `date and time("2017-03-10T00:00:00Z")`. A time zone is either a named
//! zone (`@Area/City`, or `Z` for UTC) or a fixed offset (`±HH:MM`).

use crate::error::EvalError;
use chrono::{Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike};
use std::cmp::Ordering;
use std::fmt;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A resolved time zone: named (tz database) or a fixed offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    Named(chrono_tz::Tz),
    Offset(FixedOffset),
}

impl Zone {
    /// Offset from UTC in seconds for a local wall-clock instant. Named
    /// zones resolve through the tz database; an ambiguous local time takes
    /// the earlier of the two candidate offsets.
    pub(crate) fn offset_seconds(&self, at: NaiveDateTime) -> Option<i32> {
        match self {
            Zone::Offset(offset) => Some(offset.local_minus_utc()),
            Zone::Named(tz) => tz
                .offset_from_local_datetime(&at)
                .earliest()
                .map(|o| o.fix().local_minus_utc()),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Named(chrono_tz::Tz::UTC) => write!(f, "Z"),
            Zone::Named(tz) => write!(f, "@{}", tz.name()),
            Zone::Offset(offset) => {
                let total = offset.local_minus_utc();
                let sign = if total < 0 { '-' } else { '+' };
                let total = total.abs();
                write!(f, "{}{:02}:{:02}", sign, total / 3600, (total % 3600) / 60)
            }
        }
    }
}

/// A wall-clock time with an optional zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeValue {
    pub time: NaiveTime,
    pub zone: Option<Zone>,
}

impl TimeValue {
    /// Order two times. Zoned times are shifted to UTC first (named zones
    /// resolve their offset on the epoch date, since a bare time carries no
    /// date). A zoned and an unzoned time are not comparable.
    pub fn compare(&self, other: &TimeValue) -> Option<Ordering> {
        match (self.zone, other.zone) {
            (None, None) => Some(self.time.cmp(&other.time)),
            (Some(_), Some(_)) => {
                let a = self.utc_seconds()?;
                let b = other.utc_seconds()?;
                Some(a.cmp(&b))
            }
            _ => None,
        }
    }

    fn utc_seconds(&self) -> Option<i64> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?.and_time(self.time);
        let offset = self.zone.as_ref()?.offset_seconds(epoch)?;
        Some(i64::from(self.time.num_seconds_from_midnight()) - i64::from(offset))
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format("%H:%M:%S"))?;
        if let Some(zone) = &self.zone {
            write!(f, "{}", zone)?;
        }
        Ok(())
    }
}

/// A calendar date and wall-clock time with an optional zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateTimeValue {
    pub datetime: NaiveDateTime,
    pub zone: Option<Zone>,
}

impl DateTimeValue {
    /// UTC epoch seconds, when a zone is present and resolvable.
    pub fn instant(&self) -> Option<i64> {
        let offset = self.zone.as_ref()?.offset_seconds(self.datetime)?;
        Some(self.datetime.and_utc().timestamp() - i64::from(offset))
    }

    /// Order two date-times: both zoned → through UTC, both naive → as
    /// wall-clock values, mixed → not comparable.
    pub fn compare(&self, other: &DateTimeValue) -> Option<Ordering> {
        match (self.zone, other.zone) {
            (None, None) => Some(self.datetime.cmp(&other.datetime)),
            (Some(_), Some(_)) => Some(self.instant()?.cmp(&other.instant()?)),
            _ => None,
        }
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datetime.format("%Y-%m-%dT%H:%M:%S"))?;
        if let Some(zone) = &self.zone {
            write!(f, "{}", zone)?;
        }
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` date payload.
pub fn parse_date(literal: &str) -> Result<NaiveDate, EvalError> {
    NaiveDate::parse_from_str(literal.trim(), "%Y-%m-%d")
        .map_err(|_| EvalError::evaluation(format!("invalid date literal: {:?}", literal)))
}

/// Parse a time-of-day payload without its zone suffix.
pub fn parse_time(literal: &str) -> Result<NaiveTime, EvalError> {
    let s = literal.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| EvalError::evaluation(format!("invalid time literal: {:?}", literal)))
}

/// Resolve a named zone (`Area/City`, or `UTC`).
pub fn parse_zone_name(name: &str) -> Result<Zone, EvalError> {
    name.trim()
        .parse::<chrono_tz::Tz>()
        .map(Zone::Named)
        .map_err(|_| EvalError::evaluation(format!("unknown time zone: {:?}", name)))
}

/// Resolve a fixed offset of the form `±HH:MM`.
pub fn parse_zone_offset(literal: &str) -> Result<Zone, EvalError> {
    let s = literal.trim();
    let err = || EvalError::evaluation(format!("invalid time zone offset: {:?}", literal));
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => (1, s),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(err)?;
    let hours: i32 = hours.parse().map_err(|_| err())?;
    let minutes: i32 = minutes.parse().map_err(|_| err())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .map(Zone::Offset)
        .ok_or_else(err)
}

/// English weekday name for a date.
pub fn day_of_week(date: NaiveDate) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_monday() as usize]
}

/// English month name for a date.
pub fn month_of_year(date: NaiveDate) -> &'static str {
    MONTHS[date.month0() as usize]
}

/// Current wall-clock date and time. Naive local time: the zone is read from
/// the system clock and then dropped, so two `now()` results only compare
/// against each other.
pub fn now() -> DateTimeValue {
    DateTimeValue {
        datetime: Local::now().naive_local(),
        zone: None,
    }
}

/// Current calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let d = parse_date("2017-03-10").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2017, 3, 10));
        assert!(parse_date("2017-13-01").is_err());
        assert!(parse_date("not a date").is_err());
    }

    #[test]
    fn test_parse_time() {
        let t = parse_time("08:30:05").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (8, 30, 5));
        assert!(parse_time("25:00:00").is_err());
    }

    #[test]
    fn test_parse_zone_offset_signs() {
        let east = parse_zone_offset("+08:00").unwrap();
        assert_eq!(east, Zone::Offset(FixedOffset::east_opt(8 * 3600).unwrap()));
        let west = parse_zone_offset("-08:10").unwrap();
        assert_eq!(
            west,
            Zone::Offset(FixedOffset::west_opt(8 * 3600 + 10 * 60).unwrap())
        );
    }

    #[test]
    fn test_parse_zone_name() {
        assert_eq!(
            parse_zone_name("America/Los_Angeles").unwrap(),
            Zone::Named(chrono_tz::Tz::America__Los_Angeles)
        );
        assert_eq!(parse_zone_name("UTC").unwrap(), Zone::Named(chrono_tz::Tz::UTC));
        assert!(parse_zone_name("Nowhere/Special").is_err());
    }

    #[test]
    fn test_zoned_datetime_ordering() {
        // Midnight at +08:00 is 16:00 the previous day in UTC.
        let east = DateTimeValue {
            datetime: parse_date("2022-01-01").unwrap().and_time(parse_time("00:00:00").unwrap()),
            zone: Some(parse_zone_offset("+08:00").unwrap()),
        };
        let utc = DateTimeValue {
            datetime: parse_date("2022-01-01").unwrap().and_time(parse_time("00:00:00").unwrap()),
            zone: Some(Zone::Named(chrono_tz::Tz::UTC)),
        };
        assert_eq!(east.compare(&utc), Some(Ordering::Less));
    }

    #[test]
    fn test_zoned_and_naive_are_not_comparable() {
        let naive = DateTimeValue {
            datetime: parse_date("2022-01-01").unwrap().and_time(parse_time("00:00:00").unwrap()),
            zone: None,
        };
        let zoned = DateTimeValue {
            zone: Some(Zone::Named(chrono_tz::Tz::UTC)),
            ..naive
        };
        assert_eq!(naive.compare(&zoned), None);
    }

    #[test]
    fn test_day_and_month_names() {
        assert_eq!(day_of_week(parse_date("2023-08-21").unwrap()), "Monday");
        assert_eq!(month_of_year(parse_date("2019-09-17").unwrap()), "September");
    }

    #[test]
    fn test_zone_display() {
        assert_eq!(parse_zone_offset("+08:00").unwrap().to_string(), "+08:00");
        assert_eq!(parse_zone_offset("-08:10").unwrap().to_string(), "-08:10");
        assert_eq!(parse_zone_name("UTC").unwrap().to_string(), "Z");
    }
}
