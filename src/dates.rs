//! Small calendar and range helpers used around table loading.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("cannot convert '{0}' to a date")]
    Unparseable(String),

    #[error("range [{start}, {limit}) is empty")]
    EmptyRange { start: i64, limit: i64 },

    #[error("cannot split a range into {0} partitions")]
    PartitionCount(usize),
}

/// Anything [`as_date`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLike<'a> {
    Date(NaiveDate),
    Text(&'a str),
    /// Digits of the date, e.g. `20170315`.
    Integer(i64),
}

impl From<NaiveDate> for DateLike<'_> {
    fn from(d: NaiveDate) -> Self {
        DateLike::Date(d)
    }
}

impl<'a> From<&'a str> for DateLike<'a> {
    fn from(s: &'a str) -> Self {
        DateLike::Text(s)
    }
}

impl From<i64> for DateLike<'_> {
    fn from(x: i64) -> Self {
        DateLike::Integer(x)
    }
}

impl From<i32> for DateLike<'_> {
    fn from(x: i32) -> Self {
        DateLike::Integer(x.into())
    }
}

pub fn as_date<'a>(x: impl Into<DateLike<'a>>) -> Result<NaiveDate, DateError> {
    match x.into() {
        DateLike::Date(d) => Ok(d),
        DateLike::Text(s) => parse_date(s),
        DateLike::Integer(i) => parse_date(&i.to_string()),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    let s = s.trim();
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Ok(d);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(dt.date());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| DateError::Unparseable(s.to_string()))
}

/// `yyyymmdd` as an integer.
pub fn as_idate(d: NaiveDate) -> i32 {
    d.year() * 10_000 + d.month() as i32 * 100 + d.day() as i32
}

/// Shift a wall-clock time, wrapping around midnight.
pub fn time_roll(t: NaiveTime, delta: TimeDelta) -> NaiveTime {
    t.overflowing_add_signed(delta).0
}

/// Split `[start, limit)` into `n` contiguous half-open parts of near-equal
/// size. The last part always ends exactly at `limit`.
pub fn partition_range(range: (i64, i64), n: usize) -> Result<Vec<(i64, i64)>, DateError> {
    let (start, limit) = range;
    if n == 0 {
        return Err(DateError::PartitionCount(n));
    }
    if start >= limit {
        return Err(DateError::EmptyRange { start, limit });
    }

    // span can exceed i64::MAX
    let step = (limit as i128 - start as i128) as f64 / n as f64;
    let origin = start as f64;

    let mut partitions = Vec::with_capacity(n);
    let mut lower = start;
    for i in 0..n {
        let upper = (origin + step * (i + 1) as f64).round() as i64;
        partitions.push((lower, upper));
        lower = upper;
    }
    if let Some(last) = partitions.last_mut() {
        last.1 = limit;
    }
    Ok(partitions)
}

/// Base-26 rendering with digits `A..Z`: 0 → "A", 25 → "Z", 26 → "BA".
pub fn int_to_alphabet(mut x: u64) -> String {
    if x == 0 {
        return "A".to_string();
    }
    let mut digits = Vec::new();
    while x > 0 {
        digits.push(char::from(b'A' + (x % 26) as u8));
        x /= 26;
    }
    digits.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn as_date_accepts_dates_text_and_digits() {
        let expected = ymd(2017, 3, 15);
        assert_eq!(as_date(expected), Ok(expected));
        assert_eq!(as_date("2017-03-15"), Ok(expected));
        assert_eq!(as_date("2017/03/15"), Ok(expected));
        assert_eq!(as_date("03/15/2017"), Ok(expected));
        assert_eq!(as_date("2017-03-15T09:30:00"), Ok(expected));
        assert_eq!(as_date("2017-03-15T23:30:00-05:00"), Ok(expected));
        assert_eq!(as_date(20170315), Ok(expected));
        assert_eq!(as_date(20170315i64), Ok(expected));
    }

    #[test]
    fn as_date_rejects_garbage() {
        assert_eq!(
            as_date("not a date"),
            Err(DateError::Unparseable("not a date".to_string()))
        );
        assert!(as_date(42).is_err());
    }

    #[test]
    fn idate_packs_fields() {
        assert_eq!(as_idate(ymd(2017, 3, 5)), 20170305);
        assert_eq!(as_idate(ymd(1999, 12, 31)), 19991231);
    }

    #[test]
    fn time_roll_wraps_midnight() {
        let t = NaiveTime::from_hms_opt(23, 30, 0).unwrap();
        assert_eq!(
            time_roll(t, TimeDelta::minutes(45)),
            NaiveTime::from_hms_opt(0, 15, 0).unwrap()
        );
        assert_eq!(
            time_roll(t, TimeDelta::hours(-24)),
            t
        );
    }

    #[test]
    fn partitions_cover_the_range() {
        assert_eq!(
            partition_range((0, 10), 3).unwrap(),
            vec![(0, 3), (3, 7), (7, 10)]
        );
        assert_eq!(partition_range((5, 6), 1).unwrap(), vec![(5, 6)]);

        let parts = partition_range((100, 1_000_003), 7).unwrap();
        assert_eq!(parts.len(), 7);
        assert_eq!(parts[0].0, 100);
        assert_eq!(parts[6].1, 1_000_003);
        assert!(parts.windows(2).all(|w| w[0].1 == w[1].0));
    }

    #[test]
    fn partition_full_i64_range() {
        let q = 1i64 << 62;
        assert_eq!(
            partition_range((i64::MIN, i64::MAX), 4).unwrap(),
            vec![(i64::MIN, -q), (-q, 0), (0, q), (q, i64::MAX)]
        );
    }

    #[test]
    fn partition_rejects_bad_input() {
        assert_eq!(
            partition_range((3, 3), 2),
            Err(DateError::EmptyRange { start: 3, limit: 3 })
        );
        assert_eq!(partition_range((0, 10), 0), Err(DateError::PartitionCount(0)));
    }

    #[test]
    fn alphabet_digits() {
        assert_eq!(int_to_alphabet(0), "A");
        assert_eq!(int_to_alphabet(25), "Z");
        assert_eq!(int_to_alphabet(26), "BA");
        assert_eq!(int_to_alphabet(27), "BB");
        assert_eq!(int_to_alphabet(26 * 26), "BAA");
    }
}
