//! ISO-8601 durations (`P[nY][nM][nW][nD][T[nH][nM][nS]]`).
//!
//! Years and months have no fixed length, so a duration is only turned into
//! seconds by shifting a concrete instant along the calendar and measuring
//! the distance travelled.

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};

use crate::error::PolicyError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IsoDuration {
    pub years: u32,
    pub months: u32,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    /// May carry a fraction, e.g. `PT1.5S`.
    pub seconds: f64,
}

impl IsoDuration {
    /// Apply the duration to `from`. `None` if the result is not representable.
    ///
    /// Years and months move the month field and keep the day of month;
    /// a day past the end of the target month overflows into the next one,
    /// so Jan 31 plus one month lands on Mar 2 (Mar 3 outside leap years).
    pub fn shift(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let days = i64::from(self.weeks) * 7 + i64::from(self.days);

        let whole_secs = self.seconds.trunc();
        let nanos = ((self.seconds - whole_secs) * 1e9).round() as i64;

        let clock = TimeDelta::try_hours(i64::from(self.hours))?
            .checked_add(&TimeDelta::try_minutes(i64::from(self.minutes))?)?
            .checked_add(&TimeDelta::try_seconds(whole_secs as i64)?)?
            .checked_add(&TimeDelta::nanoseconds(nanos))?;

        let date = from.date_naive();
        let month0 = i64::from(date.month0()) + i64::from(months);
        let year = i32::try_from(i64::from(date.year()) + month0 / 12).ok()?;
        let first = NaiveDate::from_ymd_opt(year, (month0 % 12) as u32 + 1, 1)?;

        first
            .checked_add_signed(TimeDelta::try_days(i64::from(date.day0()) + days)?)?
            .and_time(from.time())
            .and_utc()
            .checked_add_signed(clock)
    }

    /// Length in seconds when applied at `now`.
    pub fn seconds_from(&self, now: DateTime<Utc>) -> Option<f64> {
        let elapsed = self.shift(now)? - now;
        Some(elapsed.num_seconds() as f64 + f64::from(elapsed.subsec_nanos()) / 1e9)
    }
}

impl FromStr for IsoDuration {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| PolicyError::Pause {
            value: s.to_string(),
            reason,
        };

        let body = s.strip_prefix('P').ok_or_else(|| invalid("must start with 'P'"))?;
        let (date, time) = match body.split_once('T') {
            Some((_, "")) => return Err(invalid("empty time part")),
            Some((date, time)) => (date, Some(time)),
            None => (body, None),
        };

        let mut d = IsoDuration::default();
        let mut any = false;

        for (value, designator) in components(date).map_err(invalid)? {
            let slot = match designator {
                'Y' => &mut d.years,
                'M' => &mut d.months,
                'W' => &mut d.weeks,
                'D' => &mut d.days,
                _ => return Err(invalid("unknown date designator")),
            };
            *slot = whole(value).ok_or_else(|| invalid("date components must be integers"))?;
            any = true;
        }
        check_order(date, "YMWD").map_err(invalid)?;

        if let Some(time) = time {
            for (value, designator) in components(time).map_err(invalid)? {
                match designator {
                    'H' => d.hours = whole(value).ok_or_else(|| invalid("hours must be an integer"))?,
                    'M' => {
                        d.minutes = whole(value).ok_or_else(|| invalid("minutes must be an integer"))?
                    }
                    'S' => {
                        d.seconds = value
                            .replace(',', ".")
                            .parse::<f64>()
                            .ok()
                            .filter(|v| v.is_finite() && *v >= 0.0)
                            .ok_or_else(|| invalid("malformed seconds"))?
                    }
                    _ => return Err(invalid("unknown time designator")),
                }
                any = true;
            }
            check_order(time, "HMS").map_err(invalid)?;
        }

        if !any {
            return Err(invalid("no duration components"));
        }
        Ok(d)
    }
}

/// Split `"1Y2M"` into `[("1", 'Y'), ("2", 'M')]`.
fn components(part: &str) -> Result<Vec<(&str, char)>, &'static str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in part.char_indices() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            continue;
        }
        if i == start {
            return Err("designator without a value");
        }
        out.push((&part[start..i], c));
        start = i + c.len_utf8();
    }
    if start != part.len() {
        return Err("value without a designator");
    }
    Ok(out)
}

/// Designators must appear at most once and in `expected` order.
fn check_order(part: &str, expected: &str) -> Result<(), &'static str> {
    let mut last = None;
    for c in part.chars().filter(|c| c.is_ascii_alphabetic()) {
        let pos = expected.find(c).ok_or("unknown designator")?;
        if last.is_some_and(|l| pos <= l) {
            return Err("designators out of order or repeated");
        }
        last = Some(pos);
    }
    Ok(())
}

fn whole(value: &str) -> Option<u32> {
    if value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse().ok()
    } else {
        None
    }
}
