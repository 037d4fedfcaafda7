//! Schedule expressions and the tick windows they are matched against.

use super::ScheduleDomainError;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use cron::Schedule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When a scheduled task should fire.
///
/// Three notations are accepted:
///
/// - `HH:MM`: once a day at the given UTC time of day.
/// - five-field crontab (`MIN HOUR DOM MON DOW`): a zero seconds field is
///   prepended. Numeric days of the week use crontab numbering, where `0`
///   and `7` are Sunday and `1` is Monday.
/// - six- or seven-field cron with a leading seconds field, passed to the
///   `cron` parser unchanged. Numeric days there follow the `cron` crate,
///   where `1` is Sunday.
///
/// Day names such as `Mon-Fri` mean the same thing in every notation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleExpression {
    raw: String,
    schedule: Schedule,
}

impl ScheduleExpression {
    /// Parses a schedule expression.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::InvalidScheduleExpression`] when the
    /// value is neither a valid time of day nor a valid cron expression.
    pub fn parse(value: impl Into<String>) -> Result<Self, ScheduleDomainError> {
        let raw = value.into().trim().to_owned();
        let invalid = |reason: String| ScheduleDomainError::InvalidScheduleExpression {
            expression: raw.clone(),
            reason,
        };

        let cron_source = match time_of_day(&raw) {
            Some(Ok((hour, minute))) => format!("0 {minute} {hour} * * *"),
            Some(Err(reason)) => return Err(invalid(reason)),
            None => match raw.split_whitespace().count() {
                5 => from_crontab(&raw).map_err(invalid)?,
                6 | 7 => raw.clone(),
                0 => return Err(invalid("expression is empty".to_owned())),
                count => return Err(invalid(format!("expected 5 to 7 fields, found {count}"))),
            },
        };

        let schedule = Schedule::from_str(&cron_source).map_err(|err| invalid(err.to_string()))?;
        Ok(Self { raw, schedule })
    }

    /// Returns the expression as originally written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the first occurrence inside `window`, if any.
    #[must_use]
    pub fn occurrence_within(&self, window: &TickWindow) -> Option<DateTime<Utc>> {
        // `after` is exclusive and cron resolution is one second.
        let just_before = window.start() - TimeDelta::seconds(1);
        self.schedule
            .after(&just_before)
            .next()
            .filter(|occurrence| *occurrence < window.end())
    }

    /// Returns `true` when the schedule fires inside `window`.
    #[must_use]
    pub fn matches(&self, window: &TickWindow) -> bool {
        self.occurrence_within(window).is_some()
    }

    /// Returns the first occurrence strictly after `instant`.
    #[must_use]
    pub fn next_after<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&instant.with_timezone(&Utc))
            .next()
    }
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Rewrites a five-field crontab line into the six-field form the `cron`
/// crate parses.
fn from_crontab(raw: &str) -> Result<String, String> {
    let mut fields: Vec<&str> = raw.split_whitespace().collect();
    let day_of_week = fields
        .pop()
        .ok_or_else(|| "expression is empty".to_owned())?;
    Ok(format!(
        "0 {} {}",
        fields.join(" "),
        crontab_day_of_week(day_of_week)?
    ))
}

/// Replaces crontab day numbers (`0`-`7`, Sunday at both ends) with names.
///
/// Items without digits (`*`, `?`, names and name ranges) pass through.
fn crontab_day_of_week(field: &str) -> Result<String, String> {
    let items = field
        .split(',')
        .map(|item| {
            if item.chars().any(|c| c.is_ascii_digit()) {
                expand_day_numbers(item)
            } else {
                Ok(item.to_owned())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items.join(","))
}

fn expand_day_numbers(item: &str) -> Result<String, String> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, parse_step(step)?),
        None => (item, 1),
    };
    let (first, last) = match range.split_once('-') {
        _ if range == "*" => (0, 6),
        Some((first, last)) => (day_number(first)?, day_number(last)?),
        None if step > 1 => (day_number(range)?, 7),
        None => {
            let day = day_number(range)?;
            (day, day)
        }
    };
    if first > last {
        return Err(format!("day-of-week range {range} runs backwards"));
    }
    let mut names: Vec<&str> = Vec::new();
    for number in (first..=last).step_by(step) {
        let weekday = if number == 7 { 0 } else { number };
        let name = WEEKDAYS
            .get(weekday)
            .copied()
            .ok_or_else(|| format!("day of week {number} is out of range"))?;
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names.join(","))
}

fn day_number(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .ok()
        .filter(|number| *number <= 7)
        .ok_or_else(|| format!("day of week must be 0-7 or a name, found {value}"))
}

fn parse_step(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .ok()
        .filter(|step| *step > 0)
        .ok_or_else(|| format!("step must be a positive number, found {value}"))
}

/// Parses `HH:MM`.
///
/// Returns `None` when the input does not look like a time of day at all, so
/// the caller can try cron notation instead.
fn time_of_day(value: &str) -> Option<Result<(u32, u32), String>> {
    let (hour, minute) = value.split_once(':')?;
    let is_numeric = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    if !is_numeric(hour) || !is_numeric(minute) {
        return None;
    }
    let parsed = hour.parse::<u32>().ok().zip(minute.parse::<u32>().ok());
    Some(match parsed {
        Some((h, m)) if h < 24 && m < 60 => Ok((h, m)),
        _ => Err("time of day must be between 00:00 and 23:59".to_owned()),
    })
}

impl PartialEq for ScheduleExpression {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for ScheduleExpression {}

impl TryFrom<String> for ScheduleExpression {
    type Error = ScheduleDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ScheduleExpression> for String {
    fn from(value: ScheduleExpression) -> Self {
        value.raw
    }
}

impl fmt::Display for ScheduleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Half-open interval `[start, end)` covered by one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TickWindow {
    /// Returns the window of length `width` that contains `now`.
    ///
    /// Windows are aligned to multiples of `width` since the Unix epoch, so a
    /// sixty second width yields calendar minutes. Widths below one second are
    /// treated as one second.
    #[must_use]
    pub fn containing(now: DateTime<Utc>, width: TimeDelta) -> Self {
        let width_secs = width.num_seconds().max(1);
        let offset = now.timestamp().rem_euclid(width_secs);
        let start_secs = now.timestamp() - offset;
        let start = DateTime::<Utc>::from_timestamp(start_secs, 0).unwrap_or(now);
        Self {
            start,
            end: start + TimeDelta::seconds(width_secs),
        }
    }

    /// Returns the inclusive window start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the exclusive window end.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns `true` when `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}
