//! Validating builder for [`CalendarOffset`].

use std::ops::RangeInclusive;

use crate::error::{OffsetError, OffsetResult};
use crate::recur::core::WeekdayNum;

use super::CalendarOffset;

/// Builder for constructing `CalendarOffset` values.
///
/// Absolute setters replace a field of the input ("set to"); relative setters
/// accumulate a signed amount ("add"). Domains are checked by [`Self::build`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetBuilder {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    microsecond: Option<u32>,
    years: i64,
    months: i64,
    weeks: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    microseconds: i64,
    weekday: Option<WeekdayNum>,
}

fn check(
    field: &'static str,
    value: Option<u32>,
    range: RangeInclusive<u32>,
    domain: &'static str,
) -> OffsetResult<()> {
    match value {
        Some(v) if !range.contains(&v) => Err(OffsetError::InvalidField {
            field,
            value: i64::from(v),
            domain,
        }),
        _ => Ok(()),
    }
}

impl OffsetBuilder {
    /// Creates an empty builder (the identity offset).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            year: None,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
            microsecond: None,
            years: 0,
            months: 0,
            weeks: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            microseconds: 0,
            weekday: None,
        }
    }

    #[must_use]
    pub const fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    #[must_use]
    pub const fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    /// Sets the day of month. Days past the end of the resulting month clamp to its last day.
    #[must_use]
    pub const fn day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    #[must_use]
    pub const fn hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    #[must_use]
    pub const fn minute(mut self, minute: u32) -> Self {
        self.minute = Some(minute);
        self
    }

    #[must_use]
    pub const fn second(mut self, second: u32) -> Self {
        self.second = Some(second);
        self
    }

    #[must_use]
    pub const fn microsecond(mut self, microsecond: u32) -> Self {
        self.microsecond = Some(microsecond);
        self
    }

    #[must_use]
    pub const fn years(mut self, years: i64) -> Self {
        self.years = years;
        self
    }

    #[must_use]
    pub const fn months(mut self, months: i64) -> Self {
        self.months = months;
        self
    }

    /// Counted as `7 * weeks` extra days.
    #[must_use]
    pub const fn weeks(mut self, weeks: i64) -> Self {
        self.weeks = weeks;
        self
    }

    #[must_use]
    pub const fn days(mut self, days: i64) -> Self {
        self.days = days;
        self
    }

    #[must_use]
    pub const fn hours(mut self, hours: i64) -> Self {
        self.hours = hours;
        self
    }

    #[must_use]
    pub const fn minutes(mut self, minutes: i64) -> Self {
        self.minutes = minutes;
        self
    }

    #[must_use]
    pub const fn seconds(mut self, seconds: i64) -> Self {
        self.seconds = seconds;
        self
    }

    #[must_use]
    pub const fn microseconds(mut self, microseconds: i64) -> Self {
        self.microseconds = microseconds;
        self
    }

    /// Jumps to a weekday after the other fields are applied. No ordinal means `+1`.
    #[must_use]
    pub fn weekday(mut self, weekday: impl Into<WeekdayNum>) -> Self {
        self.weekday = Some(weekday.into());
        self
    }

    /// ## Summary
    /// Validates the fields and builds the offset.
    ///
    /// ## Errors
    /// Returns `OffsetError::InvalidField` if an absolute field is outside its
    /// natural domain or the weekday ordinal is zero.
    pub fn build(self) -> OffsetResult<CalendarOffset> {
        if let Some(year) = self.year
            && !(1..=9999).contains(&year)
        {
            return Err(OffsetError::InvalidField {
                field: "year",
                value: i64::from(year),
                domain: "1..=9999",
            });
        }
        check("month", self.month, 1..=12, "1..=12")?;
        check("day", self.day, 1..=31, "1..=31")?;
        check("hour", self.hour, 0..=23, "0..=23")?;
        check("minute", self.minute, 0..=59, "0..=59")?;
        check("second", self.second, 0..=59, "0..=59")?;
        check("microsecond", self.microsecond, 0..=999_999, "0..=999999")?;

        if let Some(WeekdayNum {
            ordinal: Some(0), ..
        }) = self.weekday
        {
            return Err(OffsetError::InvalidField {
                field: "weekday ordinal",
                value: 0,
                domain: "non-zero integers",
            });
        }

        Ok(CalendarOffset {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
            microsecond: self.microsecond,
            years: self.years,
            months: self.months,
            days: self.days.saturating_add(self.weeks.saturating_mul(7)),
            hours: self.hours,
            minutes: self.minutes,
            seconds: self.seconds,
            microseconds: self.microseconds,
            weekday: self.weekday,
        }
        .normalized())
    }
}
