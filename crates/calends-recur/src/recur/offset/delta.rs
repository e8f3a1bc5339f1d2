//! Relative calendar offsets ("second Sunday in May", "last day of next month").

use std::ops::{Add, Mul, Neg};

use chrono::{Datelike, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::error::{OffsetError, OffsetResult};
use crate::recur::core::{WeekdayNum, calendar};

use super::OffsetBuilder;

const MICROS_PER_SECOND: i128 = 1_000_000;
const MICROS_PER_MINUTE: i128 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i128 = 60 * MICROS_PER_MINUTE;
const MICROS_PER_DAY: i128 = 24 * MICROS_PER_HOUR;

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// An adjustment applied to a date/time in three fixed stages.
///
/// 1. Absolute fields replace the input's year, month, day, hour, minute,
///    second and microsecond.
/// 2. Relative fields are added, years and months first, then the exact
///    days-to-microseconds part.
/// 3. An optional weekday selector jumps to the n-th matching weekday.
///
/// If the resulting month is shorter than the chosen day, the day clamps to
/// the month's last day. Relative fields are kept in a canonical form: months
/// carry into years and the exact part carries up to days, each group sharing
/// one sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarOffset {
    pub(super) year: Option<i32>,
    pub(super) month: Option<u32>,
    pub(super) day: Option<u32>,
    pub(super) hour: Option<u32>,
    pub(super) minute: Option<u32>,
    pub(super) second: Option<u32>,
    pub(super) microsecond: Option<u32>,
    pub(super) years: i64,
    pub(super) months: i64,
    pub(super) days: i64,
    pub(super) hours: i64,
    pub(super) minutes: i64,
    pub(super) seconds: i64,
    pub(super) microseconds: i64,
    pub(super) weekday: Option<WeekdayNum>,
}

impl CalendarOffset {
    /// Creates a new offset builder.
    #[must_use]
    pub const fn builder() -> OffsetBuilder {
        OffsetBuilder::new()
    }

    /// A purely relative offset of `months` months.
    #[must_use]
    pub fn months(months: i64) -> Self {
        Self {
            months,
            ..Self::default()
        }
        .normalized()
    }

    /// A purely relative offset of `days` days.
    #[must_use]
    pub fn days(days: i64) -> Self {
        Self {
            days,
            ..Self::default()
        }
        .normalized()
    }

    pub(super) fn normalized(mut self) -> Self {
        let total_months = i128::from(self.years) * 12 + i128::from(self.months);
        self.years = saturate(total_months / 12);
        self.months = saturate(total_months % 12);

        let total = self.exact_micros();
        self.days = saturate(total / MICROS_PER_DAY);
        let rest = total % MICROS_PER_DAY;
        self.hours = saturate(rest / MICROS_PER_HOUR);
        let rest = rest % MICROS_PER_HOUR;
        self.minutes = saturate(rest / MICROS_PER_MINUTE);
        let rest = rest % MICROS_PER_MINUTE;
        self.seconds = saturate(rest / MICROS_PER_SECOND);
        self.microseconds = saturate(rest % MICROS_PER_SECOND);

        if let Some(weekday) = self.weekday.as_mut()
            && weekday.ordinal.is_none()
        {
            weekday.ordinal = Some(1);
        }
        self
    }

    fn exact_micros(&self) -> i128 {
        i128::from(self.days) * MICROS_PER_DAY
            + i128::from(self.hours) * MICROS_PER_HOUR
            + i128::from(self.minutes) * MICROS_PER_MINUTE
            + i128::from(self.seconds) * MICROS_PER_SECOND
            + i128::from(self.microseconds)
    }

    /// Relative years and months as a single month count.
    #[must_use]
    pub const fn total_months(&self) -> i64 {
        self.years.saturating_mul(12).saturating_add(self.months)
    }

    /// ## Summary
    /// The days-to-microseconds part of the relative fields as an exact duration.
    ///
    /// ## Errors
    /// Returns `OffsetError::OutOfRange` if the duration does not fit a `TimeDelta`.
    pub fn exact_delta(&self) -> OffsetResult<TimeDelta> {
        let micros = i64::try_from(self.exact_micros()).map_err(|_e| OffsetError::OutOfRange)?;
        Ok(TimeDelta::microseconds(micros))
    }

    #[must_use]
    pub const fn years_part(&self) -> i64 {
        self.years
    }

    #[must_use]
    pub const fn months_part(&self) -> i64 {
        self.months
    }

    #[must_use]
    pub const fn days_part(&self) -> i64 {
        self.days
    }

    #[must_use]
    pub const fn weekday(&self) -> Option<WeekdayNum> {
        self.weekday
    }

    /// Returns true if applying this offset never changes a date/time.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// ## Summary
    /// Applies the offset to `dt`.
    ///
    /// ## Errors
    /// Returns `OffsetError::OutOfRange` if the result is not representable.
    /// A day past the end of the resulting month is clamped, never an error.
    pub fn apply(&self, dt: NaiveDateTime) -> OffsetResult<NaiveDateTime> {
        let year = self.year.unwrap_or(dt.year());
        let month = self.month.unwrap_or(dt.month());
        let (year, month) = calendar::add_months(year, month, self.total_months())
            .ok_or(OffsetError::OutOfRange)?;

        let day = self.day.unwrap_or(dt.day());
        let date = calendar::clamped_date(year, month, day).ok_or(OffsetError::OutOfRange)?;

        let nanos = self
            .microsecond
            .map_or(dt.nanosecond(), |micros| micros * 1_000);
        let time = NaiveTime::from_hms_nano_opt(
            self.hour.unwrap_or(dt.hour()),
            self.minute.unwrap_or(dt.minute()),
            self.second.unwrap_or(dt.second()),
            nanos,
        )
        .ok_or(OffsetError::OutOfRange)?;

        let shifted = date
            .and_time(time)
            .checked_add_signed(self.exact_delta()?)
            .ok_or(OffsetError::OutOfRange)?;

        let Some(WeekdayNum { weekday, ordinal }) = self.weekday else {
            return Ok(shifted);
        };
        let date = calendar::weekday_jump(shifted.date(), weekday, ordinal.unwrap_or(1))
            .ok_or(OffsetError::OutOfRange)?;
        Ok(date.and_time(shifted.time()))
    }

    /// ## Summary
    /// Subtracts the offset from `dt`: relative fields are negated and the
    /// weekday scan runs the other way; absolute fields still "set to".
    ///
    /// ## Errors
    /// Returns `OffsetError::OutOfRange` if the result is not representable.
    pub fn apply_backward(&self, dt: NaiveDateTime) -> OffsetResult<NaiveDateTime> {
        self.negate().apply(dt)
    }

    /// ## Summary
    /// Composes two offsets into one.
    ///
    /// Relative fields add up without intermediate clamping, so
    /// `a.combine(&b).apply(dt)` can differ from `b.apply(a.apply(dt)?)`.
    /// Absolute fields and the weekday selector of `other` win where present.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            year: other.year.or(self.year),
            month: other.month.or(self.month),
            day: other.day.or(self.day),
            hour: other.hour.or(self.hour),
            minute: other.minute.or(self.minute),
            second: other.second.or(self.second),
            microsecond: other.microsecond.or(self.microsecond),
            years: self.years.saturating_add(other.years),
            months: self.months.saturating_add(other.months),
            days: self.days.saturating_add(other.days),
            hours: self.hours.saturating_add(other.hours),
            minutes: self.minutes.saturating_add(other.minutes),
            seconds: self.seconds.saturating_add(other.seconds),
            microseconds: self.microseconds.saturating_add(other.microseconds),
            weekday: other.weekday.or(self.weekday),
        }
        .normalized()
    }

    /// ## Summary
    /// Multiplies the relative fields and the weekday ordinal by `factor`.
    ///
    /// Absolute fields and the targeted weekday are unchanged. A negative
    /// factor reverses the weekday scan; a zero factor drops the selector.
    #[must_use]
    pub fn scale(&self, factor: i32) -> Self {
        let n = i64::from(factor);
        let weekday = if factor == 0 {
            None
        } else {
            self.weekday.map(|wd| WeekdayNum {
                ordinal: Some(wd.ordinal.unwrap_or(1).saturating_mul(factor)),
                ..wd
            })
        };
        Self {
            years: self.years.saturating_mul(n),
            months: self.months.saturating_mul(n),
            days: self.days.saturating_mul(n),
            hours: self.hours.saturating_mul(n),
            minutes: self.minutes.saturating_mul(n),
            seconds: self.seconds.saturating_mul(n),
            microseconds: self.microseconds.saturating_mul(n),
            weekday,
            ..*self
        }
        .normalized()
    }

    /// Negates the relative fields and reverses the weekday scan.
    #[must_use]
    pub fn negate(&self) -> Self {
        self.scale(-1)
    }

    /// ## Summary
    /// The relative offset that takes `earlier` to `later`: whole months
    /// first, then the exact remainder.
    ///
    /// ## Errors
    /// Returns `OffsetError::OutOfRange` if an intermediate date is not representable.
    pub fn between(later: NaiveDateTime, earlier: NaiveDateTime) -> OffsetResult<Self> {
        let mut months = i64::from(later.year() - earlier.year()) * 12 + i64::from(later.month())
            - i64::from(earlier.month());
        let mut anchor = Self::months(months).apply(earlier)?;

        if later < earlier {
            while later > anchor {
                months += 1;
                anchor = Self::months(months).apply(earlier)?;
            }
        } else {
            while later < anchor {
                months -= 1;
                anchor = Self::months(months).apply(earlier)?;
            }
        }

        let remainder = (later - anchor)
            .num_microseconds()
            .ok_or(OffsetError::OutOfRange)?;
        Ok(Self {
            months,
            microseconds: remainder,
            ..Self::default()
        }
        .normalized())
    }
}

impl Add for CalendarOffset {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.combine(&rhs)
    }
}

impl Neg for CalendarOffset {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

impl Mul<i32> for CalendarOffset {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        self.scale(rhs)
    }
}
