//! Proleptic Gregorian calendar helpers shared by offsets and rule expansion.

use chrono::{Datelike, NaiveDate, TimeDelta};

use super::Weekday;

/// Returns true for Gregorian leap years.
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`. Returns 0 for an invalid month.
#[must_use]
pub const fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Number of days in `year`.
#[must_use]
pub const fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// ## Summary
/// Adds a signed number of months to a year/month pair, carrying into the year.
///
/// Returns `None` if the resulting year does not fit in an `i32`.
#[must_use]
pub fn add_months(year: i32, month: u32, delta: i64) -> Option<(i32, u32)> {
    let index = i64::from(year) * 12 + i64::from(month) - 1 + delta;
    let new_year = i32::try_from(index.div_euclid(12)).ok()?;
    let new_month = u32::try_from(index.rem_euclid(12) + 1).ok()?;
    Some((new_year, new_month))
}

/// ## Summary
/// Builds a date, clamping `day` to the last valid day of the month.
///
/// Returns `None` if the year is outside chrono's range or the month is invalid.
#[must_use]
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month);
    if last == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
}

/// Weekday of a chrono date.
#[must_use]
pub fn weekday_of(date: NaiveDate) -> Weekday {
    Weekday::from(date.weekday())
}

/// ## Summary
/// Jumps to the `ordinal`-th `weekday` counted from `date`.
///
/// Positive ordinals scan forward, negative ordinals scan backward. The start
/// date counts as the first match in both directions, so `+1` and `-1` leave a
/// date that already falls on `weekday` unchanged.
///
/// Returns `None` if the result leaves chrono's date range.
#[must_use]
pub fn weekday_jump(date: NaiveDate, weekday: Weekday, ordinal: i32) -> Option<NaiveDate> {
    let current = i64::from(date.weekday().num_days_from_monday());
    let target = i64::from(weekday.num_days_from_monday());
    let extra_weeks = (i64::from(ordinal).abs() - 1).max(0) * 7;

    let jump = if ordinal >= 0 {
        extra_weeks + (target - current).rem_euclid(7)
    } else {
        -(extra_weeks + (current - target).rem_euclid(7))
    };

    date.checked_add_signed(TimeDelta::try_days(jump)?)
}

/// ## Summary
/// Finds the `ordinal`-th `weekday` inside `first..=last`.
///
/// Positive ordinals count from `first`, negative ordinals count back from
/// `last`. Returns `None` when the range holds fewer matches than requested.
#[must_use]
pub fn nth_weekday_between(
    first: NaiveDate,
    last: NaiveDate,
    weekday: Weekday,
    ordinal: i32,
) -> Option<NaiveDate> {
    let found = if ordinal > 0 {
        weekday_jump(first, weekday, ordinal)?
    } else {
        weekday_jump(last, weekday, ordinal)?
    };
    (first..=last).contains(&found).then_some(found)
}
