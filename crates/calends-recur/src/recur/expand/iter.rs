//! Lazy period-by-period expansion of a [`RecurrenceRule`].

use std::collections::VecDeque;
use std::iter::FusedIterator;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::recur::core::{Frequency, calendar};

use super::RecurrenceRule;
use super::rule::Filters;

const SECONDS_PER_DAY: u64 = 86_400;
const MINUTES_PER_DAY: u64 = 1_440;

/// Iterator over the wall times of a rule, ascending and without duplicates.
///
/// Each call to [`RecurrenceRule::iter`] starts a fresh traversal. Work is
/// done one period at a time, so consuming a prefix costs only that prefix.
#[derive(Debug, Clone)]
pub struct RuleIter<'a> {
    rule: &'a RecurrenceRule,
    /// Any day inside the current period. Weekly and finer periods start on it.
    anchor: NaiveDate,
    hour: u32,
    minute: u32,
    second: u32,
    remaining: Option<u32>,
    emitted: u64,
    buffer: VecDeque<NaiveDateTime>,
    finished: bool,
}

impl<'a> RuleIter<'a> {
    pub(super) fn new(rule: &'a RecurrenceRule) -> Self {
        let start = rule.start();
        Self {
            rule,
            anchor: start.date(),
            hour: start.hour(),
            minute: start.minute(),
            second: start.second(),
            remaining: rule.count(),
            emitted: 0,
            buffer: VecDeque::new(),
            finished: false,
        }
    }

    fn filters(&self) -> &'a Filters {
        self.rule.filters()
    }

    fn expand_period(&mut self) {
        if self.anchor.year() > self.rule.max_year() {
            self.finish_at_horizon();
            return;
        }

        let days = self.period_days();
        let nth = self.nth_weekday_dates();
        let kept: Vec<NaiveDate> = days
            .iter()
            .copied()
            .filter(|day| self.day_matches(*day, &nth))
            .collect();
        let filtered = kept.len() < days.len();

        let times = self.period_times();
        let mut candidates: Vec<NaiveDateTime> = kept
            .iter()
            .flat_map(|day| times.iter().map(move |time| day.and_time(*time)))
            .collect();
        if !self.filters().set_positions.is_empty() {
            candidates = select_positions(&candidates, &self.filters().set_positions);
        }

        tracing::trace!(
            period = %self.anchor,
            days = kept.len(),
            candidates = candidates.len(),
            "Expanded recurrence period"
        );

        for candidate in candidates {
            if candidate < self.rule.start() {
                continue;
            }
            if self.rule.until().is_some_and(|until| candidate >= until) {
                self.finished = true;
                return;
            }
            if let Some(remaining) = self.remaining.as_mut() {
                if *remaining == 0 {
                    self.finished = true;
                    return;
                }
                *remaining -= 1;
            }
            self.buffer.push_back(candidate);
            self.emitted += 1;
        }

        if self.remaining == Some(0) {
            self.finished = true;
        } else if !self.advance(filtered) {
            self.finish_at_horizon();
        }
    }

    fn finish_at_horizon(&mut self) {
        self.finished = true;
        if self.emitted == 0 {
            tracing::warn!(
                frequency = %self.rule.frequency(),
                start = %self.rule.start(),
                max_year = self.rule.max_year(),
                "Recurrence rule reached the year horizon without producing an occurrence"
            );
        } else {
            tracing::debug!(
                emitted = self.emitted,
                max_year = self.rule.max_year(),
                "Recurrence rule reached the year horizon"
            );
        }
    }

    /// Every day of the current period, before filtering.
    fn period_days(&self) -> Vec<NaiveDate> {
        let anchor = self.anchor;
        let (first, len) = match self.rule.frequency() {
            Frequency::Yearly => (
                NaiveDate::from_ymd_opt(anchor.year(), 1, 1),
                calendar::days_in_year(anchor.year()),
            ),
            Frequency::Monthly => (
                anchor.with_day(1),
                calendar::days_in_month(anchor.year(), anchor.month()),
            ),
            Frequency::Weekly => {
                let week_start = self.rule.week_start();
                let mut days = vec![anchor];
                for day in anchor.iter_days().skip(1).take(6) {
                    if calendar::weekday_of(day) == week_start {
                        break;
                    }
                    days.push(day);
                }
                return days;
            }
            _ => return vec![anchor],
        };
        first.map_or_else(Vec::new, |first| {
            first
                .iter_days()
                .take(usize::try_from(len).unwrap_or_default())
                .collect()
        })
    }

    /// Dates selected by ordinal weekdays inside the current month or year.
    fn nth_weekday_dates(&self) -> Vec<NaiveDate> {
        let filters = self.filters();
        if filters.nth_weekdays.is_empty() {
            return Vec::new();
        }
        let year = self.anchor.year();
        let month_range = |month: u32| {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let last = NaiveDate::from_ymd_opt(year, month, calendar::days_in_month(year, month))?;
            Some((first, last))
        };

        let ranges: Vec<(NaiveDate, NaiveDate)> = match self.rule.frequency() {
            Frequency::Yearly if filters.months.is_empty() => NaiveDate::from_ymd_opt(year, 1, 1)
                .zip(NaiveDate::from_ymd_opt(year, 12, 31))
                .into_iter()
                .collect(),
            Frequency::Yearly => filters.months.iter().filter_map(|m| month_range(*m)).collect(),
            Frequency::Monthly => month_range(self.anchor.month()).into_iter().collect(),
            _ => Vec::new(),
        };

        ranges
            .iter()
            .flat_map(|(first, last)| {
                filters.nth_weekdays.iter().filter_map(|(weekday, n)| {
                    calendar::nth_weekday_between(*first, *last, *weekday, *n)
                })
            })
            .collect()
    }

    fn day_matches(&self, day: NaiveDate, nth: &[NaiveDate]) -> bool {
        let filters = self.filters();
        if !filters.months.is_empty() && !filters.months.contains(&day.month()) {
            return false;
        }
        if !filters.weekdays.is_empty() && !filters.weekdays.contains(&calendar::weekday_of(day)) {
            return false;
        }
        if !filters.nth_weekdays.is_empty() && !nth.contains(&day) {
            return false;
        }
        if !filters.month_days.is_empty() {
            let day_of_month = i64::from(day.day());
            let from_end = day_of_month - i64::from(calendar::days_in_month(day.year(), day.month())) - 1;
            if !filters
                .month_days
                .iter()
                .any(|d| i64::from(*d) == day_of_month || i64::from(*d) == from_end)
            {
                return false;
            }
        }
        if !filters.year_days.is_empty() {
            let day_of_year = i64::from(day.ordinal());
            let from_end = day_of_year - i64::from(calendar::days_in_year(day.year())) - 1;
            if !filters
                .year_days
                .iter()
                .any(|d| i64::from(*d) == day_of_year || i64::from(*d) == from_end)
            {
                return false;
            }
        }
        true
    }

    /// Times of day produced on each kept day of the current period.
    fn period_times(&self) -> Vec<NaiveTime> {
        let filters = self.filters();
        let at = |h: u32, m: u32, s: u32| NaiveTime::from_hms_opt(h, m, s);
        let blocked = |list: &[u32], value: u32| !list.is_empty() && !list.contains(&value);

        match self.rule.frequency() {
            Frequency::Hourly => {
                if blocked(&filters.hours, self.hour) {
                    return Vec::new();
                }
                filters
                    .minutes
                    .iter()
                    .flat_map(|m| filters.seconds.iter().filter_map(move |s| at(self.hour, *m, *s)))
                    .collect()
            }
            Frequency::Minutely => {
                if blocked(&filters.hours, self.hour) || blocked(&filters.minutes, self.minute) {
                    return Vec::new();
                }
                filters
                    .seconds
                    .iter()
                    .filter_map(|s| at(self.hour, self.minute, *s))
                    .collect()
            }
            Frequency::Secondly => {
                if blocked(&filters.hours, self.hour)
                    || blocked(&filters.minutes, self.minute)
                    || blocked(&filters.seconds, self.second)
                {
                    return Vec::new();
                }
                at(self.hour, self.minute, self.second).into_iter().collect()
            }
            _ => filters.times.clone(),
        }
    }

    /// ## Summary
    /// Moves to the next period that can produce occurrences.
    ///
    /// Returns false once the year horizon is passed, the calendar overflows,
    /// or no later sub-daily slot can satisfy the constraints.
    fn advance(&mut self, filtered: bool) -> bool {
        let interval = self.rule.interval();
        let anchor = self.anchor;
        let next = match self.rule.frequency() {
            Frequency::Yearly => i32::try_from(interval)
                .ok()
                .and_then(|step| anchor.year().checked_add(step))
                .filter(|year| *year <= self.rule.max_year())
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
            Frequency::Monthly => {
                calendar::add_months(anchor.year(), anchor.month(), i64::from(interval))
                    .filter(|(year, _)| *year <= self.rule.max_year())
                    .and_then(|(year, month)| NaiveDate::from_ymd_opt(year, month, 1))
            }
            Frequency::Weekly => {
                let back = (anchor.weekday().num_days_from_monday() + 7
                    - self.rule.week_start().num_days_from_monday())
                    % 7;
                anchor
                    .checked_sub_days(Days::new(u64::from(back)))
                    .and_then(|week| week.checked_add_days(Days::new(7 * u64::from(interval))))
            }
            Frequency::Daily => anchor.checked_add_days(Days::new(u64::from(interval))),
            Frequency::Hourly => self
                .step_hours(filtered)
                .and_then(|days| anchor.checked_add_days(Days::new(days))),
            Frequency::Minutely => self
                .step_minutes(filtered)
                .and_then(|days| anchor.checked_add_days(Days::new(days))),
            Frequency::Secondly => self
                .step_seconds(filtered)
                .and_then(|days| anchor.checked_add_days(Days::new(days))),
        };

        match next {
            Some(date) if date.year() <= self.rule.max_year() => {
                self.anchor = date;
                true
            }
            _ => false,
        }
    }

    /// Advances the hour slot and returns the number of days crossed.
    fn step_hours(&mut self, filtered: bool) -> Option<u64> {
        let interval = u64::from(self.rule.interval());
        let mut hour = u64::from(self.hour);
        if filtered {
            // jump to the last slot of the rejected day
            hour += ((23 - hour) / interval) * interval;
        }
        let (days, hour) = step_to_allowed(hour, interval, &self.filters().hours, 24)?;
        self.hour = u32::try_from(hour).ok()?;
        Some(days)
    }

    fn step_minutes(&mut self, filtered: bool) -> Option<u64> {
        let filters = self.filters();
        let interval = u64::from(self.rule.interval());
        let mut hour = u64::from(self.hour);
        let mut minute = u64::from(self.minute);
        if filtered {
            minute += ((MINUTES_PER_DAY - 1 - (hour * 60 + minute)) / interval) * interval;
        }

        let mut days = 0;
        for _ in 0..MINUTES_PER_DAY / gcd(interval, MINUTES_PER_DAY) {
            let (carry, next_minute) = step_to_allowed(minute, interval, &filters.minutes, 60)?;
            minute = next_minute;
            days += (hour + carry) / 24;
            hour = (hour + carry) % 24;
            if allows(&filters.hours, hour) {
                self.hour = u32::try_from(hour).ok()?;
                self.minute = u32::try_from(minute).ok()?;
                return Some(days);
            }
        }
        None
    }

    fn step_seconds(&mut self, filtered: bool) -> Option<u64> {
        let filters = self.filters();
        let interval = u64::from(self.rule.interval());
        let mut hour = u64::from(self.hour);
        let mut minute = u64::from(self.minute);
        let mut second = u64::from(self.second);
        if filtered {
            second += ((SECONDS_PER_DAY - 1 - (hour * 3600 + minute * 60 + second)) / interval)
                * interval;
        }

        let mut days = 0;
        for _ in 0..SECONDS_PER_DAY / gcd(interval, SECONDS_PER_DAY) {
            let (carry, next_second) = step_to_allowed(second, interval, &filters.seconds, 60)?;
            second = next_second;
            let carried = minute + carry;
            minute = carried % 60;
            let carried = hour + carried / 60;
            hour = carried % 24;
            days += carried / 24;
            if allows(&filters.hours, hour) && allows(&filters.minutes, minute) {
                self.hour = u32::try_from(hour).ok()?;
                self.minute = u32::try_from(minute).ok()?;
                self.second = u32::try_from(second).ok()?;
                return Some(days);
            }
        }
        None
    }
}

fn allows(list: &[u32], value: u64) -> bool {
    list.is_empty() || list.iter().any(|v| u64::from(*v) == value)
}

/// ## Summary
/// Adds `interval` to `value` until it lands on an allowed value modulo `base`.
///
/// Returns the carry into the next unit and the new value, or `None` if no
/// allowed value is reachable. An empty list allows everything.
fn step_to_allowed(value: u64, interval: u64, allowed: &[u32], base: u64) -> Option<(u64, u64)> {
    if allowed.is_empty() {
        let next = value + interval;
        return Some((next / base, next % base));
    }
    let mut carry = 0;
    let mut value = value;
    for _ in 0..base {
        let next = value + interval;
        carry += next / base;
        value = next % base;
        if allows(allowed, value) {
            return Some((carry, value));
        }
    }
    None
}

const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let rest = a % b;
        a = b;
        b = rest;
    }
    a
}

/// ## Summary
/// Keeps the candidates at the given 1-based positions, negative positions
/// counting from the end. Out-of-range positions select nothing.
fn select_positions(candidates: &[NaiveDateTime], positions: &[i32]) -> Vec<NaiveDateTime> {
    let len = i64::try_from(candidates.len()).unwrap_or(i64::MAX);
    let mut picked: Vec<NaiveDateTime> = positions
        .iter()
        .filter_map(|pos| {
            let index = if *pos > 0 {
                i64::from(*pos) - 1
            } else {
                len + i64::from(*pos)
            };
            usize::try_from(index)
                .ok()
                .and_then(|index| candidates.get(index).copied())
        })
        .collect();
    picked.sort_unstable();
    picked.dedup();
    picked
}

impl Iterator for RuleIter<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(next) = self.buffer.pop_front() {
                return Some(next);
            }
            if self.finished {
                return None;
            }
            self.expand_period();
        }
    }
}

impl FusedIterator for RuleIter<'_> {}
