//! Recurrence rule definition and validation.

use calends_core::config::DEFAULT_MAX_YEAR;
use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{RuleError, RuleResult};
use crate::recur::core::{Frequency, Occurrence, Weekday, WeekdayNum, Zone, calendar};

use super::RuleIter;

/// Builder for constructing `RecurrenceRule` values.
///
/// Constraint lists replace any previously set list. Nothing is validated
/// until [`Self::build`].
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    frequency: Frequency,
    start: NaiveDateTime,
    interval: u32,
    week_start: Weekday,
    until: Option<NaiveDateTime>,
    count: Option<u32>,
    months: Vec<u32>,
    month_days: Vec<i32>,
    year_days: Vec<i32>,
    weekdays: Vec<WeekdayNum>,
    hours: Vec<u32>,
    minutes: Vec<u32>,
    seconds: Vec<u32>,
    set_positions: Vec<i32>,
    zone: Zone,
    max_year: i32,
}

impl RuleBuilder {
    /// Creates a builder for an unbounded rule with interval 1 and Monday week start.
    #[must_use]
    pub fn new(frequency: Frequency, start: NaiveDateTime) -> Self {
        Self {
            frequency,
            start,
            interval: 1,
            week_start: Weekday::Monday,
            until: None,
            count: None,
            months: Vec::new(),
            month_days: Vec::new(),
            year_days: Vec::new(),
            weekdays: Vec::new(),
            hours: Vec::new(),
            minutes: Vec::new(),
            seconds: Vec::new(),
            set_positions: Vec::new(),
            zone: Zone::Floating,
            max_year: DEFAULT_MAX_YEAR,
        }
    }

    #[must_use]
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    #[must_use]
    pub fn start(mut self, start: NaiveDateTime) -> Self {
        self.start = start;
        self
    }

    /// Every `interval`-th period produces occurrences.
    #[must_use]
    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// First day of the week used to align weekly periods.
    #[must_use]
    pub fn week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    /// Exclusive upper bound: occurrences at or after `until` are not produced.
    #[must_use]
    pub fn until(mut self, until: NaiveDateTime) -> Self {
        self.until = Some(until);
        self
    }

    #[must_use]
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Clears both the end bound and the count.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.until = None;
        self.count = None;
        self
    }

    #[must_use]
    pub fn months(mut self, months: impl IntoIterator<Item = u32>) -> Self {
        self.months = months.into_iter().collect();
        self
    }

    /// Days of the month; negative values count from the month's end (`-1` is the last day).
    #[must_use]
    pub fn month_days(mut self, days: impl IntoIterator<Item = i32>) -> Self {
        self.month_days = days.into_iter().collect();
        self
    }

    /// Days of the year; negative values count from the year's end.
    #[must_use]
    pub fn year_days(mut self, days: impl IntoIterator<Item = i32>) -> Self {
        self.year_days = days.into_iter().collect();
        self
    }

    #[must_use]
    pub fn weekdays<W: Into<WeekdayNum>>(mut self, weekdays: impl IntoIterator<Item = W>) -> Self {
        self.weekdays = weekdays.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn hours(mut self, hours: impl IntoIterator<Item = u32>) -> Self {
        self.hours = hours.into_iter().collect();
        self
    }

    #[must_use]
    pub fn minutes(mut self, minutes: impl IntoIterator<Item = u32>) -> Self {
        self.minutes = minutes.into_iter().collect();
        self
    }

    #[must_use]
    pub fn seconds(mut self, seconds: impl IntoIterator<Item = u32>) -> Self {
        self.seconds = seconds.into_iter().collect();
        self
    }

    /// Positions kept from each period's sorted candidates; negative values count from the end.
    #[must_use]
    pub fn set_positions(mut self, positions: impl IntoIterator<Item = i32>) -> Self {
        self.set_positions = positions.into_iter().collect();
        self
    }

    /// Zone attached to produced occurrences.
    #[must_use]
    pub fn zone(mut self, zone: impl Into<Zone>) -> Self {
        self.zone = zone.into();
        self
    }

    /// Last year expanded before iteration gives up.
    #[must_use]
    pub fn max_year(mut self, max_year: i32) -> Self {
        self.max_year = max_year;
        self
    }

    /// ## Summary
    /// Validates the parameters, fills in the defaults taken from the start
    /// and builds the rule.
    ///
    /// ## Errors
    /// - `RuleError::ConflictingTermination` if both count and end bound are set.
    /// - `RuleError::ZeroInterval` if the interval is 0.
    /// - `RuleError::FieldOutOfDomain` if a constraint value is outside its domain.
    /// - `RuleError::InvalidHorizon` if the max year is outside `1..=9999`.
    pub fn build(self) -> RuleResult<RecurrenceRule> {
        if self.count.is_some() && self.until.is_some() {
            return Err(RuleError::ConflictingTermination);
        }
        if self.interval == 0 {
            return Err(RuleError::ZeroInterval);
        }
        if !(1..=DEFAULT_MAX_YEAR).contains(&self.max_year) {
            return Err(RuleError::InvalidHorizon(self.max_year));
        }

        check_unsigned("month", &self.months, 1..=12, "1..=12")?;
        check_signed("month day", &self.month_days, 31, "±1..=31")?;
        check_signed("year day", &self.year_days, 366, "±1..=366")?;
        let ordinals: Vec<i32> = self.weekdays.iter().filter_map(|wd| wd.ordinal).collect();
        check_signed("weekday ordinal", &ordinals, 53, "±1..=53")?;
        check_unsigned("hour", &self.hours, 0..=23, "0..=23")?;
        check_unsigned("minute", &self.minutes, 0..=59, "0..=59")?;
        check_unsigned("second", &self.seconds, 0..=59, "0..=59")?;
        check_signed("set position", &self.set_positions, 366, "±1..=366")?;

        let start = self.start.with_nanosecond(0).unwrap_or(self.start);
        let filters = Filters::resolve(&self, start);

        tracing::debug!(
            frequency = %self.frequency,
            interval = self.interval,
            count = ?self.count,
            until = ?self.until,
            %start,
            "Built recurrence rule"
        );

        Ok(RecurrenceRule {
            params: self,
            start,
            filters,
        })
    }
}

fn check_unsigned(
    field: &'static str,
    values: &[u32],
    range: std::ops::RangeInclusive<u32>,
    domain: &'static str,
) -> RuleResult<()> {
    match values.iter().find(|v| !range.contains(v)) {
        Some(&value) => Err(RuleError::FieldOutOfDomain {
            field,
            value: i64::from(value),
            domain,
        }),
        None => Ok(()),
    }
}

fn check_signed(
    field: &'static str,
    values: &[i32],
    limit: i32,
    domain: &'static str,
) -> RuleResult<()> {
    match values
        .iter()
        .find(|v| **v == 0 || !(-limit..=limit).contains(*v))
    {
        Some(&value) => Err(RuleError::FieldOutOfDomain {
            field,
            value: i64::from(value),
            domain,
        }),
        None => Ok(()),
    }
}

fn sorted<T: Ord + Copy>(values: &[T]) -> Vec<T> {
    let mut values = values.to_vec();
    values.sort_unstable();
    values.dedup();
    values
}

/// Constraint lists after defaults and ordinal resolution.
#[derive(Debug, Clone, Default)]
pub(super) struct Filters {
    pub months: Vec<u32>,
    pub month_days: Vec<i32>,
    pub year_days: Vec<i32>,
    /// Weekdays matched on every week.
    pub weekdays: Vec<Weekday>,
    /// Weekdays with an ordinal, resolved within the month or year.
    pub nth_weekdays: Vec<(Weekday, i32)>,
    pub hours: Vec<u32>,
    pub minutes: Vec<u32>,
    pub seconds: Vec<u32>,
    pub set_positions: Vec<i32>,
    /// Time grid for daily and coarser frequencies.
    pub times: Vec<NaiveTime>,
}

impl Filters {
    fn resolve(params: &RuleBuilder, start: NaiveDateTime) -> Self {
        let frequency = params.frequency;
        let mut filters = Self {
            months: sorted(&params.months),
            month_days: sorted(&params.month_days),
            year_days: sorted(&params.year_days),
            hours: sorted(&params.hours),
            minutes: sorted(&params.minutes),
            seconds: sorted(&params.seconds),
            set_positions: sorted(&params.set_positions),
            ..Self::default()
        };

        for wd in &params.weekdays {
            match wd.ordinal {
                Some(n) if frequency >= Frequency::Monthly => {
                    filters.nth_weekdays.push((wd.weekday, n));
                }
                _ => filters.weekdays.push(wd.weekday),
            }
        }
        filters.weekdays.sort_unstable_by_key(|wd| wd.num_days_from_monday());
        filters.weekdays.dedup();
        filters
            .nth_weekdays
            .sort_unstable_by_key(|(wd, n)| (wd.num_days_from_monday(), *n));
        filters.nth_weekdays.dedup();

        if params.weekdays.is_empty() && params.month_days.is_empty() && params.year_days.is_empty()
        {
            let start_day = i32::try_from(start.day()).unwrap_or(1);
            match frequency {
                Frequency::Yearly => {
                    if filters.months.is_empty() {
                        filters.months.push(start.month());
                    }
                    filters.month_days.push(start_day);
                }
                Frequency::Monthly => filters.month_days.push(start_day),
                Frequency::Weekly => filters.weekdays.push(calendar::weekday_of(start.date())),
                _ => {}
            }
        }

        if filters.hours.is_empty() && frequency.is_coarser_than(Frequency::Hourly) {
            filters.hours.push(start.hour());
        }
        if filters.minutes.is_empty() && frequency.is_coarser_than(Frequency::Minutely) {
            filters.minutes.push(start.minute());
        }
        if filters.seconds.is_empty() && frequency.is_coarser_than(Frequency::Secondly) {
            filters.seconds.push(start.second());
        }

        if frequency >= Frequency::Daily {
            for &hour in &filters.hours {
                for &minute in &filters.minutes {
                    for &second in &filters.seconds {
                        if let Some(time) = NaiveTime::from_hms_opt(hour, minute, second) {
                            filters.times.push(time);
                        }
                    }
                }
            }
        }
        filters
    }
}

/// An immutable recurrence rule: a frequency, a start and field constraints.
///
/// Occurrences are produced lazily in ascending order without duplicates.
#[derive(Debug, Clone)]
pub struct RecurrenceRule {
    params: RuleBuilder,
    start: NaiveDateTime,
    filters: Filters,
}

impl RecurrenceRule {
    /// Creates a builder for a rule of `frequency` anchored at `start`.
    #[must_use]
    pub fn builder(frequency: Frequency, start: NaiveDateTime) -> RuleBuilder {
        RuleBuilder::new(frequency, start)
    }

    /// Returns a builder holding this rule's parameters as originally given.
    #[must_use]
    pub fn to_builder(&self) -> RuleBuilder {
        self.params.clone()
    }

    /// ## Summary
    /// Copies the rule with some parameters replaced.
    ///
    /// Defaults taken from the start are recomputed, so changing the start of
    /// a monthly rule without explicit days moves its day of month too.
    ///
    /// ## Errors
    /// Returns a `RuleError` if the modified parameters are invalid.
    pub fn restrict(&self, modify: impl FnOnce(RuleBuilder) -> RuleBuilder) -> RuleResult<Self> {
        modify(self.to_builder()).build()
    }

    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.params.frequency
    }

    /// Start of the rule with sub-second precision removed.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.params.interval
    }

    #[must_use]
    pub const fn week_start(&self) -> Weekday {
        self.params.week_start
    }

    #[must_use]
    pub const fn until(&self) -> Option<NaiveDateTime> {
        self.params.until
    }

    #[must_use]
    pub const fn count(&self) -> Option<u32> {
        self.params.count
    }

    #[must_use]
    pub const fn zone(&self) -> &Zone {
        &self.params.zone
    }

    #[must_use]
    pub const fn max_year(&self) -> i32 {
        self.params.max_year
    }

    pub(super) const fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Iterates the rule's wall times from the start.
    #[must_use]
    pub fn iter(&self) -> RuleIter<'_> {
        RuleIter::new(self)
    }

    /// Iterates the rule's wall times with the rule's zone attached.
    #[must_use]
    pub fn occurrences(&self) -> impl Iterator<Item = Occurrence> + '_ {
        self.iter()
            .map(|wall| Occurrence::new(wall, self.params.zone.clone()))
    }

    /// ## Summary
    /// Occurrences between `start` and `end`, bounds included when `inclusive`.
    ///
    /// Stops pulling from the rule once `end` is passed.
    #[must_use]
    pub fn between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        inclusive: bool,
    ) -> Vec<NaiveDateTime> {
        let found: Vec<_> = self
            .iter()
            .skip_while(|dt| if inclusive { *dt < start } else { *dt <= start })
            .take_while(|dt| if inclusive { *dt <= end } else { *dt < end })
            .collect();
        tracing::debug!(%start, %end, inclusive, found = found.len(), "Queried rule range");
        found
    }

    /// First occurrence after `reference` (or at it, when `inclusive`).
    #[must_use]
    pub fn after(&self, reference: NaiveDateTime, inclusive: bool) -> Option<NaiveDateTime> {
        self.iter().find(|dt| {
            if inclusive {
                *dt >= reference
            } else {
                *dt > reference
            }
        })
    }

    /// Last occurrence before `reference` (or at it, when `inclusive`).
    #[must_use]
    pub fn before(&self, reference: NaiveDateTime, inclusive: bool) -> Option<NaiveDateTime> {
        self.iter()
            .take_while(|dt| {
                if inclusive {
                    *dt <= reference
                } else {
                    *dt < reference
                }
            })
            .last()
    }
}

impl<'a> IntoIterator for &'a RecurrenceRule {
    type Item = NaiveDateTime;
    type IntoIter = RuleIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
