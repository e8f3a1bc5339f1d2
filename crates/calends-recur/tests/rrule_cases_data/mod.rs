use calends_recur::recur::core::{Frequency, Weekday};
use calends_recur::recur::expand::RecurrenceRule;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use rrule::RRuleSet;

/// A rule built with the builder API next to the equivalent RRULE text.
///
/// End bounds in `rruleset` are chosen so that no occurrence falls exactly on
/// them; the rrule crate treats `UNTIL` as inclusive.
pub struct RuleCase {
    pub name: &'static str,
    pub rruleset: &'static str,
    pub rule: fn() -> RecurrenceRule,
    pub expected: Option<&'static [&'static str]>,
    pub expected_len: Option<usize>,
    pub limit: u16,
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[expect(clippy::too_many_lines)]
pub fn rule_cases() -> Vec<RuleCase> {
    vec![
        RuleCase {
            name: "daily_basic",
            rruleset: "DTSTART:20120201T093000Z\nRRULE:FREQ=DAILY;COUNT=3",
            rule: || {
                RecurrenceRule::builder(Frequency::Daily, at(2012, 2, 1, 9, 30))
                    .count(3)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "2012-02-01T09:30:00+00:00",
                "2012-02-02T09:30:00+00:00",
                "2012-02-03T09:30:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "weekly_basic",
            rruleset: "DTSTART:19970902T090000Z\nRRULE:FREQ=WEEKLY;COUNT=3;BYDAY=TU,TH",
            rule: || {
                RecurrenceRule::builder(Frequency::Weekly, at(1997, 9, 2, 9, 0))
                    .weekdays([Weekday::Tuesday, Weekday::Thursday])
                    .count(3)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "1997-09-02T09:00:00+00:00",
                "1997-09-04T09:00:00+00:00",
                "1997-09-09T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "monthly_basic",
            rruleset: "DTSTART:20120101T090000Z\nRRULE:FREQ=MONTHLY;COUNT=3;BYMONTHDAY=1",
            rule: || {
                RecurrenceRule::builder(Frequency::Monthly, at(2012, 1, 1, 9, 0))
                    .month_days([1])
                    .count(3)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "2012-01-01T09:00:00+00:00",
                "2012-02-01T09:00:00+00:00",
                "2012-03-01T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "yearly_basic",
            rruleset: "DTSTART:20120101T090000Z\nRRULE:FREQ=YEARLY;COUNT=3",
            rule: || {
                RecurrenceRule::builder(Frequency::Yearly, at(2012, 1, 1, 9, 0))
                    .count(3)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "2012-01-01T09:00:00+00:00",
                "2013-01-01T09:00:00+00:00",
                "2014-01-01T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "hourly_basic",
            rruleset: "DTSTART:20120101T090000Z\nRRULE:FREQ=HOURLY;COUNT=3",
            rule: || {
                RecurrenceRule::builder(Frequency::Hourly, at(2012, 1, 1, 9, 0))
                    .count(3)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "2012-01-01T09:00:00+00:00",
                "2012-01-01T10:00:00+00:00",
                "2012-01-01T11:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "monthly_last_friday",
            rruleset: "DTSTART:20190501T000000Z\nRRULE:FREQ=MONTHLY;COUNT=3;BYDAY=-1FR",
            rule: || {
                RecurrenceRule::builder(Frequency::Monthly, at(2019, 5, 1, 0, 0))
                    .weekdays([Weekday::Friday.nth(-1)])
                    .count(3)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "2019-05-31T00:00:00+00:00",
                "2019-06-28T00:00:00+00:00",
                "2019-07-26T00:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "monthly_last_workday",
            rruleset: "DTSTART:20190501T000000Z\nRRULE:FREQ=MONTHLY;COUNT=3;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1",
            rule: || {
                RecurrenceRule::builder(Frequency::Monthly, at(2019, 5, 1, 0, 0))
                    .weekdays([
                        Weekday::Monday,
                        Weekday::Tuesday,
                        Weekday::Wednesday,
                        Weekday::Thursday,
                        Weekday::Friday,
                    ])
                    .set_positions([-1])
                    .count(3)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "2019-05-31T00:00:00+00:00",
                "2019-06-28T00:00:00+00:00",
                "2019-07-31T00:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "yearly_second_sunday_of_may",
            rruleset: "DTSTART:20260101T090000Z\nRRULE:FREQ=YEARLY;COUNT=3;BYMONTH=5;BYDAY=2SU",
            rule: || {
                RecurrenceRule::builder(Frequency::Yearly, at(2026, 1, 1, 9, 0))
                    .months([5])
                    .weekdays([Weekday::Sunday.nth(2)])
                    .count(3)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "2026-05-10T09:00:00+00:00",
                "2027-05-09T09:00:00+00:00",
                "2028-05-14T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "yearly_last_day_of_january_and_july",
            rruleset: "DTSTART:20260101T090000Z\nRRULE:FREQ=YEARLY;COUNT=4;BYMONTH=1,7;BYMONTHDAY=-1",
            rule: || {
                RecurrenceRule::builder(Frequency::Yearly, at(2026, 1, 1, 9, 0))
                    .months([1, 7])
                    .month_days([-1])
                    .count(4)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "2026-01-31T09:00:00+00:00",
                "2026-07-31T09:00:00+00:00",
                "2027-01-31T09:00:00+00:00",
                "2027-07-31T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "bimonthly_first_and_fifteenth",
            rruleset: "DTSTART:20260101T090000Z\nRRULE:FREQ=MONTHLY;COUNT=4;INTERVAL=2;BYMONTHDAY=1,15",
            rule: || {
                RecurrenceRule::builder(Frequency::Monthly, at(2026, 1, 1, 9, 0))
                    .interval(2)
                    .month_days([1, 15])
                    .count(4)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "2026-01-01T09:00:00+00:00",
                "2026-01-15T09:00:00+00:00",
                "2026-03-01T09:00:00+00:00",
                "2026-03-15T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "daily_interval_until",
            rruleset: "DTSTART:20260301T080000Z\nRRULE:FREQ=DAILY;INTERVAL=3;UNTIL=20260320T000000Z",
            rule: || {
                RecurrenceRule::builder(Frequency::Daily, at(2026, 3, 1, 8, 0))
                    .interval(3)
                    .until(at(2026, 3, 20, 0, 0))
                    .build()
                    .unwrap()
            },
            expected: None,
            expected_len: Some(7),
            limit: 100,
        },
        RuleCase {
            name: "biweekly_monday_sunday_week_start",
            rruleset: "DTSTART:20261014T090000Z\nRRULE:FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=MO;WKST=SU",
            rule: || {
                RecurrenceRule::builder(Frequency::Weekly, at(2026, 10, 14, 9, 0))
                    .interval(2)
                    .week_start(Weekday::Sunday)
                    .weekdays([Weekday::Monday])
                    .count(4)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "2026-10-26T09:00:00+00:00",
                "2026-11-09T09:00:00+00:00",
                "2026-11-23T09:00:00+00:00",
                "2026-12-07T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "new_york_daily_across_dst",
            rruleset: "DTSTART;TZID=America/New_York:20210313T090000\nRRULE:FREQ=DAILY;COUNT=3",
            rule: || {
                RecurrenceRule::builder(Frequency::Daily, at(2021, 3, 13, 9, 0))
                    .zone(Tz::America__New_York)
                    .count(3)
                    .build()
                    .unwrap()
            },
            expected: Some(&[
                "2021-03-13T14:00:00+00:00",
                "2021-03-14T13:00:00+00:00",
                "2021-03-15T13:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RuleCase {
            name: "rfc_every_day_in_jan",
            rruleset: "DTSTART;TZID=America/New_York:19980101T090000\nRRULE:FREQ=YEARLY;UNTIL=20000131T140000Z;BYMONTH=1;BYDAY=SU,MO,TU,WE,TH,FR,SA",
            rule: || {
                RecurrenceRule::builder(Frequency::Yearly, at(1998, 1, 1, 9, 0))
                    .zone(Tz::America__New_York)
                    .months([1])
                    .weekdays([
                        Weekday::Sunday,
                        Weekday::Monday,
                        Weekday::Tuesday,
                        Weekday::Wednesday,
                        Weekday::Thursday,
                        Weekday::Friday,
                        Weekday::Saturday,
                    ])
                    // exclusive bound just past the last 09:00 occurrence
                    .until(at(2000, 1, 31, 10, 0))
                    .build()
                    .unwrap()
            },
            expected: None,
            expected_len: Some(93),
            limit: 200,
        },
    ]
}

/// Timestamps produced by the rule, read through the rule's zone.
pub fn rule_timestamps(case: &RuleCase) -> Vec<i64> {
    let rule = (case.rule)();
    rule.occurrences()
        .take(usize::from(case.limit))
        .map(|occurrence| occurrence.to_utc().timestamp())
        .collect()
}

/// Timestamps produced by the rrule crate for the same rule text.
pub fn rrule_timestamps(case: &RuleCase) -> Vec<i64> {
    let rrule_set: RRuleSet = case
        .rruleset
        .parse()
        .unwrap_or_else(|err| panic!("Failed to parse {}: {}", case.name, err));
    rrule_set
        .all(case.limit)
        .dates
        .iter()
        .map(chrono::DateTime::timestamp)
        .collect()
}

pub fn assert_case(case: &RuleCase) {
    let actual = rule_timestamps(case);

    if let Some(expected) = case.expected {
        let expected_timestamps: Vec<i64> = expected
            .iter()
            .map(|value| parse_rfc3339(value).timestamp())
            .collect();
        assert_eq!(actual, expected_timestamps, "Case {} did not match", case.name);
    }

    if let Some(expected_len) = case.expected_len {
        assert_eq!(
            actual.len(),
            expected_len,
            "Case {} expected {} occurrences",
            case.name,
            expected_len
        );
    }
}

fn parse_rfc3339(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value)
        .unwrap_or_else(|err| panic!("Failed to parse rfc3339 value {value}: {err}"))
}
