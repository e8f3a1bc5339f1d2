//! Recurrence rules, recurrence sets and relative calendar offsets.
//!
//! - [`recur::expand::RecurrenceRule`] generates occurrences lazily, period by period.
//! - [`recur::expand::RecurrenceSet`] merges and subtracts rules and explicit dates.
//! - [`recur::offset::CalendarOffset`] applies "set to" / "add" / weekday-jump adjustments.

pub mod error;
pub mod recur;
