//! Value types shared by offsets, rules and sets.

pub mod calendar;
mod frequency;
mod occurrence;
mod zone;

pub use frequency::{Frequency, Weekday, WeekdayNum};
pub use occurrence::{MatchMode, Occurrence};
pub use zone::{LocalLookup, Zone, ZoneInfo};
