//! Recurrence frequency and weekday selectors.

use std::fmt;

/// Recurrence frequency, ordered from the finest to the coarsest period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Returns true if one period of `self` spans more than one period of `other`.
    #[must_use]
    pub fn is_coarser_than(self, other: Self) -> bool {
        self > other
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
            Self::Sunday => "SU",
        }
    }

    /// Days since Monday (Monday = 0, Sunday = 6).
    #[must_use]
    pub const fn num_days_from_monday(self) -> u32 {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    /// Selects every occurrence of this weekday.
    #[must_use]
    pub const fn every(self) -> WeekdayNum {
        WeekdayNum::every(self)
    }

    /// Selects the `ordinal`-th occurrence of this weekday (negative counts from the end).
    #[must_use]
    pub const fn nth(self, ordinal: i32) -> WeekdayNum {
        WeekdayNum::nth(ordinal, self)
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Monday => Self::Mon,
            Weekday::Tuesday => Self::Tue,
            Weekday::Wednesday => Self::Wed,
            Weekday::Thursday => Self::Thu,
            Weekday::Friday => Self::Fri,
            Weekday::Saturday => Self::Sat,
            Weekday::Sunday => Self::Sun,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weekday with optional occurrence number.
///
/// Examples:
/// - `MO` - every Monday
/// - `+2SU` - second Sunday of the month/year, or the second Sunday from a date
/// - `-1FR` - last Friday of the month/year, or the previous-or-same Friday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdayNum {
    /// Optional occurrence number, never 0.
    pub ordinal: Option<i32>,
    /// The day of the week.
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Creates a weekday occurrence without an ordinal.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// Creates a weekday occurrence with an ordinal.
    ///
    /// A zero ordinal is accepted here and rejected by the rule and offset builders.
    #[must_use]
    pub const fn nth(ordinal: i32, weekday: Weekday) -> Self {
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl From<Weekday> for WeekdayNum {
    fn from(weekday: Weekday) -> Self {
        Self::every(weekday)
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n:+}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_ordering() {
        assert!(Frequency::Yearly.is_coarser_than(Frequency::Monthly));
        assert!(Frequency::Daily.is_coarser_than(Frequency::Hourly));
        assert!(!Frequency::Secondly.is_coarser_than(Frequency::Secondly));
    }

    #[test]
    fn weekday_chrono_conversion() {
        for wd in [
            chrono::Weekday::Mon,
            chrono::Weekday::Wed,
            chrono::Weekday::Sun,
        ] {
            assert_eq!(chrono::Weekday::from(Weekday::from(wd)), wd);
        }
        assert_eq!(
            Weekday::from(chrono::Weekday::Fri).num_days_from_monday(),
            chrono::Weekday::Fri.num_days_from_monday()
        );
    }

    #[test]
    fn weekday_num_display() {
        assert_eq!(Weekday::Friday.nth(-1).to_string(), "-1FR");
        assert_eq!(Weekday::Sunday.nth(2).to_string(), "+2SU");
        assert_eq!(Weekday::Monday.every().to_string(), "MO");
    }
}
