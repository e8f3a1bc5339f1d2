//! Occurrences and the explicit wall-time / absolute-time comparison mode.

use std::cmp::Ordering;

use calends_core::config::MatchModeSetting;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use super::{LocalLookup, Zone};

/// How two occurrences are compared, ordered and subtracted.
///
/// The caller always chooses; nothing is inferred from the zones involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Compare calendar and clock fields, ignoring zones.
    WallTime,
    /// Compare instants on the UTC timeline.
    Absolute,
}

impl From<MatchModeSetting> for MatchMode {
    fn from(setting: MatchModeSetting) -> Self {
        match setting {
            MatchModeSetting::WallTime => Self::WallTime,
            MatchModeSetting::Absolute => Self::Absolute,
        }
    }
}

/// A single concrete date/time produced by a rule or added to a set.
#[derive(Debug, Clone)]
pub struct Occurrence {
    wall: NaiveDateTime,
    zone: Zone,
}

impl Occurrence {
    #[must_use]
    pub const fn new(wall: NaiveDateTime, zone: Zone) -> Self {
        Self { wall, zone }
    }

    /// An occurrence with no zone.
    #[must_use]
    pub const fn floating(wall: NaiveDateTime) -> Self {
        Self::new(wall, Zone::Floating)
    }

    /// The literal calendar and clock fields.
    #[must_use]
    pub const fn wall(&self) -> NaiveDateTime {
        self.wall
    }

    #[must_use]
    pub const fn zone(&self) -> &Zone {
        &self.zone
    }

    /// ## Summary
    /// The naive UTC instant of this occurrence.
    ///
    /// Ambiguous wall times take the earlier instant, gap times the end of the
    /// gap, floating times are read as UTC. Falls back to the wall time if the
    /// conversion leaves chrono's range.
    #[must_use]
    pub fn instant(&self) -> NaiveDateTime {
        self.zone.to_utc(self.wall).unwrap_or(self.wall)
    }

    /// The instant as a UTC datetime.
    #[must_use]
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.instant().and_utc()
    }

    /// ## Summary
    /// Presents the occurrence as an aware value with the offset in force.
    ///
    /// Gap times are shown with the offset after the gap.
    #[must_use]
    pub fn to_fixed(&self) -> DateTime<FixedOffset> {
        let offset = self.zone.offset_for(self.wall);
        offset.from_utc_datetime(&self.instant())
    }

    /// The value compared under `mode`.
    #[must_use]
    pub fn key(&self, mode: MatchMode) -> NaiveDateTime {
        match mode {
            MatchMode::WallTime => self.wall,
            MatchMode::Absolute => self.instant(),
        }
    }

    #[must_use]
    pub fn compare(&self, other: &Self, mode: MatchMode) -> Ordering {
        self.key(mode).cmp(&other.key(mode))
    }

    /// Returns true if both denote the same occurrence under `mode`.
    #[must_use]
    pub fn same_as(&self, other: &Self, mode: MatchMode) -> bool {
        self.compare(other, mode) == Ordering::Equal
    }

    /// ## Summary
    /// Elapsed time from `other` to `self`.
    ///
    /// In wall-time mode this is the difference of the clock readings; across a
    /// DST change it differs from the absolute difference by the offset change.
    #[must_use]
    pub fn duration_since(&self, other: &Self, mode: MatchMode) -> TimeDelta {
        self.key(mode) - other.key(mode)
    }

    /// True if the wall time occurs twice in its zone.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self.zone.lookup(self.wall), LocalLookup::Ambiguous { .. })
    }

    /// True if the wall time never occurs in its zone.
    #[must_use]
    pub fn is_imaginary(&self) -> bool {
        self.zone.lookup(self.wall) == LocalLookup::Nonexistent
    }

    /// ## Summary
    /// Moves an imaginary wall time forward by the length of its gap
    /// (02:30 becomes 03:30 across a one-hour spring-forward). Other
    /// occurrences are returned unchanged.
    #[must_use]
    pub fn resolve_imaginary(&self) -> Self {
        let Some((before, after)) = self.zone.gap_offsets(self.wall) else {
            return self.clone();
        };
        let shift = TimeDelta::seconds(i64::from(
            after.local_minus_utc() - before.local_minus_utc(),
        ));
        let wall = self.wall.checked_add_signed(shift).unwrap_or(self.wall);
        Self::new(wall, self.zone.clone())
    }
}

impl From<NaiveDateTime> for Occurrence {
    fn from(wall: NaiveDateTime) -> Self {
        Self::floating(wall)
    }
}

impl From<DateTime<Tz>> for Occurrence {
    fn from(dt: DateTime<Tz>) -> Self {
        Self::new(dt.naive_local(), Zone::Named(dt.timezone()))
    }
}

impl From<DateTime<FixedOffset>> for Occurrence {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::new(dt.naive_local(), Zone::Fixed(*dt.offset()))
    }
}

impl From<DateTime<Utc>> for Occurrence {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::new(dt.naive_utc(), Zone::Fixed(Utc.fix()))
    }
}
