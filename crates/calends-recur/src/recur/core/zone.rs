//! Timezone capability used to turn wall times into instants.
//!
//! The engine never inspects timezone data itself. A zone only has to answer
//! two questions: which offset is in force at a UTC instant, and whether a
//! wall time is unique, ambiguous (fall-back overlap) or nonexistent
//! (spring-forward gap).

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// Result of looking up a wall time in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalLookup {
    /// The wall time maps to exactly one instant.
    Unique(FixedOffset),
    /// The wall time occurs twice; `earlier` is the offset of the first instant.
    Ambiguous {
        earlier: FixedOffset,
        later: FixedOffset,
    },
    /// The wall time falls in a gap and never occurs.
    Nonexistent,
}

/// Offset and gap/fold information for a timezone.
pub trait ZoneInfo: fmt::Debug {
    /// Offset in force at the given UTC instant.
    fn offset_from_utc(&self, utc: NaiveDateTime) -> FixedOffset;

    /// Classifies a wall time.
    fn lookup_local(&self, wall: NaiveDateTime) -> LocalLookup;
}

impl ZoneInfo for Tz {
    fn offset_from_utc(&self, utc: NaiveDateTime) -> FixedOffset {
        self.offset_from_utc_datetime(&utc).fix()
    }

    fn lookup_local(&self, wall: NaiveDateTime) -> LocalLookup {
        match self.offset_from_local_datetime(&wall) {
            LocalResult::Single(offset) => LocalLookup::Unique(offset.fix()),
            LocalResult::Ambiguous(a, b) => {
                let (a, b) = (a.fix(), b.fix());
                // A larger offset maps the same wall time to an earlier instant
                if a.local_minus_utc() >= b.local_minus_utc() {
                    LocalLookup::Ambiguous {
                        earlier: a,
                        later: b,
                    }
                } else {
                    LocalLookup::Ambiguous {
                        earlier: b,
                        later: a,
                    }
                }
            }
            LocalResult::None => LocalLookup::Nonexistent,
        }
    }
}

impl ZoneInfo for FixedOffset {
    fn offset_from_utc(&self, _utc: NaiveDateTime) -> FixedOffset {
        *self
    }

    fn lookup_local(&self, _wall: NaiveDateTime) -> LocalLookup {
        LocalLookup::Unique(*self)
    }
}

/// The zone context attached to an occurrence.
#[derive(Debug, Clone, Default)]
pub enum Zone {
    /// No zone: the wall time is read as UTC when an instant is needed.
    #[default]
    Floating,
    /// A constant UTC offset.
    Fixed(FixedOffset),
    /// An IANA zone from `chrono-tz`.
    Named(Tz),
    /// A caller-supplied zone implementation.
    Custom(Arc<dyn ZoneInfo + Send + Sync>),
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

fn offset_delta(offset: FixedOffset) -> TimeDelta {
    TimeDelta::seconds(i64::from(offset.local_minus_utc()))
}

impl Zone {
    fn info(&self) -> Option<&dyn ZoneInfo> {
        match self {
            Self::Floating => None,
            Self::Fixed(offset) => Some(offset),
            Self::Named(tz) => Some(tz),
            Self::Custom(info) => Some(info.as_ref()),
        }
    }

    /// Returns true for [`Zone::Floating`].
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        matches!(self, Self::Floating)
    }

    /// ## Summary
    /// Classifies a wall time in this zone. Floating zones are always unique at UTC.
    #[must_use]
    pub fn lookup(&self, wall: NaiveDateTime) -> LocalLookup {
        self.info()
            .map_or(LocalLookup::Unique(utc_offset()), |info| {
                info.lookup_local(wall)
            })
    }

    /// ## Summary
    /// Returns the offsets in force just before and just after the gap that
    /// swallows `wall`, or `None` if `wall` is not in a gap.
    #[must_use]
    pub fn gap_offsets(&self, wall: NaiveDateTime) -> Option<(FixedOffset, FixedOffset)> {
        let info = self.info()?;
        if info.lookup_local(wall) != LocalLookup::Nonexistent {
            return None;
        }
        let before = info.offset_from_utc(wall.checked_sub_signed(TimeDelta::days(1))?);
        let after = info.offset_from_utc(wall.checked_add_signed(TimeDelta::days(1))?);
        Some((before, after))
    }

    /// ## Summary
    /// Converts a wall time to a naive UTC instant.
    ///
    /// Ambiguous wall times resolve to the earlier instant. Wall times inside a
    /// gap resolve to the instant at which the gap ends, so the mapping from
    /// wall time to instant never decreases.
    ///
    /// Returns `None` if the arithmetic leaves chrono's range.
    #[must_use]
    pub fn to_utc(&self, wall: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.lookup(wall) {
            LocalLookup::Unique(offset) | LocalLookup::Ambiguous { earlier: offset, .. } => {
                wall.checked_sub_signed(offset_delta(offset))
            }
            LocalLookup::Nonexistent => self.gap_end(wall),
        }
    }

    fn gap_end(&self, wall: NaiveDateTime) -> Option<NaiveDateTime> {
        let info = self.info()?;
        let (before, after) = self.gap_offsets(wall)?;
        let mut lo = wall.checked_sub_signed(offset_delta(after))?.and_utc().timestamp();
        let mut hi = wall.checked_sub_signed(offset_delta(before))?.and_utc().timestamp();
        if before == after || lo >= hi {
            return DateTime::from_timestamp(hi, 0).map(|dt| dt.naive_utc());
        }

        // Offset at `lo` is `before`, offset at `hi` is `after`
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            let probe = DateTime::from_timestamp(mid, 0)?.naive_utc();
            if info.offset_from_utc(probe) == before {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let hi = DateTime::from_timestamp(hi, 0)?.naive_utc();
        tracing::trace!(%wall, transition = %hi, "Resolved wall time inside gap");
        Some(hi)
    }

    /// ## Summary
    /// Returns the offset used for `wall` when it is presented as an aware value.
    #[must_use]
    pub fn offset_for(&self, wall: NaiveDateTime) -> FixedOffset {
        match self.lookup(wall) {
            LocalLookup::Unique(offset) | LocalLookup::Ambiguous { earlier: offset, .. } => offset,
            LocalLookup::Nonexistent => self
                .gap_offsets(wall)
                .map_or_else(utc_offset, |(_, after)| after),
        }
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Self::Named(tz)
    }
}

impl From<FixedOffset> for Zone {
    fn from(offset: FixedOffset) -> Self {
        Self::Fixed(offset)
    }
}
