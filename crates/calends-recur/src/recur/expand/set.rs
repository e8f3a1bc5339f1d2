//! Recurrence sets: included rules and dates minus excluded rules and dates.

use calends_core::config::{RecurrenceConfig, Settings};
use chrono::NaiveDateTime;

use crate::error::RecurResult;
use crate::recur::core::{MatchMode, Occurrence};

use super::RecurrenceRule;
use super::merge::{Merged, Stream};

/// A collection of rules and explicit dates evaluated as one ordered stream.
///
/// Two occurrences are "the same" when their keys under the set's
/// [`MatchMode`] are equal: the wall time in wall-time mode, the UTC instant
/// in absolute mode. Every query re-evaluates the members from scratch.
#[derive(Debug, Clone)]
pub struct RecurrenceSet {
    mode: MatchMode,
    rules: Vec<RecurrenceRule>,
    exclusion_rules: Vec<RecurrenceRule>,
    dates: Vec<Occurrence>,
    exclusion_dates: Vec<Occurrence>,
}

impl RecurrenceSet {
    #[must_use]
    pub const fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            rules: Vec::new(),
            exclusion_rules: Vec::new(),
            dates: Vec::new(),
            exclusion_dates: Vec::new(),
        }
    }

    /// Creates an empty set using the configured match mode.
    #[must_use]
    pub fn from_config(config: &RecurrenceConfig) -> Self {
        Self::new(config.match_mode.into())
    }

    /// ## Summary
    /// Creates an empty set from loaded settings.
    ///
    /// ## Errors
    /// Returns `RecurError::CoreError` if the settings fail validation.
    pub fn from_settings(settings: &Settings) -> RecurResult<Self> {
        settings.validate()?;
        Ok(Self::from_config(&settings.recurrence))
    }

    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn add_rule(&mut self, rule: RecurrenceRule) {
        self.rules.push(rule);
    }

    pub fn add_exclusion_rule(&mut self, rule: RecurrenceRule) {
        self.exclusion_rules.push(rule);
    }

    pub fn add_date(&mut self, date: impl Into<Occurrence>) {
        self.dates.push(date.into());
    }

    pub fn add_exclusion_date(&mut self, date: impl Into<Occurrence>) {
        self.exclusion_dates.push(date.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.dates.is_empty()
    }

    fn streams<'a>(&self, rules: &'a [RecurrenceRule], dates: &[Occurrence]) -> Vec<Stream<'a>> {
        let mut dates = dates.to_vec();
        dates.sort_by_key(|occurrence| occurrence.key(self.mode));

        let mut streams: Vec<Stream<'a>> = rules
            .iter()
            .map(|rule| Box::new(rule.occurrences()) as Stream<'a>)
            .collect();
        streams.push(Box::new(dates.into_iter()));
        streams
    }

    /// Iterates the set's occurrences in ascending order under its match mode.
    #[must_use]
    pub fn iter(&self) -> SetIter<'_> {
        SetIter {
            include: Merged::new(self.mode, self.streams(&self.rules, &self.dates)),
            exclude: Merged::new(
                self.mode,
                self.streams(&self.exclusion_rules, &self.exclusion_dates),
            ),
            last: None,
        }
    }

    /// ## Summary
    /// Occurrences between `start` and `end`, bounds included when `inclusive`.
    ///
    /// Bounds are compared under the set's match mode. Stops pulling from the
    /// members once `end` is passed.
    #[must_use]
    pub fn between(
        &self,
        start: impl Into<Occurrence>,
        end: impl Into<Occurrence>,
        inclusive: bool,
    ) -> Vec<Occurrence> {
        let start = start.into().key(self.mode);
        let end = end.into().key(self.mode);
        let found: Vec<_> = self
            .iter()
            .skip_while(|occ| {
                let key = occ.key(self.mode);
                if inclusive { key < start } else { key <= start }
            })
            .take_while(|occ| {
                let key = occ.key(self.mode);
                if inclusive { key <= end } else { key < end }
            })
            .collect();
        tracing::debug!(
            mode = ?self.mode,
            %start,
            %end,
            inclusive,
            found = found.len(),
            "Queried recurrence set range"
        );
        found
    }

    /// First occurrence after `reference` (or at it, when `inclusive`).
    #[must_use]
    pub fn after(&self, reference: impl Into<Occurrence>, inclusive: bool) -> Option<Occurrence> {
        let reference = reference.into().key(self.mode);
        self.iter().find(|occ| {
            let key = occ.key(self.mode);
            if inclusive { key >= reference } else { key > reference }
        })
    }

    /// Last occurrence before `reference` (or at it, when `inclusive`).
    #[must_use]
    pub fn before(&self, reference: impl Into<Occurrence>, inclusive: bool) -> Option<Occurrence> {
        let reference = reference.into().key(self.mode);
        self.iter()
            .take_while(|occ| {
                let key = occ.key(self.mode);
                if inclusive { key <= reference } else { key < reference }
            })
            .last()
    }
}

impl<'a> IntoIterator for &'a RecurrenceSet {
    type Item = Occurrence;
    type IntoIter = SetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`RecurrenceSet`].
pub struct SetIter<'a> {
    include: Merged<'a>,
    exclude: Merged<'a>,
    last: Option<NaiveDateTime>,
}

impl Iterator for SetIter<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (key, occurrence) = self.include.next()?;
            if self.last == Some(key) {
                continue;
            }
            while self.exclude.peek_key().is_some_and(|excluded| excluded < key) {
                self.exclude.next();
            }
            if self.exclude.peek_key() == Some(key) {
                continue;
            }
            self.last = Some(key);
            return Some(occurrence);
        }
    }
}
