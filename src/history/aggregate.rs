use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::constants::{END_OF_DAY, MIDNIGHT};

use super::record::{is_iso_date_shape, local_instant, RawRecord};

/// Inclusive instant range in UTC+8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl DateRange {
    /// Midnight of `start_day` through 23:59:59 of `end_day`.
    ///
    /// Returns `None` unless both are real `YYYY-MM-DD` dates with start not after end.
    pub fn from_days(start_day: &str, end_day: &str) -> Option<Self> {
        if !is_iso_date_shape(start_day) || !is_iso_date_shape(end_day) {
            return None;
        }
        let start = local_instant(start_day, MIDNIGHT)?;
        let end = local_instant(end_day, END_OF_DAY)?;
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, instant: &DateTime<FixedOffset>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub distinct_days: Vec<String>,
    pub records: Vec<RawRecord>,
}

/// Merges records into an identity-keyed map, last write wins.
///
/// Days are collected before the overwrite, so a day contributed by a record
/// that is later replaced stays in the day set.
#[derive(Debug)]
pub struct Aggregator {
    range: DateRange,
    slots: HashMap<String, usize>,
    entries: Vec<(DateTime<FixedOffset>, RawRecord)>,
    days: BTreeSet<String>,
}

impl Aggregator {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            slots: HashMap::new(),
            entries: Vec::new(),
            days: BTreeSet::new(),
        }
    }

    /// Returns `false` when the record was dropped (unresolvable or out of range).
    pub fn ingest(&mut self, record: RawRecord) -> bool {
        let Some(resolved) = record.resolve() else {
            return false;
        };
        if !self.range.contains(&resolved.instant) {
            return false;
        }

        self.days.insert(resolved.day);
        let entry = (resolved.instant, record);
        match self.slots.get(&resolved.identity_key) {
            Some(&slot) => self.entries[slot] = entry,
            None => {
                self.slots.insert(resolved.identity_key, self.entries.len());
                self.entries.push(entry);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records newest first; equal instants keep first-seen order.
    pub fn finish(self) -> AggregationResult {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        AggregationResult {
            distinct_days: self.days.into_iter().collect(),
            records: entries.into_iter().map(|(_, record)| record).collect(),
        }
    }
}

pub fn aggregate<I>(records: I, range: DateRange) -> AggregationResult
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut aggregator = Aggregator::new(range);
    for record in records {
        aggregator.ingest(record);
    }
    aggregator.finish()
}
