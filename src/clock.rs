//! Match clock pre-scan.
//!
//! The minute slot is normalized against a per-match bound: the largest of
//! the per-period last minutes. The bound is fixed before any row is
//! produced so early rows do not depend on events not yet seen.

use std::collections::BTreeMap;

use crate::encoding::Range;
use crate::schema::Event;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchClock {
    /// Last observed minute of each period.
    last_minute: BTreeMap<u64, u64>,
}

impl MatchClock {
    /// Scans every event of a match, discarded types included.
    pub fn scan(events: &[Event]) -> Self {
        let mut last_minute = BTreeMap::new();
        for e in events {
            let m = last_minute.entry(e.period).or_insert(e.minute);
            *m = (*m).max(e.minute);
        }
        MatchClock { last_minute }
    }

    pub fn last_minute(&self, period: u64) -> Option<u64> {
        self.last_minute.get(&period).copied()
    }

    /// Upper bound for minute normalization, at least 1.
    pub fn max_minute(&self) -> u64 {
        self.last_minute.values().copied().max().unwrap_or(0).max(1)
    }

    pub fn minute_range(&self) -> Range {
        Range::new(0.0, self.max_minute() as f64)
    }
}
