//! Transit history.
//!
//! Every state entry appends one [`TransitRecord`]. The history keeps at
//! most `limit` records; once full, the oldest record is dropped.

use super::transition::Trigger;
use super::StateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single state entry.
///
/// # Example
///
/// ```rust
/// use statechart::core::{TransitHistory, TransitRecord, Trigger};
/// use chrono::Utc;
///
/// let mut history = TransitHistory::new(8);
/// history.record(TransitRecord {
///     transit: 1,
///     from: None,
///     to: 1,
///     trigger: None,
///     entered_at: Utc::now(),
/// });
/// history.record(TransitRecord {
///     transit: 2,
///     from: Some(1),
///     to: 2,
///     trigger: Some(Trigger::Event(10)),
///     entered_at: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec![1, 2]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitRecord {
    /// Value of the machine's transit counter after this entry
    pub transit: u64,
    /// State that was exited, `None` for the initial entry
    pub from: Option<StateId>,
    /// State that was entered
    pub to: StateId,
    /// What caused the entry, `None` for the initial entry
    pub trigger: Option<Trigger>,
    /// Wall-clock time of the entry
    pub entered_at: DateTime<Utc>,
}

/// Bounded, ordered history of state entries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitHistory {
    limit: usize,
    records: VecDeque<TransitRecord>,
}

impl TransitHistory {
    /// Create an empty history holding at most `limit` records. A limit of
    /// zero disables recording.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            records: VecDeque::with_capacity(limit.min(1024)),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn record(&mut self, record: TransitRecord) {
        if self.limit == 0 {
            return;
        }
        while self.records.len() >= self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Retained records, oldest first.
    pub fn records(&self) -> Vec<TransitRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<&TransitRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// States traversed, in order: the `from` of the oldest retained record
    /// (if any), then the `to` of every record.
    pub fn get_path(&self) -> Vec<StateId> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(from) = self.records.front().and_then(|r| r.from) {
            path.push(from);
        }
        path.extend(self.records.iter().map(|r| r.to));
        path
    }

    /// Wall-clock span between the oldest and newest retained records.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.records.front()?;
        let last = self.records.back()?;
        last.entered_at
            .signed_duration_since(first.entered_at)
            .to_std()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn record(transit: u64, from: Option<StateId>, to: StateId) -> TransitRecord {
        TransitRecord {
            transit,
            from,
            to,
            trigger: from.map(|_| Trigger::Event(transit as i64)),
            entered_at: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = TransitHistory::new(4);
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert!(history.last().is_none());
    }

    #[test]
    fn record_appends_in_order() {
        let mut history = TransitHistory::new(4);
        history.record(record(1, None, 1));
        history.record(record(2, Some(1), 2));
        history.record(record(3, Some(2), 3));

        assert_eq!(history.len(), 3);
        assert_eq!(history.get_path(), vec![1, 2, 3]);
        assert_eq!(history.last().map(|r| r.transit), Some(3));
    }

    #[test]
    fn oldest_records_are_dropped_at_limit() {
        let mut history = TransitHistory::new(2);
        history.record(record(1, None, 1));
        history.record(record(2, Some(1), 2));
        history.record(record(3, Some(2), 3));

        let transits: Vec<u64> = history.records().iter().map(|r| r.transit).collect();
        assert_eq!(transits, vec![2, 3]);
        assert_eq!(history.get_path(), vec![1, 2, 3]);
    }

    #[test]
    fn zero_limit_disables_recording() {
        let mut history = TransitHistory::new(0);
        history.record(record(1, None, 1));
        assert!(history.is_empty());
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let mut history = TransitHistory::new(4);

        let mut first = record(1, None, 1);
        first.entered_at = start;
        let mut second = record(2, Some(1), 2);
        second.entered_at = start + ChronoDuration::milliseconds(250);

        history.record(first);
        history.record(second);

        assert_eq!(history.duration(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn history_serializes_correctly() {
        let mut history = TransitHistory::new(4);
        history.record(record(1, None, 1));
        history.record(record(2, Some(1), 2));

        let json = serde_json::to_string(&history).unwrap();
        let restored: TransitHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.records(), history.records());
        assert_eq!(restored.limit(), 4);
    }
}
