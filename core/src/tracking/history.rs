//! Per-player targeting history
//!
//! History is newest-first and holds at most one entry per targeter: a new
//! start for a known targeter moves it to the front with the new timestamp.

use std::cmp::Ordering;
use std::collections::VecDeque;

use chrono::NaiveDateTime;

use iseeyou_types::{EntityId, HistoryQuery, HistorySortColumn, SortDirection};

use crate::context::{IStr, resolve};

/// One start-targeting event as remembered in history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetHistoryEntry {
    pub targeter_id: EntityId,
    pub targeter_name: IStr,
    /// When the targeting start was detected
    pub timestamp: NaiveDateTime,
}

impl TargetHistoryEntry {
    pub fn new(targeter_id: EntityId, targeter_name: IStr, timestamp: NaiveDateTime) -> Self {
        Self {
            targeter_id,
            targeter_name,
            timestamp,
        }
    }

    pub fn name(&self) -> &'static str {
        resolve(self.targeter_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetHistory {
    entries: VecDeque<TargetHistoryEntry>,
}

impl TargetHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an entry, dropping any older entry for the same targeter.
    /// Does not trim; call [`TargetHistory::trim`] after a batch of inserts.
    pub fn record(&mut self, entry: TargetHistoryEntry) {
        self.entries.retain(|e| e.targeter_id != entry.targeter_id);
        self.entries.push_front(entry);
    }

    /// Drop the oldest entries until at most `limit` remain.
    /// Returns the number of entries dropped.
    pub fn trim(&mut self, limit: usize) -> usize {
        let excess = self.entries.len().saturating_sub(limit);
        self.entries.truncate(limit);
        excess
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries newest-first
    pub fn iter(&self) -> impl Iterator<Item = &TargetHistoryEntry> {
        self.entries.iter()
    }

    pub fn newest(&self) -> Option<&TargetHistoryEntry> {
        self.entries.front()
    }

    pub fn get(&self, targeter_id: EntityId) -> Option<&TargetHistoryEntry> {
        self.entries.iter().find(|e| e.targeter_id == targeter_id)
    }

    pub fn contains(&self, targeter_id: EntityId) -> bool {
        self.get(targeter_id).is_some()
    }

    /// Filtered and sorted view for history tables.
    pub fn query(&self, query: &HistoryQuery) -> Vec<TargetHistoryEntry> {
        let mut rows: Vec<TargetHistoryEntry> = self
            .entries
            .iter()
            .filter(|e| query.matches_name(e.name()))
            .copied()
            .collect();

        match query.sort_by {
            // Stored order is already newest-first
            HistorySortColumn::Recency => {}
            HistorySortColumn::Name => rows.sort_by(by_name),
            HistorySortColumn::Time => rows.sort_by_key(|e| e.timestamp),
        }
        directed(rows, query.direction)
    }
}

/// Case-insensitive name order, newest first among equal names
fn by_name(a: &TargetHistoryEntry, b: &TargetHistoryEntry) -> Ordering {
    a.name()
        .to_lowercase()
        .cmp(&b.name().to_lowercase())
        .then(b.timestamp.cmp(&a.timestamp))
}

fn directed(mut rows: Vec<TargetHistoryEntry>, direction: SortDirection) -> Vec<TargetHistoryEntry> {
    if direction == SortDirection::Descending {
        rows.reverse();
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::intern;
    use chrono::TimeDelta;

    fn at(secs: i64) -> NaiveDateTime {
        NaiveDateTime::default() + TimeDelta::seconds(secs)
    }

    fn entry(id: u64, name: &str, secs: i64) -> TargetHistoryEntry {
        TargetHistoryEntry::new(EntityId(id), intern(name), at(secs))
    }

    fn ids(history: &TargetHistory) -> Vec<u64> {
        history.iter().map(|e| e.targeter_id.raw()).collect()
    }

    #[test]
    fn test_record_moves_repeat_targeter_to_front() {
        let mut history = TargetHistory::new();
        history.record(entry(1, "A", 0));
        history.record(entry(2, "B", 1));
        history.record(entry(1, "A", 2));

        assert_eq!(ids(&history), vec![1, 2]);
        assert_eq!(history.get(EntityId(1)).unwrap().timestamp, at(2));
        assert!(history.contains(EntityId(2)));
        assert!(!history.contains(EntityId(3)));
    }

    #[test]
    fn test_trim_drops_oldest() {
        let mut history = TargetHistory::new();
        for id in 1..=5 {
            history.record(entry(id, "x", id as i64));
        }
        assert_eq!(history.trim(3), 2);
        assert_eq!(ids(&history), vec![5, 4, 3]);
        assert_eq!(history.trim(0), 3);
        assert!(history.is_empty());
    }

    #[test]
    fn test_query_filter_and_sort() {
        let mut history = TargetHistory::new();
        history.record(entry(1, "Zed Stalker", 10));
        history.record(entry(2, "alice", 20));
        history.record(entry(3, "Bob Stalker", 5));

        let by_name = history.query(
            &HistoryQuery::default().sorted(HistorySortColumn::Name, SortDirection::Ascending),
        );
        let names: Vec<_> = by_name.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["alice", "Bob Stalker", "Zed Stalker"]);

        let stalkers = history.query(
            &HistoryQuery::filtered("stalker").sorted(HistorySortColumn::Time, SortDirection::Descending),
        );
        let ids: Vec<_> = stalkers.iter().map(|e| e.targeter_id.raw()).collect();
        assert_eq!(ids, vec![1, 3]);

        let oldest_first = history.query(
            &HistoryQuery::default().sorted(HistorySortColumn::Recency, SortDirection::Descending),
        );
        assert_eq!(oldest_first.first().unwrap().targeter_id, EntityId(1));
    }
}
