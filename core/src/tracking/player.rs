//! Runtime state of one tracked player
//!
//! Each poll tick the state is diffed against the snapshot:
//!
//! ```text
//!   previous tick          this tick
//!   current = {A, B}  ──►  new = {B, C}
//!                          started = {C}, stopped = {A}
//!                          previous = {A, B}, current = {B, C}
//! ```

use std::collections::HashSet;

use chrono::NaiveDateTime;

use iseeyou_types::EntityId;

use super::history::{TargetHistory, TargetHistoryEntry};
use crate::context::{IStr, intern, resolve};
use crate::world::WorldSnapshot;

/// A live player targeting a tracked player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Targeter {
    pub id: EntityId,
    pub name: IStr,
}

impl Targeter {
    pub fn name(&self) -> &'static str {
        resolve(self.name)
    }
}

/// Transitions produced by one player's update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDiff {
    pub player_id: EntityId,
    /// In snapshot order
    pub started: Vec<Targeter>,
    /// In the order they were listed on the previous tick
    pub stopped: Vec<Targeter>,
}

impl PlayerDiff {
    pub fn is_empty(&self) -> bool {
        self.started.is_empty() && self.stopped.is_empty()
    }

    pub fn started_ids(&self) -> Vec<EntityId> {
        self.started.iter().map(|t| t.id).collect()
    }

    pub fn stopped_ids(&self) -> Vec<EntityId> {
        self.stopped.iter().map(|t| t.id).collect()
    }
}

/// Result of [`TrackedPlayerState::update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerUpdate {
    /// Player not present in the snapshot; state untouched
    Stale,
    Unchanged,
    Changed(PlayerDiff),
}

/// Targeting state for a single registered player.
#[derive(Debug, Clone)]
pub struct TrackedPlayerState {
    pub id: EntityId,
    name: IStr,
    current_targeters: Vec<Targeter>,
    previous_targeters: Vec<Targeter>,
    history: TargetHistory,
    /// When this player was registered (for list windows)
    pub registered_at: NaiveDateTime,
}

impl TrackedPlayerState {
    pub fn new(id: EntityId, name: &str, registered_at: NaiveDateTime) -> Self {
        Self {
            id,
            name: intern(name),
            current_targeters: Vec::new(),
            previous_targeters: Vec::new(),
            history: TargetHistory::new(),
            registered_at,
        }
    }

    pub fn name(&self) -> &'static str {
        resolve(self.name)
    }

    pub fn name_key(&self) -> IStr {
        self.name
    }

    pub fn current_targeters(&self) -> &[Targeter] {
        &self.current_targeters
    }

    pub fn previous_targeters(&self) -> &[Targeter] {
        &self.previous_targeters
    }

    pub fn is_targeted_by(&self, targeter_id: EntityId) -> bool {
        self.current_targeters.iter().any(|t| t.id == targeter_id)
    }

    pub fn history(&self) -> &TargetHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub(crate) fn trim_history(&mut self, limit: usize) -> usize {
        self.history.trim(limit)
    }

    /// Diff this player against the snapshot and fold the result into history.
    ///
    /// `now` stamps new history entries, `history_limit` bounds the history
    /// after the inserts.
    pub fn update(
        &mut self,
        snapshot: &impl WorldSnapshot,
        now: NaiveDateTime,
        history_limit: usize,
    ) -> PlayerUpdate {
        if !snapshot.is_live(self.id) {
            return PlayerUpdate::Stale;
        }

        let mut seen = HashSet::new();
        let new_targeters: Vec<Targeter> = snapshot
            .live_objects()
            .filter(|obj| obj.is_player_targeting(self.id))
            .filter(|obj| seen.insert(obj.id))
            .map(|obj| Targeter {
                id: obj.id,
                name: intern(&obj.name),
            })
            .collect();

        let old_ids: HashSet<EntityId> = self.current_targeters.iter().map(|t| t.id).collect();
        let started: Vec<Targeter> = new_targeters
            .iter()
            .filter(|t| !old_ids.contains(&t.id))
            .copied()
            .collect();
        let stopped: Vec<Targeter> = self
            .current_targeters
            .iter()
            .filter(|t| !seen.contains(&t.id))
            .copied()
            .collect();

        for targeter in &started {
            self.history
                .record(TargetHistoryEntry::new(targeter.id, targeter.name, now));
            tracing::debug!(
                player = self.name(),
                targeter = targeter.name(),
                time = %now.format("%H:%M"),
                "Inserted into target history"
            );
        }
        self.history.trim(history_limit);

        self.previous_targeters = std::mem::replace(&mut self.current_targeters, new_targeters);

        if started.is_empty() && stopped.is_empty() {
            PlayerUpdate::Unchanged
        } else {
            PlayerUpdate::Changed(PlayerDiff {
                player_id: self.id,
                started,
                stopped,
            })
        }
    }
}
