//! In-memory snapshots
//!
//! `StaticSnapshot` is a plain owned copy of the world. It backs the replay
//! CLI and the tests, and is what a host binding can fill if copying its
//! object table once per tick is acceptable.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use iseeyou_types::EntityId;

use super::{LiveObject, LocalActor, WorldSnapshot, WorldSnapshotSource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticSnapshot {
    #[serde(default, rename = "local")]
    pub local_actor: Option<LocalActor>,
    #[serde(default)]
    pub objects: Vec<LiveObject>,
}

impl StaticSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with the given local actor also present in the object table.
    pub fn with_local(actor: LocalActor) -> Self {
        let object = LiveObject::player(actor.id, actor.name.clone());
        Self {
            local_actor: Some(actor),
            objects: vec![object],
        }
    }

    pub fn in_combat(mut self, in_combat: bool) -> Self {
        if let Some(actor) = &mut self.local_actor {
            actor.in_combat = in_combat;
        }
        self
    }

    pub fn object(mut self, object: LiveObject) -> Self {
        self.push(object);
        self
    }

    /// Insert or replace an object by id
    pub fn push(&mut self, object: LiveObject) {
        match self.objects.iter_mut().find(|o| o.id == object.id) {
            Some(existing) => *existing = object,
            None => self.objects.push(object),
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<LiveObject> {
        let idx = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(idx))
    }
}

impl WorldSnapshot for StaticSnapshot {
    fn local_actor(&self) -> Option<&LocalActor> {
        self.local_actor.as_ref()
    }

    fn live_objects(&self) -> impl Iterator<Item = &LiveObject> + '_ {
        self.objects.iter()
    }
}

/// A source that hands out clones of a replaceable snapshot.
///
/// Cloning the source shares the underlying snapshot, so a driver can keep
/// one handle to update the world while the session owns the other.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    current: Arc<Mutex<StaticSnapshot>>,
}

impl StaticSource {
    pub fn new(snapshot: StaticSnapshot) -> Self {
        Self {
            current: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub fn set(&self, snapshot: StaticSnapshot) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    pub fn update(&self, f: impl FnOnce(&mut StaticSnapshot)) {
        f(&mut self.current.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

impl WorldSnapshotSource for StaticSource {
    type Snapshot = StaticSnapshot;

    fn snapshot(&self) -> StaticSnapshot {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::ObjectKind;

    #[test]
    fn test_local_actor_is_live() {
        let snapshot = StaticSnapshot::with_local(LocalActor::new(1, "Hero"));
        assert!(snapshot.is_live(EntityId(1)));
        assert!(snapshot.is_local_actor(EntityId(1)));
        assert!(!snapshot.is_live(EntityId(2)));
    }

    #[test]
    fn test_push_replaces_by_id() {
        let mut snapshot = StaticSnapshot::new()
            .object(LiveObject::player(7, "Stalker").targeting(1))
            .object(LiveObject::player(8, "Bystander"));
        snapshot.push(LiveObject::player(7, "Stalker"));

        assert_eq!(snapshot.objects.len(), 2);
        assert_eq!(snapshot.find_object(EntityId(7)).unwrap().target_id, None);
    }

    #[test]
    fn test_only_players_count_as_targeters() {
        let npc = LiveObject::player(9, "Striking Dummy")
            .with_kind(ObjectKind::BattleNpc)
            .targeting(1);
        let player = LiveObject::player(7, "Stalker").targeting(1);
        assert!(!npc.is_player_targeting(EntityId(1)));
        assert!(player.is_player_targeting(EntityId(1)));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let snapshot: StaticSnapshot = toml::from_str(
            r#"
local = { id = 1, name = "Hero", in_combat = true }
objects = [
    { id = 1, name = "Hero" },
    { id = 7, name = "Stalker", target = 1 },
    { id = 9, name = "Striking Dummy", kind = "battle_npc", target = 1 },
]
"#,
        )
        .unwrap();

        assert!(snapshot.local_actor_in_combat());
        assert_eq!(snapshot.objects.len(), 3);
        assert!(snapshot.objects[1].is_player_targeting(EntityId(1)));
        assert_eq!(snapshot.objects[2].kind, ObjectKind::BattleNpc);
        assert!(!snapshot.objects[2].is_player_targeting(EntityId(1)));
        assert_eq!(snapshot.objects[0].target_id, None);
    }

    #[test]
    fn test_source_shares_snapshot_between_clones() {
        let source = StaticSource::default();
        let driver = source.clone();
        driver.set(StaticSnapshot::with_local(LocalActor::new(1, "Hero")));
        driver.update(|s| s.push(LiveObject::player(7, "Stalker").targeting(1)));

        let snapshot = source.snapshot();
        assert_eq!(snapshot.objects.len(), 2);
        assert!(snapshot.local_actor().is_some());
    }
}
