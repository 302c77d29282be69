//! Read interface to the game client's live object table
//!
//! The tracker never talks to the game client directly. The host binding
//! implements [`WorldSnapshotSource`] over its object table and hands the
//! tracker one [`WorldSnapshot`] per poll tick.
//!
//! ```text
//!   game client object table
//!            │
//!   WorldSnapshotSource::snapshot()   (host binding)
//!            │
//!            ▼
//!      WorldSnapshot  ──►  TargetingTracker::tick
//! ```

mod snapshot;

pub use snapshot::{StaticSnapshot, StaticSource};

use serde::{Deserialize, Serialize};

use iseeyou_types::EntityId;

/// Category of a live object. Only players count as targeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    #[default]
    Player,
    BattleNpc,
    EventNpc,
    Companion,
    Other,
}

/// A single entry of the live object table at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveObject {
    pub id: EntityId,
    /// Object this entity currently has targeted, if any
    #[serde(default, rename = "target")]
    pub target_id: Option<EntityId>,
    #[serde(default)]
    pub kind: ObjectKind,
    pub name: String,
}

impl LiveObject {
    pub fn player(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target_id: None,
            kind: ObjectKind::Player,
            name: name.into(),
        }
    }

    pub fn with_kind(mut self, kind: ObjectKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn targeting(mut self, target: impl Into<EntityId>) -> Self {
        self.target_id = Some(target.into());
        self
    }

    pub fn is_player(&self) -> bool {
        self.kind == ObjectKind::Player
    }

    /// Returns true if this object is a player whose target is `id`.
    pub fn is_player_targeting(&self, id: EntityId) -> bool {
        self.is_player() && self.target_id == Some(id)
    }
}

/// The logged-in character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalActor {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub in_combat: bool,
}

impl LocalActor {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            in_combat: false,
        }
    }
}

/// Live world state at the moment a tick runs.
pub trait WorldSnapshot {
    /// None when no character is logged in
    fn local_actor(&self) -> Option<&LocalActor>;

    /// Lazily enumerate live objects. Order is unspecified.
    fn live_objects(&self) -> impl Iterator<Item = &LiveObject> + '_;

    fn find_object(&self, id: EntityId) -> Option<&LiveObject> {
        self.live_objects().find(|obj| obj.id == id)
    }

    /// Returns true if `id` resolves to the local actor or a live object.
    fn is_live(&self, id: EntityId) -> bool {
        self.local_actor().is_some_and(|actor| actor.id == id) || self.find_object(id).is_some()
    }

    fn is_local_actor(&self, id: EntityId) -> bool {
        self.local_actor().is_some_and(|actor| actor.id == id)
    }

    fn local_actor_in_combat(&self) -> bool {
        self.local_actor().is_some_and(|actor| actor.in_combat)
    }
}

/// Produces a fresh snapshot each time a tick is due.
pub trait WorldSnapshotSource {
    type Snapshot: WorldSnapshot;

    fn snapshot(&self) -> Self::Snapshot;
}
