use chrono::NaiveDateTime;

use iseeyou_types::EntityId;

use crate::context::{IStr, resolve};

/// Direction of a targeting transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetingKind {
    Started,
    Stopped,
}

/// Emitted by the tracker when a player starts or stops targeting a
/// tracked player. These are "interesting things that happened" between two
/// poll ticks, consumed by chat, sound, logging and redraw adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetingEvent {
    pub kind: TargetingKind,
    pub targeter_id: EntityId,
    pub targeter_name: IStr,
    /// The tracked player being targeted
    pub target_id: EntityId,
    pub target_name: IStr,
    pub is_target_local_actor: bool,
    /// Tick time the transition was detected
    pub timestamp: NaiveDateTime,
}

impl TargetingEvent {
    pub fn is_started(&self) -> bool {
        self.kind == TargetingKind::Started
    }

    pub fn targeter_name(&self) -> &'static str {
        resolve(self.targeter_name)
    }

    pub fn target_name(&self) -> &'static str {
        resolve(self.target_name)
    }
}
