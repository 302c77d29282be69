//! Targeting tracker
//!
//! Owns the registry of tracked players and their colors, runs the per-tick
//! diff for every registered player and forwards transitions to the event
//! sink.

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::{debug, info, warn};

use iseeyou_types::{Color, EntityId, HistoryQuery, TrackerConfig, clamp_color, highlight_colors};

use super::colors::ColorAssigner;
use super::history::TargetHistoryEntry;
use super::player::{PlayerDiff, PlayerUpdate, Targeter, TrackedPlayerState};
use crate::clock::{Clock, SystemClock};
use crate::context::IStr;
use crate::events::{EventSink, NullSink, TargetingEvent, TargetingKind};
use crate::world::WorldSnapshot;

/// Outcome of a register call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Registration {
    Registered { color: Color },
    /// The id was already tracked; nothing changed
    AlreadyTracked,
}

/// Why a tick did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No character logged in
    NoLocalActor,
    /// Local actor in combat while in-combat tracking is disabled
    InCombat,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub skipped: Option<SkipReason>,
    /// Players with at least one transition, in ascending id order
    pub diffs: Vec<PlayerDiff>,
    /// Registered players missing from the snapshot
    pub stale: Vec<EntityId>,
}

impl TickReport {
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    pub fn diff_for(&self, player_id: EntityId) -> Option<&PlayerDiff> {
        self.diffs.iter().find(|d| d.player_id == player_id)
    }

    pub fn event_count(&self) -> usize {
        self.diffs
            .iter()
            .map(|d| d.started.len() + d.stopped.len())
            .sum()
    }
}

/// History row annotated for the recent targets list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentTarget {
    pub entry: TargetHistoryEntry,
    /// Targeter is still targeting as of the last tick
    pub is_current: bool,
}

impl RecentTarget {
    /// Row color in the recent targets list
    pub fn color(&self) -> Color {
        if self.is_current {
            highlight_colors::CURRENT_TARGET
        } else {
            highlight_colors::FADED
        }
    }
}

/// Tracks which players target the registered players.
///
/// All mutation goes through `&mut self`; callers that share the tracker
/// across threads wrap it in a single mutex (see `TrackerSession`).
pub struct TargetingTracker {
    config: TrackerConfig,
    clock: Arc<dyn Clock>,
    sink: Box<dyn EventSink>,
    color_assigner: ColorAssigner,

    registry: HashMap<EntityId, TrackedPlayerState>,
    /// Same key set as `registry`
    colors: HashMap<EntityId, Color>,
}

impl fmt::Debug for TargetingTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetingTracker")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("colors", &self.colors)
            .finish_non_exhaustive()
    }
}

impl Default for TargetingTracker {
    fn default() -> Self {
        Self::new(
            TrackerConfig::default(),
            Arc::new(SystemClock),
            Box::new(NullSink),
        )
    }
}

impl TargetingTracker {
    /// Create a tracker with injected clock and event sink
    pub fn new(config: TrackerConfig, clock: Arc<dyn Clock>, mut sink: Box<dyn EventSink>) -> Self {
        sink.config_changed(&config);
        Self {
            config,
            clock,
            sink,
            color_assigner: ColorAssigner::new(),
            registry: HashMap::new(),
            colors: HashMap::new(),
        }
    }

    /// Replace the color generator (e.g. with a seeded one)
    pub fn with_color_assigner(mut self, color_assigner: ColorAssigner) -> Self {
        self.color_assigner = color_assigner;
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Apply a new configuration. Histories are trimmed to the new bound
    /// right away rather than on the next start event.
    pub fn set_config(&mut self, config: TrackerConfig) {
        let limit = config.history_limit();
        for state in self.registry.values_mut() {
            state.trim_history(limit);
        }
        self.sink.config_changed(&config);
        self.config = config;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────

    pub fn register_player(
        &mut self,
        id: EntityId,
        name: &str,
        color_override: Option<Color>,
    ) -> Registration {
        if let Some(existing) = self.registry.get(&id) {
            info!(player = existing.name(), %id, "Player already tracked");
            return Registration::AlreadyTracked;
        }

        let color = match color_override {
            Some(color) => clamp_color(color),
            None => self.color_assigner.generate_color(),
        };
        self.registry
            .insert(id, TrackedPlayerState::new(id, name, self.clock.now()));
        self.colors.insert(id, color);

        info!(player = name, %id, ?color, "Registered player");
        Registration::Registered { color }
    }

    /// Returns false if the id was not tracked
    pub fn unregister_player(&mut self, id: EntityId) -> bool {
        self.colors.remove(&id);
        match self.registry.remove(&id) {
            Some(state) => {
                info!(player = state.name(), %id, "Unregistered player");
                true
            }
            None => false,
        }
    }

    /// Returns false (and changes nothing) if the id is not tracked
    pub fn update_player_color(&mut self, id: EntityId, color: Color) -> bool {
        match self.colors.get_mut(&id) {
            Some(slot) => {
                *slot = clamp_color(color);
                true
            }
            None => false,
        }
    }

    pub fn clear_history(&mut self, id: EntityId) -> bool {
        match self.registry.get_mut(&id) {
            Some(state) => {
                state.clear_history();
                true
            }
            None => false,
        }
    }

    pub fn clear_all_history(&mut self) {
        for state in self.registry.values_mut() {
            state.clear_history();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn is_tracked(&self, id: EntityId) -> bool {
        self.registry.contains_key(&id)
    }

    pub fn player(&self, id: EntityId) -> Option<&TrackedPlayerState> {
        self.registry.get(&id)
    }

    /// Case-insensitive display name lookup
    pub fn find_by_name(&self, name: &str) -> Option<&TrackedPlayerState> {
        let wanted = name.to_lowercase();
        self.all_histories()
            .into_iter()
            .map(|(_, state)| state)
            .find(|state| state.name().to_lowercase() == wanted)
    }

    /// Every tracked player, in ascending id order
    pub fn all_histories(&self) -> Vec<(EntityId, &TrackedPlayerState)> {
        let mut all: Vec<_> = self.registry.iter().map(|(id, s)| (*id, s)).collect();
        all.sort_unstable_by_key(|(id, _)| *id);
        all
    }

    pub fn colors(&self) -> &HashMap<EntityId, Color> {
        &self.colors
    }

    pub fn color_of(&self, id: EntityId) -> Option<Color> {
        self.colors.get(&id).copied()
    }

    /// Empty if the id is not tracked
    pub fn current_targeters_of(&self, id: EntityId) -> &[Targeter] {
        self.registry
            .get(&id)
            .map(|s| s.current_targeters())
            .unwrap_or(&[])
    }

    /// Nameplate highlight for a live object: the color of a tracked player
    /// the object is currently targeting. When it targets several (only
    /// possible across ticks of a stale player), the lowest player id wins.
    pub fn highlight_color_for(&self, object_id: EntityId) -> Option<Color> {
        self.registry
            .values()
            .filter(|state| state.is_targeted_by(object_id))
            .map(|state| state.id)
            .min()
            .and_then(|id| self.color_of(id))
    }

    /// History rows with a flag for targeters that are still targeting
    pub fn recent_targets(&self, id: EntityId) -> Vec<RecentTarget> {
        let Some(state) = self.registry.get(&id) else {
            return Vec::new();
        };
        state
            .history()
            .iter()
            .map(|entry| RecentTarget {
                entry: *entry,
                is_current: state.is_targeted_by(entry.targeter_id),
            })
            .collect()
    }

    /// Filtered/sorted history table for one player
    pub fn query_history(&self, id: EntityId, query: &HistoryQuery) -> Vec<TargetHistoryEntry> {
        self.registry
            .get(&id)
            .map(|s| s.history().query(query))
            .unwrap_or_default()
    }

    /// Human readable dump of current targeters and history per player
    pub fn debug_report(&self) -> String {
        let mut out = String::new();
        if self.registry.is_empty() {
            out.push_str("No players are being tracked.\n");
            return out;
        }

        for (id, state) in self.all_histories() {
            let _ = writeln!(out, "{} [{}]", state.name(), id);

            if state.current_targeters().is_empty() {
                let _ = writeln!(out, "  No players are currently targeting {}.", state.name());
            } else {
                let _ = writeln!(out, "  Current targeting players:");
                for targeter in state.current_targeters() {
                    let _ = writeln!(out, "  - {}", targeter.name());
                }
            }

            if state.history().is_empty() {
                let _ = writeln!(out, "  No target history available.");
            } else {
                let _ = writeln!(out, "  Target history:");
                for entry in state.history().iter() {
                    let _ = writeln!(
                        out,
                        "  - {} ({})",
                        entry.name(),
                        entry.timestamp.format("%H:%M:%S")
                    );
                }
            }
        }
        out
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tick
    // ─────────────────────────────────────────────────────────────────────────

    /// Diff every tracked player against the snapshot and emit transitions.
    ///
    /// Skipped entirely when the snapshot has no local actor.
    pub fn tick(&mut self, snapshot: &impl WorldSnapshot) -> TickReport {
        let Some(local) = snapshot.local_actor() else {
            debug!("No local actor, skipping tick");
            return TickReport::skipped(SkipReason::NoLocalActor);
        };
        let local_id = local.id;
        let now = self.clock.now();
        let limit = self.config.history_limit();

        let mut ids: Vec<EntityId> = self.registry.keys().copied().collect();
        ids.sort_unstable();

        let mut report = TickReport::default();
        for id in ids {
            let Some(state) = self.registry.get_mut(&id) else {
                continue;
            };
            match state.update(snapshot, now, limit) {
                PlayerUpdate::Stale => report.stale.push(id),
                PlayerUpdate::Unchanged => {}
                PlayerUpdate::Changed(diff) => {
                    let context = EventContext {
                        target_id: id,
                        target_name: state.name_key(),
                        is_local: id == local_id,
                        timestamp: now,
                    };
                    emit_diff(self.sink.as_mut(), &diff, &context);
                    report.diffs.push(diff);
                }
            }
        }

        if !report.diffs.is_empty() {
            self.sink.redraw_requested();
        }
        if let Err(e) = self.sink.tick_finished() {
            warn!(error = %e, "Event sink failed to finish tick");
        }
        report
    }
}

struct EventContext {
    target_id: EntityId,
    target_name: IStr,
    is_local: bool,
    timestamp: chrono::NaiveDateTime,
}

/// Send every transition of one player to the sink. Failures are logged and
/// do not stop the remaining events.
fn emit_diff(sink: &mut dyn EventSink, diff: &PlayerDiff, ctx: &EventContext) {
    let transitions = diff
        .started
        .iter()
        .map(|t| (TargetingKind::Started, t))
        .chain(diff.stopped.iter().map(|t| (TargetingKind::Stopped, t)));

    for (kind, targeter) in transitions {
        let event = TargetingEvent {
            kind,
            targeter_id: targeter.id,
            targeter_name: targeter.name,
            target_id: ctx.target_id,
            target_name: ctx.target_name,
            is_target_local_actor: ctx.is_local,
            timestamp: ctx.timestamp,
        };
        if let Err(e) = sink.handle_event(&event) {
            warn!(
                error = %e,
                targeter = targeter.name(),
                kind = ?kind,
                "Event sink failed, continuing"
            );
        }
    }
}
