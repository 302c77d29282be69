//! Tracker session
//!
//! Wires a snapshot source, the poll scheduler and a shared tracker together.
//! The host owns one session for the lifetime of the add-on and forwards its
//! frame, login and config callbacks to it. UI code gets a [`TrackerHandle`]
//! that shares the same tracker behind one mutex.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use iseeyou_types::{Color, EntityId, TrackerConfig};

use crate::scheduler::{FrameOutcome, PollScheduler};
use crate::tracking::{Registration, TargetingTracker, Targeter, TrackedPlayerState};
use crate::world::{LocalActor, WorldSnapshot, WorldSnapshotSource};

fn lock(tracker: &Mutex<TargetingTracker>) -> MutexGuard<'_, TargetingTracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct TrackerSession<S: WorldSnapshotSource> {
    source: S,
    scheduler: PollScheduler,
    tracker: Arc<Mutex<TargetingTracker>>,
}

impl<S: WorldSnapshotSource> TrackerSession<S> {
    /// Build a session and register the local actor if one is logged in.
    pub fn new(source: S, tracker: TargetingTracker) -> Self {
        let scheduler = PollScheduler::from_config(tracker.config());
        let mut session = Self {
            source,
            scheduler,
            tracker: Arc::new(Mutex::new(tracker)),
        };
        session.on_login();
        session
    }

    pub fn handle(&self) -> TrackerHandle {
        TrackerHandle {
            tracker: Arc::clone(&self.tracker),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    /// Per-frame callback from the host
    pub fn on_frame_update(&mut self, delta: Duration) -> FrameOutcome {
        let mut tracker = lock(&self.tracker);
        self.scheduler.run_frame(delta, &self.source, &mut tracker)
    }

    /// Login callback. Registers the local actor with the configured color,
    /// or refreshes that color if the actor is already tracked.
    ///
    /// Returns the local actor's id, or None when nobody is logged in.
    pub fn on_login(&mut self) -> Option<EntityId> {
        let snapshot = self.source.snapshot();
        let Some(LocalActor { id, name, .. }) = snapshot.local_actor().cloned() else {
            debug!("No local actor at login");
            return None;
        };

        let mut tracker = lock(&self.tracker);
        let color = tracker.config().local_actor_color();
        if let Registration::AlreadyTracked = tracker.register_player(id, &name, Some(color)) {
            tracker.update_player_color(id, color);
        }
        Some(id)
    }

    /// Config changed callback; applies to both scheduler and tracker.
    pub fn apply_config(&mut self, config: TrackerConfig) {
        self.scheduler.apply_config(&config);
        lock(&self.tracker).set_config(config);
        info!(
            interval_ms = self.scheduler.interval().as_millis() as u64,
            "Applied tracker config"
        );
    }
}

/// Cloneable, thread-safe access to a session's tracker for UI and commands.
#[derive(Clone)]
pub struct TrackerHandle {
    tracker: Arc<Mutex<TargetingTracker>>,
}

impl TrackerHandle {
    /// Run a closure against the locked tracker
    pub fn with<R>(&self, f: impl FnOnce(&mut TargetingTracker) -> R) -> R {
        f(&mut lock(&self.tracker))
    }

    pub fn register_player(&self, id: EntityId, name: &str, color: Option<Color>) -> Registration {
        self.with(|t| t.register_player(id, name, color))
    }

    pub fn unregister_player(&self, id: EntityId) -> bool {
        self.with(|t| t.unregister_player(id))
    }

    pub fn update_player_color(&self, id: EntityId, color: Color) -> bool {
        self.with(|t| t.update_player_color(id, color))
    }

    pub fn clear_history(&self, id: EntityId) -> bool {
        self.with(|t| t.clear_history(id))
    }

    pub fn clear_all_history(&self) {
        self.with(|t| t.clear_all_history())
    }

    /// Owned copy of every tracked player's state, ascending by id
    pub fn all_histories(&self) -> Vec<(EntityId, TrackedPlayerState)> {
        self.with(|t| {
            t.all_histories()
                .into_iter()
                .map(|(id, state)| (id, state.clone()))
                .collect()
        })
    }

    pub fn colors(&self) -> HashMap<EntityId, Color> {
        self.with(|t| t.colors().clone())
    }

    pub fn current_targeters_of(&self, id: EntityId) -> Vec<Targeter> {
        self.with(|t| t.current_targeters_of(id).to_vec())
    }

    pub fn highlight_color_for(&self, object_id: EntityId) -> Option<Color> {
        self.with(|t| t.highlight_color_for(object_id))
    }

    pub fn debug_report(&self) -> String {
        self.with(|t| t.debug_report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::events::RecordingSink;
    use crate::world::{LiveObject, StaticSnapshot, StaticSource};
    use iseeyou_types::highlight_colors;

    const HERO: EntityId = EntityId(1);

    fn make_session(source: StaticSource) -> (TrackerSession<StaticSource>, RecordingSink) {
        let sink = RecordingSink::new();
        let tracker = TargetingTracker::new(
            TrackerConfig::default(),
            Arc::new(ManualClock::default()),
            Box::new(sink.clone()),
        );
        (TrackerSession::new(source, tracker), sink)
    }

    #[test]
    fn test_local_actor_registered_at_startup() {
        let source = StaticSource::new(StaticSnapshot::with_local(LocalActor::new(HERO, "Hero")));
        let (session, _sink) = make_session(source);

        let handle = session.handle();
        assert_eq!(handle.colors().get(&HERO), Some(&highlight_colors::LOCAL_ACTOR));
        assert_eq!(handle.all_histories().len(), 1);
    }

    #[test]
    fn test_login_after_startup_registers_late() {
        let source = StaticSource::default();
        let (mut session, _sink) = make_session(source.clone());
        assert!(session.handle().all_histories().is_empty());

        source.set(StaticSnapshot::with_local(LocalActor::new(HERO, "Hero")));
        assert_eq!(session.on_login(), Some(HERO));
        assert_eq!(session.handle().all_histories()[0].1.name(), "Hero");
    }

    #[test]
    fn test_relogin_refreshes_color_only() {
        let source = StaticSource::new(StaticSnapshot::with_local(LocalActor::new(HERO, "Hero")));
        let (mut session, _sink) = make_session(source);
        let handle = session.handle();
        handle.update_player_color(HERO, [0.1, 0.2, 0.3, 1.0]);

        session.apply_config(TrackerConfig {
            local_actor_color: [0.9, 0.9, 0.9, 1.0],
            ..TrackerConfig::default()
        });
        session.on_login();

        assert_eq!(handle.colors().get(&HERO), Some(&[0.9, 0.9, 0.9, 1.0]));
        assert_eq!(handle.all_histories().len(), 1);
    }

    #[test]
    fn test_frames_drive_ticks() {
        let source = StaticSource::new(StaticSnapshot::with_local(LocalActor::new(HERO, "Hero")));
        let (mut session, sink) = make_session(source.clone());

        source.update(|s| s.push(LiveObject::player(7, "Stalker").targeting(1)));
        assert_eq!(
            session.on_frame_update(Duration::from_millis(60)),
            FrameOutcome::Waiting
        );
        let outcome = session.on_frame_update(Duration::from_millis(60));
        assert_eq!(outcome.ticked().map(|r| r.event_count()), Some(1));

        let handle = session.handle();
        assert_eq!(handle.current_targeters_of(HERO)[0].id, EntityId(7));
        assert!(handle.highlight_color_for(EntityId(7)).is_some());
        assert_eq!(sink.recorded().events.len(), 1);
    }

    #[test]
    fn test_handle_unregister_is_visible_to_session() {
        let source = StaticSource::new(
            StaticSnapshot::with_local(LocalActor::new(HERO, "Hero"))
                .object(LiveObject::player(7, "Stalker").targeting(1)),
        );
        let (mut session, sink) = make_session(source);
        assert!(session.handle().unregister_player(HERO));

        session.on_frame_update(Duration::from_millis(100));
        assert!(sink.recorded().events.is_empty());
    }
}
