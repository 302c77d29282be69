//! Frame-driven poll scheduling
//!
//! The host calls [`PollScheduler::on_frame`] once per rendered frame with the
//! time since the previous frame. Elapsed time accumulates until it reaches
//! the configured interval, at which point one tick is due and the
//! accumulator resets to zero. Leftover time beyond the interval is dropped,
//! so a long frame never produces a burst of catch-up ticks.

use std::time::{Duration, Instant};

use tracing::trace;

use iseeyou_types::TrackerConfig;

use crate::tracking::{SkipReason, TargetingTracker, TickReport};
use crate::world::{WorldSnapshot, WorldSnapshotSource};

/// What a single frame callback did
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Interval not reached yet
    Waiting,
    /// Interval reached but the tick was not run
    Skipped(SkipReason),
    Ticked(TickReport),
}

impl FrameOutcome {
    pub fn ticked(&self) -> Option<&TickReport> {
        match self {
            FrameOutcome::Ticked(report) => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollScheduler {
    interval: Duration,
    track_in_combat: bool,
    elapsed: Duration,
    last_frame: Option<Instant>,
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::from_config(&TrackerConfig::default())
    }
}

impl PollScheduler {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            track_in_combat: config.track_in_combat,
            elapsed: Duration::ZERO,
            last_frame: None,
        }
    }

    /// Pick up a changed poll interval or combat policy. Accumulated time is
    /// kept, so a shorter interval can fire on the very next frame.
    pub fn apply_config(&mut self, config: &TrackerConfig) {
        self.interval = config.poll_interval();
        self.track_in_combat = config.track_in_combat;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Accumulate one frame. Returns true when a tick is due.
    pub fn on_frame(&mut self, delta: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(delta);
        if self.elapsed < self.interval {
            return false;
        }
        trace!(elapsed_ms = self.elapsed.as_millis() as u64, "Poll tick due");
        self.elapsed = Duration::ZERO;
        true
    }

    /// Like [`on_frame`](Self::on_frame) but derives the delta from the
    /// previous call's instant. The first call only records the instant.
    pub fn on_frame_at(&mut self, now: Instant) -> bool {
        let delta = match self.last_frame.replace(now) {
            Some(prev) => now.saturating_duration_since(prev),
            None => Duration::ZERO,
        };
        self.on_frame(delta)
    }

    /// Gating policy applied to a due tick before the tracker sees it
    pub fn admit(&self, snapshot: &impl WorldSnapshot) -> Result<(), SkipReason> {
        if snapshot.local_actor().is_none() {
            return Err(SkipReason::NoLocalActor);
        }
        if !self.track_in_combat && snapshot.local_actor_in_combat() {
            return Err(SkipReason::InCombat);
        }
        Ok(())
    }

    /// Accumulate a frame and, when due and admitted, run one tracker tick
    /// against a fresh snapshot.
    pub fn run_frame<S: WorldSnapshotSource>(
        &mut self,
        delta: Duration,
        source: &S,
        tracker: &mut TargetingTracker,
    ) -> FrameOutcome {
        if !self.on_frame(delta) {
            return FrameOutcome::Waiting;
        }
        let snapshot = source.snapshot();
        if let Err(reason) = self.admit(&snapshot) {
            trace!(?reason, "Poll tick skipped");
            return FrameOutcome::Skipped(reason);
        }
        FrameOutcome::Ticked(tracker.tick(&snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{LiveObject, LocalActor, StaticSnapshot, StaticSource};
    use iseeyou_types::EntityId;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn hero_source(in_combat: bool) -> StaticSource {
        StaticSource::new(
            StaticSnapshot::with_local(LocalActor::new(1, "Hero"))
                .in_combat(in_combat)
                .object(LiveObject::player(7, "Stalker").targeting(1)),
        )
    }

    #[test]
    fn test_fires_once_when_interval_reached() {
        let mut scheduler = PollScheduler::default();
        assert_eq!(scheduler.interval(), ms(100));

        assert!(!scheduler.on_frame(ms(40)));
        assert!(!scheduler.on_frame(ms(40)));
        assert!(scheduler.on_frame(ms(40)));
        assert_eq!(scheduler.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_long_frame_does_not_catch_up() {
        let mut scheduler = PollScheduler::default();
        assert!(scheduler.on_frame(ms(350)));
        assert!(!scheduler.on_frame(ms(10)));
    }

    #[test]
    fn test_interval_is_clamped() {
        let config = TrackerConfig {
            poll_frequency_ms: 0,
            ..TrackerConfig::default()
        };
        let mut scheduler = PollScheduler::from_config(&config);
        assert_eq!(scheduler.interval(), ms(5));
        assert!(!scheduler.on_frame(ms(4)));
        assert!(scheduler.on_frame(ms(1)));
    }

    #[test]
    fn test_on_frame_at_uses_instant_deltas() {
        let mut scheduler = PollScheduler::default();
        let start = Instant::now();
        assert!(!scheduler.on_frame_at(start));
        assert!(!scheduler.on_frame_at(start + ms(60)));
        assert!(scheduler.on_frame_at(start + ms(120)));
    }

    #[test]
    fn test_combat_gating() {
        let config = TrackerConfig {
            track_in_combat: false,
            ..TrackerConfig::default()
        };
        let mut scheduler = PollScheduler::from_config(&config);
        let mut tracker = TargetingTracker::default();
        tracker.register_player(EntityId(1), "Hero", None);

        let outcome = scheduler.run_frame(ms(100), &hero_source(true), &mut tracker);
        assert_eq!(outcome, FrameOutcome::Skipped(SkipReason::InCombat));
        assert!(tracker.current_targeters_of(EntityId(1)).is_empty());
        assert_eq!(scheduler.elapsed(), Duration::ZERO);

        let outcome = scheduler.run_frame(ms(100), &hero_source(false), &mut tracker);
        assert_eq!(outcome.ticked().map(|r| r.event_count()), Some(1));
    }

    #[test]
    fn test_in_combat_tracked_by_default() {
        let mut scheduler = PollScheduler::default();
        let mut tracker = TargetingTracker::default();
        tracker.register_player(EntityId(1), "Hero", None);

        let outcome = scheduler.run_frame(ms(100), &hero_source(true), &mut tracker);
        assert!(outcome.ticked().is_some());
    }

    #[test]
    fn test_no_local_actor_is_skipped() {
        let mut scheduler = PollScheduler::default();
        let mut tracker = TargetingTracker::default();
        let source = StaticSource::default();

        assert_eq!(
            scheduler.run_frame(ms(50), &source, &mut tracker),
            FrameOutcome::Waiting
        );
        assert_eq!(
            scheduler.run_frame(ms(50), &source, &mut tracker),
            FrameOutcome::Skipped(SkipReason::NoLocalActor)
        );
    }
}
