//! Event sinks
//!
//! A sink failure never reaches the tick loop: the tracker logs it and moves
//! on to the next event.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::{info, warn};

use iseeyou_types::TrackerConfig;

use super::signal::{TargetingEvent, TargetingKind};

/// Errors reported by side-effect adapters
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("chat output unavailable: {reason}")]
    Chat { reason: String },

    #[error("failed to play {cue:?}: {reason}")]
    Sound { cue: SoundCue, reason: String },

    #[error("{sink} failed")]
    Other {
        sink: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Sound played on a targeting transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    TargetStart,
    TargetStop,
}

/// Trait for systems that react to targeting events.
/// Implement this for chat, sound, logging, redraw triggers, etc.
pub trait EventSink: Send {
    fn targeting_started(&mut self, event: &TargetingEvent) -> Result<(), SinkError>;

    fn targeting_stopped(&mut self, event: &TargetingEvent) -> Result<(), SinkError>;

    /// Dispatch on the event kind (default calls the matching method)
    fn handle_event(&mut self, event: &TargetingEvent) -> Result<(), SinkError> {
        match event.kind {
            TargetingKind::Started => self.targeting_started(event),
            TargetingKind::Stopped => self.targeting_stopped(event),
        }
    }

    /// Called at most once per tick, after all events, when any tracked player changed
    fn redraw_requested(&mut self) {}

    /// Called at the end of every tick that ran (optional hook for batching)
    fn tick_finished(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Called when the tracker is created and whenever its configuration changes
    fn config_changed(&mut self, _config: &TrackerConfig) {}
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn targeting_started(&mut self, _event: &TargetingEvent) -> Result<(), SinkError> {
        Ok(())
    }

    fn targeting_stopped(&mut self, _event: &TargetingEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes every transition to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn targeting_started(&mut self, event: &TargetingEvent) -> Result<(), SinkError> {
        info!(
            targeter = event.targeter_name(),
            targeter_id = %event.targeter_id,
            target = event.target_name(),
            local = event.is_target_local_actor,
            "Targeting started"
        );
        Ok(())
    }

    fn targeting_stopped(&mut self, event: &TargetingEvent) -> Result<(), SinkError> {
        info!(
            targeter = event.targeter_name(),
            targeter_id = %event.targeter_id,
            target = event.target_name(),
            local = event.is_target_local_actor,
            "Targeting stopped"
        );
        Ok(())
    }
}

/// Forwards to several sinks. A failing child is logged and skipped so the
/// remaining children still see the event.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn each(&mut self, mut f: impl FnMut(&mut dyn EventSink) -> Result<(), SinkError>) {
        for sink in &mut self.sinks {
            if let Err(e) = f(sink.as_mut()) {
                warn!(error = %e, "Event sink failed, continuing");
            }
        }
    }
}

impl EventSink for FanoutSink {
    fn targeting_started(&mut self, event: &TargetingEvent) -> Result<(), SinkError> {
        self.each(|sink| sink.targeting_started(event));
        Ok(())
    }

    fn targeting_stopped(&mut self, event: &TargetingEvent) -> Result<(), SinkError> {
        self.each(|sink| sink.targeting_stopped(event));
        Ok(())
    }

    fn redraw_requested(&mut self) {
        for sink in &mut self.sinks {
            sink.redraw_requested();
        }
    }

    fn tick_finished(&mut self) -> Result<(), SinkError> {
        self.each(|sink| sink.tick_finished());
        Ok(())
    }

    fn config_changed(&mut self, config: &TrackerConfig) {
        for sink in &mut self.sinks {
            sink.config_changed(config);
        }
    }
}

/// Everything a [`RecordingSink`] has seen
#[derive(Debug, Default, Clone)]
pub struct Recorded {
    pub events: Vec<TargetingEvent>,
    pub redraws: usize,
    pub ticks: usize,
}

impl Recorded {
    pub fn started(&self) -> impl Iterator<Item = &TargetingEvent> {
        self.events.iter().filter(|e| e.is_started())
    }

    pub fn stopped(&self) -> impl Iterator<Item = &TargetingEvent> {
        self.events.iter().filter(|e| !e.is_started())
    }
}

/// Keeps every event in memory. Clones share the same record, so one clone
/// can be handed to the tracker and the other inspected afterwards.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Recorded {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain recorded events, keeping the counters
    pub fn take_events(&self) -> Vec<TargetingEvent> {
        let mut recorded = self.recorded.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut recorded.events)
    }

    fn record(&self, f: impl FnOnce(&mut Recorded)) {
        f(&mut self.recorded.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

impl EventSink for RecordingSink {
    fn targeting_started(&mut self, event: &TargetingEvent) -> Result<(), SinkError> {
        self.record(|r| r.events.push(event.clone()));
        Ok(())
    }

    fn targeting_stopped(&mut self, event: &TargetingEvent) -> Result<(), SinkError> {
        self.record(|r| r.events.push(event.clone()));
        Ok(())
    }

    fn redraw_requested(&mut self) {
        self.record(|r| r.redraws += 1);
    }

    fn tick_finished(&mut self) -> Result<(), SinkError> {
        self.record(|r| r.ticks += 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::intern;
    use chrono::NaiveDateTime;
    use iseeyou_types::EntityId;

    /// Rejects every call
    struct ClosedChat;

    impl EventSink for ClosedChat {
        fn targeting_started(&mut self, _event: &TargetingEvent) -> Result<(), SinkError> {
            Err(SinkError::Chat {
                reason: "chat closed".to_string(),
            })
        }

        fn targeting_stopped(&mut self, _event: &TargetingEvent) -> Result<(), SinkError> {
            Err(SinkError::Chat {
                reason: "chat closed".to_string(),
            })
        }

        fn tick_finished(&mut self) -> Result<(), SinkError> {
            Err(SinkError::Chat {
                reason: "chat closed".to_string(),
            })
        }
    }

    fn started_event() -> TargetingEvent {
        TargetingEvent {
            kind: TargetingKind::Started,
            targeter_id: EntityId(7),
            targeter_name: intern("Stalker"),
            target_id: EntityId(1),
            target_name: intern("Hero"),
            is_target_local_actor: true,
            timestamp: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_fanout_isolates_failing_child() {
        let recorder = RecordingSink::new();
        let mut fanout = FanoutSink::new().with(ClosedChat);
        assert_eq!(fanout.len(), 1);
        fanout.push(Box::new(recorder.clone()));
        assert_eq!(fanout.len(), 2);

        let event = started_event();
        assert!(event.is_started());
        assert!(fanout.handle_event(&event).is_ok());
        fanout.redraw_requested();
        assert!(fanout.tick_finished().is_ok());

        let recorded = recorder.recorded();
        assert_eq!(recorded.started().count(), 1);
        assert_eq!(recorded.stopped().count(), 0);
        assert_eq!(recorded.redraws, 1);
        assert_eq!(recorded.ticks, 1);
    }

    #[test]
    fn test_empty_fanout_accepts_events() {
        let mut fanout = FanoutSink::new();
        assert!(fanout.is_empty());
        assert!(fanout.handle_event(&started_event()).is_ok());
        assert!(fanout.tick_finished().is_ok());
    }
}
