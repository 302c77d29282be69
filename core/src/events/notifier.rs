//! Chat and sound notifications
//!
//! Transitions are buffered while a tick runs and flushed in
//! `tick_finished`: every tracked player gets at most one chat line per
//! direction per tick ("A, B are targeting you."), and each sound cue plays
//! at most once per tick no matter how many players changed.

use tracing::debug;

use iseeyou_types::{EntityId, TrackerConfig};

use super::handler::{EventSink, SinkError, SoundCue};
use super::signal::{TargetingEvent, TargetingKind};
use crate::context::{IStr, resolve};

/// Where chat lines go (the game's chat log in a real host)
pub trait ChatOutput: Send {
    fn print(&mut self, message: &str) -> Result<(), SinkError>;
}

/// Plays notification sounds
pub trait SoundOutput: Send {
    fn play(&mut self, cue: SoundCue) -> Result<(), SinkError>;
}

/// Sound output that does nothing, for hosts without audio
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SoundOutput for Silent {
    fn play(&mut self, cue: SoundCue) -> Result<(), SinkError> {
        debug!(?cue, "Sound suppressed");
        Ok(())
    }
}

/// Chat output that writes to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogChat;

impl ChatOutput for LogChat {
    fn print(&mut self, message: &str) -> Result<(), SinkError> {
        tracing::info!(target: "iseeyou::chat", "{message}");
        Ok(())
    }
}

/// Build the chat line for a batch of targeters.
///
/// `target` is None when the tracked player is the local actor ("you").
pub fn targeting_message(kind: TargetingKind, names: &[&str], target: Option<&str>) -> String {
    let joined = names.join(", ");
    let plural = names.len() > 1;
    let whom = target.unwrap_or("you");
    match (kind, plural) {
        (TargetingKind::Started, false) => format!("{joined} is targeting {whom}."),
        (TargetingKind::Started, true) => format!("{joined} are targeting {whom}."),
        (TargetingKind::Stopped, false) => format!("{joined} stopped targeting {whom}."),
        (TargetingKind::Stopped, true) => format!("{joined} have stopped targeting {whom}."),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NotifySettings {
    log_to_chat: bool,
    sound_on_start: bool,
    sound_on_stop: bool,
}

impl From<&TrackerConfig> for NotifySettings {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            log_to_chat: config.log_to_chat,
            sound_on_start: config.play_sound_on_start,
            sound_on_stop: config.play_sound_on_stop,
        }
    }
}

/// Transitions collected for one tracked player during a tick
#[derive(Debug)]
struct PendingBatch {
    target_id: EntityId,
    target_name: IStr,
    is_local: bool,
    started: Vec<IStr>,
    stopped: Vec<IStr>,
}

/// Chat + sound adapter driven by the tracker configuration.
pub struct NotificationSink<C: ChatOutput, S: SoundOutput> {
    chat: C,
    sound: S,
    settings: NotifySettings,
    pending: Vec<PendingBatch>,
}

impl<C: ChatOutput, S: SoundOutput> NotificationSink<C, S> {
    pub fn new(chat: C, sound: S) -> Self {
        Self {
            chat,
            sound,
            settings: NotifySettings::from(&TrackerConfig::default()),
            pending: Vec::new(),
        }
    }

    pub fn chat(&self) -> &C {
        &self.chat
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    fn batch_for(&mut self, event: &TargetingEvent) -> &mut PendingBatch {
        let idx = match self
            .pending
            .iter()
            .position(|b| b.target_id == event.target_id)
        {
            Some(idx) => idx,
            None => {
                self.pending.push(PendingBatch {
                    target_id: event.target_id,
                    target_name: event.target_name,
                    is_local: event.is_target_local_actor,
                    started: Vec::new(),
                    stopped: Vec::new(),
                });
                self.pending.len() - 1
            }
        };
        &mut self.pending[idx]
    }
}

impl<C: ChatOutput, S: SoundOutput> EventSink for NotificationSink<C, S> {
    fn targeting_started(&mut self, event: &TargetingEvent) -> Result<(), SinkError> {
        self.batch_for(event).started.push(event.targeter_name);
        Ok(())
    }

    fn targeting_stopped(&mut self, event: &TargetingEvent) -> Result<(), SinkError> {
        self.batch_for(event).stopped.push(event.targeter_name);
        Ok(())
    }

    fn tick_finished(&mut self) -> Result<(), SinkError> {
        let pending = std::mem::take(&mut self.pending);
        let mut any_started = false;
        let mut any_stopped = false;
        let mut first_error = None;

        for batch in &pending {
            any_started |= !batch.started.is_empty();
            any_stopped |= !batch.stopped.is_empty();

            if !self.settings.log_to_chat {
                continue;
            }
            let target = (!batch.is_local).then(|| resolve(batch.target_name));
            for (kind, names) in [
                (TargetingKind::Started, &batch.started),
                (TargetingKind::Stopped, &batch.stopped),
            ] {
                if names.is_empty() {
                    continue;
                }
                let names: Vec<&str> = names.iter().map(|n| resolve(*n)).collect();
                let message = targeting_message(kind, &names, target);
                if let Err(e) = self.chat.print(&message) {
                    first_error.get_or_insert(e);
                }
            }
        }

        if any_started && self.settings.sound_on_start {
            if let Err(e) = self.sound.play(SoundCue::TargetStart) {
                first_error.get_or_insert(e);
            }
        }
        if any_stopped && self.settings.sound_on_stop {
            if let Err(e) = self.sound.play(SoundCue::TargetStop) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn config_changed(&mut self, config: &TrackerConfig) {
        self.settings = NotifySettings::from(config);
    }
}
