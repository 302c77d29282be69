use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeDelta};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

use iseeyou_core::{
    ColorAssigner, EntityId, FanoutSink, FrameOutcome, LogSink, ManualClock, NotificationSink,
    RecordingSink, SinkError, SoundCue, StaticSource, TargetingKind, TargetingTracker,
    TrackerConfig, TrackerConfigExt, TrackerSession, WorldSnapshot, WorldSnapshotSource,
};
use iseeyou_core::events::{ChatOutput, SoundOutput};

use crate::scenario::Scenario;

const CHAT_PREFIX: &str = "[ISeeYou]";

/// Chat output for the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutChat;

impl ChatOutput for StdoutChat {
    fn print(&mut self, message: &str) -> Result<(), SinkError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{CHAT_PREFIX} {message}").map_err(|e| SinkError::Chat {
            reason: e.to_string(),
        })
    }
}

/// Sound output for the terminal: prints the cue name
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSound;

impl SoundOutput for StdoutSound {
    fn play(&mut self, cue: SoundCue) -> Result<(), SinkError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{CHAT_PREFIX} (sound: {cue:?})").map_err(|e| SinkError::Sound {
            cue,
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub scenario: PathBuf,
    pub config: Option<PathBuf>,
    pub realtime: bool,
    pub seed: Option<u64>,
}

/// Counters collected while replaying
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: u64,
    pub ticks: u64,
    pub skipped: u64,
    pub started: usize,
    pub stopped: usize,
    pub report: String,
}

fn load_config(path: Option<&Path>) -> Result<TrackerConfig, String> {
    match path {
        Some(path) => TrackerConfig::load_from(path).map_err(|e| e.to_string()),
        None => Ok(TrackerConfig::load()),
    }
}

pub async fn replay(options: &ReplayOptions) -> Result<ReplaySummary, String> {
    let scenario = Scenario::load(&options.scenario).map_err(|e| e.to_string())?;
    let config = load_config(options.config.as_deref())?;
    run_scenario(&scenario, config, options.seed, options.realtime).await
}

/// Drive a session through every frame of the scenario.
pub async fn run_scenario(
    scenario: &Scenario,
    config: TrackerConfig,
    seed: Option<u64>,
    realtime: bool,
) -> Result<ReplaySummary, String> {
    let delta = scenario.frame_delta();
    let clock = ManualClock::new(Local::now().naive_local());
    let recorder = RecordingSink::new();
    let sink = FanoutSink::new()
        .with(NotificationSink::new(StdoutChat, StdoutSound))
        .with(LogSink)
        .with(recorder.clone());

    let colors = match seed.or(scenario.seed) {
        Some(seed) => ColorAssigner::seeded(seed),
        None => ColorAssigner::new(),
    };
    let tracker = TargetingTracker::new(config, Arc::new(clock.clone()), Box::new(sink))
        .with_color_assigner(colors);

    let source = StaticSource::new(scenario.initial_snapshot());
    let mut session = TrackerSession::new(source.clone(), tracker);
    let handle = session.handle();
    for player in &scenario.register {
        handle.register_player(player.id, &player.name, player.color);
    }

    let frame_step = TimeDelta::from_std(delta).map_err(|e| e.to_string())?;
    let mut pacing = realtime.then(|| pacing_interval(delta));
    let mut local: Option<EntityId> = source_local(&source);
    let mut summary = ReplaySummary::default();

    info!(
        frames = scenario.total_frames(),
        frame_ms = scenario.frame_ms,
        realtime,
        "Starting replay"
    );

    for frame in &scenario.frames {
        source.set(frame.snapshot.clone());

        let now_local = source_local(&source);
        if now_local.is_some() && now_local != local {
            session.on_login();
        }
        local = now_local;

        for _ in 0..frame.repeat {
            if let Some(interval) = pacing.as_mut() {
                interval.tick().await;
            }
            clock.advance(frame_step);
            summary.frames += 1;

            match session.on_frame_update(delta) {
                FrameOutcome::Waiting => {}
                FrameOutcome::Skipped(reason) => {
                    debug!(?reason, frame = summary.frames, "Tick skipped");
                    summary.skipped += 1;
                }
                FrameOutcome::Ticked(_) => summary.ticks += 1,
            }
        }
    }

    let recorded = recorder.recorded();
    summary.started = recorded
        .events
        .iter()
        .filter(|e| e.kind == TargetingKind::Started)
        .count();
    summary.stopped = recorded.events.len() - summary.started;
    summary.report = handle.debug_report();
    Ok(summary)
}

/// Wall-clock pacing for `--realtime`. A stalled frame delays the ones after
/// it instead of replaying the missed frames back to back.
fn pacing_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn source_local(source: &StaticSource) -> Option<EntityId> {
    source.snapshot().local_actor().map(|actor| actor.id)
}

pub fn print_summary(summary: &ReplaySummary) {
    println!();
    println!(
        "{} frames, {} ticks ({} skipped), {} started, {} stopped",
        summary.frames, summary.ticks, summary.skipped, summary.started, summary.stopped
    );
    println!("{}", "-".repeat(60));
    print!("{}", summary.report);
}

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

pub fn show_config(path: Option<&Path>) -> Result<(), String> {
    let config = load_config(path)?;
    let text = toml::to_string_pretty(&config).map_err(|e| e.to_string())?;
    print!("{text}");
    Ok(())
}

pub fn show_config_path() -> Result<(), String> {
    let path = TrackerConfig::config_path().map_err(|e| e.to_string())?;
    println!("{}", path.display());
    Ok(())
}

pub fn reset_config(path: Option<&Path>) -> Result<(), String> {
    let config = TrackerConfig::default();
    match path {
        Some(path) => config.save_to(path),
        None => config.save(),
    }
    .map_err(|e| e.to_string())?;
    println!("Configuration reset to defaults");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STALKER: &str = r#"
frame_ms = 50

[[frames]]
repeat = 4
local = { id = 1, name = "Hero" }
objects = [
    { id = 1, name = "Hero" },
    { id = 7, name = "Stalker", target = 1 },
]

[[frames]]
repeat = 4
local = { id = 1, name = "Hero" }
objects = [
    { id = 1, name = "Hero" },
    { id = 7, name = "Stalker" },
]
"#;

    #[tokio::test]
    async fn test_replay_start_then_stop() {
        let scenario = Scenario::parse(STALKER).unwrap();
        let summary = run_scenario(&scenario, TrackerConfig::default(), Some(1), false)
            .await
            .unwrap();

        assert_eq!(summary.frames, 8);
        assert_eq!(summary.ticks, 4);
        assert_eq!(summary.started, 1);
        assert_eq!(summary.stopped, 1);
        assert!(summary.report.contains("Hero [0x1]"));
        assert!(summary.report.contains("- Stalker ("));
    }

    #[tokio::test]
    async fn test_late_login_registers_local_actor() {
        let scenario = Scenario::parse(
            r#"
frame_ms = 100

[[frames]]
repeat = 2

[[frames]]
repeat = 2
local = { id = 1, name = "Hero" }
objects = [
    { id = 1, name = "Hero" },
    { id = 7, name = "Stalker", target = 1 },
]
"#,
        )
        .unwrap();
        let summary = run_scenario(&scenario, TrackerConfig::default(), None, false)
            .await
            .unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.started, 1);
    }

    #[tokio::test]
    async fn test_realtime_pacing_delays_after_stall() {
        let interval = pacing_interval(Duration::from_millis(5));
        assert_eq!(interval.missed_tick_behavior(), MissedTickBehavior::Delay);

        // One poll tick per frame group at 25 ms frames
        let scenario = Scenario::parse(&STALKER.replace("frame_ms = 50", "frame_ms = 25")).unwrap();
        let summary = run_scenario(&scenario, TrackerConfig::default(), Some(1), true)
            .await
            .unwrap();
        assert_eq!(summary.frames, 8);
        assert_eq!(summary.ticks, 2);
        assert_eq!((summary.started, summary.stopped), (1, 1));
    }

    #[test]
    fn test_reset_config_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        reset_config(Some(&path)).unwrap();

        let loaded = TrackerConfig::load_from(&path).unwrap();
        assert_eq!(loaded, TrackerConfig::default());
    }
}
