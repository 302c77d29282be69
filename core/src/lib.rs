pub mod clock;
pub mod context;
pub mod events;
pub mod scheduler;
pub mod session;
pub mod tracking;
pub mod world;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{ConfigError, IStr, TrackerConfig, TrackerConfigExt, intern, resolve};
pub use events::{
    EventSink, FanoutSink, LogSink, NotificationSink, NullSink, RecordingSink, SinkError,
    SoundCue, TargetingEvent, TargetingKind,
};
pub use iseeyou_types::{Color, EntityId, HistoryQuery, HistorySortColumn, SortDirection};
pub use scheduler::{FrameOutcome, PollScheduler};
pub use session::{TrackerHandle, TrackerSession};
pub use tracking::{
    ColorAssigner, RecentTarget, Registration, SkipReason, TargetHistory, TargetHistoryEntry,
    TargetingTracker, TickReport, TrackedPlayerState,
};
pub use world::{
    LiveObject, LocalActor, ObjectKind, StaticSnapshot, StaticSource, WorldSnapshot,
    WorldSnapshotSource,
};
