pub mod handler;
pub mod notifier;
pub mod signal;

pub use handler::{
    EventSink, FanoutSink, LogSink, NullSink, Recorded, RecordingSink, SinkError, SoundCue,
};
pub use notifier::{ChatOutput, LogChat, NotificationSink, Silent, SoundOutput, targeting_message};
pub use signal::{TargetingEvent, TargetingKind};
