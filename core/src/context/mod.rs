mod config;
mod error;
mod interner;

pub use config::{
    APP_NAME, CONFIG_NAME, Color, DEFAULT_MAX_HISTORY_ENTRIES, DEFAULT_POLL_FREQUENCY_MS,
    MIN_POLL_FREQUENCY_MS, TrackerConfig, TrackerConfigExt, clamp_color, highlight_colors,
};
pub use error::ConfigError;
pub use interner::{IStr, intern, resolve};
