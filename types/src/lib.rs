//! Shared configuration types for ISeeYou
//!
//! This crate contains serializable types that are shared between the
//! tracker core (iseeyou-core) and whatever presentation layer sits on top
//! of it (windows, nameplates, the replay CLI).

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Entity Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque 64-bit handle of an in-game object.
///
/// Serializes as a bare number so config and scenario files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#X}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Color Type
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color as [r, g, b, a] floats in 0.0..=1.0
pub type Color = [f32; 4];

/// Clamp every channel into 0.0..=1.0. NaN channels become 0.0.
pub fn clamp_color(color: Color) -> Color {
    color.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) })
}

// ─────────────────────────────────────────────────────────────────────────────
// Default Color Constants
// ─────────────────────────────────────────────────────────────────────────────

pub mod highlight_colors {
    use super::Color;

    /// Current targeter in the recent targets list
    pub const CURRENT_TARGET: Color = [0.0, 0.8, 1.0, 1.0];
    /// Targeter that is no longer targeting
    pub const FADED: Color = [0.6, 0.6, 0.6, 1.0];
    pub const LOCAL_ACTOR: Color = CURRENT_TARGET;
}

// ─────────────────────────────────────────────────────────────────────────────
// Serde Default Helpers
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_POLL_FREQUENCY_MS: i64 = 100;
pub const DEFAULT_MAX_HISTORY_ENTRIES: i64 = 1000;
/// Lower bound for the poll interval; anything below is clamped up.
pub const MIN_POLL_FREQUENCY_MS: i64 = 5;

fn default_true() -> bool {
    true
}
fn default_poll_frequency_ms() -> i64 {
    DEFAULT_POLL_FREQUENCY_MS
}
fn default_max_history_entries() -> i64 {
    DEFAULT_MAX_HISTORY_ENTRIES
}
fn default_local_actor_color() -> Color {
    highlight_colors::LOCAL_ACTOR
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracker Config
// ─────────────────────────────────────────────────────────────────────────────

/// User-facing tracker settings.
///
/// Numeric fields are signed so that a hand-edited file with a negative
/// value still loads; use [`TrackerConfig::poll_interval`] and
/// [`TrackerConfig::history_limit`] to read the clamped values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_poll_frequency_ms")]
    pub poll_frequency_ms: i64,
    #[serde(default = "default_max_history_entries")]
    pub max_history_entries: i64,
    /// When false, polling pauses while the local actor is in combat
    #[serde(default = "default_true")]
    pub track_in_combat: bool,
    #[serde(default = "default_true")]
    pub play_sound_on_start: bool,
    #[serde(default)]
    pub play_sound_on_stop: bool,
    #[serde(default = "default_true")]
    pub log_to_chat: bool,
    /// Color used when the local actor is auto-registered on login
    #[serde(default = "default_local_actor_color")]
    pub local_actor_color: Color,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_frequency_ms: DEFAULT_POLL_FREQUENCY_MS,
            max_history_entries: DEFAULT_MAX_HISTORY_ENTRIES,
            track_in_combat: true,
            play_sound_on_start: true,
            play_sound_on_stop: false,
            log_to_chat: true,
            local_actor_color: highlight_colors::LOCAL_ACTOR,
        }
    }
}

impl TrackerConfig {
    /// Poll interval, never shorter than [`MIN_POLL_FREQUENCY_MS`].
    pub fn poll_interval(&self) -> Duration {
        let ms = self.poll_frequency_ms.max(MIN_POLL_FREQUENCY_MS);
        Duration::from_millis(ms as u64)
    }

    /// Maximum history length per tracked player. Zero means no history is kept.
    pub fn history_limit(&self) -> usize {
        usize::try_from(self.max_history_entries.max(0)).unwrap_or(usize::MAX)
    }

    /// Local actor color with channels clamped into range.
    pub fn local_actor_color(&self) -> Color {
        clamp_color(self.local_actor_color)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// History Query Types (shared between core and list windows)
// ─────────────────────────────────────────────────────────────────────────────

/// Column a history table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySortColumn {
    /// Keep the stored newest-first order
    #[default]
    Recency,
    Name,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Filter and ordering for a tracked player's history table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Case-insensitive substring match on the targeter name; empty matches all
    #[serde(default)]
    pub name_filter: String,
    #[serde(default)]
    pub sort_by: HistorySortColumn,
    #[serde(default)]
    pub direction: SortDirection,
}

impl HistoryQuery {
    pub fn filtered(name: impl Into<String>) -> Self {
        Self {
            name_filter: name.into(),
            ..Self::default()
        }
    }

    pub fn sorted(mut self, sort_by: HistorySortColumn, direction: SortDirection) -> Self {
        self.sort_by = sort_by;
        self.direction = direction;
        self
    }

    /// Returns true if `name` passes the name filter.
    pub fn matches_name(&self, name: &str) -> bool {
        let filter = self.name_filter.trim();
        filter.is_empty() || name.to_lowercase().contains(&filter.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: TrackerConfig = toml::from_str("log_to_chat = false").unwrap();
        assert_eq!(config.poll_frequency_ms, 100);
        assert_eq!(config.max_history_entries, 1000);
        assert!(config.track_in_combat);
        assert!(!config.log_to_chat);
        assert_eq!(config.local_actor_color, highlight_colors::LOCAL_ACTOR);
    }

    #[test]
    fn test_out_of_range_values_are_clamped_on_read() {
        let config: TrackerConfig = toml::from_str(
            r#"
poll_frequency_ms = -20
max_history_entries = -3
local_actor_color = [1.5, -0.2, 0.5, 1.0]
"#,
        )
        .unwrap();

        assert_eq!(config.poll_interval(), Duration::from_millis(5));
        assert_eq!(config.history_limit(), 0);
        assert_eq!(config.local_actor_color(), [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_entity_id_is_transparent() {
        #[derive(Deserialize)]
        struct Wrapper {
            id: EntityId,
        }
        let w: Wrapper = toml::from_str("id = 42").unwrap();
        assert_eq!(w.id, EntityId(42));
        assert_eq!(w.id.to_string(), "0x2A");
    }

    #[test]
    fn test_history_query_name_filter() {
        let query = HistoryQuery::filtered("  sTAlk ");
        assert!(query.matches_name("Night Stalker"));
        assert!(!query.matches_name("Hero"));
        assert!(HistoryQuery::default().matches_name("anything"));
    }
}
