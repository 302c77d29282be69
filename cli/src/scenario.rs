//! Replay scenarios
//!
//! A scenario is a TOML file describing a scripted sequence of world
//! snapshots. Each frame is held for `repeat` host frames of `frame_ms`
//! milliseconds each.
//!
//! ```toml
//! frame_ms = 16
//! seed = 7
//!
//! [[register]]
//! id = 2
//! name = "Friend"
//!
//! [[frames]]
//! repeat = 10
//! local = { id = 1, name = "Hero" }
//! objects = [
//!     { id = 1, name = "Hero" },
//!     { id = 7, name = "Stalker", target = 1 },
//! ]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use iseeyou_core::StaticSnapshot;
use iseeyou_types::{Color, EntityId};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid scenario {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

fn default_frame_ms() -> u64 {
    16
}

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Host frame delta in milliseconds
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// Fixes generated highlight colors
    #[serde(default)]
    pub seed: Option<u64>,
    /// Players registered before the first frame, besides the local actor
    #[serde(default)]
    pub register: Vec<ScenarioPlayer>,
    #[serde(default)]
    pub frames: Vec<ScenarioFrame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPlayer {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFrame {
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    #[serde(flatten)]
    pub snapshot: StaticSnapshot,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::parse(&content).map_err(|source| ScenarioError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        scenario.validate().map_err(|reason| ScenarioError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(scenario)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn validate(&self) -> Result<(), String> {
        if self.frame_ms == 0 {
            return Err("frame_ms must be positive".to_string());
        }
        if self.frames.is_empty() {
            return Err("no frames".to_string());
        }
        Ok(())
    }

    pub fn frame_delta(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    /// Total number of host frames the scenario runs for
    pub fn total_frames(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.repeat)).sum()
    }

    /// The snapshot to install before startup registration
    pub fn initial_snapshot(&self) -> StaticSnapshot {
        self.frames
            .first()
            .map(|f| f.snapshot.clone())
            .unwrap_or_default()
    }
}
