//! Targeting tracker
//!
//! This module provides:
//! - **Player state**: current/previous targeters and bounded history per tracked player
//! - **History**: newest-first, one entry per targeter
//! - **Colors**: highlight color generation for newly registered players
//! - **Tracker**: registry plus the per-tick diff that emits targeting events
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  WorldSnapshot (one per poll tick)              │
//! │   "Stalker (player) targets 0x1, Dummy (npc) targets 0x1"       │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                   TargetingTracker::tick
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              TrackedPlayerState (runtime state)                 │
//! │   "Hero is targeted by Stalker since 12:03, history: 14"        │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                     TargetingEvent ──► EventSink (chat, sound, redraw)
//! ```

mod colors;
mod history;
mod player;
pub mod tracker;


pub use colors::{BRIGHT_CHANNEL_MIN, ColorAssigner};
pub use history::{TargetHistory, TargetHistoryEntry};
pub use player::{PlayerDiff, PlayerUpdate, Targeter, TrackedPlayerState};
pub use tracker::{RecentTarget, Registration, SkipReason, TargetingTracker, TickReport};
