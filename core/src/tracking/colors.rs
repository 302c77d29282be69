//! Highlight color generation
//!
//! Colors are drawn from the bright half of each channel so nameplates stay
//! legible on dark backgrounds. Two players can end up with the same or very
//! similar colors; the user can recolor either one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use iseeyou_types::Color;

/// Lower bound of every generated RGB channel
pub const BRIGHT_CHANNEL_MIN: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct ColorAssigner {
    rng: StdRng,
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorAssigner {
    /// Create an assigner seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an assigner with a fixed seed for deterministic colors
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate_color(&mut self) -> Color {
        [
            self.rng.gen_range(BRIGHT_CHANNEL_MIN..=1.0),
            self.rng.gen_range(BRIGHT_CHANNEL_MIN..=1.0),
            self.rng.gen_range(BRIGHT_CHANNEL_MIN..=1.0),
            1.0,
        ]
    }
}
