//! Wind field
//!
//! Horizontal wind speed as a pure function of position and time. Safe to
//! sample from physics and rendering alike; sampling has no side effects.

use glam::Vec2;
use noise::{NoiseFn, Perlin};

use super::terrain::noise_seed;
use crate::consts::{MAX_WIND_SPEED, WIND_DEAD_ZONE};
use crate::map_range;

/// Seeded 3-D noise mapped to a bounded horizontal wind speed
#[derive(Debug, Clone)]
pub struct WindField {
    noise: Perlin,
}

impl WindField {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: Perlin::new(noise_seed(seed, 1)),
        }
    }

    /// Horizontal wind speed at `pos` and time `t` (in wind time units)
    ///
    /// Result lies in `[-MAX_WIND_SPEED, MAX_WIND_SPEED]`; weak wind inside
    /// the dead zone is reported as exactly zero.
    pub fn at(&self, pos: Vec2, t: f64) -> f32 {
        let raw = self.noise.get([
            5000.0 + pos.x as f64 / 1000.0,
            3000.0 + pos.y as f64 / 100.0,
            t,
        ]);
        let unit = ((raw + 1.0) * 0.5) as f32;
        let centred = map_range(unit, 0.1, 0.9, -1.0, 1.0, true);
        if centred.abs() < WIND_DEAD_ZONE {
            return 0.0;
        }
        MAX_WIND_SPEED * centred
    }
}
