//! Lunar Lander - a terrain-hopping arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ship physics, terrain, landing checks, stunts)
//! - `settings`: Physics tuning and feature toggles
//! - `platform`: Browser/native platform abstraction (clock, seed, web facade)

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{Feature, Settings};

/// Game configuration constants
pub mod consts {
    use std::f32::consts::PI;

    /// Nominal frame duration (60 Hz); all physics constants are per tick
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default view dimensions for headless sessions
    pub const DEFAULT_VIEW_WIDTH: f32 = 1280.0;
    pub const DEFAULT_VIEW_HEIGHT: f32 = 720.0;

    /// Ship geometry and spawn
    pub const SHIP_HEIGHT: f32 = 30.0;
    pub const SPAWN_X: f32 = 100.0;
    pub const SPAWN_Y: f32 = 50.0;
    /// Facing that points the nose straight up (screen y grows downward)
    pub const UPRIGHT_FACING: f32 = -PI / 2.0;
    /// Exponential smoothing factor of facing toward desired facing
    pub const FACING_SMOOTHING: f32 = 0.1;

    /// Landing limits
    pub const MAX_LANDING_DESCENT_SPEED: f32 = 0.7;
    pub const MAX_LANDING_TILT: f32 = PI / 5.0;
    /// Legal landing band is `LANDING_BAND_LOW < clearance <= LANDING_BAND_HIGH`
    pub const LANDING_BAND_LOW: f32 = -2.0;
    pub const LANDING_BAND_HIGH: f32 = 0.0;
    /// Clearance below which the ship has crashed into the ground
    pub const CRASH_CLEARANCE: f32 = -5.0;

    /// Smallest accepted terrain point spacing
    pub const MIN_X_STEP: f32 = 1.0;

    /// Landing pads
    pub const PAD_MAX_FUEL: f32 = 4.0;

    /// Wind
    pub const MAX_WIND_SPEED: f32 = 0.01;
    pub const WIND_DEAD_ZONE: f32 = 0.2;

    /// Stunts
    pub const LOW_ALTITUDE_CLEARANCE: f32 = 40.0;
    pub const LOW_ALTITUDE_MIN_SPEED: f32 = 0.4;
    pub const LOW_ALTITUDE_PAD_MARGIN: f32 = 20.0;
    pub const LOW_ALTITUDE_MIN_MS: f64 = 3000.0;
    pub const FAST_TRANSFER_GOLD_MS: f64 = 5000.0;
    pub const FAST_TRANSFER_SILVER_MS: f64 = 10_000.0;

    /// Effects
    pub const DEFAULT_MESSAGE_MS: f64 = 5000.0;
    pub const INTERVAL_MESSAGE_SPACING_MS: f64 = 1000.0;
    pub const INTERVAL_MESSAGE_MS: f64 = 10_000.0;
    pub const EXPLOSION_FRAMES: u64 = 30;
    pub const SCREEN_SHAKE_DECAY: f32 = 0.01;
    pub const SCREEN_SHAKE_MAX_OFFSET: f32 = 6.0;
    /// Spacing between staggered zen-mode toggles
    pub const ZEN_STEP_MS: f64 = 500.0;
}

/// Normalize a ship facing to its tilt from upright, in (-π, π]
///
/// Zero means perfectly level; the sign tells which way the ship leans.
#[inline]
pub fn normalize_tilt(facing: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let raw = facing - consts::UPRIGHT_FACING;
    let tilt = -PI + (raw - PI).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if tilt <= -PI { tilt + TAU } else { tilt }
}

/// Linear interpolation from `a` toward `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Re-map `value` from one range to another, optionally clamping to the output range
#[inline]
pub fn map_range(value: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32, clamp: bool) -> f32 {
    let t = (value - in_lo) / (in_hi - in_lo);
    let mapped = out_lo + (out_hi - out_lo) * t;
    if clamp {
        mapped.clamp(out_lo.min(out_hi), out_lo.max(out_hi))
    } else {
        mapped
    }
}

/// Round `value` to the nearest multiple of `increment`
#[inline]
pub fn snap_to(value: f32, increment: f32) -> f32 {
    (value / increment).round() * increment
}
