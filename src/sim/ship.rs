//! The player's ship

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::stunts::{FlightSample, StuntMonitor};
use super::terrain::Terrain;
use crate::consts::*;
use crate::normalize_tilt;

/// Ship flight state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipState {
    Flying,
    Landed,
}

/// Default thrust-particle colour before the first landing (0xRRGGBB)
pub const DEFAULT_THRUST_COLOUR: u32 = 0xb2475d;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub state: ShipState,
    /// World-space centre of the ship
    pub pos: Vec2,
    pub vel: Vec2,
    /// Used for ground clearance
    pub height: f32,
    /// Current facing in radians; eases toward `desired_facing`
    pub facing: f32,
    pub desired_facing: f32,
    /// Tank level in [0, 1]
    pub fuel: f32,
    /// Colour of thrust particles, adopted from the last pad landed on
    pub thrust_colour: u32,
    pub stunts: StuntMonitor,
}

impl Default for Ship {
    fn default() -> Self {
        Self::new()
    }
}

impl Ship {
    /// A fresh ship at the spawn point
    pub fn new() -> Self {
        Self {
            state: ShipState::Flying,
            pos: spawn_position(),
            vel: Vec2::ZERO,
            height: SHIP_HEIGHT,
            facing: UPRIGHT_FACING,
            desired_facing: UPRIGHT_FACING,
            fuel: 1.0,
            thrust_colour: DEFAULT_THRUST_COLOUR,
            stunts: StuntMonitor::new(UPRIGHT_FACING),
        }
    }

    /// Reset to spawn: full tank, upright, at rest, stunts cleared
    pub fn respawn(&mut self) {
        self.pos = spawn_position();
        self.vel = Vec2::ZERO;
        self.set_upright();
        self.fuel = 1.0;
        self.state = ShipState::Flying;
        self.stunts.clear(self.facing);
    }

    /// Snap facing upright with no easing
    pub fn set_upright(&mut self) {
        self.desired_facing = UPRIGHT_FACING;
        self.facing = UPRIGHT_FACING;
    }

    pub fn is_flying(&self) -> bool {
        self.state == ShipState::Flying
    }

    pub fn is_landed(&self) -> bool {
        self.state == ShipState::Landed
    }

    /// Deviation from upright in (-π, π]
    pub fn tilt(&self) -> f32 {
        normalize_tilt(self.facing)
    }

    /// Ground height minus the ship's base; negative means below ground
    ///
    /// Rotation of the hull is ignored.
    pub fn clearance(&self, terrain: &Terrain) -> f32 {
        terrain.height_at(self.pos.x) - self.pos.y - self.height / 2.0
    }

    /// Unit vector along the current facing
    pub fn heading(&self) -> Vec2 {
        Vec2::from_angle(self.facing)
    }

    /// Settle onto the ground at the current x
    pub fn touch_down(&mut self, terrain: &Terrain) {
        self.state = ShipState::Landed;
        self.vel = Vec2::ZERO;
        self.pos.y = terrain.height_at(self.pos.x) - self.height / 2.0;
        self.set_upright();
    }

    pub(crate) fn flight_sample(&self, terrain: &Terrain) -> FlightSample {
        FlightSample {
            facing: self.facing,
            clearance: self.clearance(terrain),
            horizontal_speed: self.vel.x,
            pad_edge_distance: terrain.edge_distance_to_nearest_pad(self.pos.x),
        }
    }
}

pub fn spawn_position() -> Vec2 {
    Vec2::new(SPAWN_X, SPAWN_Y)
}
