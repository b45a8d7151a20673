//! Landing legality check
//!
//! A pure verdict on whether the ship may touch down this tick. Checks run
//! in a fixed order and the first failure wins.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ship::Ship;
use super::terrain::Terrain;
use crate::consts::*;

/// How noteworthy a rejected landing is to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Routine, e.g. simply not near the ground
    None,
    /// A near-miss worth surfacing
    Warning,
}

/// Why a landing is not allowed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LandingFault {
    NotFlying,
    NotOverPad,
    DescentTooFast { speed: f32 },
    NotLevel { tilt_degrees: f32 },
    NotCloseToGround,
}

impl LandingFault {
    pub fn severity(&self) -> Severity {
        match self {
            LandingFault::NotFlying | LandingFault::NotCloseToGround => Severity::None,
            LandingFault::NotOverPad
            | LandingFault::DescentTooFast { .. }
            | LandingFault::NotLevel { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for LandingFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LandingFault::NotFlying => write!(f, "not flying"),
            LandingFault::NotOverPad => write!(f, "not over landing pad"),
            LandingFault::DescentTooFast { speed } => write!(f, "descent too fast ({:.2})", speed),
            LandingFault::NotLevel { tilt_degrees } => write!(f, "not level ({:.1})", tilt_degrees),
            LandingFault::NotCloseToGround => write!(f, "not close to ground"),
        }
    }
}

/// Verdict of a landing check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LandingCheck {
    Legal,
    Rejected(LandingFault),
}

impl LandingCheck {
    pub fn is_legal(&self) -> bool {
        matches!(self, LandingCheck::Legal)
    }

    pub fn fault(&self) -> Option<LandingFault> {
        match self {
            LandingCheck::Legal => None,
            LandingCheck::Rejected(fault) => Some(*fault),
        }
    }

    pub fn severity(&self) -> Severity {
        self.fault().map_or(Severity::None, |f| f.severity())
    }

    /// Human-readable reason, absent for a legal landing
    pub fn reason(&self) -> Option<String> {
        self.fault().map(|f| f.to_string())
    }
}

/// Decide whether `ship` may land on `terrain` right now
pub fn evaluate(ship: &Ship, terrain: &Terrain) -> LandingCheck {
    if !ship.is_flying() {
        return LandingCheck::Rejected(LandingFault::NotFlying);
    }

    if !terrain.is_over_any_pad(ship.pos.x) {
        return LandingCheck::Rejected(LandingFault::NotOverPad);
    }

    if ship.vel.y > MAX_LANDING_DESCENT_SPEED {
        return LandingCheck::Rejected(LandingFault::DescentTooFast { speed: ship.vel.y });
    }

    let tilt = ship.tilt();
    if tilt.abs() >= MAX_LANDING_TILT {
        return LandingCheck::Rejected(LandingFault::NotLevel {
            tilt_degrees: tilt.to_degrees(),
        });
    }

    let clearance = ship.clearance(terrain);
    if clearance > LANDING_BAND_LOW && clearance <= LANDING_BAND_HIGH {
        LandingCheck::Legal
    } else {
        LandingCheck::Rejected(LandingFault::NotCloseToGround)
    }
}
