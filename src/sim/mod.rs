//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per frame, physics constants per tick
//! - Seeded RNG and seeded noise only
//! - No rendering or platform dependencies

pub mod effects;
pub mod landing;
pub mod schedule;
pub mod ship;
pub mod state;
pub mod stunts;
pub mod terrain;
pub mod tick;
pub mod wind;

pub use effects::{Explosion, Message, Particle};
pub use landing::{LandingCheck, LandingFault, Severity, evaluate};
pub use schedule::{DeferredAction, Scheduler};
pub use ship::{Ship, ShipState};
pub use state::{Snapshot, World, ZenBackup};
pub use stunts::{Medal, StuntKind, StuntMonitor, StuntRecord};
pub use terrain::{LandingPad, Terrain};
pub use tick::{SimEvent, TickInput, TickOutcome, tick};
pub use wind::WindField;
