//! Per-frame simulation step
//!
//! One call to [`tick`] advances the session by exactly one frame: deferred
//! tasks, one-shot commands, the ship state machine, then effect ageing.

use serde::Serialize;

use super::effects::emit_thrust_particles;
use super::landing::{LandingCheck, evaluate};
use super::ship::ShipState;
use super::state::World;
use super::stunts::StuntRecord;
use crate::consts::*;
use crate::lerp;
use crate::settings::Feature;

/// Input intents for a single tick
///
/// Held keys are sampled each frame; the one-shot commands should be cleared
/// by the caller once a tick has consumed them.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub thrust: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Regenerate terrain with a fresh seed
    pub restart: bool,
    pub toggle_wind: bool,
    /// Flip any other feature toggle (stars, screen shake, debug text)
    pub toggle_feature: Option<Feature>,
    pub toggle_zen_mode: bool,
    pub clear_messages: bool,
    /// Post the full list of controls
    pub show_help: bool,
    pub cheat_easy_landing: bool,
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    TookOff { pad: String },
    Landed { pad: String },
    /// Base-to-base flight time, reported on every landing at a new pad
    FlightTime { ms: f64 },
    Crashed { reason: String },
    RefuelComplete,
    Stunt(StuntRecord),
}

/// What a tick produced for the presentation layer
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// Landing verdict, when the check ran this tick
    pub landing_check: Option<LandingCheck>,
    pub events: Vec<SimEvent>,
}

/// Advance the session by one frame of `dt` seconds
pub fn tick(world: &mut World, input: &TickInput, dt: f32) -> TickOutcome {
    world.clock_ms += dt as f64 * 1000.0;
    world.frame += 1;

    world.run_due_tasks();

    if input.restart {
        let seed = world.next_seed();
        world.restart(seed);
    }
    if input.toggle_wind {
        world.toggle_feature(Feature::Wind);
    }
    if let Some(feature) = input.toggle_feature {
        world.toggle_feature(feature);
    }
    if input.toggle_zen_mode {
        world.toggle_zen_mode();
    }
    if input.clear_messages {
        world.clear_messages();
    }
    if input.show_help {
        world.post_instructional_messages(true);
    }
    if input.cheat_easy_landing {
        world.cheat_easy_landing();
    }

    let mut outcome = TickOutcome::default();
    update_ship(world, input, &mut outcome);
    world.update_effects();
    outcome
}

/// Ship state machine: refuel, thrust, turning, physics, landing and crashes
fn update_ship(world: &mut World, input: &TickInput, outcome: &mut TickOutcome) {
    let now = world.clock_ms;

    let sample = world.ship.flight_sample(&world.terrain);
    for record in world.ship.stunts.observe(&sample, now) {
        world.post_message(record.announcement());
        outcome.events.push(SimEvent::Stunt(record));
    }

    if world.ship.is_landed() && world.ship.fuel < 1.0 {
        refuel(world, outcome);
    }

    let mut took_off = false;
    if input.thrust && world.ship.fuel > 0.0 {
        fire_thrusters(world);
        if world.ship.is_landed() {
            world.ship.state = ShipState::Flying;
            let pad_name = world
                .terrain
                .pad_at(world.ship.pos.x)
                .map(|pad| pad.name.clone());
            if let Some(name) = pad_name {
                world.post_message(format!("Lift off from {} base", name));
                world.ship.stunts.record_takeoff(&name, now);
                log::info!("Lift off from {}", name);
                outcome.events.push(SimEvent::TookOff { pad: name });
            }
            took_off = true;
        }
    }

    if !world.ship.is_landed() {
        if input.turn_left {
            world.ship.desired_facing -= world.settings.turn_speed;
        }
        if input.turn_right {
            world.ship.desired_facing += world.settings.turn_speed;
        }
    }

    let ship = &mut world.ship;
    ship.facing = lerp(ship.facing, ship.desired_facing, FACING_SMOOTHING);

    if world.ship.is_landed() {
        return;
    }

    let wind = world.wind_at(world.ship.pos);
    let gravity = world.settings.gravity;
    let ship = &mut world.ship;
    ship.vel.x += wind;
    ship.vel.y += gravity;
    ship.pos += ship.vel;

    if took_off {
        return;
    }

    let check = evaluate(&world.ship, &world.terrain);
    outcome.landing_check = Some(check);

    if check.is_legal() {
        land(world, outcome);
        return;
    }

    if world.clearance() < CRASH_CLEARANCE {
        crash(world, &check, outcome);
    }
}

fn fire_thrusters(world: &mut World) {
    let impulse = world.ship.heading() * world.settings.thrust;
    world.ship.vel += impulse;
    world.ship.fuel = (world.ship.fuel - world.settings.fuel_used_per_tick).max(0.0);
    let particles = emit_thrust_particles(
        &mut world.rng,
        world.ship.pos,
        world.ship.facing,
        world.ship.thrust_colour,
        world.frame,
    );
    world.particles.extend(particles);
}

/// Pump fuel from the pad under the ship, limited by what the pad holds
fn refuel(world: &mut World, outcome: &mut TickOutcome) {
    let rate = world.settings.refuel_per_tick;
    let ship = &mut world.ship;
    let Some(pad) = world.terrain.pad_at_mut(ship.pos.x) else {
        return;
    };
    let needed = 1.0 - ship.fuel;
    let amount = rate.min(needed).min(pad.fuel).max(0.0);
    ship.fuel = if amount >= needed {
        1.0
    } else {
        (ship.fuel + amount).clamp(0.0, 1.0)
    };
    pad.fuel = (pad.fuel - amount).clamp(0.0, pad.max_fuel);

    if ship.fuel >= 1.0 {
        log::debug!("Refuelled at {}", pad.name);
        world.post_message("Refuelling complete");
        outcome.events.push(SimEvent::RefuelComplete);
    }
}

fn land(world: &mut World, outcome: &mut TickOutcome) {
    let now = world.clock_ms;
    world.ship.touch_down(&world.terrain);

    let pad = world
        .terrain
        .pad_at(world.ship.pos.x)
        .map(|pad| (pad.name.clone(), pad.colour));
    if let Some((name, colour)) = pad {
        world.ship.thrust_colour = colour;
        world.post_message(format!("Landed at {} base", name));
        log::info!("Landed at {}", name);

        if let Some(transfer) = world.ship.stunts.on_landed(&name, now) {
            world.post_message(format!("Flight time: {:.3}s", transfer.flight_ms / 1000.0));
            outcome.events.push(SimEvent::FlightTime { ms: transfer.flight_ms });
            if let Some(record) = transfer.award {
                world.post_message(record.announcement());
                outcome.events.push(SimEvent::Stunt(record));
            }
        }
        outcome.events.push(SimEvent::Landed { pad: name });
    }

    let facing = world.ship.facing;
    world.ship.stunts.clear(facing);
}

fn crash(world: &mut World, check: &LandingCheck, outcome: &mut TickOutcome) {
    let reason = check.reason().unwrap_or_default();
    log::info!("Crashed: {}", reason);
    world.spawn_explosion(world.ship.pos);
    world.ship.respawn();
    world.screen_shake = 1.0;
    world.post_message(format!("cause of crash: {}", reason));
    outcome.events.push(SimEvent::Crashed { reason });
}
