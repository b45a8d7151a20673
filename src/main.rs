//! Lunar Lander entry point
//!
//! The web build is driven from JavaScript through `platform::web`; natively
//! this runs a short headless flight and prints the final snapshot.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lunar_lander::consts::*;
    use lunar_lander::sim::{SimEvent, TickInput, World, tick};
    use lunar_lander::{Settings, platform};

    env_logger::init();
    log::info!("Lunar Lander (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(platform::fresh_seed);
    let mut world = World::new(Settings::load(), seed, DEFAULT_VIEW_WIDTH, DEFAULT_VIEW_HEIGHT);
    world.post_flavour_messages();

    // Drop onto a pad and hold the descent under the landing limit
    let mut input = TickInput {
        cheat_easy_landing: true,
        ..Default::default()
    };
    let mut last_check = None;
    for frame in 0..600 {
        input.thrust = world.ship.is_flying() && world.ship.vel.y > MAX_LANDING_DESCENT_SPEED * 0.5;
        let outcome = tick(&mut world, &input, SIM_DT);
        input.cheat_easy_landing = false;
        last_check = outcome.landing_check;

        for event in &outcome.events {
            log::info!("frame {}: {:?}", frame, event);
        }
        if outcome
            .events
            .iter()
            .any(|e| matches!(e, SimEvent::Landed { .. } | SimEvent::Crashed { .. }))
        {
            break;
        }
    }

    match world.snapshot(last_check.as_ref()).to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not serialize snapshot: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
