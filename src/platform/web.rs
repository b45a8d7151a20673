//! Browser entry points
//!
//! A JavaScript presentation layer owns the canvas and key handling; it
//! drives a [`WebSession`] once per animation frame and renders from the
//! JSON snapshot.

use wasm_bindgen::prelude::*;

use crate::consts::SIM_DT;
use crate::settings::{Feature, Settings};
use crate::sim::{LandingCheck, TickInput, World, tick};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::info!("Lunar Lander starting...");
}

/// One play session, driven from JavaScript
#[wasm_bindgen]
pub struct WebSession {
    world: World,
    input: TickInput,
    last_check: Option<LandingCheck>,
    /// Last settings written to LocalStorage
    saved: Settings,
}

#[wasm_bindgen]
impl WebSession {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebSession {
        let seed = super::fresh_seed();
        log::info!("Session initialized with seed: {}", seed);
        let settings = Settings::load();
        let mut world = World::new(settings.clone(), seed, width, height);
        world.post_flavour_messages();
        WebSession {
            world,
            input: TickInput::default(),
            last_check: None,
            saved: settings,
        }
    }

    /// Held-key state, sampled every frame
    pub fn set_controls(&mut self, thrust: bool, turn_left: bool, turn_right: bool) {
        self.input.thrust = thrust;
        self.input.turn_left = turn_left;
        self.input.turn_right = turn_right;
    }

    pub fn restart(&mut self) {
        self.input.restart = true;
    }

    pub fn toggle_wind(&mut self) {
        self.input.toggle_wind = true;
    }

    pub fn toggle_zen_mode(&mut self) {
        self.input.toggle_zen_mode = true;
    }

    pub fn toggle_stars(&mut self) {
        self.input.toggle_feature = Some(Feature::Stars);
    }

    pub fn toggle_screen_shake(&mut self) {
        self.input.toggle_feature = Some(Feature::ScreenShake);
    }

    pub fn toggle_debug_messages(&mut self) {
        self.input.toggle_feature = Some(Feature::DebugMessages);
    }

    pub fn clear_messages(&mut self) {
        self.input.clear_messages = true;
    }

    pub fn show_help(&mut self) {
        self.input.show_help = true;
    }

    pub fn cheat_easy_landing(&mut self) {
        self.input.cheat_easy_landing = true;
    }

    /// Run one simulation step; returns the tick's events as JSON
    pub fn step(&mut self) -> String {
        let outcome = tick(&mut self.world, &self.input, SIM_DT);
        self.last_check = outcome.landing_check;

        // Clear one-shot inputs after processing
        self.input.restart = false;
        self.input.toggle_wind = false;
        self.input.toggle_feature = None;
        self.input.toggle_zen_mode = false;
        self.input.clear_messages = false;
        self.input.show_help = false;
        self.input.cheat_easy_landing = false;

        // Persist once any zen transition has settled
        if let Some(settings) = self.world.settings_to_persist() {
            if settings != self.saved {
                settings.save();
                self.saved = settings;
            }
        }

        serde_json::to_string(&outcome.events).unwrap_or_else(|e| {
            log::warn!("Could not serialize events: {}", e);
            "[]".to_string()
        })
    }

    /// Read-only view of the world for rendering
    pub fn snapshot_json(&self) -> String {
        self.world
            .snapshot(self.last_check.as_ref())
            .to_json()
            .unwrap_or_else(|e| {
                log::warn!("Could not serialize snapshot: {}", e);
                "{}".to_string()
            })
    }
}
