//! Session state
//!
//! `World` owns everything for one play session: settings, the ship, the
//! terrain, transient effects, and the deferred-task queue. There are no
//! globals; every operation goes through an explicit `&mut World`.

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::effects::{Explosion, Message, Particle};
use super::landing::LandingCheck;
use super::schedule::{DeferredAction, Scheduler};
use super::ship::Ship;
use super::stunts::StuntRecord;
use super::terrain::{Terrain, noise_seed};
use super::wind::WindField;
use crate::consts::*;
use crate::settings::{Feature, Settings};

/// Shown one per second when a session starts
const FLAVOUR_MESSAGES: [&str; 5] = [
    "Guidance and navigation, all green",
    "Propellant quantity reads nominal",
    "Telemetry data confirms a stable attitude",
    "Switching to manual",
    "('h' for help)",
];

const CORE_INSTRUCTIONS: [&str; 6] = [
    "'a' & 'd' or left & right arrows to rotate",
    "'w' or up arrow to thrust",
    "'r' to restart / regenerate",
    "'2' to toggle wind",
    "'z' to toggle zen mode",
    "'h' to get complete help",
];

const OTHER_INSTRUCTIONS: [&str; 4] = [
    "'4' to toggle stars",
    "'b' to toggle debug text",
    "'k' to toggle screenshake",
    "'c' to clear messages",
];

/// Toggle values saved when entering zen mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZenBackup {
    pub wind: bool,
    pub debug_messages: bool,
    pub stars: bool,
}

impl ZenBackup {
    fn capture(settings: &Settings) -> Self {
        Self {
            wind: settings.wind_enabled,
            debug_messages: settings.debug_messages_enabled,
            stars: settings.stars_enabled,
        }
    }

    fn value(&self, feature: Feature) -> Option<bool> {
        match feature {
            Feature::Wind => Some(self.wind),
            Feature::DebugMessages => Some(self.debug_messages),
            Feature::Stars => Some(self.stars),
            Feature::ScreenShake => None,
        }
    }
}

/// One play session
#[derive(Debug, Clone)]
pub struct World {
    pub settings: Settings,
    /// Seed of the current terrain
    pub seed: u64,
    /// Bumped on every restart; deferred tasks from older generations are void
    pub generation: u32,
    pub view_size: Vec2,
    pub ship: Ship,
    pub terrain: Terrain,
    pub wind: WindField,
    pub particles: Vec<Particle>,
    pub explosions: Vec<Explosion>,
    pub messages: Vec<Message>,
    /// 0 means no shake; set to 1 on crash and decays each tick
    pub screen_shake: f32,
    /// Session clock (ms), advanced by each tick's dt
    pub clock_ms: f64,
    /// Ticks since the session began
    pub frame: u64,
    pub zen_backup: Option<ZenBackup>,
    pub scheduler: Scheduler,
    pub(crate) rng: Pcg32,
    shake_noise: Perlin,
}

impl World {
    /// Create a new session with terrain generated from `seed`
    pub fn new(settings: Settings, seed: u64, view_width: f32, view_height: f32) -> Self {
        let terrain = Terrain::generate(seed, view_width, view_height, settings.x_step, settings.pad_width);
        log::info!("New session with seed {}", seed);
        Self {
            settings,
            seed,
            generation: 0,
            view_size: Vec2::new(view_width, view_height),
            ship: Ship::new(),
            terrain,
            wind: WindField::new(seed),
            particles: Vec::new(),
            explosions: Vec::new(),
            messages: Vec::new(),
            screen_shake: 0.0,
            clock_ms: 0.0,
            frame: 0,
            zen_backup: None,
            scheduler: Scheduler::new(),
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed_1a4d),
            shake_noise: Perlin::new(noise_seed(seed, 2)),
        }
    }

    /// Regenerate terrain from a new seed and start over
    ///
    /// Settings and the clock survive; ship, effects, messages and every
    /// pending deferred task are discarded.
    pub fn restart(&mut self, seed: u64) {
        self.generation = self.generation.wrapping_add(1);
        self.scheduler.cancel_stale(self.generation);
        self.seed = seed;
        self.terrain = Terrain::generate(
            seed,
            self.view_size.x,
            self.view_size.y,
            self.settings.x_step,
            self.settings.pad_width,
        );
        self.wind = WindField::new(seed);
        self.shake_noise = Perlin::new(noise_seed(seed, 2));
        self.rng = Pcg32::seed_from_u64(seed ^ 0x5eed_1a4d);
        self.ship = Ship::new();
        self.particles.clear();
        self.explosions.clear();
        self.messages.clear();
        self.screen_shake = 0.0;
        log::info!("Restarted (generation {}) with seed {}", self.generation, seed);
    }

    /// Seed for the next restart, drawn from the session RNG
    pub fn next_seed(&mut self) -> u64 {
        self.rng.random()
    }

    /// Horizontal wind at `pos` right now; zero while wind is disabled
    pub fn wind_at(&self, pos: Vec2) -> f32 {
        if !self.settings.wind_enabled {
            return 0.0;
        }
        self.wind.at(pos, self.frame as f64 / 500.0)
    }

    pub fn clearance(&self) -> f32 {
        self.ship.clearance(&self.terrain)
    }

    // === Messages ===

    pub fn post_message(&mut self, text: impl Into<String>) {
        self.post_message_for(text, DEFAULT_MESSAGE_MS);
    }

    pub fn post_message_for(&mut self, text: impl Into<String>, duration_ms: f64) {
        let text = text.into();
        log::debug!("Message: {}", text);
        self.messages.push(Message {
            text,
            posted_ms: self.clock_ms,
            duration_ms,
        });
    }

    /// Post each message one second after the previous, each shown for ten seconds
    pub fn post_messages_at_intervals<S: AsRef<str>>(&mut self, texts: &[S]) {
        for (i, text) in texts.iter().enumerate() {
            self.schedule_in(
                i as f64 * INTERVAL_MESSAGE_SPACING_MS,
                DeferredAction::PostMessage {
                    text: text.as_ref().to_string(),
                    duration_ms: INTERVAL_MESSAGE_MS,
                },
            );
        }
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// Start-of-session chatter from mission control
    pub fn post_flavour_messages(&mut self) {
        self.post_messages_at_intervals(&FLAVOUR_MESSAGES);
    }

    /// List the controls; `all` adds the less common toggles
    pub fn post_instructional_messages(&mut self, all: bool) {
        let mut texts = CORE_INSTRUCTIONS.to_vec();
        if all {
            texts.extend(OTHER_INSTRUCTIONS);
        }
        self.post_messages_at_intervals(&texts[..]);
    }

    // === Toggles ===

    /// Flip a feature and announce it
    pub fn toggle_feature(&mut self, feature: Feature) {
        let enabled = self.settings.toggle(feature);
        let desc = if enabled { "enabled" } else { "disabled" };
        self.post_message(format!("{} {}", feature.label(), desc));
    }

    /// Enter or leave zen mode, staggering the affected toggles
    pub fn toggle_zen_mode(&mut self) {
        self.settings.zen_mode_enabled = !self.settings.zen_mode_enabled;
        if self.settings.zen_mode_enabled {
            self.zen_backup = Some(ZenBackup::capture(&self.settings));
            let mut delay = 0.0;
            for feature in Feature::ZEN {
                self.schedule_in(delay, DeferredAction::SetFeature(feature, false));
                delay += ZEN_STEP_MS;
            }
            self.schedule_in(delay, DeferredAction::ClearMessages);
            log::info!("Zen mode on");
        } else {
            if let Some(backup) = self.zen_backup {
                let mut delay = 0.0;
                for feature in Feature::ZEN.iter().rev() {
                    if let Some(value) = backup.value(*feature) {
                        self.schedule_in(delay, DeferredAction::SetFeature(*feature, value));
                        delay += ZEN_STEP_MS;
                    }
                }
            }
            log::info!("Zen mode off");
        }
    }

    /// True while staggered zen-mode toggles are still queued
    pub fn zen_transition_in_progress(&self) -> bool {
        self.scheduler.any_pending(self.generation, |action| {
            matches!(action, DeferredAction::SetFeature(..))
        })
    }

    /// Settings as they should be stored, or `None` mid zen transition
    ///
    /// While in zen mode the toggles saved on entry are reported instead of
    /// the zen values, so a reload comes back with the player's own choices.
    pub fn settings_to_persist(&self) -> Option<Settings> {
        if self.zen_transition_in_progress() {
            return None;
        }
        let mut settings = self.settings.clone();
        if settings.zen_mode_enabled {
            if let Some(backup) = self.zen_backup {
                for feature in Feature::ZEN {
                    if let Some(value) = backup.value(feature) {
                        settings.set_enabled(feature, value);
                    }
                }
            }
        }
        Some(settings)
    }

    // === Deferred tasks ===

    /// Queue an action `delay_ms` from now in the current generation
    pub fn schedule_in(&mut self, delay_ms: f64, action: DeferredAction) {
        self.scheduler
            .schedule(self.generation, self.clock_ms + delay_ms, action);
    }

    /// Run every deferred action that has come due
    pub fn run_due_tasks(&mut self) {
        for action in self.scheduler.take_due(self.generation, self.clock_ms) {
            log::debug!("Running deferred {:?}", action);
            match action {
                DeferredAction::SetFeature(feature, enabled) => {
                    self.settings.set_enabled(feature, enabled)
                }
                DeferredAction::ClearMessages => self.clear_messages(),
                DeferredAction::PostMessage { text, duration_ms } => {
                    self.post_message_for(text, duration_ms)
                }
            }
        }
    }

    // === Effects ===

    pub fn spawn_explosion(&mut self, pos: Vec2) {
        self.explosions.push(Explosion {
            pos,
            born_frame: self.frame,
        });
    }

    /// Current screen displacement from shake; zero when disabled or settled
    pub fn screen_shake_offset(&self) -> Vec2 {
        if !self.settings.screen_shake_enabled || self.screen_shake <= 0.0 {
            return Vec2::ZERO;
        }
        let f = self.frame as f64;
        let unit = |raw: f64| ((raw + 1.0) * 0.5) as f32;
        let angle = crate::map_range(
            unit(self.shake_noise.get([f * 0.05, 0.5])),
            0.1,
            0.9,
            0.0,
            std::f32::consts::TAU * 2.0,
            true,
        );
        let magnitude = crate::map_range(
            unit(self.shake_noise.get([2000.0 + f * 0.1, 0.5])),
            0.1,
            0.9,
            -1.0,
            1.0,
            true,
        ) * SCREEN_SHAKE_MAX_OFFSET
            * self.screen_shake;
        Vec2::from_angle(angle) * magnitude
    }

    /// Age out particles, explosions, messages and screen shake
    pub(crate) fn update_effects(&mut self) {
        let frame = self.frame;
        let terrain = &self.terrain;
        self.particles.retain_mut(|p| p.update(frame, terrain));
        self.explosions.retain(|e| e.is_alive(frame));
        let now = self.clock_ms;
        self.messages.retain(|m| m.is_visible(now));
        self.screen_shake = (self.screen_shake - SCREEN_SHAKE_DECAY).clamp(0.0, 1.0);
    }

    // === Cheats ===

    /// Park the ship just above a random pad, falling gently
    pub fn cheat_easy_landing(&mut self) {
        if self.terrain.pads.is_empty() {
            return;
        }
        let ix = self.rng.random_range(0..self.terrain.pads.len());
        let pad = &self.terrain.pads[ix];
        let x = pad.left_x + pad.width / 2.0;
        let ground = self.terrain.height_at(pad.left_x);
        self.ship.pos = Vec2::new(x, ground - 40.0 - self.ship.height / 2.0);
        self.ship.set_upright();
        self.ship.vel = Vec2::new(0.0, 0.5);
        self.ship.state = super::ship::ShipState::Flying;
        self.post_message("cheat! easy landing prepared");
    }

    /// Read-only view for the presentation layer
    pub fn snapshot<'a>(&'a self, landing_check: Option<&'a LandingCheck>) -> Snapshot<'a> {
        Snapshot {
            frame: self.frame,
            clock_ms: self.clock_ms,
            seed: self.seed,
            ship: &self.ship,
            tilt_degrees: self.ship.tilt().to_degrees(),
            clearance: self.clearance(),
            terrain: &self.terrain,
            particles: &self.particles,
            explosions: &self.explosions,
            messages: &self.messages,
            stunt_log: &self.ship.stunts.log,
            screen_shake_offset: self.screen_shake_offset(),
            settings: &self.settings,
            landing_check,
            landing_reason: landing_check.and_then(|c| c.reason()),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub frame: u64,
    pub clock_ms: f64,
    pub seed: u64,
    pub ship: &'a Ship,
    pub tilt_degrees: f32,
    pub clearance: f32,
    pub terrain: &'a Terrain,
    pub particles: &'a [Particle],
    pub explosions: &'a [Explosion],
    pub messages: &'a [Message],
    pub stunt_log: &'a [StuntRecord],
    pub screen_shake_offset: Vec2,
    pub settings: &'a Settings,
    pub landing_check: Option<&'a LandingCheck>,
    pub landing_reason: Option<String>,
}

impl Snapshot<'_> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(Settings::default(), 1234, 1280.0, 720.0)
    }

    #[test]
    fn test_new_world() {
        let w = world();
        assert!(w.ship.is_flying());
        assert!(w.terrain.pads.len() >= 2);
        assert_eq!(w.generation, 0);
        assert!(w.messages.is_empty());
    }

    #[test]
    fn test_wind_disabled_is_calm() {
        let mut w = world();
        w.settings.wind_enabled = false;
        for i in 0..200 {
            w.frame = i * 97;
            assert_eq!(w.wind_at(Vec2::new(i as f32 * 13.0, 300.0)), 0.0);
        }
    }

    #[test]
    fn test_restart_regenerates_and_resets() {
        let mut w = world();
        w.ship.fuel = 0.2;
        w.post_message("old");
        w.spawn_explosion(Vec2::ZERO);
        w.screen_shake = 1.0;
        w.restart(999);
        assert_eq!(w.generation, 1);
        assert_eq!(w.seed, 999);
        assert_eq!(w.terrain, Terrain::generate(999, 1280.0, 720.0, 15.0, 90.0));
        assert_eq!(w.ship.fuel, 1.0);
        assert!(w.messages.is_empty());
        assert!(w.explosions.is_empty());
        assert_eq!(w.screen_shake, 0.0);
    }

    #[test]
    fn test_toggle_feature_announces() {
        let mut w = world();
        w.toggle_feature(Feature::Wind);
        assert!(!w.settings.wind_enabled);
        assert_eq!(w.messages.last().unwrap().text, "wind disabled");
        w.toggle_feature(Feature::Wind);
        assert_eq!(w.messages.last().unwrap().text, "wind enabled");
    }

    #[test]
    fn test_messages_at_intervals_arrive_one_per_second() {
        let mut w = world();
        w.post_messages_at_intervals(&["one", "two", "three"]);
        w.run_due_tasks();
        assert_eq!(w.messages.len(), 1);
        w.clock_ms = 1000.0;
        w.run_due_tasks();
        assert_eq!(w.messages.len(), 2);
        w.clock_ms = 2500.0;
        w.run_due_tasks();
        let texts: Vec<_> = w.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "three"]);
        assert!(w.messages.iter().all(|m| m.duration_ms == INTERVAL_MESSAGE_MS));
    }

    #[test]
    fn test_restart_cancels_pending_messages() {
        let mut w = world();
        w.post_messages_at_intervals(&["one", "two"]);
        w.restart(5);
        w.clock_ms = 10_000.0;
        w.run_due_tasks();
        assert!(w.messages.is_empty());
        assert_eq!(w.scheduler.pending(), 0);
    }

    #[test]
    fn test_screen_shake_offset_respects_toggle() {
        let mut w = world();
        w.screen_shake = 1.0;
        w.settings.screen_shake_enabled = false;
        assert_eq!(w.screen_shake_offset(), Vec2::ZERO);
        w.settings.screen_shake_enabled = true;
        for frame in 0..60 {
            w.frame = frame;
            assert!(w.screen_shake_offset().length() <= SCREEN_SHAKE_MAX_OFFSET + 1e-4);
        }
    }

    #[test]
    fn test_cheat_easy_landing_parks_above_pad() {
        let mut w = world();
        w.ship.facing = 2.0;
        w.cheat_easy_landing();
        let pad = w.terrain.pad_at(w.ship.pos.x).unwrap();
        assert_eq!(w.ship.pos.x, pad.centre_x);
        assert!((w.clearance() - 40.0).abs() < 1e-3);
        assert_eq!(w.ship.vel, Vec2::new(0.0, 0.5));
        assert_eq!(w.ship.tilt(), 0.0);
        assert_eq!(w.messages.last().unwrap().text, "cheat! easy landing prepared");
    }

    #[test]
    fn test_snapshot_serializes() {
        let w = world();
        let check = LandingCheck::Rejected(crate::sim::landing::LandingFault::NotOverPad);
        let json = w.snapshot(Some(&check)).to_json().unwrap();
        assert!(json.contains("\"landing_reason\":\"not over landing pad\""));
        assert!(json.contains("\"pads\""));
    }
}
