//! Transient visual effects and toast messages
//!
//! None of these affect gameplay. Each entry carries its own lifetime and
//! is dropped once it expires.

use glam::Vec2;
use rand::Rng;
use rand_distr::StandardNormal;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::terrain::Terrain;
use crate::consts::EXPLOSION_FRAMES;

/// Standard deviation of the exhaust direction around straight back (radians)
const EXHAUST_SPREAD: f32 = std::f32::consts::PI / 20.0;

/// Ship-local thruster offsets (x along the nose axis)
const THRUSTER_OFFSETS: [Vec2; 2] = [Vec2::new(-10.0, 10.0), Vec2::new(-10.0, -10.0)];

/// A thrust exhaust particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Frame the particle was emitted on
    pub born_frame: u64,
    /// Lifetime in frames
    pub max_age: u64,
    /// 0xRRGGBB
    pub colour: u32,
    pub size: f32,
}

impl Particle {
    /// Advance one frame; returns false once the particle should be removed
    pub fn update(&mut self, frame: u64, terrain: &Terrain) -> bool {
        self.pos += self.vel;
        let underground = terrain.height_at(self.pos.x) < self.pos.y;
        let expired = frame.saturating_sub(self.born_frame) > self.max_age;
        !(underground || expired)
    }
}

/// Emit one particle per thruster, flying roughly opposite to the thrust
pub fn emit_thrust_particles(
    rng: &mut Pcg32,
    ship_pos: Vec2,
    facing: f32,
    colour: u32,
    frame: u64,
) -> Vec<Particle> {
    let rotation = Vec2::from_angle(facing);
    THRUSTER_OFFSETS
        .iter()
        .map(|offset| {
            let spread = rng.sample::<f32, _>(StandardNormal) * EXHAUST_SPREAD;
            let speed = rng.random_range(1.45..1.55);
            let exhaust = Vec2::from_angle(facing + std::f32::consts::PI + spread) * speed;
            Particle {
                pos: ship_pos + rotation.rotate(*offset),
                vel: exhaust,
                born_frame: frame,
                max_age: rng.random_range(60..120),
                colour,
                size: if rng.random_bool(0.5) { 1.0 } else { 2.0 },
            }
        })
        .collect()
}

/// A crash explosion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub born_frame: u64,
}

impl Explosion {
    pub fn is_alive(&self, frame: u64) -> bool {
        frame.saturating_sub(self.born_frame) < EXPLOSION_FRAMES
    }
}

/// A short-lived text notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    /// Session clock when posted (ms)
    pub posted_ms: f64,
    pub duration_ms: f64,
}

impl Message {
    pub fn is_visible(&self, now_ms: f64) -> bool {
        now_ms < self.posted_ms + self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn flat(y: f32) -> Terrain {
        Terrain {
            points: vec![Vec2::new(-100.0, y), Vec2::new(1000.0, y)],
            pads: Vec::new(),
        }
    }

    #[test]
    fn test_particles_leave_behind_upright_ship() {
        let mut rng = Pcg32::seed_from_u64(1);
        let ship = Vec2::new(200.0, 100.0);
        let particles =
            emit_thrust_particles(&mut rng, ship, crate::consts::UPRIGHT_FACING, 0xffffff, 0);
        assert_eq!(particles.len(), 2);
        for p in &particles {
            // exhaust heads down, emitted below the ship centre
            assert!(p.vel.y > 0.0);
            let speed = p.vel.length();
            assert!(speed >= 1.45 - 1e-4 && speed <= 1.55 + 1e-4);
            assert!(p.pos.y > ship.y);
            assert!((60..120).contains(&p.max_age));
        }
    }

    #[test]
    fn test_exhaust_spread_is_normal_around_straight_back() {
        let mut rng = Pcg32::seed_from_u64(9);
        let upright = crate::consts::UPRIGHT_FACING;
        let devs: Vec<f32> = (0..1000)
            .flat_map(|frame| emit_thrust_particles(&mut rng, Vec2::ZERO, upright, 0, frame))
            .map(|p| p.vel.y.atan2(p.vel.x) - std::f32::consts::FRAC_PI_2)
            .collect();
        let n = devs.len() as f32;
        let mean = devs.iter().sum::<f32>() / n;
        let std_dev = (devs.iter().map(|d| (d - mean).powi(2)).sum::<f32>() / n).sqrt();
        assert!(mean.abs() < 0.02, "mean {}", mean);
        assert!((std_dev - EXHAUST_SPREAD).abs() < 0.02, "std dev {}", std_dev);
        // a normal spread reaches well past two standard deviations now and then
        assert!(devs.iter().any(|d| d.abs() > 2.0 * EXHAUST_SPREAD));
    }

    #[test]
    fn test_particle_dies_underground() {
        let mut p = Particle {
            pos: Vec2::new(10.0, 99.0),
            vel: Vec2::new(0.0, 2.0),
            born_frame: 0,
            max_age: 100,
            colour: 0,
            size: 1.0,
        };
        assert!(!p.update(1, &flat(100.0)));
    }

    #[test]
    fn test_particle_dies_of_age() {
        let mut p = Particle {
            pos: Vec2::new(10.0, 0.0),
            vel: Vec2::ZERO,
            born_frame: 10,
            max_age: 60,
            colour: 0,
            size: 1.0,
        };
        assert!(p.update(70, &flat(100.0)));
        assert!(!p.update(71, &flat(100.0)));
    }

    #[test]
    fn test_explosion_lifetime() {
        let e = Explosion { pos: Vec2::ZERO, born_frame: 5 };
        assert!(e.is_alive(34));
        assert!(!e.is_alive(35));
    }

    #[test]
    fn test_message_expiry() {
        let m = Message {
            text: "hi".into(),
            posted_ms: 1000.0,
            duration_ms: 5000.0,
        };
        assert!(m.is_visible(5999.0));
        assert!(!m.is_visible(6000.0));
    }
}
