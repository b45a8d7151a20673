//! Terrain height field and landing pads
//!
//! Terrain is generated once per session from a seed and is immutable apart
//! from each pad's fuel reserve.
//!
//! **Seed-based determinism:** pad layout, names, colours and the height
//! noise all derive from the seed, so the same seed always yields the same
//! terrain for a given view size.

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_VIEW_HEIGHT, DEFAULT_VIEW_WIDTH, MIN_X_STEP, PAD_MAX_FUEL};
use crate::{map_range, snap_to};

/// Names handed out to landing pads (shuffled per seed)
const PAD_NAMES: [&str; 14] = [
    "Able", "Baker", "Charlie", "Dog", "Echo", "Fox", "Inigo", "Lima", "Oscar", "Patel",
    "Reynolds", "Tango", "Shiffman", "Whiskey",
];

/// Pad colours, 0xRRGGBB (brighter entries of the Tundra3 palette)
const PAD_COLOURS: [u32; 4] = [0x87c3ca, 0xb2475d, 0xeb7f64, 0xd9c67a];

/// Possible pad layouts, as fractions of view width for each pad centre
const PAD_LAYOUTS: [&[f32]; 2] = [&[0.2, 0.8], &[0.2, 0.4, 0.8]];

/// Derive a deterministic u32 noise seed from a session seed and an offset.
#[inline]
pub(crate) fn noise_seed(seed: u64, offset: u64) -> u32 {
    ((seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
        >> 32) as u32
}

/// A flat terrain segment where ships may land and refuel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandingPad {
    pub name: String,
    /// 0xRRGGBB
    pub colour: u32,
    /// World-space x of the left edge
    pub left_x: f32,
    pub width: f32,
    pub centre_x: f32,
    /// Fuel remaining in the pad's tank
    pub fuel: f32,
    pub max_fuel: f32,
}

impl LandingPad {
    pub fn new(name: impl Into<String>, colour: u32, left_x: f32, width: f32) -> Self {
        Self {
            name: name.into(),
            colour,
            left_x,
            width,
            centre_x: left_x + width / 2.0,
            fuel: PAD_MAX_FUEL,
            max_fuel: PAD_MAX_FUEL,
        }
    }

    pub fn right_x(&self) -> f32 {
        self.left_x + self.width
    }

    /// True when `x` lies over the pad (edges inclusive)
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.left_x && x <= self.right_x()
    }

    /// Horizontal distance from `x` to the pad centre
    pub fn centre_distance(&self, x: f32) -> f32 {
        (x - self.centre_x).abs()
    }

    /// Horizontal distance from `x` to the nearer pad edge, zero when over the pad
    pub fn edge_distance(&self, x: f32) -> f32 {
        (self.centre_distance(x) - self.width / 2.0).max(0.0)
    }
}

/// Piecewise-linear ground plus its landing pads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    /// Outline points, strictly increasing in x
    pub points: Vec<Vec2>,
    pub pads: Vec<LandingPad>,
}

impl Terrain {
    /// Generate terrain for a view of the given size
    ///
    /// Points are laid every `x_step` from `-x_step` to just past the right
    /// edge. Heights come from seeded noise inside the band
    /// `[0.3, 0.9] * view_height`; any point over a pad repeats the previous
    /// height so the pad sits on a level plateau.
    /// A spacing below `MIN_X_STEP` (or NaN) is raised to `MIN_X_STEP`, and a
    /// non-finite view falls back to the default view size.
    pub fn generate(seed: u64, view_width: f32, view_height: f32, x_step: f32, pad_width: f32) -> Self {
        let x_step = x_step.max(MIN_X_STEP);
        let (view_width, view_height) = if view_width.is_finite() && view_height.is_finite() {
            (view_width.max(0.0), view_height)
        } else {
            log::warn!("Unusable view {}x{}, using default size", view_width, view_height);
            (DEFAULT_VIEW_WIDTH, DEFAULT_VIEW_HEIGHT)
        };
        let mut rng = Pcg32::seed_from_u64(seed);
        let pads = generate_pads(&mut rng, view_width, x_step, pad_width);

        let perlin = Perlin::new(noise_seed(seed, 0));
        let top = view_height * 0.3;
        let bottom = view_height * 0.9;

        let mut points = Vec::new();
        let mut prev_y: Option<f32> = None;
        // last column whose x is still left of view_width + x_step
        let columns = ((view_width + x_step) / x_step).ceil() as i32;
        for i in -1..columns {
            let x = i as f32 * x_step;
            let over_pad = pads.iter().any(|pad| pad.contains_x(x));
            let y = match prev_y {
                Some(y) if over_pad => y,
                _ => {
                    let raw = perlin.get([2000.0 + x as f64 / 300.0, 0.5]);
                    let unit = ((raw + 1.0) * 0.5) as f32;
                    let y = map_range(unit, 0.15, 0.85, bottom, top, true);
                    prev_y = Some(y);
                    y
                }
            };
            points.push(Vec2::new(x, y));
        }

        log::debug!(
            "Generated terrain: {} points, pads [{}]",
            points.len(),
            pads.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
        );

        Self { points, pads }
    }

    /// Ground height (world-space y) at `x`
    ///
    /// Interpolates between the bracketing points; outside the outline the
    /// nearest endpoint's height is returned.
    pub fn height_at(&self, x: f32) -> f32 {
        let after = self.points.partition_point(|p| p.x <= x);
        match (after.checked_sub(1).and_then(|i| self.points.get(i)), self.points.get(after)) {
            (Some(before), Some(after)) => {
                map_range(x, before.x, after.x, before.y, after.y, true)
            }
            (Some(only), None) | (None, Some(only)) => only.y,
            (None, None) => 0.0,
        }
    }

    pub fn is_over_any_pad(&self, x: f32) -> bool {
        self.pads.iter().any(|pad| pad.contains_x(x))
    }

    pub fn pad_at(&self, x: f32) -> Option<&LandingPad> {
        self.pads.iter().find(|pad| pad.contains_x(x))
    }

    pub fn pad_at_mut(&mut self, x: f32) -> Option<&mut LandingPad> {
        self.pads.iter_mut().find(|pad| pad.contains_x(x))
    }

    /// Pad whose centre is closest to `x`
    pub fn nearest_pad(&self, x: f32) -> Option<&LandingPad> {
        self.pads
            .iter()
            .min_by(|a, b| a.centre_distance(x).total_cmp(&b.centre_distance(x)))
    }

    /// Distance from `x` to the nearest edge of the nearest pad (infinite without pads)
    pub fn edge_distance_to_nearest_pad(&self, x: f32) -> f32 {
        self.nearest_pad(x)
            .map(|pad| pad.edge_distance(x))
            .unwrap_or(f32::INFINITY)
    }
}

fn generate_pads(rng: &mut Pcg32, view_width: f32, x_step: f32, pad_width: f32) -> Vec<LandingPad> {
    let layout = PAD_LAYOUTS[rng.random_range(0..PAD_LAYOUTS.len())];
    let mut names = PAD_NAMES;
    names.shuffle(rng);
    let mut colours = PAD_COLOURS;
    colours.shuffle(rng);

    layout
        .iter()
        .zip(names)
        .enumerate()
        .map(|(ix, (frac, name))| {
            let left_x = snap_to(frac * view_width - pad_width / 2.0, x_step);
            LandingPad::new(name, colours[ix % colours.len()], left_x, pad_width)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn terrain(seed: u64) -> Terrain {
        Terrain::generate(seed, 1280.0, 720.0, 15.0, 90.0)
    }

    #[test]
    fn test_same_seed_same_terrain() {
        assert_eq!(terrain(42), terrain(42));
    }

    #[test]
    fn test_pad_layout() {
        let t = terrain(7);
        assert!(t.pads.len() == 2 || t.pads.len() == 3);
        for pad in &t.pads {
            assert_eq!(pad.width, 90.0);
            assert_eq!(pad.left_x % 15.0, 0.0);
            assert_eq!(pad.centre_x, pad.left_x + 45.0);
            assert_eq!(pad.fuel, PAD_MAX_FUEL);
        }
        let mut names: Vec<_> = t.pads.iter().map(|p| p.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), t.pads.len());
    }

    #[test]
    fn test_outline_covers_view() {
        let t = terrain(3);
        assert_eq!(t.points.first().unwrap().x, -15.0);
        assert!(t.points.last().unwrap().x >= 1280.0);
    }

    #[test]
    fn test_height_clamps_outside_outline() {
        let t = terrain(11);
        let first = t.points.first().unwrap();
        let last = t.points.last().unwrap();
        assert_eq!(t.height_at(-5000.0), first.y);
        assert_eq!(t.height_at(first.x), first.y);
        assert_eq!(t.height_at(5000.0), last.y);
    }

    #[test]
    fn test_height_interpolates_between_points() {
        let t = Terrain {
            points: vec![Vec2::new(0.0, 100.0), Vec2::new(10.0, 200.0)],
            pads: Vec::new(),
        };
        assert_eq!(t.height_at(5.0), 150.0);
        assert_eq!(t.height_at(10.0), 200.0);
    }

    #[test]
    fn test_pad_lookup() {
        let t = Terrain {
            points: vec![Vec2::new(0.0, 100.0), Vec2::new(500.0, 100.0)],
            pads: vec![
                LandingPad::new("Able", 0xffffff, 90.0, 90.0),
                LandingPad::new("Baker", 0xffffff, 300.0, 90.0),
            ],
        };
        assert_eq!(t.pad_at(90.0).map(|p| p.name.as_str()), Some("Able"));
        assert_eq!(t.pad_at(180.0).map(|p| p.name.as_str()), Some("Able"));
        assert!(t.pad_at(200.0).is_none());
        assert_eq!(t.nearest_pad(260.0).map(|p| p.name.as_str()), Some("Baker"));
        assert_eq!(t.edge_distance_to_nearest_pad(200.0), 20.0);
        assert_eq!(t.edge_distance_to_nearest_pad(120.0), 0.0);
    }

    #[test]
    fn test_degenerate_spacing_still_terminates() {
        let t = Terrain::generate(1, 1280.0, 720.0, 0.0, 90.0);
        assert_eq!(t.points[1].x - t.points[0].x, MIN_X_STEP);
        assert!(t.points.last().unwrap().x >= 1280.0);

        let t = Terrain::generate(1, 1280.0, 720.0, -15.0, 90.0);
        assert!(t.points.windows(2).all(|w| w[0].x < w[1].x));

        let t = Terrain::generate(1, f32::NAN, 720.0, 15.0, 90.0);
        assert_eq!(t, Terrain::generate(1, DEFAULT_VIEW_WIDTH, DEFAULT_VIEW_HEIGHT, 15.0, 90.0));
    }

    #[test]
    fn test_no_pads_is_infinitely_far() {
        let t = Terrain { points: vec![Vec2::ZERO], pads: Vec::new() };
        assert!(t.edge_distance_to_nearest_pad(0.0).is_infinite());
        assert!(t.nearest_pad(0.0).is_none());
    }

    proptest! {
        #[test]
        fn generation_is_reproducible(seed in any::<u64>()) {
            prop_assert_eq!(terrain(seed), terrain(seed));
        }

        #[test]
        fn points_strictly_increase_in_x(seed in any::<u64>()) {
            let t = terrain(seed);
            prop_assert!(t.points.windows(2).all(|w| w[0].x < w[1].x));
        }

        #[test]
        fn heights_stay_in_band(seed in any::<u64>()) {
            let t = terrain(seed);
            prop_assert!(t.points.iter().all(|p| p.y >= 720.0 * 0.3 && p.y <= 720.0 * 0.9));
        }

        #[test]
        fn pads_are_flat(seed in any::<u64>(), frac in 0.0f32..=1.0) {
            let t = terrain(seed);
            for pad in &t.pads {
                let at_left = t.height_at(pad.left_x);
                let x = pad.left_x + frac * pad.width;
                prop_assert_eq!(t.height_at(x), at_left);
                prop_assert_eq!(t.height_at(pad.right_x()), at_left);
            }
        }
    }
}
