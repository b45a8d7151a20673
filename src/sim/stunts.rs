//! Stunt detection
//!
//! Watches the ship for notable flying: full loops, sustained low-altitude
//! passes away from the pads, and fast base-to-base transfers. Awards are
//! appended to a log and returned to the caller for notification; they are
//! never errors.

use std::f32::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Medal for a fast base-to-base transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Medal {
    Gold,
    Silver,
}

impl fmt::Display for Medal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Medal::Gold => write!(f, "GOLD"),
            Medal::Silver => write!(f, "Silver"),
        }
    }
}

/// Kind of stunt awarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StuntKind {
    Loop,
    LowAltitude,
    FastTransfer(Medal),
}

impl fmt::Display for StuntKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StuntKind::Loop => write!(f, "loop"),
            StuntKind::LowAltitude => write!(f, "low-altitude"),
            StuntKind::FastTransfer(_) => write!(f, "fast-transfer"),
        }
    }
}

/// An awarded stunt (immutable once logged)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StuntRecord {
    pub kind: StuntKind,
    /// Extra detail shown with the award, e.g. `"3.2s"` or `"4.000s GOLD"`
    pub qualifier: Option<String>,
    /// Session clock at award time (ms)
    pub time_ms: f64,
}

impl StuntRecord {
    /// Notification text, e.g. `"low-altitude (3.2s)!"`
    pub fn announcement(&self) -> String {
        match &self.qualifier {
            Some(extra) => format!("{} ({})!", self.kind, extra),
            None => format!("{}!", self.kind),
        }
    }
}

/// What the monitor needs to know about the ship each tick
#[derive(Debug, Clone, Copy)]
pub struct FlightSample {
    pub facing: f32,
    /// Ground clearance under the ship
    pub clearance: f32,
    pub horizontal_speed: f32,
    /// Distance to the nearest edge of the nearest pad
    pub pad_edge_distance: f32,
}

/// Result of landing on a pad after taking off from a different one
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub flight_ms: f64,
    pub award: Option<StuntRecord>,
}

/// Per-ship stunt tracking
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StuntMonitor {
    /// Reference facing for loop detection
    pub last_facing: f32,
    pub log: Vec<StuntRecord>,
    pub last_takeoff_ms: Option<f64>,
    pub last_visited_pad: Option<String>,
    pub low_altitude_start_ms: Option<f64>,
}

impl StuntMonitor {
    pub fn new(facing: f32) -> Self {
        Self {
            last_facing: facing,
            ..Default::default()
        }
    }

    /// Forget everything, re-anchoring loop detection at `facing`
    pub fn clear(&mut self, facing: f32) {
        *self = Self::new(facing);
    }

    /// Record a takeoff from the named pad
    pub fn record_takeoff(&mut self, pad_name: &str, now_ms: f64) {
        self.last_visited_pad = Some(pad_name.to_string());
        self.last_takeoff_ms = Some(now_ms);
    }

    /// Per-tick observation; returns any stunts awarded this tick
    pub fn observe(&mut self, sample: &FlightSample, now_ms: f64) -> Vec<StuntRecord> {
        let mut awarded = Vec::new();

        if (self.last_facing - sample.facing).abs() > TAU {
            awarded.push(self.award(StuntKind::Loop, None, now_ms));
            self.last_facing = sample.facing;
        }

        let skimming = sample.clearance < LOW_ALTITUDE_CLEARANCE
            && sample.horizontal_speed.abs() > LOW_ALTITUDE_MIN_SPEED
            && sample.pad_edge_distance > LOW_ALTITUDE_PAD_MARGIN;
        if skimming {
            let start = *self.low_altitude_start_ms.get_or_insert(now_ms);
            let duration = now_ms - start;
            if duration > LOW_ALTITUDE_MIN_MS {
                let extra = format!("{:.1}s", duration / 1000.0);
                awarded.push(self.award(StuntKind::LowAltitude, Some(extra), now_ms));
                self.low_altitude_start_ms = None;
            }
        } else {
            self.low_altitude_start_ms = None;
        }

        awarded
    }

    /// Check a landing on `pad_name` for a base-to-base transfer
    ///
    /// Returns `None` unless the ship last took off from a different pad.
    pub fn on_landed(&mut self, pad_name: &str, now_ms: f64) -> Option<Transfer> {
        let from = self.last_visited_pad.as_deref()?;
        if from == pad_name {
            return None;
        }
        let takeoff = self.last_takeoff_ms?;
        let flight_ms = now_ms - takeoff;

        let award = if flight_ms < FAST_TRANSFER_SILVER_MS {
            let medal = if flight_ms < FAST_TRANSFER_GOLD_MS {
                Medal::Gold
            } else {
                Medal::Silver
            };
            let extra = format!("{:.3}s {}", flight_ms / 1000.0, medal);
            Some(self.award(StuntKind::FastTransfer(medal), Some(extra), now_ms))
        } else {
            None
        };

        Some(Transfer { flight_ms, award })
    }

    fn award(&mut self, kind: StuntKind, qualifier: Option<String>, now_ms: f64) -> StuntRecord {
        let record = StuntRecord {
            kind,
            qualifier,
            time_ms: now_ms,
        };
        log::debug!("Stunt awarded: {}", record.announcement());
        self.log.push(record.clone());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cruising(facing: f32) -> FlightSample {
        FlightSample {
            facing,
            clearance: 200.0,
            horizontal_speed: 0.0,
            pad_edge_distance: 500.0,
        }
    }

    fn skimming() -> FlightSample {
        FlightSample {
            facing: UPRIGHT_FACING,
            clearance: 20.0,
            horizontal_speed: 1.0,
            pad_edge_distance: 100.0,
        }
    }

    #[test]
    fn test_continuous_rotation_awards_one_loop() {
        let mut monitor = StuntMonitor::new(UPRIGHT_FACING);
        let mut loops = 0;
        // 1.2 turns in small increments
        for i in 0..=120 {
            let facing = UPRIGHT_FACING + i as f32 * (1.2 * TAU / 120.0);
            loops += monitor
                .observe(&cruising(facing), i as f64 * 16.0)
                .iter()
                .filter(|s| s.kind == StuntKind::Loop)
                .count();
        }
        assert_eq!(loops, 1);
        assert_eq!(monitor.log.len(), 1);
    }

    #[test]
    fn test_reverse_rotation_also_counts() {
        let mut monitor = StuntMonitor::new(0.0);
        assert!(monitor.observe(&cruising(-TAU - 0.1), 0.0).len() == 1);
    }

    #[test]
    fn test_low_altitude_streak_awards_after_three_seconds() {
        let mut monitor = StuntMonitor::new(UPRIGHT_FACING);
        assert!(monitor.observe(&skimming(), 1000.0).is_empty());
        assert!(monitor.observe(&skimming(), 3900.0).is_empty());
        let awards = monitor.observe(&skimming(), 4100.0);
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].kind, StuntKind::LowAltitude);
        assert_eq!(awards[0].qualifier.as_deref(), Some("3.1s"));
        // streak restarts after an award
        assert_eq!(monitor.low_altitude_start_ms, None);
        assert!(monitor.observe(&skimming(), 4200.0).is_empty());
        assert_eq!(monitor.low_altitude_start_ms, Some(4200.0));
    }

    #[test]
    fn test_broken_streak_resets() {
        let mut monitor = StuntMonitor::new(UPRIGHT_FACING);
        monitor.observe(&skimming(), 0.0);
        let hover = FlightSample {
            horizontal_speed: 0.1,
            ..skimming()
        };
        monitor.observe(&hover, 2000.0);
        assert_eq!(monitor.low_altitude_start_ms, None);
        assert!(monitor.observe(&skimming(), 3500.0).is_empty());
        assert!(monitor.observe(&skimming(), 6000.0).is_empty());
    }

    #[test]
    fn test_no_low_altitude_award_near_pads() {
        let mut monitor = StuntMonitor::new(UPRIGHT_FACING);
        let near_pad = FlightSample {
            pad_edge_distance: 10.0,
            ..skimming()
        };
        for i in 0..100 {
            assert!(monitor.observe(&near_pad, i as f64 * 100.0).is_empty());
        }
    }

    fn transfer_after(ms: f64) -> Option<Transfer> {
        let mut monitor = StuntMonitor::new(UPRIGHT_FACING);
        monitor.record_takeoff("Able", 0.0);
        monitor.on_landed("Baker", ms)
    }

    #[test]
    fn test_fast_transfer_gold() {
        let transfer = transfer_after(4000.0).unwrap();
        let award = transfer.award.unwrap();
        assert_eq!(award.kind, StuntKind::FastTransfer(Medal::Gold));
        assert_eq!(award.qualifier.as_deref(), Some("4.000s GOLD"));
        assert_eq!(award.announcement(), "fast-transfer (4.000s GOLD)!");
    }

    #[test]
    fn test_fast_transfer_silver() {
        let award = transfer_after(7000.0).unwrap().award.unwrap();
        assert_eq!(award.kind, StuntKind::FastTransfer(Medal::Silver));
        assert!(award.qualifier.unwrap().ends_with("Silver"));
    }

    #[test]
    fn test_slow_transfer_reports_time_only() {
        let transfer = transfer_after(11_000.0).unwrap();
        assert_eq!(transfer.flight_ms, 11_000.0);
        assert!(transfer.award.is_none());
    }

    #[test]
    fn test_same_pad_is_not_a_transfer() {
        let mut monitor = StuntMonitor::new(UPRIGHT_FACING);
        monitor.record_takeoff("Able", 0.0);
        assert!(monitor.on_landed("Able", 1000.0).is_none());
        assert!(monitor.log.is_empty());
    }

    #[test]
    fn test_landing_without_takeoff_is_not_a_transfer() {
        let mut monitor = StuntMonitor::new(UPRIGHT_FACING);
        assert!(monitor.on_landed("Able", 1000.0).is_none());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut monitor = StuntMonitor::new(0.0);
        monitor.record_takeoff("Able", 0.0);
        monitor.observe(&cruising(7.0), 0.0);
        assert_eq!(monitor.log.len(), 1);
        monitor.clear(UPRIGHT_FACING);
        assert!(monitor.log.is_empty());
        assert_eq!(monitor.last_facing, UPRIGHT_FACING);
        assert!(monitor.last_visited_pad.is_none());
        assert!(monitor.last_takeoff_ms.is_none());
    }
}
