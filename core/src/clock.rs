//! Simulation clock — owns frame count, simulated time, speed control, and pause.
//!
//! The outside world supplies a frame delta each call. The clock scales it by
//! the current speed and is the only place simulated time is produced.

use crate::types::{RunId, Seconds, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:          RunId,
    pub current_tick:    Tick,
    pub elapsed_seconds: Seconds,
    pub speed:           SimSpeed,
    pub paused:          bool,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
            elapsed_seconds: 0.0,
            speed: SimSpeed::Normal,
            paused: true,
        }
    }

    /// Advance one frame. Returns the scaled simulated delta.
    /// Negative or non-finite frame deltas count as zero time.
    pub fn advance(&mut self, frame_delta: Seconds) -> Seconds {
        debug_assert!(!self.paused, "advance() called on paused clock");
        let delta = if frame_delta.is_finite() { frame_delta.max(0.0) } else { 0.0 };
        let scaled = delta * self.speed.time_scale();
        self.current_tick += 1;
        self.elapsed_seconds += scaled;
        scaled
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn set_speed(&mut self, speed: SimSpeed) {
        self.speed = speed;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimSpeed {
    Normal,       // 1x
    Fast,         // 2x
    FastForward,  // 4x
}

impl SimSpeed {
    pub fn time_scale(&self) -> f64 {
        match self {
            SimSpeed::Normal      => 1.0,
            SimSpeed::Fast        => 2.0,
            SimSpeed::FastForward => 4.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_scales_by_speed() {
        let mut clock = SimClock::new("clock-test".into());
        clock.resume();
        assert_eq!(clock.advance(0.5), 0.5);
        clock.set_speed(SimSpeed::FastForward);
        assert_eq!(clock.advance(0.5), 2.0);
        assert_eq!(clock.current_tick, 2);
        assert!((clock.elapsed_seconds - 2.5).abs() < 1e-9);
    }

    #[test]
    fn bad_frame_delta_counts_as_zero() {
        let mut clock = SimClock::new("clock-test".into());
        clock.resume();
        assert_eq!(clock.advance(-1.0), 0.0);
        assert_eq!(clock.advance(f64::NAN), 0.0);
        assert_eq!(clock.current_tick, 2);
    }
}
