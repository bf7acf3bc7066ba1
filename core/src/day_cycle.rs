//! Day cycle — the phase/time state machine of one restaurant day.
//!
//! Morning → RushHour → AfternoonSlowdown → Closing → next day.
//!
//! RULES:
//!   - Phase is always the segment whose window contains the elapsed time.
//!   - Segment lengths always sum to the day length (normalized at build).
//!   - Waiting-for-continue and game-over are hard stops: tick() is inert.

use crate::{
    config::{DayCycleConfig, PhaseMultipliers},
    event::{DayPhase, SimEvent},
    types::Seconds,
};
use serde::{Deserialize, Serialize};

/// Fallback split used when every configured segment is non-positive.
const DEFAULT_SEGMENTS: [Seconds; 4] = [15.0, 25.0, 15.0, 5.0];
const DEFAULT_DAY_LENGTH: Seconds = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayState {
    pub day_count: u32,
    pub elapsed_seconds: Seconds,
    pub phase: DayPhase,
    pub is_game_over: bool,
    pub is_waiting_for_continue: bool,
}

pub struct DayCycle {
    day_length: Seconds,
    segments: [Seconds; 4],
    infinite_days: bool,
    max_days: u32,
    pause_between_days: bool,
    activity: PhaseMultipliers,
    state: DayState,
    started: bool,
}

impl DayCycle {
    pub fn new(config: &DayCycleConfig) -> Self {
        let (day_length, segments) = normalize_segments(
            config.day_length_seconds,
            [
                config.morning_seconds,
                config.rush_seconds,
                config.afternoon_seconds,
                config.closing_seconds,
            ],
        );
        Self {
            day_length,
            segments,
            infinite_days: config.infinite_days,
            max_days: config.max_days.max(1),
            pause_between_days: config.pause_between_days,
            activity: config.activity.clone(),
            state: DayState {
                day_count: 1,
                elapsed_seconds: 0.0,
                phase: DayPhase::Morning,
                is_game_over: false,
                is_waiting_for_continue: false,
            },
            started: false,
        }
    }

    /// Advance the day by `delta` simulated seconds.
    /// The first call also announces day 1.
    pub fn tick(&mut self, delta: Seconds) -> Vec<SimEvent> {
        let mut out = Vec::new();

        if !self.started {
            self.started = true;
            self.announce_phase(DayPhase::Morning, &mut out);
            out.push(SimEvent::DayStarted { day: self.state.day_count });
        }

        if self.state.is_game_over || self.state.is_waiting_for_continue {
            return out;
        }

        self.state.elapsed_seconds += delta.max(0.0);

        let phase = self.phase_at(self.state.elapsed_seconds);
        if phase != self.state.phase {
            self.announce_phase(phase, &mut out);
        }

        if self.state.elapsed_seconds >= self.day_length {
            if self.infinite_days {
                self.start_next_day(&mut out);
            } else {
                self.end_day(&mut out);
            }
        }

        out
    }

    /// Leave the between-days wait. Returns false (and does nothing)
    /// unless the cycle is waiting and the run is not over.
    pub fn continue_to_next_day(&mut self, out: &mut Vec<SimEvent>) -> bool {
        if !self.state.is_waiting_for_continue || self.state.is_game_over {
            return false;
        }
        self.state.is_waiting_for_continue = false;
        self.start_next_day(out);
        true
    }

    /// Stop the cycle for good. Used when the run ends for a reason
    /// other than running out of days.
    pub fn halt(&mut self) {
        if !self.state.is_game_over {
            log::warn!("day={} day cycle halted", self.state.day_count);
        }
        self.state.is_game_over = true;
    }

    /// Phase for a time of day. Times past the day length are Closing.
    pub fn phase_at(&self, t: Seconds) -> DayPhase {
        let mut remaining = t.max(0.0);
        for (phase, len) in DayPhase::ALL.iter().zip(self.segments.iter()).take(3) {
            if remaining < *len {
                return *phase;
            }
            remaining -= len;
        }
        DayPhase::Closing
    }

    pub fn phase(&self) -> DayPhase {
        self.state.phase
    }

    pub fn day_count(&self) -> u32 {
        self.state.day_count
    }

    pub fn is_closed(&self) -> bool {
        self.state.phase == DayPhase::Closing || self.state.is_game_over
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over
    }

    pub fn is_waiting_for_continue(&self) -> bool {
        self.state.is_waiting_for_continue
    }

    pub fn infinite_days(&self) -> bool {
        self.infinite_days
    }

    /// 0..1 arrival activity for the current phase.
    pub fn activity_multiplier(&self) -> f64 {
        self.activity.for_phase(self.state.phase)
    }

    pub fn day_length(&self) -> Seconds {
        self.day_length
    }

    pub fn segments(&self) -> [Seconds; 4] {
        self.segments
    }

    pub fn state(&self) -> &DayState {
        &self.state
    }

    fn start_next_day(&mut self, out: &mut Vec<SimEvent>) {
        self.state.elapsed_seconds = 0.0;
        self.state.day_count += 1;
        self.announce_phase(DayPhase::Morning, out);
        out.push(SimEvent::DayStarted { day: self.state.day_count });
    }

    fn end_day(&mut self, out: &mut Vec<SimEvent>) {
        self.state.elapsed_seconds = self.day_length;
        let day = self.state.day_count;
        let is_final_day = day >= self.max_days;

        if self.state.phase != DayPhase::Closing {
            self.announce_phase(DayPhase::Closing, out);
        }
        out.push(SimEvent::DayEnded { day, is_final_day });

        if is_final_day {
            self.state.is_game_over = true;
            log::info!("day={day} final day over, no more days");
        } else if self.pause_between_days {
            self.state.is_waiting_for_continue = true;
            log::debug!("day={day} ended, waiting for continue");
        } else {
            self.start_next_day(out);
        }
    }

    fn announce_phase(&mut self, phase: DayPhase, out: &mut Vec<SimEvent>) {
        self.state.phase = phase;
        log::info!("day={} phase={phase:?}", self.state.day_count);
        out.push(SimEvent::PhaseChanged { day: self.state.day_count, phase });
    }
}

/// Clamp the segment table so it covers exactly one day.
///
/// Negative lengths count as zero. An all-zero table is replaced by the
/// default split; any other mismatch is rescaled proportionally.
pub fn normalize_segments(day_length: Seconds, raw: [Seconds; 4]) -> (Seconds, [Seconds; 4]) {
    let day_length = if day_length.is_finite() && day_length > 0.0 {
        day_length
    } else {
        DEFAULT_DAY_LENGTH
    };

    let mut segments = raw.map(|s| if s.is_finite() { s.max(0.0) } else { 0.0 });
    let mut total: Seconds = segments.iter().sum();
    if total <= 0.0 {
        segments = DEFAULT_SEGMENTS;
        total = segments.iter().sum();
    }

    if total != day_length {
        let scale = day_length / total;
        segments = segments.map(|s| s * scale);
    }
    (day_length, segments)
}
