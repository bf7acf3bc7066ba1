//! Combo reward meter — a streak of cleans inside a rolling timeout.
//!
//! RULES:
//!   - streak > 0 implies seconds_since_last_reward <= timeout; the
//!     per-frame tick() enforces it.
//!   - The streak breaks on timeout, on dirtiness at or above the break
//!     tier, and (if configured) when a new day starts.
//!   - A non-positive base reward pays nothing and leaves the streak alone.

use crate::{
    config::ComboConfig,
    event::{DirtinessTier, SimEvent},
    types::Seconds,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub streak: u32,
    pub seconds_since_last_reward: Seconds,
}

pub struct ComboRewardMeter {
    timeout: Seconds,
    step: f64,
    max_multiplier: f64,
    break_at_or_above: Option<DirtinessTier>,
    reset_on_new_day: bool,
    state: ComboState,
}

impl ComboRewardMeter {
    pub fn new(config: &ComboConfig) -> Self {
        Self {
            timeout: config.timeout_seconds.max(0.0),
            step: config.multiplier_step,
            max_multiplier: config.max_multiplier.max(1.0),
            break_at_or_above: config.break_at_or_above,
            reset_on_new_day: config.reset_on_new_day,
            state: ComboState { streak: 0, seconds_since_last_reward: 0.0 },
        }
    }

    /// Register one clean worth `base_amount` and return the multiplied
    /// reward.
    pub fn register_reward(&mut self, base_amount: i64, out: &mut Vec<SimEvent>) -> u32 {
        if base_amount <= 0 {
            return 0;
        }
        let continues = self.state.streak > 0 && self.state.seconds_since_last_reward <= self.timeout;
        self.state.streak = if continues { self.state.streak + 1 } else { 1 };
        self.state.seconds_since_last_reward = 0.0;

        let multiplier = self.multiplier();
        let reward = ((base_amount as f64 * multiplier).round() as u32).max(1);
        log::debug!("combo: streak={} x{multiplier:.2} reward={reward}", self.state.streak);
        self.announce(out);
        reward
    }

    /// Advance the timeout and check the dirtiness break condition.
    pub fn tick(&mut self, delta: Seconds, current_tier: DirtinessTier) -> Vec<SimEvent> {
        let mut out = Vec::new();
        if self.state.streak == 0 {
            return out;
        }
        self.state.seconds_since_last_reward += delta.max(0.0);

        let timed_out = self.state.seconds_since_last_reward > self.timeout;
        let too_dirty = self.break_at_or_above.is_some_and(|tier| current_tier >= tier);
        if timed_out || too_dirty {
            log::debug!(
                "combo: streak {} broken ({})",
                self.state.streak,
                if timed_out { "timeout" } else { "dirtiness" }
            );
            self.reset(&mut out);
        }
        out
    }

    pub fn reset_on_new_day(&mut self, out: &mut Vec<SimEvent>) {
        if self.reset_on_new_day {
            self.reset(out);
        }
    }

    /// `clamp(1 + (streak - 1) * step, 1, max)`.
    pub fn multiplier(&self) -> f64 {
        if self.state.streak <= 1 {
            return 1.0;
        }
        (1.0 + (self.state.streak - 1) as f64 * self.step).clamp(1.0, self.max_multiplier)
    }

    pub fn streak(&self) -> u32 {
        self.state.streak
    }

    /// Seconds left before the streak times out; 0 without a streak.
    pub fn remaining_seconds(&self) -> Seconds {
        if self.state.streak == 0 {
            return 0.0;
        }
        (self.timeout - self.state.seconds_since_last_reward).max(0.0)
    }

    pub fn state(&self) -> &ComboState {
        &self.state
    }

    fn reset(&mut self, out: &mut Vec<SimEvent>) {
        if self.state.streak == 0 {
            return;
        }
        self.state.streak = 0;
        self.state.seconds_since_last_reward = 0.0;
        self.announce(out);
    }

    fn announce(&self, out: &mut Vec<SimEvent>) {
        out.push(SimEvent::ComboChanged {
            streak: self.state.streak,
            multiplier: self.multiplier(),
        });
    }
}
