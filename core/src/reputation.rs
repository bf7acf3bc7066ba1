//! Reputation track — a small monotonic level with table-driven bonuses.
//!
//! RULES:
//!   - Level only goes up, one step per award, and never past max_level.
//!   - Tables are indexed by level; levels past the end use the last entry.

use crate::{config::ReputationConfig, event::SimEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationState {
    pub level: u32,
}

pub struct ReputationTrack {
    max_level: u32,
    customer_caps: Vec<u32>,
    interval_bonus_seconds: Vec<f64>,
    state: ReputationState,
}

impl ReputationTrack {
    pub fn new(config: &ReputationConfig) -> Self {
        Self {
            max_level: config.max_level,
            customer_caps: config.customer_caps.clone(),
            interval_bonus_seconds: config
                .interval_bonus_seconds
                .iter()
                .map(|b| if b.is_finite() { b.max(0.0) } else { 0.0 })
                .collect(),
            state: ReputationState { level: 0 },
        }
    }

    /// Award one star. Returns false when already at the top.
    pub fn try_increase(&mut self, out: &mut Vec<SimEvent>) -> bool {
        if self.state.level >= self.max_level {
            return false;
        }
        self.state.level += 1;
        log::info!("reputation: level {} of {}", self.state.level, self.max_level);
        out.push(SimEvent::ReputationIncreased { level: self.state.level });
        true
    }

    /// Customer cap at the current level. 0 with an empty table.
    pub fn cap_for_level(&self) -> u32 {
        lookup(&self.customer_caps, self.state.level).unwrap_or(0)
    }

    /// Seconds taken off the spawn interval at the current level.
    pub fn interval_bonus_for_level(&self) -> f64 {
        lookup(&self.interval_bonus_seconds, self.state.level).unwrap_or(0.0)
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn state(&self) -> &ReputationState {
        &self.state
    }
}

fn lookup<T: Copy>(table: &[T], level: u32) -> Option<T> {
    let last = table.len().checked_sub(1)?;
    Some(table[(level as usize).min(last)])
}
