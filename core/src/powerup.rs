//! Broom powerup — a per-day limited sweep-speed multiplier.
//!
//! RULE: uses_today never exceeds max_uses_per_day and resets on every
//! day start. Buying is done by the engine: spend, then consume, refund
//! if consumption fails.

use crate::{config::BroomConfig, event::SimEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupState {
    pub uses_today: u32,
}

pub struct BroomPowerup {
    config: BroomConfig,
    state: PowerupState,
}

impl BroomPowerup {
    pub fn new(config: &BroomConfig) -> Self {
        Self { config: config.clone(), state: PowerupState { uses_today: 0 } }
    }

    pub fn can_use_today(&self) -> bool {
        self.state.uses_today < self.config.max_uses_per_day
    }

    pub fn try_consume_use(&mut self, out: &mut Vec<SimEvent>) -> bool {
        if !self.can_use_today() {
            return false;
        }
        self.state.uses_today += 1;
        let multiplier = self.current_multiplier();
        log::debug!(
            "broom: used {}/{} x{multiplier:.2}",
            self.state.uses_today,
            self.config.max_uses_per_day
        );
        out.push(SimEvent::PowerupUsed { uses_today: self.state.uses_today, multiplier });
        true
    }

    /// 1 with no uses; per_use^uses when stacking, per_use otherwise.
    pub fn current_multiplier(&self) -> f64 {
        if self.state.uses_today == 0 {
            return 1.0;
        }
        if self.config.stack_uses {
            self.config.multiplier_per_use.powi(self.state.uses_today as i32)
        } else {
            self.config.multiplier_per_use
        }
    }

    pub fn reset_for_new_day(&mut self) {
        self.state.uses_today = 0;
    }

    pub fn uses_left_today(&self) -> u32 {
        self.config.max_uses_per_day.saturating_sub(self.state.uses_today)
    }

    pub fn cost(&self) -> u32 {
        self.config.cost
    }

    pub fn state(&self) -> &PowerupState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_stacks_per_use() {
        let mut out = Vec::new();
        let mut broom = BroomPowerup::new(&BroomConfig::default());
        assert_eq!(broom.current_multiplier(), 1.0);
        assert!(broom.try_consume_use(&mut out));
        assert!(broom.try_consume_use(&mut out));
        assert!((broom.current_multiplier() - 1.15 * 1.15).abs() < 1e-9);
        assert!(!broom.try_consume_use(&mut out), "only two uses per day");

        broom.reset_for_new_day();
        assert_eq!(broom.uses_left_today(), 2);
    }

    #[test]
    fn flat_multiplier_without_stacking() {
        let mut out = Vec::new();
        let config = BroomConfig { stack_uses: false, ..BroomConfig::default() };
        let mut broom = BroomPowerup::new(&config);
        broom.try_consume_use(&mut out);
        broom.try_consume_use(&mut out);
        assert_eq!(broom.current_multiplier(), 1.15);
    }
}
