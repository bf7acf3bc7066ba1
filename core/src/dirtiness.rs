//! Dirtiness tracker — turns the mess census into a tier, a customer cap,
//! filth-time accumulators and filth strikes.
//!
//! Execution: `accumulate()` every frame; `refresh()` on the slower census
//! cadence (see `update()`).
//!
//! RULES:
//!   - Tier is a pure, non-decreasing step function of the raw count.
//!   - Entering Filthy raises at most one pending strike; nothing else is
//!     raised until that strike is confirmed.
//!   - The strike count never resets inside a session.
//!   - Once GameOverByFilth has fired, every mutation is a no-op.

use crate::{
    collaborator::MessCensus,
    config::{CustomerRange, DirtinessConfig},
    event::{DirtinessTier, SimEvent},
    types::Seconds,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirtinessState {
    pub raw_count: u32,
    pub tier: DirtinessTier,
    pub customer_cap: u32,
    pub very_dirty_seconds: Seconds,
    pub filthy_seconds: Seconds,
    pub filthy_strike_count: u32,
    pub pending_strike: bool,
    pub game_over_fired: bool,
}

/// Spill-count thresholds after clamping them into ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub light_min: u32,
    pub medium_min: u32,
    pub very_dirty_min: u32,
    pub filthy_min: u32,
    pub filthy_span: u32,
}

impl Thresholds {
    pub fn from_config(config: &DirtinessConfig) -> Self {
        let filthy_min = config.filthy_min_spills.max(1);
        let light_min = config.light_min_spills.clamp(1, filthy_min);
        Self {
            light_min,
            medium_min: config.medium_min_spills.clamp(light_min, filthy_min),
            very_dirty_min: config.very_dirty_min_spills.clamp(1, filthy_min),
            filthy_min,
            filthy_span: config.filthy_spill_span.max(1),
        }
    }

    pub fn tier_for(&self, raw_count: u32) -> DirtinessTier {
        if raw_count == 0 {
            DirtinessTier::Clean
        } else if raw_count < self.very_dirty_min {
            DirtinessTier::Dirty
        } else if raw_count < self.filthy_min {
            DirtinessTier::VeryDirty
        } else {
            DirtinessTier::Filthy
        }
    }
}

/// Customer cap bands: a fixed cap when clean, then one interpolated
/// range per band (light, medium, filthy).
#[derive(Debug, Clone, Copy)]
pub struct CapBands {
    pub clean: u32,
    pub light: CustomerRange,
    pub medium: CustomerRange,
    pub filthy: CustomerRange,
}

impl CapBands {
    pub fn from_config(config: &DirtinessConfig) -> Self {
        Self {
            clean: config.clean_max_customers,
            light: config.light_customers,
            medium: config.medium_customers,
            filthy: config.filthy_customers,
        }
    }

    pub fn cap_for(&self, raw_count: u32, th: &Thresholds) -> u32 {
        if raw_count == 0 {
            return self.clean;
        }
        if raw_count < th.medium_min {
            return interpolate(self.light, raw_count, th.light_min, th.medium_min.saturating_sub(1));
        }
        if raw_count < th.filthy_min {
            return interpolate(self.medium, raw_count, th.medium_min, th.filthy_min - 1);
        }
        interpolate(self.filthy, raw_count, th.filthy_min, th.filthy_min + th.filthy_span)
    }
}

/// Position of `value` inside [lo, hi] mapped onto the range, rounded.
/// A degenerate span yields the top of the range.
fn interpolate(range: CustomerRange, value: u32, lo: u32, hi: u32) -> u32 {
    let bottom = range.min.min(range.max) as f64;
    let top = range.min.max(range.max) as f64;
    if hi <= lo {
        return top as u32;
    }
    let t = ((value as f64 - lo as f64) / (hi as f64 - lo as f64)).clamp(0.0, 1.0);
    (bottom + (top - bottom) * t).round() as u32
}

pub struct DirtinessTracker {
    thresholds: Thresholds,
    bands: CapBands,
    strike_limit: u32,
    strike_escalation: bool,
    refresh_interval: Seconds,
    refresh_timer: Seconds,
    primed: bool,
    state: DirtinessState,
}

impl DirtinessTracker {
    pub fn new(config: &DirtinessConfig) -> Self {
        let bands = CapBands::from_config(config);
        Self {
            thresholds: Thresholds::from_config(config),
            bands,
            strike_limit: config.filthy_strike_limit.max(1),
            strike_escalation: config.strike_escalation,
            refresh_interval: config.refresh_interval_seconds.max(0.0),
            refresh_timer: 0.0,
            primed: false,
            state: DirtinessState {
                raw_count: 0,
                tier: DirtinessTier::Clean,
                customer_cap: bands.clean,
                very_dirty_seconds: 0.0,
                filthy_seconds: 0.0,
                filthy_strike_count: 0,
                pending_strike: false,
                game_over_fired: false,
            },
        }
    }

    /// Whether strikes wait for an external confirmation.
    pub fn set_strike_escalation(&mut self, enabled: bool) {
        self.strike_escalation = enabled;
    }

    /// Per-frame driver: accumulate tier time every frame, poll the census
    /// on the first frame and then once per refresh interval.
    pub fn update(&mut self, delta: Seconds, census: &dyn MessCensus) -> Vec<SimEvent> {
        let mut out = Vec::new();
        self.accumulate(delta);

        self.refresh_timer += delta.max(0.0);
        if self.primed && self.refresh_timer < self.refresh_interval {
            return out;
        }
        self.primed = true;
        self.refresh_timer = 0.0;
        self.refresh(census.active_mess_count() as i64, &mut out);
        out
    }

    /// Re-derive tier and cap from a census sample.
    pub fn refresh(&mut self, current_mess_count: i64, out: &mut Vec<SimEvent>) {
        if self.state.game_over_fired {
            return;
        }

        let raw_count = current_mess_count.clamp(0, u32::MAX as i64) as u32;
        let previous_tier = self.state.tier;
        let previous_count = self.state.raw_count;

        self.state.raw_count = raw_count;
        self.state.tier = self.thresholds.tier_for(raw_count);
        self.state.customer_cap = self.bands.cap_for(raw_count, &self.thresholds);

        if raw_count != previous_count || self.state.tier != previous_tier {
            log::debug!(
                "dirtiness: count={raw_count} tier={:?} cap={}",
                self.state.tier,
                self.state.customer_cap
            );
            out.push(SimEvent::DirtinessRefreshed {
                raw_count,
                tier: self.state.tier,
                customer_cap: self.state.customer_cap,
            });
        }

        let entered_filthy =
            self.state.tier == DirtinessTier::Filthy && previous_tier != DirtinessTier::Filthy;
        if !entered_filthy || self.state.pending_strike {
            return;
        }

        self.state.pending_strike = true;
        if self.strike_escalation {
            log::warn!("dirtiness: floor is filthy, strike requested");
            out.push(SimEvent::FilthyStrikeRequested);
        } else {
            self.confirm_strike(out);
        }
    }

    /// Add tier time for the current tier.
    pub fn accumulate(&mut self, delta: Seconds) {
        if self.state.game_over_fired || !(delta > 0.0) {
            return;
        }
        match self.state.tier {
            DirtinessTier::VeryDirty => self.state.very_dirty_seconds += delta,
            DirtinessTier::Filthy    => self.state.filthy_seconds += delta,
            _ => {}
        }
    }

    /// Count the pending strike. Returns false if there was none.
    pub fn confirm_strike(&mut self, out: &mut Vec<SimEvent>) -> bool {
        if self.state.game_over_fired || !self.state.pending_strike {
            return false;
        }
        self.state.pending_strike = false;
        self.state.filthy_strike_count += 1;
        let count = self.state.filthy_strike_count;
        log::warn!("dirtiness: filth strike {count}/{}", self.strike_limit);
        out.push(SimEvent::FilthyCountChanged { count });

        if count >= self.strike_limit {
            self.state.game_over_fired = true;
            log::warn!("dirtiness: strike limit reached, game over");
            out.push(SimEvent::GameOverByFilth { strikes: count });
        }
        true
    }

    /// Zero the per-day tier timers. Strikes are kept.
    pub fn reset_day_timers(&mut self) {
        if self.state.game_over_fired {
            return;
        }
        self.state.very_dirty_seconds = 0.0;
        self.state.filthy_seconds = 0.0;
    }

    pub fn tier(&self) -> DirtinessTier {
        self.state.tier
    }

    pub fn raw_count(&self) -> u32 {
        self.state.raw_count
    }

    pub fn customer_cap(&self) -> u32 {
        self.state.customer_cap
    }

    /// Current cap relative to the clean cap, 0..1.
    pub fn cap_multiplier(&self) -> f64 {
        if self.bands.clean == 0 {
            return 0.0;
        }
        (self.state.customer_cap as f64 / self.bands.clean as f64).clamp(0.0, 1.0)
    }

    pub fn strike_count(&self) -> u32 {
        self.state.filthy_strike_count
    }

    pub fn strike_limit(&self) -> u32 {
        self.strike_limit
    }

    pub fn is_strike_pending(&self) -> bool {
        self.state.pending_strike
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over_fired
    }

    /// Very-dirty plus filthy seconds since the day started.
    pub fn filth_time_seconds(&self) -> Seconds {
        self.state.very_dirty_seconds + self.state.filthy_seconds
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn state(&self) -> &DirtinessState {
        &self.state
    }
}
