//! Tuning tables. Everything numeric the floor reacts to lives here,
//! loaded from `data/*.json` or built in code for tests.
//!
//! RULE: Components never hardcode tuning values; they read them from
//! the config slice they are constructed with. Bad values are corrected
//! by the owning component, never rejected here.

use crate::{
    event::{DayPhase, DirtinessTier},
    types::{FloorPos, Seconds},
};
use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

// ── Day cycle ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DayCycleConfig {
    pub day_length_seconds: Seconds,
    pub morning_seconds: Seconds,
    pub rush_seconds: Seconds,
    pub afternoon_seconds: Seconds,
    pub closing_seconds: Seconds,
    /// Days roll over forever when true; otherwise the run ends after `max_days`.
    pub infinite_days: bool,
    pub max_days: u32,
    /// Finite mode only: wait for an explicit continue between days.
    pub pause_between_days: bool,
    pub activity: PhaseMultipliers,
}

impl Default for DayCycleConfig {
    fn default() -> Self {
        Self {
            day_length_seconds: 60.0,
            morning_seconds: 15.0,
            rush_seconds: 25.0,
            afternoon_seconds: 15.0,
            closing_seconds: 5.0,
            infinite_days: true,
            max_days: 3,
            pause_between_days: true,
            activity: PhaseMultipliers::default(),
        }
    }
}

/// Arrival activity per phase, 0..1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseMultipliers {
    pub morning: f64,
    pub rush_hour: f64,
    pub afternoon_slowdown: f64,
    pub closing: f64,
}

impl Default for PhaseMultipliers {
    fn default() -> Self {
        Self { morning: 0.25, rush_hour: 1.0, afternoon_slowdown: 0.5, closing: 0.0 }
    }
}

impl PhaseMultipliers {
    pub fn for_phase(&self, phase: DayPhase) -> f64 {
        let raw = match phase {
            DayPhase::Morning           => self.morning,
            DayPhase::RushHour          => self.rush_hour,
            DayPhase::AfternoonSlowdown => self.afternoon_slowdown,
            DayPhase::Closing           => self.closing,
        };
        if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 }
    }
}

// ── Dirtiness ──────────────────────────────────────────────────────

/// Inclusive customer-count range for one dirtiness band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerRange {
    pub min: u32,
    pub max: u32,
}

impl CustomerRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirtinessConfig {
    /// Census poll cadence.
    pub refresh_interval_seconds: Seconds,
    pub filthy_strike_limit: u32,
    /// Route strikes through a cutscene collaborator before confirming.
    pub strike_escalation: bool,
    pub strike_cutscene_seconds: Seconds,

    pub clean_max_customers: u32,
    pub light_min_spills: u32,
    pub medium_min_spills: u32,
    pub very_dirty_min_spills: u32,
    pub filthy_min_spills: u32,
    pub filthy_spill_span: u32,
    pub light_customers: CustomerRange,
    pub medium_customers: CustomerRange,
    pub filthy_customers: CustomerRange,
}

impl Default for DirtinessConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: 1.0,
            filthy_strike_limit: 3,
            strike_escalation: true,
            strike_cutscene_seconds: 2.5,
            clean_max_customers: 12,
            light_min_spills: 1,
            medium_min_spills: 4,
            very_dirty_min_spills: 6,
            filthy_min_spills: 7,
            filthy_spill_span: 5,
            light_customers: CustomerRange::new(8, 10),
            medium_customers: CustomerRange::new(4, 6),
            filthy_customers: CustomerRange::new(1, 2),
        }
    }
}

// ── Reputation ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    pub max_level: u32,
    /// Customer cap indexed by level; levels past the end use the last entry.
    pub customer_caps: Vec<u32>,
    /// Seconds taken off the base spawn interval, indexed like `customer_caps`.
    pub interval_bonus_seconds: Vec<f64>,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            max_level: 3,
            customer_caps: vec![6, 8, 9, 12],
            interval_bonus_seconds: vec![0.0, 1.0, 2.0, 2.0],
        }
    }
}

// ── Spawning ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub base_interval_seconds: Seconds,
    pub max_active_customers: u32,
    pub dirtiness_penalty_seconds: TierPenalties,
    /// Day index on which party guests replace regular customers. 0 disables.
    pub party_day: u32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            base_interval_seconds: 6.0,
            max_active_customers: 12,
            dirtiness_penalty_seconds: TierPenalties::default(),
            party_day: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierPenalties {
    pub dirty: f64,
    pub very_dirty: f64,
    pub filthy: f64,
}

impl Default for TierPenalties {
    fn default() -> Self {
        Self { dirty: 1.0, very_dirty: 2.0, filthy: 3.0 }
    }
}

impl TierPenalties {
    pub fn for_tier(&self, tier: DirtinessTier) -> f64 {
        match tier {
            DirtinessTier::Clean     => 0.0,
            DirtinessTier::Dirty     => self.dirty,
            DirtinessTier::VeryDirty => self.very_dirty,
            DirtinessTier::Filthy    => self.filthy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Floor units per second; travel time is distance / speed.
    pub walk_speed: f64,
    pub sit_duration_seconds: Seconds,
    pub party_shuffle_min_seconds: Seconds,
    pub party_shuffle_max_seconds: Seconds,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.2,
            sit_duration_seconds: 8.0,
            party_shuffle_min_seconds: 3.0,
            party_shuffle_max_seconds: 8.0,
        }
    }
}

/// Static floor plan: where customers appear, leave, sit, and where tables are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorLayout {
    pub spawn_points: Vec<FloorPos>,
    pub exit_point: Option<FloorPos>,
    pub seats: Vec<FloorPos>,
    pub tables: Vec<FloorPos>,
}

impl FloorLayout {
    /// Two doors, four tables with four seats each.
    pub fn standard() -> Self {
        let tables = vec![
            FloorPos::new(-3.0, 3.0),
            FloorPos::new(3.0, 3.0),
            FloorPos::new(-3.0, -3.0),
            FloorPos::new(3.0, -3.0),
        ];
        let seats = tables
            .iter()
            .flat_map(|t| {
                [
                    FloorPos::new(t.x - 0.8, t.z),
                    FloorPos::new(t.x + 0.8, t.z),
                    FloorPos::new(t.x, t.z - 0.8),
                    FloorPos::new(t.x, t.z + 0.8),
                ]
            })
            .collect();
        Self {
            spawn_points: vec![FloorPos::new(-8.0, 0.0), FloorPos::new(8.0, 0.0)],
            exit_point: Some(FloorPos::new(0.0, -8.0)),
            seats,
            tables,
        }
    }
}

// ── Cleaning ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub sweeps_per_second: f64,
    pub sweeps_to_clean: f64,
    pub coins_per_clean: u32,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self { sweeps_per_second: 3.0, sweeps_to_clean: 3.0, coins_per_clean: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpillSpawnConfig {
    pub enabled: bool,
    /// Below this many active customers the floor stays clean on its own.
    pub min_customers: u32,
    pub base_seconds_per_spill: Seconds,
    pub max_spills_per_second: f64,
    pub max_active_spills: u32,
    pub inner_ring: f64,
    pub outer_ring: f64,
}

impl Default for SpillSpawnConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_customers: 3,
            base_seconds_per_spill: 10.0,
            max_spills_per_second: 0.25,
            max_active_spills: 10,
            inner_ring: 1.2,
            outer_ring: 2.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    pub timeout_seconds: Seconds,
    pub multiplier_step: f64,
    pub max_multiplier: f64,
    /// Streak breaks while dirtiness is at or above this tier. None disables.
    pub break_at_or_above: Option<DirtinessTier>,
    pub reset_on_new_day: bool,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 3.0,
            multiplier_step: 0.25,
            max_multiplier: 3.0,
            break_at_or_above: Some(DirtinessTier::VeryDirty),
            reset_on_new_day: true,
        }
    }
}

// ── Economy ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroomConfig {
    pub max_uses_per_day: u32,
    pub multiplier_per_use: f64,
    pub stack_uses: bool,
    pub cost: u32,
}

impl Default for BroomConfig {
    fn default() -> Self {
        Self { max_uses_per_day: 2, multiplier_per_use: 1.15, stack_uses: true, cost: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub max_salary_bonus: u32,
    /// Filth time tolerated before the bonus starts shrinking.
    pub salary_grace_seconds: Seconds,
    /// A star is earned when filth time stays strictly below this.
    pub star_filth_below_seconds: Seconds,
    /// Final day on which the promotion decision is made. 0 disables.
    pub promotion_day: u32,
    pub coins_required_to_promote: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_salary_bonus: 5,
            salary_grace_seconds: 5.0,
            star_filth_below_seconds: 3.0,
            promotion_day: 3,
            coins_required_to_promote: 25,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_coins: u32,
    pub broom: BroomConfig,
    pub review: ReviewConfig,
}

// ── File shapes ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SpawnTuningFile {
    spawn: SpawnTuning,
    reputation: ReputationConfig,
    dirtiness: DirtinessConfig,
    actors: ActorConfig,
    layout: Option<FloorLayout>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CleaningFile {
    cleaning: CleaningConfig,
    spills: SpillSpawnConfig,
    combo: ComboConfig,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub day_cycle: DayCycleConfig,
    pub dirtiness: DirtinessConfig,
    pub reputation: ReputationConfig,
    pub spawn: SpawnTuning,
    pub actors: ActorConfig,
    pub layout: FloorLayout,
    pub cleaning: CleaningConfig,
    pub spills: SpillSpawnConfig,
    pub combo: ComboConfig,
    pub economy: EconomyConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            day_cycle: DayCycleConfig::default(),
            dirtiness: DirtinessConfig::default(),
            reputation: ReputationConfig::default(),
            spawn: SpawnTuning::default(),
            actors: ActorConfig::default(),
            layout: FloorLayout::standard(),
            cleaning: CleaningConfig::default(),
            spills: SpillSpawnConfig::default(),
            combo: ComboConfig::default(),
            economy: EconomyConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load from the data/ directory.
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let day_cycle: DayCycleConfig = read_json(&format!("{data_dir}/day_cycle.json"))?;
        let tuning: SpawnTuningFile = read_json(&format!("{data_dir}/spawn_tuning.json"))?;
        let cleaning: CleaningFile = read_json(&format!("{data_dir}/cleaning.json"))?;
        let economy: EconomyConfig = read_json(&format!("{data_dir}/economy.json"))?;

        let config = Self {
            day_cycle,
            dirtiness: tuning.dirtiness,
            reputation: tuning.reputation,
            spawn: tuning.spawn,
            actors: tuning.actors,
            layout: tuning.layout.unwrap_or_else(FloorLayout::standard),
            cleaning: cleaning.cleaning,
            spills: cleaning.spills,
            combo: cleaning.combo,
            economy,
        };
        log::debug!(
            "config loaded from {data_dir}: {} seats, {} spawn points, infinite_days={}",
            config.layout.seats.len(),
            config.layout.spawn_points.len(),
            config.day_cycle.infinite_days
        );
        Ok(config)
    }

    /// Config with hardcoded defaults for use in tests.
    /// Finite three-day run that rolls over without waiting.
    pub fn default_test() -> Self {
        let mut config = Self::default();
        config.day_cycle.infinite_days = false;
        config.day_cycle.pause_between_days = false;
        config
    }
}

fn read_json<T: DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("Cannot parse {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_multipliers_are_clamped() {
        let m = PhaseMultipliers { morning: -1.0, rush_hour: 4.0, afternoon_slowdown: f64::NAN, closing: 0.0 };
        assert_eq!(m.for_phase(DayPhase::Morning), 0.0);
        assert_eq!(m.for_phase(DayPhase::RushHour), 1.0);
        assert_eq!(m.for_phase(DayPhase::AfternoonSlowdown), 0.0);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: DayCycleConfig = serde_json::from_str(r#"{ "day_length_seconds": 90.0 }"#).unwrap();
        assert_eq!(cfg.day_length_seconds, 90.0);
        assert_eq!(cfg.rush_seconds, 25.0);
        assert!(cfg.infinite_days);
    }

    #[test]
    fn standard_layout_has_four_seats_per_table() {
        let layout = FloorLayout::standard();
        assert_eq!(layout.seats.len(), layout.tables.len() * 4);
        assert!(layout.exit_point.is_some());
    }

    #[test]
    fn missing_data_dir_is_an_error() {
        assert!(SimConfig::load("/definitely/not/here").is_err());
    }
}
