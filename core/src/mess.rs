//! Mess on the floor: the spill field and the ambient spill spawner.
//!
//! The field is the census the dirtiness tracker polls and the sink
//! vacated seats drop mess into. Sweeping a spill to completion removes it.

use crate::{
    collaborator::{MessCensus, MessSink},
    config::{CleaningConfig, SpillSpawnConfig},
    event::{MessSource, SimEvent},
    rng::SubsystemRng,
    types::{FloorPos, Seconds, SpillId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spill {
    pub id: SpillId,
    pub position: FloorPos,
    pub source: MessSource,
    /// Sweep motions applied so far.
    pub sweep_progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepOutcome {
    NotFound,
    InProgress { progress: f64 },
    Cleaned,
}

pub struct MessField {
    sweeps_per_second: f64,
    sweeps_to_clean: f64,
    spills: Vec<Spill>,
    next_id: SpillId,
    outbox: Vec<SimEvent>,
}

impl MessField {
    pub fn new(config: &CleaningConfig) -> Self {
        Self {
            sweeps_per_second: config.sweeps_per_second.max(0.0),
            sweeps_to_clean: config.sweeps_to_clean.max(f64::EPSILON),
            spills: Vec::new(),
            next_id: 1,
            outbox: Vec::new(),
        }
    }

    pub fn add_spill(&mut self, position: FloorPos, source: MessSource) -> SpillId {
        let spill_id = self.next_id;
        self.next_id += 1;
        self.spills.push(Spill { id: spill_id, position, source, sweep_progress: 0.0 });
        self.outbox.push(SimEvent::MessCreated { spill_id, source });
        spill_id
    }

    /// Sweep one spill for `seconds`. The spill is removed once its
    /// progress reaches the clean threshold.
    pub fn sweep(&mut self, spill_id: SpillId, seconds: Seconds, multiplier: f64) -> SweepOutcome {
        let Some(index) = self.spills.iter().position(|s| s.id == spill_id) else {
            return SweepOutcome::NotFound;
        };
        let spill = &mut self.spills[index];
        spill.sweep_progress += self.sweeps_per_second * multiplier.max(0.0) * seconds.max(0.0);

        if spill.sweep_progress >= self.sweeps_to_clean {
            self.spills.remove(index);
            log::debug!("mess: spill {spill_id} cleaned, {} left", self.spills.len());
            SweepOutcome::Cleaned
        } else {
            SweepOutcome::InProgress { progress: spill.sweep_progress }
        }
    }

    pub fn count(&self) -> usize {
        self.spills.len()
    }

    /// The spill that has been on the floor longest.
    pub fn oldest(&self) -> Option<&Spill> {
        self.spills.first()
    }

    pub fn get(&self, spill_id: SpillId) -> Option<&Spill> {
        self.spills.iter().find(|s| s.id == spill_id)
    }

    pub fn spills(&self) -> &[Spill] {
        &self.spills
    }

    /// Events produced since the last drain, in creation order.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.outbox)
    }
}

impl MessCensus for MessField {
    fn active_mess_count(&self) -> usize {
        self.spills.len()
    }
}

impl MessSink for MessField {
    fn spawn_mess(&mut self, at: FloorPos, source: MessSource) -> SpillId {
        self.add_spill(at, source)
    }
}

/// Drops spills around tables while the floor is busy.
///
/// RULES:
///   - Below `min_customers` active customers nothing spawns.
///   - Rate ramps linearly per customer above the minimum, capped.
///   - No spawn while `max_active_spills` are already on the floor.
pub struct SpillSpawner {
    config: SpillSpawnConfig,
    timer: Seconds,
}

impl SpillSpawner {
    pub fn new(config: &SpillSpawnConfig) -> Self {
        Self { config: config.clone(), timer: 0.0 }
    }

    /// Spills per second for an active customer count.
    pub fn rate_for(&self, customers: u32) -> f64 {
        if customers < self.config.min_customers {
            return 0.0;
        }
        let effective = (customers - self.config.min_customers + 1) as f64;
        let base_rate = 1.0 / self.config.base_seconds_per_spill.max(0.1);
        (base_rate * effective).min(self.config.max_spills_per_second.max(0.0))
    }

    pub fn tick(
        &mut self,
        delta: Seconds,
        customers: u32,
        tables: &[FloorPos],
        sink: &mut MessField,
        rng: &mut SubsystemRng,
    ) {
        if !self.config.enabled || tables.is_empty() {
            return;
        }
        let rate = self.rate_for(customers);
        if rate <= 0.0 {
            return;
        }

        self.timer += delta.max(0.0);
        if self.timer < 1.0 / rate {
            return;
        }
        self.timer = 0.0;

        if sink.count() >= self.config.max_active_spills as usize {
            return;
        }
        let table = tables[rng.pick_index(tables.len())];
        let angle = rng.range_f64(0.0, std::f64::consts::TAU);
        let dist = rng.range_f64(
            self.config.inner_ring.min(self.config.outer_ring),
            self.config.inner_ring.max(self.config.outer_ring),
        );
        let at = FloorPos::new(table.x + angle.cos() * dist, table.z + angle.sin() * dist);
        sink.spawn_mess(at, MessSource::Ambient);
    }
}
