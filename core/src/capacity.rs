//! Capacity scheduler — the customer spawn loop and the active roster.
//!
//! The loop is a timer carried across frames: attempt, compute the
//! interval, wait that long, attempt again. The first attempt happens on
//! the first frame.
//!
//! RULES:
//!   - Two attempts are never closer than the interval computed at the
//!     earlier one.
//!   - Cap and interval are pure functions of the inputs sampled at the
//!     attempt; the scheduler never reads another component.
//!   - A customer that cannot reserve a seat is discarded immediately.
//!   - Party guests only exist on the party day.

use crate::{
    actor::Actor,
    collaborator::{ActorFactory, MessSink},
    config::SpawnTuning,
    event::{ActorKind, DirtinessTier, SimEvent, SpawnSkipReason},
    rng::SubsystemRng,
    seats::SeatAllocator,
    types::{FloorPos, Seconds},
};

const MIN_INTERVAL_SECONDS: Seconds = 0.1;

/// Upstream signals, sampled by the engine at call time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnInputs {
    pub day_count: u32,
    pub day_closed: bool,
    /// 0..1 activity for the current day phase.
    pub phase_multiplier: f64,
    pub reputation_cap: u32,
    pub reputation_bonus_seconds: f64,
    /// Current dirtiness cap relative to the clean cap, 0..1.
    pub dirtiness_multiplier: f64,
    pub tier: DirtinessTier,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveSpawnPolicy {
    pub cap: u32,
    pub interval: Seconds,
}

/// `floor(min(global_max, reputation_cap) × dirtiness × phase)`,
/// at least 1 while the day is open, 0 once it is closed.
pub fn effective_cap(
    global_max: u32,
    reputation_cap: u32,
    dirtiness_multiplier: f64,
    phase_multiplier: f64,
    day_closed: bool,
) -> u32 {
    if day_closed {
        return 0;
    }
    let base = global_max.min(reputation_cap) as f64;
    let scaled = (base * unit(dirtiness_multiplier) * unit(phase_multiplier)).floor();
    (scaled as u32).max(1)
}

/// `max(0.1, base − reputation bonus + dirtiness penalty)`.
pub fn effective_interval(base: Seconds, reputation_bonus: Seconds, dirtiness_penalty: Seconds) -> Seconds {
    let raw = base - reputation_bonus + dirtiness_penalty;
    if raw.is_finite() { raw.max(MIN_INTERVAL_SECONDS) } else { MIN_INTERVAL_SECONDS }
}

fn unit(value: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}

pub struct CapacityScheduler {
    tuning: SpawnTuning,
    spawn_points: Vec<FloorPos>,
    actors: Vec<Actor>,
    wait_remaining: Seconds,
    last_policy: Option<EffectiveSpawnPolicy>,
    attempts: u64,
}

impl CapacityScheduler {
    pub fn new(tuning: &SpawnTuning, spawn_points: &[FloorPos]) -> Self {
        Self {
            tuning: tuning.clone(),
            spawn_points: spawn_points.to_vec(),
            actors: Vec::new(),
            wait_remaining: 0.0,
            last_policy: None,
            attempts: 0,
        }
    }

    pub fn policy(&self, inputs: &SpawnInputs) -> EffectiveSpawnPolicy {
        EffectiveSpawnPolicy {
            cap: effective_cap(
                self.tuning.max_active_customers,
                inputs.reputation_cap,
                inputs.dirtiness_multiplier,
                inputs.phase_multiplier,
                inputs.day_closed,
            ),
            interval: effective_interval(
                self.tuning.base_interval_seconds,
                inputs.reputation_bonus_seconds,
                self.tuning.dirtiness_penalty_seconds.for_tier(inputs.tier),
            ),
        }
    }

    pub fn is_party_day(&self, day: u32) -> bool {
        self.tuning.party_day != 0 && day == self.tuning.party_day
    }

    /// Run the spawn loop for one frame. At most one attempt per call.
    pub fn tick(
        &mut self,
        delta: Seconds,
        inputs: &SpawnInputs,
        factory: &mut dyn ActorFactory,
        seats: &mut SeatAllocator,
        rng: &mut SubsystemRng,
    ) -> Vec<SimEvent> {
        let mut out = Vec::new();
        self.wait_remaining -= delta.max(0.0);
        if self.wait_remaining > 0.0 {
            return out;
        }

        let policy = self.policy(inputs);
        self.attempts += 1;
        self.try_spawn(&policy, inputs, factory, seats, rng, &mut out);
        self.wait_remaining = policy.interval;
        self.last_policy = Some(policy);
        out
    }

    /// Advance every actor and drop the ones that have left.
    pub fn advance_actors(
        &mut self,
        delta: Seconds,
        seats: &mut SeatAllocator,
        sink: &mut dyn MessSink,
        rng: &mut SubsystemRng,
    ) -> Vec<SimEvent> {
        let mut out = Vec::new();
        for actor in &mut self.actors {
            actor.advance(delta, seats, sink, rng, &mut out);
        }
        self.actors.retain(|actor| {
            if actor.is_gone() {
                out.push(SimEvent::CustomerDespawned { actor_id: actor.id });
                false
            } else {
                true
            }
        });
        out
    }

    /// Day-start reaction: outside the party day, party guests are
    /// removed and their seats cleared without mess.
    pub fn on_day_started(&mut self, day: u32, seats: &mut SeatAllocator, sink: &mut dyn MessSink) -> Vec<SimEvent> {
        let mut out = Vec::new();
        if self.is_party_day(day) {
            return out;
        }
        let before = self.actors.len();
        self.actors.retain_mut(|actor| {
            if actor.kind != ActorKind::PartyGuest {
                return true;
            }
            actor.release_seat(seats, false, sink);
            out.push(SimEvent::CustomerDespawned { actor_id: actor.id });
            false
        });
        if self.actors.len() != before {
            log::info!("day={day} party over, {} guests sent home", before - self.actors.len());
        }
        out
    }

    pub fn active_count(&self) -> u32 {
        self.actors.len() as u32
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn last_policy(&self) -> Option<EffectiveSpawnPolicy> {
        self.last_policy
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn wait_remaining(&self) -> Seconds {
        self.wait_remaining.max(0.0)
    }

    fn try_spawn(
        &mut self,
        policy: &EffectiveSpawnPolicy,
        inputs: &SpawnInputs,
        factory: &mut dyn ActorFactory,
        seats: &mut SeatAllocator,
        rng: &mut SubsystemRng,
        out: &mut Vec<SimEvent>,
    ) {
        let skip = |reason: SpawnSkipReason, out: &mut Vec<SimEvent>| {
            log::debug!("day={} spawn skipped: {reason:?}", inputs.day_count);
            out.push(SimEvent::SpawnSkipped { reason });
        };

        if self.spawn_points.is_empty() {
            return skip(SpawnSkipReason::MissingResources, out);
        }
        if inputs.day_closed {
            return skip(SpawnSkipReason::DayClosed, out);
        }
        if self.active_count() >= policy.cap {
            return skip(SpawnSkipReason::CapReached, out);
        }

        let at = self.spawn_points[rng.pick_index(self.spawn_points.len())];
        let kind = if self.is_party_day(inputs.day_count) {
            ActorKind::PartyGuest
        } else {
            ActorKind::Customer
        };
        let Some(mut actor) = factory.create(kind, at) else {
            return skip(SpawnSkipReason::MissingResources, out);
        };

        let seat = match kind {
            ActorKind::PartyGuest => None,
            ActorKind::Customer => {
                let reserved = seats
                    .nearest_free(at)
                    .filter(|&seat| seats.try_reserve(seat, actor.id));
                let Some(seat) = reserved else {
                    return skip(SpawnSkipReason::NoFreeSeat, out);
                };
                if let Some(pos) = seats.position(seat) {
                    actor.assign_seat(seat, pos);
                }
                Some(seat)
            }
        };

        log::debug!(
            "day={} spawned {kind:?} {} ({}/{})",
            inputs.day_count,
            actor.id,
            self.active_count() + 1,
            policy.cap
        );
        out.push(SimEvent::CustomerSpawned { actor_id: actor.id, kind, seat });
        self.actors.push(actor);
    }
}
