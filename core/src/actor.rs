//! Seat-seeking actors: regular customers and party guests.
//!
//! Actors are timer-driven. Travel takes distance / walk_speed seconds;
//! nothing here paths or moves smoothly.
//!
//! Customer:   Walking → Seated → Leaving → Gone
//! PartyGuest: Seeking → Walking → Seated → Seeking → ... (never leaves)

use crate::{
    collaborator::{ActorFactory, MessSink},
    config::ActorConfig,
    event::{ActorKind, SimEvent},
    rng::SubsystemRng,
    seats::SeatAllocator,
    types::{ActorId, FloorPos, SeatId, Seconds},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ActorPhase {
    Seeking,
    Walking { seat: SeatId, remaining: Seconds },
    Seated { seat: SeatId, remaining: Seconds },
    Leaving { remaining: Seconds },
    Gone,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorTiming {
    pub walk_speed: f64,
    pub sit_duration: Seconds,
    pub shuffle_min: Seconds,
    pub shuffle_max: Seconds,
}

impl From<&ActorConfig> for ActorTiming {
    fn from(config: &ActorConfig) -> Self {
        Self {
            walk_speed: config.walk_speed,
            sit_duration: config.sit_duration_seconds.max(0.0),
            shuffle_min: config.party_shuffle_min_seconds.min(config.party_shuffle_max_seconds).max(0.0),
            shuffle_max: config.party_shuffle_max_seconds.max(config.party_shuffle_min_seconds).max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub position: FloorPos,
    pub exit: Option<FloorPos>,
    pub phase: ActorPhase,
    timing: ActorTiming,
}

impl Actor {
    pub fn new(id: ActorId, kind: ActorKind, at: FloorPos, exit: Option<FloorPos>, timing: ActorTiming) -> Self {
        Self { id, kind, position: at, exit, phase: ActorPhase::Seeking, timing }
    }

    /// Start walking to a seat this actor has already reserved.
    pub fn assign_seat(&mut self, seat: SeatId, seat_pos: FloorPos) {
        self.phase = ActorPhase::Walking { seat, remaining: self.travel_time(seat_pos) };
    }

    pub fn is_gone(&self) -> bool {
        self.phase == ActorPhase::Gone
    }

    /// The seat this actor holds, reserved or occupied.
    pub fn seat(&self) -> Option<SeatId> {
        match self.phase {
            ActorPhase::Walking { seat, .. } | ActorPhase::Seated { seat, .. } => Some(seat),
            _ => None,
        }
    }

    pub fn advance(
        &mut self,
        delta: Seconds,
        seats: &mut SeatAllocator,
        sink: &mut dyn MessSink,
        rng: &mut SubsystemRng,
        out: &mut Vec<SimEvent>,
    ) {
        let delta = delta.max(0.0);
        match self.phase {
            ActorPhase::Seeking => self.seek(seats, rng),

            ActorPhase::Walking { seat, remaining } => {
                let left = remaining - delta;
                if left > 0.0 {
                    self.phase = ActorPhase::Walking { seat, remaining: left };
                    return;
                }
                if let Some(pos) = seats.position(seat) {
                    self.position = pos;
                }
                if seats.try_sit(seat, self.id) {
                    let remaining = match self.kind {
                        ActorKind::Customer   => self.timing.sit_duration,
                        ActorKind::PartyGuest => rng.range_f64(self.timing.shuffle_min, self.timing.shuffle_max),
                    };
                    self.phase = ActorPhase::Seated { seat, remaining };
                    out.push(SimEvent::CustomerSeated { actor_id: self.id, seat });
                } else {
                    seats.release_reservation(seat, self.id);
                    self.phase = ActorPhase::Seeking;
                }
            }

            ActorPhase::Seated { seat, remaining } => {
                let left = remaining - delta;
                if left > 0.0 {
                    self.phase = ActorPhase::Seated { seat, remaining: left };
                    return;
                }
                seats.vacate(seat, sink);
                out.push(SimEvent::CustomerLeft { actor_id: self.id, seat });
                self.phase = match (self.kind, self.exit) {
                    (ActorKind::PartyGuest, _) => ActorPhase::Seeking,
                    (ActorKind::Customer, Some(exit)) => ActorPhase::Leaving { remaining: self.travel_time(exit) },
                    (ActorKind::Customer, None) => ActorPhase::Gone,
                };
            }

            ActorPhase::Leaving { remaining } => {
                let left = remaining - delta;
                if left > 0.0 {
                    self.phase = ActorPhase::Leaving { remaining: left };
                    return;
                }
                if let Some(exit) = self.exit {
                    self.position = exit;
                }
                self.phase = ActorPhase::Gone;
            }

            ActorPhase::Gone => {}
        }
    }

    /// Drop whatever seat this actor holds, e.g. on a forced despawn.
    pub fn release_seat(&mut self, seats: &mut SeatAllocator, spawn_mess: bool, sink: &mut dyn MessSink) {
        match self.phase {
            ActorPhase::Walking { seat, .. } => {
                seats.release_reservation(seat, self.id);
            }
            ActorPhase::Seated { seat, .. } => seats.clear(seat, spawn_mess, sink),
            _ => {}
        }
        self.phase = ActorPhase::Gone;
    }

    /// Customers re-seek the nearest seat; party guests pick at random.
    fn seek(&mut self, seats: &mut SeatAllocator, rng: &mut SubsystemRng) {
        let candidate = match self.kind {
            ActorKind::Customer   => seats.nearest_free(self.position),
            ActorKind::PartyGuest => seats.random_free(rng),
        };
        let Some(seat) = candidate else {
            return;
        };
        if !seats.try_reserve(seat, self.id) {
            return;
        }
        if let Some(pos) = seats.position(seat) {
            self.assign_seat(seat, pos);
        }
    }

    fn travel_time(&self, to: FloorPos) -> Seconds {
        if self.timing.walk_speed <= 0.0 {
            return 0.0;
        }
        self.position.distance(&to) / self.timing.walk_speed
    }
}

/// Builds actors with sequential ids, all sharing one exit.
pub struct StandardActorFactory {
    next_id: ActorId,
    exit: Option<FloorPos>,
    timing: ActorTiming,
}

impl StandardActorFactory {
    pub fn new(config: &ActorConfig, exit: Option<FloorPos>) -> Self {
        Self { next_id: 1, exit, timing: ActorTiming::from(config) }
    }
}

impl ActorFactory for StandardActorFactory {
    fn create(&mut self, kind: ActorKind, at: FloorPos) -> Option<Actor> {
        let id = self.next_id;
        self.next_id += 1;
        Some(Actor::new(id, kind, at, self.exit, self.timing))
    }
}
