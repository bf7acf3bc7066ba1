//! Seat allocator — the two-phase chair protocol.
//!
//! Free → Reserved(by) → Occupied(by) → Free
//!
//! RULES:
//!   - A seat has at most one owner.
//!   - A reserved seat can only be taken by the actor holding it.
//!   - Vacating an occupied seat signals exactly one mess unit.
//!   - Failed calls leave the seat untouched and return false.

use crate::{
    collaborator::MessSink,
    event::MessSource,
    rng::SubsystemRng,
    types::{ActorId, FloorPos, SeatId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "by", rename_all = "snake_case")]
pub enum SeatState {
    Free,
    Reserved(ActorId),
    Occupied(ActorId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub position: FloorPos,
    pub state: SeatState,
}

pub struct SeatAllocator {
    seats: Vec<Seat>,
}

impl SeatAllocator {
    pub fn new(positions: &[FloorPos]) -> Self {
        Self {
            seats: positions
                .iter()
                .map(|&position| Seat { position, state: SeatState::Free })
                .collect(),
        }
    }

    pub fn try_reserve(&mut self, seat: SeatId, actor: ActorId) -> bool {
        match self.seats.get_mut(seat) {
            Some(s) if s.state == SeatState::Free => {
                s.state = SeatState::Reserved(actor);
                true
            }
            _ => false,
        }
    }

    pub fn release_reservation(&mut self, seat: SeatId, actor: ActorId) -> bool {
        match self.seats.get_mut(seat) {
            Some(s) if s.state == SeatState::Reserved(actor) => {
                s.state = SeatState::Free;
                true
            }
            _ => false,
        }
    }

    pub fn try_sit(&mut self, seat: SeatId, actor: ActorId) -> bool {
        let Some(s) = self.seats.get_mut(seat) else {
            return false;
        };
        match s.state {
            SeatState::Free => {}
            SeatState::Reserved(by) if by == actor => {}
            _ => return false,
        }
        s.state = SeatState::Occupied(actor);
        true
    }

    /// Stand up from an occupied seat. The seat becomes Free and one
    /// mess unit is dropped at it.
    pub fn vacate(&mut self, seat: SeatId, sink: &mut dyn MessSink) -> bool {
        let Some(s) = self.seats.get_mut(seat) else {
            return false;
        };
        if !matches!(s.state, SeatState::Occupied(_)) {
            return false;
        }
        s.state = SeatState::Free;
        sink.spawn_mess(s.position, MessSource::VacatedSeat);
        true
    }

    /// Force a seat back to Free whatever its state.
    pub fn clear(&mut self, seat: SeatId, spawn_mess: bool, sink: &mut dyn MessSink) {
        let Some(s) = self.seats.get_mut(seat) else {
            return;
        };
        s.state = SeatState::Free;
        if spawn_mess {
            sink.spawn_mess(s.position, MessSource::VacatedSeat);
        }
    }

    /// Closest free seat to `from`; ties go to the lowest id.
    pub fn nearest_free(&self, from: FloorPos) -> Option<SeatId> {
        self.free_ids()
            .map(|id| (id, self.seats[id].position.distance(&from)))
            .fold(None, |best: Option<(SeatId, f64)>, (id, d)| match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((id, d)),
            })
            .map(|(id, _)| id)
    }

    pub fn random_free(&self, rng: &mut SubsystemRng) -> Option<SeatId> {
        let free: Vec<SeatId> = self.free_ids().collect();
        if free.is_empty() {
            return None;
        }
        Some(free[rng.pick_index(free.len())])
    }

    pub fn free_count(&self) -> usize {
        self.free_ids().count()
    }

    pub fn state(&self, seat: SeatId) -> Option<SeatState> {
        self.seats.get(seat).map(|s| s.state)
    }

    pub fn position(&self, seat: SeatId) -> Option<FloorPos> {
        self.seats.get(seat).map(|s| s.position)
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    fn free_ids(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.state == SeatState::Free)
            .map(|(id, _)| id)
    }
}
