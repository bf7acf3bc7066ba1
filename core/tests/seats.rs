//! Seat allocator tests.
//!
//! Tests cover: the reserve/sit/vacate protocol, ownership, one mess unit
//! per vacate, nearest-seat selection, forced clears.

use spillshift_core::{
    collaborator::MessSink,
    event::MessSource,
    seats::{SeatAllocator, SeatState},
    types::{FloorPos, SpillId},
};

/// Records every mess drop instead of placing it on a floor.
#[derive(Default)]
struct CountingSink {
    drops: Vec<(FloorPos, MessSource)>,
}

impl MessSink for CountingSink {
    fn spawn_mess(&mut self, at: FloorPos, source: MessSource) -> SpillId {
        self.drops.push((at, source));
        self.drops.len() as SpillId
    }
}

fn row_of_seats() -> SeatAllocator {
    SeatAllocator::new(&[
        FloorPos::new(0.0, 0.0),
        FloorPos::new(2.0, 0.0),
        FloorPos::new(4.0, 0.0),
    ])
}

#[test]
fn reserve_then_sit_then_vacate() {
    let mut seats = row_of_seats();
    let mut sink = CountingSink::default();

    assert!(seats.try_reserve(1, 7));
    assert_eq!(seats.state(1), Some(SeatState::Reserved(7)));
    assert!(seats.try_sit(1, 7));
    assert_eq!(seats.state(1), Some(SeatState::Occupied(7)));
    assert!(seats.vacate(1, &mut sink));
    assert_eq!(seats.state(1), Some(SeatState::Free));

    assert_eq!(sink.drops, vec![(FloorPos::new(2.0, 0.0), MessSource::VacatedSeat)]);
}

#[test]
fn reserved_seat_belongs_to_its_holder() {
    let mut seats = row_of_seats();
    assert!(seats.try_reserve(0, 1));
    assert!(!seats.try_reserve(0, 2), "double reservation refused");
    assert!(!seats.try_sit(0, 2), "only the holder can sit");
    assert!(!seats.release_reservation(0, 2), "only the holder can release");
    assert_eq!(seats.state(0), Some(SeatState::Reserved(1)));

    assert!(seats.release_reservation(0, 1));
    assert_eq!(seats.state(0), Some(SeatState::Free));
}

#[test]
fn free_seat_can_be_taken_directly() {
    let mut seats = row_of_seats();
    assert!(seats.try_sit(2, 4));
    assert!(!seats.try_sit(2, 5));
    assert!(!seats.try_reserve(2, 5));
    assert_eq!(seats.free_count(), 2);
}

#[test]
fn vacating_twice_drops_one_mess() {
    let mut seats = row_of_seats();
    let mut sink = CountingSink::default();
    seats.try_sit(0, 1);

    assert!(seats.vacate(0, &mut sink));
    assert!(!seats.vacate(0, &mut sink));
    assert_eq!(sink.drops.len(), 1);
}

#[test]
fn vacating_a_reserved_or_unknown_seat_is_refused() {
    let mut seats = row_of_seats();
    let mut sink = CountingSink::default();
    seats.try_reserve(0, 1);

    assert!(!seats.vacate(0, &mut sink));
    assert!(!seats.vacate(99, &mut sink));
    assert!(!seats.try_reserve(99, 1));
    assert!(!seats.try_sit(99, 1));
    assert_eq!(seats.state(0), Some(SeatState::Reserved(1)));
    assert!(sink.drops.is_empty());
}

#[test]
fn nearest_free_skips_taken_seats() {
    let mut seats = row_of_seats();
    let door = FloorPos::new(5.0, 0.0);
    assert_eq!(seats.nearest_free(door), Some(2));

    seats.try_reserve(2, 1);
    assert_eq!(seats.nearest_free(door), Some(1));
    seats.try_sit(1, 2);
    seats.try_sit(0, 3);
    assert_eq!(seats.nearest_free(door), None);
}

#[test]
fn nearest_free_breaks_ties_by_lowest_id() {
    let seats = SeatAllocator::new(&[FloorPos::new(-1.0, 0.0), FloorPos::new(1.0, 0.0)]);
    assert_eq!(seats.nearest_free(FloorPos::new(0.0, 0.0)), Some(0));
}

#[test]
fn clear_frees_any_state() {
    let mut seats = row_of_seats();
    let mut sink = CountingSink::default();
    seats.try_reserve(0, 1);
    seats.try_sit(1, 2);

    seats.clear(0, false, &mut sink);
    seats.clear(1, true, &mut sink);
    seats.clear(99, true, &mut sink);

    assert_eq!(seats.free_count(), 3);
    assert_eq!(sink.drops.len(), 1);
}

#[test]
fn empty_allocator() {
    let seats = SeatAllocator::new(&[]);
    assert!(seats.is_empty());
    assert_eq!(seats.nearest_free(FloorPos::default()), None);
}
