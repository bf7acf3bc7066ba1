//! Capacity scheduler tests.
//!
//! Tests cover: cap and interval formulas, attempt spacing, skip reasons,
//! seat choice, party-day guests, the customer lifecycle.

use spillshift_core::{
    actor::{Actor, StandardActorFactory},
    capacity::{effective_cap, effective_interval, CapacityScheduler, SpawnInputs},
    collaborator::ActorFactory,
    config::{ActorConfig, CleaningConfig, SpawnTuning},
    event::{ActorKind, DirtinessTier, SimEvent, SpawnSkipReason},
    mess::MessField,
    rng::{RngBank, SubsystemRng, SubsystemSlot},
    seats::{SeatAllocator, SeatState},
    types::FloorPos,
};

fn open_inputs(day_count: u32) -> SpawnInputs {
    SpawnInputs {
        day_count,
        day_closed: false,
        phase_multiplier: 1.0,
        reputation_cap: 12,
        reputation_bonus_seconds: 0.0,
        dirtiness_multiplier: 1.0,
        tier: DirtinessTier::Clean,
    }
}

fn rng() -> SubsystemRng {
    RngBank::new(1).for_subsystem_at_tick(SubsystemSlot::Spawner, 0)
}

fn factory() -> StandardActorFactory {
    StandardActorFactory::new(&ActorConfig::default(), None)
}

fn row_of_seats() -> SeatAllocator {
    SeatAllocator::new(&[
        FloorPos::new(0.0, 0.0),
        FloorPos::new(2.0, 0.0),
        FloorPos::new(4.0, 0.0),
    ])
}

fn door() -> Vec<FloorPos> {
    vec![FloorPos::new(4.0, 0.0)]
}

struct NoActors;

impl ActorFactory for NoActors {
    fn create(&mut self, _kind: ActorKind, _at: FloorPos) -> Option<Actor> {
        None
    }
}

fn skip_reasons(events: &[SimEvent]) -> Vec<SpawnSkipReason> {
    events
        .iter()
        .filter_map(|e| match e {
            SimEvent::SpawnSkipped { reason } => Some(*reason),
            _ => None,
        })
        .collect()
}

#[test]
fn cap_formula() {
    assert_eq!(effective_cap(12, 8, 0.5, 1.0, false), 4);
    assert_eq!(effective_cap(12, 8, 0.5, 1.0, true), 0);
    assert_eq!(effective_cap(12, 8, 0.01, 0.25, false), 1, "open day keeps at least one");
    assert_eq!(effective_cap(6, 12, 1.0, 1.0, false), 6, "global max bounds the reputation cap");
    assert_eq!(effective_cap(12, 9, 1.0, 0.5, false), 4, "4.5 floors to 4");
}

#[test]
fn interval_formula() {
    assert_eq!(effective_interval(6.0, 2.0, 3.0), 7.0);
    assert_eq!(effective_interval(6.0, 0.0, 0.0), 6.0);
    assert_eq!(effective_interval(1.0, 2.0, 0.0), 0.1);
}

#[test]
fn policy_reads_tier_penalty() {
    let scheduler = CapacityScheduler::new(&SpawnTuning::default(), &door());
    let inputs = SpawnInputs { tier: DirtinessTier::VeryDirty, reputation_bonus_seconds: 1.0, ..open_inputs(1) };
    let policy = scheduler.policy(&inputs);
    assert_eq!(policy.interval, 7.0);
    assert_eq!(policy.cap, 12);
}

#[test]
fn attempts_are_spaced_by_the_interval() {
    let mut scheduler = CapacityScheduler::new(&SpawnTuning::default(), &door());
    let mut seats = SeatAllocator::new(&[FloorPos::default(); 16]);
    let mut factory = factory();
    let mut rng = rng();

    let mut attempt_frames = Vec::new();
    for frame in 0..40 {
        let before = scheduler.attempts();
        scheduler.tick(0.5, &open_inputs(1), &mut factory, &mut seats, &mut rng);
        if scheduler.attempts() > before {
            attempt_frames.push(frame);
        }
    }
    assert_eq!(attempt_frames, vec![0, 12, 24, 36]);
    assert_eq!(scheduler.active_count(), 4);
}

#[test]
fn skip_reasons_in_order() {
    let mut seats = row_of_seats();
    let mut rng = rng();

    let mut nowhere = CapacityScheduler::new(&SpawnTuning::default(), &[]);
    let events = nowhere.tick(0.1, &open_inputs(1), &mut factory(), &mut seats, &mut rng);
    assert_eq!(skip_reasons(&events), vec![SpawnSkipReason::MissingResources]);

    let mut closed = CapacityScheduler::new(&SpawnTuning::default(), &door());
    let inputs = SpawnInputs { day_closed: true, ..open_inputs(1) };
    let events = closed.tick(0.1, &inputs, &mut factory(), &mut seats, &mut rng);
    assert_eq!(skip_reasons(&events), vec![SpawnSkipReason::DayClosed]);
    assert_eq!(closed.last_policy().map(|p| p.cap), Some(0));

    let mut no_factory = CapacityScheduler::new(&SpawnTuning::default(), &door());
    let events = no_factory.tick(0.1, &open_inputs(1), &mut NoActors, &mut seats, &mut rng);
    assert_eq!(skip_reasons(&events), vec![SpawnSkipReason::MissingResources]);

    let mut no_seats = CapacityScheduler::new(&SpawnTuning::default(), &door());
    let events = no_seats.tick(0.1, &open_inputs(1), &mut factory(), &mut SeatAllocator::new(&[]), &mut rng);
    assert_eq!(skip_reasons(&events), vec![SpawnSkipReason::NoFreeSeat]);
    assert_eq!(no_seats.active_count(), 0, "seatless customers are discarded");
}

#[test]
fn cap_reached_blocks_further_spawns() {
    let tuning = SpawnTuning { base_interval_seconds: 1.0, ..SpawnTuning::default() };
    let mut scheduler = CapacityScheduler::new(&tuning, &door());
    let mut seats = row_of_seats();
    let mut factory = factory();
    let mut rng = rng();
    let inputs = SpawnInputs { reputation_cap: 1, ..open_inputs(1) };

    scheduler.tick(1.0, &inputs, &mut factory, &mut seats, &mut rng);
    let events = scheduler.tick(1.0, &inputs, &mut factory, &mut seats, &mut rng);
    assert_eq!(skip_reasons(&events), vec![SpawnSkipReason::CapReached]);
    assert_eq!(scheduler.active_count(), 1);
}

#[test]
fn customer_reserves_nearest_seat() {
    let mut scheduler = CapacityScheduler::new(&SpawnTuning::default(), &door());
    let mut seats = row_of_seats();
    let events = scheduler.tick(0.1, &open_inputs(1), &mut factory(), &mut seats, &mut rng());

    assert_eq!(
        events,
        vec![SimEvent::CustomerSpawned { actor_id: 1, kind: ActorKind::Customer, seat: Some(2) }]
    );
    assert_eq!(seats.state(2), Some(SeatState::Reserved(1)));
}

#[test]
fn party_guests_only_on_party_day() {
    let mut scheduler = CapacityScheduler::new(&SpawnTuning::default(), &door());
    let mut seats = row_of_seats();
    let mut field = MessField::new(&CleaningConfig::default());
    assert!(scheduler.is_party_day(2));

    let events = scheduler.tick(0.1, &open_inputs(2), &mut factory(), &mut seats, &mut rng());
    assert_eq!(
        events,
        vec![SimEvent::CustomerSpawned { actor_id: 1, kind: ActorKind::PartyGuest, seat: None }]
    );

    assert!(scheduler.on_day_started(2, &mut seats, &mut field).is_empty());
    assert_eq!(scheduler.active_count(), 1);

    let events = scheduler.on_day_started(3, &mut seats, &mut field);
    assert_eq!(events, vec![SimEvent::CustomerDespawned { actor_id: 1 }]);
    assert_eq!(scheduler.active_count(), 0);
    assert_eq!(field.count(), 0, "party clean-up leaves no mess");
}

#[test]
fn party_guest_finds_a_seat_and_keeps_shuffling() {
    let mut scheduler = CapacityScheduler::new(&SpawnTuning::default(), &door());
    let mut seats = SeatAllocator::new(&[FloorPos::new(4.0, 0.0)]);
    let mut field = MessField::new(&CleaningConfig::default());
    let mut rng = rng();

    scheduler.tick(0.1, &open_inputs(2), &mut factory(), &mut seats, &mut rng);
    scheduler.advance_actors(0.1, &mut seats, &mut field, &mut rng);
    assert_eq!(seats.state(0), Some(SeatState::Reserved(1)));

    let events = scheduler.advance_actors(0.1, &mut seats, &mut field, &mut rng);
    assert_eq!(events, vec![SimEvent::CustomerSeated { actor_id: 1, seat: 0 }]);

    let events = scheduler.advance_actors(10.0, &mut seats, &mut field, &mut rng);
    assert_eq!(events, vec![SimEvent::CustomerLeft { actor_id: 1, seat: 0 }]);
    assert_eq!(field.count(), 1);
    assert_eq!(scheduler.active_count(), 1, "party guests never leave on their own");
}

#[test]
fn customer_lifecycle_leaves_one_spill() {
    let mut scheduler = CapacityScheduler::new(&SpawnTuning::default(), &door());
    let mut seats = row_of_seats();
    let mut field = MessField::new(&CleaningConfig::default());
    let mut rng = rng();

    scheduler.tick(0.1, &open_inputs(1), &mut factory(), &mut seats, &mut rng);

    let events = scheduler.advance_actors(0.1, &mut seats, &mut field, &mut rng);
    assert_eq!(events, vec![SimEvent::CustomerSeated { actor_id: 1, seat: 2 }]);
    assert_eq!(seats.state(2), Some(SeatState::Occupied(1)));

    assert!(scheduler.advance_actors(7.0, &mut seats, &mut field, &mut rng).is_empty());

    let events = scheduler.advance_actors(1.0, &mut seats, &mut field, &mut rng);
    assert_eq!(
        events,
        vec![
            SimEvent::CustomerLeft { actor_id: 1, seat: 2 },
            SimEvent::CustomerDespawned { actor_id: 1 },
        ]
    );
    assert_eq!(seats.state(2), Some(SeatState::Free));
    assert_eq!(field.count(), 1);
    assert_eq!(scheduler.active_count(), 0);
}
