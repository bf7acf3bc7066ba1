//! The simulation engine — owns the restaurant floor and runs one frame
//! at a time.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Clock advance           (frame delta → simulated delta)
//!   2. Day cycle               (phase / day transitions)
//!   3. Day-boundary reactions  (shift review, per-day resets, party despawn)
//!   4. Strike cutscene         (confirms a pending strike when it finishes)
//!   5. Actors                  (walk, sit, vacate → mess, leave)
//!   6. Dirtiness               (accumulate every frame, census on cadence)
//!   7. Combo decay
//!   8. Spawn scheduler
//!   9. Ambient spill spawner
//!   then: event log, snapshot, listener dispatch.
//!
//! RULES:
//!   - Components never call each other; the engine passes values and
//!     collaborators in at call time.
//!   - All randomness flows through the RngBank.
//!   - Every emitted event is recorded in the event log, including those
//!     produced by player actions between frames.

use crate::{
    actor::StandardActorFactory,
    capacity::{CapacityScheduler, SpawnInputs},
    clock::SimClock,
    collaborator::{ActorFactory, RewardSink, StrikeCutscene, TimedStrikeCutscene},
    combo::ComboRewardMeter,
    command::PlayerCommand,
    config::SimConfig,
    day_cycle::DayCycle,
    dirtiness::DirtinessTracker,
    error::{SimError, SimResult},
    event::{EventLogEntry, MessSource, SimEvent},
    listener::{ListenerId, ListenerRegistry},
    mess::{MessField, SpillSpawner, SweepOutcome},
    powerup::BroomPowerup,
    reputation::ReputationTrack,
    review::ShiftReview,
    rng::{RngBank, SubsystemSlot},
    seats::SeatAllocator,
    snapshot::{SessionSnapshot, SNAPSHOT_INTERVAL},
    store::SimStore,
    types::{FloorPos, RunId, Seconds, SpillId, Tick},
    wallet::CoinWallet,
};

pub struct SimEngine {
    pub run_id:   RunId,
    pub clock:    SimClock,
    pub rng_bank: RngBank,
    seed:         u64,
    config:       SimConfig,
    store:        SimStore,

    day_cycle:    DayCycle,
    dirtiness:    DirtinessTracker,
    reputation:   ReputationTrack,
    seats:        SeatAllocator,
    scheduler:    CapacityScheduler,
    combo:        ComboRewardMeter,
    mess:         MessField,
    spills:       SpillSpawner,
    wallet:       CoinWallet,
    broom:        BroomPowerup,
    review:       ShiftReview,

    factory:      Box<dyn ActorFactory>,
    cutscene:     Option<Box<dyn StrikeCutscene>>,
    listeners:    ListenerRegistry,
}

impl SimEngine {
    /// Wire every component from `config`. The run must already exist in
    /// `store`. Emits RunInitialized at tick 0.
    pub fn new(run_id: RunId, seed: u64, store: SimStore, config: SimConfig) -> SimResult<Self> {
        let cutscene: Option<Box<dyn StrikeCutscene>> = if config.dirtiness.strike_escalation {
            Some(Box::new(TimedStrikeCutscene::new(config.dirtiness.strike_cutscene_seconds)))
        } else {
            None
        };
        let mut dirtiness = DirtinessTracker::new(&config.dirtiness);
        dirtiness.set_strike_escalation(cutscene.is_some());

        let mut engine = Self {
            clock:      SimClock::new(run_id.clone()),
            rng_bank:   RngBank::new(seed),
            seed,
            store,
            day_cycle:  DayCycle::new(&config.day_cycle),
            dirtiness,
            reputation: ReputationTrack::new(&config.reputation),
            seats:      SeatAllocator::new(&config.layout.seats),
            scheduler:  CapacityScheduler::new(&config.spawn, &config.layout.spawn_points),
            combo:      ComboRewardMeter::new(&config.combo),
            mess:       MessField::new(&config.cleaning),
            spills:     SpillSpawner::new(&config.spills),
            wallet:     CoinWallet::new(config.economy.starting_coins),
            broom:      BroomPowerup::new(&config.economy.broom),
            review:     ShiftReview::new(&config.economy.review),
            factory:    Box::new(StandardActorFactory::new(&config.actors, config.layout.exit_point)),
            cutscene,
            listeners:  ListenerRegistry::new(),
            config,
            run_id,
        };

        let init = SimEvent::RunInitialized { run_id: engine.run_id.clone(), seed };
        engine.record(0, std::slice::from_ref(&init))?;
        Ok(engine)
    }

    /// Build an engine with config loaded from `data_dir`.
    pub fn build(run_id: RunId, seed: u64, store: SimStore, data_dir: &str) -> SimResult<Self> {
        let config = SimConfig::load(data_dir)?;
        Self::new(run_id, seed, store, config)
    }

    /// A fresh in-memory session. Used by tests and the runner.
    pub fn in_memory(seed: u64, config: SimConfig) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        let run_id = format!("session-{seed}");
        store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;
        Self::new(run_id, seed, store, config)
    }

    /// Swap the actor factory. A factory that returns None makes every
    /// spawn attempt skip with MissingResources.
    pub fn set_actor_factory(&mut self, factory: Box<dyn ActorFactory>) {
        self.factory = factory;
    }

    /// Install or remove the strike cutscene. Without one, strikes
    /// confirm themselves as soon as the floor turns filthy.
    ///
    /// A strike already pending is handed over: removing the cutscene
    /// confirms it now, a new cutscene starts playing it.
    pub fn set_strike_cutscene(&mut self, cutscene: Option<Box<dyn StrikeCutscene>>) -> SimResult<()> {
        self.dirtiness.set_strike_escalation(cutscene.is_some());
        self.cutscene = cutscene;
        if !self.dirtiness.is_strike_pending() {
            return Ok(());
        }

        if let Some(cutscene) = self.cutscene.as_mut() {
            cutscene.begin();
            return Ok(());
        }
        let mut confirmed = Vec::new();
        self.dirtiness.confirm_strike(&mut confirmed);
        self.react_to_strikes(&confirmed);
        self.publish(self.clock.current_tick, &confirmed)
    }

    /// Advance one frame. This is the core simulation step.
    pub fn tick(&mut self, frame_delta: Seconds) -> SimResult<Vec<SimEvent>> {
        if self.clock.paused {
            return Err(SimError::ClockPaused);
        }

        // 1. Clock
        let delta = self.clock.advance(frame_delta);
        let tick = self.clock.current_tick;
        let mut events = vec![SimEvent::TickStarted { tick }];

        // 2–3. Day cycle and the reactions to its boundaries
        let day_events = self.day_cycle.tick(delta);
        self.react_to_day_events(day_events, &mut events);

        // 4. Strike cutscene
        let cutscene_done = self.cutscene.as_mut().is_some_and(|c| c.advance(delta));
        if cutscene_done {
            let mut confirmed = Vec::new();
            self.dirtiness.confirm_strike(&mut confirmed);
            self.react_to_strikes(&confirmed);
            events.extend(confirmed);
        }

        // 5. Actors
        let mut party_rng = self.rng_bank.for_subsystem_at_tick(SubsystemSlot::Party, tick);
        events.extend(self.scheduler.advance_actors(delta, &mut self.seats, &mut self.mess, &mut party_rng));
        events.extend(self.mess.drain_events());

        // 6. Dirtiness
        let dirt_events = self.dirtiness.update(delta, &self.mess);
        self.react_to_strikes(&dirt_events);
        events.extend(dirt_events);

        // 7. Combo decay
        events.extend(self.combo.tick(delta, self.dirtiness.tier()));

        // 8. Spawn scheduler
        let inputs = self.spawn_inputs();
        let mut spawn_rng = self.rng_bank.for_subsystem_at_tick(SubsystemSlot::Spawner, tick);
        events.extend(self.scheduler.tick(delta, &inputs, &mut *self.factory, &mut self.seats, &mut spawn_rng));

        // 9. Ambient spills
        let mut spill_rng = self.rng_bank.for_subsystem_at_tick(SubsystemSlot::Spill, tick);
        self.spills.tick(
            delta,
            self.scheduler.active_count(),
            &self.config.layout.tables,
            &mut self.mess,
            &mut spill_rng,
        );
        events.extend(self.mess.drain_events());

        events.push(SimEvent::TickCompleted { tick });
        self.publish(tick, &events)?;

        if tick % SNAPSHOT_INTERVAL == 0 {
            self.take_snapshot(tick)?;
        }
        Ok(events)
    }

    /// Run `n` frames of `frame_delta` each. The pause state is restored
    /// afterwards.
    pub fn run_frames(&mut self, n: u64, frame_delta: Seconds) -> SimResult<()> {
        let was_paused = self.clock.paused;
        self.clock.resume();
        let result = (0..n).try_for_each(|_| self.tick(frame_delta).map(|_| ()));
        if was_paused {
            self.clock.pause();
        }
        result
    }

    // ── Player actions ─────────────────────────────────────────

    /// Leave the between-days wait. Returns whether it took effect.
    pub fn continue_to_next_day(&mut self) -> SimResult<bool> {
        let mut day_events = Vec::new();
        if !self.day_cycle.continue_to_next_day(&mut day_events) {
            return Ok(false);
        }
        let mut events = Vec::new();
        self.react_to_day_events(day_events, &mut events);
        self.publish(self.clock.current_tick, &events)?;
        Ok(true)
    }

    /// Sweep a spill (the oldest one if `spill_id` is None) for `seconds`.
    /// A finished spill pays out through the combo meter.
    pub fn sweep(&mut self, spill_id: Option<SpillId>, seconds: Seconds) -> SimResult<SweepOutcome> {
        let Some(spill_id) = spill_id.or_else(|| self.mess.oldest().map(|s| s.id)) else {
            return Ok(SweepOutcome::NotFound);
        };
        let outcome = self.mess.sweep(spill_id, seconds, self.broom.current_multiplier());
        if outcome != SweepOutcome::Cleaned {
            return Ok(outcome);
        }

        self.review.record_clean();
        let mut combo_events = Vec::new();
        let coins = self.combo.register_reward(self.config.cleaning.coins_per_clean as i64, &mut combo_events);
        let mut events = vec![SimEvent::SpillCleaned { spill_id, coins, streak: self.combo.streak() }];
        events.extend(combo_events);
        self.wallet.credit(coins, &mut events);

        self.publish(self.clock.current_tick, &events)?;
        Ok(outcome)
    }

    /// Buy one broom use. Coins are refunded if the use cannot be consumed.
    pub fn buy_broom(&mut self) -> SimResult<bool> {
        if !self.broom.can_use_today() {
            return Ok(false);
        }
        let mut events = Vec::new();
        let cost = self.broom.cost();
        if !self.wallet.try_spend(cost, &mut events) {
            return Ok(false);
        }
        let used = self.broom.try_consume_use(&mut events);
        if !used {
            self.wallet.add_coins(cost as i64, &mut events);
            log::debug!("broom: no use left, refunded {cost}");
        }
        self.publish(self.clock.current_tick, &events)?;
        Ok(used)
    }

    /// Apply one player command. Returns whether it took effect.
    pub fn apply_command(&mut self, command: PlayerCommand) -> SimResult<bool> {
        log::debug!("tick={} command {command:?}", self.clock.current_tick);
        match command {
            PlayerCommand::Pause => self.clock.pause(),
            PlayerCommand::Resume => self.clock.resume(),
            PlayerCommand::SetSpeed { speed } => self.clock.set_speed(speed),
            PlayerCommand::ContinueDay => return self.continue_to_next_day(),
            PlayerCommand::Sweep { spill_id, seconds } => {
                return Ok(self.sweep(spill_id, seconds)? != SweepOutcome::NotFound);
            }
            PlayerCommand::BuyBroom => return self.buy_broom(),
        }
        Ok(true)
    }

    // ── Listeners ──────────────────────────────────────────────

    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&SimEvent) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn seed(&self) -> u64 { self.seed }
    pub fn config(&self) -> &SimConfig { &self.config }
    pub fn day_cycle(&self) -> &DayCycle { &self.day_cycle }
    pub fn dirtiness(&self) -> &DirtinessTracker { &self.dirtiness }
    pub fn reputation(&self) -> &ReputationTrack { &self.reputation }
    pub fn seats(&self) -> &SeatAllocator { &self.seats }
    pub fn scheduler(&self) -> &CapacityScheduler { &self.scheduler }
    pub fn combo(&self) -> &ComboRewardMeter { &self.combo }
    pub fn mess(&self) -> &MessField { &self.mess }
    pub fn wallet(&self) -> &CoinWallet { &self.wallet }
    pub fn broom(&self) -> &BroomPowerup { &self.broom }
    pub fn review(&self) -> &ShiftReview { &self.review }

    /// True once the run can make no further progress.
    pub fn is_over(&self) -> bool {
        self.day_cycle.is_game_over() || self.dirtiness.is_game_over()
    }

    /// Drop a spill directly onto the floor, outside the normal sources.
    /// Used by tooling and tests to stage a dirty floor.
    pub fn spill_at(&mut self, at: FloorPos) -> SimResult<SpillId> {
        let id = self.mess.add_spill(at, MessSource::Ambient);
        let events = self.mess.drain_events();
        self.publish(self.clock.current_tick, &events)?;
        Ok(id)
    }

    /// Query events for a specific tick from the store.
    /// Used by the determinism test and replay tooling.
    pub fn store_events_for_tick(&self, run_id: &str, tick: Tick) -> SimResult<Vec<EventLogEntry>> {
        self.store.events_for_tick(run_id, tick)
    }

    pub fn store(&self) -> &SimStore {
        &self.store
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            run_id:           self.run_id.clone(),
            tick:             self.clock.current_tick,
            clock:            self.clock.clone(),
            day:              self.day_cycle.state().clone(),
            dirtiness:        self.dirtiness.state().clone(),
            reputation:       self.reputation.state().clone(),
            combo:            self.combo.state().clone(),
            wallet:           self.wallet.state().clone(),
            powerup:          self.broom.state().clone(),
            active_customers: self.scheduler.active_count(),
            active_spills:    self.mess.count() as u32,
        }
    }

    // ── Internals ──────────────────────────────────────────────

    fn spawn_inputs(&self) -> SpawnInputs {
        SpawnInputs {
            day_count:                self.day_cycle.day_count(),
            day_closed:               self.day_cycle.is_closed(),
            phase_multiplier:         self.day_cycle.activity_multiplier(),
            reputation_cap:           self.reputation.cap_for_level(),
            reputation_bonus_seconds: self.reputation.interval_bonus_for_level(),
            dirtiness_multiplier:     self.dirtiness.cap_multiplier(),
            tier:                     self.dirtiness.tier(),
        }
    }

    /// Forward day-cycle events, each followed by what it triggers.
    fn react_to_day_events(&mut self, day_events: Vec<SimEvent>, out: &mut Vec<SimEvent>) {
        for event in day_events {
            out.push(event.clone());
            match event {
                SimEvent::DayEnded { day, is_final_day } if !self.day_cycle.infinite_days() => {
                    self.review.review(
                        day,
                        is_final_day,
                        self.dirtiness.filth_time_seconds(),
                        &mut self.reputation,
                        &mut self.wallet,
                        out,
                    );
                }
                SimEvent::DayStarted { day } => {
                    self.dirtiness.reset_day_timers();
                    self.combo.reset_on_new_day(out);
                    self.broom.reset_for_new_day();
                    self.review.on_day_started();
                    out.extend(self.scheduler.on_day_started(day, &mut self.seats, &mut self.mess));
                    out.extend(self.mess.drain_events());
                }
                _ => {}
            }
        }
    }

    fn react_to_strikes(&mut self, events: &[SimEvent]) {
        for event in events {
            match event {
                SimEvent::FilthyStrikeRequested => {
                    if let Some(cutscene) = self.cutscene.as_mut() {
                        cutscene.begin();
                    }
                }
                SimEvent::GameOverByFilth { .. } => self.day_cycle.halt(),
                _ => {}
            }
        }
    }

    /// Append to the event log, then hand to listeners.
    fn publish(&mut self, tick: Tick, events: &[SimEvent]) -> SimResult<()> {
        self.record(tick, events)?;
        self.listeners.dispatch(events);
        Ok(())
    }

    fn record(&self, tick: Tick, events: &[SimEvent]) -> SimResult<()> {
        for event in events {
            let entry = EventLogEntry {
                id:         None,
                run_id:     self.run_id.clone(),
                tick,
                component:  event.component().to_string(),
                event_type: event.type_name().to_string(),
                payload:    serde_json::to_string(event)?,
            };
            self.store.append_event(&entry)?;
        }
        Ok(())
    }

    fn take_snapshot(&self, tick: Tick) -> SimResult<()> {
        let json = serde_json::to_string(&self.snapshot())?;
        self.store.save_snapshot(&self.run_id, tick, &json)?;
        log::debug!("Snapshot saved at tick {tick}");
        Ok(())
    }
}
