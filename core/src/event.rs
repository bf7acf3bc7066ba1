//! The event stream — everything the core tells the outside world.
//!
//! RULE: Presentation, audio and UI collaborators learn about the floor
//! ONLY through these events (or through synchronous return values).
//! Every event emitted in a frame is appended to the event log in
//! emission order and then handed to registered listeners.

use crate::types::{ActorId, RunId, SeatId, SpillId, Tick};
use serde::{Deserialize, Serialize};

/// Every event emitted during simulation.
/// Variants are appended — never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },

    // ── Day cycle ──────────────────────────────────
    PhaseChanged {
        day: u32,
        phase: DayPhase,
    },
    DayStarted {
        day: u32,
    },
    DayEnded {
        day: u32,
        is_final_day: bool,
    },

    // ── Dirtiness ──────────────────────────────────
    DirtinessRefreshed {
        raw_count: u32,
        tier: DirtinessTier,
        customer_cap: u32,
    },
    FilthyStrikeRequested,
    FilthyCountChanged {
        count: u32,
    },
    GameOverByFilth {
        strikes: u32,
    },

    // ── Reputation ─────────────────────────────────
    ReputationIncreased {
        level: u32,
    },

    // ── Combo ──────────────────────────────────────
    ComboChanged {
        streak: u32,
        multiplier: f64,
    },

    // ── Customers and seats ────────────────────────
    CustomerSpawned {
        actor_id: ActorId,
        kind: ActorKind,
        seat: Option<SeatId>,
    },
    SpawnSkipped {
        reason: SpawnSkipReason,
    },
    CustomerSeated {
        actor_id: ActorId,
        seat: SeatId,
    },
    CustomerLeft {
        actor_id: ActorId,
        seat: SeatId,
    },
    CustomerDespawned {
        actor_id: ActorId,
    },

    // ── Mess and cleaning ──────────────────────────
    MessCreated {
        spill_id: SpillId,
        source: MessSource,
    },
    SpillCleaned {
        spill_id: SpillId,
        coins: u32,
        streak: u32,
    },

    // ── Economy ────────────────────────────────────
    CoinsChanged {
        total: u32,
    },
    PowerupUsed {
        uses_today: u32,
        multiplier: f64,
    },
    ShiftReviewed {
        day: u32,
        filth_seconds: f64,
        spills_cleaned: u32,
        salary_bonus: u32,
        earned_star: bool,
    },
    PromotionDecided {
        day: u32,
        coins: u32,
        required: u32,
        promoted: bool,
    },
}

impl SimEvent {
    /// Stable string name for a variant.
    /// Used for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::TickStarted { .. }         => "tick_started",
            SimEvent::TickCompleted { .. }       => "tick_completed",
            SimEvent::RunInitialized { .. }      => "run_initialized",
            SimEvent::PhaseChanged { .. }        => "phase_changed",
            SimEvent::DayStarted { .. }          => "day_started",
            SimEvent::DayEnded { .. }            => "day_ended",
            SimEvent::DirtinessRefreshed { .. }  => "dirtiness_refreshed",
            SimEvent::FilthyStrikeRequested      => "filthy_strike_requested",
            SimEvent::FilthyCountChanged { .. }  => "filthy_count_changed",
            SimEvent::GameOverByFilth { .. }     => "game_over_by_filth",
            SimEvent::ReputationIncreased { .. } => "reputation_increased",
            SimEvent::ComboChanged { .. }        => "combo_changed",
            SimEvent::CustomerSpawned { .. }     => "customer_spawned",
            SimEvent::SpawnSkipped { .. }        => "spawn_skipped",
            SimEvent::CustomerSeated { .. }      => "customer_seated",
            SimEvent::CustomerLeft { .. }        => "customer_left",
            SimEvent::CustomerDespawned { .. }   => "customer_despawned",
            SimEvent::MessCreated { .. }         => "mess_created",
            SimEvent::SpillCleaned { .. }        => "spill_cleaned",
            SimEvent::CoinsChanged { .. }        => "coins_changed",
            SimEvent::PowerupUsed { .. }         => "powerup_used",
            SimEvent::ShiftReviewed { .. }       => "shift_reviewed",
            SimEvent::PromotionDecided { .. }    => "promotion_decided",
        }
    }

    /// The component that emits this event.
    /// Used for the component column in event_log.
    pub fn component(&self) -> &'static str {
        match self {
            SimEvent::TickStarted { .. }
            | SimEvent::TickCompleted { .. }
            | SimEvent::RunInitialized { .. } => "engine",

            SimEvent::PhaseChanged { .. }
            | SimEvent::DayStarted { .. }
            | SimEvent::DayEnded { .. } => "day_cycle",

            SimEvent::DirtinessRefreshed { .. }
            | SimEvent::FilthyStrikeRequested
            | SimEvent::FilthyCountChanged { .. }
            | SimEvent::GameOverByFilth { .. } => "dirtiness",

            SimEvent::ReputationIncreased { .. } => "reputation",
            SimEvent::ComboChanged { .. } => "combo",

            SimEvent::CustomerSpawned { .. }
            | SimEvent::SpawnSkipped { .. }
            | SimEvent::CustomerSeated { .. }
            | SimEvent::CustomerLeft { .. }
            | SimEvent::CustomerDespawned { .. } => "capacity",

            SimEvent::MessCreated { .. } | SimEvent::SpillCleaned { .. } => "mess",
            SimEvent::CoinsChanged { .. } => "wallet",
            SimEvent::PowerupUsed { .. } => "powerup",
            SimEvent::ShiftReviewed { .. } | SimEvent::PromotionDecided { .. } => "review",
        }
    }
}

/// The four day segments, in order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DayPhase {
    Morning,
    RushHour,
    AfternoonSlowdown,
    Closing,
}

impl DayPhase {
    pub const ALL: [DayPhase; 4] = [
        DayPhase::Morning,
        DayPhase::RushHour,
        DayPhase::AfternoonSlowdown,
        DayPhase::Closing,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Discrete dirtiness levels. Ordering is meaningful: Clean < Dirty < VeryDirty < Filthy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DirtinessTier {
    Clean,
    Dirty,
    VeryDirty,
    Filthy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Customer,
    PartyGuest,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpawnSkipReason {
    MissingResources,
    DayClosed,
    CapReached,
    NoFreeSeat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessSource {
    VacatedSeat,
    Ambient,
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub tick: Tick,
    pub component: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}
