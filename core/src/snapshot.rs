//! Snapshot serialization — the session state to JSON.
//!
//! A snapshot is taken every SNAPSHOT_INTERVAL frames. It is a read-only
//! image for tooling; sessions are never resumed from one.

use crate::{
    clock::SimClock,
    combo::ComboState,
    day_cycle::DayState,
    dirtiness::DirtinessState,
    powerup::PowerupState,
    reputation::ReputationState,
    types::{RunId, Tick},
    wallet::WalletState,
};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_INTERVAL: Tick = 600; // ten seconds at 60 fps

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub run_id: RunId,
    pub tick: Tick,
    pub clock: SimClock,
    pub day: DayState,
    pub dirtiness: DirtinessState,
    pub reputation: ReputationState,
    pub combo: ComboState,
    pub wallet: WalletState,
    pub powerup: PowerupState,
    pub active_customers: u32,
    pub active_spills: u32,
}
