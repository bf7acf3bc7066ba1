use serde::{Deserialize, Serialize};
use crate::{clock::SimSpeed, types::{Seconds, SpillId}};

/// All player-issued commands.
/// Variants are appended — never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,
    SetSpeed { speed: SimSpeed },

    // ── Day flow ──────────────────────────────────
    ContinueDay,

    // ── Floor actions ─────────────────────────────
    /// Sweep a spill for `seconds`. Without an id the oldest spill is swept.
    Sweep {
        #[serde(default)]
        spill_id: Option<SpillId>,
        seconds:  Seconds,
    },
    BuyBroom,
}
