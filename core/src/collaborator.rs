//! Narrow interfaces the floor components consume.
//!
//! RULE: Components never reach for each other. Whatever a component
//! needs from outside is passed in at call time through one of these
//! traits (or as a plain value read by the engine).

use crate::{
    actor::Actor,
    event::{ActorKind, MessSource, SimEvent},
    types::{FloorPos, Seconds, SpillId},
};

/// Supplies the current number of uncleaned mess entities.
pub trait MessCensus {
    fn active_mess_count(&self) -> usize;
}

/// Receives new mess (a vacated seat, an ambient spill).
pub trait MessSink {
    fn spawn_mess(&mut self, at: FloorPos, source: MessSource) -> SpillId;
}

/// Builds seat-seeking actors. `None` means the factory cannot produce
/// one right now and the spawn attempt is skipped.
pub trait ActorFactory {
    fn create(&mut self, kind: ActorKind, at: FloorPos) -> Option<Actor>;
}

/// Plays the escalation before a filth strike counts.
/// The engine confirms the strike exactly once, on the frame
/// `advance()` first reports completion.
pub trait StrikeCutscene {
    fn begin(&mut self);
    fn advance(&mut self, delta: Seconds) -> bool;
    fn is_playing(&self) -> bool;
}

/// Receives rewards handed out by the combo meter and the shift review.
pub trait RewardSink {
    fn credit(&mut self, amount: u32, out: &mut Vec<SimEvent>);
}

/// A cutscene that simply lasts a fixed number of seconds.
#[derive(Debug, Clone)]
pub struct TimedStrikeCutscene {
    duration: Seconds,
    remaining: Option<Seconds>,
}

impl TimedStrikeCutscene {
    pub fn new(duration: Seconds) -> Self {
        Self { duration: duration.max(0.0), remaining: None }
    }
}

impl StrikeCutscene for TimedStrikeCutscene {
    fn begin(&mut self) {
        if self.remaining.is_none() {
            self.remaining = Some(self.duration);
        }
    }

    fn advance(&mut self, delta: Seconds) -> bool {
        let Some(remaining) = self.remaining else {
            return false;
        };
        let left = remaining - delta.max(0.0);
        if left > 0.0 {
            self.remaining = Some(left);
            return false;
        }
        self.remaining = None;
        true
    }

    fn is_playing(&self) -> bool {
        self.remaining.is_some()
    }
}
