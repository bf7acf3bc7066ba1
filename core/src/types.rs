//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};

/// A simulation frame. One frame = one caller-supplied time step.
pub type Tick = u64;

/// Simulated seconds.
pub type Seconds = f64;

/// The canonical run identifier.
pub type RunId = String;

/// Stable identifier for a customer or party guest. Never reused in a run.
pub type ActorId = u64;

/// Index of a seat in the seat allocator.
pub type SeatId = usize;

/// Stable identifier for a spill on the floor. Never reused in a run.
pub type SpillId = u64;

/// A point on the restaurant floor plane. No height: the core never paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorPos {
    pub x: f64,
    pub z: f64,
}

impl FloorPos {
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn distance(&self, other: &FloorPos) -> f64 {
        ((self.x - other.x).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }
}
