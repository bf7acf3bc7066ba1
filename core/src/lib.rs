//! Restaurant floor simulation core: day cycle, dirtiness, reputation,
//! customer capacity, seating and the cleaning combo, driven one frame
//! at a time by `engine::SimEngine`.

pub mod actor;
pub mod capacity;
pub mod clock;
pub mod collaborator;
pub mod combo;
pub mod command;
pub mod config;
pub mod day_cycle;
pub mod dirtiness;
pub mod engine;
pub mod error;
pub mod event;
pub mod listener;
pub mod mess;
pub mod powerup;
pub mod reputation;
pub mod review;
pub mod rng;
pub mod seats;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod wallet;
