//! Episode simulation built on the core data types.
//!
//! - [`Environment`] - Owns all state of one runner game and advances it tick by tick
//! - [`Spawner`] - Stochastic obstacle injection scaled by difficulty tier
//! - [`EventQueue`] - Tick-indexed deferred obstacle inserts and follow-up jumps
//! - [`Snapshot`] - Typed observation handed to controllers
//! - [`EnvSeed`] - Seed for reproducible episodes
//!
//! # Game Flow
//!
//! 1. Create an [`Environment`] (the spawn delay is drawn once here)
//! 2. [`Environment::start`] begins an episode
//! 3. Inputs ([`Environment::press_jump`], [`Environment::schedule_jumps`]) are
//!    applied between ticks
//! 4. [`Environment::step`] advances one tick; the score grows by one per tick
//! 5. A collision makes the episode terminal; [`Environment::start`] begins the next one

pub use self::{environment::*, event_queue::*, seed::*, snapshot::*, spawner::*};

mod environment;
mod event_queue;
mod seed;
mod snapshot;
mod spawner;
