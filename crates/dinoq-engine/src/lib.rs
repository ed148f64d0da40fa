//! Simulation of a minimal obstacle-avoidance runner game.
//!
//! - [`core`] - Runner physics, obstacles and rectangle collision
//! - [`engine`] - Environment, spawner, event queue and observation snapshots

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
