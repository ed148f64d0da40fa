//! Learning agent for the dinoq runner.
//!
//! - [`encoder`]: snapshot → fixed-length normalized state vector
//! - [`action`]: discrete action sets
//! - [`approximator`]: action-value function capability and the default MLP
//! - [`controller`]: ε-greedy online Q-learning
//! - [`reward`]: shaped per-step reward

pub mod action;
pub mod approximator;
pub mod controller;
pub mod encoder;
pub mod reward;
