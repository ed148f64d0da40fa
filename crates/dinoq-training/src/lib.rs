//! Online training loop for the dinoq runner.
//!
//! This crate connects the game ([`dinoq_engine`]) to the learning agent
//! ([`dinoq_agent`]) and keeps training progress across process restarts.
//!
//! # How Training Works
//!
//! 1. **Resume** - Load generation counter, high score and weights from the checkpoint store
//! 2. **Start** - Signal the environment to begin an episode
//! 3. **Step** - Encode the state, pick an action, apply it, advance one tick
//! 4. **Learn** - Score the step with the reward shaper and apply one Q-update
//! 5. **Persist** - After a collision, save weights, generation, high score and a log record
//! 6. **Repeat** - Until the generation bound or an external stop request
//!
//! # Architecture
//!
//! ```text
//! Trainer
//!     ↓ drives (start / apply / advance / observe)
//! EpisodeEnvironment (boundary)
//!     ↓ snapshots
//! StateEncoder → QController → Approximator
//!     ↑ rewards
//! RewardShaper
//!     ↓ after each episode
//! CheckpointStore
//! ```
//!
//! # Modules
//!
//! - [`boundary`] - Actuator / observer traits and the in-process environment
//! - [`checkpoint`] - Checkpoint store trait, JSON file store and training log
//! - [`trainer`] - Episode state machine and generation loop
//! - [`config`] - Aggregate configuration of a training run
//!
//! # Current Limitations
//!
//! - **One transition, one update**: No replay buffer and no target network, so learning is
//!   noisy and forgets quickly
//! - **Single environment**: Episodes run sequentially against one environment
//! - **Stop granularity**: A stop request is honored only between episodes

pub mod boundary;
pub mod checkpoint;
pub mod config;
pub mod trainer;
