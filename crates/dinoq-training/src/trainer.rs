//! Episode and generation orchestration.
//!
//! Each generation walks one state machine:
//!
//! ```text
//! AwaitStart ──start──▶ Running ──terminal──▶ Terminal ──▶ Persisting ──▶ AwaitStart
//!                         ▲  │
//!                         └──┘ observe → select → apply → advance → observe → reward → update
//! ```
//!
//! Persistence happens strictly between episodes. A failed write is logged and
//! the run continues; the next successful write supersedes it.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use dinoq_agent::{
    approximator::Approximator,
    controller::{QController, Transition},
    encoder::StateEncoder,
    reward::{RewardShaper, StepContext},
};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    boundary::{EpisodeEnvironment, ObservationError},
    checkpoint::{CheckpointStore, TrainingRecord},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// The run stops once the generation counter exceeds this.
    pub max_generations: u64,
    /// Ends an episode after this many steps even if it is not terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_episode_ticks: Option<u64>,
    /// Seed for the reward shaper's random bonus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_generations: 100_000,
            max_episode_ticks: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum Phase {
    AwaitStart,
    Running,
    Terminal,
    Persisting,
}

/// Outcome of one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub generation: u64,
    pub score: u64,
    /// Decisions taken.
    pub steps: u64,
    pub cumulative_reward: f32,
    pub last_step_reward: f32,
    /// Episode ended by the step limit rather than a collision.
    pub truncated: bool,
    pub new_high_score: bool,
    /// Every checkpoint write succeeded.
    pub persisted: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSummary {
    pub episodes: u64,
    pub failed_episodes: u64,
    pub best_score: u64,
    /// Generation counter when the run ended (the next one to play).
    pub next_generation: u64,
    pub high_score: u64,
    /// The run ended because of the stop flag.
    pub interrupted: bool,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("generation {generation}: observation failed")]
pub struct EpisodeError {
    pub generation: u64,
    pub source: ObservationError,
}

/// Drives episodes against an environment, learning online and persisting
/// progress after each one.
#[derive(Debug)]
pub struct Trainer<E, A, S> {
    env: E,
    controller: QController<A>,
    encoder: StateEncoder,
    shaper: RewardShaper,
    store: S,
    config: TrainerConfig,
    reward_rng: Pcg32,
    generation: u64,
    high_score: u64,
    phase: Phase,
}

impl<E, A, S> Trainer<E, A, S>
where
    E: EpisodeEnvironment,
    A: Approximator,
    S: CheckpointStore,
{
    /// Creates a trainer, resuming from the store's checkpoint.
    ///
    /// Stored weights that do not fit the controller's approximator are
    /// discarded with a warning and the fresh parameters are kept.
    pub fn new(
        env: E,
        mut controller: QController<A>,
        encoder: StateEncoder,
        shaper: RewardShaper,
        store: S,
        config: TrainerConfig,
    ) -> Self {
        let checkpoint = store.load_checkpoint();
        if let Some(weights) = &checkpoint.weights {
            match controller.approximator_mut().load(weights) {
                Ok(()) => tracing::info!("restored approximator weights"),
                Err(e) => {
                    tracing::warn!(error = %e, "stored weights do not fit, starting from fresh weights");
                }
            }
        }
        let reward_rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_rng(&mut rand::rng()),
        };
        tracing::info!(
            generation = checkpoint.generation,
            high_score = checkpoint.high_score,
            "loaded checkpoint"
        );
        Self {
            env,
            controller,
            encoder,
            shaper,
            store,
            config,
            reward_rng,
            generation: checkpoint.generation,
            high_score: checkpoint.high_score,
            phase: Phase::AwaitStart,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn controller(&self) -> &QController<A> {
        &self.controller
    }

    #[must_use]
    pub fn env(&self) -> &E {
        &self.env
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the configured generation bound has been passed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.generation > self.config.max_generations
    }

    /// Plays, learns from and persists one generation.
    ///
    /// An observation failure aborts the episode. What was learned up to that
    /// point is still persisted and the generation counter still advances.
    pub fn run_episode(&mut self) -> Result<EpisodeSummary, EpisodeError> {
        let generation = self.generation;
        match self.play(generation) {
            Ok(mut summary) => {
                self.phase = Phase::Persisting;
                summary.persisted = self.persist(&summary);
                self.phase = Phase::AwaitStart;
                Ok(summary)
            }
            Err(source) => {
                tracing::error!(generation, error = %source, "episode aborted");
                self.phase = Phase::Persisting;
                self.persist_progress();
                self.phase = Phase::AwaitStart;
                Err(EpisodeError { generation, source })
            }
        }
    }

    fn play(&mut self, generation: u64) -> Result<EpisodeSummary, ObservationError> {
        self.phase = Phase::AwaitStart;
        self.env.start();
        self.phase = Phase::Running;

        let mut snapshot = self.env.observe()?;
        let mut state = self.encoder.encode(&snapshot);
        let mut steps = 0;
        let mut cumulative_reward = 0.0;
        let mut last_step_reward = 0.0;
        let mut new_high_score = false;
        let mut truncated = false;
        while !snapshot.terminal {
            if self.config.max_episode_ticks.is_some_and(|max| steps >= max) {
                truncated = true;
                break;
            }
            let decision = self
                .controller
                .select_action(&state, snapshot.agent.is_grounded);
            self.env.apply(decision.action);
            self.env.advance();
            let next = self.env.observe()?;
            steps += 1;

            let reward = self.shaper.step_reward(
                &StepContext {
                    survival_ticks: next.score,
                    action: decision.action,
                    snapshot: &next,
                    high_score: self.high_score,
                },
                &mut self.reward_rng,
            );
            new_high_score |= reward.new_high_score;
            let reward = reward.total();
            let next_state = self.encoder.encode(&next);
            self.controller.update(Transition {
                state,
                action: decision.index,
                reward,
                next_state: next_state.clone(),
                done: next.terminal,
            });
            cumulative_reward += reward;
            last_step_reward = reward;
            state = next_state;
            snapshot = next;
        }

        self.phase = Phase::Terminal;
        Ok(EpisodeSummary {
            generation,
            score: snapshot.score,
            steps,
            cumulative_reward,
            last_step_reward,
            truncated,
            new_high_score: new_high_score || snapshot.score > self.high_score,
            persisted: false,
        })
    }

    /// Writes weights and the advanced generation counter. Returns whether
    /// both writes succeeded.
    fn persist_progress(&mut self) -> bool {
        let mut ok = true;
        if let Err(e) = self
            .store
            .save_weights(&self.controller.approximator().save())
        {
            tracing::warn!(error = %e, "failed to save weights");
            ok = false;
        }
        self.generation += 1;
        if let Err(e) = self.store.save_generation(self.generation) {
            tracing::warn!(error = %e, "failed to save generation");
            ok = false;
        }
        ok
    }

    fn persist(&mut self, summary: &EpisodeSummary) -> bool {
        let mut ok = self.persist_progress();
        if summary.score > self.high_score {
            self.high_score = summary.score;
            if let Err(e) = self.store.save_high_score(self.high_score) {
                tracing::warn!(error = %e, "failed to save high score");
                ok = false;
            }
        }
        let record = TrainingRecord {
            generation: summary.generation,
            score: summary.score,
            last_step_reward: summary.last_step_reward,
            cumulative_reward: summary.cumulative_reward,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.store.append_record(record) {
            tracing::warn!(error = %e, "failed to append training record");
            ok = false;
        }
        ok
    }

    /// Runs generations until the configured bound or until `stop` is set.
    ///
    /// The flag is only checked between episodes; an episode in flight always
    /// completes.
    pub fn run(&mut self, stop: &AtomicBool) -> RunSummary {
        let mut summary = RunSummary::default();
        while !self.is_finished() {
            if stop.load(Ordering::SeqCst) {
                tracing::info!(generation = self.generation, "stop requested");
                summary.interrupted = true;
                break;
            }
            match self.run_episode() {
                Ok(episode) => {
                    summary.episodes += 1;
                    summary.best_score = summary.best_score.max(episode.score);
                    tracing::info!(
                        generation = episode.generation,
                        score = episode.score,
                        steps = episode.steps,
                        reward = episode.cumulative_reward,
                        high_score = self.high_score,
                        new_high_score = episode.new_high_score,
                        "generation finished"
                    );
                }
                Err(_) => summary.failed_episodes += 1,
            }
        }
        summary.next_generation = self.generation;
        summary.high_score = self.high_score;
        summary
    }
}

/// Plays episodes greedily without learning or persisting.
///
/// Returns the score of each episode.
pub fn evaluate<E, A, R>(
    env: &mut E,
    controller: &mut QController<A, R>,
    encoder: &StateEncoder,
    episodes: usize,
    max_ticks: Option<u64>,
) -> Result<Vec<u64>, ObservationError>
where
    E: EpisodeEnvironment,
    A: Approximator,
    R: Rng,
{
    let mut scores = Vec::with_capacity(episodes);
    for _ in 0..episodes {
        env.start();
        let mut snapshot = env.observe()?;
        let mut steps = 0;
        while !snapshot.terminal && max_ticks.is_none_or(|max| steps < max) {
            let state = encoder.encode(&snapshot);
            let decision = controller.select_action(&state, snapshot.agent.is_grounded);
            env.apply(decision.action);
            env.advance();
            snapshot = env.observe()?;
            steps += 1;
        }
        scores.push(snapshot.score);
    }
    Ok(scores)
}
