use std::ops::Range;

use dinoq_engine::Snapshot;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::Action;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Reward per tick survived so far in the episode.
    pub survival_rate: f32,
    pub terminal_penalty: f32,
    /// Paid at termination when the score at least matches the high score.
    pub high_score_tie_bonus: f32,
    /// Paid on top of the tie bonus when the score beats the high score.
    pub new_high_score_bonus: f32,
    pub random_bonus_probability: f64,
    pub random_bonus: f32,
    /// Cost of a jump action, indexed by `presses - 1`.
    pub jump_costs: Vec<f32>,
    pub proactive_bonus: f32,
    /// Range of `predicted_future_x - agent.x` that earns the proactive bonus
    /// (both bounds exclusive).
    pub proactive_window: Range<f32>,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            survival_rate: 0.01,
            terminal_penalty: 50.0,
            high_score_tie_bonus: 50.0,
            new_high_score_bonus: 100.0,
            random_bonus_probability: 0.001,
            random_bonus: 0.5,
            jump_costs: vec![1.0, 2.0, 4.0],
            proactive_bonus: 2.0,
            proactive_window: 0.0..100.0,
        }
    }
}

/// Locally observable facts about one step.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// Ticks survived in the episode, including this step.
    pub survival_ticks: u64,
    /// The action taken this step.
    pub action: Action,
    /// State after the step.
    pub snapshot: &'a Snapshot,
    /// High score before this episode.
    pub high_score: u64,
}

/// Per-term breakdown of one step's reward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RewardBreakdown {
    pub survival: f32,
    pub action_cost: f32,
    pub proactive: f32,
    pub random_bonus: f32,
    pub terminal: f32,
    pub high_score: f32,
    /// The episode ended with a score above the previous high score.
    pub new_high_score: bool,
}

impl RewardBreakdown {
    #[must_use]
    pub fn total(&self) -> f32 {
        self.survival + self.proactive + self.random_bonus + self.high_score
            - self.action_cost
            - self.terminal
    }
}

/// Computes the shaped per-step reward.
///
/// # Example
///
/// ```
/// use dinoq_agent::{action::Action, reward::{RewardConfig, RewardShaper, StepContext}};
/// use dinoq_engine::{EngineConfig, Environment};
/// use rand::SeedableRng;
/// use rand_pcg::Pcg32;
///
/// let shaper = RewardShaper::new(RewardConfig {
///     random_bonus_probability: 0.0,
///     ..RewardConfig::default()
/// });
/// let snapshot = Environment::new(EngineConfig::default()).snapshot();
/// let reward = shaper.step_reward(
///     &StepContext { survival_ticks: 100, action: Action::NoOp, snapshot: &snapshot, high_score: 0 },
///     &mut Pcg32::seed_from_u64(0),
/// );
/// assert!((reward.total() - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RewardShaper {
    config: RewardConfig,
}

impl RewardShaper {
    #[must_use]
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    #[expect(clippy::cast_precision_loss)]
    pub fn step_reward<R>(&self, ctx: &StepContext<'_>, rng: &mut R) -> RewardBreakdown
    where
        R: Rng + ?Sized,
    {
        let config = &self.config;
        let mut reward = RewardBreakdown {
            survival: ctx.survival_ticks as f32 * config.survival_rate,
            action_cost: self.action_cost(ctx.action),
            ..RewardBreakdown::default()
        };

        let snapshot = ctx.snapshot;
        if let Some(obstacle) = snapshot.leading_obstacle() {
            let gap = obstacle.predicted_future_x - snapshot.agent.x;
            let window = &config.proactive_window;
            if window.start < gap && gap < window.end {
                reward.proactive = config.proactive_bonus;
            }
        }

        let p = config.random_bonus_probability;
        if p > 0.0 && rng.random_bool(p.min(1.0)) {
            reward.random_bonus = config.random_bonus;
        }

        if snapshot.terminal {
            reward.terminal = config.terminal_penalty;
            if snapshot.score >= ctx.high_score {
                reward.high_score = config.high_score_tie_bonus;
            }
            if snapshot.score > ctx.high_score {
                reward.high_score += config.new_high_score_bonus;
                reward.new_high_score = true;
            }
        }
        reward
    }

    fn action_cost(&self, action: Action) -> f32 {
        match action {
            Action::Jump { presses } if presses > 0 => self
                .config
                .jump_costs
                .get(usize::from(presses) - 1)
                .or(self.config.jump_costs.last())
                .copied()
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }
}
