//! ε-greedy Q-learning over an [`Approximator`].

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    action::{Action, ActionSet},
    approximator::Approximator,
    encoder::StateVector,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Exploration probability.
    pub epsilon: f64,
    /// Discount factor.
    pub gamma: f32,
    pub action_set: ActionSet,
    /// Ticks between the presses of a multi-jump action.
    pub jump_spacing_ticks: u64,
    /// Fit the bare reward on the transition that ends an episode instead of
    /// bootstrapping from the next state.
    pub terminal_cutoff: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            gamma: 0.95,
            action_set: ActionSet::Binary,
            jump_spacing_ticks: 12,
            terminal_cutoff: false,
        }
    }
}

/// Outcome of one action selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Index of the action actually taken.
    pub index: usize,
    pub action: Action,
    /// Estimates for the observed state.
    pub q_values: Vec<f32>,
    /// Whether the index was drawn at random.
    pub explored: bool,
}

/// One step of experience, consumed by [`QController::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: StateVector,
    pub action: usize,
    pub reward: f32,
    pub next_state: StateVector,
    pub done: bool,
}

/// Index of the largest value; ties go to the lowest index.
///
/// ```
/// use dinoq_agent::controller::argmax;
///
/// assert_eq!(argmax(&[0.5, 2.0, 2.0, -1.0]), 1);
/// assert_eq!(argmax(&[]), 0);
/// ```
#[must_use]
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = index;
        }
    }
    best
}

/// Online Q-learning controller.
///
/// Each transition produces exactly one `fit` call on the approximator; there is
/// no replay buffer and no target network.
#[derive(Debug, Clone)]
pub struct QController<A, R = Pcg32> {
    config: ControllerConfig,
    approximator: A,
    rng: R,
}

impl<A, R> QController<A, R>
where
    A: Approximator,
    R: Rng,
{
    /// # Panics
    ///
    /// Panics if the approximator output length differs from the action set arity.
    pub fn new(config: ControllerConfig, approximator: A, rng: R) -> Self {
        assert_eq!(
            approximator.output_len(),
            config.action_set.arity(),
            "approximator outputs must match the action set"
        );
        Self {
            config,
            approximator,
            rng,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub fn approximator(&self) -> &A {
        &self.approximator
    }

    pub fn approximator_mut(&mut self) -> &mut A {
        &mut self.approximator
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.config.epsilon = epsilon;
    }

    /// Chooses an action for `state`.
    ///
    /// With probability ε the index is uniform random, otherwise it is the
    /// greedy index. In the binary set a jump while airborne becomes `NoOp`.
    pub fn select_action(&mut self, state: &[f32], grounded: bool) -> Decision {
        let set = self.config.action_set;
        let q_values = self.approximator.predict(state);
        let explore = self.rng.random_bool(self.config.epsilon.clamp(0.0, 1.0));
        let mut index = if explore {
            self.rng.random_range(0..set.arity())
        } else {
            argmax(&q_values)
        };
        let mut action = set.action(index).unwrap_or(Action::NoOp);
        if set.is_binary() && action.is_jump() && !grounded {
            index = set.noop_index();
            action = Action::NoOp;
        }
        Decision {
            index,
            action,
            q_values,
            explored: explore,
        }
    }

    /// Learns from one transition and returns the fitted target value.
    ///
    /// The target is `reward + γ · max Q(next_state)`, including on the
    /// transition that ended the episode unless `terminal_cutoff` is set. Only
    /// the taken action's entry of the current estimate is replaced before
    /// fitting.
    pub fn update(&mut self, transition: Transition) -> f32 {
        let Transition {
            state,
            action,
            reward,
            next_state,
            done,
        } = transition;
        let target = if done && self.config.terminal_cutoff {
            reward
        } else {
            let next = self.approximator.predict(&next_state);
            let best = next.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            reward + self.config.gamma * best
        };
        let mut targets = self.approximator.predict(&state);
        if let Some(slot) = targets.get_mut(action) {
            *slot = target;
        }
        self.approximator.fit(&state, &targets);
        target
    }
}
