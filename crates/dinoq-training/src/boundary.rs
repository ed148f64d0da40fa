//! The controller-side view of an environment.
//!
//! The trainer talks to the game only through these traits, one request at a
//! time: apply an action, advance, observe. [`LocalEnvironment`] satisfies them
//! with direct calls into an in-process [`Environment`]; a transport to an
//! out-of-process game would implement the same traits.

use dinoq_agent::action::Action;
use dinoq_engine::{Environment, Snapshot, Tick};

/// Failure to read the environment state. Fatal for the current episode.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ObservationError {
    #[display("environment is unavailable")]
    Unavailable,
    #[display("malformed observation: {reason}")]
    Malformed { reason: String },
}

/// Delivers a discrete action to the environment.
pub trait Actuator {
    fn apply(&mut self, action: Action);
}

/// Reads the state as of the last completed tick.
pub trait Observer {
    fn observe(&mut self) -> Result<Snapshot, ObservationError>;
}

/// An environment that can be driven episode by episode.
pub trait EpisodeEnvironment: Actuator + Observer {
    /// Start signal. Always begins a fresh episode.
    fn start(&mut self);

    /// Advances the simulation by one tick.
    fn advance(&mut self);
}

/// In-process environment driven by direct calls.
#[derive(Debug, Clone)]
pub struct LocalEnvironment {
    env: Environment,
    jump_spacing: Tick,
}

impl LocalEnvironment {
    /// `jump_spacing` is the number of ticks between the presses of a
    /// multi-jump action.
    #[must_use]
    pub fn new(env: Environment, jump_spacing: Tick) -> Self {
        Self { env, jump_spacing }
    }

    #[must_use]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }
}

impl Actuator for LocalEnvironment {
    fn apply(&mut self, action: Action) {
        match action {
            Action::Jump { presses } => self.env.schedule_jumps(presses, self.jump_spacing),
            Action::NoOp => {}
        }
    }
}

impl Observer for LocalEnvironment {
    fn observe(&mut self) -> Result<Snapshot, ObservationError> {
        Ok(self.env.snapshot())
    }
}

impl EpisodeEnvironment for LocalEnvironment {
    fn start(&mut self) {
        self.env.start();
    }

    fn advance(&mut self) {
        self.env.step();
    }
}
