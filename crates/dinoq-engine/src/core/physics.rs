use serde::{Deserialize, Serialize};

use super::collision::Rect;

/// Fixed horizontal position of the runner.
pub const AGENT_X: f32 = 50.0;
/// Side length of the runner's square hitbox.
pub const AGENT_SIZE: f32 = 20.0;
/// Height above the ground line at which a fresh runner spawns.
const SPAWN_ALTITUDE: f32 = 10.0;

/// Vertical kinematics parameters.
///
/// Screen coordinates grow downwards, so a jump impulse is negative and the
/// ground line is the largest `y` the runner may reach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Added to the vertical velocity every tick.
    pub gravity: f32,
    /// Vertical velocity set by a jump (overrides the current velocity).
    pub jump_strength: f32,
    /// Number of consecutive jumps allowed before touching the ground again.
    pub max_jumps: u8,
    /// `y` coordinate of the runner's top edge while standing on the ground.
    pub ground_y: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.075,
            jump_strength: -3.3,
            max_jumps: 3,
            ground_y: 250.0,
        }
    }
}

/// The runner controlled by the player or the AI.
///
/// The horizontal position never changes; only the vertical state evolves.
///
/// # Example
///
/// ```
/// use dinoq_engine::{Agent, PhysicsConfig};
///
/// let config = PhysicsConfig::default();
/// let mut agent = Agent::new(&config);
///
/// assert!(agent.jump(&config));
/// assert_eq!(agent.vy(), config.jump_strength);
///
/// agent.tick(&config);
/// assert!(!agent.is_grounded());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    vy: f32,
    jump_count: u8,
    grounded: bool,
    ticks_since_jump: u64,
}

impl Agent {
    /// Creates a runner slightly above the ground line, at rest.
    #[must_use]
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            x: AGENT_X,
            y: config.ground_y - SPAWN_ALTITUDE,
            width: AGENT_SIZE,
            height: AGENT_SIZE,
            vy: 0.0,
            jump_count: 0,
            grounded: true,
            ticks_since_jump: 0,
        }
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Vertical velocity (negative is upwards).
    #[must_use]
    pub fn vy(&self) -> f32 {
        self.vy
    }

    #[must_use]
    pub fn jump_count(&self) -> u8 {
        self.jump_count
    }

    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Ticks spent airborne since the runner last stood on the ground.
    #[must_use]
    pub fn ticks_since_jump(&self) -> u64 {
        self.ticks_since_jump
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Moves the runner to the given altitude with the given velocity.
    ///
    /// Intended for setting up scenarios; the ground clamp still applies on the
    /// next tick.
    pub fn set_vertical_state(&mut self, y: f32, vy: f32) {
        self.y = y;
        self.vy = vy;
        self.grounded = false;
    }

    /// Advances the vertical kinematics by one tick.
    ///
    /// Gravity is applied to the velocity before the velocity is applied to the
    /// position. Reaching the ground line clamps the runner to it and resets the
    /// velocity and the jump counter.
    pub fn tick(&mut self, config: &PhysicsConfig) {
        self.vy += config.gravity;
        self.y += self.vy;
        if self.y >= config.ground_y {
            self.y = config.ground_y;
            self.vy = 0.0;
            self.jump_count = 0;
            self.grounded = true;
            self.ticks_since_jump = 0;
        } else {
            self.grounded = false;
            self.ticks_since_jump += 1;
        }
    }

    /// Applies a jump impulse if the jump budget allows it.
    ///
    /// Returns `false` (leaving the state untouched) when `max_jumps` consecutive
    /// jumps have already been used.
    pub fn jump(&mut self, config: &PhysicsConfig) -> bool {
        if self.jump_count >= config.max_jumps {
            return false;
        }
        self.vy = config.jump_strength;
        self.jump_count += 1;
        self.grounded = false;
        true
    }
}
