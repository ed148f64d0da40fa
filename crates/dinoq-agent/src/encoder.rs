//! State encoding: from a [`Snapshot`] to a fixed-length feature vector.
//!
//! The vector has `num_obstacles × OBSTACLE_FEATURES + AGENT_FEATURES` entries
//! regardless of how many obstacles are on the field.
//!
//! # Layout
//!
//! For each of the first `num_obstacles` obstacles, in snapshot order (not
//! sorted by distance):
//!
//! | # | Feature                       | Divisor        |
//! |---|-------------------------------|----------------|
//! | 0 | horizontal distance to runner | canvas width   |
//! | 1 | vertical difference           | canvas height  |
//! | 2 | wall flag (0 / 1)             | -              |
//! | 3 | width                         | canvas width   |
//! | 4 | height                        | canvas height  |
//! | 5 | absolute x                    | canvas width   |
//! | 6 | absolute y                    | canvas height  |
//!
//! Missing obstacles leave their slot all zeros. Then the runner:
//!
//! | # | Feature                  | Divisor           |
//! |---|--------------------------|-------------------|
//! | 0 | vertical velocity        | \|jump strength\| |
//! | 1 | gravity constant         | gravity scale     |
//! | 2 | grounded flag (0 / 1)    | -                 |
//! | 3 | maximum jump height      | canvas height     |
//! | 4 | ticks since last jump    | ticks scale       |
//!
//! All divisors come from [`EncoderConfig`], so one encoder definition serves
//! environments of any scale.

use dinoq_engine::{AgentView, EngineConfig, ObstacleView, Snapshot, WALL_HEIGHT_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Features emitted per obstacle slot.
pub const OBSTACLE_FEATURES: usize = 7;
/// Features emitted for the runner.
pub const AGENT_FEATURES: usize = 5;

/// Normalized numeric encoding of the observable world.
pub type StateVector = Vec<f32>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Number of obstacle slots in the vector.
    pub num_obstacles: usize,
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Magnitude of the jump impulse.
    pub jump_strength: f32,
    pub gravity_scale: f32,
    pub ticks_scale: f32,
    /// Obstacles taller than this are flagged as walls.
    pub wall_height_threshold: f32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::for_engine(&EngineConfig::default())
    }
}

impl EncoderConfig {
    /// Derives the normalization divisors from an engine configuration.
    #[must_use]
    pub fn for_engine(engine: &EngineConfig) -> Self {
        Self {
            num_obstacles: 10,
            canvas_width: engine.canvas_width,
            canvas_height: engine.canvas_height,
            jump_strength: engine.physics.jump_strength.abs(),
            gravity_scale: engine.physics.gravity,
            ticks_scale: 100.0,
            wall_height_threshold: WALL_HEIGHT_THRESHOLD,
        }
    }
}

/// Converts snapshots into [`StateVector`]s.
///
/// # Example
///
/// ```
/// use dinoq_agent::encoder::{EncoderConfig, StateEncoder};
/// use dinoq_engine::{EngineConfig, Environment};
///
/// let encoder = StateEncoder::new(EncoderConfig::default());
/// let env = Environment::new(EngineConfig::default());
///
/// let state = encoder.encode(&env.snapshot());
/// assert_eq!(state.len(), encoder.state_len());
/// assert_eq!(encoder.state_len(), 10 * 7 + 5);
/// ```
#[derive(Debug, Clone)]
pub struct StateEncoder {
    config: EncoderConfig,
}

impl StateEncoder {
    #[must_use]
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Length of every encoded vector.
    #[must_use]
    pub fn state_len(&self) -> usize {
        self.config.num_obstacles * OBSTACLE_FEATURES + AGENT_FEATURES
    }

    #[must_use]
    pub fn encode(&self, snapshot: &Snapshot) -> StateVector {
        let mut state = Vec::with_capacity(self.state_len());
        let mut obstacles = snapshot.obstacles.iter();
        for _ in 0..self.config.num_obstacles {
            match obstacles.next() {
                Some(obstacle) => state.extend(self.obstacle_features(obstacle)),
                None => state.extend([0.0; OBSTACLE_FEATURES]),
            }
        }
        state.extend(self.agent_features(&snapshot.agent));
        debug_assert_eq!(state.len(), self.state_len());
        state
    }

    fn obstacle_features(&self, obstacle: &ObstacleView) -> [f32; OBSTACLE_FEATURES] {
        let EncoderConfig {
            canvas_width: w,
            canvas_height: h,
            wall_height_threshold,
            ..
        } = self.config;
        [
            ratio(obstacle.distance_to_agent, w),
            ratio(obstacle.vertical_difference, h),
            flag(obstacle.height > wall_height_threshold),
            ratio(obstacle.width, w),
            ratio(obstacle.height, h),
            ratio(obstacle.x, w),
            ratio(obstacle.y, h),
        ]
    }

    #[expect(clippy::cast_precision_loss)]
    fn agent_features(&self, agent: &AgentView) -> [f32; AGENT_FEATURES] {
        [
            ratio(agent.vertical_speed, self.config.jump_strength),
            ratio(agent.gravity_constant, self.config.gravity_scale),
            flag(agent.is_grounded),
            ratio(agent.max_jump_height, self.config.canvas_height),
            ratio(agent.ticks_since_jump as f32, self.config.ticks_scale),
        ]
    }
}

fn ratio(value: f32, divisor: f32) -> f32 {
    if divisor == 0.0 { 0.0 } else { value / divisor }
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use dinoq_engine::{EnvSeed, Environment, ObstacleClass, Rect, SpawnerConfig};

    use super::*;

    fn quiet_env() -> Environment {
        let config = EngineConfig {
            spawner: SpawnerConfig {
                enabled: false,
                ..SpawnerConfig::default()
            },
            ..EngineConfig::default()
        };
        Environment::with_seed(config, EnvSeed::from(9))
    }

    #[test]
    fn test_length_is_fixed_regardless_of_obstacle_count() {
        let encoder = StateEncoder::new(EncoderConfig::default());
        let mut env = quiet_env();
        for i in 0..15 {
            let state = encoder.encode(&env.snapshot());
            assert_eq!(state.len(), encoder.state_len(), "{i} obstacles");
            #[expect(clippy::cast_precision_loss)]
            let x = 300.0 + 30.0 * i as f32;
            env.place_obstacle(Rect::new(x, 0.0, 20.0, 20.0), ObstacleClass::Aerial);
        }
    }

    #[test]
    fn test_absent_slots_are_zero() {
        let encoder = StateEncoder::new(EncoderConfig::default());
        let mut env = quiet_env();
        env.place_obstacle(Rect::new(400.0, 100.0, 20.0, 150.0), ObstacleClass::Wall);
        env.place_obstacle(Rect::new(500.0, 250.0, 20.0, 20.0), ObstacleClass::Ground);
        let state = encoder.encode(&env.snapshot());

        let slots = &state[..10 * OBSTACLE_FEATURES];
        assert!(slots[..2 * OBSTACLE_FEATURES].iter().any(|v| *v != 0.0));
        assert!(slots[2 * OBSTACLE_FEATURES..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_obstacle_features_keep_snapshot_order() {
        let encoder = StateEncoder::new(EncoderConfig::default());
        let mut env = quiet_env();
        env.place_obstacle(Rect::new(600.0, 100.0, 20.0, 150.0), ObstacleClass::Wall);
        env.place_obstacle(Rect::new(200.0, 250.0, 20.0, 20.0), ObstacleClass::Ground);
        let state = encoder.encode(&env.snapshot());
        let agent_y = env.agent().y();

        let first = &state[..OBSTACLE_FEATURES];
        assert_eq!(first[0], (600.0 - 50.0) / 800.0);
        assert_eq!(first[1], (agent_y - 100.0) / 400.0);
        assert_eq!(first[2], 1.0);
        assert_eq!(first[3], 20.0 / 800.0);
        assert_eq!(first[4], 150.0 / 400.0);
        assert_eq!(first[5], 600.0 / 800.0);
        assert_eq!(first[6], 100.0 / 400.0);

        let second = &state[OBSTACLE_FEATURES..2 * OBSTACLE_FEATURES];
        assert_eq!(second[0], (200.0 - 50.0) / 800.0);
        assert_eq!(second[2], 0.0);
    }

    #[test]
    fn test_agent_features() {
        let encoder = StateEncoder::new(EncoderConfig::default());
        let mut env = quiet_env();
        env.start();
        env.press_jump();
        env.step();
        env.step();
        let state = encoder.encode(&env.snapshot());
        let agent = &state[state.len() - AGENT_FEATURES..];
        let vy = env.agent().vy();
        assert!((agent[0] - vy / 3.3).abs() < 1e-6);
        assert!((agent[1] - 1.0).abs() < 1e-6);
        assert_eq!(agent[2], 0.0);
        assert_eq!(agent[3], 60.0 / 400.0);
        assert_eq!(agent[4], 2.0 / 100.0);
    }

    #[test]
    fn test_divisors_follow_configuration() {
        let config = EncoderConfig {
            num_obstacles: 2,
            canvas_width: 1600.0,
            ..EncoderConfig::default()
        };
        let encoder = StateEncoder::new(config);
        assert_eq!(encoder.state_len(), 2 * OBSTACLE_FEATURES + AGENT_FEATURES);

        let mut env = quiet_env();
        env.place_obstacle(Rect::new(850.0, 250.0, 20.0, 20.0), ObstacleClass::Ground);
        let state = encoder.encode(&env.snapshot());
        assert_eq!(state[0], 800.0 / 1600.0);
    }

    #[test]
    fn test_zero_divisor_yields_zero() {
        let config = EncoderConfig {
            ticks_scale: 0.0,
            ..EncoderConfig::default()
        };
        let encoder = StateEncoder::new(config);
        let state = encoder.encode(&quiet_env().snapshot());
        assert_eq!(*state.last().unwrap(), 0.0);
    }
}
