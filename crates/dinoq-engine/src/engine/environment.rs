use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::core::{Agent, Obstacle, ObstacleClass, PhysicsConfig, Rect, Tick, any_collision};

use super::{
    event_queue::{EventQueue, ScheduledEvent},
    seed::EnvSeed,
    snapshot::{AgentView, ObstacleView, Snapshot},
    spawner::{SpawnArea, SpawnCycle, Spawner, SpawnerConfig},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub physics: PhysicsConfig,
    pub spawner: SpawnerConfig,
    /// Fixed seed for reproducible runs; a random seed is drawn when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<EnvSeed>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 400.0,
            physics: PhysicsConfig::default(),
            spawner: SpawnerConfig::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EpisodeState {
    /// Waiting for the start signal.
    Ready,
    Running,
    /// The runner collided with an obstacle.
    Terminal,
}

/// Complete simulation state of the runner game.
///
/// Owns the runner, the live obstacles, the deferred event queue and the seeded
/// RNG; nothing is shared globally. [`Environment::step`] advances one tick
/// atomically:
///
/// 1. release events due at the new tick (obstacle inserts, follow-up jumps)
/// 2. runner physics
/// 3. spawn cycle
/// 4. obstacle motion
/// 5. collision test (sets the terminal state)
/// 6. removal of obstacles past the left boundary
/// 7. score increment
///
/// # Example
///
/// ```
/// use dinoq_engine::{EngineConfig, EnvSeed, Environment};
///
/// let mut env = Environment::with_seed(EngineConfig::default(), EnvSeed::from(42));
/// env.start();
/// while !env.is_terminal() && env.score() < 100 {
///     env.step();
/// }
/// assert!(env.score() <= 100);
/// ```
#[derive(Debug, Clone)]
pub struct Environment {
    config: EngineConfig,
    seed: EnvSeed,
    rng: Pcg32,
    agent: Agent,
    obstacles: Vec<Obstacle>,
    queue: EventQueue,
    spawner: Spawner,
    tick: Tick,
    score: u64,
    state: EpisodeState,
}

impl Environment {
    /// Creates an environment using the configured seed, or a random one.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        Self::with_seed(config, seed)
    }

    #[must_use]
    pub fn with_seed(config: EngineConfig, seed: EnvSeed) -> Self {
        let mut rng = Pcg32::from_seed(seed.to_bytes());
        let spawner = Spawner::new(config.spawner.clone(), &mut rng);
        let agent = Agent::new(&config.physics);
        Self {
            config,
            seed,
            rng,
            agent,
            obstacles: vec![],
            queue: EventQueue::new(),
            spawner,
            tick: 0,
            score: 0,
            state: EpisodeState::Ready,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn seed(&self) -> EnvSeed {
        self.seed
    }

    #[must_use]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Mutable access to the runner, for setting up scenarios.
    pub fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[must_use]
    pub fn pending_events(&self) -> &EventQueue {
        &self.queue
    }

    #[must_use]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Ticks survived in the current episode.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Discards the episode: fresh runner, no obstacles, no pending events.
    ///
    /// The spawn delay drawn at construction is kept.
    pub fn reset(&mut self) {
        self.agent = Agent::new(&self.config.physics);
        self.obstacles.clear();
        self.queue.clear();
        self.spawner.reset();
        self.tick = 0;
        self.score = 0;
        self.state = EpisodeState::Ready;
    }

    /// Start signal. An episode that is running or finished is discarded
    /// first, so every start begins from a fresh runner and an empty field.
    pub fn start(&mut self) {
        if !self.state.is_ready() {
            self.reset();
        }
        self.state = EpisodeState::Running;
    }

    /// Presses jump once. Returns whether the impulse was applied.
    pub fn press_jump(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.agent.jump(&self.config.physics)
    }

    /// Presses jump now and `count - 1` more times, `spacing` ticks apart.
    pub fn schedule_jumps(&mut self, count: u8, spacing: Tick) {
        if count == 0 {
            return;
        }
        self.press_jump();
        let spacing = spacing.max(1);
        for k in 1..u64::from(count) {
            self.queue
                .schedule(self.tick + k * spacing, ScheduledEvent::Jump);
        }
    }

    /// Inserts an obstacle immediately, for setting up scenarios.
    pub fn place_obstacle(&mut self, rect: Rect, class: ObstacleClass) {
        self.obstacles.push(Obstacle::new(rect, class, self.tick));
    }

    /// Advances the simulation by one tick. Does nothing unless running.
    pub fn step(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.tick += 1;

        for event in self.queue.drain_due(self.tick) {
            match event {
                ScheduledEvent::InsertObstacle(obstacle) => self.obstacles.push(obstacle),
                ScheduledEvent::Jump => {
                    self.agent.jump(&self.config.physics);
                }
            }
        }

        self.agent.tick(&self.config.physics);

        let area = SpawnArea {
            entry_x: self.config.canvas_width,
            ground_y: self.config.physics.ground_y,
        };
        if let Some(SpawnCycle {
            wall: Some(wall), ..
        }) = self
            .spawner
            .on_tick(self.tick, self.score, area, &mut self.queue, &mut self.rng)
        {
            self.obstacles.push(wall);
        }

        let speed = self.config.spawner.obstacle_speed;
        for obstacle in &mut self.obstacles {
            obstacle.advance(speed);
        }

        if any_collision(
            &self.agent.bounds(),
            self.obstacles.iter().map(Obstacle::bounds),
        ) {
            self.state = EpisodeState::Terminal;
        }

        self.obstacles.retain(|o| !o.is_off_screen());
        self.score += 1;
    }

    /// Reads the observable state as of the last completed tick.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let agent = &self.agent;
        let physics = &self.config.physics;
        let speed = self.config.spawner.obstacle_speed;
        let lookahead = agent.ticks_since_jump().max(1) as f32;
        let obstacles = self
            .obstacles
            .iter()
            .map(|o| ObstacleView {
                x: o.x(),
                y: o.y(),
                width: o.width(),
                height: o.height(),
                distance_to_agent: o.x() - agent.x(),
                vertical_difference: agent.y() - o.y(),
                predicted_future_x: o.x() - speed * lookahead,
                class_flag: o.is_wall_sized(),
                class: o.class(),
            })
            .collect();
        Snapshot {
            tick: self.tick,
            score: self.score,
            terminal: self.is_terminal(),
            obstacles,
            agent: AgentView {
                x: agent.x(),
                y: agent.y(),
                vertical_speed: agent.vy(),
                gravity_constant: physics.gravity,
                is_grounded: agent.is_grounded(),
                max_jump_height: agent.height() * f32::from(physics.max_jumps),
                max_jump_distance: agent.width() * f32::from(physics.max_jumps),
                ticks_since_jump: agent.ticks_since_jump(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> EngineConfig {
        EngineConfig {
            spawner: SpawnerConfig {
                enabled: false,
                ..SpawnerConfig::default()
            },
            ..EngineConfig::default()
        }
    }

    fn ground_obstacle_ahead(env: &Environment, gap: f32) -> Rect {
        let agent = env.agent().bounds();
        Rect::new(
            agent.right() + gap,
            env.config().physics.ground_y,
            20.0,
            20.0,
        )
    }

    #[test]
    fn test_survives_without_obstacles() {
        let mut env = Environment::with_seed(quiet_config(), EnvSeed::from(1));
        env.start();
        for _ in 0..1000 {
            env.step();
        }
        assert_eq!(env.score(), 1000);
        assert!(!env.is_terminal());
        assert_eq!(env.agent().y(), env.config().physics.ground_y);
    }

    #[test]
    fn test_step_does_nothing_before_start() {
        let mut env = Environment::with_seed(quiet_config(), EnvSeed::from(1));
        env.step();
        assert_eq!(env.score(), 0);
        assert_eq!(env.tick(), 0);
        assert!(env.state().is_ready());
    }

    #[test]
    fn test_ground_obstacle_ahead_ends_episode() {
        let mut env = Environment::with_seed(quiet_config(), EnvSeed::from(1));
        let rect = ground_obstacle_ahead(&env, 5.0);
        env.place_obstacle(rect, ObstacleClass::Ground);
        env.start();
        env.step();
        assert!(env.is_terminal());
        assert_eq!(env.score(), 1);

        // ticks after the collision are ignored
        env.step();
        assert_eq!(env.score(), 1);
    }

    #[test]
    fn test_runner_above_obstacle_survives() {
        let mut env = Environment::with_seed(quiet_config(), EnvSeed::from(1));
        env.start();
        // a single impulse rises about 3 units per tick, so the runner needs a
        // few airborne ticks before its feet clear a ground obstacle
        assert!(env.press_jump());
        for _ in 0..4 {
            env.step();
        }
        let rect = ground_obstacle_ahead(&env, 5.0);
        env.place_obstacle(rect, ObstacleClass::Ground);
        assert!(env.press_jump());
        env.step();
        assert!(env.obstacles()[0].x() <= env.agent().bounds().right());
        assert!(env.agent().bounds().bottom() < rect.y);
        assert!(!env.is_terminal());
    }

    #[test]
    fn test_jump_on_the_spot_does_not_clear_adjacent_obstacle() {
        let mut env = Environment::with_seed(quiet_config(), EnvSeed::from(1));
        let rect = ground_obstacle_ahead(&env, 5.0);
        env.place_obstacle(rect, ObstacleClass::Ground);
        env.start();
        assert!(env.press_jump());
        env.step();
        assert!(env.is_terminal());
    }

    #[test]
    fn test_obstacles_scroll_and_leave() {
        let mut env = Environment::with_seed(quiet_config(), EnvSeed::from(1));
        env.place_obstacle(Rect::new(200.0, 0.0, 20.0, 20.0), ObstacleClass::Aerial);
        env.start();
        let mut prev_x = env.obstacles()[0].x();
        while let Some(obstacle) = env.obstacles().first() {
            if obstacle.x() != prev_x {
                assert!(obstacle.x() < prev_x);
            }
            prev_x = obstacle.x();
            env.step();
            assert!(!env.is_terminal());
        }
        assert!(env.obstacles().is_empty());
        assert_eq!(env.score(), 44);
    }

    #[test]
    fn test_scheduled_jumps_fire_on_later_ticks() {
        let mut env = Environment::with_seed(quiet_config(), EnvSeed::from(1));
        env.start();
        env.schedule_jumps(3, 12);
        assert_eq!(env.agent().jump_count(), 1);
        for _ in 0..12 {
            env.step();
        }
        assert_eq!(env.agent().jump_count(), 2);
        assert_eq!(env.agent().vy(), env.config().physics.jump_strength + 0.075);
        for _ in 0..12 {
            env.step();
        }
        assert_eq!(env.agent().jump_count(), 3);
        assert!(env.pending_events().is_empty());
    }

    #[test]
    fn test_same_seed_same_episode() {
        let config = EngineConfig {
            spawner: SpawnerConfig {
                spawn_delay_ticks: 2..4,
                ..SpawnerConfig::default()
            },
            ..EngineConfig::default()
        };
        let mut a = Environment::with_seed(config.clone(), EnvSeed::from(7));
        let mut b = Environment::with_seed(config, EnvSeed::from(7));
        a.start();
        b.start();
        for tick in 0..3000 {
            if tick % 50 == 0 {
                a.press_jump();
                b.press_jump();
            }
            a.step();
            b.step();
            assert_eq!(a.snapshot(), b.snapshot());
        }
    }

    #[test]
    fn test_reset_clears_episode_and_keeps_delay() {
        let mut env = Environment::with_seed(EngineConfig::default(), EnvSeed::from(3));
        let delay = env.spawner.delay();
        env.start();
        for _ in 0..500 {
            env.step();
        }
        env.reset();
        assert_eq!(env.score(), 0);
        assert_eq!(env.tick(), 0);
        assert!(env.obstacles().is_empty());
        assert!(env.pending_events().is_empty());
        assert_eq!(env.spawner.delay(), delay);
        assert!(env.state().is_ready());
    }

    #[test]
    fn test_start_after_terminal_resets() {
        let mut env = Environment::with_seed(quiet_config(), EnvSeed::from(1));
        let rect = ground_obstacle_ahead(&env, 0.0);
        env.place_obstacle(rect, ObstacleClass::Ground);
        env.start();
        env.step();
        assert!(env.is_terminal());
        env.start();
        assert!(env.state().is_running());
        assert_eq!(env.score(), 0);
        assert!(env.obstacles().is_empty());
    }

    #[test]
    fn test_start_while_running_discards_the_episode() {
        let mut env = Environment::with_seed(quiet_config(), EnvSeed::from(1));
        env.place_obstacle(Rect::new(600.0, 0.0, 20.0, 20.0), ObstacleClass::Aerial);
        env.start();
        env.schedule_jumps(3, 12);
        for _ in 0..5 {
            env.step();
        }
        assert!(env.state().is_running());

        env.start();
        assert!(env.state().is_running());
        assert_eq!(env.score(), 0);
        assert_eq!(env.tick(), 0);
        assert!(env.obstacles().is_empty());
        assert!(env.pending_events().is_empty());
        assert!(env.agent().is_grounded());
    }

    #[test]
    fn test_snapshot_fields() {
        let mut env = Environment::with_seed(quiet_config(), EnvSeed::from(1));
        env.place_obstacle(Rect::new(300.0, 100.0, 20.0, 150.0), ObstacleClass::Wall);
        env.start();
        env.step();
        let snapshot = env.snapshot();
        let agent = &snapshot.agent;
        assert_eq!(snapshot.score, 1);
        assert!(!snapshot.terminal);
        assert_eq!(agent.gravity_constant, 0.075);
        assert_eq!(agent.max_jump_height, 60.0);
        assert_eq!(agent.max_jump_distance, 60.0);

        let wall = snapshot.leading_obstacle().unwrap();
        assert_eq!(wall.x, 295.0);
        assert_eq!(wall.distance_to_agent, 245.0);
        assert_eq!(wall.vertical_difference, agent.y - 100.0);
        assert!(wall.class_flag);
        // one airborne tick so far
        assert_eq!(agent.ticks_since_jump, 1);
        assert_eq!(wall.predicted_future_x, 290.0);
    }

    #[test]
    fn test_config_serialization_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"canvas_width": 1024.0}"#).unwrap();
        assert_eq!(config.canvas_width, 1024.0);
        assert_eq!(config.physics, PhysicsConfig::default());
        assert!(config.seed.is_none());
    }
}
