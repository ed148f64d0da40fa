//! Stochastic obstacle injection.
//!
//! A spawn cycle fires whenever more than `delay` ticks have elapsed since the
//! previous cycle. The delay is drawn once per [`Spawner`] from
//! [`SpawnerConfig::spawn_delay_ticks`] and kept for the rest of the run.
//!
//! Each cycle:
//!
//! 1. computes the difficulty tier `ceil(score / 1000)`,
//! 2. maybe emits a wall immediately (probability grows with the tier, and a
//!    cooldown blocks walls for a few cycles after one was emitted),
//! 3. schedules `U{0,1} + floor(score / 1000)` small obstacles, each after its own
//!    short delay, each either on the ground or elevated (elevation probability
//!    grows with the tier).

use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::{Obstacle, ObstacleClass, Rect, Tick};

use super::event_queue::{EventQueue, ScheduledEvent};

/// Score span covered by one difficulty tier.
pub const TIER_SCORE: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// When `false`, no obstacle is ever spawned.
    pub enabled: bool,
    /// Range the per-run spawn delay is drawn from.
    pub spawn_delay_ticks: Range<u64>,
    /// Horizontal distance every obstacle travels per tick.
    pub obstacle_speed: f32,
    pub obstacle_width: f32,
    pub wall_short_height: f32,
    pub wall_tall_height: f32,
    /// A wall is tall when a uniform digit `0..=9` exceeds this value.
    pub wall_tall_threshold: u32,
    /// How far walls reach below the ground line.
    pub wall_sink: f32,
    /// Number of spawn cycles after a wall during which no wall may spawn.
    pub wall_cooldown_cycles: u32,
    pub small_size: f32,
    /// Elevated obstacles float `U(0..max_elevation)` above the ground line.
    pub max_elevation: u32,
    pub small_insert_base_ticks: u64,
    pub small_insert_jitter_ticks: u64,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_delay_ticks: 30..60,
            obstacle_speed: 5.0,
            obstacle_width: 20.0,
            wall_short_height: 150.0,
            wall_tall_height: 200.0,
            wall_tall_threshold: 7,
            wall_sink: 50.0,
            wall_cooldown_cycles: 2,
            small_size: 20.0,
            max_elevation: 200,
            small_insert_base_ticks: 3,
            small_insert_jitter_ticks: 6,
        }
    }
}

/// Difficulty tier for the given score: `ceil(score / 1000)`.
#[must_use]
pub fn difficulty_tier(score: u64) -> u64 {
    score.div_ceil(TIER_SCORE)
}

/// Decides a wall (or an elevated small obstacle) from a uniform digit `0..=9`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn tier_roll(digit: u32, tier: u64) -> bool {
    f64::from(digit) > 10.0 - tier as f64 / 2.0
}

/// Probability that [`tier_roll`] succeeds at the given tier.
#[must_use]
pub fn tier_roll_probability(tier: u64) -> f64 {
    let hits = (0..10_u32).filter(|d| tier_roll(*d, tier)).fold(0_u32, |n, _| n + 1);
    f64::from(hits) / 10.0
}

/// What a single spawn cycle produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnCycle {
    /// Wall to insert immediately.
    pub wall: Option<Obstacle>,
    /// Number of small obstacles pushed to the event queue.
    pub scheduled_small: usize,
}

/// Field dimensions the spawner places obstacles in.
#[derive(Debug, Clone, Copy)]
pub struct SpawnArea {
    /// Obstacles enter at this `x`.
    pub entry_x: f32,
    pub ground_y: f32,
}

#[derive(Debug, Clone)]
pub struct Spawner {
    config: SpawnerConfig,
    delay: Tick,
    last_spawn: Tick,
    wall_cooldown: u32,
}

impl Spawner {
    /// Creates a spawner, drawing the per-run spawn delay from `rng`.
    pub fn new<R>(config: SpawnerConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let delay = if config.spawn_delay_ticks.is_empty() {
            config.spawn_delay_ticks.start
        } else {
            rng.random_range(config.spawn_delay_ticks.clone())
        };
        Self {
            config,
            delay,
            last_spawn: 0,
            wall_cooldown: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// Spawn delay drawn for this run.
    #[must_use]
    pub fn delay(&self) -> Tick {
        self.delay
    }

    /// Forgets the previous episode's timing. The drawn delay is kept.
    pub fn reset(&mut self) {
        self.last_spawn = 0;
        self.wall_cooldown = 0;
    }

    /// Runs a spawn cycle if the spawn delay has elapsed.
    pub fn on_tick<R>(
        &mut self,
        tick: Tick,
        score: u64,
        area: SpawnArea,
        queue: &mut EventQueue,
        rng: &mut R,
    ) -> Option<SpawnCycle>
    where
        R: Rng + ?Sized,
    {
        if !self.config.enabled || tick.saturating_sub(self.last_spawn) <= self.delay {
            return None;
        }
        self.last_spawn = tick;

        let tier = difficulty_tier(score);
        let mut cycle = SpawnCycle::default();

        if self.wall_cooldown > 0 {
            self.wall_cooldown -= 1;
        } else if tier_roll(rng.random_range(0..10), tier) {
            cycle.wall = Some(self.make_wall(tick, area, rng));
            self.wall_cooldown = self.config.wall_cooldown_cycles;
        }

        let count = rng.random_range(0..2) + score / TIER_SCORE;
        for i in 0..count {
            let elevated = tier_roll(rng.random_range(0..10), tier);
            let lift = if elevated && self.config.max_elevation > 0 {
                rng.random_range(0..self.config.max_elevation)
            } else {
                0
            };
            let jitter = if self.config.small_insert_jitter_ticks > 0 {
                rng.random_range(0..self.config.small_insert_jitter_ticks)
            } else {
                0
            };
            let at = tick + i * jitter + self.config.small_insert_base_ticks;
            let obstacle = self.make_small(at, area, lift);
            queue.schedule(at, ScheduledEvent::InsertObstacle(obstacle));
            cycle.scheduled_small += 1;
        }

        Some(cycle)
    }

    fn make_wall<R>(&self, tick: Tick, area: SpawnArea, rng: &mut R) -> Obstacle
    where
        R: Rng + ?Sized,
    {
        let tall = rng.random_range(0..10) > self.config.wall_tall_threshold;
        let height = if tall {
            self.config.wall_tall_height
        } else {
            self.config.wall_short_height
        };
        let y = area.ground_y + self.config.wall_sink - height;
        Obstacle::new(
            Rect::new(area.entry_x, y, self.config.obstacle_width, height),
            ObstacleClass::Wall,
            tick,
        )
    }

    #[expect(clippy::cast_precision_loss)]
    fn make_small(&self, tick: Tick, area: SpawnArea, lift: u32) -> Obstacle {
        let class = if lift > 0 {
            ObstacleClass::Aerial
        } else {
            ObstacleClass::Ground
        };
        Obstacle::new(
            Rect::new(
                area.entry_x,
                area.ground_y - lift as f32,
                self.config.small_size,
                self.config.small_size,
            ),
            class,
            tick,
        )
    }
}
