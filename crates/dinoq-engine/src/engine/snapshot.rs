use serde::{Deserialize, Serialize};

use crate::core::{ObstacleClass, Tick};

/// Observable state of one obstacle, relative to the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// `obstacle.x - agent.x`.
    pub distance_to_agent: f32,
    /// `agent.y - obstacle.y`.
    pub vertical_difference: f32,
    /// Where the obstacle will be after the runner's current airtime has elapsed
    /// again (at least one tick).
    pub predicted_future_x: f32,
    /// `true` for wall-sized obstacles.
    pub class_flag: bool,
    pub class: ObstacleClass,
}

/// Observable state of the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentView {
    pub x: f32,
    pub y: f32,
    pub vertical_speed: f32,
    pub gravity_constant: f32,
    pub is_grounded: bool,
    pub max_jump_height: f32,
    pub max_jump_distance: f32,
    pub ticks_since_jump: u64,
}

/// Typed state message passed from the environment to the controller.
///
/// Obstacles keep the environment's insertion order (oldest first), which is
/// not necessarily sorted by distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: Tick,
    pub score: u64,
    pub terminal: bool,
    pub obstacles: Vec<ObstacleView>,
    pub agent: AgentView,
}

impl Snapshot {
    /// The first obstacle in field order, if any.
    #[must_use]
    pub fn leading_obstacle(&self) -> Option<&ObstacleView> {
        self.obstacles.first()
    }
}
