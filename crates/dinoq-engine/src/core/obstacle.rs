use serde::{Deserialize, Serialize};

use super::collision::Rect;

/// Simulation tick index within an episode.
pub type Tick = u64;

/// Obstacles taller than this are reported as walls.
pub const WALL_HEIGHT_THRESHOLD: f32 = 100.0;

/// Kind of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleClass {
    /// Small obstacle resting on the ground line.
    Ground,
    /// Tall obstacle blocking the ground level.
    Wall,
    /// Small obstacle floating above the ground line.
    Aerial,
}

/// An obstacle scrolling from right to left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    class: ObstacleClass,
    created_at: Tick,
}

impl Obstacle {
    #[must_use]
    pub fn new(rect: Rect, class: ObstacleClass, created_at: Tick) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            class,
            created_at,
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

    #[must_use]
    pub fn class(&self) -> ObstacleClass {
        self.class
    }

    /// Tick at which the obstacle entered the field.
    #[must_use]
    pub fn created_at(&self) -> Tick {
        self.created_at
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Whether the obstacle counts as a wall by its height alone.
    #[must_use]
    pub fn is_wall_sized(&self) -> bool {
        self.height > WALL_HEIGHT_THRESHOLD
    }

    /// Whether the obstacle has fully left the field past the left boundary.
    #[must_use]
    pub fn is_off_screen(&self) -> bool {
        self.x + self.width <= 0.0
    }

    pub(crate) fn advance(&mut self, speed: f32) {
        self.x -= speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_and_off_screen() {
        let mut obstacle = Obstacle::new(Rect::new(10.0, 0.0, 20.0, 20.0), ObstacleClass::Ground, 0);
        obstacle.advance(5.0);
        assert_eq!(obstacle.x(), 5.0);
        assert!(!obstacle.is_off_screen());
        for _ in 0..4 {
            obstacle.advance(5.0);
        }
        assert_eq!(obstacle.x(), -15.0);
        assert!(!obstacle.is_off_screen());
        obstacle.advance(5.0);
        assert!(obstacle.is_off_screen());
    }

    #[test]
    fn test_wall_sized() {
        let small = Obstacle::new(Rect::new(0.0, 0.0, 20.0, 20.0), ObstacleClass::Aerial, 3);
        let wall = Obstacle::new(Rect::new(0.0, 0.0, 20.0, 150.0), ObstacleClass::Wall, 3);
        assert!(!small.is_wall_sized());
        assert!(wall.is_wall_sized());
        assert_eq!(wall.created_at(), 3);
    }

    #[test]
    fn test_class_serialization() {
        let serialized = serde_json::to_string(&ObstacleClass::Aerial).unwrap();
        assert_eq!(serialized, "\"aerial\"");
    }
}
