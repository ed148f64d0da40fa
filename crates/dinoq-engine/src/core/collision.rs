use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen coordinates (`y` grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns `true` if the rectangles overlap.
    ///
    /// Edges are inclusive on all four comparisons: rectangles that merely touch
    /// are considered overlapping.
    ///
    /// ```
    /// use dinoq_engine::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// assert!(a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    /// assert!(!a.overlaps(&Rect::new(10.5, 0.0, 10.0, 10.0)));
    /// ```
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }
}

/// Returns `true` if `subject` overlaps any of `others`.
///
/// Order is irrelevant; the first hit short-circuits.
pub fn any_collision<I>(subject: &Rect, others: I) -> bool
where
    I: IntoIterator<Item = Rect>,
{
    others.into_iter().any(|other| subject.overlaps(&other))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: Rect = Rect::new(0.0, 0.0, 10.0, 10.0);

    #[test]
    fn test_edge_contact_is_inclusive_on_every_side() {
        // left, right, top, bottom
        for other in [
            Rect::new(-10.0, 0.0, 10.0, 10.0),
            Rect::new(10.0, 0.0, 10.0, 10.0),
            Rect::new(0.0, -10.0, 10.0, 10.0),
            Rect::new(0.0, 10.0, 10.0, 10.0),
        ] {
            assert!(UNIT.overlaps(&other), "{other:?}");
            assert!(other.overlaps(&UNIT), "{other:?}");
        }
    }

    #[test]
    fn test_separated_rects_do_not_overlap() {
        for other in [
            Rect::new(-10.1, 0.0, 10.0, 10.0),
            Rect::new(10.1, 0.0, 10.0, 10.0),
            Rect::new(0.0, -10.1, 10.0, 10.0),
            Rect::new(0.0, 10.1, 10.0, 10.0),
            Rect::new(20.0, 20.0, 5.0, 5.0),
        ] {
            assert!(!UNIT.overlaps(&other), "{other:?}");
        }
    }

    #[test]
    fn test_containment_overlaps() {
        assert!(UNIT.overlaps(&Rect::new(2.0, 2.0, 1.0, 1.0)));
        assert!(Rect::new(2.0, 2.0, 1.0, 1.0).overlaps(&UNIT));
    }

    #[test]
    fn test_any_collision() {
        let far = Rect::new(100.0, 100.0, 1.0, 1.0);
        let near = Rect::new(5.0, 5.0, 1.0, 1.0);
        assert!(!any_collision(&UNIT, []));
        assert!(!any_collision(&UNIT, [far]));
        assert!(any_collision(&UNIT, [far, near]));
        assert!(any_collision(&UNIT, [near, far]));
    }
}
