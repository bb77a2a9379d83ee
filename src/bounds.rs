use macroquad::prelude::*;

/// Canvas extent in world units. Origin is bottom-left, y grows upward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }

    /// True once `pos` has left the canvas sideways by more than `margin`.
    pub fn is_past_side(&self, pos: Vec2, margin: f32) -> bool {
        pos.x < -margin || pos.x > self.width + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_exit_respects_margin() {
        let bounds = Bounds::new(800.0, 600.0);
        assert!(!bounds.is_past_side(vec2(-59.0, 10.0), 60.0));
        assert!(bounds.is_past_side(vec2(-61.0, 10.0), 60.0));
        assert!(bounds.is_past_side(vec2(861.0, 10.0), 60.0));
        assert!(!bounds.is_past_side(vec2(400.0, -500.0), 60.0));
    }

    #[test]
    fn center_and_containment() {
        let bounds = Bounds::new(100.0, 50.0);
        assert_eq!(bounds.center(), vec2(50.0, 25.0));
        assert!(bounds.contains(vec2(0.0, 50.0)));
        assert!(!bounds.contains(vec2(-5.0, 20.0)));
    }
}
