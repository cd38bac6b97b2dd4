pub use glam::Vec2;

/// Axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(width, height))
    }

    pub fn min(&self) -> Vec2 {
        self.origin
    }

    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Half-open containment: the left and top edges are inside, the right
    /// and bottom edges are not.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let max = self.max();
        self.origin.x <= point.x && point.x < max.x && self.origin.y <= point.y && point.y < max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_half_open() {
        let rect = Rect::from_xywh(0.0, 0.0, 50.0, 50.0);

        assert!(rect.contains_point(Vec2::new(25.0, 25.0)));
        assert!(rect.contains_point(Vec2::new(0.0, 0.0)));
        assert!(!rect.contains_point(Vec2::new(50.0, 25.0)));
        assert!(!rect.contains_point(Vec2::new(25.0, 50.0)));
        assert!(!rect.contains_point(Vec2::new(-0.5, 10.0)));
        assert!(!rect.contains_point(Vec2::new(60.0, 60.0)));
    }

    #[test]
    fn test_zero_sized_rect_contains_nothing() {
        let rect = Rect::new(Vec2::new(10.0, 10.0), Vec2::ZERO);
        assert!(!rect.contains_point(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn test_vec2_from_pair() {
        let v: Vec2 = (3.0, 4.0).into();
        assert_eq!(v + Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0));
        assert_eq!(v * 2.0, Vec2::new(6.0, 8.0));
    }
}
