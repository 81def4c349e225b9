//! Collision detection
//!
//! Circle tests compare squared distances; boxes are axis-aligned and
//! described by their center and half extents.

use glam::Vec2;

/// Collision bounds of an actor or entity, centered on its position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half: Vec2 },
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    /// Rectangle from full width/height
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Rect {
            half: Vec2::new(width, height) * 0.5,
        }
    }

    /// Does this shape at `pos` overlap `other` at `other_pos`?
    pub fn overlaps(&self, pos: Vec2, other: &Shape, other_pos: Vec2) -> bool {
        match (*self, *other) {
            (Shape::Circle { radius: a }, Shape::Circle { radius: b }) => {
                circles_overlap(pos, a, other_pos, b)
            }
            (Shape::Rect { half: a }, Shape::Rect { half: b }) => {
                Aabb::from_center(pos, a).overlaps(&Aabb::from_center(other_pos, b))
            }
            (Shape::Circle { radius }, Shape::Rect { half }) => {
                circle_rect_overlap(pos, radius, &Aabb::from_center(other_pos, half))
            }
            (Shape::Rect { half }, Shape::Circle { radius }) => {
                circle_rect_overlap(other_pos, radius, &Aabb::from_center(pos, half))
            }
        }
    }

    /// Does this shape at `pos` contain `point`?
    pub fn contains(&self, pos: Vec2, point: Vec2) -> bool {
        match *self {
            Shape::Circle { radius } => point_in_circle(point, pos, radius),
            Shape::Rect { half } => Aabb::from_center(pos, half).contains(point),
        }
    }

    /// Bounding radius (used for off-screen culling)
    pub fn extent(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Rect { half } => half.length(),
        }
    }
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box from top-left corner and size
    pub fn from_corner(corner: Vec2, size: Vec2) -> Self {
        Self::new(corner, corner + size)
    }

    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self::new(center - half, center + half)
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Strict overlap: boxes that only share an edge do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Circle-circle overlap without a square root
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

#[inline]
pub fn point_in_circle(p: Vec2, center: Vec2, radius: f32) -> bool {
    p.distance_squared(center) < radius * radius
}

/// Circle vs box using the closest point on the box
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Aabb) -> bool {
    let closest = center.clamp(rect.min, rect.max);
    center.distance_squared(closest) < radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_touching_do_not_overlap() {
        assert!(!circles_overlap(Vec2::ZERO, 2.0, Vec2::new(4.0, 0.0), 2.0));
        assert!(circles_overlap(Vec2::ZERO, 2.0, Vec2::new(3.9, 0.0), 2.0));
    }

    #[test]
    fn test_rect_overlap() {
        let a = Aabb::from_corner(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::from_corner(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0));
        let c = Aabb::from_corner(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_circle_rect() {
        let rect = Aabb::from_corner(Vec2::new(100.0, 0.0), Vec2::new(70.0, 300.0));
        // Just left of the pillar
        assert!(!circle_rect_overlap(Vec2::new(79.0, 150.0), 20.0, &rect));
        assert!(circle_rect_overlap(Vec2::new(81.0, 150.0), 20.0, &rect));
        // Near the corner, diagonal distance matters
        assert!(!circle_rect_overlap(Vec2::new(86.0, 314.0), 19.0, &rect));
    }

    #[test]
    fn test_shape_dispatch_is_symmetric() {
        let circle = Shape::circle(10.0);
        let rect = Shape::rect(20.0, 20.0);
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(15.0, 0.0);
        assert_eq!(circle.overlaps(a, &rect, b), rect.overlaps(b, &circle, a));
        assert!(circle.overlaps(a, &rect, b));
    }

    #[test]
    fn test_contains() {
        let rect = Shape::rect(45.0, 45.0);
        assert!(rect.contains(Vec2::new(100.0, 100.0), Vec2::new(120.0, 80.0)));
        assert!(!rect.contains(Vec2::new(100.0, 100.0), Vec2::new(130.0, 100.0)));
    }
}
