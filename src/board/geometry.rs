//! Planar geometry helpers used by map generation.
//!
//! Points are only consulted while the graph is being grown; after that the
//! simulation works purely on node ids and rounded edge lengths.

use serde::{Deserialize, Serialize};

/// A position on the map plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Returns the point `distance` units away from `self` at `angle` radians.
    pub fn offset(self, angle: f64, distance: f64) -> Point {
        Point {
            x: self.x + distance * angle.cos(),
            y: self.y + distance * angle.sin(),
        }
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Distance from `self` to the closest point of segment `ab`.
    pub fn distance_to_segment(self, a: Point, b: Point) -> f64 {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 {
            return self.distance(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len2).clamp(0.0, 1.0);
        self.distance(Point::new(a.x + t * dx, a.y + t * dy))
    }
}

/// Turn direction of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Classifies the turn `p -> q -> r`.
pub fn orientation(p: Point, q: Point, r: Point) -> Orientation {
    let cross = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if cross == 0.0 {
        Orientation::Collinear
    } else if cross > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Given collinear `p`, `q`, `r`, checks whether `q` lies on segment `pr`.
pub fn on_segment(p: Point, q: Point, r: Point) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Returns true if segment `p1q1` intersects segment `p2q2`, touching
/// endpoints and collinear overlaps included.
pub fn segments_intersect(p1: Point, q1: Point, p2: Point, q2: Point) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(p1, p2, q1))
        || (o2 == Orientation::Collinear && on_segment(p1, q2, q1))
        || (o3 == Orientation::Collinear && on_segment(p2, p1, q2))
        || (o4 == Orientation::Collinear && on_segment(p2, q1, q2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-9);
        assert!((b.distance(a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn distance_to_segment_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((Point::new(5.0, 3.0).distance_to_segment(a, b) - 3.0).abs() < 1e-12);
        assert!((Point::new(13.0, 4.0).distance_to_segment(a, b) - 5.0).abs() < 1e-12);
        assert_eq!(Point::new(4.0, 0.0).distance_to_segment(a, b), 0.0);
        assert_eq!(Point::new(1.0, 1.0).distance_to_segment(a, a), 2f64.sqrt());
    }

    #[test]
    fn offset_moves_along_angle() {
        let p = Point::new(1.0, 1.0).offset(std::f64::consts::FRAC_PI_2, 2.0);
        assert!((p.x - 1.0).abs() < 1e-9);
        assert!((p.y - 3.0).abs() < 1e-9);
    }

    #[test]
    fn orientation_detects_turns() {
        let p = Point::new(0.0, 0.0);
        let q = Point::new(1.0, 0.0);
        assert_eq!(orientation(p, q, Point::new(2.0, 0.0)), Orientation::Collinear);
        assert_eq!(orientation(p, q, Point::new(1.0, 1.0)), Orientation::CounterClockwise);
        assert_eq!(orientation(p, q, Point::new(1.0, -1.0)), Orientation::Clockwise);
    }

    #[test]
    fn crossing_segments_intersect() {
        let hit = segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(4.0, 0.0),
        );
        assert!(hit);
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let hit = segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(4.0, 1.0),
        );
        assert!(!hit);
    }

    #[test]
    fn collinear_overlap_intersects() {
        let hit = segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(6.0, 0.0),
        );
        assert!(hit);
    }

    #[test]
    fn collinear_disjoint_does_not_intersect() {
        let hit = segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.0),
        );
        assert!(!hit);
    }
}
