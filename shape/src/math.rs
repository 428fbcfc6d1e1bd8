//! Geometric types shared by the whole crate, and the handful of scalar
//! helpers the kernel does not provide.
//!
//! The kernel types come from `euclid` and `lyon_geom`, instantiated at
//! `f64`: document coordinates round-trip through a decimal text encoding
//! and single precision would drift.

use std::f64::consts::TAU;

pub use lyon_geom::{CubicBezierSegment, Line as GenericLine, LineSegment};

pub type Point = euclid::default::Point2D<f64>;
pub type Vector = euclid::default::Vector2D<f64>;
pub type Transform = euclid::default::Transform2D<f64>;
pub type Rect = euclid::default::Rect<f64>;

/// A cubic Bezier curve in document coordinates.
pub type Bezier = CubicBezierSegment<f64>;
/// A straight, directed line segment.
pub type Segment = LineSegment<f64>;
/// An infinite directed line.
pub type Line = GenericLine<f64>;

#[inline]
pub fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

#[inline]
pub fn vector(x: f64, y: f64) -> Vector {
    Vector::new(x, y)
}

/// Unit vector with direction `alpha` (radians).
#[inline]
pub fn unit(alpha: f64) -> Vector {
    vector(alpha.cos(), alpha.sin())
}

/// Angle of `v` against the positive x-axis, in `(-pi, pi]`.
///
/// Returns zero for the zero vector.
#[inline]
pub fn angle_of(v: Vector) -> f64 {
    if v.x == 0.0 && v.y == 0.0 {
        0.0
    } else {
        v.y.atan2(v.x)
    }
}

/// `v` scaled to unit length; the zero vector normalizes to `(1, 0)`.
pub fn normalized(v: Vector) -> Vector {
    let len = v.length();
    if len == 0.0 {
        vector(1.0, 0.0)
    } else {
        v / len
    }
}

/// Normalize `alpha` into the range `[lowlimit, lowlimit + 2pi)`.
pub fn normalize_angle(mut alpha: f64, lowlimit: f64) -> f64 {
    while alpha >= lowlimit + TAU {
        alpha -= TAU;
    }
    while alpha < lowlimit {
        alpha += TAU;
    }
    alpha
}

/// Does the positively oriented circular arc from `small` to `large` cover
/// `theta`?
pub fn angle_lies_between(theta: f64, small: f64, large: f64) -> bool {
    let large = normalize_angle(large, theta);
    let small = normalize_angle(small, large - TAU);
    theta >= small
}

/// Apply `m` to every control point of `b`.
#[inline]
pub fn transform_bezier(m: &Transform, b: &Bezier) -> Bezier {
    Bezier {
        from: m.transform_point(b.from),
        ctrl1: m.transform_point(b.ctrl1),
        ctrl2: m.transform_point(b.ctrl2),
        to: m.transform_point(b.to),
    }
}

/// Apply `m` to both endpoints of `s`.
#[inline]
pub fn transform_segment(m: &Transform, s: &Segment) -> Segment {
    Segment {
        from: m.transform_point(s.from),
        to: m.transform_point(s.to),
    }
}

/// Signed side of `p` relative to `l`: positive left, negative right.
#[inline]
pub fn line_side(l: &Line, p: Point) -> f64 {
    l.vector.cross(p - l.point)
}

/// Distance from `p` to the infinite line `l`.
pub fn line_distance(l: &Line, p: Point) -> f64 {
    let dir = normalized(l.vector);
    let diff = p - l.point;
    (diff - dir * diff.dot(dir)).length()
}

/// Orthogonal projection of `p` onto `l`.
pub fn line_project(l: &Line, p: Point) -> Point {
    let dir = normalized(l.vector);
    l.point + dir * dir.dot(p - l.point)
}

/// Intersection point of two lines, if they are not parallel.
pub fn line_intersect(l: &Line, m: &Line) -> Option<Point> {
    let denom = m.vector.cross(l.vector);
    if denom == 0.0 {
        return None;
    }
    let lambda = (l.point - m.point).cross(m.vector) / denom;
    Some(l.point + l.vector * lambda)
}

/// Distance between `s` and `v`, pruned by `bound`.
///
/// May return `bound` when the true distance is larger.
pub fn segment_distance(s: &Segment, v: Point, bound: f64) -> f64 {
    if crate::bounds::Bounds::of(s.from, s.to).certain_clearance(v, bound) {
        return bound;
    }
    let dir = s.to - s.from;
    let len = dir.length();
    if len == 0.0 {
        return (v - s.from).length();
    }
    let udir = dir / len;
    let dx = udir.dot(v - s.from);
    if dx <= 0.0 {
        (v - s.from).length()
    } else if dx >= len {
        (v - s.to).length()
    } else {
        (v - (s.from + udir * dx)).length()
    }
}

/// Orthogonal projection of `v` onto `s`, or `None` if the foot falls
/// outside the segment.
pub fn segment_project(s: &Segment, v: Point) -> Option<Point> {
    let dir = s.to - s.from;
    let len = dir.length();
    if len == 0.0 {
        return None;
    }
    let udir = dir / len;
    let dx = udir.dot(v - s.from);
    if dx <= 0.0 || dx >= len {
        None
    } else {
        Some(s.from + udir * dx)
    }
}

/// Intersection point of two segments, or `None` if they do not cross.
pub fn segment_intersect(s: &Segment, t: &Segment) -> Option<Point> {
    if s.from == s.to || t.from == t.to {
        return None;
    }
    if !crate::bounds::Bounds::of(s.from, s.to).intersects(&crate::bounds::Bounds::of(t.from, t.to)) {
        return None;
    }
    let pt = line_intersect(&s.to_line(), &t.to_line())?;
    let dir = s.to - s.from;
    let dir1 = t.to - t.from;
    let on_both = (pt - s.from).dot(dir) >= 0.0
        && (pt - s.to).dot(dir) <= 0.0
        && (pt - t.from).dot(dir1) >= 0.0
        && (pt - t.to).dot(dir1) <= 0.0;
    if on_both {
        Some(pt)
    } else {
        None
    }
}

/// Intersection point of `s` with the infinite line `l`.
pub fn segment_line_intersect(s: &Segment, l: &Line) -> Option<Point> {
    let pt = line_intersect(&s.to_line(), l)?;
    let dir = s.to - s.from;
    if (pt - s.from).dot(dir) >= 0.0 && (pt - s.to).dot(dir) <= 0.0 {
        Some(pt)
    } else {
        None
    }
}

/// Snap `mouse` to a candidate point.
///
/// If `v` is closer to `mouse` than `bound`, store it in `pos`, shrink
/// `bound` to the distance and return `true`.
pub fn snap_to_point(mouse: Point, v: Point, pos: &mut Point, bound: &mut f64) -> bool {
    let d = (mouse - v).length();
    if d < *bound {
        *pos = v;
        *bound = d;
        true
    } else {
        false
    }
}

/// Snap `mouse` to the closest point of `s`.
pub fn snap_to_segment(s: &Segment, mouse: Point, pos: &mut Point, bound: &mut f64) -> bool {
    if crate::bounds::Bounds::of(s.from, s.to).certain_clearance(mouse, *bound) {
        return false;
    }
    match segment_project(s, mouse) {
        Some(v) => {
            let d = (mouse - v).length();
            if d < *bound {
                *pos = v;
                *bound = d;
                true
            } else {
                false
            }
        }
        None => snap_to_point(mouse, s.to, pos, bound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles() {
        assert_eq!(angle_of(vector(0.0, 0.0)), 0.0);
        assert!((angle_of(vector(0.0, 2.0)) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((normalize_angle(-0.5, 0.0) - (TAU - 0.5)).abs() < 1e-12);
        assert!(angle_lies_between(0.1, 0.0, 1.0));
        assert!(angle_lies_between(6.0, 5.0, 1.0));
        assert!(!angle_lies_between(3.0, 5.0, 1.0));
    }

    #[test]
    fn segment_queries() {
        let s = Segment { from: point(0.0, 0.0), to: point(10.0, 0.0) };
        assert!((segment_distance(&s, point(5.0, 3.0), 100.0) - 3.0).abs() < 1e-12);
        assert!((segment_distance(&s, point(-4.0, 3.0), 100.0) - 5.0).abs() < 1e-12);
        // the bound prunes without under-reporting
        assert_eq!(segment_distance(&s, point(5.0, 3.0), 2.0), 2.0);
        assert_eq!(segment_project(&s, point(5.0, 3.0)), Some(point(5.0, 0.0)));
        assert_eq!(segment_project(&s, point(12.0, 3.0)), None);
    }

    #[test]
    fn segment_intersections() {
        let s = Segment { from: point(0.0, -5.0), to: point(0.0, 5.0) };
        let t = Segment { from: point(-5.0, 0.0), to: point(5.0, 0.0) };
        assert_eq!(segment_intersect(&s, &t), Some(point(0.0, 0.0)));
        let u = Segment { from: point(1.0, 1.0), to: point(5.0, 5.0) };
        assert_eq!(segment_intersect(&s, &u), None);
    }

    #[test]
    fn snapping() {
        let mut pos = point(0.0, 0.0);
        let mut bound = 10.0;
        assert!(snap_to_point(point(0.0, 0.0), point(1.0, 1.0), &mut pos, &mut bound));
        assert_eq!(pos, point(1.0, 1.0));
        assert!(!snap_to_point(point(0.0, 0.0), point(3.0, 3.0), &mut pos, &mut bound));
    }
}
