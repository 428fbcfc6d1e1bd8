//! Elliptic arcs represented as an affine image of the unit circle.
//!
//! The supporting ellipse is the image of `x^2 + y^2 = 1` under the arc's
//! matrix; the arc itself is the image of the positively oriented circular
//! arc from `alpha` to `beta` in that unit-circle coordinate system.
//! Whether the image is positively or negatively oriented in document
//! space depends on the sign of the matrix determinant.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use arrayvec::ArrayVec;

use crate::bezier::{self, straight as bezier_straight};
use crate::bounds::Bounds;
use crate::math::{
    angle_lies_between, angle_of, normalize_angle, normalized, point, unit, Bezier, Line, Point,
    Segment, Transform,
};

/// Angular length below which an arc is treated as straight during
/// intersection searches (about 2.9 degrees).
const ARC_PRECISION: f64 = 0.05;

/// An arc of an ellipse.
///
/// A full ellipse is described by `alpha = 0`, `beta = 2 pi`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct EllipticArc {
    /// Maps the unit circle to the supporting ellipse. Must be invertible.
    pub m: Transform,
    /// Start angle in unit-circle coordinates (radians).
    pub alpha: f64,
    /// End angle in unit-circle coordinates (radians).
    pub beta: f64,
}

impl EllipticArc {
    /// The arc on the ellipse defined by `m` running from `begp` to `endp`.
    ///
    /// Assumes `m` maps both points (nearly) onto the unit circle; panics
    /// if `m` is singular.
    pub fn new(m: Transform, begp: Point, endp: Point) -> EllipticArc {
        let inv = m.inverse().expect("degenerate arc matrix");
        EllipticArc {
            m,
            alpha: angle_of(inv.transform_point(begp).to_vector()),
            beta: angle_of(inv.transform_point(endp).to_vector()),
        }
    }

    /// The full ellipse defined by `m`.
    pub fn ellipse(m: Transform) -> EllipticArc {
        EllipticArc { m, alpha: 0.0, beta: TAU }
    }

    pub fn is_ellipse(&self) -> bool {
        self.alpha == 0.0 && self.beta == TAU
    }

    /// Point at angle `alpha` of the unit-circle parameterization.
    pub fn at(&self, alpha: f64) -> Point {
        self.m.transform_point(unit(alpha).to_point())
    }

    pub fn begin(&self) -> Point {
        self.at(self.alpha)
    }

    pub fn end(&self) -> Point {
        self.at(self.beta)
    }

    /// Center of the supporting ellipse.
    pub fn center(&self) -> Point {
        point(self.m.m31, self.m.m32)
    }

    /// The arc transformed by `m` (angles are preserved, the matrix
    /// absorbs the transformation).
    pub fn transformed(&self, m: &Transform) -> EllipticArc {
        EllipticArc {
            m: self.m.then(m),
            alpha: self.alpha,
            beta: self.beta,
        }
    }

    /// Point halfway along the arc.
    pub fn midpoint(&self) -> Point {
        if self.beta - self.alpha > TAU - 1e-10
            || (self.alpha - 1e-10 < self.beta && self.beta < self.alpha)
        {
            // approximates a full ellipse
            return self.at(self.alpha + PI);
        }
        let delta = normalize_angle(self.beta - self.alpha, 0.0);
        if delta * delta < 1e-20 {
            // nearly zero length
            return self.at(self.alpha);
        }
        self.at(self.alpha + delta / 2.0)
    }

    /// Distance from `v` to the arc, pruned by `bound`.
    ///
    /// The point of the supporting ellipse closest to `v` is approximated
    /// by normalizing in unit-circle coordinates, which is exact for
    /// circles and a reasonable approximation for ellipses.
    pub fn distance(&self, v: Point, bound: f64) -> f64 {
        match self.closest_point(v, bound) {
            Some((_, _, d)) => d,
            None => bound,
        }
    }

    /// Like [`distance`](EllipticArc::distance), but also reports the
    /// closest point and its angle in unit-circle coordinates.
    ///
    /// Returns `None` when the arc is not closer than `bound`.
    pub fn closest_point(&self, v: Point, bound: f64) -> Option<(Point, f64, f64)> {
        let inv = self.m.inverse().expect("degenerate arc matrix");
        let v1 = inv.transform_point(v);
        let pos1 = self.m.transform_point(normalized(v1.to_vector()).to_point());
        let d = (v - pos1).length();

        let mut best = None;
        let mut bound = bound;
        if self.is_ellipse() {
            if d < bound {
                best = Some((pos1, angle_of(v1.to_vector()), d));
            }
        } else {
            if d < bound && angle_lies_between(angle_of(v1.to_vector()), self.alpha, self.beta) {
                bound = d;
                best = Some((pos1, angle_of(v1.to_vector()), d));
            }
            // arc end points compete with the boundary point
            let pos1 = self.begin();
            let d = (v - pos1).length();
            if d < bound {
                bound = d;
                best = Some((pos1, self.alpha, d));
            }
            let pos1 = self.end();
            let d = (v - pos1).length();
            if d < bound {
                best = Some((pos1, self.beta, d));
            }
        }
        best
    }

    /// A tight bounding box.
    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds::new();
        b.add_point(self.begin());
        b.add_point(self.end());

        let inv = self.m.inverse().expect("degenerate arc matrix");
        let ell = self.is_ellipse();
        // the extremum in axis direction n is at the preimage angle of n,
        // turned back a quarter
        for &n in &[(0.0, 1.0), (0.0, -1.0), (1.0, 0.0), (-1.0, 0.0)] {
            let alpha = angle_of(inv.transform_vector(crate::math::vector(n.0, n.1))) - FRAC_PI_2;
            if ell || angle_lies_between(alpha, self.alpha, self.beta) {
                b.add_point(self.at(alpha));
            }
        }
        b
    }

    /// Split the arc in the middle.
    pub fn subdivide(&self) -> (EllipticArc, EllipticArc) {
        if self.is_ellipse() {
            (
                EllipticArc { m: self.m, alpha: 0.0, beta: PI },
                EllipticArc { m: self.m, alpha: PI, beta: TAU },
            )
        } else {
            let delta = normalize_angle(self.beta, self.alpha) - self.alpha;
            let gamma = self.alpha + delta / 2.0;
            (
                EllipticArc { m: self.m, alpha: self.alpha, beta: gamma },
                EllipticArc { m: self.m, alpha: gamma, beta: self.beta },
            )
        }
    }

    /// Is the swept angle below `precision`?
    pub fn straight(&self, precision: f64) -> bool {
        if self.is_ellipse() {
            return false;
        }
        normalize_angle(self.beta, self.alpha) - self.alpha < precision
    }

    /// Intersection points with an infinite line.
    pub fn intersect_line(&self, l: &Line, out: &mut Vec<Point>) {
        for p in self.line_hits(l) {
            out.push(p);
        }
    }

    fn line_hits(&self, l: &Line) -> ArrayVec<[Point; 2]> {
        let mut hits = ArrayVec::new();
        let inv = self.m.inverse().expect("degenerate arc matrix");
        let p = inv.transform_point(l.point);
        let d = normalized(inv.transform_vector(l.vector));
        // unit-length direction, so the quadratic is monic
        let b = 2.0 * p.to_vector().dot(d);
        let c = p.to_vector().dot(p.to_vector()) - 1.0;
        let disc = b * b - 4.0 * c;
        if disc < 0.0 {
            return hits;
        }
        let sd = if b < 0.0 { -disc.sqrt() } else { disc.sqrt() };
        let t1 = -0.5 * (b + sd);
        let v = p + d * t1;
        if angle_lies_between(angle_of(v.to_vector()), self.alpha, self.beta) {
            hits.push(self.m.transform_point(v));
        }
        if disc > 0.0 {
            let v = p + d * (c / t1);
            if angle_lies_between(angle_of(v.to_vector()), self.alpha, self.beta) {
                hits.push(self.m.transform_point(v));
            }
        }
        hits
    }

    /// Intersection points with a straight segment.
    pub fn intersect_segment(&self, s: &Segment, out: &mut Vec<Point>) {
        let dir = s.to - s.from;
        for v in self.line_hits(&s.to_line()) {
            if (v - s.from).dot(dir) >= 0.0 && (v - s.to).dot(dir) <= 0.0 {
                out.push(v);
            }
        }
    }

    /// Intersection points with another arc, by recursive subdivision.
    pub fn intersect_arc(&self, a: &EllipticArc, out: &mut Vec<Point>) {
        if !self.bounds().intersects(&a.bounds()) {
            return;
        }
        if self.straight(ARC_PRECISION) && a.straight(ARC_PRECISION) {
            self.intersect_segment(&Segment { from: a.begin(), to: a.end() }, out);
        } else {
            let (al, ar) = self.subdivide();
            let (bl, br) = a.subdivide();
            al.intersect_arc(&bl, out);
            al.intersect_arc(&br, out);
            ar.intersect_arc(&bl, out);
            ar.intersect_arc(&br, out);
        }
    }

    /// Intersection points with a Bezier, by recursive subdivision of
    /// both curves.
    pub fn intersect_bezier(&self, b: &Bezier, out: &mut Vec<Point>) {
        if !self.bounds().intersects(&bezier::control_bounds(b)) {
            return;
        }
        if bezier_straight(b, 1.0) {
            self.intersect_segment(&Segment { from: b.from, to: b.to }, out);
        } else if self.straight(ARC_PRECISION) {
            // a short arc is not worth splitting further
            let (bl, br) = b.split(0.5);
            self.intersect_bezier(&bl, out);
            self.intersect_bezier(&br, out);
        } else {
            let (al, ar) = self.subdivide();
            let (bl, br) = b.split(0.5);
            al.intersect_bezier(&bl, out);
            al.intersect_bezier(&br, out);
            ar.intersect_bezier(&bl, out);
            ar.intersect_bezier(&br, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vector;

    fn circle(cx: f64, cy: f64, r: f64) -> Transform {
        Transform::new(r, 0.0, 0.0, r, cx, cy)
    }

    #[test]
    fn circle_distance() {
        let arc = EllipticArc::ellipse(circle(0.0, 0.0, 5.0));
        assert!((arc.distance(point(10.0, 0.0), 100.0) - 5.0).abs() < 1e-9);
        assert!((arc.distance(point(0.0, 1.0), 100.0) - 4.0).abs() < 1e-9);
        // pruned by the bound
        assert_eq!(arc.distance(point(100.0, 0.0), 3.0), 3.0);
    }

    #[test]
    fn quarter_arc_endpoints_compete() {
        // positively oriented quarter from (5,0) to (0,5)
        let arc = EllipticArc::new(circle(0.0, 0.0, 5.0), point(5.0, 0.0), point(0.0, 5.0));
        // a point near the excluded part snaps to the nearest end point
        let (pos, _, _) = arc.closest_point(point(4.0, -1.0), 100.0).unwrap();
        assert!((pos - point(5.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn quarter_arc_bounds() {
        let arc = EllipticArc::new(circle(0.0, 0.0, 5.0), point(5.0, 0.0), point(0.0, 5.0));
        let b = arc.bounds();
        assert!((b.min().x - 0.0).abs() < 1e-9);
        assert!((b.min().y - 0.0).abs() < 1e-9);
        assert!((b.max().x - 5.0).abs() < 1e-9);
        assert!((b.max().y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn line_hits_circle_twice() {
        let arc = EllipticArc::ellipse(circle(0.0, 0.0, 5.0));
        let mut pts = Vec::new();
        arc.intersect_line(
            &Line { point: point(-10.0, 0.0), vector: vector(1.0, 0.0) },
            &mut pts,
        );
        assert_eq!(pts.len(), 2);
        for p in &pts {
            assert!((p.to_vector().length() - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn segment_clipping() {
        let arc = EllipticArc::ellipse(circle(0.0, 0.0, 5.0));
        let mut pts = Vec::new();
        // reaches only the right crossing
        arc.intersect_segment(
            &Segment { from: point(0.0, 0.0), to: point(10.0, 0.0) },
            &mut pts,
        );
        assert_eq!(pts.len(), 1);
        assert!((pts[0] - point(5.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn arcs_cross() {
        let a = EllipticArc::ellipse(circle(0.0, 0.0, 5.0));
        let b = EllipticArc::ellipse(circle(6.0, 0.0, 5.0));
        let mut pts = Vec::new();
        a.intersect_arc(&b, &mut pts);
        assert!(!pts.is_empty());
        for p in &pts {
            assert!((p.to_vector().length() - 5.0).abs() < 0.3);
            assert!(((*p - point(6.0, 0.0)).length() - 5.0).abs() < 0.3);
        }
    }

    #[test]
    fn arc_meets_bezier() {
        let a = EllipticArc::ellipse(circle(0.0, 0.0, 5.0));
        let b = Bezier {
            from: point(-10.0, 0.0),
            ctrl1: point(-3.0, 0.1),
            ctrl2: point(3.0, -0.1),
            to: point(10.0, 0.0),
        };
        let mut pts = Vec::new();
        a.intersect_bezier(&b, &mut pts);
        assert!(pts.len() >= 2);
    }

    #[test]
    fn negative_orientation_flips_sweep() {
        // a negatively oriented quarter built with a y-flip
        let m = circle(0.0, 0.0, 5.0).then(&Transform::new(1.0, 0.0, 0.0, -1.0, 0.0, 0.0));
        let arc = EllipticArc::new(m, point(5.0, 0.0), point(0.0, -5.0));
        let mid = arc.midpoint();
        // sweeps through the fourth quadrant, not the first
        assert!(mid.x > 0.0 && mid.y < 0.0);
    }
}
