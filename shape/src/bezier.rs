//! Spline-to-Bezier conversion and Bezier queries.
//!
//! Every spline kind a curve can carry converts to a run of cubic Beziers,
//! and all geometric queries on splines are phrased in terms of that run.
//! Distance and closest-point queries approximate the curve by recursive
//! subdivision; intersections subdivide until both pieces are straight to
//! within a fixed precision and then intersect the chords.

use crate::bounds::Bounds;
use crate::math::{
    line_side, segment_intersect, segment_line_intersect, segment_project, snap_to_point,
    Bezier, Line, Point, Segment, Vector,
};

/// Chord precision at which a subdivided Bezier is treated as straight
/// during intersection searches.
const INTERSECT_PRECISION: f64 = 1.0;

#[inline]
fn midpoint(p: Point, q: Point) -> Point {
    p.lerp(q, 0.5)
}

/// The point one third of the way from `p` to `q`.
#[inline]
fn thirdpoint(p: Point, q: Point) -> Point {
    p.lerp(q, 1.0 / 3.0)
}

/// Elevate a quadratic Bezier to its exact cubic form.
pub fn quad_to_cubic(p0: Point, p1: Point, p2: Point) -> Bezier {
    Bezier {
        from: p0,
        ctrl1: thirdpoint(p1, p0),
        ctrl2: thirdpoint(p1, p2),
        to: p2,
    }
}

/// Convert a clamped uniform B-spline to a run of Beziers.
///
/// With n control points the first and last knot are repeated three times,
/// clamping the curve to the end points; the knot sequence is
/// `[0, 0, 0, 1, 2, ..., k-1, k, k, k]` with `k = n - 3` output curves.
/// Three control points yield a single quadratic (elevated to cubic form),
/// four the single cubic through the given points, and two a straight
/// chord.
///
/// Beziers are appended to `out`.
pub fn spline_to_beziers(v: &[Point], out: &mut Vec<Bezier>) {
    let n = v.len();
    assert!(n >= 2, "a spline needs at least two control points");
    if n == 2 {
        out.push(Bezier { from: v[0], ctrl1: v[0], ctrl2: v[1], to: v[1] });
    } else if n == 3 {
        out.push(quad_to_cubic(v[0], v[1], v[2]));
    } else if n == 4 {
        out.push(Bezier { from: v[0], ctrl1: v[1], ctrl2: v[2], to: v[3] });
    } else if n == 5 {
        // knots [0,0,0], [0,0,1], [0,1,2], [1,2,2], [2,2,2]
        let q0 = v[0];
        let q1 = v[1];
        let q2 = midpoint(q1, v[2]);
        let r = midpoint(v[2], v[3]);
        let q3 = midpoint(q2, r);
        out.push(Bezier { from: q0, ctrl1: q1, ctrl2: q2, to: q3 });
        out.push(Bezier { from: q3, ctrl1: r, ctrl2: v[3], to: v[4] });
    } else {
        let k = n - 3;
        // first interval: [0,0,0], [0,0,1], [0,1,1], [1,1,1]
        let mut q1 = v[1];
        let mut q2 = midpoint(q1, v[2]);
        let mut r = thirdpoint(v[2], v[3]);
        let mut q3 = midpoint(q2, r);
        out.push(Bezier { from: v[0], ctrl1: q1, ctrl2: q2, to: q3 });
        for i in 1..k - 2 {
            let q0 = q3;
            q1 = r;
            q2 = midpoint(q1, v[i + 2]);
            r = thirdpoint(v[i + 2], v[i + 3]);
            q3 = midpoint(q2, r);
            out.push(Bezier { from: q0, ctrl1: q1, ctrl2: q2, to: q3 });
        }
        // interval (k-2)..(k-1)
        let q0 = q3;
        q1 = r;
        q2 = midpoint(q1, v[k]);
        r = midpoint(v[k], v[k + 1]);
        q3 = midpoint(q2, r);
        out.push(Bezier { from: q0, ctrl1: q1, ctrl2: q2, to: q3 });
        // final interval
        out.push(Bezier { from: q3, ctrl1: r, ctrl2: v[n - 2], to: v[n - 1] });
    }
}

/// Convert the legacy spline kind to a run of Beziers.
///
/// This reproduces a historic, knotless definition where the first and last
/// control point simply get multiplicity three. It exists to read old
/// documents; nothing should write it.
pub fn old_spline_to_beziers(v: &[Point], out: &mut Vec<Bezier>) {
    let n = v.len();
    assert!(n >= 2, "a spline needs at least two control points");
    let p0 = v[0];
    let mut q3 = midpoint(thirdpoint(p0, v[1]), p0);
    out.push(Bezier { from: p0, ctrl1: p0, ctrl2: p0, to: q3 });
    if n > 2 {
        for i in 0..n - 2 {
            let p1 = v[i];
            let p2 = v[i + 1];
            let p3 = v[i + 2];
            let q0 = q3;
            let q1 = thirdpoint(p1, p2);
            let q2 = thirdpoint(p2, p1);
            q3 = midpoint(thirdpoint(p2, p3), q2);
            out.push(Bezier { from: q0, ctrl1: q1, ctrl2: q2, to: q3 });
        }
    }
    // second to last piece
    let p2 = v[n - 1];
    let q0 = q3;
    let q1 = thirdpoint(v[n - 2], p2);
    let q2 = thirdpoint(p2, v[n - 2]);
    q3 = midpoint(p2, q2);
    out.push(Bezier { from: q0, ctrl1: q1, ctrl2: q2, to: q3 });
    out.push(Bezier { from: q3, ctrl1: p2, ctrl2: p2, to: p2 });
}

/// Convert a closed uniform cubic B-spline to a run of Beziers, one per
/// control point.
pub fn closed_spline_to_beziers(v: &[Point], out: &mut Vec<Bezier>) {
    let n = v.len();
    assert!(n >= 3, "a closed spline needs at least three control points");
    for i in 0..n {
        let p0 = v[i % n];
        let p1 = v[(i + 1) % n];
        let p2 = v[(i + 2) % n];
        let p3 = v[(i + 3) % n];
        let r = thirdpoint(p1, p0);
        let u = thirdpoint(p2, p3);
        let q1 = thirdpoint(p1, p2);
        let q2 = thirdpoint(p2, p1);
        out.push(Bezier {
            from: midpoint(r, q1),
            ctrl1: q1,
            ctrl2: q2,
            to: midpoint(u, q2),
        });
    }
}

fn cardinal(prev: Point, p: Point, q: Point, next: Point, tension: f64) -> Bezier {
    // tangents at p and q
    let t1 = q - prev;
    let t2 = next - p;
    Bezier {
        from: p,
        ctrl1: p + t1 * (tension / 3.0),
        ctrl2: q - t2 * (tension / 3.0),
        to: q,
    }
}

/// Convert a cardinal spline to a run of Beziers.
///
/// The curve interpolates all control points; `tension` shapes the tangents
/// (the drawing UI fixes it at 0.5, the file format carries it).
pub fn cardinal_spline_to_beziers(v: &[Point], tension: f64, out: &mut Vec<Bezier>) {
    let n = v.len();
    assert!(n >= 2, "a spline needs at least two control points");
    if n == 2 {
        out.push(Bezier { from: v[0], ctrl1: v[0], ctrl2: v[1], to: v[1] });
    } else {
        out.push(cardinal(v[0], v[0], v[1], v[2], tension));
        for i in 1..n - 2 {
            out.push(cardinal(v[i - 1], v[i], v[i + 1], v[i + 2], tension));
        }
        out.push(cardinal(v[n - 3], v[n - 2], v[n - 1], v[n - 1], tension));
    }
}

/// The bounding box of the four control points (contains the curve, not
/// tightly).
pub fn control_bounds(b: &Bezier) -> Bounds {
    let mut bounds = Bounds::of(b.from, b.ctrl1);
    bounds.add_point(b.ctrl2);
    bounds.add_point(b.to);
    bounds
}

/// Is the curve nearly identical to its chord?
pub fn straight(b: &Bezier, precision: f64) -> bool {
    if b.from == b.to {
        (b.ctrl1 - b.from).length() < precision && (b.ctrl2 - b.from).length() < precision
    } else {
        let l = Segment { from: b.from, to: b.to }.to_line();
        crate::math::line_distance(&l, b.ctrl1) < precision
            && crate::math::line_distance(&l, b.ctrl2) < precision
    }
}

/// Approximate the curve by a polygonal chain, appending the chain vertices
/// (excluding the start point) to `out`.
pub fn approximate(b: &Bezier, precision: f64, out: &mut Vec<Point>) {
    if straight(b, precision) {
        out.push(b.to);
    } else {
        let (l, r) = b.split(0.5);
        approximate(&l, precision, out);
        approximate(&r, precision, out);
    }
}

/// Distance from `v` to the curve, pruned by `bound`.
///
/// The curve is approximated to a precision of 1.0 and the distance to the
/// approximation is returned; may return `bound` when the true distance is
/// larger.
pub fn bezier_distance(b: &Bezier, v: Point, bound: f64) -> f64 {
    if control_bounds(b).certain_clearance(v, bound) {
        return bound;
    }
    let mut approx = Vec::new();
    approximate(b, 1.0, &mut approx);
    let mut cur = b.from;
    let mut d = bound;
    for &p in &approx {
        let d1 = crate::math::segment_distance(&Segment { from: cur, to: p }, v, d);
        if d1 < d {
            d = d1;
        }
        cur = p;
    }
    d
}

/// Tangent direction at parameter `t` (not normalized).
pub fn bezier_tangent(b: &Bezier, t: f64) -> Vector {
    b.derivative(t)
}

/// Find (approximately) the point on the curve nearest to `v`, if it is
/// closer than `bound`.
///
/// On success sets `t` to the parameter, `pos` to the point, shrinks
/// `bound` and returns `true`.
pub fn bezier_snap(b: &Bezier, v: Point, t: &mut f64, pos: &mut Point, bound: &mut f64) -> bool {
    if control_bounds(b).certain_clearance(v, *bound) {
        return false;
    }

    // straight runs at the ends of clamped B-splines collapse three control
    // points onto an end point; project onto the chord and invert the cubic
    // parameterization
    if b.from != b.ctrl1 && b.ctrl1 == b.ctrl2 && b.ctrl2 == b.to {
        let seg = Segment { from: b.from, to: b.to };
        if let Some(prj) = segment_project(&seg, v) {
            let d = (v - prj).length();
            if d < *bound {
                *bound = d;
                *pos = prj;
                *t = 1.0 - ((prj - b.to).length() / (b.from - b.to).length()).powf(1.0 / 3.0);
                return true;
            }
        }
        // end points are handled below
    }
    if b.from == b.ctrl1 && b.ctrl1 == b.ctrl2 && b.ctrl2 != b.to {
        let seg = Segment { from: b.to, to: b.from };
        if let Some(prj) = segment_project(&seg, v) {
            let d = (v - prj).length();
            if d < *bound {
                *bound = d;
                *pos = prj;
                *t = 1.0 - ((prj - b.from).length() / (b.to - b.from).length()).powf(1.0 / 3.0);
                return true;
            }
        }
    }

    if straight(b, 1.0) {
        if b.from != b.to {
            if let Some(prj) = segment_project(&Segment { from: b.from, to: b.to }, v) {
                let t1 = (prj - b.from).length() / (b.to - b.from).length();
                let u = b.sample(t1);
                let d = (v - u).length();
                if d < *bound {
                    *t = t1;
                    *bound = d;
                    *pos = u;
                    return true;
                }
                return false;
            }
        }
        let v0 = snap_to_point(v, b.from, pos, bound);
        if v0 {
            *t = 0.0;
        }
        let v1 = snap_to_point(v, b.to, pos, bound);
        if v1 {
            *t = 1.0;
        }
        v0 || v1
    } else {
        let (l, r) = b.split(0.5);
        let p1 = bezier_snap(&l, v, t, pos, bound);
        let p2 = bezier_snap(&r, v, t, pos, bound);
        if p1 || p2 {
            *t *= 0.5;
        }
        if p2 {
            *t += 0.5;
        }
        p1 || p2
    }
}

fn intersect_rec(a: &Bezier, b: &Bezier, out: &mut Vec<Point>) {
    if !control_bounds(a).intersects(&control_bounds(b)) {
        return;
    }
    if straight(a, INTERSECT_PRECISION) && straight(b, INTERSECT_PRECISION) {
        let sa = Segment { from: a.from, to: a.to };
        let sb = Segment { from: b.from, to: b.to };
        if let Some(p) = segment_intersect(&sa, &sb) {
            out.push(p);
        }
    } else {
        let (la, ra) = a.split(0.5);
        let (lb, rb) = b.split(0.5);
        intersect_rec(&la, &lb, out);
        intersect_rec(&ra, &lb, out);
        intersect_rec(&la, &rb, out);
        intersect_rec(&ra, &rb, out);
    }
}

/// Intersection points of two Beziers, by recursive subdivision with
/// bounding-box rejection.
pub fn intersect_beziers(a: &Bezier, b: &Bezier, out: &mut Vec<Point>) {
    intersect_rec(a, b, out);
}

/// Intersection points of a Bezier and a straight segment.
pub fn intersect_bezier_segment(b: &Bezier, s: &Segment, out: &mut Vec<Point>) {
    // a degenerate Bezier is immediately straight, so subdivision only
    // happens on the curve side
    let sb = Bezier { from: s.to, ctrl1: s.to, ctrl2: s.from, to: s.from };
    intersect_rec(b, &sb, out);
}

/// Intersection points of a Bezier and an infinite line.
pub fn intersect_bezier_line(b: &Bezier, l: &Line, out: &mut Vec<Point>) {
    let sgn = line_side(l, b.from);
    if sgn < 0.0
        && line_side(l, b.ctrl1) < 0.0
        && line_side(l, b.ctrl2) < 0.0
        && line_side(l, b.to) < 0.0
    {
        return;
    }
    if sgn > 0.0
        && line_side(l, b.ctrl1) > 0.0
        && line_side(l, b.ctrl2) > 0.0
        && line_side(l, b.to) > 0.0
    {
        return;
    }

    if straight(b, INTERSECT_PRECISION) {
        if let Some(p) = segment_line_intersect(&Segment { from: b.from, to: b.to }, l) {
            out.push(p);
        }
    } else {
        let (left, right) = b.split(0.5);
        intersect_bezier_line(&left, l, out);
        intersect_bezier_line(&right, l, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{point, vector};

    #[test]
    fn quadratic_special_case() {
        let mut bez = Vec::new();
        spline_to_beziers(&[point(0.0, 0.0), point(4.0, 8.0), point(8.0, 0.0)], &mut bez);
        assert_eq!(bez.len(), 1);
        let b = bez[0];
        assert_eq!(b.from, point(0.0, 0.0));
        assert_eq!(b.to, point(8.0, 0.0));
        // cubic elevation of the quadratic: q1 = (p0 + 2 p1) / 3
        assert!((b.ctrl1 - point(8.0 / 3.0, 16.0 / 3.0)).length() < 1e-12);
        assert!((b.ctrl2 - point(16.0 / 3.0, 16.0 / 3.0)).length() < 1e-12);
    }

    #[test]
    fn four_points_pass_through() {
        let cps = [point(0.0, 0.0), point(1.0, 3.0), point(5.0, 3.0), point(6.0, 0.0)];
        let mut bez = Vec::new();
        spline_to_beziers(&cps, &mut bez);
        assert_eq!(bez.len(), 1);
        assert_eq!(bez[0].ctrl1, cps[1]);
        assert_eq!(bez[0].ctrl2, cps[2]);
    }

    #[test]
    fn long_spline_is_continuous() {
        let cps: Vec<_> = (0..8).map(|i| point(i as f64 * 10.0, ((i * i) % 5) as f64)).collect();
        let mut bez = Vec::new();
        spline_to_beziers(&cps, &mut bez);
        assert_eq!(bez.len(), cps.len() - 3);
        assert_eq!(bez[0].from, cps[0]);
        assert_eq!(bez.last().unwrap().to, cps[cps.len() - 1]);
        for w in bez.windows(2) {
            // C1 at the joints: positions match and tangents are collinear
            assert!((w[0].to - w[1].from).length() < 1e-12);
            let t0 = w[0].to - w[0].ctrl2;
            let t1 = w[1].ctrl1 - w[1].from;
            assert!((t0 - t1).length() < 1e-9);
        }
    }

    #[test]
    fn cardinal_interpolates() {
        let cps = [point(0.0, 0.0), point(10.0, 5.0), point(20.0, -5.0), point(30.0, 0.0)];
        let mut bez = Vec::new();
        cardinal_spline_to_beziers(&cps, 0.5, &mut bez);
        assert_eq!(bez.len(), 3);
        for (i, b) in bez.iter().enumerate() {
            assert_eq!(b.from, cps[i]);
            assert_eq!(b.to, cps[i + 1]);
        }
    }

    #[test]
    fn closed_spline_count() {
        let cps = [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(0.0, 10.0)];
        let mut bez = Vec::new();
        closed_spline_to_beziers(&cps, &mut bez);
        assert_eq!(bez.len(), 4);
        // the run closes up
        assert!((bez[3].to - bez[0].from).length() < 1e-12);
    }

    #[test]
    fn distance_and_bound() {
        let b = Bezier {
            from: point(0.0, 0.0),
            ctrl1: point(10.0, 0.0),
            ctrl2: point(20.0, 0.0),
            to: point(30.0, 0.0),
        };
        let d = bezier_distance(&b, point(15.0, 4.0), 100.0);
        assert!((d - 4.0).abs() < 0.1);
        // the bound is never exceeded
        assert!(bezier_distance(&b, point(15.0, 4.0), 2.0) <= 2.0);
    }

    #[test]
    fn snap_finds_closest_point() {
        let b = Bezier {
            from: point(0.0, 0.0),
            ctrl1: point(10.0, 20.0),
            ctrl2: point(20.0, 20.0),
            to: point(30.0, 0.0),
        };
        let mut t = 0.0;
        let mut pos = point(0.0, 0.0);
        let mut bound = 50.0;
        assert!(bezier_snap(&b, point(15.0, 10.0), &mut t, &mut pos, &mut bound));
        assert!((pos - b.sample(t)).length() < 1.5);
        assert!(bound < 10.0);
    }

    #[test]
    fn crossing_beziers_intersect() {
        let a = Bezier {
            from: point(0.0, -10.0),
            ctrl1: point(0.0, -3.0),
            ctrl2: point(0.0, 3.0),
            to: point(0.0, 10.0),
        };
        let b = Bezier {
            from: point(-10.0, 0.0),
            ctrl1: point(-3.0, 0.0),
            ctrl2: point(3.0, 0.0),
            to: point(10.0, 0.0),
        };
        let mut pts = Vec::new();
        intersect_beziers(&a, &b, &mut pts);
        assert!(!pts.is_empty());
        assert!((pts[0] - point(0.0, 0.0)).length() < 1.0);
    }

    #[test]
    fn line_intersection_respects_side_test() {
        let b = Bezier {
            from: point(0.0, 5.0),
            ctrl1: point(3.0, 8.0),
            ctrl2: point(7.0, 8.0),
            to: point(10.0, 5.0),
        };
        let mut pts = Vec::new();
        // a line strictly below the curve
        intersect_bezier_line(
            &b,
            &Line { point: point(0.0, 0.0), vector: vector(1.0, 0.0) },
            &mut pts,
        );
        assert!(pts.is_empty());
        // a vertical line through the middle; the crossing can fall on a
        // subdivision boundary and be reported by both halves
        intersect_bezier_line(
            &b,
            &Line { point: point(5.0, 0.0), vector: vector(0.0, 1.0) },
            &mut pts,
        );
        assert!(!pts.is_empty());
        for p in &pts {
            assert!((p.x - 5.0).abs() < 1.0);
        }
    }
}
