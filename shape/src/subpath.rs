//! The three subpath variants a shape is made of.

use crate::arc::EllipticArc;
use crate::bezier;
use crate::bounds::Bounds;
use crate::curve::Curve;
use crate::math::{snap_to_point, transform_bezier, Bezier, Point, Transform};
use crate::painter::Painter;

/// A complete, closed ellipse: the image of the unit circle under an
/// affine matrix.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Ellipse {
    pub matrix: Transform,
}

impl Ellipse {
    pub fn new(matrix: Transform) -> Ellipse {
        Ellipse { matrix }
    }

    fn arc(&self, m: &Transform) -> EllipticArc {
        EllipticArc::ellipse(self.matrix.then(m))
    }

    pub fn draw(&self, painter: &mut dyn Painter) {
        painter.draw_arc(&EllipticArc::ellipse(self.matrix));
    }

    pub fn add_to_bbox(&self, bounds: &mut Bounds, m: &Transform, _cp: bool) {
        bounds.add_bounds(&self.arc(m).bounds());
    }

    pub fn distance(&self, v: Point, m: &Transform, bound: f64) -> f64 {
        self.arc(m).distance(v, bound)
    }

    /// Vertex snapping on an ellipse only offers the center, in
    /// control-point mode.
    pub fn snap_vertex(
        &self,
        mouse: Point,
        m: &Transform,
        pos: &mut Point,
        bound: &mut f64,
        ctl: bool,
    ) {
        if ctl {
            snap_to_point(mouse, self.arc(m).center(), pos, bound);
        }
    }

    pub fn snap_boundary(&self, mouse: Point, m: &Transform, pos: &mut Point, bound: &mut f64) {
        if let Some((p, _, d)) = self.arc(m).closest_point(mouse, *bound) {
            *bound = d;
            *pos = p;
        }
    }
}

/// A closed uniform B-spline with at least three control points.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct ClosedSpline {
    pub cps: Vec<Point>,
}

impl ClosedSpline {
    /// Panics with fewer than three control points.
    pub fn new(cps: Vec<Point>) -> ClosedSpline {
        assert!(cps.len() >= 3, "a closed spline needs at least three control points");
        ClosedSpline { cps }
    }

    /// The Bezier representation, one piece per control point.
    pub fn beziers(&self, out: &mut Vec<Bezier>) {
        bezier::closed_spline_to_beziers(&self.cps, out);
    }

    pub fn draw(&self, painter: &mut dyn Painter) {
        let mut bez = Vec::new();
        self.beziers(&mut bez);
        painter.move_to(bez[0].from);
        for b in &bez {
            painter.curve_to(*b);
        }
        painter.close_path();
    }

    pub fn add_to_bbox(&self, bounds: &mut Bounds, m: &Transform, cp: bool) {
        if cp {
            for &p in &self.cps {
                bounds.add_point(m.transform_point(p));
            }
        } else {
            let mut bez = Vec::new();
            self.beziers(&mut bez);
            for b in &bez {
                bounds.add_rect(&transform_bezier(m, b).bounding_rect());
            }
        }
    }

    pub fn distance(&self, v: Point, m: &Transform, bound: f64) -> f64 {
        let mut bez = Vec::new();
        self.beziers(&mut bez);
        let mut d = bound;
        for b in &bez {
            let d1 = bezier::bezier_distance(&transform_bezier(m, b), v, d);
            if d1 < d {
                d = d1;
            }
        }
        d
    }

    /// A closed spline has no interpolated vertices; control-point mode
    /// snaps to all its control points.
    pub fn snap_vertex(
        &self,
        mouse: Point,
        m: &Transform,
        pos: &mut Point,
        bound: &mut f64,
        ctl: bool,
    ) {
        if ctl {
            for &p in &self.cps {
                snap_to_point(mouse, m.transform_point(p), pos, bound);
            }
        }
    }

    pub fn snap_boundary(&self, mouse: Point, m: &Transform, pos: &mut Point, bound: &mut f64) {
        let mut bez = Vec::new();
        self.beziers(&mut bez);
        for b in &bez {
            let tb = transform_bezier(m, b);
            let mut t = 0.0;
            bezier::bezier_snap(&tb, mouse, &mut t, pos, bound);
        }
    }
}

/// One open or closed contiguous piece of a shape.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum SubPath {
    Ellipse(Ellipse),
    ClosedSpline(ClosedSpline),
    Curve(Curve),
}

impl SubPath {
    /// Is this subpath closed? Ellipses and closed splines always are.
    pub fn closed(&self) -> bool {
        match self {
            SubPath::Ellipse(_) | SubPath::ClosedSpline(_) => true,
            SubPath::Curve(c) => c.closed(),
        }
    }

    pub fn as_curve(&self) -> Option<&Curve> {
        match self {
            SubPath::Curve(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_ellipse(&self) -> Option<&Ellipse> {
        match self {
            SubPath::Ellipse(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_closed_spline(&self) -> Option<&ClosedSpline> {
        match self {
            SubPath::ClosedSpline(s) => Some(s),
            _ => None,
        }
    }

    pub fn draw(&self, painter: &mut dyn Painter) {
        match self {
            SubPath::Ellipse(e) => e.draw(painter),
            SubPath::ClosedSpline(s) => s.draw(painter),
            SubPath::Curve(c) => c.draw(painter),
        }
    }

    pub fn add_to_bbox(&self, bounds: &mut Bounds, m: &Transform, cp: bool) {
        match self {
            SubPath::Ellipse(e) => e.add_to_bbox(bounds, m, cp),
            SubPath::ClosedSpline(s) => s.add_to_bbox(bounds, m, cp),
            SubPath::Curve(c) => c.add_to_bbox(bounds, m, cp),
        }
    }

    pub fn distance(&self, v: Point, m: &Transform, bound: f64) -> f64 {
        match self {
            SubPath::Ellipse(e) => e.distance(v, m, bound),
            SubPath::ClosedSpline(s) => s.distance(v, m, bound),
            SubPath::Curve(c) => c.distance(v, m, bound),
        }
    }

    pub fn snap_vertex(
        &self,
        mouse: Point,
        m: &Transform,
        pos: &mut Point,
        bound: &mut f64,
        ctl: bool,
    ) {
        match self {
            SubPath::Ellipse(e) => e.snap_vertex(mouse, m, pos, bound, ctl),
            SubPath::ClosedSpline(s) => s.snap_vertex(mouse, m, pos, bound, ctl),
            SubPath::Curve(c) => c.snap_vertex(mouse, m, pos, bound, ctl),
        }
    }

    pub fn snap_boundary(&self, mouse: Point, m: &Transform, pos: &mut Point, bound: &mut f64) {
        match self {
            SubPath::Ellipse(e) => e.snap_boundary(mouse, m, pos, bound),
            SubPath::ClosedSpline(s) => s.snap_boundary(mouse, m, pos, bound),
            SubPath::Curve(c) => c.snap_boundary(mouse, m, pos, bound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    #[test]
    fn ellipse_snaps_center_only_in_control_mode() {
        let e = Ellipse::new(Transform::new(5.0, 0.0, 0.0, 5.0, 20.0, 30.0));
        let m = Transform::identity();
        let mut pos = point(0.0, 0.0);
        let mut bound = 100.0;
        e.snap_vertex(point(21.0, 31.0), &m, &mut pos, &mut bound, false);
        assert_eq!(bound, 100.0);
        e.snap_vertex(point(21.0, 31.0), &m, &mut pos, &mut bound, true);
        assert_eq!(pos, point(20.0, 30.0));
    }

    #[test]
    fn closed_spline_boundary_distance() {
        // control square; the spline runs strictly inside it
        let s = ClosedSpline::new(vec![
            point(0.0, 0.0),
            point(12.0, 0.0),
            point(12.0, 12.0),
            point(0.0, 12.0),
        ]);
        let m = Transform::identity();
        let d = s.distance(point(6.0, 6.0), &m, 100.0);
        assert!(d > 1.0 && d < 6.0);
    }

    #[test]
    #[should_panic]
    fn closed_spline_needs_three_points() {
        ClosedSpline::new(vec![point(0.0, 0.0), point(1.0, 0.0)]);
    }
}
