//! Snapping state and the prioritized resolution pipeline.

use std::f64::consts::{FRAC_PI_2, PI};
use std::ops::{BitOr, BitOrAssign};

use log::trace;

use vellum_shape::bezier::{bezier_snap, bezier_tangent, intersect_bezier_line, intersect_beziers,
    intersect_bezier_segment};
use vellum_shape::math::{
    angle_of, line_intersect, line_project, normalize_angle, normalized, point, segment_intersect,
    segment_line_intersect, unit, Line, Point,
};

use crate::collect::{collect, Collected};
use crate::page::{SnapPage, ToolSnap};

/// Bitset of enabled snapping modes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modes(pub u32);

impl Modes {
    pub const NONE: Modes = Modes(0);
    pub const VERTEX: Modes = Modes(1);
    pub const CONTROL: Modes = Modes(2);
    pub const BOUNDARY: Modes = Modes(4);
    pub const INTERSECTION: Modes = Modes(8);
    pub const GRID: Modes = Modes(0x10);
    pub const ANGLE: Modes = Modes(0x20);
    pub const AUTO_ANGLE: Modes = Modes(0x40);
    pub const CUSTOM: Modes = Modes(0x80);

    pub fn contains(self, m: Modes) -> bool {
        self.0 & m.0 == m.0
    }
}

impl BitOr for Modes {
    type Output = Modes;

    fn bitor(self, rhs: Modes) -> Modes {
        Modes(self.0 | rhs.0)
    }
}

impl BitOrAssign for Modes {
    fn bitor_assign(&mut self, rhs: Modes) {
        self.0 |= rhs.0;
    }
}

/// Which snapping strategy resolved the position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Snapped {
    None,
    Vertex,
    Control,
    Intersection,
    Boundary,
    Custom,
    Grid,
    Angle,
}

/// Snapping state of the editor: enabled modes, grid and angular
/// configuration, and the current axis system.
#[derive(Copy, Clone, Debug)]
pub struct Snap {
    /// Enabled snapping modes.
    pub modes: Modes,
    /// Is the grid visible?
    pub grid_visible: bool,
    /// Snap grid spacing.
    pub grid_size: f64,
    /// Angular snapping step, in radians.
    pub angle_size: f64,
    /// Snap distance, in user coordinates.
    pub snap_distance: f64,
    /// Show the axis system?
    pub with_axes: bool,
    /// Origin of the axis system.
    pub origin: Point,
    /// Direction of the x-axis, in radians.
    pub dir: f64,
}

impl Default for Snap {
    fn default() -> Snap {
        Snap {
            modes: Modes::NONE,
            grid_visible: false,
            grid_size: 16.0,
            angle_size: PI / 6.0,
            snap_distance: 10.0,
            with_axes: false,
            origin: point(0.0, 0.0),
            dir: 0.0,
        }
    }
}

impl Snap {
    /// The angle-quantized line through `base` toward `mouse`.
    ///
    /// Very close to the base the line keeps the current axis direction
    /// instead of jittering through all quantization steps.
    pub fn get_line(&self, mouse: Point, base: Point) -> Line {
        let mut alpha = self.dir;
        let d = mouse - base;
        if d.length() > 2.0 {
            let rel = normalize_angle(angle_of(d) - self.dir, 0.0);
            alpha = self.angle_size * (rel / self.angle_size + 0.5).trunc() + self.dir;
        }
        Line {
            point: base,
            vector: unit(alpha),
        }
    }

    /// Snap to the closest pairwise intersection of the primitives within
    /// `snap_dist` of `pos`, shrinking `snap_dist` and storing the point
    /// in `fifi` on success.
    pub fn intersection_snap(
        &self,
        pos: Point,
        fifi: &mut Point,
        page: &dyn SnapPage,
        view: Option<usize>,
        snap_dist: &mut f64,
    ) {
        let segs = collect(page, pos, *snap_dist, view);
        let mut pts: Vec<Point> = Vec::new();

        // 1. seg-seg intersections
        for i in 0..segs.segments.len() {
            for j in i + 1..segs.segments.len() {
                if let Some(v) = segment_intersect(&segs.segments[i], &segs.segments[j]) {
                    pts.push(v);
                }
            }
        }

        // 2. bezier-bezier and bezier-seg intersections; consecutive
        // pieces of one spline share an end point, which is not an
        // intersection
        for i in 0..segs.beziers.len() {
            for j in i + 1..segs.beziers.len() {
                if j > i + 1 || !segs.bezier_cont[j] {
                    intersect_beziers(&segs.beziers[i], &segs.beziers[j], &mut pts);
                }
            }
            for s in &segs.segments {
                intersect_bezier_segment(&segs.beziers[i], s, &mut pts);
            }
        }

        // 3. arc-arc, arc-bezier, and arc-segment intersections
        for i in 0..segs.arcs.len() {
            for j in i + 1..segs.arcs.len() {
                let other = segs.arcs[j];
                segs.arcs[i].intersect_arc(&other, &mut pts);
            }
            for b in &segs.beziers {
                segs.arcs[i].intersect_bezier(b, &mut pts);
            }
            for s in &segs.segments {
                segs.arcs[i].intersect_segment(s, &mut pts);
            }
        }

        let mut d = *snap_dist;
        let mut pos1 = pos;
        for pt in &pts {
            let d1 = (pos - *pt).length();
            if d1 < d {
                d = d1;
                pos1 = *pt;
            }
        }

        if d < *snap_dist {
            *fifi = pos1;
            *snap_dist = d;
        }
    }

    /// Refine an angular snap: move `pos` to the closest intersection of
    /// the angular line with a nearby boundary, if one is within
    /// `snap_dist`.
    pub fn snap_angular_intersection(
        &self,
        pos: &mut Point,
        l: &Line,
        page: &dyn SnapPage,
        view: Option<usize>,
        snap_dist: f64,
    ) -> bool {
        let segs = collect(page, *pos, snap_dist, view);

        let mut pts: Vec<Point> = Vec::new();
        for s in &segs.segments {
            if let Some(v) = segment_line_intersect(s, l) {
                pts.push(v);
            }
        }
        for arc in &segs.arcs {
            arc.intersect_line(l, &mut pts);
        }
        for b in &segs.beziers {
            intersect_bezier_line(b, l, &mut pts);
        }

        let mut d = snap_dist;
        let mut pos1 = *pos;
        for pt in &pts {
            let d1 = (*pos - *pt).length();
            if d1 < d {
                d = d1;
                pos1 = *pt;
            }
        }

        if d < snap_dist {
            *pos = pos1;
            true
        } else {
            false
        }
    }

    /// Vertex, control-point, intersection, boundary, custom-grid and
    /// grid snapping, in strict priority order.
    ///
    /// Later stages only win by being strictly closer than everything a
    /// higher-priority stage found; boundary, custom and grid snapping run
    /// only when nothing above matched at all.
    pub fn simple_snap(
        &self,
        pos: &mut Point,
        page: &dyn SnapPage,
        view: usize,
        snap_dist: f64,
        tool: Option<&dyn ToolSnap>,
    ) -> Snapped {
        let identity = vellum_shape::math::Transform::identity();
        let mut d = snap_dist;
        let mut fifi = *pos;

        // highest priority: vertex snapping
        if self.modes.contains(Modes::VERTEX) {
            for i in 0..page.len() {
                if page.snaps_in_view(i, view) {
                    page.object(i).snap_vertex(*pos, &identity, &mut fifi, &mut d, false);
                }
            }
            if let Some(tool) = tool {
                tool.snap_vertex(*pos, &mut fifi, &mut d, false);
            }
        }

        let dvtx = d;
        let mut fifi_ctl = *pos;
        if self.modes.contains(Modes::CONTROL) {
            for i in 0..page.len() {
                if page.snaps_in_view(i, view) {
                    page.object(i).snap_vertex(*pos, &identity, &mut fifi_ctl, &mut d, true);
                }
            }
            if let Some(tool) = tool {
                tool.snap_vertex(*pos, &mut fifi_ctl, &mut d, true);
            }
        }

        let dctl = d;
        let mut fifi_x = *pos;
        if self.modes.contains(Modes::INTERSECTION) {
            self.intersection_snap(*pos, &mut fifi_x, page, Some(view), &mut d);
        }

        // return if snapping has occurred
        if d < dctl {
            *pos = fifi_x;
            trace!("snapped to intersection");
            return Snapped::Intersection;
        } else if d < dvtx {
            *pos = fifi_ctl;
            trace!("snapped to control point");
            return Snapped::Control;
        } else if d < snap_dist {
            *pos = fifi;
            trace!("snapped to vertex");
            return Snapped::Vertex;
        }

        // boundary snapping
        if self.modes.contains(Modes::BOUNDARY) {
            for i in 0..page.len() {
                if page.snaps_in_view(i, view) {
                    page.object(i).snap_boundary(*pos, &identity, &mut fifi, &mut d);
                }
            }
            if d < snap_dist {
                *pos = fifi;
                trace!("snapped to boundary");
                return Snapped::Boundary;
            }
        }

        // custom grid snapping
        if self.modes.contains(Modes::CUSTOM) {
            self.intersection_snap(*pos, &mut fifi, page, None, &mut d);
            if d < snap_dist {
                *pos = fifi;
                trace!("snapped to custom grid");
                return Snapped::Custom;
            }
        }

        // grid snapping: always occurs, rounding each axis independently
        // with ties away from zero
        if self.modes.contains(Modes::GRID) {
            let g = self.grid_size;
            let rx = pos.x / g + if pos.x > 0.0 { 0.5 } else { -0.5 };
            let ry = pos.y / g + if pos.y > 0.0 { 0.5 } else { -0.5 };
            *pos = point(g * rx.trunc(), g * ry.trunc());
            return Snapped::Grid;
        }

        Snapped::None
    }

    /// Resolve `pos` against the page.
    ///
    /// Angular snapping takes precedence over everything: if both a fixed
    /// and an automatic angular mode are active (the latter needs
    /// `auto_origin`), their two lines leave a single admissible point; a
    /// single active angular mode projects onto its quantized line and
    /// optionally refines against boundaries. Otherwise
    /// [`simple_snap`](Snap::simple_snap) runs.
    pub fn snap(
        &self,
        pos: &mut Point,
        page: &dyn SnapPage,
        view: usize,
        snap_dist: f64,
        tool: Option<&dyn ToolSnap>,
        auto_origin: Option<Point>,
    ) -> Snapped {
        if let Some(auto) = auto_origin {
            if self.modes.contains(Modes::AUTO_ANGLE) && self.modes.contains(Modes::ANGLE) {
                // only one possible point
                let angular = self.get_line(*pos, self.origin);
                let automat = self.get_line(*pos, auto);
                if let Some(v) = line_intersect(&angular, &automat) {
                    if v.to_vector().square_length() < 1e10 {
                        *pos = v;
                        return Snapped::Angle;
                    }
                }
                // parallel lines: fall through to the single-line case
            }
        }

        let auto_active = auto_origin.is_some() && self.modes.contains(Modes::AUTO_ANGLE);
        if self.modes.contains(Modes::ANGLE) || auto_active {
            let org = if self.modes.contains(Modes::ANGLE) {
                self.origin
            } else {
                auto_origin.unwrap()
            };
            let l = self.get_line(*pos, org);
            *pos = line_project(&l, *pos);
            if self.modes.contains(Modes::BOUNDARY) {
                self.snap_angular_intersection(pos, &l, page, Some(view), snap_dist);
            }
            return Snapped::Angle;
        }

        self.simple_snap(pos, page, view, snap_dist, tool)
    }

    /// Set the axis origin and direction from the edge nearest to `pos`.
    ///
    /// Prefers straight segments, then arcs, then Bezier pieces; the
    /// direction points along the edge, away from its nearer end.
    pub fn set_edge(&mut self, pos: Point, page: &dyn SnapPage, view: usize) -> bool {
        // the bound cannot be too small: Bezier distances are computed on
        // an approximation of precision 1.0
        let segs: Collected = collect(page, pos, 2.0, Some(view));

        if let Some(seg) = segs.segments.last() {
            let l = seg.to_line();
            self.origin = line_project(&l, pos);
            let mut dir = normalized(l.vector);
            if (self.origin - seg.from).length() > (self.origin - seg.to).length() {
                dir = -dir;
            }
            self.dir = angle_of(dir);
            true
        } else if let Some(arc) = segs.arcs.last() {
            match arc.closest_point(pos, 3.0) {
                Some((origin, alpha, _)) => {
                    self.origin = origin;
                    self.dir = angle_of(arc.m.transform_vector(unit(alpha + FRAC_PI_2)));
                    true
                }
                None => false,
            }
        } else if let Some(bez) = segs.beziers.last() {
            let mut t = 0.0;
            let mut origin = pos;
            let mut bound = 2.0;
            if !bezier_snap(bez, pos, &mut t, &mut origin, &mut bound) {
                return false;
            }
            self.origin = origin;
            self.dir = angle_of(bezier_tangent(bez, t));
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::SnapNode;
    use vellum_shape::math::Transform;
    use vellum_shape::Shape;

    struct TestPage {
        objects: Vec<SnapNode>,
        layers: Vec<usize>,
    }

    impl TestPage {
        fn of(texts: &[&str]) -> TestPage {
            TestPage {
                objects: texts
                    .iter()
                    .map(|t| SnapNode::Path {
                        matrix: Transform::identity(),
                        shape: Shape::parse(t).unwrap(),
                    })
                    .collect(),
                layers: texts.iter().map(|_| 0).collect(),
            }
        }

        fn empty() -> TestPage {
            TestPage { objects: vec![], layers: vec![] }
        }
    }

    impl SnapPage for TestPage {
        fn len(&self) -> usize {
            self.objects.len()
        }

        fn object(&self, i: usize) -> &SnapNode {
            &self.objects[i]
        }

        fn snaps_in_view(&self, _i: usize, _view: usize) -> bool {
            true
        }

        fn layer_of(&self, i: usize) -> usize {
            self.layers[i]
        }

        fn find_layer(&self, name: &str) -> Option<usize> {
            if name == crate::collect::CUSTOM_GRID_LAYER {
                Some(1)
            } else {
                None
            }
        }
    }

    fn grid_snap(grid_size: f64) -> Snap {
        Snap {
            modes: Modes::GRID,
            grid_size,
            ..Snap::default()
        }
    }

    #[test]
    fn grid_rounding() {
        let snap = grid_snap(8.0);
        let page = TestPage::empty();
        let mut pos = point(10.0, 3.9);
        assert_eq!(snap.snap(&mut pos, &page, 0, 10.0, None, None), Snapped::Grid);
        assert_eq!(pos, point(8.0, 0.0));

        // ties round away from zero
        let mut pos = point(4.0, -4.0);
        snap.snap(&mut pos, &page, 0, 10.0, None, None);
        assert_eq!(pos, point(8.0, -8.0));
    }

    #[test]
    fn vertex_beats_closer_boundary() {
        // a vertex at distance 2 and an unrelated boundary at distance 1
        let page = TestPage::of(&["0 0 m 10 0 l", "-20 3 m 20 3 l"]);
        let snap = Snap {
            modes: Modes::VERTEX | Modes::BOUNDARY,
            ..Snap::default()
        };
        let mut pos = point(0.0, 2.0);
        let got = snap.snap(&mut pos, &page, 0, 5.0, None, None);
        assert_eq!(got, Snapped::Vertex);
        assert_eq!(pos, point(0.0, 0.0));
    }

    #[test]
    fn boundary_used_when_no_vertex_in_range() {
        let page = TestPage::of(&["-20 3 m 20 3 l"]);
        let snap = Snap {
            modes: Modes::VERTEX | Modes::BOUNDARY,
            ..Snap::default()
        };
        let mut pos = point(0.0, 2.0);
        let got = snap.snap(&mut pos, &page, 0, 5.0, None, None);
        assert_eq!(got, Snapped::Boundary);
        assert_eq!(pos, point(0.0, 3.0));
    }

    #[test]
    fn control_point_overrides_when_strictly_closer() {
        let page = TestPage::of(&["0 0 m 10 0 l"]);
        let snap = Snap {
            modes: Modes::VERTEX | Modes::CONTROL,
            ..Snap::default()
        };
        // the midpoint is a control target at distance 1, the vertices
        // are at distance 5.1
        let mut pos = point(5.0, 1.0);
        let got = snap.snap(&mut pos, &page, 0, 6.0, None, None);
        assert_eq!(got, Snapped::Control);
        assert_eq!(pos, point(5.0, 0.0));
    }

    #[test]
    fn intersection_beats_boundary() {
        let page = TestPage::of(&["-10 0 m 10 0 l", "0 -10 m 0 10 l"]);
        let snap = Snap {
            modes: Modes::INTERSECTION | Modes::BOUNDARY,
            ..Snap::default()
        };
        let mut pos = point(0.6, 0.8);
        let got = snap.snap(&mut pos, &page, 0, 5.0, None, None);
        assert_eq!(got, Snapped::Intersection);
        assert!((pos - point(0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn no_snap_is_not_an_error() {
        let page = TestPage::empty();
        let snap = Snap {
            modes: Modes::VERTEX | Modes::BOUNDARY,
            ..Snap::default()
        };
        let mut pos = point(3.0, 4.0);
        assert_eq!(snap.snap(&mut pos, &page, 0, 5.0, None, None), Snapped::None);
        assert_eq!(pos, point(3.0, 4.0));
    }

    #[test]
    fn angular_projection() {
        let page = TestPage::empty();
        let snap = Snap {
            modes: Modes::ANGLE,
            angle_size: FRAC_PI_2,
            origin: point(0.0, 0.0),
            ..Snap::default()
        };
        let mut pos = point(10.0, 1.0);
        let got = snap.snap(&mut pos, &page, 0, 5.0, None, None);
        assert_eq!(got, Snapped::Angle);
        assert!((pos - point(10.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn fixed_and_auto_angular_intersect() {
        let page = TestPage::empty();
        let snap = Snap {
            modes: Modes::ANGLE | Modes::AUTO_ANGLE,
            angle_size: FRAC_PI_2,
            origin: point(0.0, 0.0),
            ..Snap::default()
        };
        let mut pos = point(10.0, 1.0);
        let got = snap.snap(&mut pos, &page, 0, 5.0, None, Some(point(10.0, 10.0)));
        assert_eq!(got, Snapped::Angle);
        assert!((pos - point(10.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn angular_with_boundary_refinement() {
        let page = TestPage::of(&["5 -10 m 5 10 l"]);
        let snap = Snap {
            modes: Modes::ANGLE | Modes::BOUNDARY,
            angle_size: FRAC_PI_2,
            origin: point(0.0, 0.0),
            ..Snap::default()
        };
        let mut pos = point(4.0, 1.0);
        let got = snap.snap(&mut pos, &page, 0, 5.0, None, None);
        assert_eq!(got, Snapped::Angle);
        // projected onto the horizontal axis line, then pulled to the
        // crossing with the vertical edge
        assert!((pos - point(5.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn custom_grid_intersections() {
        let mut page = TestPage::of(&["-10 5 m 10 5 l", "3 -10 m 3 10 l"]);
        page.layers = vec![1, 1];
        let snap = Snap {
            modes: Modes::CUSTOM,
            ..Snap::default()
        };
        let mut pos = point(2.5, 4.5);
        let got = snap.snap(&mut pos, &page, 0, 5.0, None, None);
        assert_eq!(got, Snapped::Custom);
        assert!((pos - point(3.0, 5.0)).length() < 1e-9);
    }

    #[test]
    fn set_edge_from_segment() {
        let page = TestPage::of(&["0 0 m 10 0 l"]);
        let mut snap = Snap::default();
        assert!(snap.set_edge(point(6.0, 1.0), &page, 0));
        assert_eq!(snap.origin, point(6.0, 0.0));
        // the projection is nearer to the far end, so the direction flips
        assert!((snap.dir.abs() - PI).abs() < 1e-9);
    }

    #[test]
    fn set_edge_from_arc() {
        let page = TestPage::of(&["5 0 m 5 0 0 5 0 0 0 5 a"]);
        let mut snap = Snap::default();
        assert!(snap.set_edge(point(3.3, 3.3), &page, 0));
        // origin on the circle, direction tangent to it
        assert!((snap.origin.to_vector().length() - 5.0).abs() < 1e-6);
        let radial = angle_of(snap.origin.to_vector());
        let tangent = normalize_angle(snap.dir - radial, 0.0);
        assert!((tangent - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn set_edge_fails_far_from_everything() {
        let page = TestPage::of(&["0 0 m 10 0 l"]);
        let mut snap = Snap::default();
        assert!(!snap.set_edge(point(50.0, 50.0), &page, 0));
    }
}
