//! Collects the geometric primitives near a query position.
//!
//! Intersection and boundary-refinement snapping work on a transient set
//! of line segments, arcs and Bezier pieces pulled out of the eligible
//! objects. Primitives are pre-filtered by their own distance to the query
//! position so the set stays small at interactive rates.

use vellum_shape::bezier::bezier_distance;
use vellum_shape::math::{segment_distance, transform_bezier, Bezier, Point, Segment, Transform};
use vellum_shape::{EllipticArc, SegmentKind, SubPath};

use crate::page::{SnapNode, SnapPage};

/// The name of the layer whose content forms the custom snapping grid.
pub const CUSTOM_GRID_LAYER: &str = "GRID";

/// Primitives within the snap radius of the query position.
///
/// `bezier_cont[i]` is set when `beziers[i]` continues the same spline as
/// `beziers[i - 1]`; pairwise intersection skips such pairs, since the
/// shared joint would otherwise be reported as an intersection of its own.
#[derive(Default)]
pub struct Collected {
    pub segments: Vec<Segment>,
    pub arcs: Vec<EllipticArc>,
    pub beziers: Vec<Bezier>,
    pub bezier_cont: Vec<bool>,
}

impl Collected {
    fn add_bezier_run(&mut self, bez: &[Bezier], m: &Transform, mouse: Point, dist: f64) {
        let mut cont = false;
        for b in bez {
            let tb = transform_bezier(m, b);
            if bezier_distance(&tb, mouse, dist) < dist {
                self.beziers.push(tb);
                self.bezier_cont.push(cont);
                cont = true;
            } else {
                cont = false;
            }
        }
    }

    fn visit(&mut self, node: &SnapNode, outer: &Transform, mouse: Point, dist: f64) {
        match node {
            SnapNode::Group { matrix, children } => {
                let m = matrix.then(outer);
                for child in children {
                    self.visit(child, &m, mouse, dist);
                }
            }
            SnapNode::Path { matrix, shape } => {
                let m = matrix.then(outer);
                for sp in shape.subpaths() {
                    self.visit_subpath(sp, &m, mouse, dist);
                }
            }
        }
    }

    fn visit_subpath(&mut self, sp: &SubPath, m: &Transform, mouse: Point, dist: f64) {
        match sp {
            SubPath::Ellipse(e) => {
                if e.distance(mouse, m, dist) < dist {
                    self.arcs.push(EllipticArc::ellipse(e.matrix.then(m)));
                }
            }
            SubPath::ClosedSpline(s) => {
                let mut bez = Vec::new();
                s.beziers(&mut bez);
                self.add_bezier_run(&bez, m, mouse, dist);
            }
            SubPath::Curve(c) => {
                for j in 0..c.count_segments_closing() {
                    let seg = c.segment(j);
                    match seg.kind() {
                        SegmentKind::Line => {
                            let s = vellum_shape::math::transform_segment(m, &seg.line_segment());
                            if segment_distance(&s, mouse, dist) < dist {
                                self.segments.push(s);
                            }
                        }
                        SegmentKind::Arc => {
                            let arc = seg.arc().transformed(m);
                            if arc.distance(mouse, dist) < dist {
                                self.arcs.push(arc);
                            }
                        }
                        _ => {
                            let mut bez = Vec::new();
                            seg.beziers(&mut bez);
                            self.add_bezier_run(&bez, m, mouse, dist);
                        }
                    }
                }
            }
        }
    }
}

/// Gather the primitives of all snap-eligible objects within `dist` of
/// `mouse`.
///
/// With `view` set, an object is eligible when the page reports it
/// snappable in that view. Without a view, only objects on the dedicated
/// [`CUSTOM_GRID_LAYER`] are collected; that is the primitive set custom
/// grid snapping works on.
pub fn collect(page: &dyn SnapPage, mouse: Point, dist: f64, view: Option<usize>) -> Collected {
    let mut out = Collected::default();
    let identity = Transform::identity();
    match view {
        Some(view) => {
            for i in 0..page.len() {
                if page.snaps_in_view(i, view) {
                    out.visit(page.object(i), &identity, mouse, dist);
                }
            }
        }
        None => {
            let grid_layer = match page.find_layer(CUSTOM_GRID_LAYER) {
                Some(l) => l,
                None => return out,
            };
            for i in 0..page.len() {
                if page.layer_of(i) == grid_layer {
                    out.visit(page.object(i), &identity, mouse, dist);
                }
            }
        }
    }
    out
}
