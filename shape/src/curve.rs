//! Curve subpaths: runs of segments sharing one flat control-point store.
//!
//! All segments of one curve store their control points in a single flat
//! array and their arc matrices in a second one. A segment descriptor only
//! records its kind, the index of its *last* control point and a
//! kind-specific payload; consecutive last-indices delimit the windows, so
//! a segment's first control point is the previous segment's last. Segment
//! views are computed on demand and never stored.

use crate::arc::EllipticArc;
use crate::bezier;
use crate::bounds::Bounds;
use crate::math::{
    segment_distance, snap_to_point, snap_to_segment, transform_bezier, transform_segment,
    Bezier, Point, Segment, Transform,
};
use crate::painter::Painter;

/// The kind of a curve segment.
///
/// - `Line`: two control points, a straight segment.
/// - `Arc`: an elliptic arc; the supporting ellipse is the image of the
///   unit circle under the segment's matrix and the two control points are
///   (nearly) on it. The arc sweeps positively in the matrix' local frame
///   from the preimage of the first to the preimage of the second.
/// - `Spline`: a clamped uniform B-spline; three control points denote a
///   quadratic Bezier, four a single cubic.
/// - `OldSpline`: a historic, incorrectly clamped B-spline. Read for
///   compatibility, never written for new content.
/// - `CardinalSpline`: interpolates all control points, shaped by a
///   tension.
/// - `SpiroSpline`: a clothoid spline; the solve is external, this crate
///   stores its Bezier output next to the original control points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    Line,
    Arc,
    Spline,
    OldSpline,
    CardinalSpline,
    SpiroSpline,
}

#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub(crate) enum SegData {
    Line,
    Arc {
        /// Index into the curve's matrix store.
        matrix: u32,
    },
    Spline,
    OldSpline,
    Cardinal {
        tension: f64,
    },
    Spiro {
        /// Index of the last precomputed Bezier control point; the
        /// original spiro control points follow it.
        split: u32,
    },
}

#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct Seg {
    /// Index of the segment's last control point in the shared store.
    pub(crate) last: u32,
    pub(crate) data: SegData,
}

impl Seg {
    pub(crate) fn kind(&self) -> SegmentKind {
        match self.data {
            SegData::Line => SegmentKind::Line,
            SegData::Arc { .. } => SegmentKind::Arc,
            SegData::Spline => SegmentKind::Spline,
            SegData::OldSpline => SegmentKind::OldSpline,
            SegData::Cardinal { .. } => SegmentKind::CardinalSpline,
            SegData::Spiro { .. } => SegmentKind::SpiroSpline,
        }
    }
}

/// An open or closed subpath built from a run of segments.
///
/// A closed curve carries a synthetic closing straight segment from its
/// last point back to its first; [`count_segments`](Curve::count_segments)
/// excludes it, [`count_segments_closing`](Curve::count_segments_closing)
/// includes it. A curve with zero segments is only valid transiently,
/// while it is being assembled.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Curve {
    pub(crate) closed: bool,
    pub(crate) segs: Vec<Seg>,
    pub(crate) cps: Vec<Point>,
    pub(crate) mats: Vec<Transform>,
}

impl Curve {
    /// An empty, open curve.
    pub fn new() -> Curve {
        Curve::default()
    }

    fn start(&mut self, v0: Point) {
        if self.segs.is_empty() && self.cps.is_empty() {
            self.cps.push(v0);
        }
        assert_eq!(*self.cps.last().unwrap(), v0, "segments of a curve must chain");
    }

    /// Append a straight segment from `v0` to `v1`.
    ///
    /// `v0` must equal the current last control point (or start the curve).
    pub fn append_segment(&mut self, v0: Point, v1: Point) {
        self.start(v0);
        self.cps.push(v1);
        self.segs.push(Seg {
            last: (self.cps.len() - 1) as u32,
            data: SegData::Line,
        });
    }

    /// Append an elliptic arc from `v0` to `v1` on the ellipse defined by
    /// `m`.
    pub fn append_arc(&mut self, m: Transform, v0: Point, v1: Point) {
        self.start(v0);
        self.cps.push(v1);
        self.mats.push(m);
        self.segs.push(Seg {
            last: (self.cps.len() - 1) as u32,
            data: SegData::Arc {
                matrix: (self.mats.len() - 1) as u32,
            },
        });
    }

    fn append_spline_run(&mut self, v: &[Point], data: SegData) {
        assert!(v.len() >= 2, "a spline needs at least two control points");
        self.start(v[0]);
        self.cps.extend_from_slice(&v[1..]);
        self.segs.push(Seg {
            last: (self.cps.len() - 1) as u32,
            data,
        });
    }

    /// Append a uniform B-spline run through `v` (including the current
    /// point as `v[0]`).
    pub fn append_spline(&mut self, v: &[Point]) {
        self.append_spline_run(v, SegData::Spline);
    }

    /// Append a legacy spline run; reading old data only.
    pub fn append_old_spline(&mut self, v: &[Point]) {
        self.append_spline_run(v, SegData::OldSpline);
    }

    /// Append a cardinal spline run with the given tension.
    pub fn append_cardinal_spline(&mut self, v: &[Point], tension: f64) {
        self.append_spline_run(v, SegData::Cardinal { tension });
    }

    /// Append a clothoid spline run.
    ///
    /// The external clothoid solve is not available here; the Bezier
    /// representation is computed with the uniform B-spline conversion
    /// instead, which is also the fallback the format was written with
    /// when the solver was missing. The original control points are kept
    /// for re-serialization.
    pub fn append_spiro_spline(&mut self, v: &[Point]) {
        assert!(v.len() >= 2, "a spline needs at least two control points");
        self.start(v[0]);
        let mut bez = Vec::new();
        bezier::spline_to_beziers(v, &mut bez);
        for b in &bez {
            self.cps.push(b.ctrl1);
            self.cps.push(b.ctrl2);
            self.cps.push(b.to);
        }
        let split = (self.cps.len() - 1) as u32;
        self.cps.extend_from_slice(v);
        self.segs.push(Seg {
            last: (self.cps.len() - 1) as u32,
            data: SegData::Spiro { split },
        });
    }

    /// Append a clothoid spline run whose Bezier representation was
    /// precomputed by the writer; `sep` is the index in `v` of the first
    /// original spiro control point (everything before it, minus the
    /// leading current point, is Bezier control points).
    pub fn append_spiro_spline_precomputed(&mut self, v: &[Point], sep: usize) {
        assert!(2 <= sep && sep <= v.len());
        self.start(v[0]);
        for p in &v[1..sep] {
            self.cps.push(*p);
        }
        // the Bezier run ends in the final target point, the spiro run
        // restarts at the origin; both are stored explicitly
        self.cps.push(*v.last().unwrap());
        let split = (self.cps.len() - 1) as u32;
        self.cps.push(v[0]);
        self.cps.extend_from_slice(&v[sep..]);
        self.segs.push(Seg {
            last: (self.cps.len() - 1) as u32,
            data: SegData::Spiro { split },
        });
    }

    /// Close or open the curve. Closing appends the synthetic closing
    /// segment; must be called after all segments have been appended.
    pub fn set_closed(&mut self, closed: bool) {
        assert!(!self.segs.is_empty() && !self.closed);
        self.closed = closed;
        if closed {
            let last = *self.cps.last().unwrap();
            let first = self.cps[0];
            self.append_segment(last, first);
        }
    }

    /// Is this curve closed?
    pub fn closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    /// Number of segments, excluding the closing segment of a closed
    /// curve.
    pub fn count_segments(&self) -> usize {
        if self.closed {
            self.segs.len() - 1
        } else {
            self.segs.len()
        }
    }

    /// Number of segments, including the closing segment of a closed
    /// curve.
    pub fn count_segments_closing(&self) -> usize {
        self.segs.len()
    }

    fn seg_first(&self, i: usize) -> usize {
        if i > 0 {
            self.segs[i - 1].last as usize
        } else {
            0
        }
    }

    /// The segment view at index `i`.
    ///
    /// Valid indices run to [`count_segments_closing`](Curve::count_segments_closing);
    /// out-of-range indices panic.
    pub fn segment(&self, i: usize) -> CurveSegment {
        let seg = &self.segs[i];
        let first = self.seg_first(i);
        let last = seg.last as usize;
        match seg.data {
            SegData::Spiro { split } => CurveSegment {
                kind: SegmentKind::SpiroSpline,
                cps: &self.cps[split as usize + 1..=last],
                bez: &self.cps[first..=split as usize],
                matrix: None,
                tension: 0.0,
            },
            SegData::Arc { matrix } => CurveSegment {
                kind: SegmentKind::Arc,
                cps: &self.cps[first..=last],
                bez: &[],
                matrix: Some(&self.mats[matrix as usize]),
                tension: 0.0,
            },
            SegData::Cardinal { tension } => CurveSegment {
                kind: SegmentKind::CardinalSpline,
                cps: &self.cps[first..=last],
                bez: &[],
                matrix: None,
                tension,
            },
            _ => CurveSegment {
                kind: seg.kind(),
                cps: &self.cps[first..=last],
                bez: &[],
                matrix: None,
                tension: 0.0,
            },
        }
    }

    /// The last segment, counting the closing segment.
    pub fn last_segment(&self) -> CurveSegment {
        self.segment(self.segs.len() - 1)
    }

    /// The closing segment of a closed curve; panics if the curve is open.
    pub fn closing_segment(&self) -> CurveSegment {
        assert!(self.closed, "open curves have no closing segment");
        self.segment(self.segs.len() - 1)
    }

    pub fn draw(&self, painter: &mut dyn Painter) {
        painter.move_to(self.cps[0]);
        for i in 0..self.count_segments() {
            self.segment(i).draw(painter);
        }
        if self.closed {
            painter.close_path();
        }
    }

    pub fn add_to_bbox(&self, bounds: &mut Bounds, m: &Transform, cp: bool) {
        for i in 0..self.count_segments() {
            self.segment(i).add_to_bbox(bounds, m, cp);
        }
    }

    pub fn distance(&self, v: Point, m: &Transform, bound: f64) -> f64 {
        let mut d = bound;
        for i in 0..self.count_segments_closing() {
            let d1 = self.segment(i).distance(v, m, d);
            if d1 < d {
                d = d1;
            }
        }
        d
    }

    pub fn snap_vertex(
        &self,
        mouse: Point,
        m: &Transform,
        pos: &mut Point,
        bound: &mut f64,
        ctl: bool,
    ) {
        if !ctl {
            // each segment tests its last point only; the very first
            // control point is ours to test
            snap_to_point(mouse, m.transform_point(self.segment(0).first()), pos, bound);
        } else if self.closed {
            // midpoint of the closing segment
            self.closing_segment().snap_vertex(mouse, m, pos, bound, ctl);
        }
        for i in 0..self.count_segments() {
            self.segment(i).snap_vertex(mouse, m, pos, bound, ctl);
        }
    }

    pub fn snap_boundary(&self, mouse: Point, m: &Transform, pos: &mut Point, bound: &mut f64) {
        snap_to_point(mouse, m.transform_point(self.segment(0).first()), pos, bound);
        for i in 0..self.count_segments_closing() {
            self.segment(i).snap_boundary(mouse, m, pos, bound);
        }
    }
}

/// A lightweight view of one segment of a [`Curve`], computed on demand.
///
/// For spiro splines the control points are the original spiro input; the
/// precomputed Bezier chain is available through
/// [`beziers`](CurveSegment::beziers).
#[derive(Copy, Clone, Debug)]
pub struct CurveSegment<'a> {
    kind: SegmentKind,
    cps: &'a [Point],
    bez: &'a [Point],
    matrix: Option<&'a Transform>,
    tension: f64,
}

impl<'a> CurveSegment<'a> {
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Number of control points.
    pub fn count_cps(&self) -> usize {
        self.cps.len()
    }

    /// Control point `i`.
    pub fn cp(&self, i: usize) -> Point {
        self.cps[i]
    }

    /// All control points, first to last.
    pub fn cps(&self) -> &'a [Point] {
        self.cps
    }

    /// First control point.
    pub fn first(&self) -> Point {
        self.cps[0]
    }

    /// Last control point.
    pub fn last(&self) -> Point {
        *self.cps.last().unwrap()
    }

    /// The arc matrix; panics unless the segment is an arc.
    pub fn matrix(&self) -> &'a Transform {
        self.matrix.expect("only arc segments carry a matrix")
    }

    /// The cardinal-spline tension; panics on any other kind.
    pub fn tension(&self) -> f64 {
        assert!(
            self.kind == SegmentKind::CardinalSpline,
            "only cardinal splines carry a tension"
        );
        self.tension
    }

    /// This segment as an elliptic arc; panics unless it is one.
    pub fn arc(&self) -> EllipticArc {
        assert!(self.kind == SegmentKind::Arc);
        EllipticArc::new(*self.matrix(), self.cps[0], self.cps[1])
    }

    /// This segment as a straight line segment; panics unless it is one.
    pub fn line_segment(&self) -> Segment {
        assert!(self.kind == SegmentKind::Line);
        Segment { from: self.cps[0], to: self.cps[1] }
    }

    /// Append the Bezier representation of a spline segment to `out`.
    /// Straight segments and arcs contribute nothing.
    pub fn beziers(&self, out: &mut Vec<Bezier>) {
        match self.kind {
            SegmentKind::Spline => bezier::spline_to_beziers(self.cps, out),
            SegmentKind::OldSpline => bezier::old_spline_to_beziers(self.cps, out),
            SegmentKind::CardinalSpline => {
                bezier::cardinal_spline_to_beziers(self.cps, self.tension, out)
            }
            SegmentKind::SpiroSpline => {
                // precomputed chain: start point plus three points per piece
                let mut j = 0;
                while j + 3 < self.bez.len() {
                    out.push(Bezier {
                        from: self.bez[j],
                        ctrl1: self.bez[j + 1],
                        ctrl2: self.bez[j + 2],
                        to: self.bez[j + 3],
                    });
                    j += 3;
                }
            }
            SegmentKind::Line | SegmentKind::Arc => {}
        }
    }

    /// Draw the segment; the painter's current position is already on the
    /// first control point.
    pub fn draw(&self, painter: &mut dyn Painter) {
        match self.kind {
            SegmentKind::Line => painter.line_to(self.cps[1]),
            SegmentKind::Arc => painter.draw_arc(&self.arc()),
            _ => {
                let mut bez = Vec::new();
                self.beziers(&mut bez);
                for b in &bez {
                    painter.curve_to(*b);
                }
            }
        }
    }

    /// Add the segment, transformed by `m`, to `bounds`.
    ///
    /// With `cp` set, spline control points and arc centers are included
    /// so vertex snapping can find them; otherwise the box is tight around
    /// the geometry.
    pub fn add_to_bbox(&self, bounds: &mut Bounds, m: &Transform, cp: bool) {
        match self.kind {
            SegmentKind::Line => {
                bounds.add_point(m.transform_point(self.cps[0]));
                bounds.add_point(m.transform_point(self.cps[1]));
            }
            SegmentKind::Arc => {
                let arc = self.arc().transformed(m);
                bounds.add_bounds(&arc.bounds());
                if cp {
                    bounds.add_point(arc.center());
                }
            }
            _ => {
                if cp {
                    for &p in self.cps {
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
        }
    }

    /// Distance from `v` to the segment transformed by `m`, pruned by
    /// `bound`.
    pub fn distance(&self, v: Point, m: &Transform, bound: f64) -> f64 {
        match self.kind {
            SegmentKind::Line => {
                segment_distance(&transform_segment(m, &self.line_segment()), v, bound)
            }
            SegmentKind::Arc => self.arc().transformed(m).distance(v, bound),
            _ => {
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
        }
    }

    /// Snap to a vertex of the segment. Assumes the first control point
    /// has already been tested by the caller.
    ///
    /// With `ctl` set, snaps to the control-point family instead: segment
    /// midpoints, arc centers and interior spline control points.
    pub fn snap_vertex(
        &self,
        mouse: Point,
        m: &Transform,
        pos: &mut Point,
        bound: &mut f64,
        ctl: bool,
    ) {
        match self.kind {
            SegmentKind::Line => {
                if ctl {
                    let mid = self.cps[0].lerp(self.cps[1], 0.5);
                    snap_to_point(mouse, m.transform_point(mid), pos, bound);
                } else {
                    snap_to_point(mouse, m.transform_point(self.cps[1]), pos, bound);
                }
            }
            SegmentKind::Arc => {
                if ctl {
                    snap_to_point(mouse, self.arc().transformed(m).center(), pos, bound);
                } else {
                    snap_to_point(mouse, m.transform_point(self.cps[1]), pos, bound);
                }
            }
            _ => {
                if ctl {
                    for &p in &self.cps[1..self.cps.len() - 1] {
                        snap_to_point(mouse, m.transform_point(p), pos, bound);
                    }
                } else {
                    snap_to_point(mouse, m.transform_point(self.last()), pos, bound);
                }
            }
        }
    }

    /// Snap to the closest boundary point of the segment.
    pub fn snap_boundary(&self, mouse: Point, m: &Transform, pos: &mut Point, bound: &mut f64) {
        match self.kind {
            SegmentKind::Line => {
                snap_to_segment(&transform_segment(m, &self.line_segment()), mouse, pos, bound);
            }
            SegmentKind::Arc => {
                let arc = self.arc().transformed(m);
                if let Some((p, _, d)) = arc.closest_point(mouse, *bound) {
                    *bound = d;
                    *pos = p;
                }
            }
            _ => {
                let mut bez = Vec::new();
                self.beziers(&mut bez);
                for b in &bez {
                    let tb = transform_bezier(m, b);
                    let mut t = 0.0;
                    bezier::bezier_snap(&tb, mouse, &mut t, pos, bound);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    fn triangle() -> Curve {
        let mut c = Curve::new();
        c.append_segment(point(0.0, 0.0), point(10.0, 0.0));
        c.append_segment(point(10.0, 0.0), point(10.0, 10.0));
        c.set_closed(true);
        c
    }

    #[test]
    fn closing_segment_bookkeeping() {
        let c = triangle();
        assert!(c.closed());
        assert_eq!(c.count_segments(), 2);
        assert_eq!(c.count_segments_closing(), 3);
        let closing = c.closing_segment();
        assert_eq!(closing.kind(), SegmentKind::Line);
        assert_eq!(closing.first(), point(10.0, 10.0));
        assert_eq!(closing.last(), point(0.0, 0.0));
        assert_eq!(c.last_segment().first(), closing.first());
    }

    #[test]
    fn windows_share_points() {
        let mut c = Curve::new();
        c.append_segment(point(0.0, 0.0), point(10.0, 0.0));
        c.append_spline(&[point(10.0, 0.0), point(20.0, 0.0), point(20.0, 10.0)]);
        assert_eq!(c.count_segments(), 2);
        let s0 = c.segment(0);
        let s1 = c.segment(1);
        // the spline starts where the segment ends, without storing the
        // point twice
        assert_eq!(s0.last(), s1.first());
        assert_eq!(c.cps.len(), 4);
        assert_eq!(s1.count_cps(), 3);
    }

    #[test]
    fn arc_segment_roundtrip() {
        let mut c = Curve::new();
        let m = Transform::new(5.0, 0.0, 0.0, 5.0, 0.0, 0.0);
        c.append_arc(m, point(5.0, 0.0), point(0.0, 5.0));
        let seg = c.segment(0);
        assert_eq!(seg.kind(), SegmentKind::Arc);
        let arc = seg.arc();
        assert!((arc.begin() - point(5.0, 0.0)).length() < 1e-9);
        assert!((arc.end() - point(0.0, 5.0)).length() < 1e-9);
    }

    #[test]
    fn spiro_windows() {
        let mut c = Curve::new();
        let v = [point(0.0, 0.0), point(10.0, 10.0), point(20.0, 0.0), point(30.0, 10.0)];
        c.append_spiro_spline(&v);
        let seg = c.segment(0);
        assert_eq!(seg.kind(), SegmentKind::SpiroSpline);
        // the view exposes the original control points
        assert_eq!(seg.cps(), &v[..]);
        let mut bez = Vec::new();
        seg.beziers(&mut bez);
        assert!(!bez.is_empty());
        assert_eq!(bez[0].from, v[0]);
        assert_eq!(bez.last().unwrap().to, v[3]);
    }

    #[test]
    #[should_panic]
    fn tension_on_non_cardinal_panics() {
        let c = triangle();
        c.segment(0).tension();
    }

    #[test]
    fn control_snap_prefers_midpoint() {
        let c = triangle();
        let m = Transform::identity();
        let mut pos = point(0.0, 0.0);
        let mut bound = 100.0;
        c.snap_vertex(point(5.0, 1.0), &m, &mut pos, &mut bound, true);
        assert_eq!(pos, point(5.0, 0.0));
        let mut bound = 100.0;
        c.snap_vertex(point(5.0, 1.0), &m, &mut pos, &mut bound, false);
        assert_eq!(pos, point(0.0, 0.0));
    }

    #[test]
    fn distance_uses_closing_segment() {
        let c = triangle();
        let m = Transform::identity();
        // closest to the hypotenuse, which only exists as the closing
        // segment
        let d = c.distance(point(4.0, 6.0), &m, 100.0);
        assert!((d - (2.0f64).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn bbox_with_and_without_control_points() {
        let mut c = Curve::new();
        c.append_spline(&[
            point(0.0, 0.0),
            point(10.0, 40.0),
            point(20.0, -40.0),
            point(30.0, 0.0),
        ]);
        let m = Transform::identity();
        let mut tight = Bounds::new();
        c.add_to_bbox(&mut tight, &m, false);
        let mut loose = Bounds::new();
        c.add_to_bbox(&mut loose, &m, true);
        assert!(loose.max().y >= tight.max().y);
        assert!(loose.min().y <= tight.min().y);
        assert!((loose.max().y - 40.0).abs() < 1e-9);
    }
}
