//! Shapes: ordered collections of subpaths, shared by value.

use std::fmt;
use std::sync::Arc;

use crate::bounds::Bounds;
use crate::curve::{Curve, SegmentKind};
use crate::math::{point, unit, Point, Rect, Segment, Transform};
use crate::painter::Painter;
use crate::parser;
use crate::subpath::{Ellipse, SubPath};

/// An immutable drawable shape.
///
/// A shape follows the PDF path model: a set of subpaths stroked and
/// filled as a whole (several subpaths make holes possible), extended with
/// arc, ellipse and spline subpath kinds.
///
/// Cloning is cheap (the subpaths are shared); building happens through a
/// [`ShapeBuilder`] or [`Shape::parse`], after which the geometry can no
/// longer change. Queries that take a transformation apply it to the shape
/// on the fly, so one shape can be shared by many placed objects.
#[derive(Clone, Debug)]
pub struct Shape {
    subpaths: Arc<[SubPath]>,
}

impl Default for Shape {
    fn default() -> Shape {
        Shape {
            subpaths: Vec::new().into(),
        }
    }
}

/// Assembles the subpaths of a [`Shape`]; consumed by
/// [`build`](ShapeBuilder::build).
#[derive(Default)]
pub struct ShapeBuilder {
    subpaths: Vec<SubPath>,
}

impl ShapeBuilder {
    pub fn new() -> ShapeBuilder {
        ShapeBuilder::default()
    }

    pub fn append(&mut self, sp: SubPath) {
        self.subpaths.push(sp);
    }

    pub fn build(self) -> Shape {
        Shape {
            subpaths: self.subpaths.into(),
        }
    }
}

impl Shape {
    /// An empty shape with zero subpaths.
    pub fn new() -> Shape {
        Shape::default()
    }

    pub fn builder() -> ShapeBuilder {
        ShapeBuilder::new()
    }

    /// An axis-parallel rectangle.
    pub fn rectangle(rect: &Rect) -> Shape {
        let (lo, hi) = (rect.min(), rect.max());
        let mut sp = Curve::new();
        sp.append_segment(lo, point(hi.x, lo.y));
        sp.append_segment(point(hi.x, lo.y), hi);
        sp.append_segment(hi, point(lo.x, hi.y));
        sp.set_closed(true);
        let mut b = Shape::builder();
        b.append(SubPath::Curve(sp));
        b.build()
    }

    /// A single straight segment.
    pub fn line(seg: &Segment) -> Shape {
        let mut sp = Curve::new();
        sp.append_segment(seg.from, seg.to);
        let mut b = Shape::builder();
        b.append(SubPath::Curve(sp));
        b.build()
    }

    /// A circle with the given center and radius.
    pub fn circle(center: Point, radius: f64) -> Shape {
        let m = Transform::new(radius, 0.0, 0.0, radius, center.x, center.y);
        let mut b = Shape::builder();
        b.append(SubPath::Ellipse(Ellipse::new(m)));
        b.build()
    }

    /// A circular arc from angle `alpha0` to `alpha1`, oriented positively
    /// when `alpha1 > alpha0` and negatively otherwise.
    pub fn circular_arc(center: Point, radius: f64, alpha0: f64, alpha1: f64) -> Shape {
        let mut m = Transform::new(radius, 0.0, 0.0, radius, center.x, center.y);
        let v0 = m.transform_point(unit(alpha0).to_point());
        let v1 = m.transform_point(unit(alpha1).to_point());
        if alpha1 < alpha0 {
            // negative orientation: flip the local frame
            m = Transform::new(1.0, 0.0, 0.0, -1.0, 0.0, 0.0).then(&m);
        }
        let mut sp = Curve::new();
        sp.append_arc(m, v0, v1);
        let mut b = Shape::builder();
        b.append(SubPath::Curve(sp));
        b.build()
    }

    /// Parse the persisted text form.
    ///
    /// On failure the partially built shape is discarded; the error
    /// describes the first offending construct.
    pub fn parse(data: &str) -> Result<Shape, parser::ParseError> {
        let subpaths = parser::parse_subpaths(data)?;
        Ok(Shape {
            subpaths: subpaths.into(),
        })
    }

    /// Write the persisted text form; the inverse of
    /// [`parse`](Shape::parse).
    pub fn save<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        for sp in self.subpaths.iter() {
            crate::writer::save_subpath(sp, w)?;
        }
        Ok(())
    }

    pub fn count_subpaths(&self) -> usize {
        self.subpaths.len()
    }

    pub fn subpath(&self, i: usize) -> &SubPath {
        &self.subpaths[i]
    }

    pub fn subpaths(&self) -> &[SubPath] {
        &self.subpaths
    }

    /// Is this shape a single open straight segment? (Used to suppress
    /// stroking of single-segment filled paths.)
    pub fn is_segment(&self) -> bool {
        if self.subpaths.len() != 1 {
            return false;
        }
        match &self.subpaths[0] {
            SubPath::Curve(c) => {
                !c.closed()
                    && c.count_segments() == 1
                    && c.segment(0).kind() == SegmentKind::Line
            }
            _ => false,
        }
    }

    /// Add the shape, transformed by `m`, to `bounds`. With `cp` set,
    /// control points are included (see
    /// [`CurveSegment::add_to_bbox`](crate::curve::CurveSegment::add_to_bbox)).
    pub fn add_to_bbox(&self, bounds: &mut Bounds, m: &Transform, cp: bool) {
        for sp in self.subpaths.iter() {
            sp.add_to_bbox(bounds, m, cp);
        }
    }

    /// Distance from `v` to the shape transformed by `m`, pruned by
    /// `bound`: the result never exceeds `bound`, and subpaths are skipped
    /// as soon as they provably cannot improve on it.
    pub fn distance(&self, v: Point, m: &Transform, bound: f64) -> f64 {
        let mut d = bound;
        for sp in self.subpaths.iter() {
            let d1 = sp.distance(v, m, d);
            if d1 < d {
                d = d1;
            }
        }
        d
    }

    /// Snap `mouse` to a vertex (or, with `ctl`, to the control-point
    /// family) of the shape, improving `pos`/`bound` in place.
    pub fn snap_vertex(
        &self,
        mouse: Point,
        m: &Transform,
        pos: &mut Point,
        bound: &mut f64,
        ctl: bool,
    ) {
        for sp in self.subpaths.iter() {
            sp.snap_vertex(mouse, m, pos, bound, ctl);
        }
    }

    /// Snap `mouse` to the closest boundary point of the shape, improving
    /// `pos`/`bound` in place.
    pub fn snap_boundary(&self, mouse: Point, m: &Transform, pos: &mut Point, bound: &mut f64) {
        for sp in self.subpaths.iter() {
            sp.snap_boundary(mouse, m, pos, bound);
        }
    }

    /// Replay the shape into `painter`. Does not begin or end a path.
    pub fn draw(&self, painter: &mut dyn Painter) {
        for sp in self.subpaths.iter() {
            sp.draw(painter);
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.save(f)
    }
}

#[cfg(feature = "serialization")]
impl serde::Serialize for Shape {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.subpaths.iter())
    }
}

#[cfg(feature = "serialization")]
impl<'de> serde::Deserialize<'de> for Shape {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let subpaths = Vec::<SubPath>::deserialize(deserializer)?;
        Ok(Shape {
            subpaths: subpaths.into(),
        })
    }
}
