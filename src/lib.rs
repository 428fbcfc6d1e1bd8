//! # Vellum
//!
//! The geometric core of a vector-drawing document library.
//!
//! The [shape](crate::shape) module holds the drawable geometry itself:
//! shapes made of curve, ellipse and closed-spline subpaths, the queries an
//! editor runs against them (bounding box, distance, vertex/boundary
//! snapping) and the compact textual form they are persisted in. The
//! [snap](crate::snap) module implements the interactive snapping engine
//! that resolves a mouse position against a page of such shapes.

pub extern crate vellum_shape;
pub extern crate vellum_snap;

pub use vellum_shape as shape;
pub use vellum_snap as snap;

pub use vellum_shape::math;
